/// Label of a PEM block wrapping a DER-encoded X.509 certificate.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Label of a PEM block wrapping an unencrypted PKCS#8 private key.
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
///
/// The body is wrapped at 64 columns with LF line endings, as `openssl` writes it.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM‑encoded string to DER‑encoded bytes, requiring the given label.
pub fn pem_to_der(pem_str: &str, label: &str) -> Result<Vec<u8>, crate::error::SakeError> {
    let pem = pem::parse(pem_str)?;
    if pem.tag() != label {
        return Err(crate::error::SakeError::DecodingError(format!(
            "expected a {label} PEM block, found {}",
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}
