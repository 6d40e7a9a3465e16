pub mod extensions;
pub mod params;
pub mod template;

use der::{Decode, Encode};
use extensions::ToAndFromX509Extension;
use params::{DistinguishedName, ExtensionParam, Validity};
use rsa::RsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;

use crate::error::{Result, SakeError};
use crate::issuer::SelfIssuer;
use crate::key::{self, KeyPair};
use crate::pem_utils::{self, CERTIFICATE_LABEL};
use crate::tbs_certificate::from_x509_time;
use template::CertificateTemplate;

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode the certificate into DER or PEM
/// formats, and to inspect a decoded certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Creates a new self-signed certificate for `key` from `template`.
    ///
    /// Issuer and subject are both the template's subject, and the signature
    /// is made with `key` itself.
    pub fn new_self_signed(template: &CertificateTemplate, key: &KeyPair) -> Result<Self> {
        SelfIssuer::new(template, key).self_sign(template)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| SakeError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into a `CERTIFICATE` PEM block.
    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_der()?, CERTIFICATE_LABEL))
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: CertificateInner::from_der(der)?,
        })
    }

    /// Decodes a `CERTIFICATE` PEM block.
    pub fn from_pem(pem: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der(pem, CERTIFICATE_LABEL)?)
    }

    /// The decoded validity window, at the one-second resolution of X.509 time.
    pub fn validity(&self) -> Result<Validity> {
        let validity = &self.inner.tbs_certificate.validity;
        Validity::new(
            from_x509_time(&validity.not_before),
            from_x509_time(&validity.not_after),
        )
    }

    /// Whether the certificate is within its validity window at `instant`.
    pub fn is_valid_at(&self, instant: OffsetDateTime) -> Result<bool> {
        Ok(self.validity()?.contains(instant))
    }

    pub fn subject(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    pub fn issuer(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// Whether issuer and subject are the same name.
    pub fn is_self_issued(&self) -> bool {
        self.inner.tbs_certificate.issuer == self.inner.tbs_certificate.subject
    }

    /// Serial number as a minimal big-endian unsigned integer.
    pub fn serial_number(&self) -> Vec<u8> {
        let bytes = self.inner.tbs_certificate.serial_number.as_bytes();
        let first_significant = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        bytes[first_significant..].to_vec()
    }

    /// The RSA public key certified by this certificate.
    pub fn public_key(&self) -> Result<RsaPublicKey> {
        let spki_der = self
            .inner
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| SakeError::EncodingError(e.to_string()))?;
        RsaPublicKey::from_public_key_der(&spki_der)
            .map_err(|e| SakeError::DecodingError(format!("not an RSA public key: {e}")))
    }

    /// The certificate's extensions.
    pub fn extensions(&self) -> Vec<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect()
    }

    /// Finds and decodes extension `E`, if present.
    pub fn extension<E: ToAndFromX509Extension>(&self) -> Result<Option<E>> {
        self.extensions()
            .iter()
            .find(|ext| ext.oid == E::OID)
            .map(|ext| ext.to_extension::<E>())
            .transpose()
    }

    /// Checks that the certificate is signed by the key it certifies.
    pub fn verify_self_signature(&self) -> Result<()> {
        if self.inner.signature_algorithm != self.inner.tbs_certificate.signature {
            return Err(SakeError::CertificateError(
                "outer and inner signature algorithms differ".to_string(),
            ));
        }
        if self.inner.signature_algorithm.oid != const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION
        {
            return Err(SakeError::CertificateError(format!(
                "unsupported signature algorithm {}",
                self.inner.signature_algorithm.oid
            )));
        }

        let tbs_der = self
            .inner
            .tbs_certificate
            .to_der()
            .map_err(|e| SakeError::EncodingError(e.to_string()))?;
        key::verify_signature(
            &self.public_key()?,
            &tbs_der,
            self.inner.signature.raw_bytes(),
        )
    }
}
