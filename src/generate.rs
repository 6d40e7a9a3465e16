//! Expiry-bounded key and certificate generation.
//!
//! [`generate_expiring`] is the single entry point used by the command line:
//! it produces a fresh RSA key pair and a self-signed certificate valid for a
//! number of minutes from now, both PEM encoded. Nothing is written anywhere
//! and nothing is logged; persistence and upload are the caller's business.

use bon::Builder;
use time::OffsetDateTime;

use crate::cert::Certificate;
use crate::cert::params::Validity;
use crate::cert::template::{CertificateTemplate, PLACEHOLDER_COMMON_NAME};
use crate::error::Result;
use crate::key::{DEFAULT_RSA_BITS, KeyPair};

/// Key size and subject used for generated identities.
#[derive(Clone, Debug, Builder, PartialEq, Eq)]
pub struct KeyPolicy {
    #[builder(default = DEFAULT_RSA_BITS)]
    pub rsa_bits: usize,
    #[builder(default = PLACEHOLDER_COMMON_NAME.to_string())]
    pub common_name: String,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        KeyPolicy::builder().build()
    }
}

/// A freshly generated certificate and its private key, both PEM encoded.
#[derive(Clone)]
pub struct GeneratedIdentity {
    /// `CERTIFICATE` block wrapping the DER certificate.
    pub certificate_pem: String,
    /// `PRIVATE KEY` block wrapping the unencrypted PKCS#8 key.
    pub private_key_pem: String,
}

impl GeneratedIdentity {
    pub fn certificate_pem_bytes(&self) -> &[u8] {
        self.certificate_pem.as_bytes()
    }

    pub fn private_key_pem_bytes(&self) -> &[u8] {
        self.private_key_pem.as_bytes()
    }
}

impl std::fmt::Debug for GeneratedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedIdentity")
            .field("certificate_pem", &self.certificate_pem)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

/// Generates a 2048-bit RSA key and a self-signed certificate valid for
/// `duration_minutes` minutes starting now.
///
/// A non-positive duration fails with
/// [`SakeError::InvalidTimeRange`](crate::error::SakeError::InvalidTimeRange)
/// before any key is generated.
pub fn generate_expiring(duration_minutes: i64) -> Result<GeneratedIdentity> {
    generate_expiring_with(duration_minutes, &KeyPolicy::default())
}

/// [`generate_expiring`] with an explicit key policy.
pub fn generate_expiring_with(
    duration_minutes: i64,
    policy: &KeyPolicy,
) -> Result<GeneratedIdentity> {
    generate_expiring_at(OffsetDateTime::now_utc(), duration_minutes, policy)
}

/// [`generate_expiring`] with the start of the validity window supplied by the caller.
pub fn generate_expiring_at(
    not_before: OffsetDateTime,
    duration_minutes: i64,
    policy: &KeyPolicy,
) -> Result<GeneratedIdentity> {
    let validity = Validity::for_minutes(not_before, duration_minutes)?;
    let template = CertificateTemplate::new(
        validity.not_before(),
        validity.not_after(),
        &policy.common_name,
    )?;

    let key = KeyPair::generate_rsa(policy.rsa_bits)?;
    let certificate = Certificate::new_self_signed(&template, &key)?;

    Ok(GeneratedIdentity {
        certificate_pem: certificate.to_pem()?,
        private_key_pem: key.to_pkcs8_pem()?,
    })
}
