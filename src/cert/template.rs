//! Certificate template construction.
//!
//! A [`CertificateTemplate`] is the pure-data description of a short-lived,
//! self-issued leaf certificate. It carries no key material: the subject
//! public key and the signing key are supplied when the template is signed
//! (see [`crate::issuer`]).

use rand::TryRngCore;
use rand::rngs::OsRng;
use time::OffsetDateTime;

use super::extensions::{
    BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage, KeyUsages,
};
use super::params::{DistinguishedName, ExtensionParam, Validity};
use crate::error::{Result, SakeError};

/// Common name written into every generated certificate.
pub const PLACEHOLDER_COMMON_NAME: &str = "unused";

/// Serial numbers are drawn uniformly from `[0, 2^128)`.
pub const SERIAL_NUMBER_LEN: usize = 16;

/// Fixed policy and per-request data for a self-issued leaf certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateTemplate {
    /// Big-endian, unsigned.
    pub serial_number: [u8; SERIAL_NUMBER_LEN],
    pub subject: DistinguishedName,
    pub validity: Validity,
    pub key_usage: KeyUsage,
    pub extended_key_usage: ExtendedKeyUsage,
    pub basic_constraints: BasicConstraints,
}

/// Builds a template with the placeholder subject for `[not_before, not_after]`.
///
/// Fails with [`SakeError::InvalidTimeRange`] unless `not_after > not_before`.
pub fn build_template(
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
) -> Result<CertificateTemplate> {
    CertificateTemplate::new(not_before, not_after, PLACEHOLDER_COMMON_NAME)
}

impl CertificateTemplate {
    /// Same as [`build_template`] with an explicit subject common name.
    pub fn new(
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
        common_name: &str,
    ) -> Result<Self> {
        let validity = Validity::new(not_before, not_after)?;
        let serial_number = random_serial_number()?;

        Ok(Self {
            serial_number,
            subject: DistinguishedName::builder()
                .common_name(common_name.to_string())
                .build(),
            validity,
            key_usage: KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment),
            extended_key_usage: ExtendedKeyUsage {
                usage: vec![ExtendedKeyUsageOption::ServerAuth],
            },
            basic_constraints: BasicConstraints {
                is_ca: false,
                max_path_length: None,
            },
        })
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.validity.not_before()
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.validity.not_after()
    }

    /// The template's policy as X.509 extensions, in the order they are encoded.
    pub fn extensions(&self) -> Result<Vec<ExtensionParam>> {
        Ok(vec![
            ExtensionParam::from_extension(&self.key_usage, true)?,
            ExtensionParam::from_extension(&self.extended_key_usage, false)?,
            ExtensionParam::from_extension(&self.basic_constraints, true)?,
        ])
    }
}

fn random_serial_number() -> Result<[u8; SERIAL_NUMBER_LEN]> {
    let mut serial = [0u8; SERIAL_NUMBER_LEN];
    OsRng.try_fill_bytes(&mut serial).map_err(|e| {
        SakeError::KeyGenerationError(format!("failed to generate serial number: {e}"))
    })?;
    Ok(serial)
}
