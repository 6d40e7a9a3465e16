use bon::Builder;
use const_oid::ObjectIdentifier;
use time::{Duration, OffsetDateTime};
use x509_cert::name::RdnSequence;

use super::extensions::ToAndFromX509Extension;
use crate::error::{Result, SakeError};

const COMMON_NAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");

/// Distinguished name of a self-issued certificate.
///
/// Only the common name is populated: the certificate is a carrier for a
/// public key, not a statement about an identity.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: String,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509-compatible format.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        use core::str::FromStr;
        RdnSequence::from_str(&format!("CN={}", self.common_name)).map_err(|e| {
            SakeError::EncodingError(format!(
                "invalid common name {:?}: {e}",
                self.common_name
            ))
        })
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    ///
    /// Attributes other than the common name are ignored.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Result<Self> {
        let mut common_name = String::new();

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                if attr.oid == COMMON_NAME_OID {
                    common_name = attr.value.decode_as::<String>().map_err(|e| {
                        SakeError::DecodingError(format!("common name is not a UTF8String: {e}"))
                    })?;
                }
            }
        }

        Ok(DistinguishedName { common_name })
    }
}

/// Certificate validity period.
///
/// Always satisfies `not_after > not_before`; use [`Validity::new`] or
/// [`Validity::for_minutes`] to construct one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validity {
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period, rejecting empty or inverted ranges.
    pub fn new(not_before: OffsetDateTime, not_after: OffsetDateTime) -> Result<Self> {
        if not_after <= not_before {
            return Err(SakeError::InvalidTimeRange {
                not_before,
                not_after,
            });
        }
        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// Creates a validity period starting at `start` and lasting `minutes`.
    ///
    /// Zero or negative `minutes` is always an `InvalidTimeRange`, however far
    /// the end would fall outside the representable range.
    pub fn for_minutes(start: OffsetDateTime, minutes: i64) -> Result<Self> {
        if minutes <= 0 {
            return Err(SakeError::InvalidTimeRange {
                not_before: start,
                not_after: start.saturating_add(Duration::seconds(minutes.saturating_mul(60))),
            });
        }
        let not_after = minutes
            .checked_mul(60)
            .and_then(|seconds| start.checked_add(Duration::seconds(seconds)))
            .ok_or_else(|| {
                SakeError::ConfigError(format!("expiry of {minutes} minutes is out of range"))
            })?;
        Self::new(start, not_after)
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.not_after - self.not_before
    }

    /// Whether `instant` falls inside the closed window `[not_before, not_after]`.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.not_before <= instant && instant <= self.not_after
    }
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(
        extension: &E,
        critical: bool,
    ) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}
