use std::time::SystemTime;

use der::Encode;
use der::asn1::{GeneralizedTime, OctetString, UtcTime};
use time::OffsetDateTime;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::cert::params::{DistinguishedName, ExtensionParam, Validity};
use crate::cert::template::CertificateTemplate;
use crate::error::{Result, SakeError};

/// First year that RFC 5280 requires to be encoded as GeneralizedTime.
const GENERALIZED_TIME_FROM_YEAR: i32 = 2050;

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
///
/// # Fields
/// * `serial_number` - Big-endian unsigned serial.
/// * `signature_algorithm` - The algorithm used to sign the certificate.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `validity` - The certificate's validity window.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key_info` - The public key being certified.
/// * `extensions` - X.509 extensions for the certificate.
pub struct TbsCertificate {
    pub serial_number: Vec<u8>,
    pub signature_algorithm: AlgorithmIdentifierOwned,
    pub issuer: DistinguishedName,
    pub validity: Validity,
    pub subject: DistinguishedName,
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Lays a template out as a TBS structure issued by `issuer`.
    pub fn from_template(
        template: &CertificateTemplate,
        issuer: DistinguishedName,
        subject_public_key_info: SubjectPublicKeyInfoOwned,
        signature_algorithm: AlgorithmIdentifierOwned,
    ) -> Result<Self> {
        Ok(Self {
            serial_number: template.serial_number.to_vec(),
            signature_algorithm,
            issuer,
            validity: template.validity,
            subject: template.subject.clone(),
            subject_public_key_info,
            extensions: template.extensions()?,
        })
    }

    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<std::result::Result<Vec<_>, der::Error>>()
            .map_err(encoding_error)?;

        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.validity.not_before())?,
            not_after: to_x509_time(self.validity.not_after())?,
        };

        let serial_number =
            SerialNumber::new(self.serial_number.as_slice()).map_err(encoding_error)?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: self.signature_algorithm.clone(),
            issuer: self.issuer.as_x509_name()?,
            validity,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.subject_public_key_info.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }

    /// Encodes the `TbsCertificate` into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.to_tbs_certificate_inner()?
            .to_der()
            .map_err(encoding_error)
    }
}

/// Encodes a timestamp as UTCTime before 2050 and GeneralizedTime from 2050 on.
///
/// Both encodings have one-second resolution; sub-second precision is truncated.
pub fn to_x509_time(instant: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let system_time = SystemTime::from(instant);
    let time = if instant.year() < GENERALIZED_TIME_FROM_YEAR {
        x509_cert::time::Time::UtcTime(
            UtcTime::from_system_time(system_time).map_err(encoding_error)?,
        )
    } else {
        x509_cert::time::Time::GeneralTime(
            GeneralizedTime::from_system_time(system_time).map_err(encoding_error)?,
        )
    };
    Ok(time)
}

pub fn from_x509_time(time: &x509_cert::time::Time) -> OffsetDateTime {
    match time {
        x509_cert::time::Time::UtcTime(ut) => OffsetDateTime::from(ut.to_system_time()),
        x509_cert::time::Time::GeneralTime(gt) => OffsetDateTime::from(gt.to_system_time()),
    }
}

fn encoding_error(err: der::Error) -> SakeError {
    SakeError::EncodingError(err.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_time_encoding_switches_at_2050() {
        let before = datetime!(2049-12-31 23:59:59 UTC);
        let after = datetime!(2050-01-01 00:00:00 UTC);
        assert!(matches!(
            to_x509_time(before).unwrap(),
            x509_cert::time::Time::UtcTime(_)
        ));
        assert!(matches!(
            to_x509_time(after).unwrap(),
            x509_cert::time::Time::GeneralTime(_)
        ));
        assert_eq!(from_x509_time(&to_x509_time(after).unwrap()), after);
    }

    #[test]
    fn test_sub_second_precision_is_truncated() {
        let instant = datetime!(2030-06-01 12:00:00.750 UTC);
        let decoded = from_x509_time(&to_x509_time(instant).unwrap());
        assert_eq!(decoded, datetime!(2030-06-01 12:00:00 UTC));
    }
}
