use der::Encode;
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::params::DistinguishedName;
use crate::cert::template::CertificateTemplate;
use crate::error::{Result, SakeError};
use crate::key::KeyPair;
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Issues a certificate for `subject_key` from the given template.
    ///
    /// The inner and outer signature algorithm identifiers are taken from the
    /// signing key so that they always agree.
    fn issue(&self, template: &CertificateTemplate, subject_key: &KeyPair) -> Result<Certificate> {
        let signature_algorithm = self.signing_key().signature_algorithm();

        let tbs_cert = TbsCertificate::from_template(
            template,
            self.issuer_name(),
            subject_key.as_spki()?,
            signature_algorithm.clone(),
        )?;
        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let tbs_der = tbs_cert_inner
            .to_der()
            .map_err(|e| SakeError::EncodingError(e.to_string()))?;

        let signature = self.signing_key().sign_data(&tbs_der)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm,
            signature: der::asn1::BitString::from_bytes(&signature)
                .map_err(|e| SakeError::EncodingError(e.to_string()))?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}

/// Issues certificates whose issuer is their own subject, signed by the
/// certified key itself.
pub struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a KeyPair,
}

impl<'a> SelfIssuer<'a> {
    pub fn new(template: &CertificateTemplate, key: &'a KeyPair) -> Self {
        Self {
            name: template.subject.clone(),
            key,
        }
    }

    /// Signs `template` over `self.key`'s own public key.
    pub fn self_sign(&self, template: &CertificateTemplate) -> Result<Certificate> {
        self.issue(template, self.key)
    }
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }
}
