use std::path::PathBuf;

use tracing::{debug, info};

use crate::cert::Certificate;
use crate::error::Result;
use crate::generate::generate_expiring;
use crate::sink::save_key;

pub const DEFAULT_PUBLIC_KEY_FILE: &str = "public.pem";
pub const DEFAULT_PRIVATE_KEY_FILE: &str = "private.pem";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateParams {
    pub expiry_minutes: i64,
    pub public_key_file: PathBuf,
    pub private_key_file: PathBuf,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            expiry_minutes: super::DEFAULT_EXPIRY_MINUTES,
            public_key_file: PathBuf::from(DEFAULT_PUBLIC_KEY_FILE),
            private_key_file: PathBuf::from(DEFAULT_PRIVATE_KEY_FILE),
        }
    }
}

/// Generates a key pair and writes the certificate and private key PEM files.
pub fn handle(params: &GenerateParams) -> Result<()> {
    debug!(
        expiry_minutes = params.expiry_minutes,
        public_key_file = %params.public_key_file.display(),
        private_key_file = %params.private_key_file.display(),
        "generating key pair"
    );

    let identity = generate_expiring(params.expiry_minutes)?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let validity = Certificate::from_pem(&identity.certificate_pem)?.validity()?;
        debug!(
            not_before = %validity.not_before(),
            not_after = %validity.not_after(),
            "certificate generated"
        );
    }

    save_key(&params.public_key_file, identity.certificate_pem_bytes())?;
    save_key(&params.private_key_file, identity.private_key_pem_bytes())?;

    info!(
        public_key_file = %params.public_key_file.display(),
        private_key_file = %params.private_key_file.display(),
        "key pair saved"
    );
    Ok(())
}
