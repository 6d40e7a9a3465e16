use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};

use crate::credentials::{ServiceAccountKeyFields, escape_private_key, render_credentials};
use crate::error::Result;
use crate::generate::generate_expiring;
use crate::iam::{KeyUploader, service_account_name};
use crate::sink::save_key;

pub const DEFAULT_CREDENTIALS_FILE: &str = "sake.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateParams {
    pub expiry_minutes: i64,
    pub project_id: String,
    pub sa_email: String,
    pub credentials_file: PathBuf,
}

/// Generates a key pair, registers the certificate with the service account
/// and writes the resulting credential file.
///
/// Fails on the first error; nothing is retried and no file is written
/// unless every step succeeded.
pub async fn handle(params: &CreateParams, uploader: &dyn KeyUploader) -> Result<()> {
    let identity = generate_expiring(params.expiry_minutes)?;

    let sa_name = service_account_name(&params.project_id, &params.sa_email);
    let public_key_data = STANDARD.encode(identity.certificate_pem_bytes());

    let key_id = uploader
        .upload_public_key(&sa_name, &public_key_data)
        .await?;
    debug!(%sa_name, %key_id, "public key uploaded");

    let client_id = uploader.service_account_unique_id(&sa_name).await?;

    let fields = ServiceAccountKeyFields::builder()
        .project_id(params.project_id.clone())
        .private_key_id(key_id.clone())
        .private_key(escape_private_key(&identity.private_key_pem))
        .client_email(params.sa_email.clone())
        .client_id(client_id)
        .build();

    save_key(&params.credentials_file, render_credentials(&fields).as_bytes())?;

    info!(
        %sa_name,
        %key_id,
        expiry_minutes = params.expiry_minutes,
        credentials_file = %params.credentials_file.display(),
        "service account key created"
    );
    Ok(())
}
