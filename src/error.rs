//! use sakebomb::error::SakeError;

use thiserror::Error;
use time::OffsetDateTime;

/// Represents errors that can occur while generating, encoding, uploading or
/// saving a short-lived key.
///
/// Core generation errors carry enough context to be shown to a user as is;
/// collaborator errors (upload, file write) say which stage failed.
#[derive(Debug, Error, Clone)]
pub enum SakeError {
    /// The requested validity window is empty or inverted.
    #[error("Invalid time range: notAfter ({not_after}) must be after notBefore ({not_before})")]
    InvalidTimeRange {
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    },

    /// Error during key generation, including failure of the entropy source.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error related to certificate signing or verification.
    #[error("Certificate error: {0}")]
    CertificateError(String),

    /// Error returned by the cloud identity service.
    #[error("Upload error: {0}")]
    UploadError(String),

    /// Error writing an artifact to disk.
    #[error("Failed to write {path}: {reason}")]
    WriteError { path: String, reason: String },

    /// Error due to invalid configuration or arguments.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, SakeError>;

impl From<der::Error> for SakeError {
    /// Converts a `der::Error` into a `SakeError`.
    fn from(err: der::Error) -> Self {
        SakeError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for SakeError {
    fn from(err: rsa::Error) -> Self {
        SakeError::KeyGenerationError(err.to_string())
    }
}

impl From<pem::PemError> for SakeError {
    fn from(err: pem::PemError) -> Self {
        SakeError::DecodingError(err.to_string())
    }
}

impl From<reqwest::Error> for SakeError {
    fn from(err: reqwest::Error) -> Self {
        SakeError::UploadError(err.to_string())
    }
}
