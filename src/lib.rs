//! # SAKeBomb - Short-Lived Service Account Keys
//!
//! SAKeBomb creates service account keys that expire on their own. It
//! generates an RSA key pair, wraps the public key in a self-signed X.509
//! certificate valid for a given number of minutes, and either writes both
//! halves to disk or registers the certificate with Google Cloud IAM and writes
//! a ready-to-use credential file.
//!
//! Everything is built with the RustCrypto crates; there is no OpenSSL or ring
//! dependency.
//!
//! ## Certificate Policy
//!
//! Generated certificates are deliberately minimal:
//! - **Key**: RSA 2048, signed with sha256WithRSAEncryption
//! - **Subject and issuer**: `CN=unused` (self-issued)
//! - **Serial number**: 128 random bits from the operating system CSPRNG
//! - **Key usage**: digitalSignature, keyEncipherment
//! - **Extended key usage**: serverAuth
//! - **Basic constraints**: leaf (not a CA)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sakebomb::generate::generate_expiring;
//!
//! # fn main() -> Result<(), sakebomb::error::SakeError> {
//! // A key pair and certificate valid for the next five minutes
//! let identity = generate_expiring(5)?;
//!
//! println!("{}", identity.certificate_pem);
//! # Ok(())
//! # }
//! ```
//!
//! ### Inspecting the Result
//!
//! ```rust,no_run
//! use sakebomb::{cert::Certificate, generate::generate_expiring, key::KeyPair};
//! use time::{Duration, OffsetDateTime};
//!
//! # fn main() -> Result<(), sakebomb::error::SakeError> {
//! let identity = generate_expiring(5)?;
//!
//! let cert = Certificate::from_pem(&identity.certificate_pem)?;
//! let key = KeyPair::import_from_pkcs8_pem(&identity.private_key_pem)?;
//!
//! assert!(cert.is_self_issued());
//! assert_eq!(&cert.public_key()?, key.public_key());
//! assert!(!cert.is_valid_at(OffsetDateTime::now_utc() + Duration::minutes(6))?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use sakebomb::{cert::template::build_template, error::SakeError};
//! use time::OffsetDateTime;
//!
//! let now = OffsetDateTime::now_utc();
//! match build_template(now, now) {
//!     Err(SakeError::InvalidTimeRange { .. }) => println!("expiry must be after start"),
//!     Ok(_) => unreachable!(),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`generate`]: Expiry-bounded key and certificate generation
//! - [`cert`]: Certificate templates, encoding/decoding and inspection
//! - [`key`]: RSA key generation, PKCS#8 export and signing
//! - [`issuer`]: Self-signing
//! - [`tbs_certificate`]: Low-level certificate structure
//! - [`credentials`], [`iam`], [`sink`]: Credential file, IAM upload, file output
//! - [`config`], [`logging`], [`commands`]: Command line plumbing
//! - [`error`]: Error types

pub mod cert;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod generate;
pub mod iam;
pub mod issuer;
pub mod key;
pub mod logging;
pub mod pem_utils;
pub mod sink;
pub mod tbs_certificate;
