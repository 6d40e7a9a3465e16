//! Command handlers behind the `sakebomb` binary.

pub mod create;
pub mod generate;

/// Validity of generated keys when `--expiry-time` is not given.
pub const DEFAULT_EXPIRY_MINUTES: i64 = 5;
