use regex::Regex;
use sakebomb::cert::Certificate;
use sakebomb::generate::{GeneratedIdentity, KeyPolicy, generate_expiring_at};
use sakebomb::key::KeyPair;
use time::OffsetDateTime;

/// Whole-second instant, so that X.509's one-second resolution loses nothing.
pub fn whole_second_now() -> OffsetDateTime {
    OffsetDateTime::now_utc().replace_nanosecond(0).unwrap()
}

pub fn generate_at(not_before: OffsetDateTime, minutes: i64) -> GeneratedIdentity {
    generate_expiring_at(not_before, minutes, &KeyPolicy::default()).unwrap()
}

pub fn decode(identity: &GeneratedIdentity) -> (Certificate, KeyPair) {
    let cert = Certificate::from_pem(&identity.certificate_pem).unwrap();
    let key = KeyPair::import_from_pkcs8_pem(&identity.private_key_pem).unwrap();
    (cert, key)
}

/// Matches exactly one PEM block with the given label: base64 body lines of at
/// most 64 characters, LF line endings, trailing newline.
pub fn pem_block_regex(label: &str) -> Regex {
    Regex::new(&format!(
        r"\A-----BEGIN {label}-----\n([A-Za-z0-9+/=]{{1,64}}\n)+-----END {label}-----\n\z"
    ))
    .unwrap()
}
