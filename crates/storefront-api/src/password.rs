use sha2::{Digest, Sha256};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Unsalted SHA-256, hex-encoded. Login matches on this digest directly, so
/// it must stay deterministic.
// TODO: move to a salted slow hash (argon2) together with a login path that
// verifies instead of comparing digests in SQL; existing rows need rehashing.
pub fn digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
