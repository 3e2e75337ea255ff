use bcrypt::{DEFAULT_COST, hash, verify};

use crate::error::Result;

pub fn hash_password(password: &str) -> Result<String> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// Check a plaintext password against a stored hash.
///
/// A malformed hash counts as a mismatch rather than an error.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}
