/// Password Hashing and Verification
///
/// Wraps bcrypt with the crate-default cost. Every digest carries its own
/// random salt, so hashing the same password twice yields different
/// strings and a digest is verifiable on its own.

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::AppError;

lazy_static! {
    // Digest verified against when a login names an unknown account, so
    // that path costs the same as a real verification.
    static ref FALLBACK_HASH: String =
        hash("gatehouse-fallback-password", DEFAULT_COST).unwrap();
}

/// Hash a password using bcrypt with a fresh random salt
///
/// # Errors
/// Returns error if bcrypt hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored digest
///
/// A digest that bcrypt cannot parse counts as a mismatch rather than an
/// error: callers treat every failure as bad credentials.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match verify(password, digest) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!("Stored password digest did not parse: {}", e);
            false
        }
    }
}

/// Burn one bcrypt verification against a fixed digest
///
/// Called on the unknown-account path so response timing does not reveal
/// whether an identifier exists.
pub fn verify_against_fallback(password: &str) {
    let _ = verify_password(password, &FALLBACK_HASH);
}
