//! Password hashing.

use bcrypt::{BcryptError, DEFAULT_COST};

/// Hash a plaintext password.
///
/// bcrypt embeds a fresh random salt in every digest, so hashing the same
/// password twice yields different digests. The work factor is
/// `DEFAULT_COST`, fixed at deployment rather than exposed as a knob.
pub fn hash_password(plaintext: &str) -> Result<String, BcryptError> {
    bcrypt::hash(plaintext, DEFAULT_COST)
}

/// Check a plaintext password against a stored digest.
///
/// The comparison runs in constant time. A wrong password is `Ok(false)`;
/// `Err` means the digest itself could not be parsed, so callers can tell
/// corruption apart from a plain mismatch instead of reporting both as
/// bad credentials.
pub fn verify_password(plaintext: &str, digest: &str) -> Result<bool, BcryptError> {
    bcrypt::verify(plaintext, digest)
}
