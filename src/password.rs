//! Password hashing with bcrypt.
//!
//! A mismatching password is a normal outcome (`Ok(false)`), not an error;
//! errors are reserved for internal hashing failures and malformed stored
//! hashes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to hash password")]
    Hashing(#[source] bcrypt::BcryptError),
    #[error("stored password hash is malformed")]
    Verification(#[source] bcrypt::BcryptError),
}

/// Derive a salted bcrypt hash at the default cost.
///
/// # Errors
/// Returns [`Error::Hashing`] on internal failure.
pub fn hash(plaintext: &str) -> Result<String, Error> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST).map_err(Error::Hashing)
}

/// Compare `plaintext` against a stored hash.
///
/// # Errors
/// Returns [`Error::Verification`] only when the stored hash cannot be
/// parsed; a wrong password is `Ok(false)`.
pub fn verify(hashed: &str, plaintext: &str) -> Result<bool, Error> {
    bcrypt::verify(plaintext, hashed).map_err(Error::Verification)
}
