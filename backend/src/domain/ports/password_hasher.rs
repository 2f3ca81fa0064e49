//! Port for hashing and verifying passwords.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashers.
    pub enum PasswordHasherError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Port for one-way password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Malformed hashes verify as `false`.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;
}
