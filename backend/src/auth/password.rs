//! Password hashing and verification using Argon2
//!
//! New credentials are always hashed with Argon2id into a PHC string. Stored
//! values in the older unsalted Base64 SHA-256 format still verify, and are
//! reported by [`needs_rehash`] so login can upgrade them.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use crate::domain::errors::{DomainError, DomainResult};

const SHA256_LEN: usize = 32;

/// Hash a password using Argon2id with a fresh random salt
pub fn hash_password(password: &str) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::Internal(anyhow::anyhow!("Failed to hash password: {e}")))
}

/// Unsalted Base64(SHA-256) digest used by imported credentials
pub fn legacy_digest(password: &str) -> String {
    STANDARD.encode(Sha256::digest(password.as_bytes()))
}

/// Check `candidate` against a stored hash in either supported format
pub fn verify_password(stored: &str, candidate: &str) -> DomainResult<bool> {
    if is_legacy_digest(stored) {
        return Ok(legacy_digest(candidate) == stored);
    }

    let parsed = PasswordHash::new(stored).map_err(|e| {
        DomainError::Internal(anyhow::anyhow!("Invalid password hash format: {e}"))
    })?;

    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}

/// True when the stored value should be replaced by an Argon2 hash
pub fn needs_rehash(stored: &str) -> bool {
    is_legacy_digest(stored)
}

fn is_legacy_digest(stored: &str) -> bool {
    !stored.starts_with('$')
        && STANDARD
            .decode(stored)
            .map(|bytes| bytes.len() == SHA256_LEN)
            .unwrap_or(false)
}
