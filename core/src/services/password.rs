//! Password hashing
//!
//! Hashes are stored as `base64(salt || sha256(salt || password))` with a
//! fresh 16-byte random salt per hash. Verification recomputes the digest
//! from the stored salt and compares in constant time; a malformed blob
//! verifies as a plain mismatch rather than an error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::errors::{DomainError, DomainResult};

const SALT_LENGTH: usize = 16;
const DIGEST_LENGTH: usize = 32;

/// Salted-hash password scheme
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash `password` under a fresh random salt
    pub fn hash(&self, password: &str) -> DomainResult<String> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| DomainError::internal(format!("system rng unavailable: {e}")))?;

        let digest = Self::digest(&salt, password);

        let mut blob = Vec::with_capacity(SALT_LENGTH + DIGEST_LENGTH);
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&digest);
        Ok(STANDARD.encode(blob))
    }

    /// Check `password` against a stored blob
    ///
    /// Malformed blobs never error, they just fail to verify.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(decoded) = STANDARD.decode(stored) else {
            return false;
        };
        if decoded.len() != SALT_LENGTH + DIGEST_LENGTH {
            return false;
        }
        let (salt, expected) = decoded.split_at(SALT_LENGTH);
        let computed = Self::digest(salt, password);
        constant_time_eq(&computed, expected)
    }

    fn digest(salt: &[u8], password: &str) -> [u8; DIGEST_LENGTH] {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new();
        let blob = hasher.hash("secret123").unwrap();
        assert!(hasher.verify("secret123", &blob));
        assert!(!hasher.verify("secret124", &blob));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash("secret123").unwrap();
        let b = hasher.hash("secret123").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("secret123", &a));
        assert!(hasher.verify("secret123", &b));
    }

    #[test]
    fn test_malformed_blob_fails_closed() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("secret123", "not base64 %%%"));
        assert!(!hasher.verify("secret123", &STANDARD.encode(b"too short")));
        assert!(!hasher.verify("secret123", ""));
    }

    #[test]
    fn test_blob_length_is_fixed() {
        let hasher = PasswordHasher::new();
        let blob = hasher.hash("p@ssw0rd").unwrap();
        let decoded = STANDARD.decode(blob).unwrap();
        assert_eq!(decoded.len(), SALT_LENGTH + DIGEST_LENGTH);
    }
}
