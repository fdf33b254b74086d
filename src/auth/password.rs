//! Password hashing with argon2id
//!
//! Hashes are PHC strings, so salt and cost parameters travel with the hash
//! and verification never needs the hasher's own settings.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{LaunchpadError, Result};

/// Salted one-way password hasher
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Hasher with argon2's recommended defaults
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with explicit cost parameters (memory in KiB, iterations, lanes)
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| LaunchpadError::ConfigError(format!("Invalid argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    /// Cheap parameters so test suites don't spend seconds per hash
    pub fn for_testing() -> Self {
        Self {
            params: Params::new(Params::MIN_M_COST.max(1024), 1, 1, None)
                .unwrap_or_default(),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| LaunchpadError::SystemError(format!("Failed to hash password: {}", e)))
    }

    /// True iff `plaintext` matches `hash`. Malformed hashes verify as false.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                log::debug!("Stored password hash is not a valid PHC string: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
