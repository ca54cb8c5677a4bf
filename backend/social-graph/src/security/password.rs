/// Credential hashing using Argon2id with configurable cost
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way credential hasher shared by all requests
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Fails when the cost parameters are outside what Argon2 accepts
    pub fn new(config: HashingConfig) -> Result<Self, argon2::Error> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh salt.
    /// Runs on the blocking pool; returns the PHC string for storage.
    pub async fn hash(&self, password: &str) -> ServiceResult<String> {
        let hasher = self.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {e}")))?
    }

    fn hash_blocking(&self, password: &str) -> ServiceResult<String> {
        let salt = SaltString::generate(rand::thread_rng());

        let password_hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| ServiceError::Internal("Failed to hash password".to_string()))?
            .to_string();

        Ok(password_hash)
    }

    /// Check a password against a stored PHC string
    pub fn verify(&self, password: &str, hash: &str) -> ServiceResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| ServiceError::Internal("Invalid password hash format".to_string()))?;

        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> CredentialHasher {
        CredentialHasher::new(HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("p").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("p", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_hash_is_salted() {
        let hasher = cheap_hasher();
        let first = hasher.hash("same").await.unwrap();
        let second = hasher.hash("same").await.unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_cost_is_encoded_in_hash_params() {
        let hasher = cheap_hasher();
        let hash = hasher.hash_blocking("p").unwrap();
        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    #[test]
    fn test_rejects_invalid_cost() {
        let config = HashingConfig {
            memory_kib: 1024,
            iterations: 0,
            parallelism: 1,
        };
        assert!(CredentialHasher::new(config).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(cheap_hasher().verify("p", "not-a-phc-string").is_err());
    }
}
