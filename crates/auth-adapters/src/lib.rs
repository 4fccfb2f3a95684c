//! # auth-adapters
//!
//! Argon2id implementation of [`domains::PasswordHasher`]. Used for account
//! passwords and board passwords alike.

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use domains::PasswordHasher;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

pub struct Argon2Hasher {
    params: Params,
    /// Server-side secret mixed into every hash. Changing it invalidates all
    /// stored hashes.
    pepper: Option<SecretString>,
}

impl Argon2Hasher {
    /// `memory_kib`, `iterations` and `parallelism` are the argon2 m/t/p costs.
    pub fn new(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
        pepper: Option<SecretString>,
    ) -> anyhow::Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
        Ok(Self { params, pepper })
    }

    fn argon2(&self) -> anyhow::Result<Argon2<'_>> {
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper.expose_secret().as_bytes(),
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
            .map_err(|e| anyhow!("invalid argon2 pepper: {e}")),
            None => Ok(Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )),
        }
    }
}

impl Default for Argon2Hasher {
    /// The argon2 crate's recommended costs, no pepper.
    fn default() -> Self {
        Self {
            params: Params::default(),
            pepper: None,
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    /// Salted argon2id PHC string.
    fn hash(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies if a provided password matches a stored hash. Malformed
    /// hashes never verify.
    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => {
                warn!("stored password hash is not a PHC string");
                return false;
            }
        };
        match self.argon2() {
            Ok(argon2) => argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}
