//! Argon2id password hashing.
//!
//! Cost parameters come from configuration and are recorded in every PHC
//! string, so hashes made under older settings still verify. The optional
//! pepper is a server-side secret mixed into every hash and never stored.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use quill_core::ports::{AuthError, PasswordService};

/// Argon2id cost parameters and pepper.
#[derive(Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub pepper: Option<String>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
            pepper: None,
        }
    }
}

impl std::fmt::Debug for PasswordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordConfig")
            .field("memory_kib", &self.memory_kib)
            .field("iterations", &self.iterations)
            .field("parallelism", &self.parallelism)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Argon2id password service; every hash carries its own random salt.
pub struct Argon2PasswordService {
    params: Params,
    pepper: Option<Vec<u8>>,
}

impl Argon2PasswordService {
    /// Validate `config` and build the service.
    pub fn new(config: &PasswordConfig) -> Result<Self, AuthError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AuthError::InvalidParameters(e.to_string()))?;

        tracing::debug!(
            memory_kib = config.memory_kib,
            iterations = config.iterations,
            parallelism = config.parallelism,
            peppered = config.pepper.is_some(),
            "Password hashing configured"
        );

        Ok(Self {
            params,
            pepper: config.pepper.as_ref().map(|p| p.as_bytes().to_vec()),
        })
    }

    fn argon2(&self) -> Result<Argon2<'_>, AuthError> {
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper,
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
            .map_err(|e| AuthError::InvalidParameters(e.to_string())),
            None => Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())),
        }
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap(pepper: Option<&str>) -> Argon2PasswordService {
        Argon2PasswordService::new(&PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            pepper: pepper.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn test_hash_records_configured_cost() {
        let service = cheap(None);

        let hash = service.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(service.verify("correct horse", &hash).unwrap());
        assert!(!service.verify("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_hash_never_contains_plaintext_and_is_salted() {
        let service = cheap(None);

        let first = service.hash("hunter22hunter22").unwrap();
        let second = service.hash("hunter22hunter22").unwrap();

        assert!(!first.contains("hunter22"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_pepper_must_match_to_verify() {
        let peppered = cheap(Some("server-side-pepper"));
        let hash = peppered.hash("correct horse").unwrap();

        assert!(peppered.verify("correct horse", &hash).unwrap());
        assert!(!cheap(None).verify("correct horse", &hash).unwrap());
        assert!(!cheap(Some("other-pepper")).verify("correct horse", &hash).unwrap());
    }

    #[test]
    fn test_hashes_from_older_settings_still_verify() {
        let old = cheap(None).hash("correct horse").unwrap();
        let current = Argon2PasswordService::new(&PasswordConfig {
            memory_kib: 2048,
            iterations: 2,
            ..PasswordConfig::default()
        })
        .unwrap();

        assert!(current.verify("correct horse", &old).unwrap());
    }

    #[test]
    fn test_rejects_impossible_parameters() {
        let config = PasswordConfig {
            memory_kib: 1,
            ..PasswordConfig::default()
        };

        assert!(matches!(
            Argon2PasswordService::new(&config),
            Err(AuthError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_pepper_is_redacted_in_debug_output() {
        let config = PasswordConfig {
            pepper: Some("server-side-pepper".to_string()),
            ..PasswordConfig::default()
        };

        assert!(!format!("{config:?}").contains("server-side-pepper"));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let result = cheap(None).verify("password", "not-a-phc-string");

        assert!(matches!(result, Err(AuthError::HashingError(_))));
    }
}
