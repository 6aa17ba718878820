//! Argon2id password hashing in PHC string format.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash as PhcHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

/// Hashes passwords with Argon2id and a random 16-byte salt per hash.
///
/// Verification reads the algorithm parameters from the stored PHC string,
/// so hashes produced with other parameters still verify.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2PasswordHasher {
    /// Use explicit cost parameters, e.g. cheaper ones in tests.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn engine(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let encoded = self
            .engine()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(PasswordHash::new(encoded.to_string()))
    }

    fn verify(&self, password: &Password, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let parsed = PhcHash::new(hash.as_ref())
            .map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
        match self
            .engine()
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::malformed_hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("valid test params");
        Argon2PasswordHasher::with_params(params)
    }

    fn password(raw: &str) -> Password {
        Password::unchecked(raw.to_owned())
    }

    #[rstest]
    fn hash_verifies_the_original_password(hasher: Argon2PasswordHasher) {
        let hash = hasher.hash(&password("correct horse")).expect("hashed");

        assert!(hash.as_ref().starts_with("$argon2id$"));
        assert!(hasher.verify(&password("correct horse"), &hash).expect("verified"));
    }

    #[rstest]
    fn wrong_password_does_not_verify(hasher: Argon2PasswordHasher) {
        let hash = hasher.hash(&password("correct horse")).expect("hashed");

        assert!(!hasher.verify(&password("battery staple"), &hash).expect("verified"));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Argon2PasswordHasher) {
        let first = hasher.hash(&password("same secret")).expect("hashed");
        let second = hasher.hash(&password("same secret")).expect("hashed");

        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hash_is_an_error(hasher: Argon2PasswordHasher) {
        let error = hasher
            .verify(&password("anything"), &PasswordHash::new("not-a-phc-string"))
            .expect_err("malformed");

        assert!(matches!(error, PasswordHashError::MalformedHash { .. }));
    }
}
