use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version, ARGON2ID_IDENT,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::error::AuthError;

/// Stateless Argon2id hasher. Cost parameters are fixed at construction; the
/// per-call salt lives inside the produced PHC string.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    params: Params,
}

impl PasswordHasher {
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone()),
            params,
        }
    }

    pub fn hash(&self, plain: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                AuthError::Hashing
            })?
            .to_string();
        Ok(digest)
    }

    /// A malformed digest verifies as false rather than erroring, so callers
    /// cannot tell a corrupt stored digest apart from a wrong password.
    pub fn verify(&self, plain: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "malformed password digest");
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// True when `digest` was not produced by the current algorithm and cost
    /// parameters. Legacy digests still verify; this only flags them so a
    /// caller may migrate them on a successful login.
    pub fn needs_rehash(&self, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(p) => p,
            Err(_) => return true,
        };
        if parsed.algorithm != ARGON2ID_IDENT {
            return true;
        }
        match Params::try_from(&parsed) {
            Ok(params) => {
                params.m_cost() != self.params.m_cost()
                    || params.t_cost() != self.params.t_cost()
                    || params.p_cost() != self.params.p_cost()
            }
            Err(_) => true,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::new(Params::new(8, 1, 1, None).expect("valid params"))
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = cheap_hasher();
        let password = "Secur3P@ssw0rd!";
        let digest = hasher.hash(password).expect("hashing should succeed");
        assert!(hasher.verify(password, &digest));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = cheap_hasher();
        let digest = hasher
            .hash("correct-horse-battery-staple")
            .expect("hashing should succeed");
        assert!(!hasher.verify("wrong-password", &digest));
    }

    #[test]
    fn verify_rejects_digest_of_other_password() {
        let hasher = cheap_hasher();
        let digest = hasher.hash("first-password").expect("hashing should succeed");
        let other = hasher.hash("second-password").expect("hashing should succeed");
        assert_ne!(digest, other);
        assert!(!hasher.verify("first-password", &other));
    }

    #[test]
    fn verify_returns_false_on_malformed_digest() {
        let hasher = cheap_hasher();
        assert!(!hasher.verify("anything", "not-a-valid-hash"));
        assert!(!hasher.verify("anything", ""));
    }

    #[test]
    fn long_passwords_are_tolerated() {
        let hasher = cheap_hasher();
        let long = "x".repeat(10_000);
        let digest = hasher.hash(&long).expect("long input should hash");
        assert!(hasher.verify(&long, &digest));
        assert!(!hasher.verify(&long[..9_999], &digest));
    }

    #[test]
    fn salts_differ_between_calls() {
        let hasher = cheap_hasher();
        let a = hasher.hash("same-password").expect("hash");
        let b = hasher.hash("same-password").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn needs_rehash_flags_foreign_and_stale_digests() {
        let hasher = cheap_hasher();
        let digest = hasher.hash("some-password").expect("hash");
        assert!(!hasher.needs_rehash(&digest));

        // bcrypt-shaped digest from a legacy system
        assert!(hasher.needs_rehash("$2b$12$abcdefghijklmnopqrstuvwxyz012345678901234567890123456"));
        assert!(hasher.needs_rehash("garbage"));

        let stronger = PasswordHasher::new(Params::new(16, 2, 1, None).expect("valid params"));
        assert!(stronger.needs_rehash(&digest));
        // stale digests still verify, they are only flagged
        assert!(stronger.verify("some-password", &digest));
    }
}
