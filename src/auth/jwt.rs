use std::time::Duration;

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::AuthConfig, error::AuthError};

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,     // account ID
    pub email: String, // account email
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
}

/// Signs and validates session tokens with a shared symmetric secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenIssuer {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            default_ttl: Duration::from_secs(cfg.ttl_minutes.max(0) as u64 * 60),
        }
    }

    /// Issue a token for `user_id`. Expiry is always `now + ttl` computed
    /// here; callers may override the duration but never set an absolute
    /// expiry themselves.
    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            email: email.to_owned(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding).map_err(|e| {
            warn!(error = %e, "jwt encode error");
            AuthError::TokenSigning
        })?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Decode and validate a token. Fails closed: anything other than a
    /// well-formed, correctly signed, unexpired token is rejected.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        // no leeway: a token issued with a zero TTL is already expired
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => {
                    warn!(error = %e, "jwt decode error");
                    AuthError::MalformedToken
                }
            }
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer_with_secret(secret: &str) -> TokenIssuer {
        TokenIssuer::from_config(&AuthConfig {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 5,
            offload_hashing: false,
        })
    }

    fn issuer() -> TokenIssuer {
        issuer_with_secret("test-secret")
    }

    #[test]
    fn issue_and_decode_roundtrip() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let token = issuer
            .issue(user_id, "a@x.com", None)
            .expect("issue token");
        let claims = issuer.decode(&token).expect("decode token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp, claims.iat + 5 * 60);
    }

    #[test]
    fn ttl_override_is_honored() {
        let issuer = issuer();
        let token = issuer
            .issue(Uuid::new_v4(), "a@x.com", Some(Duration::from_secs(600)))
            .expect("issue token");
        let claims = issuer.decode(&token).expect("decode token");
        assert_eq!(claims.exp, claims.iat + 600);
    }

    #[test]
    fn zero_ttl_token_expires() {
        let issuer = issuer();
        let token = issuer
            .issue(Uuid::new_v4(), "a@x.com", Some(Duration::ZERO))
            .expect("issue token");
        std::thread::sleep(Duration::from_secs(2));
        let err = issuer.decode(&token).unwrap_err();
        assert!(matches!(err, AuthError::ExpiredToken));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issuer_with_secret("secret-a")
            .issue(Uuid::new_v4(), "a@x.com", None)
            .expect("issue token");
        let err = issuer_with_secret("secret-b").decode(&token).unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = issuer();
        for token in ["", "not-a-token", "still.not.atoken"] {
            let err = issuer.decode(token).unwrap_err();
            assert!(matches!(err, AuthError::MalformedToken));
        }
    }
}
