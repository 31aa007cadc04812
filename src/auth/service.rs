use std::sync::Arc;

use time::OffsetDateTime;
use tokio::task;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::TokenIssuer,
        password::PasswordHasher,
        repo::{User, UserRepository},
    },
    error::{AuthError, RepoError},
};

/// Result of a successful register or login: the persisted account and a
/// freshly signed session token.
#[derive(Debug)]
pub struct AuthSuccess {
    pub user: User,
    pub token: String,
}

/// Orchestrates credential verification and token issuance. All
/// collaborators are injected at construction; the service itself holds no
/// mutable state.
#[derive(Clone)]
pub struct CredentialService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    offload_hashing: bool,
}

impl CredentialService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        offload_hashing: bool,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            offload_hashing,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthError> {
        if self.repo.find_by_email(email).await?.is_some() {
            warn!(email, "registration with already used email");
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = self.hash_password(password.to_owned()).await?;

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            password_hash,
            created_at: now,
            updated_at: now,
        };

        // Sign before the insert so a signing failure leaves no row behind.
        let token = self.tokens.issue(user.id, &user.email, None)?;

        let user = self.repo.insert(user).await.map_err(|e| match e {
            // lost the race against a concurrent registration
            RepoError::DuplicateEmail => AuthError::DuplicateAccount,
            other => AuthError::from(other),
        })?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(AuthSuccess { user, token })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthError> {
        let user = match self.repo.find_by_email(email).await? {
            Some(u) => u,
            None => {
                warn!(email, "login with unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .verify_password(password.to_owned(), user.password_hash.clone())
            .await
        {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.email, None)?;
        info!(user_id = %user.id, "user logged in");
        Ok(AuthSuccess { user, token })
    }

    /// Stateless by design: there is no revocation list, so issued tokens
    /// stay valid until their expiry passes.
    pub fn logout(&self) {
        debug!("logout");
    }

    pub async fn account(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    // Hashing is CPU-bound; when configured, run it off the request task so
    // it does not stall other in-flight requests.
    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        if self.offload_hashing {
            let hasher = self.hasher.clone();
            task::spawn_blocking(move || hasher.hash(&password))
                .await
                .map_err(|e| {
                    error!(error = %e, "hashing task failed");
                    AuthError::Hashing
                })?
        } else {
            self.hasher.hash(&password)
        }
    }

    async fn verify_password(&self, password: String, digest: String) -> bool {
        if self.offload_hashing {
            let hasher = self.hasher.clone();
            task::spawn_blocking(move || hasher.verify(&password, &digest))
                .await
                .unwrap_or_else(|e| {
                    error!(error = %e, "verification task failed");
                    false
                })
        } else {
            self.hasher.verify(&password, &digest)
        }
    }
}
