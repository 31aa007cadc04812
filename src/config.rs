use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
    pub offload_hashing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let algorithm: Algorithm = std::env::var("JWT_ALGORITHM")
            .unwrap_or_else(|_| "HS256".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid JWT_ALGORITHM: {e}"))?;
        // Tokens are signed with a shared secret, so only the HMAC family applies.
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            anyhow::bail!("JWT_ALGORITHM must be one of HS256, HS384, HS512");
        }

        let auth = AuthConfig {
            secret: std::env::var("JWT_SECRET")?,
            algorithm,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            offload_hashing: std::env::var("AUTH_OFFLOAD_HASHING")
                .ok()
                .map(|v| matches!(v.as_str(), "1" | "true"))
                .unwrap_or(true),
        };
        Ok(Self { database_url, auth })
    }
}
