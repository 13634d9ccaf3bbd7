use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfig {
    /// Domain-separation salt for reset tokens; keeps them unusable as
    /// session tokens even though both are signed with the same secret.
    pub salt: String,
    pub max_age_seconds: i64,
    /// Base URL embedded in the reset link sent to the user.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub static_dir: String,
    pub jwt: JwtConfig,
    pub reset: ResetConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutrilearn".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutrilearn-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let reset = ResetConfig {
            salt: std::env::var("RESET_TOKEN_SALT")
                .unwrap_or_else(|_| "password-reset-salt".into()),
            max_age_seconds: std::env::var("RESET_TOKEN_MAX_AGE_SECONDS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(3600),
            base_url: std::env::var("RESET_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
        };
        Ok(Self {
            database_url,
            static_dir,
            jwt,
            reset,
        })
    }
}
