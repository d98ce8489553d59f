use serde::Deserialize;

/// Name of the cookie holding the signed identity token.
pub const TOKEN_COOKIE: &str = "token_form";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub secure_cookies: bool,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "forum".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "forum-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(60 * 24),
        };
        let secure_cookies = std::env::var("FORUM_SECURE_COOKIES")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        let static_dir = std::env::var("FORUM_STATIC_DIR").unwrap_or_else(|_| "static".into());
        Ok(Self {
            database_url,
            jwt,
            secure_cookies,
            static_dir,
        })
    }
}
