pub(crate) use crate::auth::dto::{Claims, JwtKeys};
use crate::auth::dto::RegisterForm;
use crate::config::JwtConfig;
use crate::state::AppState;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, EncodingKey, DecodingKey, Header, Validation};
use rand::rngs::OsRng;
use std::time::Duration;
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error};

/// Minimum password length accepted at registration, in bytes.
pub const MIN_PASSWORD_LEN: usize = 12;

/// Same answer for an unknown user and a wrong password.
pub const INVALID_CREDENTIALS: &str = "Nom d'utilisateur ou mot de passe incorrect";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Checks a registration form in the order the page reports problems.
/// The duplicate check needs the store and happens afterwards.
pub fn validate_registration(form: &RegisterForm) -> Result<(), &'static str> {
    if form.username.is_empty()
        || form.email.is_empty()
        || form.password.is_empty()
        || form.confirm_password.is_empty()
    {
        return Err("Tous les champs sont requis");
    }
    if form.password != form.confirm_password {
        return Err("Les mots de passe ne correspondent pas");
    }
    if form.password.len() < MIN_PASSWORD_LEN {
        return Err("Le mot de passe doit contenir au moins 12 caractères");
    }
    Ok(())
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(1) as u64) * 60),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from(&state.config.jwt)
    }
}

impl JwtKeys {
    /// Signs a token for the user, valid for the configured TTL.
    pub fn issue(&self, user_id: i64, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            user_id,
            username: username.to_owned(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            }
        })?;
        debug!(user_id = data.claims.user_id, "jwt verified");
        Ok(data.claims)
    }

    /// When a token issued now stops being accepted.
    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc() + TimeDuration::seconds(self.ttl.as_secs() as i64)
    }
}



#[cfg(test)]
mod jwt_tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from(&JwtConfig {
            secret: secret.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60 * 24,
        })
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(7, "alice").expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let token = make_keys("secret-a").issue(1, "alice").expect("issue");
        let err = make_keys("secret-b").verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn rejects_expired_token() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            user_id: 1,
            username: "alice".into(),
            iat: now - 3 * 3600,
            exp: now - 2 * 3600,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(matches!(keys.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn rejects_malformed_token() {
        let keys = make_keys("dev-secret");
        assert!(matches!(keys.verify("not.a.jwt"), Err(TokenError::Invalid(_))));
        assert!(matches!(keys.verify(""), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_wrong_audience() {
        let keys = make_keys("dev-secret");
        let mut other = make_keys("dev-secret");
        other.audience = "someone-else".into();
        let token = other.issue(1, "alice").unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
