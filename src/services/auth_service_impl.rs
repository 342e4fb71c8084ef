//! `SeaORM` implementation of the `AuthService` trait.

use anyhow::Context;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task;
use tracing::{info, warn};

use crate::api::types::SignupResponse;
use crate::config::{AuthConfig, SecurityConfig};
use crate::constants::mail::CONFIRMATION_SUBJECT;
use crate::db::{Registration, Store};
use crate::domain::{Actor, validation};
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::notifier::Notifier;
use crate::services::token::TokenIssuer;

pub struct SeaOrmAuthService {
    store: Store,
    notifier: Arc<dyn Notifier>,
    tokens: TokenIssuer,
    auth: AuthConfig,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        notifier: Arc<dyn Notifier>,
        tokens: TokenIssuer,
        auth: AuthConfig,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            tokens,
            auth,
            security,
        }
    }

    async fn send_code(&self, email: &str, username: &str, code: &str) {
        let body = format!(
            "Hello {username},\n\nYour confirmation code is: {code}\n\nIt expires in {} minutes.",
            self.auth.confirmation_code_ttl_minutes
        );

        if let Err(e) = self.notifier.send(email, CONFIRMATION_SUBJECT, &body).await {
            warn!(
                event = "confirmation_delivery_failed",
                username = %username,
                error = %e,
                "Failed to deliver confirmation code"
            );
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, username: &str, email: &str) -> Result<SignupResponse, AuthError> {
        validation::username(username).map_err(AuthError::Validation)?;
        validation::email(email).map_err(AuthError::Validation)?;

        let user = match self.store.register_user(username, email).await? {
            Registration::Created(user) => {
                metrics::counter!("signups_total").increment(1);
                info!(event = "user_registered", user_id = user.id, username = %user.username, "User registered");
                user
            }
            Registration::Existing(user) => user,
            Registration::Mismatch => {
                return Err(AuthError::Conflict(
                    "The username or email is already used by a different account".to_string(),
                ));
            }
        };

        let code = generate_code(self.auth.confirmation_code_length);
        let code_hash = {
            let code = code.clone();
            let security = self.security.clone();
            task::spawn_blocking(move || hash_code(&code, &security))
                .await
                .context("Code hashing task panicked")??
        };

        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::minutes(self.auth.confirmation_code_ttl_minutes);
        self.store
            .replace_confirmation_code(
                user.id,
                code_hash,
                issued_at.to_rfc3339(),
                expires_at.to_rfc3339(),
            )
            .await?;

        self.send_code(&user.email, &user.username, &code).await;

        Ok(SignupResponse {
            username: user.username,
            email: user.email,
        })
    }

    async fn issue_token(&self, username: &str, code: &str) -> Result<String, AuthError> {
        if username.is_empty() {
            return Err(AuthError::Validation("username is required".to_string()));
        }
        if code.is_empty() {
            return Err(AuthError::Validation(
                "confirmation_code is required".to_string(),
            ));
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AuthError::NotFound(username.to_string()))?;

        let record = self
            .store
            .get_confirmation_code(user.id)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        if record.consumed_at.is_some() {
            return Err(AuthError::InvalidCode);
        }

        let expires_at = DateTime::parse_from_rfc3339(&record.expires_at)
            .context("Stored confirmation expiry is not RFC 3339")?;
        if Utc::now() >= expires_at {
            return Err(AuthError::InvalidCode);
        }

        let matches = {
            let code = code.to_string();
            let code_hash = record.code_hash.clone();
            task::spawn_blocking(move || verify_code(&code, &code_hash))
                .await
                .context("Code verification task panicked")??
        };
        if !matches {
            return Err(AuthError::InvalidCode);
        }

        // Loses to a concurrent redemption of the same code.
        if !self
            .store
            .consume_confirmation_code(record.id, Utc::now().to_rfc3339())
            .await?
        {
            return Err(AuthError::InvalidCode);
        }

        self.store.mark_user_confirmed(user.id).await?;

        let token = self
            .tokens
            .issue(user.id, &user.username)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))?;

        metrics::counter!("tokens_issued_total").increment(1);
        info!(event = "token_issued", user_id = user.id, "Access token issued");

        Ok(token)
    }

    async fn authenticate(&self, token: &str) -> Result<Actor, AuthError> {
        let claims = self.tokens.verify(token).ok_or(AuthError::Unauthorized)?;
        let user_id = claims.user_id().ok_or(AuthError::Unauthorized)?;

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        Ok(Actor::Authenticated(user.principal()))
    }
}

fn generate_code(length: usize) -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn hash_code(code: &str, security: &SecurityConfig) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        security.argon2_memory_cost_kib,
        security.argon2_time_cost,
        security.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(code.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash confirmation code: {e}"))?;

    Ok(hash.to_string())
}

/// The parameters are read back from the PHC string, so codes hashed under
/// older settings still verify.
fn verify_code(code: &str, code_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(code_hash)
        .map_err(|e| anyhow::anyhow!("Invalid code hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(code.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn test_generate_code_is_alphanumeric() {
        let code = generate_code(12);
        assert_eq!(code.len(), 12);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(code, generate_code(12));
    }

    #[test]
    fn test_code_hash_verifies_only_the_original() {
        let hash = hash_code("ABCdef123456", &cheap()).unwrap();
        assert!(!hash.contains("ABCdef123456"));
        assert!(verify_code("ABCdef123456", &hash).unwrap());
        assert!(!verify_code("ABCdef123457", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_code("x", "not-a-phc-string").is_err());
    }
}
