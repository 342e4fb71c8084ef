//! HS256 access tokens. Nothing about an issued token is persisted; a token
//! is valid as long as its signature checks out and it has not expired.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    #[must_use]
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &[u8], ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(
        &self,
        user_id: i32,
        username: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Returns `None` for a malformed, forged or expired token.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .ok()
            .map(|data| data.claims)
    }
}

/// A random secret for runs that configure none. Tokens signed with it die
/// with the process.
#[must_use]
pub fn ephemeral_secret() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_then_verify() {
        let issuer = TokenIssuer::new(SECRET, 60);
        let token = issuer.issue(42, "alice").unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenIssuer::new(SECRET, 60).issue(1, "alice").unwrap();
        let other = TokenIssuer::new(b"another-secret-another-secret-xx", 60);
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Default validation allows 60s of leeway.
        let issuer = TokenIssuer::new(SECRET, -5);
        let token = issuer.issue(1, "alice").unwrap();
        assert!(issuer.verify(&token).is_none());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let issuer = TokenIssuer::new(SECRET, 60);
        assert!(issuer.verify("not.a.jwt").is_none());
        assert!(issuer.verify("").is_none());
    }

    #[test]
    fn test_ephemeral_secret_is_long_enough() {
        let secret = ephemeral_secret();
        assert_eq!(secret.len(), 64);
        assert_ne!(secret, ephemeral_secret());
    }
}
