//! Bearer tokens for authenticated users
//!
//! Tokens are HS256 JWTs. Issuer and audience come from configuration and
//! are checked on every verification.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::domain::errors::{DomainError, DomainResult};

/// Payload stored in an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub iss: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    pub fn user_id(&self) -> DomainResult<i64> {
        self.sub
            .parse()
            .map_err(|_| DomainError::Unauthorized("Invalid token subject".to_string()))
    }
}

/// Signs and verifies access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    expiry_seconds: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, issuer: &str, audience: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            expiry_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_issuer,
            &config.jwt_audience,
            config.jwt_expiry_seconds,
        )
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_seconds
    }

    /// Issue a token for the given user
    pub fn issue(&self, user_id: i64, username: &str) -> DomainResult<String> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now + self.expiry_seconds,
        };
        self.sign(&claims)
    }

    /// Decode a token, checking signature, expiry, issuer and audience
    pub fn verify(&self, token: &str) -> DomainResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                use jsonwebtoken::errors::ErrorKind;
                debug!("Rejected access token: {}", err);
                let message = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => "Token not issued for this service",
                    _ => "Invalid token",
                };
                DomainError::Unauthorized(message.to_string())
            })
    }

    fn sign(&self, claims: &Claims) -> DomainResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| DomainError::Internal(anyhow::anyhow!("Failed to sign token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, "breeding-tracker", "breeding-tracker-clients", 3600)
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let token = issuer.issue(42, "ada").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let token = issuer().issue(1, "ada").unwrap();
        let other = TokenIssuer::new(SECRET, "breeding-tracker", "someone-else", 3600);

        assert!(matches!(other.verify(&token), Err(DomainError::Unauthorized(_))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue(1, "ada").unwrap();
        let other = TokenIssuer::new(
            "another-secret-that-is-also-long-enough",
            "breeding-tracker",
            "breeding-tracker-clients",
            3600,
        );

        assert!(other.verify(&token).is_err());
        assert!(issuer().verify("not.a.token").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp() as u64;
        let token = issuer
            .sign(&Claims {
                sub: "1".to_string(),
                username: "ada".to_string(),
                iss: "breeding-tracker".to_string(),
                aud: "breeding-tracker-clients".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        match issuer.verify(&token) {
            Err(DomainError::Unauthorized(message)) => assert_eq!(message, "Token expired"),
            other => panic!("expected expiry error, got {:?}", other),
        }
    }
}
