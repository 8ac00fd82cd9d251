use crate::domain::{DomainError, Identity};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub exp: usize,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Result<Self, DomainError> {
        tracing::debug!(
            "Initializing JwtService with secret length: {}",
            secret.len()
        );

        if secret.is_empty() {
            return Err(DomainError::InternalError(
                "JWT secret must not be empty".to_string(),
            ));
        }

        if secret.len() < 32 {
            tracing::warn!(
                "JWT secret is too short ({} chars). Minimum recommended is 32 chars.",
                secret.len()
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn generate_token(&self, user_id: i64, username: String) -> Result<String, DomainError> {
        tracing::debug!(
            "Generating token for user_id: {}, username: {}",
            user_id,
            username
        );

        let expiration = Utc::now()
            .checked_add_signed(Duration::hours(TOKEN_LIFETIME_HOURS))
            .ok_or_else(|| DomainError::InternalError("Token expiry overflow".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            user_id,
            username,
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {}", e);
            DomainError::InternalError(format!("Failed to generate token: {}", e))
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Identity, DomainError> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                tracing::debug!("Token verified for user_id: {}", token_data.claims.user_id);
                Ok(Identity {
                    user_id: token_data.claims.user_id,
                    username: token_data.claims.username,
                })
            }
            Err(e) => {
                tracing::debug!("Token verification failed: {}", e);
                Err(DomainError::Unauthorized(format!("Invalid token: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-test-secret-that-is-long-enough-123";

    #[test]
    fn issued_token_round_trips_identity() {
        let jwt = JwtService::new(SECRET).unwrap();
        let token = jwt.generate_token(42, "leo".to_string()).unwrap();

        let identity = jwt.verify_token(&token).unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.username, "leo");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new("another-secret-that-is-long-enough-456").unwrap();
        let token = issuer.generate_token(1, "leo".to_string()).unwrap();

        let verifier = JwtService::new(SECRET).unwrap();
        assert!(matches!(
            verifier.verify_token(&token),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtService::new(SECRET).unwrap();
        let claims = Claims {
            user_id: 1,
            username: "leo".to_string(),
            exp: (Utc::now().timestamp() - 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(jwt.verify_token(&token).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(JwtService::new("").is_err());
    }
}
