//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cipher::SubjectCipher;
use crate::error::AuthError;

/// Default token lifetime (1 hour)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: base64 of the encrypted decimal user ID
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    cipher: SubjectCipher,
    token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, cipher: SubjectCipher, token_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            cipher,
            token_ttl: Duration::seconds(token_ttl_secs),
        }
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + self.token_ttl;

        let claims = Claims {
            sub: self.cipher.encrypt_user_id(user_id)?,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Generating token for user: {}", user_id);

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate a JWT token and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        // Check expiration
        let now = Utc::now().timestamp();
        if token_data.claims.exp < now {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Recover the user ID from validated claims
    pub fn user_id_from_claims(&self, claims: &Claims) -> Result<i64, AuthError> {
        self.cipher
            .decrypt_user_id(&claims.sub)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Validate a token and resolve it to the user ID it was issued for
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        let claims = self.validate_token(token)?;
        self.user_id_from_claims(&claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(ttl: i64) -> JwtManager {
        JwtManager::new("test-secret-key", SubjectCipher::new("test-encryption-key"), ttl)
    }

    #[test]
    fn test_token_generation_and_validation() {
        let manager = manager(DEFAULT_TOKEN_TTL_SECS);

        let token = manager.generate_token(17).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
        assert_ne!(claims.sub, "17");
        assert_eq!(manager.user_id_from_claims(&claims).unwrap(), 17);
        assert_eq!(manager.verify(&token).unwrap(), 17);
    }

    #[test]
    fn test_invalid_token() {
        let manager = manager(DEFAULT_TOKEN_TTL_SECS);

        let result = manager.validate_token("invalid-token");
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let token = manager(-120).generate_token(3).unwrap();

        let result = manager(DEFAULT_TOKEN_TTL_SECS).validate_token(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_wrong_signing_secret() {
        let token = manager(DEFAULT_TOKEN_TTL_SECS).generate_token(3).unwrap();
        let other = JwtManager::new(
            "another-secret",
            SubjectCipher::new("test-encryption-key"),
            DEFAULT_TOKEN_TTL_SECS,
        );

        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_wrong_subject_key() {
        let token = manager(DEFAULT_TOKEN_TTL_SECS).generate_token(3).unwrap();
        let other = JwtManager::new(
            "test-secret-key",
            SubjectCipher::new("another-encryption-key"),
            DEFAULT_TOKEN_TTL_SECS,
        );

        // Signature is fine, subject does not decrypt
        assert!(other.validate_token(&token).is_ok());
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }
}
