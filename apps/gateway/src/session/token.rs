use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Candidate,
    Recruiter,
}

/// Claims carried by a backend-issued session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account email.
    pub sub: String,
    pub user_id: String,
    pub role: Role,
    pub exp: i64,
}

/// Decodes session tokens into typed claims. The only place tokens are parsed.
///
/// With a shared secret the signature is verified; without one only the
/// structure and expiry are checked and the backend stays the authority.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    verifies_signature: bool,
}

impl TokenVerifier {
    pub fn new(secret: Option<&str>, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // Expiry is strict: no grace period past `exp`.
        validation.leeway = 0;
        let key = match secret {
            Some(secret) => DecodingKey::from_secret(secret.as_bytes()),
            None => {
                validation.insecure_disable_signature_validation();
                DecodingKey::from_secret(&[])
            }
        };
        Self {
            key,
            validation,
            verifies_signature: secret.is_some(),
        }
    }

    pub fn verifies_signature(&self) -> bool {
        self.verifies_signature
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}
