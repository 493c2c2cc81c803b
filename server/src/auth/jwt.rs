//! Request token verification.
//!
//! The verifier prepares its decoding key and validation rules once, at
//! startup, and is then shared by every request.
//!
//! # Post-conditions
//! - On success, the principal's subject is the non-empty `sub` claim.
//! - Tokens without an `exp` claim are rejected.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use super::JwtConfig;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
}

/// Error returned when token verification fails.
#[derive(Debug)]
pub enum JwtError {
    /// The signature does not match the configured key.
    InvalidSignature,
    /// The token has expired.
    TokenExpired,
    /// The token is malformed or its claims cannot be parsed.
    MalformedToken,
    /// A required claim is missing or empty.
    MissingClaim(String),
    /// The decoding key could not be built from the configuration.
    InvalidKey(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "invalid JWT signature"),
            Self::TokenExpired => write!(f, "JWT has expired"),
            Self::MalformedToken => write!(f, "malformed JWT"),
            Self::MissingClaim(claim) => write!(f, "missing '{claim}' claim in JWT"),
            Self::InvalidKey(reason) => write!(f, "invalid key: {reason}"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Verifies request tokens against one configured key.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    algorithm_name: &'static str,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &self.algorithm_name)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Build a verifier from key configuration.
    pub fn new(config: &JwtConfig) -> Result<Self, JwtError> {
        let (key, algorithm) = match config {
            JwtConfig::Hs256 { secret } => {
                if secret.is_empty() {
                    return Err(JwtError::InvalidKey("secret must be non-empty".to_string()));
                }
                (DecodingKey::from_secret(secret), Algorithm::HS256)
            }
            JwtConfig::Rs256 { public_key } => (
                DecodingKey::from_rsa_pem(public_key.as_bytes())
                    .map_err(|e| JwtError::InvalidKey(e.to_string()))?,
                Algorithm::RS256,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            key,
            validation,
            algorithm_name: config.algorithm_name(),
        })
    }

    /// Verify a token and return the caller it identifies.
    pub fn verify(&self, token: &str) -> Result<Principal, JwtError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(map_jwt_error)?;
        if data.claims.sub.is_empty() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }
        Ok(Principal {
            subject: data.claims.sub,
        })
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> JwtError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.to_owned()),
        _ => JwtError::MalformedToken,
    }
}

#[cfg(test)]
pub mod test_tokens {
    //! Token minting for tests.

    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        exp: Option<u64>,
    }

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }

    fn mint(sub: &str, exp: Option<u64>, secret: &[u8]) -> String {
        #[allow(clippy::expect_used)]
        encode(
            &Header::default(),
            &TestClaims { sub, exp },
            &EncodingKey::from_secret(secret),
        )
        .expect("failed to create test token")
    }

    /// An HS256 token valid for an hour.
    #[must_use]
    pub fn hs256_token(sub: &str, secret: &[u8]) -> String {
        mint(sub, Some(now() + 3600), secret)
    }

    /// An HS256 token that expired an hour ago.
    #[must_use]
    pub fn expired_hs256_token(sub: &str, secret: &[u8]) -> String {
        mint(sub, Some(now().saturating_sub(3600)), secret)
    }

    /// An HS256 token without an `exp` claim.
    #[must_use]
    pub fn non_expiring_hs256_token(sub: &str, secret: &[u8]) -> String {
        mint(sub, None, secret)
    }
}
