//! JWT key configuration.
//!
//! # Invariants
//! - `JwtConfig::Hs256` secrets are never empty.
//! - `JwtConfig::Rs256` public keys are valid PEM-encoded RSA public keys.

use jsonwebtoken::DecodingKey;

/// Error returned when JWT configuration is invalid.
#[derive(Debug)]
pub enum JwtConfigError {
    /// The HS256 secret is empty.
    EmptySecret,
    /// The RS256 public key is not a valid PEM-encoded RSA public key.
    InvalidRs256PublicKey(String),
}

impl std::fmt::Display for JwtConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "HS256 secret must not be empty"),
            Self::InvalidRs256PublicKey(reason) => {
                write!(f, "invalid RS256 public key: {reason}")
            }
        }
    }
}

impl std::error::Error for JwtConfigError {}

/// Key material used to verify request tokens.
#[derive(Debug, Clone)]
pub enum JwtConfig {
    /// HMAC-SHA256 with a shared secret.
    Hs256 { secret: Vec<u8> },
    /// RSA-SHA256 with a PEM-encoded public key.
    Rs256 { public_key: String },
}

impl JwtConfig {
    /// Create an HS256 configuration.
    ///
    /// # Errors
    /// Returns `JwtConfigError::EmptySecret` if the secret is empty.
    pub fn new_hs256(secret: Vec<u8>) -> Result<Self, JwtConfigError> {
        if secret.is_empty() {
            return Err(JwtConfigError::EmptySecret);
        }
        Ok(Self::Hs256 { secret })
    }

    /// Create an RS256 configuration, checking that the key parses.
    ///
    /// # Errors
    /// Returns `JwtConfigError::InvalidRs256PublicKey` if the key is not a valid RS256 PEM key.
    pub fn new_rs256(public_key: String) -> Result<Self, JwtConfigError> {
        DecodingKey::from_rsa_pem(public_key.as_bytes())
            .map_err(|e| JwtConfigError::InvalidRs256PublicKey(e.to_string()))?;
        Ok(Self::Rs256 { public_key })
    }

    /// Short algorithm name for logging.
    #[must_use]
    pub const fn algorithm_name(&self) -> &'static str {
        match self {
            Self::Hs256 { .. } => "HS256",
            Self::Rs256 { .. } => "RS256",
        }
    }
}
