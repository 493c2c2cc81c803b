//! Request authentication.
//!
//! Authentication is optional: when no key is configured every request is
//! accepted anonymously. When a key is configured, each request must carry a
//! valid JWT in its `token` query parameter.

pub mod jwt;
pub mod jwt_config;

pub use jwt::{JwtError, Principal, TokenVerifier};
pub use jwt_config::{JwtConfig, JwtConfigError};

/// Error returned when a request cannot be authenticated.
#[derive(Debug)]
pub enum AuthError {
    /// Authentication is required but no token was supplied.
    MissingToken,
    /// The supplied token did not verify.
    InvalidToken(JwtError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingToken => write!(f, "missing token"),
            Self::InvalidToken(e) => write!(f, "invalid token: {e}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingToken => None,
            Self::InvalidToken(e) => Some(e),
        }
    }
}

/// Authenticate a request.
///
/// Returns `Ok(None)` when no verifier is configured.
pub fn authenticate(
    verifier: Option<&TokenVerifier>,
    token: Option<&str>,
) -> Result<Option<Principal>, AuthError> {
    let Some(verifier) = verifier else {
        return Ok(None);
    };
    let token = token.ok_or(AuthError::MissingToken)?;
    verifier
        .verify(token)
        .map(Some)
        .map_err(AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::jwt::test_tokens::hs256_token;
    use super::*;

    const SECRET: &[u8] = b"auth-module-test-secret";

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(&JwtConfig::Hs256 {
            secret: SECRET.to_vec(),
        })
        .expect("verifier")
    }

    #[test]
    fn test_no_verifier_is_anonymous() {
        assert_eq!(authenticate(None, None).expect("anonymous"), None);
        assert_eq!(authenticate(None, Some("garbage")).expect("anonymous"), None);
    }

    #[test]
    fn test_missing_token() {
        let verifier = verifier();
        assert!(matches!(
            authenticate(Some(&verifier), None),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_valid_token() {
        let verifier = verifier();
        let token = hs256_token("uploader", SECRET);
        let principal = authenticate(Some(&verifier), Some(&token)).expect("authenticated");
        assert_eq!(
            principal,
            Some(Principal {
                subject: "uploader".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_token() {
        let verifier = verifier();
        let result = authenticate(Some(&verifier), Some("nope"));
        assert!(matches!(
            result,
            Err(AuthError::InvalidToken(JwtError::MalformedToken))
        ));
        assert_eq!(
            result.map(|_| ()).map_err(|e| e.to_string()),
            Err("invalid token: malformed JWT".to_string())
        );
    }
}
