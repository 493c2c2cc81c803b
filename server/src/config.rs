//! Server configuration module.
//!
//! This module provides configuration loading for the sheetquery server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `SHEETQUERY_LISTEN_HOST`: Address to bind (default: `127.0.0.1`)
//! - `SHEETQUERY_LISTEN_PORT`: Port to listen on (default: `3000`)
//! - `SHEETQUERY_SEED_FILE`: JSON array of documents loaded at startup (optional)
//! - `SHEETQUERY_FIELD_TYPES`: Field type declarations, e.g. `Revenue:numeric,Code:string` (optional)
//! - `SHEETQUERY_STORE_TIMEOUT_MS`: Timeout applied to every storage call (default: `10000`)
//! - `SHEETQUERY_JWT_SECRET`: HS256 secret; enables token checks (optional)
//! - `SHEETQUERY_JWT_PUBLIC_KEY`: RS256 PEM public key; enables token checks (optional)
//!
//! # Invariants
//!
//! - At most one of the JWT variables is set.
//! - `store_timeout` is never zero.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::JwtConfig;
use crate::filter::FieldTypeRegistry;

const LISTEN_HOST: &str = "SHEETQUERY_LISTEN_HOST";
const LISTEN_PORT: &str = "SHEETQUERY_LISTEN_PORT";
const SEED_FILE: &str = "SHEETQUERY_SEED_FILE";
const FIELD_TYPES: &str = "SHEETQUERY_FIELD_TYPES";
const STORE_TIMEOUT_MS: &str = "SHEETQUERY_STORE_TIMEOUT_MS";
const JWT_SECRET: &str = "SHEETQUERY_JWT_SECRET";
const JWT_PUBLIC_KEY: &str = "SHEETQUERY_JWT_PUBLIC_KEY";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub listen_host: IpAddr,
    /// Port to listen on for HTTP connections.
    pub listen_port: u16,
    /// Documents to load into the store at startup.
    pub seed_file: Option<PathBuf>,
    /// Explicit field types; undeclared fields use the name heuristic.
    pub field_types: FieldTypeRegistry,
    /// Timeout applied to every storage call.
    pub store_timeout: Duration,
    /// Token verification key. `None` disables authentication.
    pub jwt: Option<JwtConfig>,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
    /// Two environment variables may not be set together.
    Conflict { first: String, second: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
            Self::Conflict { first, second } => {
                write!(f, "{first} and {second} cannot both be set")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(name: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: message.into(),
    }
}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Default bind address.
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    /// Default storage timeout in milliseconds.
    pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 10_000;

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load configuration from a map of variables.
    ///
    /// Empty values are treated as unset.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let listen_host = get(LISTEN_HOST)
            .unwrap_or(Self::DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| invalid(LISTEN_HOST, e.to_string()))?;

        let listen_port = match get(LISTEN_PORT) {
            Some(value) => value
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| {
                    invalid(
                        LISTEN_PORT,
                        format!("'{value}' is not a valid port number (must be 1-65535)"),
                    )
                })?,
            None => Self::DEFAULT_PORT,
        };

        let seed_file = get(SEED_FILE).map(PathBuf::from);

        let field_types = match get(FIELD_TYPES) {
            Some(value) => {
                FieldTypeRegistry::parse(value).map_err(|e| invalid(FIELD_TYPES, e.to_string()))?
            }
            None => FieldTypeRegistry::new(),
        };

        let store_timeout_ms = match get(STORE_TIMEOUT_MS) {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| {
                    invalid(
                        STORE_TIMEOUT_MS,
                        format!("'{value}' is not a positive number of milliseconds"),
                    )
                })?,
            None => Self::DEFAULT_STORE_TIMEOUT_MS,
        };

        let jwt = match (get(JWT_SECRET), get(JWT_PUBLIC_KEY)) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Conflict {
                    first: JWT_SECRET.to_string(),
                    second: JWT_PUBLIC_KEY.to_string(),
                });
            }
            (Some(secret), None) => Some(
                JwtConfig::new_hs256(secret.as_bytes().to_vec())
                    .map_err(|e| invalid(JWT_SECRET, e.to_string()))?,
            ),
            (None, Some(public_key)) => Some(
                JwtConfig::new_rs256(public_key.to_string())
                    .map_err(|e| invalid(JWT_PUBLIC_KEY, e.to_string()))?,
            ),
            (None, None) => None,
        };

        Ok(Self {
            listen_host,
            listen_port,
            seed_file,
            field_types,
            store_timeout: Duration::from_millis(store_timeout_ms),
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FieldType;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_default_values() {
        let config = ServerConfig::from_vars(&HashMap::new()).expect("defaults");
        assert_eq!(config.listen_host.to_string(), "127.0.0.1");
        assert_eq!(config.listen_port, 3000);
        assert!(config.seed_file.is_none());
        assert!(config.field_types.is_empty());
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert!(config.jwt.is_none());
    }

    #[test]
    fn test_all_values() {
        let config = ServerConfig::from_vars(&vars(&[
            (LISTEN_HOST, "0.0.0.0"),
            (LISTEN_PORT, "8080"),
            (SEED_FILE, "/data/seed.json"),
            (FIELD_TYPES, "Revenue:numeric"),
            (STORE_TIMEOUT_MS, "250"),
            (JWT_SECRET, "s3cret"),
        ]))
        .expect("config");
        assert_eq!(config.listen_host.to_string(), "0.0.0.0");
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.seed_file, Some(PathBuf::from("/data/seed.json")));
        assert_eq!(config.field_types.type_of("Revenue"), FieldType::Numeric);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert!(matches!(config.jwt, Some(JwtConfig::Hs256 { .. })));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = ServerConfig::from_vars(&vars(&[(LISTEN_PORT, ""), (JWT_SECRET, "  ")]))
            .expect("config");
        assert_eq!(config.listen_port, ServerConfig::DEFAULT_PORT);
        assert!(config.jwt.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let error = ServerConfig::from_vars(&vars(&[(LISTEN_PORT, "70000")])).map(|_| ());
        assert_eq!(
            error,
            Err(ConfigError::InvalidValue {
                name: LISTEN_PORT.to_string(),
                message: "'70000' is not a valid port number (must be 1-65535)".to_string(),
            })
        );
    }

    #[test]
    fn test_port_zero_is_rejected() {
        let error = ServerConfig::from_vars(&vars(&[(LISTEN_PORT, "0")])).map(|_| ());
        assert_eq!(
            error,
            Err(ConfigError::InvalidValue {
                name: LISTEN_PORT.to_string(),
                message: "'0' is not a valid port number (must be 1-65535)".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_timeout() {
        for value in ["0", "-5", "soon"] {
            let result = ServerConfig::from_vars(&vars(&[(STORE_TIMEOUT_MS, value)]));
            assert!(matches!(
                result,
                Err(ConfigError::InvalidValue { ref name, .. }) if name == STORE_TIMEOUT_MS
            ));
        }
    }

    #[test]
    fn test_invalid_field_types() {
        let result = ServerConfig::from_vars(&vars(&[(FIELD_TYPES, "Revenue:money")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref name, .. }) if name == FIELD_TYPES
        ));
    }

    #[test]
    fn test_conflicting_jwt_keys() {
        let error = ServerConfig::from_vars(&vars(&[
            (JWT_SECRET, "s3cret"),
            (JWT_PUBLIC_KEY, "pem"),
        ]))
        .map(|_| ());
        assert_eq!(
            error,
            Err(ConfigError::Conflict {
                first: JWT_SECRET.to_string(),
                second: JWT_PUBLIC_KEY.to_string(),
            })
        );
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::InvalidValue {
            name: "TEST_VAR".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for TEST_VAR: bad value");
    }
}
