use std::env;

use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DATABASE_NAME: &str = "Tourism";
const JWT_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub database_name: String,
    pub cors_origin: Option<String>,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup, so tests can feed a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| HOST.to_string());
        let port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => PORT,
        };

        let mongo_uri = lookup("MONGODB_URI")
            .filter(|uri| !uri.is_empty())
            .ok_or(ConfigError::Missing("MONGODB_URI"))?;
        let database_name = lookup("DATABASE_NAME").unwrap_or_else(|| DATABASE_NAME.to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let token_ttl_hours = match lookup("JWT_EXPIRY_HOURS") {
            Some(value) => match value.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "JWT_EXPIRY_HOURS",
                        value,
                    })
                }
            },
            None => JWT_EXPIRY_HOURS,
        };

        let cors_origin = lookup("CORS_ORIGIN").filter(|origin| !origin.is_empty());

        Ok(Self {
            host,
            port,
            mongo_uri,
            database_name,
            cors_origin,
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MONGODB_URI", "mongodb://localhost:27017"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_name, "Tourism");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_missing_required_values() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "secret")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("MONGODB_URI"));

        let err = AppConfig::from_lookup(lookup_from(&[("MONGODB_URI", "mongodb://db")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("MONGODB_URI", "mongodb://db"),
            ("JWT_SECRET", "secret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
