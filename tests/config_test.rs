use serial_test::serial;

use tourism_api::config::{AppConfig, ConfigError};

fn clear() {
    for key in [
        "HOST",
        "PORT",
        "MONGODB_URI",
        "DATABASE_NAME",
        "JWT_SECRET",
        "JWT_EXPIRY_HOURS",
        "CORS_ORIGIN",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_config_from_environment() {
    clear();
    std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");
    std::env::set_var("JWT_SECRET", "env-secret");
    std::env::set_var("PORT", "9090");
    std::env::set_var("JWT_EXPIRY_HOURS", "12");

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.port, 9090);
    assert_eq!(config.auth.jwt_secret, "env-secret");
    assert_eq!(config.auth.token_ttl_hours, 12);
    assert_eq!(config.database_name, "Tourism");

    clear();
}

#[test]
#[serial]
fn test_config_requires_secret() {
    clear();
    std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");

    assert_eq!(
        AppConfig::from_env().unwrap_err(),
        ConfigError::Missing("JWT_SECRET")
    );

    clear();
}

#[test]
#[serial]
fn test_config_rejects_non_positive_expiry() {
    clear();
    std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");
    std::env::set_var("JWT_SECRET", "env-secret");
    std::env::set_var("JWT_EXPIRY_HOURS", "0");

    assert!(matches!(
        AppConfig::from_env().unwrap_err(),
        ConfigError::Invalid { name: "JWT_EXPIRY_HOURS", .. }
    ));

    clear();
}
