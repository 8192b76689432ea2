//! Environment-driven configuration.
//!
//! These tests mutate process environment variables, so they run serially.

use std::time::Duration;

use chairside::config::{
    ClientConfig, ConfigError, DEFAULT_API_URL, DEFAULT_IDLE_TIMEOUT, DEFAULT_TOTAL_TIMEOUT,
    ENV_API_URL, ENV_IDLE_TIMEOUT, ENV_TOTAL_TIMEOUT,
};
use serial_test::serial;

fn clear_env() {
    for var in [ENV_API_URL, ENV_IDLE_TIMEOUT, ENV_TOTAL_TIMEOUT] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_env() {
    clear_env();
    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.base_url, DEFAULT_API_URL);
    assert_eq!(config.idle_timeout, Some(DEFAULT_IDLE_TIMEOUT));
    assert_eq!(config.total_timeout, Some(DEFAULT_TOTAL_TIMEOUT));
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var(ENV_API_URL, "https://api.clinic.example/");
    std::env::set_var(ENV_IDLE_TIMEOUT, "15");
    std::env::set_var(ENV_TOTAL_TIMEOUT, "0");

    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.base_url, "https://api.clinic.example");
    assert_eq!(config.idle_timeout, Some(Duration::from_secs(15)));
    assert_eq!(config.total_timeout, None);
    assert_eq!(
        config.endpoint_url("/genai/chatbot/help"),
        "https://api.clinic.example/genai/chatbot/help"
    );

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_rejected() {
    clear_env();
    std::env::set_var(ENV_IDLE_TIMEOUT, "soon");
    assert!(matches!(
        ClientConfig::from_env(),
        Err(ConfigError::InvalidSeconds { .. })
    ));

    clear_env();
    std::env::set_var(ENV_API_URL, "ftp://files.example");
    assert!(matches!(
        ClientConfig::from_env(),
        Err(ConfigError::InvalidUrl { .. })
    ));

    clear_env();
}
