use crate::store::StoreConfig;
use avatar_kit_core::is_valid_api_key;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings loaded from the environment at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct AvatarConfig {
    /// Access token used to construct the streaming client.
    pub api_token: Option<String>,
    /// Overrides the streaming service's default endpoint.
    pub base_path: Option<String>,
    pub log_level: Level,
}

impl AvatarConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let api_token = std::env::var("AVATAR_API_TOKEN").ok();
        if let Some(token) = &api_token {
            if !is_valid_api_key(token) {
                return Err(ConfigError::InvalidValue(
                    "AVATAR_API_TOKEN".to_string(),
                    "token must not be empty".to_string(),
                ));
            }
        }

        let base_path = std::env::var("AVATAR_BASE_PATH")
            .ok()
            .filter(|path| !path.is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_token,
            base_path,
            log_level,
        })
    }

    /// The token, or `MissingVar` if none was configured.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.api_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("AVATAR_API_TOKEN".to_string()))
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            base_path: self.base_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("AVATAR_API_TOKEN");
            env::remove_var("AVATAR_BASE_PATH");
            env::remove_var("RUST_LOG");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        clear_env_vars();

        let config = AvatarConfig::from_env().expect("Config should load successfully");

        assert_eq!(config.api_token, None);
        assert_eq!(config.base_path, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.store_config(), StoreConfig::default());
        assert!(matches!(
            config.require_token(),
            Err(ConfigError::MissingVar(var)) if var == "AVATAR_API_TOKEN"
        ));
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("AVATAR_API_TOKEN", "session-token");
            env::set_var("AVATAR_BASE_PATH", "https://avatar.example.test");
            env::set_var("RUST_LOG", "debug");
        }

        let config = AvatarConfig::from_env().expect("Config should load successfully");

        assert_eq!(config.require_token().unwrap(), "session-token");
        assert_eq!(
            config.store_config().base_path.as_deref(),
            Some("https://avatar.example.test")
        );
        assert_eq!(config.log_level, Level::DEBUG);
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_empty_base_path_is_ignored() {
        clear_env_vars();
        unsafe {
            env::set_var("AVATAR_BASE_PATH", "");
        }

        let config = AvatarConfig::from_env().unwrap();
        assert_eq!(config.base_path, None);
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_empty_token_is_invalid() {
        clear_env_vars();
        unsafe {
            env::set_var("AVATAR_API_TOKEN", "");
        }

        let err = AvatarConfig::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "AVATAR_API_TOKEN"),
            _ => panic!("Expected InvalidValue for AVATAR_API_TOKEN"),
        }
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = AvatarConfig::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
        clear_env_vars();
    }
}
