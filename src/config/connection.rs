use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::pipeline::RuleError;

/// Connection settings for the document database
///
/// Example:
/// ```json
/// {
///   "host": "localhost:27017",
///   "authDatabase": "admin",
///   "username": "guest",
///   "password": "welcome",
///   "targetDatabase": "goinggo",
///   "connectTimeout": 60
/// }
/// ```
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Server address as `host[:port]`
    #[validate(length(min = 1, message = "host must not be empty"))]
    pub host: String,

    /// Database the credentials are defined in
    #[serde(default = "default_auth_database")]
    #[validate(length(min = 1, message = "authDatabase must not be empty"))]
    pub auth_database: String,

    /// Username; no credential is sent when absent
    #[serde(default)]
    pub username: Option<String>,

    /// Password for `username`
    #[serde(default)]
    pub password: Option<String>,

    /// Database holding the collections rules refer to
    #[validate(length(min = 1, message = "targetDatabase must not be empty"))]
    pub target_database: String,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    #[validate(range(min = 1, message = "connectTimeout must be at least one second"))]
    pub connect_timeout: u64,
}

fn default_auth_database() -> String {
    "admin".to_string()
}

fn default_connect_timeout() -> u64 {
    60
}

impl ConnectionConfig {
    /// Create a config for a host and target database with default settings
    pub fn new(host: impl Into<String>, target_database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            auth_database: default_auth_database(),
            username: None,
            password: None,
            target_database: target_database.into(),
            connect_timeout: default_connect_timeout(),
        }
    }

    /// Set the credentials and the database they authenticate against
    pub fn with_credentials(
        mut self,
        auth_database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth_database = auth_database.into();
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Parse and validate a JSON config document
    pub fn from_json(content: &str) -> Result<Self, RuleError> {
        let config: Self = serde_json::from_str(content).map_err(RuleError::config)?;
        config.check()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RuleError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Run the field validations, mapping failures to `RuleError::Config`
    pub fn check(&self) -> Result<(), RuleError> {
        self.validate().map_err(RuleError::config)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("auth_database", &self.auth_database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("target_database", &self.target_database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults() {
        let config = ConnectionConfig::from_json(
            r#"{"host": "localhost:27017", "targetDatabase": "goinggo"}"#,
        )
        .unwrap();

        assert_eq!(config.host, "localhost:27017");
        assert_eq!(config.auth_database, "admin");
        assert_eq!(config.target_database, "goinggo");
        assert!(config.username.is_none());
        assert_eq!(config.connect_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_from_json_all_options() {
        let config = ConnectionConfig::from_json(
            r#"{
                "host": "db.example.com:35428",
                "authDatabase": "goinggo",
                "username": "guest",
                "password": "welcome",
                "targetDatabase": "goinggo",
                "connectTimeout": 5
            }"#,
        )
        .unwrap();

        assert_eq!(config.auth_database, "goinggo");
        assert_eq!(config.username.as_deref(), Some("guest"));
        assert_eq!(config.password.as_deref(), Some("welcome"));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_from_json_missing_target_database() {
        let err = ConnectionConfig::from_json(r#"{"host": "localhost"}"#).unwrap_err();
        assert!(matches!(err, RuleError::Config(_)));
    }

    #[test]
    fn test_from_json_rejects_empty_host() {
        let err = ConnectionConfig::from_json(r#"{"host": "", "targetDatabase": "goinggo"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("host must not be empty"));
    }

    #[test]
    fn test_from_json_rejects_zero_timeout() {
        let err = ConnectionConfig::from_json(
            r#"{"host": "localhost", "targetDatabase": "goinggo", "connectTimeout": 0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("connectTimeout"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = ConnectionConfig::from_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, RuleError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ConnectionConfig::new("localhost", "goinggo")
            .with_credentials("goinggo", "guest", "welcome");

        let debug = format!("{:?}", config);
        assert!(debug.contains("guest"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("welcome"));
    }
}
