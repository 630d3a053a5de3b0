use std::path::PathBuf;

use dblink_core::{
    config,
    err::{ConnectorError, Result},
};
use serde::{Deserialize, Serialize};

/// The connection config for the JDBC bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JdbcConnectionConfig {
    /// Fully qualified class name of the vendor driver,
    /// eg "org.apache.hive.jdbc.HiveDriver"
    pub driver_class_name: String,
    /// The full JDBC connection url for the target database
    pub connection_string: String,
    /// The username for the database
    pub user: String,
    /// The password for the database. Sensitive.
    #[serde(default)]
    pub password: Option<String>,
    /// Path to a driver artifact or to a directory of driver artifacts
    #[serde(alias = "jdbc_driver_path")]
    pub driver_path: PathBuf,
}

impl JdbcConnectionConfig {
    pub fn parse(options: config::Value) -> Result<Self> {
        config::parse_options(options)
    }

    /// Validates that all required connection parameters are present.
    /// Runs before any driver activity takes place.
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("driver_class_name", self.driver_class_name.is_empty()),
            ("connection_string", self.connection_string.is_empty()),
            ("user", self.user.is_empty()),
            ("driver_path", self.driver_path.as_os_str().is_empty()),
        ]
        .into_iter()
        .filter(|(_, empty)| *empty)
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(ConnectorError::ConfigInvalid(format!(
                "missing required connection parameters: {}",
                missing.join(", ")
            ))
            .into());
        }

        Ok(())
    }

    /// Composes the authentication properties for the dial.
    ///
    /// `user` is always included. `password` is appended only when present
    /// and non-empty so drivers that require no password never receive a
    /// spurious empty credential.
    pub fn auth_props(&self) -> Vec<(String, String)> {
        let mut props = vec![("user".to_string(), self.user.clone())];

        match self.password.as_deref() {
            Some(password) if !password.is_empty() => {
                props.push(("password".to_string(), password.to_string()))
            }
            _ => {}
        }

        props
    }
}
