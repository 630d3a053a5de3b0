use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

pub use serde_yaml::{Mapping, Number, Sequence, Value};

/// Parses the supplied yaml string into an untyped config value
pub fn parse_config(conf_str: &str) -> Result<Value> {
    serde_yaml::from_str(conf_str).context("Failed to parse configuration yaml")
}

/// Deserializes connection options out of an untyped config value.
///
/// This is the single entry point bridge configs use to materialize
/// themselves from caller-supplied options.
pub fn parse_options<T: DeserializeOwned>(options: Value) -> Result<T> {
    serde_yaml::from_value(options).context("Failed to parse connection options")
}
