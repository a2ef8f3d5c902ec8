use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::{Error, RiftResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Token slots reserved up front; the store doubles past this.
    #[serde(default = "default_initial_token_capacity")]
    pub initial_token_capacity: usize,

    /// Wraps rule names in ANSI color codes in diagnostic messages.
    #[serde(default)]
    pub colorize_diagnostics: bool,

    /// Caps the number of per-depth diagnostics. `None` keeps all of them.
    #[serde(default)]
    pub max_diagnostics: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            initial_token_capacity: default_initial_token_capacity(),
            colorize_diagnostics: false,
            max_diagnostics: None,
        }
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> RiftResult<T> {
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> RiftResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

fn default_initial_token_capacity() -> usize {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: ParserConfig = from_str("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.initial_token_capacity, 1024);
    }

    #[test]
    fn test_partial_config() {
        let config: ParserConfig =
            from_str(r#"{"colorize_diagnostics": true, "max_diagnostics": 2}"#).unwrap();
        assert!(config.colorize_diagnostics);
        assert_eq!(config.max_diagnostics, Some(2));
        assert_eq!(config.initial_token_capacity, 1024);
    }

    #[test]
    fn test_invalid_config() {
        let result: RiftResult<ParserConfig> = from_str("{\"initial_token_capacity\": -1}");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result: RiftResult<ParserConfig> = from_file("/nonexistent/rift.json");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
