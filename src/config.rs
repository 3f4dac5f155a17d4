//! Server configuration.
//!
//! The configuration file is line oriented, one `key=value` pair per line:
//!
//! ```text
//! staticfiles=./files
//! cgibin=./cgibin
//! port=8070
//! exec=/bin/python3
//! ```
//!
//! All four keys are required. An unknown key, a line with an empty key or
//! value, or a missing key is a fatal startup error.

use serde::de::value::{Error as ValueError, MapDeserializer};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Host the server always binds to.
pub const LISTEN_HOST: &str = "127.0.0.1";

const KEYS: [&str; 4] = ["staticfiles", "cgibin", "port", "exec"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable To Load Configuration File: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key: {line}")]
    UnknownKey { line: String },

    #[error("Missing field on line: {line}")]
    MissingField { line: String },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValueError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Document root for static files and error pages.
    pub staticfiles: PathBuf,
    /// Directory holding the CGI scripts.
    pub cgibin: PathBuf,
    #[serde(deserialize_with = "port_from_str")]
    pub port: u16,
    /// Interpreter every CGI script is run with.
    pub exec: PathBuf,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut fields = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some((k, v)) if !k.is_empty() && !v.is_empty() => (k, v),
                _ => {
                    return Err(ConfigError::MissingField {
                        line: line.to_string(),
                    });
                }
            };

            if !KEYS.contains(&key) {
                return Err(ConfigError::UnknownKey {
                    line: line.to_string(),
                });
            }

            fields.insert(key.to_string(), value.trim().to_string());
        }

        let deserializer = MapDeserializer::<_, ValueError>::new(fields.into_iter());
        Ok(Config::deserialize(deserializer)?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", LISTEN_HOST, self.port)
    }
}

fn port_from_str<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}
