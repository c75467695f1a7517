//! Configuration resolution errors.

use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ConfigError {
    ReadFailure { path: String, source: std::io::Error },
    ParseFailure { path: String, source: toml::de::Error },
    InvalidEnvValue { key: String, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailure { path, source } => write!(f, "failed to read config file {path}: {source}"),
            Self::ParseFailure { path, source } => write!(f, "failed to parse config file {path}: {source}"),
            Self::InvalidEnvValue { key, value } => {
                write!(f, "environment variable {key} has an invalid value: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailure { source, .. } => Some(source),
            Self::ParseFailure { source, .. } => Some(source),
            Self::InvalidEnvValue { .. } => None,
        }
    }
}
