//! Layered settings resolution: defaults, then `taup.toml`, then
//! environment variables, then explicit CLI overrides — each layer
//! replacing only the fields it sets.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// The resolved set of inputs a `taup_core::Session` needs, plus the model
/// loader flags from §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub model_name: String,
    pub model_path: Option<PathBuf>,
    pub serialized_path: Option<PathBuf>,
    pub read_stats: bool,
    pub read_ellipticity: bool,
    pub read_topography: bool,
    pub tectonic: bool,
    pub return_all_phases: bool,
    pub return_back_branches: bool,
    pub eps_z: f64,
    pub eps_x: f64,
    pub eps_t: f64,
    pub alpha: f64,
    pub w_min: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_name: "ak135".to_string(),
            model_path: None,
            serialized_path: None,
            read_stats: false,
            read_ellipticity: false,
            read_topography: false,
            tectonic: false,
            return_all_phases: false,
            return_back_branches: true,
            eps_z: 1e-7,
            eps_x: 1e-7,
            eps_t: 1e-6,
            alpha: 4.0,
            w_min: 1.0,
        }
    }
}

/// A `taup.toml` file deserializes into this with every field optional, so
/// a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileOverrides {
    pub model_name: Option<String>,
    pub model_path: Option<PathBuf>,
    pub serialized_path: Option<PathBuf>,
    pub read_stats: Option<bool>,
    pub read_ellipticity: Option<bool>,
    pub read_topography: Option<bool>,
    pub tectonic: Option<bool>,
    pub return_all_phases: Option<bool>,
    pub return_back_branches: Option<bool>,
    pub eps_z: Option<f64>,
    pub eps_x: Option<f64>,
    pub eps_t: Option<f64>,
    pub alpha: Option<f64>,
    pub w_min: Option<f64>,
}

/// Explicit command-line overrides, the final and highest-priority layer.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model_name: Option<String>,
    pub model_path: Option<PathBuf>,
    pub serialized_path: Option<PathBuf>,
    pub read_stats: Option<bool>,
    pub read_ellipticity: Option<bool>,
    pub read_topography: Option<bool>,
    pub tectonic: Option<bool>,
    pub return_all_phases: Option<bool>,
    pub return_back_branches: Option<bool>,
}

macro_rules! apply_opt {
    ($target:expr, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $source.$field {
                $target.$field = value;
            }
        )+
    };
}

impl Settings {
    fn apply_file(&mut self, overrides: FileOverrides) {
        apply_opt!(
            self, overrides,
            model_name, model_path, serialized_path, read_stats, read_ellipticity,
            read_topography, tectonic, return_all_phases, return_back_branches,
            eps_z, eps_x, eps_t, alpha, w_min,
        );
    }

    fn apply_cli(&mut self, overrides: CliOverrides) {
        apply_opt!(
            self, overrides,
            model_name, model_path, serialized_path, read_stats, read_ellipticity,
            read_topography, tectonic, return_all_phases, return_back_branches,
        );
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = env::var("TAUP_MODEL_NAME") {
            self.model_name = v;
        }
        if let Ok(v) = env::var("TAUP_MODEL_PATH") {
            self.model_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("TAUP_SERIALIZED_PATH") {
            self.serialized_path = Some(PathBuf::from(v));
        }
        for (key, field) in [
            ("TAUP_READ_STATS", &mut self.read_stats),
            ("TAUP_READ_ELLIPTICITY", &mut self.read_ellipticity),
            ("TAUP_READ_TOPOGRAPHY", &mut self.read_topography),
            ("TAUP_TECTONIC", &mut self.tectonic),
            ("TAUP_RETURN_ALL_PHASES", &mut self.return_all_phases),
            ("TAUP_RETURN_BACK_BRANCHES", &mut self.return_back_branches),
        ] {
            if let Ok(v) = env::var(key) {
                *field = parse_bool(key, &v)?;
            }
        }
        for (key, field) in [
            ("TAUP_EPS_Z", &mut self.eps_z),
            ("TAUP_EPS_X", &mut self.eps_x),
            ("TAUP_EPS_T", &mut self.eps_t),
            ("TAUP_ALPHA", &mut self.alpha),
            ("TAUP_W_MIN", &mut self.w_min),
        ] {
            if let Ok(v) = env::var(key) {
                *field = v.parse().map_err(|_| ConfigError::InvalidEnvValue {
                    key: key.to_string(),
                    value: v,
                })?;
            }
        }
        Ok(())
    }

    /// Resolve a full settings value: defaults, an optional `taup.toml`
    /// (silently skipped if `file_path` is `None` or doesn't exist),
    /// environment variables, then `cli`.
    pub fn resolve(file_path: Option<&Path>, cli: CliOverrides) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(path) = file_path {
            if path.exists() {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailure {
                    path: path.display().to_string(),
                    source,
                })?;
                let overrides: FileOverrides = toml::from_str(&text).map_err(|source| ConfigError::ParseFailure {
                    path: path.display().to_string(),
                    source,
                })?;
                settings.apply_file(overrides);
            }
        }

        settings.apply_env()?;
        settings.apply_cli(cli);
        Ok(settings)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvValue { key: key.to_string(), value: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_tolerances() {
        let settings = Settings::default();
        assert_eq!(settings.model_name, "ak135");
        assert_eq!(settings.eps_z, 1e-7);
        assert_eq!(settings.eps_t, 1e-6);
        assert_eq!(settings.alpha, 4.0);
    }

    #[test]
    fn file_overrides_only_set_fields() {
        let mut settings = Settings::default();
        settings.apply_file(FileOverrides { tectonic: Some(true), ..Default::default() });
        assert!(settings.tectonic);
        assert_eq!(settings.model_name, "ak135");
    }

    #[test]
    fn cli_overrides_win_over_file_overrides() {
        let mut settings = Settings::default();
        settings.apply_file(FileOverrides { model_name: Some("iasp91".into()), ..Default::default() });
        settings.apply_cli(CliOverrides { model_name: Some("ak135_custom".into()), ..Default::default() });
        assert_eq!(settings.model_name, "ak135_custom");
    }

    #[test]
    fn resolve_without_a_file_falls_back_to_defaults_and_cli() {
        let settings = Settings::resolve(
            None,
            CliOverrides { tectonic: Some(true), ..Default::default() },
        )
        .unwrap();
        assert!(settings.tectonic);
        assert_eq!(settings.model_name, "ak135");
    }

    #[test]
    fn resolve_rejects_a_malformed_env_bool() {
        // Exercises the parse path directly; mutating the process
        // environment in a test would race with other tests in the suite.
        assert!(parse_bool("TAUP_TECTONIC", "maybe").is_err());
        assert!(parse_bool("TAUP_TECTONIC", "true").unwrap());
    }
}
