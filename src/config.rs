//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/course-catalog/course-catalog.toml`
//! 3. Local config: `<dir>/.course-catalog.toml` (working directory by default)
//! 4. Environment variables: `COURSE_CATALOG_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::value::StrDeserializer;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, MalformedLinePolicy};
use crate::domain::DuplicatePolicy;

/// File loaded when no file, or the default token, is given.
pub const DEFAULT_COURSE_FILE: &str = "ABCU_Advising_Program_Input.csv";

/// Literal input selecting the default file.
pub const DEFAULT_TOKEN: &str = "default";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "COURSE_CATALOG";

/// Raw settings for intermediate parsing (every field optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub default_file: Option<PathBuf>,
    pub default_token: Option<String>,
    pub delimiter: Option<char>,
    pub duplicates: Option<DuplicatePolicy>,
    pub on_malformed: Option<MalformedLinePolicy>,
}

/// Unified configuration for course-catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Course file used when none is given
    pub default_file: PathBuf,
    /// Input that selects `default_file` at the file prompt
    pub default_token: String,
    /// Field delimiter of course files
    pub delimiter: char,
    /// How the index treats a course number it already holds
    pub duplicates: DuplicatePolicy,
    /// How the loader treats a line with fewer than two fields
    pub on_malformed: MalformedLinePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_file: PathBuf::from(DEFAULT_COURSE_FILE),
            default_token: DEFAULT_TOKEN.to_string(),
            delimiter: ',',
            duplicates: DuplicatePolicy::default(),
            on_malformed: MalformedLinePolicy::default(),
        }
    }
}

/// Get the XDG config directory for course-catalog.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "course-catalog").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("course-catalog.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".course-catalog.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            default_file: overlay
                .default_file
                .clone()
                .unwrap_or_else(|| self.default_file.clone()),
            default_token: overlay
                .default_token
                .clone()
                .unwrap_or_else(|| self.default_token.clone()),
            delimiter: overlay.delimiter.unwrap_or(self.delimiter),
            duplicates: overlay.duplicates.unwrap_or(self.duplicates),
            on_malformed: overlay.on_malformed.unwrap_or(self.on_malformed),
        }
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the default file path.
    fn expand_paths(&mut self) {
        let raw = self.default_file.to_string_lossy().into_owned();
        let expanded = shellexpand::full(&raw)
            .map(|s| s.into_owned())
            .unwrap_or(raw);
        self.default_file = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.course-catalog.toml`
    ///   (the working directory when `None`)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(
            global_config_path().as_deref(),
            local_dir.unwrap_or(Path::new(".")),
            Self::env_source(),
        )
    }

    /// Layered load with every source given explicitly.
    ///
    /// A missing global or local file is skipped.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: &Path,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path.filter(|p| p.exists()) {
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw);
        }

        // 3. Local config
        let local_path = local_config_path(local_dir);
        if local_path.exists() {
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current, env)?;

        current.expand_paths();
        Ok(current)
    }

    /// Source for `COURSE_CATALOG_*` variables.
    pub fn env_source() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    /// Apply `COURSE_CATALOG_*` variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("default_file") {
            settings.default_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("default_token") {
            settings.default_token = val;
        }
        if let Ok(val) = config.get_string("delimiter") {
            settings.delimiter = parse_delimiter(&val)?;
        }
        if let Ok(val) = config.get_string("duplicates") {
            settings.duplicates = parse_enum("duplicates", &val)?;
        }
        if let Ok(val) = config.get_string("on_malformed") {
            settings.on_malformed = parse_enum("on_malformed", &val)?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# course-catalog configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/course-catalog/course-catalog.toml
#   Local:  ./.course-catalog.toml
#   Env:    COURSE_CATALOG_* environment variables
#   CLI:    --duplicates, --on-malformed, --delimiter

# Course file loaded when no file (or the default token) is given
# default_file = "ABCU_Advising_Program_Input.csv"

# Input at the file prompt that selects default_file
# default_token = "default"

# Field delimiter
# delimiter = ","

# Duplicate course numbers: "retain" (keep both), "overwrite", "reject"
# duplicates = "retain"

# Lines with fewer than two fields: "abort" (reject file) or "skip"
# on_malformed = "abort"
"#
        .to_string()
    }
}

/// A delimiter must be exactly one character.
pub fn parse_delimiter(value: &str) -> Result<char, ApplicationError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ApplicationError::Config {
            message: format!("delimiter must be a single character, got {value:?}"),
        }),
    }
}

/// Parse a lowercase policy name such as `"retain"` into its enum.
fn parse_enum<T: serde::de::DeserializeOwned>(key: &str, value: &str) -> Result<T, ApplicationError> {
    let lowered = value.to_lowercase();
    let de: StrDeserializer<'_, serde::de::value::Error> = lowered.as_str().into_deserializer();
    T::deserialize(de).map_err(|e| ApplicationError::Config {
        message: format!("{key}: {e}"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
