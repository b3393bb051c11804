//! Generator configuration.
//!
//! Loaded from `automodel.toml`:
//!
//! ```toml
//! package = "com.acme.model"
//! destination = "./models"
//! target = "java"            # java | rust
//! error_policy = "continue"  # continue | abort
//! tokenizer = "naive"        # naive | paren-aware
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codegen::{JavaEmitter, ModelEmitter, RustEmitter};
use crate::error::{AutoModelError, AutoModelResult};
use crate::parser::{ParserOptions, Tokenizer};

/// Project-local config file name.
pub const CONFIG_FILE_NAME: &str = "automodel.toml";

/// What a batch does when a statement fails to extract or parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Record the error against its table and keep going.
    #[default]
    Continue,
    /// Stop the run at the first error.
    Abort,
}

/// Language of the generated models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    #[default]
    Java,
    Rust,
}

impl Target {
    pub fn emitter(self) -> Box<dyn ModelEmitter> {
        match self {
            Target::Java => Box::new(JavaEmitter),
            Target::Rust => Box::new(RustEmitter),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Package (Java) or namespace label (Rust) of the generated models.
    pub package: String,
    pub destination: Option<PathBuf>,
    pub target: Target,
    pub error_policy: ErrorPolicy,
    pub tokenizer: Tokenizer,
}

impl GeneratorConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> AutoModelResult<Self> {
        toml::from_str(content).map_err(|e| AutoModelError::Config(e.to_string()))
    }

    /// Load a config file.
    pub fn load(path: &Path) -> AutoModelResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AutoModelError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Find and load the config for a run started in `dir`.
    ///
    /// An explicit path must exist. Otherwise `<dir>/automodel.toml` is tried,
    /// then the per-user config file, then the defaults.
    pub fn discover(dir: &Path, explicit: Option<&Path>) -> AutoModelResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = dir.join(CONFIG_FILE_NAME);
        if local.is_file() {
            debug!(path = %local.display(), "using project config");
            return Self::load(&local);
        }

        if let Some(user) = user_config_path()
            && user.is_file()
        {
            debug!(path = %user.display(), "using user config");
            return Self::load(&user);
        }

        Ok(Self::default())
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            tokenizer: self.tokenizer,
        }
    }
}

/// `<config dir>/sql-automodel/config.toml`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sql-automodel").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::from_toml("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.error_policy, ErrorPolicy::Continue);
        assert_eq!(config.tokenizer, Tokenizer::Naive);
        assert_eq!(config.target, Target::Java);
    }

    #[test]
    fn test_full_config() {
        let config = GeneratorConfig::from_toml(
            r#"
            package = "com.acme.model"
            destination = "out"
            target = "rust"
            error_policy = "abort"
            tokenizer = "paren-aware"
            "#,
        )
        .unwrap();
        assert_eq!(config.package, "com.acme.model");
        assert_eq!(config.destination, Some(PathBuf::from("out")));
        assert_eq!(config.target, Target::Rust);
        assert_eq!(config.error_policy, ErrorPolicy::Abort);
        assert_eq!(config.parser_options().tokenizer, Tokenizer::ParenAware);
    }

    #[test]
    fn test_invalid_config() {
        let err = GeneratorConfig::from_toml("error_policy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, AutoModelError::Config(_)));

        let err = GeneratorConfig::from_toml("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, AutoModelError::Config(_)));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let missing = std::env::temp_dir().join("sql-automodel-no-such-config.toml");
        let err = GeneratorConfig::discover(Path::new("."), Some(&missing)).unwrap_err();
        assert!(matches!(err, AutoModelError::Config(_)));
    }

    #[test]
    fn test_discover_project_file() {
        let dir = std::env::temp_dir().join(format!("sql-automodel-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE_NAME), "package = \"org.example\"\n").unwrap();

        let config = GeneratorConfig::discover(&dir, None).unwrap();
        assert_eq!(config.package, "org.example");

        fs::remove_dir_all(&dir).unwrap();
    }
}
