use keytrust_vault::{BackendKind, DerivationPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RootError, RootResult};

/// Which signing back-end the process uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CryptoConfig {
    #[serde(default)]
    pub backend: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DerivationConfig {
    /// Path used by `derive` when none is given on the command line.
    #[serde(default = "default_path")]
    pub default_path: String,
}

fn default_path() -> String {
    "m/0'/1'/0'".to_string()
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            default_path: default_path(),
        }
    }
}

impl DerivationConfig {
    pub fn path(&self) -> RootResult<DerivationPath> {
        Ok(DerivationPath::parse(&self.default_path)?)
    }
}

/// Top-level configuration for the keytrust binary.
///
/// Loaded from a TOML file (typically `~/.keytrust/config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootConfig {
    #[serde(default)]
    pub crypto: CryptoConfig,

    #[serde(default)]
    pub derivation: DerivationConfig,
}

/// Returns `$HOME/<suffix>` if HOME is available, otherwise `./<suffix>`.
fn dirs_or_default(suffix: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(suffix))
        .unwrap_or_else(|_| PathBuf::from(suffix))
}

impl RootConfig {
    /// Load configuration from a TOML file. If the file does not exist,
    /// returns a default configuration.
    pub fn load(path: &Path) -> RootResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: RootConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> RootResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RootError::Config(format!("TOML serialize error: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> RootResult<()> {
        DerivationPath::parse(&self.derivation.default_path).map_err(|e| {
            RootError::Config(format!(
                "derivation.default_path '{}' is invalid: {}",
                self.derivation.default_path, e
            ))
        })?;
        Ok(())
    }

    pub fn default_config_path() -> PathBuf {
        dirs_or_default(".keytrust/config.toml")
    }
}
