use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cipher::{key_material, Cipher, KeyMaterial, KeyPolicy};
use crate::error::StoreError;
use crate::storage::{CurrentPointer, PointerStyle, ProfileStore};

/// Environment variable holding the cipher key unless overridden.
pub const DEFAULT_KEY_ENV: &str = "PSQLCM_KEY";

fn default_key_env() -> String {
    DEFAULT_KEY_ENV.to_string()
}

/// Settings file contents.
///
/// ```toml
/// cache_dir = "/srv/psqlcm"
/// key_env = "PSQLCM_KEY"
/// key_policy = "strict"
/// pointer = "symlink"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Store directory. If relative, resolved from the settings file location.
    pub cache_dir: Option<PathBuf>,

    /// Name of the environment variable holding the cipher key.
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// Treatment of keys that are not exactly 32 bytes.
    pub key_policy: KeyPolicy,

    /// Representation of the `current` entry.
    pub pointer: PointerStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            key_env: default_key_env(),
            key_policy: KeyPolicy::default(),
            pointer: PointerStyle::default(),
        }
    }
}

impl Config {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load settings from a file, or return defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve `cache_dir` against the directory holding the settings file.
    pub fn resolve_cache_dir(&self, config_dir: &Path) -> Option<PathBuf> {
        match &self.cache_dir {
            Some(dir) if dir.is_absolute() => Some(dir.clone()),
            Some(dir) => Some(config_dir.join(dir)),
            None => None,
        }
    }
}

/// Everything a store operation needs, built once at process start.
///
/// Nothing below this reads the environment.
#[derive(Debug)]
pub struct StoreConfig {
    /// Store directory.
    pub directory: PathBuf,

    /// Environment variable the key was read from, used in error messages.
    pub key_var: String,

    /// Raw cipher key bytes, if the variable was set. Not required to be
    /// UTF-8.
    pub cipher_key: Option<KeyMaterial>,

    pub key_policy: KeyPolicy,

    pub pointer_style: PointerStyle,
}

impl StoreConfig {
    /// A config for `directory` with default settings and no key.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            key_var: default_key_env(),
            cipher_key: None,
            key_policy: KeyPolicy::default(),
            pointer_style: PointerStyle::default(),
        }
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.cipher_key = Some(key_material(key));
        self
    }

    pub fn with_key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    pub fn with_pointer_style(mut self, style: PointerStyle) -> Self {
        self.pointer_style = style;
        self
    }

    /// Build the store config from the settings file, an optional
    /// `--cache-dir` override and the process environment.
    ///
    /// Directory precedence: override, then `cache_dir` from the settings
    /// file, then `~/.local/share/psqlcm`.
    pub fn resolve(config_path: &Path, cache_dir: Option<PathBuf>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        let config_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let directory = match cache_dir.or_else(|| config.resolve_cache_dir(config_dir)) {
            Some(dir) => dir,
            None => default_store_dir()
                .context("Could not find home directory; pass --cache-dir")?,
        };

        let cipher_key = std::env::var_os(&config.key_env)
            .map(|raw| key_material(raw.into_encoded_bytes()));

        debug!(
            directory = %directory.display(),
            key_var = %config.key_env,
            key_set = cipher_key.is_some(),
            "Resolved store config"
        );

        Ok(Self {
            directory,
            key_var: config.key_env,
            cipher_key,
            key_policy: config.key_policy,
            pointer_style: config.pointer,
        })
    }

    /// Cipher for sealing and opening passwords.
    ///
    /// Fails with `KeyMissing` when no key was supplied.
    pub fn cipher(&self) -> Result<Cipher, StoreError> {
        Cipher::new(self.cipher_key.as_ref(), &self.key_var, self.key_policy)
    }

    pub fn profiles(&self) -> ProfileStore {
        ProfileStore::new(&self.directory)
    }

    pub fn pointer(&self) -> CurrentPointer {
        CurrentPointer::new(&self.directory, self.pointer_style)
    }
}

/// Default store directory: `~/.local/share/psqlcm`.
pub fn default_store_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".local").join("share").join("psqlcm"))
}

/// Returns the default settings file path.
///
/// `<config_dir>/psqlcm/psqlcm.toml` (e.g. `~/.config/psqlcm/psqlcm.toml`),
/// falling back to `./psqlcm.toml` when no config directory is known.
pub fn default_config_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("psqlcm").join("psqlcm.toml"),
        None => PathBuf::from("psqlcm.toml"),
    }
}
