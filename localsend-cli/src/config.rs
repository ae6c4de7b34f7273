use std::{env, fs, path::Path, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Preferences persisted between runs.
///
/// Storage location:
/// - Linux: $XDG_CONFIG_HOME/localsend-cli/config.toml or
///   $HOME/.config/localsend-cli/config.toml
/// - macOS: $HOME/Library/Application Support/localsend-cli/config.toml
/// - Windows: %APPDATA%\localsend-cli\config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub alias: Option<String>,
    /// Identifies this sender to receivers across runs.
    pub fingerprint: Option<String>,
    pub default_port: Option<u16>,
}

impl CliConfig {
    fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = env::var("APPDATA") {
                return Ok(PathBuf::from(appdata).join("localsend-cli"));
            }
            if let Ok(userprofile) = env::var("USERPROFILE") {
                return Ok(PathBuf::from(userprofile)
                    .join(".config")
                    .join("localsend-cli"));
            }
            return Err(anyhow!(
                "Unable to determine config directory (missing APPDATA/USERPROFILE)"
            ));
        }

        #[cfg(target_os = "macos")]
        {
            if let Ok(home) = env::var("HOME") {
                return Ok(PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("localsend-cli"));
            }
            return Err(anyhow!(
                "Unable to determine config directory (missing HOME)"
            ));
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = if let Ok(xdg_config_home) =
                env::var("XDG_CONFIG_HOME")
            {
                PathBuf::from(xdg_config_home)
            } else if let Ok(home) = env::var("HOME") {
                PathBuf::from(home).join(".config")
            } else {
                return Err(anyhow!(
                    "Unable to determine config directory (missing XDG_CONFIG_HOME/HOME)"
                ));
            };
            Ok(config_dir.join("localsend-cli"))
        }
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    /// Missing files yield the default configuration.
    pub fn load_from(config_file: &Path) -> Result<Self> {
        if !config_file.exists() {
            return Ok(Self::default());
        }

        let config_content =
            fs::read_to_string(config_file).with_context(|| {
                format!("Failed to read config file: {}", config_file.display())
            })?;

        toml::from_str(&config_content)
            .with_context(|| "Failed to parse config file")
    }

    pub fn save_to(&self, config_file: &Path) -> Result<()> {
        if let Some(config_dir) = config_file.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).with_context(|| {
                    format!(
                        "Failed to create config directory: {}",
                        config_dir.display()
                    )
                })?;
            }
        }

        let config_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        fs::write(config_file, config_content).with_context(|| {
            format!("Failed to write config file: {}", config_file.display())
        })
    }

    /// Returns the stored fingerprint, generating one on first use. The
    /// caller persists the config when this returns `true` as second value.
    pub fn ensure_fingerprint(&mut self) -> (String, bool) {
        match &self.fingerprint {
            Some(fingerprint) => (fingerprint.clone(), false),
            None => {
                let fingerprint = Uuid::new_v4().simple().to_string();
                self.fingerprint = Some(fingerprint.clone());
                (fingerprint, true)
            }
        }
    }

    pub fn alias_or_default(&self) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| "localsend-cli".to_string())
    }
}
