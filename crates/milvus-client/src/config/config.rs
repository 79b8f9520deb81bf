//! Configuration management for milvus-client
//!
//! Handles loading named connection profiles from a TOML file. Each profile
//! carries the server address and the default wait settings for long-running
//! operations.
//!
//! ```toml
//! default_profile = "local"
//!
//! [profiles.local]
//! host = "localhost"
//!
//! [profiles.staging]
//! host = "${MILVUS_STAGING_HOST:-milvus.staging.internal}"
//! port = 19531
//!
//! [profiles.staging.wait]
//! timeout_secs = 120
//! interval_ms = 1000
//! ```

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::{ConfigError, Result};
use crate::policy::TimeoutPolicy;
use crate::transport::{ConnectParam, DEFAULT_PORT};

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is named explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Wait settings for load and flush operations
    #[serde(default)]
    pub wait: WaitConfig,
}

/// Wait settings stored in a profile
///
/// No `timeout_secs` means operations return without waiting; `0` checks
/// progress once.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct WaitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl WaitConfig {
    pub fn policy(&self) -> Option<TimeoutPolicy> {
        let timeout = self.timeout_secs?;
        let policy = TimeoutPolicy::from_secs(timeout);
        Some(match self.interval_ms {
            Some(ms) => policy.with_poll_interval(Duration::from_millis(ms)),
            None => policy,
        })
    }
}

impl Profile {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            wait: WaitConfig::default(),
        }
    }

    pub fn connect_param(&self) -> ConnectParam {
        ConnectParam::new(self.host.clone(), self.port)
    }

    pub fn timeout_policy(&self) -> Option<TimeoutPolicy> {
        self.wait.policy()
    }
}

impl Config {
    /// Resolve the profile name to use
    ///
    /// Order: explicit name, configured default, the only profile.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            if !self.profiles.contains_key(profile_name) {
                return Err(ConfigError::ProfileNotFound {
                    name: profile_name.to_string(),
                });
            }
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        let names: Vec<&str> = self
            .list_profiles()
            .into_iter()
            .map(|(name, _)| name.as_str())
            .collect();
        match names.as_slice() {
            [] => Err(ConfigError::NoProfiles),
            [only] => Ok(only.to_string()),
            many => Err(ConfigError::AmbiguousProfile {
                available: many.join(", "),
            }),
        }
    }

    /// Look up the profile [`Config::resolve_profile`] picks
    pub fn profile(&self, explicit_profile: Option<&str>) -> Result<&Profile> {
        let name = self.resolve_profile(explicit_profile)?;
        self.profiles
            .get(&name)
            .ok_or(ConfigError::ProfileNotFound { name })
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        // Expand environment variables in the config content
        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/milvus-client/config.toml` wins when it exists,
    /// otherwise the platform directory is used:
    ///
    /// On Linux: ~/.config/milvus-client/config.toml
    /// On macOS: ~/Library/Application Support/io.milvus.milvus-client/config.toml
    /// On Windows: %APPDATA%\milvus\milvus-client\config\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("milvus-client")
                    .join("config.toml");

                if linux_style_path.exists() {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs = ProjectDirs::from("io", "milvus", "milvus-client")
            .ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default} syntax. Unset variables without a
    /// default are left as-is so profiles that are not used never fail to load.
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
