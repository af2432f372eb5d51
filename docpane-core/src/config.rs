//! Configuration management for docpane

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::search::SearchMode;
use crate::sections::BreakingPoint;
use crate::security::{EventSource, SecurityEvent};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub breaking_point: BreakingPoint,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub mode: SearchMode,
    pub max_results: usize,
    pub max_content_matches: usize,
    /// Lines of context on each side of a content match
    pub context_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Render raw HTML found in Markdown as text
    pub escape_raw_html: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Exact,
            max_results: 20,
            max_content_matches: 3,
            context_lines: 1,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            escape_raw_html: true,
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "docpane")
            .map(|proj_dirs| proj_dirs.config_dir().join("docpane.toml"))
    }

    /// Load configuration from the platform path, falling back to defaults
    /// if missing. Also returns events describing security-relevant settings.
    pub fn load() -> Result<(Self, Vec<SecurityEvent>)> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_file(&path),
            _ => {
                let config = Self::default();
                let events = config.security_events("default");
                Ok((config, events))
            }
        }
    }

    /// Load an explicit config file, with its security events
    pub fn load_file(path: &Path) -> Result<(Self, Vec<SecurityEvent>)> {
        let config = Self::load_from(path)?;
        let events = config.security_events(&format!("config file {}", path.display()));
        Ok((config, events))
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if config.cache.capacity == 0 {
            log::warn!("cache capacity 0 is not allowed; using 1");
            config.cache.capacity = 1;
        }
        Ok(config)
    }

    fn security_events(&self, origin: &str) -> Vec<SecurityEvent> {
        let event = if self.security.escape_raw_html {
            SecurityEvent::info(format!("Raw HTML is escaped ({origin})"), EventSource::Config)
        } else {
            SecurityEvent::warning(
                format!("Raw HTML passes to the sanitizer unescaped ({origin})"),
                EventSource::Config,
            )
        };
        vec![event]
    }
}
