//! Per-host chat platform table.
//!
//! Platforms are data: each entry lists the hosts it applies to, CSS selectors
//! to try in priority order, substrings that identify user and assistant
//! turns in lower-cased markup, and a regex that marks a URL path as a private
//! conversation. The built-in table is compiled into the binary; a user file
//! can replace or add entries by host.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use super::ChatRole;
use crate::{CaptureError, Result};

const BUILTIN_PLATFORMS: &str = include_str!("platforms.json");

static BUILTIN_REGISTRY: LazyLock<PlatformRegistry> =
    LazyLock::new(|| match PlatformRegistry::from_json(BUILTIN_PLATFORMS) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "built-in platform table is invalid");
            PlatformRegistry::empty()
        }
    });

/// Declarative description of one chat platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Hostnames this entry applies to, matched exactly
    pub hosts: Vec<String>,
    /// Name reported as `platformName`
    pub display_name: String,
    /// Message selectors in priority order
    pub message_selectors: Vec<String>,
    /// Substrings in lower-cased markup that mark a user turn
    #[serde(default)]
    pub user_hints: Vec<String>,
    /// Substrings in lower-cased markup that mark an assistant turn
    #[serde(default)]
    pub assistant_hints: Vec<String>,
    /// Regex over the URL path that marks a private conversation
    #[serde(default)]
    pub private_link_pattern: Option<String>,
}

/// On-disk shape of a platform table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformTable {
    #[serde(default = "default_table_version")]
    pub version: u32,
    pub platforms: Vec<PlatformConfig>,
}

fn default_table_version() -> u32 {
    1
}

/// A validated platform entry with its private-link pattern compiled.
#[derive(Debug, Clone)]
pub struct Platform {
    config: PlatformConfig,
    private_link: Option<Regex>,
}

impl Platform {
    /// Validate a config entry.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::ConfigError`] if the entry has no hosts, no
    /// selectors, or an invalid private-link pattern.
    pub fn new(mut config: PlatformConfig) -> Result<Self> {
        if config.hosts.is_empty() {
            return Err(CaptureError::ConfigError(format!("Platform '{}' has no hosts", config.display_name)));
        }
        if config.message_selectors.is_empty() {
            return Err(CaptureError::ConfigError(format!(
                "Platform '{}' has no message selectors",
                config.display_name
            )));
        }

        let private_link = config
            .private_link_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| {
                CaptureError::ConfigError(format!("Invalid private link pattern for '{}': {}", config.display_name, e))
            })?;

        for host in &mut config.hosts {
            *host = host.trim().to_ascii_lowercase();
        }
        for hint in config.user_hints.iter_mut().chain(config.assistant_hints.iter_mut()) {
            *hint = hint.to_lowercase();
        }

        Ok(Self { config, private_link })
    }

    pub fn display_name(&self) -> &str {
        &self.config.display_name
    }

    pub fn message_selectors(&self) -> &[String] {
        &self.config.message_selectors
    }

    /// Whether the URL looks like a private, user-specific conversation.
    pub fn is_private_link(&self, url: &Url) -> bool {
        self.private_link.as_ref().is_some_and(|re| re.is_match(url.path()))
    }

    /// Role named by lower-cased markup; user hints are checked first.
    pub fn classify(&self, markup_lower: &str) -> Option<ChatRole> {
        if self.config.user_hints.iter().any(|hint| markup_lower.contains(hint.as_str())) {
            return Some(ChatRole::User);
        }
        if self
            .config
            .assistant_hints
            .iter()
            .any(|hint| markup_lower.contains(hint.as_str()))
        {
            return Some(ChatRole::Assistant);
        }
        None
    }
}

/// Host-indexed set of chat platforms.
///
/// # Example
///
/// ```rust
/// use contextprompt_core::chat::PlatformRegistry;
///
/// let registry = PlatformRegistry::builtin();
/// assert_eq!(registry.lookup("claude.ai").unwrap().display_name(), "Claude");
/// assert!(registry.lookup("example.com").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    platforms: Vec<Platform>,
    by_host: HashMap<String, usize>,
}

impl PlatformRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table compiled into the crate.
    pub fn builtin() -> &'static PlatformRegistry {
        &BUILTIN_REGISTRY
    }

    /// Parse and validate a JSON platform table.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: PlatformTable = serde_json::from_str(json)?;
        Self::from_table(table)
    }

    pub fn from_table(table: PlatformTable) -> Result<Self> {
        let mut registry = Self::empty();
        for config in table.platforms {
            registry.insert(Platform::new(config)?);
        }
        Ok(registry)
    }

    /// Add a platform; its hosts replace any earlier mapping.
    pub fn insert(&mut self, platform: Platform) {
        let index = self.platforms.len();
        for host in &platform.config.hosts {
            self.by_host.insert(host.clone(), index);
        }
        self.platforms.push(platform);
    }

    /// Overlay another registry, host by host.
    pub fn merge(&mut self, other: PlatformRegistry) {
        for platform in other.platforms {
            self.insert(platform);
        }
    }

    /// Built-in table overlaid with a user file.
    ///
    /// With `path = None` the default location
    /// ([`PlatformRegistry::default_override_path`]) is used and a missing file
    /// is not an error. An explicit path must exist.
    pub fn load_with_overrides(path: Option<&Path>) -> Result<Self> {
        let mut registry = Self::builtin().clone();

        let override_path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_override_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(registry),
            },
        };

        let json = fs::read_to_string(&override_path)?;
        let overrides = Self::from_json(&json)?;
        debug!(path = %override_path.display(), platforms = overrides.platforms.len(), "loaded platform overrides");
        registry.merge(overrides);

        Ok(registry)
    }

    /// `<config dir>/contextprompt/platforms.json`
    pub fn default_override_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("contextprompt").join("platforms.json"))
    }

    /// Exact, case-insensitive hostname lookup.
    pub fn lookup(&self, host: &str) -> Option<&Platform> {
        let host = host.trim().to_ascii_lowercase();
        self.by_host.get(&host).and_then(|index| self.platforms.get(*index))
    }

    /// Hostnames currently mapped, sorted.
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.by_host.keys().map(String::as_str).collect();
        hosts.sort_unstable();
        hosts
    }
}
