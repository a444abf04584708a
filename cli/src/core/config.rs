//! # KRODE Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates the assistant's configuration:
//! chat session behavior (bot name, typing delay bounds) and an optional
//! custom rule file that replaces the built-in rule table.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.krode.toml` in the current directory or ancestors
//! 2. User-specific `config.toml` in the platform config directory
//!    (e.g. `~/.config/krode/config.toml`)
//! 3. Default values defined in the code
//!
//! Paths are expanded (`~` to the home directory) and the result is
//! validated before use.
//!
//! ## Examples
//!
//! ```toml
//! [chat]
//! bot_name = "PORTA"
//! min_delay_ms = 1000
//! max_delay_ms = 2000
//!
//! [rules]
//! file = "~/krode/rules.toml"
//! ```
//!
//! ```rust
//! let cfg = config::load_config()?;
//! let rules = cfg.rule_table(None)?;
//! ```
//!
use crate::core::error::{KrodeError, Result};
use crate::core::rules::RuleTable;
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, warn};

/// Upper bound for the cosmetic typing delay.
pub const MAX_TYPING_DELAY_MS: u64 = 10_000;

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

/// Settings for the interactive chat session (`krode chat`).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Name shown in front of bot replies.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    /// Lower bound of the simulated typing delay, in milliseconds.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    /// Upper bound of the simulated typing delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

/// Where the rule table comes from.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Optional path to a TOML rule file (can use ~). Uses the built-in table when unset.
    pub file: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_bot_name() -> String {
    "PORTA".to_string()
}
fn default_min_delay_ms() -> u64 {
    1000
}
fn default_max_delay_ms() -> u64 {
    2000
}

const PROJECT_CONFIG_FILENAME: &str = ".krode.toml";

impl Config {
    /// Resolves the rule table: an explicit `override_path` wins over the
    /// configured `rules.file`, which wins over the built-in table.
    pub fn rule_table(&self, override_path: Option<&Path>) -> Result<Arc<RuleTable>> {
        let path = match override_path {
            Some(p) => Some(PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref())),
            None => self.rules.file.as_ref().map(PathBuf::from),
        };
        match path {
            Some(p) => Ok(Arc::new(RuleTable::load(&p)?)),
            None => {
                debug!("Using built-in rule table");
                Ok(Arc::new(RuleTable::builtin().clone()))
            }
        }
    }
}

pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "KRODE", "krode") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        let mut config = load_config_from_path(&project_config_path)?;
        if let Some(base) = project_config_path.parent() {
            anchor_rule_file(&mut config, base);
        }
        Ok(Some(config))
    } else {
        debug!("No project configuration file (.krode.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// A relative `rules.file` in `.krode.toml` is relative to that file.
fn anchor_rule_file(config: &mut Config, base: &Path) {
    if let Some(file) = config.rules.file.as_mut() {
        if !file.starts_with('~') && Path::new(file.as_str()).is_relative() {
            *file = base.join(&*file).to_string_lossy().into_owned();
        }
    }
}

/// Walks up from `start` looking for `.krode.toml`, stopping at the first
/// directory that contains `.git`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values replace user values wherever the project file moved away
/// from the defaults.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();
    merged.chat.bot_name = if project_cfg.chat.bot_name != default_bot_name() {
        project_cfg.chat.bot_name
    } else {
        user.chat.bot_name
    };
    merged.chat.min_delay_ms = if project_cfg.chat.min_delay_ms != default_min_delay_ms() {
        project_cfg.chat.min_delay_ms
    } else {
        user.chat.min_delay_ms
    };
    merged.chat.max_delay_ms = if project_cfg.chat.max_delay_ms != default_max_delay_ms() {
        project_cfg.chat.max_delay_ms
    } else {
        user.chat.max_delay_ms
    };
    merged.rules.file = project_cfg.rules.file.or(user.rules.file);
    merged
}

fn expand_config_paths(config: &mut Config) {
    if let Some(file) = config.rules.file.as_mut() {
        *file = shellexpand::tilde(file).into_owned();
        debug!("Expanded rule file path: {}", file);
    }
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    if config.chat.bot_name.trim().is_empty() {
        return Err(anyhow!(KrodeError::Config(
            "chat.bot_name cannot be empty.".to_string()
        )));
    }
    if config.chat.min_delay_ms > config.chat.max_delay_ms {
        return Err(anyhow!(KrodeError::Config(format!(
            "chat.min_delay_ms ({}) must not exceed chat.max_delay_ms ({}).",
            config.chat.min_delay_ms, config.chat.max_delay_ms
        ))));
    }
    if config.chat.max_delay_ms > MAX_TYPING_DELAY_MS {
        return Err(anyhow!(KrodeError::Config(format!(
            "chat.max_delay_ms ({}) exceeds the limit of {} ms.",
            config.chat.max_delay_ms, MAX_TYPING_DELAY_MS
        ))));
    }
    if let Some(file) = &config.rules.file {
        let path = Path::new(file);
        if !path.is_file() {
            return Err(anyhow!(KrodeError::Config(format!(
                "Configured rule file '{}' does not exist or is not a file.",
                path.display()
            ))));
        }
    }
    info!("Configuration validation successful.");
    Ok(())
}
