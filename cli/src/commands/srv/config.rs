//! # KRODE Site Server Configuration
//!
//! File: cli/src/commands/srv/config.rs
//!
//! ## Overview
//!
//! This module handles configuration loading, merging, and validation for
//! the site server. It combines settings from:
//! 1. Command-line arguments (highest priority)
//! 2. `.krode-srv.toml` inside the served directory (if present)
//! 3. Default values (lowest priority)
//!
//! ## Examples
//!
//! Configuration file format:
//!
//! ```toml
//! port = 9000
//! host = "0.0.0.0"
//! directory = "public"        # relative to this file
//! enable_cors = false
//! index_file = "index.html"
//! rules_file = "rules.toml"   # relative to this file
//! ```
//!
//! ```rust
//! let config = load_and_merge_config(args).await?;
//! println!("Serving {} on {}:{}", config.directory.display(), config.host, config.port);
//! ```
//!
//! All paths are resolved to absolute paths, and the served directory must
//! exist.
//!
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::net::IpAddr;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// The expected name for the server-specific configuration file.
const CONFIG_FILE_NAME: &str = ".krode-srv.toml";

/// # Server Command Arguments (`SrvArgs`)
///
/// Command-line arguments for `krode srv`. Values left at their defaults
/// can be overridden by `.krode-srv.toml`.
#[derive(Parser, Debug)]
pub struct SrvArgs {
    /// Root directory of the website to serve.
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Port to listen on. The next free port is used if it is taken.
    #[arg(long, short, default_value_t = 8000)]
    pub port: u16,

    /// Address to bind. `0.0.0.0` accepts connections from the network.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Disable CORS headers (enabled by default, permissive).
    #[arg(long)]
    pub no_cors: bool,

    /// File served for `/`.
    #[arg(long, short, default_value = "index.html")]
    pub index: String,

    /// Rule file for `/api/chat` instead of the configured or built-in rule table.
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

/// # Effective Server Configuration (`ServerConfig`)
///
/// Final settings after merging arguments, the config file and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub host: IpAddr,
    /// Absolute path of the served directory once resolved.
    pub directory: PathBuf,
    pub enable_cors: bool,
    pub index_file: String,
    /// Rule file backing `/api/chat`, if any.
    pub rules_file: Option<PathBuf>,
}

/// Raw `.krode-srv.toml` contents. Every field is optional.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    port: Option<u16>,
    host: Option<String>,
    directory: Option<String>,
    enable_cors: Option<bool>,
    index_file: Option<String>,
    rules_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            directory: PathBuf::from("."),
            enable_cors: true,
            index_file: "index.html".to_string(),
            rules_file: None,
        }
    }
}

/// # Load and Merge Server Configuration (`load_and_merge_config`)
///
/// Starts from the arguments, looks for `.krode-srv.toml` in the requested
/// directory and lets the file fill in every setting the user left at its
/// default. `--no-cors` and `--rules` always win when given. The served
/// directory is then resolved and validated.
///
/// ## Errors
///
/// Returns an error if the config file cannot be read or parsed, or if the
/// resolved directory does not exist or is not a directory.
pub async fn load_and_merge_config(args: SrvArgs) -> Result<ServerConfig> {
    let mut effective_config = ServerConfig::from_args(&args);
    let cli_defaults = SrvArgs::parse_from([""]);

    let config_search_dir = if args.directory.is_absolute() {
        args.directory.clone()
    } else {
        env::current_dir()
            .context("Failed to get current working directory")?
            .join(&args.directory)
    };
    debug!(
        "Looking for config file in: {}",
        config_search_dir.display()
    );

    if let Some(file_config) = load_config_from_dir(&config_search_dir)? {
        info!(
            "Loaded settings from {}",
            config_search_dir.join(CONFIG_FILE_NAME).display()
        );

        if args.port == cli_defaults.port {
            effective_config.port = file_config.port;
        }
        if args.host == cli_defaults.host {
            effective_config.host = file_config.host;
        }
        if args.index == cli_defaults.index {
            effective_config.index_file = file_config.index_file;
        }
        if !args.no_cors {
            effective_config.enable_cors = file_config.enable_cors;
        }
        if args.rules.is_none() {
            effective_config.rules_file = file_config.rules_file;
        }
        effective_config.directory = file_config.directory;
    } else {
        debug!("No config file found or loaded. Using arguments.");
    }

    effective_config.resolve_directory().await?;
    effective_config.check_index_file();

    Ok(effective_config)
}

/// Reads `.krode-srv.toml` from `search_dir`. Relative `directory` and
/// `rules_file` entries are resolved against `search_dir`. Returns
/// `Ok(None)` when there is no such file.
fn load_config_from_dir(search_dir: &Path) -> Result<Option<ServerConfig>> {
    let config_path = search_dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        debug!("No config file found at {}", config_path.display());
        return Ok(None);
    }

    info!("Loading configuration from {}", config_path.display());
    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let file_config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    let defaults = ServerConfig::default();

    let host = match file_config.host {
        Some(ref host_str) => host_str.parse().unwrap_or_else(|e| {
            warn!(
                "Invalid host IP '{}' in config file ({}), using default {}",
                host_str, e, defaults.host
            );
            defaults.host
        }),
        None => defaults.host,
    };

    let relative_to_file = |p: &str| {
        let path = PathBuf::from(p);
        if path.is_relative() {
            search_dir.join(path)
        } else {
            path
        }
    };

    Ok(Some(ServerConfig {
        port: file_config.port.unwrap_or(defaults.port),
        host,
        directory: relative_to_file(file_config.directory.as_deref().unwrap_or(".")),
        enable_cors: file_config.enable_cors.unwrap_or(defaults.enable_cors),
        index_file: file_config.index_file.unwrap_or(defaults.index_file),
        rules_file: file_config.rules_file.as_deref().map(relative_to_file),
    }))
}

impl ServerConfig {
    fn from_args(args: &SrvArgs) -> Self {
        Self {
            port: args.port,
            host: args.host,
            directory: args.directory.clone(),
            enable_cors: !args.no_cors,
            index_file: args.index.clone(),
            rules_file: args.rules.clone(),
        }
    }

    /// Makes `directory` absolute and canonical, and checks that it is a
    /// directory.
    async fn resolve_directory(&mut self) -> Result<()> {
        let absolute_path = if self.directory.is_absolute() {
            self.directory.clone()
        } else {
            env::current_dir()
                .context("Failed to get current working directory")?
                .join(&self.directory)
        };

        let canonical_path = tokio::fs::canonicalize(&absolute_path)
            .await
            .with_context(|| {
                format!(
                    "Directory '{}' could not be found or accessed",
                    absolute_path.display()
                )
            })?;
        let metadata = tokio::fs::metadata(&canonical_path)
            .await
            .with_context(|| {
                format!("Failed to get metadata for path '{}'", canonical_path.display())
            })?;
        if !metadata.is_dir() {
            anyhow::bail!("Path is not a directory: {}", canonical_path.display());
        }

        self.directory = canonical_path;
        debug!("Resolved serving directory to: {}", self.directory.display());
        Ok(())
    }

    /// A missing index file is not fatal: `/` answers 404 until it exists.
    fn check_index_file(&self) {
        let index_path = self.directory.join(&self.index_file);
        if !index_path.is_file() {
            warn!(
                "Index file '{}' not found in {}; '/' will return 404.",
                self.index_file,
                self.directory.display()
            );
        }
    }
}
