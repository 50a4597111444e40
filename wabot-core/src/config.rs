//! Configuration loading for wabot
//!
//! Settings are merged from four layers, later layers winning:
//! - Built-in defaults
//! - Environment variables (after loading a local `.env` file)
//! - An optional JSON file passed with `--config`
//! - The `--port` and `--public` command line flags
//!
//! The result is built once at startup and never reloaded.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Unknown mode: {0:?}")]
    UnknownMode(String),
}

/// Command line flags
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "wabot", version, about = "WhatsApp bot status server")]
pub struct Flags {
    /// Port number
    #[arg(long)]
    pub port: Option<String>,

    /// Run in public mode
    #[arg(long)]
    pub public: bool,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Who the bot answers to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Public,
    Private,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Mode::Public),
            "private" => Ok(Mode::Private),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Public => f.write_str("public"),
            Mode::Private => f.write_str("private"),
        }
    }
}

/// Bot settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Command handler prefix
    pub handlers: String,

    /// Privileged user identifier
    pub sudo: String,

    /// Operating mode
    pub mode: Mode,

    /// Log incoming messages
    pub log_msg: bool,

    /// Mark messages as read
    pub read_msg: bool,

    /// Mark commands as read
    pub read_cmd: bool,

    /// Report handler errors back to the chat
    pub error_msg: bool,

    /// Offer QR login
    pub qr: bool,

    /// HTTP listen port. Not validated here; a bad value fails at bind time.
    pub port: String,
}

/// Raw JSON config file. Keys match field names case-insensitively;
/// absent keys leave the value alone and unknown keys are ignored.
#[derive(Debug, Default)]
struct ConfigFile(Map<String, Value>);

// Default value functions
fn default_handlers() -> String {
    ".".to_string()
}
fn default_port() -> String {
    crate::DEFAULT_PORT.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handlers: default_handlers(),
            sudo: String::new(),
            mode: Mode::default(),
            log_msg: default_true(),
            read_msg: default_true(),
            read_cmd: default_true(),
            error_msg: default_true(),
            qr: default_true(),
            port: default_port(),
        }
    }
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self(serde_json::from_str(&content)?))
    }

    /// Apply each field on its own; a value of the wrong type is skipped.
    fn apply_to(self, config: &mut Config) {
        for (key, value) in self.0 {
            if value.is_null() {
                continue;
            }

            let applied = match key.to_ascii_lowercase().as_str() {
                "handlers" => set_string(&mut config.handlers, value),
                "sudo" => set_string(&mut config.sudo, value),
                "port" => set_string(&mut config.port, value),
                "mode" => match value.as_str().map(str::parse::<Mode>) {
                    Some(Ok(mode)) => {
                        config.mode = mode;
                        true
                    }
                    _ => false,
                },
                "log_msg" => set_bool(&mut config.log_msg, &value),
                "read_msg" => set_bool(&mut config.read_msg, &value),
                "read_cmd" => set_bool(&mut config.read_cmd, &value),
                "error_msg" => set_bool(&mut config.error_msg, &value),
                "qr" => set_bool(&mut config.qr, &value),
                _ => continue,
            };

            if !applied {
                tracing::warn!(key = %key, "Ignoring config file field with unexpected value");
            }
        }
    }
}

fn set_string(slot: &mut String, value: Value) -> bool {
    match value {
        Value::String(s) => {
            *slot = s;
            true
        }
        _ => false,
    }
}

fn set_bool(slot: &mut bool, value: &Value) -> bool {
    match value.as_bool() {
        Some(b) => {
            *slot = b;
            true
        }
        None => false,
    }
}

impl Config {
    /// Load settings for this process: `.env`, environment, `--config` file and flags.
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, "No .env file loaded");
        }

        let flags = Flags::parse();
        Self::load_from(&flags, |key| std::env::var(key).ok())
    }

    /// Merge all layers using the given flags and environment lookup.
    pub fn load_from<F>(flags: &Flags, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_env(env);

        if let Some(path) = flags.config.as_deref() {
            match ConfigFile::read(path) {
                Ok(file) => file.apply_to(&mut config),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring config file"
                ),
            }
        }

        if let Some(port) = flags.port.as_deref().filter(|p| !p.is_empty()) {
            config.port = port.to_string();
        }

        if flags.public {
            config.mode = Mode::Public;
        }

        config
    }

    /// Defaults overlaid with environment variables.
    pub fn from_env<F>(env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());

        let mode = match lookup("MODE") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default mode");
                defaults.mode
            }),
            None => defaults.mode,
        };
        let flag = |key: &str, default: bool| lookup(key).and_then(|v| parse_bool(&v)).unwrap_or(default);

        Self {
            handlers: lookup("HANDLERS").unwrap_or(defaults.handlers),
            sudo: lookup("SUDO").unwrap_or(defaults.sudo),
            mode,
            log_msg: flag("LOG_MSG", defaults.log_msg),
            read_msg: flag("READ_MSG", defaults.read_msg),
            read_cmd: flag("READ_CMD", defaults.read_cmd),
            error_msg: flag("ERROR_MSG", defaults.error_msg),
            qr: flag("QR", defaults.qr),
            port: lookup("PORT").unwrap_or(defaults.port),
        }
    }

    /// Socket address the status server binds, on all interfaces.
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
