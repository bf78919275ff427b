//! User configuration at `~/.shellbay/config.toml`.
//!
//! Every field has a default, so a missing file or a partial one is fine.
//! CLI flags override what is loaded here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shellbay_panel::KeyBindings;
use shellbay_pty::OutputMode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shell: ShellConfig,
    pub keys: KeyBindings,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Interpreter used as `<program> -c <command>`.
    pub program: String,
    pub output: OutputKind,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "/bin/sh".to_string(),
            output: OutputKind::Grid,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Grid,
    Text,
}

impl From<OutputKind> for OutputMode {
    fn from(kind: OutputKind) -> Self {
        match kind {
            OutputKind::Grid => OutputMode::Grid,
            OutputKind::Text => OutputMode::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file; a leading `~` is the home directory.
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: "~/.shellbay/shellbay.log".to_string(),
        }
    }
}

impl LogConfig {
    pub fn path(&self) -> PathBuf {
        expand_home(&self.file)
    }
}

/// `~/.shellbay/config.toml`, or a relative fallback without a home dir.
pub fn default_path() -> PathBuf {
    expand_home("~/.shellbay/config.toml")
}

pub fn expand_home(path: &str) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_default();
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None if path == "~" => home,
        None => PathBuf::from(path),
    }
}

impl Config {
    /// Load from a TOML file, returning defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }
}
