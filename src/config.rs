use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub prefixes: PrefixConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Suppress the console echo of both stdout routes.
    #[serde(default)]
    pub disable_stdout: bool,

    /// Upper bound for a single line on any monitored stream.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

fn default_max_line_bytes() -> usize {
    8 * 1024 * 1024
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            disable_stdout: false,
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixConfig {
    #[serde(default = "default_program1_stdout")]
    pub program1_stdout: String,

    #[serde(default = "default_program1_stderr")]
    pub program1_stderr: String,

    #[serde(default = "default_program2_stdout")]
    pub program2_stdout: String,

    #[serde(default = "default_program2_stderr")]
    pub program2_stderr: String,
}

fn default_program1_stdout() -> String {
    "Program 1 (stdout): ".to_string()
}

fn default_program1_stderr() -> String {
    "Program 1 (stderr): ".to_string()
}

fn default_program2_stdout() -> String {
    "Program 2 (stdout): ".to_string()
}

fn default_program2_stderr() -> String {
    "Program 2 (stderr): ".to_string()
}

impl Default for PrefixConfig {
    fn default() -> Self {
        Self {
            program1_stdout: default_program1_stdout(),
            program1_stderr: default_program1_stderr(),
            program2_stdout: default_program2_stdout(),
            program2_stderr: default_program2_stderr(),
        }
    }
}

/// Per-user config directory: ~/.crosswire
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".crosswire"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.crosswire/config.toml
    if let Ok(dir) = config_dir() {
        let user_config = dir.join("config.toml");
        if user_config.exists() {
            let s = std::fs::read_to_string(&user_config)?;
            return Ok(toml::from_str(&s)?);
        }
    }

    // Priority 2: ./crosswire.toml
    let local_config = Path::new("crosswire.toml");
    if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        return Ok(toml::from_str(&s)?);
    }

    Ok(AppConfig::default())
}
