// Run configuration: rc file, environment and command-line overrides

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TARGET_LANG: &str = "en";

pub const ENV_BASE_URL: &str = "DUBSIM_API_URL";
pub const ENV_DELAY_MS: &str = "DUBSIM_DELAY_MS";

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub delay: Duration,
    pub timeout: Duration,
    pub target_lang: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
        }
    }
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub delay_ms: Option<u64>,
    pub target_lang: Option<String>,
}

impl Config {
    /// Get the configuration file path (`~/.dubsim/rc`)
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".dubsim").join("rc"))
    }

    /// Resolve: command line > environment > rc file > defaults
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::default(),
        };

        config.apply_env(|name| std::env::var(name).ok())?;

        if let Some(url) = &overrides.base_url {
            config.base_url = url.clone();
        }
        if let Some(ms) = overrides.delay_ms {
            config.delay = Duration::from_millis(ms);
        }
        if let Some(lang) = &overrides.target_lang {
            config.target_lang = lang.clone();
        }

        log::debug!("Resolved config: {:?}", config);
        Ok(config)
    }

    /// Apply `DUBSIM_*` variables; unset and blank values leave the setting alone
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url.trim().to_string();
        }
        if let Some(delay) = get(ENV_DELAY_MS) {
            let ms = delay
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow!("Invalid {}: '{}'. Expected milliseconds.", ENV_DELAY_MS, delay))?;
            self.delay = Duration::from_millis(ms);
        }
        Ok(())
    }

    /// Load an rc file on top of the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse `key=value` lines; blank lines and `#` comments are skipped
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected key=value, got '{}'", idx + 1, line))?;
            let key = key.trim();
            let value = value.trim();

            match key {
                "api.url" => config.base_url = value.to_string(),
                "delay.ms" => {
                    let ms = parse_number(key, value, idx + 1)?;
                    config.delay = Duration::from_millis(ms);
                }
                "timeout.secs" => {
                    let secs = parse_number(key, value, idx + 1)?;
                    config.timeout = Duration::from_secs(secs);
                }
                "target.lang" => config.target_lang = value.to_string(),
                other => log::warn!("Ignoring unknown config key '{}' on line {}", other, idx + 1),
            }
        }

        Ok(config)
    }
}

fn parse_number(key: &str, value: &str, line: usize) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| anyhow!("line {}: invalid value for {}: '{}'", line, key, value))
}
