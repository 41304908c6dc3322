use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("centerline").join("config.toml"))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub ledger: LedgerSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Center windows when an application activates or opens a window.
    #[serde(default = "yes")]
    pub auto_center: bool,
    /// Run the retry loop against the frontmost application at start-up.
    #[serde(default = "yes")]
    pub center_on_launch: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LedgerSettings {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn yes() -> bool { true }

fn default_attempts() -> u32 { 12 }

fn default_interval_ms() -> u64 { 350 }

fn default_initial_delay_ms() -> u64 { 150 }

fn default_capacity() -> usize { 200 }

impl Default for Settings {
    fn default() -> Self { Settings { auto_center: true, center_on_launch: true } }
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            attempts: default_attempts(),
            interval_ms: default_interval_ms(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self { LedgerSettings { capacity: default_capacity() } }
}

impl RetrySettings {
    pub fn interval(&self) -> Duration { Duration::from_millis(self.interval_ms) }

    pub fn initial_delay(&self) -> Duration { Duration::from_millis(self.initial_delay_ms) }
}

impl Config {
    /// Reads the config at `path`, falling back to defaults if it does not exist.
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = match fs::read_to_string(path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        Self::parse(&buf).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.retry.attempts == 0 {
            bail!("retry.attempts must be at least 1");
        }
        if self.retry.interval_ms == 0 {
            bail!("retry.interval_ms must be positive");
        }
        if self.ledger.capacity == 0 {
            bail!("ledger.capacity must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.retry.attempts, 12);
        assert_eq!(config.retry.interval(), Duration::from_millis(350));
        assert_eq!(config.ledger.capacity, 200);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = Config::parse(
            r#"
            [settings]
            auto_center = false

            [retry]
            attempts = 3
            "#,
        )
        .unwrap();
        assert!(!config.settings.auto_center);
        assert!(config.settings.center_on_launch);
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.interval_ms, 350);
    }

    #[test]
    fn rejects_zero_attempts_and_unknown_keys() {
        assert!(Config::parse("[retry]\nattempts = 0").is_err());
        assert!(Config::parse("[ledger]\ncapacity = 0").is_err());
        assert!(Config::parse("[settings]\nbogus = 1").is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_file_and_names_it_in_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "[retry]\ninitial_delay_ms = 500\n").unwrap();
        let config = Config::read(&path).unwrap();
        assert_eq!(config.retry.initial_delay(), Duration::from_millis(500));

        fs::write(&path, "[retry\n").unwrap();
        let err = Config::read(&path).unwrap_err();
        assert!(format!("{err}").contains("config.toml"), "{err:?}");
    }
}
