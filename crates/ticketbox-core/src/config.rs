use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::view::DEFAULT_DATE_FORMAT;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "TICKETBOX_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long flash messages stay visible, in milliseconds.
    #[serde(default = "default_flash_ms")]
    pub flash_ms: u64,
    /// `strftime` pattern for created/modified timestamps.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            flash_ms: default_flash_ms(),
            date_format: default_date_format(),
        }
    }
}

impl UiConfig {
    #[must_use]
    pub const fn flash_ttl(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }
}

/// Location of the user config file, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ticketbox/config.toml"))
}

/// Load the user config, or defaults when there is none.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    match user_config_path() {
        Some(path) => load_user_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Load a user config from `path`; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Pick the data directory.
///
/// Precedence: `cli_dir` > `env_dir` (`TICKETBOX_DIR`) > config `data_dir` >
/// the platform data dir. Empty values are ignored.
///
/// # Errors
///
/// Returns an error when nothing is set and the platform has no data dir.
pub fn resolve_data_dir(
    cli_dir: Option<&Path>,
    env_dir: Option<&str>,
    config: &UserConfig,
) -> Result<PathBuf> {
    if let Some(dir) = cli_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env_dir.map(str::trim).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = config.data_dir.as_deref().filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir.to_path_buf());
    }
    dirs::data_dir()
        .map(|dir| dir.join("ticketbox"))
        .with_context(|| format!("No data directory found; pass --data-dir or set {DATA_DIR_ENV}"))
}

/// Map an output mode name to its canonical form.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

const fn default_flash_ms() -> u64 {
    1000
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_user_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_user_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, UserConfig::default());
        assert_eq!(cfg.ui.flash_ms, 1000);
        assert_eq!(cfg.ui.flash_ttl(), Duration::from_secs(1));
        assert_eq!(cfg.ui.date_format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn user_config_parses_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
output = "json"
data_dir = "/srv/tickets"

[ui]
flash_ms = 2500
date_format = "%d.%m.%Y %H:%M"
"#,
        )
        .unwrap();

        let cfg = load_user_config_from(&path).unwrap();
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/srv/tickets")));
        assert_eq!(cfg.ui.flash_ms, 2500);
        assert_eq!(cfg.ui.date_format, "%d.%m.%Y %H:%M");
    }

    #[test]
    fn partial_ui_section_keeps_other_defaults() {
        let cfg: UserConfig = toml::from_str("[ui]\nflash_ms = 10\n").unwrap();
        assert_eq!(cfg.ui.flash_ms, 10);
        assert_eq!(cfg.ui.date_format, DEFAULT_DATE_FORMAT);
        assert!(cfg.output.is_none());
    }

    #[test]
    fn invalid_user_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "output = [").unwrap();
        let err = load_user_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn data_dir_precedence() {
        let config = UserConfig {
            data_dir: Some(PathBuf::from("/from/config")),
            ..UserConfig::default()
        };

        let dir = resolve_data_dir(Some(Path::new("/from/cli")), Some("/from/env"), &config).unwrap();
        assert_eq!(dir, PathBuf::from("/from/cli"));

        let dir = resolve_data_dir(None, Some("/from/env"), &config).unwrap();
        assert_eq!(dir, PathBuf::from("/from/env"));

        let dir = resolve_data_dir(None, Some("  "), &config).unwrap();
        assert_eq!(dir, PathBuf::from("/from/config"));

        let dir = resolve_data_dir(None, None, &config).unwrap();
        assert_eq!(dir, PathBuf::from("/from/config"));
    }

    #[test]
    fn output_aliases_are_normalized() {
        assert_eq!(normalize_output_mode("JSON"), Some("json"));
        assert_eq!(normalize_output_mode("human"), Some("pretty"));
        assert_eq!(normalize_output_mode(" table "), Some("text"));
        assert_eq!(normalize_output_mode("fancy"), None);
    }
}
