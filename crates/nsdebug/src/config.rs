//! Debug logger configuration and management

use crate::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const MIN_NAME_WIDTH: usize = 2;
const MAX_NAME_WIDTH: usize = 256;

/// Main debug logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Initial enable spec, e.g. `"http:*,-http:noisy"`
    pub namespaces: Option<String>,

    /// Most verbose level a logger emits
    pub log_level: LogLevel,

    /// Force colors on or off; `None` follows the TTY status of stderr
    pub colors: Option<bool>,

    /// Print plain-mode dates in UTC rather than local time
    pub utc: bool,

    /// Render unconsumed object arguments on a single line
    pub inline_json: bool,

    /// Column width of the namespace label in colorized mode
    pub name_width: usize,

    /// Omit the date column in plain mode
    pub hide_date: bool,

    /// Nesting depth for inspected values; `None` is unlimited
    pub depth: Option<usize>,
}

/// Level threshold of a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    All,
}

impl LogLevel {
    /// Numeric threshold; a call proceeds when the logger's threshold is at
    /// least the call's.
    pub fn threshold(self) -> u32 {
        match self {
            LogLevel::Error => 200,
            LogLevel::Warn => 300,
            LogLevel::Info => 400,
            LogLevel::Debug => 500,
            LogLevel::All => u32::MAX,
        }
    }

    /// Whether a logger configured at `self` emits calls made at `call`.
    pub fn allows(self, call: LogLevel) -> bool {
        self.threshold() >= call.threshold()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::All => "ALL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "ERROR" => Ok(LogLevel::Error),
            "WARN" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "ALL" => Ok(LogLevel::All),
            _ => Err(Error::Config {
                message: format!("unknown DEBUG_LOG_LEVEL value '{}'", s),
            }),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

/// An environment string coerced into the value it most likely denotes
#[derive(Debug, Clone, PartialEq)]
pub enum EnvValue {
    Bool(bool),
    Null,
    Number(f64),
    Level(LogLevel),
    Text(String),
}

/// Coerce an environment string: level names, yes/no style booleans,
/// `null` and numbers are recognized, anything else stays text.
pub fn parse_booleanish(value: &str) -> EnvValue {
    if let Ok(level) = value.parse::<LogLevel>() {
        return EnvValue::Level(level);
    }

    match value.to_lowercase().as_str() {
        "yes" | "on" | "true" | "enabled" => return EnvValue::Bool(true),
        "no" | "off" | "false" | "disabled" => return EnvValue::Bool(false),
        _ => {}
    }

    if value == "null" {
        return EnvValue::Null;
    }

    match value.trim().parse::<f64>() {
        Ok(number) if !value.trim().is_empty() => EnvValue::Number(number),
        _ => EnvValue::Text(value.to_string()),
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            namespaces: None,
            log_level: LogLevel::All,
            colors: None,
            utc: true,
            inline_json: false,
            name_width: 10,
            hide_date: false,
            depth: Some(2),
        }
    }
}

impl DebugConfig {
    /// Load configuration from file, falling back to defaults, then apply
    /// `DEBUG*` environment overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        let mut config = if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)?;
            toml::from_str(&content).map_err(|e| Error::Config {
                message: format!("Failed to parse debug config: {}", e),
            })?
        } else {
            Self::default()
        };

        config.load_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            message: format!("Failed to serialize debug config: {}", e),
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Load environment variable overrides
    pub fn load_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(std::env::vars())
    }

    /// Apply `DEBUG` and `DEBUG_*` pairs. Keys match case-insensitively.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, raw) in vars {
            let key = key.as_ref();
            let raw = raw.as_ref();

            if key == "DEBUG" {
                self.namespaces = Some(raw.to_string());
                continue;
            }

            let Some(option) = key
                .get(..6)
                .filter(|prefix| prefix.eq_ignore_ascii_case("debug_"))
                .map(|_| key[6..].to_lowercase())
            else {
                continue;
            };

            let value = parse_booleanish(raw);
            match option.as_str() {
                "log_level" => {
                    self.log_level = match value {
                        EnvValue::Level(level) => level,
                        _ => {
                            return Err(Error::Config {
                                message: format!("unknown DEBUG_LOG_LEVEL value '{}'", raw),
                            })
                        }
                    }
                }
                "colors" => self.colors = Some(expect_bool(key, raw, value)?),
                "utc" => self.utc = expect_bool(key, raw, value)?,
                "inline_json" => self.inline_json = expect_bool(key, raw, value)?,
                "hide_date" => self.hide_date = expect_bool(key, raw, value)?,
                "name_width" => self.name_width = expect_count(key, raw, value)?,
                "depth" => {
                    self.depth = match value {
                        EnvValue::Null => None,
                        other => Some(expect_count(key, raw, other)?),
                    }
                }
                _ => {
                    tracing::trace!(
                        nsdebug.event = "env_ignored",
                        key,
                        "Unrecognized debug option"
                    );
                }
            }
        }

        Ok(())
    }

    /// Get default configuration file path
    fn default_config_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("com", "nsdebug", "nsdebug").ok_or_else(|| Error::Config {
                message: "Could not determine config directory".to_string(),
            })?;

        Ok(project_dirs.config_dir().join("nsdebug.toml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(MIN_NAME_WIDTH..=MAX_NAME_WIDTH).contains(&self.name_width) {
            return Err(Error::Config {
                message: format!(
                    "name_width must be between {} and {}, got {}",
                    MIN_NAME_WIDTH, MAX_NAME_WIDTH, self.name_width
                ),
            });
        }

        Ok(())
    }
}

fn expect_bool(key: &str, raw: &str, value: EnvValue) -> Result<bool> {
    match value {
        EnvValue::Bool(flag) => Ok(flag),
        EnvValue::Number(n) => Ok(n != 0.0),
        _ => Err(Error::Config {
            message: format!("{} expects a boolean, got '{}'", key, raw),
        }),
    }
}

fn expect_count(key: &str, raw: &str, value: EnvValue) -> Result<usize> {
    match value {
        EnvValue::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
            Ok(n as usize)
        }
        _ => Err(Error::Config {
            message: format!("{} expects a non-negative integer, got '{}'", key, raw),
        }),
    }
}
