//! Run settings resolved from flags, environment, and `bft.toml`.
//!
//! Precedence: command-line flag, then `BFT_*` environment variable, then the
//! `[interpreter]` section of the config file, then the built-in default.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use cross_xdg::BaseDirs;

use crate::tape::DEFAULT_TAPE_LEN;

pub const ENV_CONFIG: &str = "BFT_CONFIG";
pub const ENV_TAPE_LEN: &str = "BFT_TAPE_LEN";
pub const ENV_MAX_STEPS: &str = "BFT_MAX_STEPS";
pub const ENV_TIMEOUT_MS: &str = "BFT_TIMEOUT_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for {key} from {origin}: {value:?}")]
    InvalidValue {
        key: &'static str,
        value: String,
        origin: &'static str,
    },

    #[error("{key} must be at least 1 (from {origin})")]
    Zero {
        key: &'static str,
        origin: &'static str,
    },
}

/// Values that may or may not be given at one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub tape_len: Option<usize>,
    pub max_steps: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl Overrides {
    /// Fill every unset field from `lower`.
    fn or(self, lower: Overrides) -> Overrides {
        Overrides {
            tape_len: self.tape_len.or(lower.tape_len),
            max_steps: self.max_steps.or(lower.max_steps),
            timeout_ms: self.timeout_ms.or(lower.timeout_ms),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub tape_len: usize,
    pub max_steps: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_len: DEFAULT_TAPE_LEN,
            max_steps: None,
            timeout_ms: None,
        }
    }
}

/// Resolve settings against the process environment and the config file.
pub fn resolve(flags: Overrides) -> Result<Settings, ConfigError> {
    let env = from_env(|key| std::env::var(key).ok())?;
    let file = load_file()?;
    settle(flags.or(env).or(file.unwrap_or_default()))
}

fn settle(merged: Overrides) -> Result<Settings, ConfigError> {
    if merged.tape_len == Some(0) {
        return Err(ConfigError::Zero {
            key: "tape_len",
            origin: "settings",
        });
    }
    Ok(Settings {
        tape_len: merged.tape_len.unwrap_or(DEFAULT_TAPE_LEN),
        max_steps: merged.max_steps,
        timeout_ms: merged.timeout_ms,
    })
}

/// Read the `BFT_*` variables through `lookup`.
pub fn from_env<F>(lookup: F) -> Result<Overrides, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(Overrides {
        tape_len: parse_opt(lookup(ENV_TAPE_LEN), ENV_TAPE_LEN, "environment")?,
        max_steps: parse_opt(lookup(ENV_MAX_STEPS), ENV_MAX_STEPS, "environment")?,
        timeout_ms: parse_opt(lookup(ENV_TIMEOUT_MS), ENV_TIMEOUT_MS, "environment")?,
    })
}

/// Location of the config file: `$BFT_CONFIG`, else `bft.toml` in the XDG
/// config home.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(ENV_CONFIG) {
        return Some(PathBuf::from(explicit));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bft.toml");
    Some(path)
}

/// Load the config file. A missing default file is not an error; a missing
/// file named by `BFT_CONFIG` is.
fn load_file() -> Result<Option<Overrides>, ConfigError> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    let explicit = std::env::var_os(ENV_CONFIG).is_some();

    match fs::read_to_string(&path) {
        Ok(content) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            parse_file(&content).map(Some)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => Ok(None),
        Err(source) => Err(ConfigError::Read { path, source }),
    }
}

/// Parse the `[interpreter]` section of a config file.
///
/// Very small hand-rolled reader: `key = value` lines, `#` comments, values
/// optionally quoted. Other sections and unknown keys are ignored.
pub fn parse_file(content: &str) -> Result<Overrides, ConfigError> {
    let mut in_section = false;
    let mut map: HashMap<&str, &str> = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line[1..line.len() - 1].trim() == "interpreter";
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, raw)) = line.split_once('=') {
            let raw = raw.trim();
            let value = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            map.insert(key.trim(), value);
        }
    }

    let get = |key: &str| map.get(key).map(|v| v.to_string());
    Ok(Overrides {
        tape_len: parse_opt(get("tape_len"), "tape_len", "config file")?,
        max_steps: parse_opt(get("max_steps"), "max_steps", "config file")?,
        timeout_ms: parse_opt(get("timeout_ms"), "timeout_ms", "config file")?,
    })
}

fn parse_opt<T: FromStr>(
    value: Option<String>,
    key: &'static str,
    origin: &'static str,
) -> Result<Option<T>, ConfigError> {
    match value {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: v, origin }),
    }
}
