use config::{Config as ConfigBuilder, File};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{FactorError, Result};

/// Target factored when neither the command line nor a config file names one.
/// It is prime, so a default run ends with "no factors found".
pub const DEFAULT_TARGET: u64 = 71;

/// Parses a target given as text. Only plain non-negative integers that fit
/// in a `u64` are accepted.
pub fn parse_target(s: &str) -> Result<u64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FactorError::invalid_input(format!(
            "'{}' is not a non-negative integer",
            s
        )));
    }
    trimmed.parse::<u64>().map_err(|_| {
        FactorError::invalid_input(format!("'{}' does not fit in a 64-bit unsigned integer", s))
    })
}

// YAML integers above i64::MAX arrive as floats; accepting them would
// silently factor a rounded number, so only exact integers and digit
// strings get through.
fn deserialize_target<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TargetVisitor;

    impl<'de> Visitor<'de> for TargetVisitor {
        type Value = Option<u64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer (quote values above 9223372036854775807)")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
            u64::try_from(v)
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
            parse_target(v).map(Some).map_err(E::custom)
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(TargetVisitor)
}

/// How much of the pipeline runs on the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParallelMode {
    /// Everything runs on the calling thread
    Sequential,
    /// Sequential sieve, parallel divisor search
    Search,
    /// Parallel sieve initialization, marking passes and divisor search
    #[default]
    Full,
}

impl ParallelMode {
    pub fn parallel_sieve(self) -> bool {
        self == ParallelMode::Full
    }

    pub fn parallel_search(self) -> bool {
        self != ParallelMode::Sequential
    }
}

impl fmt::Display for ParallelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParallelMode::Sequential => "sequential",
            ParallelMode::Search => "search",
            ParallelMode::Full => "full",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ParallelMode {
    type Err = FactorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(ParallelMode::Sequential),
            "search" => Ok(ParallelMode::Search),
            "full" => Ok(ParallelMode::Full),
            other => Err(FactorError::config_error(format!(
                "unknown parallel mode '{}' (expected sequential, search or full)",
                other
            ))),
        }
    }
}

/// Configuration for a factoring run.
///
/// # Configuration Locations
///
/// Files are layered in this order, later ones overriding earlier ones:
/// 1. Global `$HOME/.config/semifactor/config.yaml`
/// 2. Local `.semifactor.yaml` in the current directory
/// 3. Custom file given via `--config`
///
/// # Configuration Format
///
/// ```yaml
/// # Integer to factor; quote values above 9223372036854775807
/// target: "18446744030759878681"
///
/// # Worker count (default: CPU cores)
/// thread_count: 8
///
/// # sequential | search | full
/// mode: full
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// Command-line arguments take precedence over file values, see
/// [`FactorConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorConfig {
    /// The integer to factor; `None` means [`DEFAULT_TARGET`]
    #[serde(default, deserialize_with = "deserialize_target")]
    pub target: Option<u64>,

    /// Number of workers per parallel phase
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Which phases run in parallel
    #[serde(default)]
    pub mode: ParallelMode,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            target: None,
            thread_count: default_thread_count(),
            mode: ParallelMode::default(),
            log_level: default_log_level(),
        }
    }
}

/// Values supplied on the command line. `None` leaves the file value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub target: Option<u64>,
    pub thread_count: Option<NonZeroUsize>,
    pub mode: Option<ParallelMode>,
    pub log_level: Option<String>,
}

/// Global and local config files, in the order they are layered
pub fn default_locations() -> Vec<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("semifactor/config.yaml"))
        .into_iter()
        .chain(std::iter::once(PathBuf::from(".semifactor.yaml")))
        .collect()
}

impl FactorConfig {
    /// Creates a configuration for `target` with default settings
    pub fn for_target(target: u64) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    /// The integer to factor
    pub fn target(&self) -> u64 {
        self.target.unwrap_or(DEFAULT_TARGET)
    }

    /// Whether no layer named a target and the built-in default applies
    pub fn uses_default_target(&self) -> bool {
        self.target.is_none()
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus an explicit file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        Self::load_layered(&default_locations(), config_path)
    }

    /// Layers the existing files among `locations`, then `config_path`,
    /// which must exist when given
    pub fn load_layered(locations: &[PathBuf], config_path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        for path in locations {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if cli.target.is_some() {
            self.target = cli.target;
        }
        if let Some(threads) = cli.thread_count {
            self.thread_count = threads;
        }
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// Effective worker count; sequential runs always use one worker
    pub fn workers(&self) -> usize {
        match self.mode {
            ParallelMode::Sequential => 1,
            _ => self.thread_count.get(),
        }
    }
}
