//! Runtime configuration.
//!
//! Loading order:
//! 1. `--config <path>` / `VIBSCOPE_CONFIG` (a broken file here is fatal)
//! 2. `vibscope.json` in the working directory (falls back on error)
//! 3. Built-in defaults: 100 Hz for 1 s on an ADXL345 at `/dev/i2c-1`, 0x53
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::drivers::CycleSettings;

pub const LOCAL_CONFIG_FILE: &str = "vibscope.json";
pub const DEFAULT_BUS: &str = "/dev/i2c-1";
pub const DEFAULT_ADDRESS: u16 = 0x53;
/// Upper bound on `sample_rate_hz * duration_secs` for one cycle.
pub const MAX_SAMPLES_PER_CYCLE: usize = 1 << 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SensorConfig {
    Adxl345 {
        #[serde(default = "default_bus")]
        bus: String,
        #[serde(default = "default_address")]
        address: u16,
    },
    Simulated {
        #[serde(default = "default_sim_frequency")]
        frequency_hz: f64,
        #[serde(default = "default_sim_amplitude")]
        amplitude_g: f64,
        #[serde(default)]
        noise_g: f64,
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

impl SensorConfig {
    pub fn simulated() -> Self {
        SensorConfig::Simulated {
            frequency_hz: default_sim_frequency(),
            amplitude_g: default_sim_amplitude(),
            noise_g: 0.0,
            seed: default_seed(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig::Adxl345 {
            bus: default_bus(),
            address: default_address(),
        }
    }
}

fn default_bus() -> String {
    DEFAULT_BUS.to_owned()
}
fn default_address() -> u16 {
    DEFAULT_ADDRESS
}
fn default_sim_frequency() -> f64 {
    10.0
}
fn default_sim_amplitude() -> f64 {
    0.05
}
fn default_seed() -> u64 {
    7
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub sample_rate_hz: f64,
    pub duration_secs: f64,
    pub read_timeout_ms: u64,
    pub tick_interval_ms: u64,
    pub display_capacity: usize,
    pub sensor: SensorConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 100.0,
            duration_secs: 1.0,
            read_timeout_ms: 50,
            tick_interval_ms: 500,
            display_capacity: 50,
            sensor: SensorConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Resolves the configuration following the module-level loading order.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!("loaded config from {}", path.display());
            return Ok(config);
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("loaded config from ./{LOCAL_CONFIG_FILE}");
                    return Ok(config);
                }
                Err(e) => warn!("{e}; using defaults"),
            }
        }
        info!("no config file found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(invalid("sample_rate_hz", "must be a positive number"));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(invalid("duration_secs", "must be a positive number"));
        }
        if self.n_samples() == 0 {
            return Err(invalid(
                "duration_secs",
                "sample_rate_hz * duration_secs yields no samples",
            ));
        }
        if self.n_samples() > MAX_SAMPLES_PER_CYCLE {
            return Err(ConfigError::Invalid {
                field: "duration_secs",
                reason: format!(
                    "sample_rate_hz * duration_secs exceeds {MAX_SAMPLES_PER_CYCLE} samples per cycle"
                ),
            });
        }
        if self.read_timeout_ms == 0 {
            return Err(invalid("read_timeout_ms", "must be at least 1"));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be at least 1"));
        }
        if self.display_capacity == 0 {
            return Err(invalid("display_capacity", "must be at least 1"));
        }
        Ok(())
    }

    /// Samples per cycle: `floor(sample_rate_hz * duration_secs)`.
    pub fn n_samples(&self) -> usize {
        (self.sample_rate_hz * self.duration_secs).floor() as usize
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn cycle_settings(&self) -> CycleSettings {
        CycleSettings {
            n_samples: self.n_samples(),
            sample_rate_hz: self.sample_rate_hz,
            read_timeout: self.read_timeout(),
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}
