// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration for anomaly detection and KPI aggregation
//!
//! Every analysis call takes its configuration explicitly, so several
//! configurations can coexist in one process (tests, what-if runs).
//! Values can be loaded from TOML; missing keys fall back to the defaults
//! below.
//!
//! ```toml
//! [anomaly]
//! channel = "current_A"
//! window = 30
//! threshold = 3.0
//!
//! [kpi]
//! nominal_voltage = 400.0
//! power_factor = 0.85
//! sampling_interval_minutes = 1.0
//! ```

use crate::error::ConfigError;
use crate::sample::Channel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default rolling window, in samples
pub const DEFAULT_WINDOW: usize = 30;

/// Default z-score threshold, in standard deviations
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Default nominal supply voltage (V)
pub const DEFAULT_NOMINAL_VOLTAGE: f64 = 400.0;

/// Default assumed power factor
pub const DEFAULT_POWER_FACTOR: f64 = 0.85;

/// Default sampling interval (minutes)
pub const DEFAULT_SAMPLING_INTERVAL_MINUTES: f64 = 1.0;

/// Rolling z-score detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Channel scored for anomalies
    pub channel: Channel,

    /// Trailing window length in samples (>= 1)
    pub window: usize,

    /// Flag a sample when |z| exceeds this many standard deviations
    pub threshold: f64,

    /// Channels that get a rolling mean attached to the annotated output
    pub context_channels: Vec<Channel>,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Current,
            window: DEFAULT_WINDOW,
            threshold: DEFAULT_THRESHOLD,
            context_channels: vec![Channel::Temperature, Channel::Vibration],
        }
    }
}

impl AnomalyConfig {
    /// Default settings scoring `channel`
    pub fn for_channel(channel: Channel) -> Self {
        Self {
            channel,
            ..Self::default()
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_context_channels(mut self, channels: Vec<Channel>) -> Self {
        self.context_channels = channels;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_window(self.window)?;
        validate_threshold(self.threshold)
    }
}

/// Energy and operational KPI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    /// Used in place of a missing voltage reading (V)
    pub nominal_voltage: f64,

    /// Assumed power factor, 0 < pf <= 1
    pub power_factor: f64,

    /// Time represented by one sample (minutes)
    pub sampling_interval_minutes: f64,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            nominal_voltage: DEFAULT_NOMINAL_VOLTAGE,
            power_factor: DEFAULT_POWER_FACTOR,
            sampling_interval_minutes: DEFAULT_SAMPLING_INTERVAL_MINUTES,
        }
    }
}

impl KpiConfig {
    pub fn new(nominal_voltage: f64, power_factor: f64, sampling_interval_minutes: f64) -> Self {
        Self {
            nominal_voltage,
            power_factor,
            sampling_interval_minutes,
        }
    }

    /// Hours represented by one sample
    pub fn hours_per_sample(&self) -> f64 {
        self.sampling_interval_minutes / 60.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.power_factor > 0.0 && self.power_factor <= 1.0) {
            return Err(ConfigError::PowerFactorOutOfRange(self.power_factor));
        }
        if !(self.sampling_interval_minutes.is_finite() && self.sampling_interval_minutes > 0.0) {
            return Err(ConfigError::NonPositiveSamplingInterval(
                self.sampling_interval_minutes,
            ));
        }
        if !(self.nominal_voltage.is_finite() && self.nominal_voltage > 0.0) {
            return Err(ConfigError::NonPositiveNominalVoltage(self.nominal_voltage));
        }
        Ok(())
    }
}

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub anomaly: AnomalyConfig,
    pub kpi: KpiConfig,
}

impl AnalysisConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.anomaly.validate()?;
        self.kpi.validate()
    }
}

pub fn validate_window(window: usize) -> Result<(), ConfigError> {
    if window == 0 {
        return Err(ConfigError::NonPositiveWindow);
    }
    Ok(())
}

pub fn validate_threshold(threshold: f64) -> Result<(), ConfigError> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(ConfigError::NonPositiveThreshold(threshold));
    }
    Ok(())
}
