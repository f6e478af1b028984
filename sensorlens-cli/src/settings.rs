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

//! Command-line settings: file, environment, then flags

use anyhow::{Context, Result};
use sensorlens_core::{AnalysisConfig, AnomalyConfig, Channel, KpiConfig};
use sensorlens_io::LoaderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the binary can be configured with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub anomaly: AnomalyConfig,
    pub kpi: KpiConfig,
    pub loader: LoaderConfig,
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub channel: Option<Channel>,
    pub window: Option<usize>,
    pub threshold: Option<f64>,
    pub nominal_voltage: Option<f64>,
    pub power_factor: Option<f64>,
    pub sampling_interval_minutes: Option<f64>,
    pub strict_order: bool,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(settings)
    }

    /// Load settings with priority: flags > env > file > defaults
    ///
    /// Supported environment variables:
    /// - SENSORLENS_CHANNEL: monitored channel (`current_A` or `current`)
    /// - SENSORLENS_WINDOW: rolling window in samples
    /// - SENSORLENS_THRESHOLD: z-score threshold
    pub fn load(config_file: Option<PathBuf>, overrides: &Overrides) -> Result<Self> {
        let mut settings = match config_file {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        settings.merge_env(|key| std::env::var(key).ok())?;
        settings.apply(overrides);
        settings.analysis().validate()?;
        Ok(settings)
    }

    fn merge_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(channel) = lookup("SENSORLENS_CHANNEL") {
            self.anomaly.channel = channel.parse()?;
        }
        if let Some(window) = lookup("SENSORLENS_WINDOW") {
            self.anomaly.window = window
                .parse()
                .with_context(|| format!("SENSORLENS_WINDOW is not a window size: {}", window))?;
        }
        if let Some(threshold) = lookup("SENSORLENS_THRESHOLD") {
            self.anomaly.threshold = threshold
                .parse()
                .with_context(|| format!("SENSORLENS_THRESHOLD is not a number: {}", threshold))?;
        }
        Ok(())
    }

    fn apply(&mut self, overrides: &Overrides) {
        if let Some(channel) = overrides.channel {
            self.anomaly.channel = channel;
        }
        if let Some(window) = overrides.window {
            self.anomaly.window = window;
        }
        if let Some(threshold) = overrides.threshold {
            self.anomaly.threshold = threshold;
        }
        if let Some(voltage) = overrides.nominal_voltage {
            self.kpi.nominal_voltage = voltage;
        }
        if let Some(pf) = overrides.power_factor {
            self.kpi.power_factor = pf;
        }
        if let Some(interval) = overrides.sampling_interval_minutes {
            self.kpi.sampling_interval_minutes = interval;
        }
        if overrides.strict_order {
            self.loader.sort_by_timestamp = false;
        }
    }

    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            anomaly: self.anomaly.clone(),
            kpi: self.kpi.clone(),
        }
    }
}
