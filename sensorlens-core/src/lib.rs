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

//! Sensorlens Core
//!
//! Data model shared by the analysis and I/O crates:
//! - **Samples**: timestamped motor readings over five named channels
//! - **Time series**: strictly ordered, validated sample sequences
//! - **Configuration**: explicit anomaly and KPI settings, loadable from TOML
//! - **Errors**: input and configuration failures

pub mod config;
pub mod error;
pub mod sample;
pub mod series;

pub use config::{
    AnalysisConfig, AnomalyConfig, KpiConfig, DEFAULT_NOMINAL_VOLTAGE, DEFAULT_POWER_FACTOR,
    DEFAULT_SAMPLING_INTERVAL_MINUTES, DEFAULT_THRESHOLD, DEFAULT_WINDOW,
};
pub use error::{AnalysisError, AnalysisResult, ConfigError, InputError};
pub use sample::{Channel, Sample};
pub use series::TimeSeries;
