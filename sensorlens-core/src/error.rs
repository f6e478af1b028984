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

//! Error types for series validation and analysis configuration.
//!
//! Undefined statistics (short history, zero variance) are not errors and
//! never appear here; they are modelled as `None` in the derived outputs.

use crate::sample::Channel;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Problems with the series handed to an analysis component
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// A sample has no usable reading for the requested channel
    #[error("Channel {channel} has no reading at index {index} ({timestamp})")]
    MissingChannel {
        channel: Channel,
        index: usize,
        timestamp: NaiveDateTime,
    },

    /// A timestamp goes backwards
    #[error("Timestamps out of order at index {index}: {current} follows {previous}")]
    UnorderedTimestamps {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    /// The same timestamp appears twice in a row
    #[error("Duplicate timestamp {timestamp} at index {index}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: NaiveDateTime,
    },

    /// Derived statistics do not line up with the series
    #[error("Rolling statistics cover {actual} samples but the series has {expected}")]
    MisalignedStats { expected: usize, actual: usize },
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Rolling window must be at least 1 sample")]
    NonPositiveWindow,

    #[error("Anomaly threshold must be a positive finite number, got {0}")]
    NonPositiveThreshold(f64),

    #[error("Power factor must be in (0, 1], got {0}")]
    PowerFactorOutOfRange(f64),

    #[error("Sampling interval must be a positive number of minutes, got {0}")]
    NonPositiveSamplingInterval(f64),

    #[error("Nominal voltage must be a positive number of volts, got {0}")]
    NonPositiveNominalVoltage(f64),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// Config file could not be read or parsed
    #[error("Invalid configuration file: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Any failure that aborts an analysis run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_missing_channel_message_names_channel_and_position() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 5, 0)
            .unwrap();
        let err = InputError::MissingChannel {
            channel: Channel::Current,
            index: 5,
            timestamp,
        };

        let message = err.to_string();
        assert!(message.contains("current_A"));
        assert!(message.contains("index 5"));
        assert!(message.contains("2024-01-01 00:05:00"));
    }

    #[test]
    fn test_analysis_error_wraps_config_error() {
        let err: AnalysisError = ConfigError::PowerFactorOutOfRange(1.2).into();
        assert!(matches!(
            err,
            AnalysisError::Config(ConfigError::PowerFactorOutOfRange(_))
        ));
        assert!(err.to_string().contains("1.2"));
    }
}
