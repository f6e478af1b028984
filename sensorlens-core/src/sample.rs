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

//! Sensor samples and the channels they carry

use crate::error::{ConfigError, InputError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named numeric channel of the motor sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// Motor current (A)
    #[serde(rename = "current_A")]
    Current,
    /// Supply voltage (V)
    #[serde(rename = "voltage_V")]
    Voltage,
    /// Winding temperature (°C)
    #[serde(rename = "temperature_C")]
    Temperature,
    /// Vibration velocity (mm/s RMS)
    #[serde(rename = "vibration_mm_s")]
    Vibration,
    /// Load (% of rated)
    #[serde(rename = "load_pct")]
    Load,
}

impl Channel {
    /// All channels in source column order
    pub const ALL: [Channel; 5] = [
        Channel::Current,
        Channel::Voltage,
        Channel::Temperature,
        Channel::Vibration,
        Channel::Load,
    ];

    /// Column name used by tabular sources and outputs
    pub fn column_name(&self) -> &'static str {
        match self {
            Channel::Current => "current_A",
            Channel::Voltage => "voltage_V",
            Channel::Temperature => "temperature_C",
            Channel::Vibration => "vibration_mm_s",
            Channel::Load => "load_pct",
        }
    }

    /// Short prefix for derived columns (`current_mean`, `current_z`, ...)
    pub fn stem(&self) -> &'static str {
        match self {
            Channel::Current => "current",
            Channel::Voltage => "voltage",
            Channel::Temperature => "temperature",
            Channel::Vibration => "vibration",
            Channel::Load => "load",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Channel {
    type Err = ConfigError;

    /// Accepts either the column name (`current_A`) or the stem (`current`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Channel::ALL
            .into_iter()
            .find(|c| c.column_name() == needle || c.stem().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ConfigError::UnknownChannel(s.to_string()))
    }
}

/// One timestamped observation
///
/// A reading is `None` when the source had no value for it. Non-finite
/// readings are reported as absent by [`Sample::value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    #[serde(rename = "current_A")]
    pub current_a: Option<f64>,
    #[serde(rename = "voltage_V")]
    pub voltage_v: Option<f64>,
    #[serde(rename = "temperature_C")]
    pub temperature_c: Option<f64>,
    pub vibration_mm_s: Option<f64>,
    pub load_pct: Option<f64>,
}

impl Sample {
    /// Create a sample with no readings
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            current_a: None,
            voltage_v: None,
            temperature_c: None,
            vibration_mm_s: None,
            load_pct: None,
        }
    }

    /// Set a single channel reading
    pub fn with(mut self, channel: Channel, value: f64) -> Self {
        *self.slot_mut(channel) = Some(value);
        self
    }

    pub fn current(self, value: f64) -> Self {
        self.with(Channel::Current, value)
    }

    pub fn voltage(self, value: f64) -> Self {
        self.with(Channel::Voltage, value)
    }

    pub fn temperature(self, value: f64) -> Self {
        self.with(Channel::Temperature, value)
    }

    pub fn vibration(self, value: f64) -> Self {
        self.with(Channel::Vibration, value)
    }

    pub fn load(self, value: f64) -> Self {
        self.with(Channel::Load, value)
    }

    /// Reading for `channel`, if present and finite
    pub fn value(&self, channel: Channel) -> Option<f64> {
        let raw = match channel {
            Channel::Current => self.current_a,
            Channel::Voltage => self.voltage_v,
            Channel::Temperature => self.temperature_c,
            Channel::Vibration => self.vibration_mm_s,
            Channel::Load => self.load_pct,
        };
        raw.filter(|v| v.is_finite())
    }

    /// Reading for `channel`, or an [`InputError::MissingChannel`] that
    /// names this sample's position in its series
    pub fn require(&self, channel: Channel, index: usize) -> Result<f64, InputError> {
        self.value(channel).ok_or(InputError::MissingChannel {
            channel,
            index,
            timestamp: self.timestamp,
        })
    }

    fn slot_mut(&mut self, channel: Channel) -> &mut Option<f64> {
        match channel {
            Channel::Current => &mut self.current_a,
            Channel::Voltage => &mut self.voltage_v,
            Channel::Temperature => &mut self.temperature_c,
            Channel::Vibration => &mut self.vibration_mm_s,
            Channel::Load => &mut self.load_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_channel_parses_column_names_and_stems() {
        assert_eq!("current_A".parse::<Channel>().unwrap(), Channel::Current);
        assert_eq!("vibration".parse::<Channel>().unwrap(), Channel::Vibration);
        assert_eq!("Load".parse::<Channel>().unwrap(), Channel::Load);
        assert!(matches!(
            "pressure_bar".parse::<Channel>(),
            Err(ConfigError::UnknownChannel(_))
        ));
    }

    #[test]
    fn test_channel_display_roundtrips() {
        for channel in Channel::ALL {
            assert_eq!(channel.to_string().parse::<Channel>().unwrap(), channel);
        }
    }

    #[test]
    fn test_builder_sets_readings() {
        let sample = Sample::new(ts()).current(10.0).voltage(400.0).load(75.0);

        assert_eq!(sample.value(Channel::Current), Some(10.0));
        assert_eq!(sample.value(Channel::Voltage), Some(400.0));
        assert_eq!(sample.value(Channel::Load), Some(75.0));
        assert_eq!(sample.value(Channel::Temperature), None);
    }

    #[test]
    fn test_non_finite_reading_is_absent() {
        let sample = Sample::new(ts()).current(f64::NAN).vibration(f64::INFINITY);

        assert_eq!(sample.value(Channel::Current), None);
        assert_eq!(sample.value(Channel::Vibration), None);
    }

    #[test]
    fn test_require_reports_position() {
        let sample = Sample::new(ts()).current(1.0);
        let err = sample.require(Channel::Temperature, 7).unwrap_err();

        assert_eq!(
            err,
            InputError::MissingChannel {
                channel: Channel::Temperature,
                index: 7,
                timestamp: ts(),
            }
        );
    }

    #[test]
    fn test_serializes_with_column_names() {
        let sample = Sample::new(ts()).current(12.5);
        let json = serde_json::to_value(&sample).unwrap();

        assert_eq!(json["current_A"], 12.5);
        assert!(json["voltage_V"].is_null());
    }
}
