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

//! CSV loader for sensor exports
//!
//! Expects a header row with a timestamp column and the five channel
//! columns; other columns are ignored. Empty cells become absent readings.

use crate::error::{IoError, IoResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sensorlens_core::{Channel, Sample, TimeSeries};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Accepted naive timestamp layouts, tried in order
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Loader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Header of the timestamp column
    pub timestamp_column: String,

    /// Stably sort rows by timestamp before validation. When disabled, an
    /// out-of-order file is rejected.
    pub sort_by_timestamp: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timestamp_column: "timestamp".to_string(),
            sort_by_timestamp: true,
        }
    }
}

impl LoaderConfig {
    /// Keep source row order; unordered input is an error
    pub fn strict() -> Self {
        Self {
            sort_by_timestamp: false,
            ..Self::default()
        }
    }
}

/// Reads a [`TimeSeries`] from CSV
#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a series from a CSV file
    pub fn load(&self, path: impl AsRef<Path>) -> IoResult<TimeSeries> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::SourceNotFound(path.to_path_buf()));
        }

        let series = self.read(File::open(path)?)?;
        info!(path = %path.display(), samples = series.len(), "loaded sensor data");
        Ok(series)
    }

    /// Load a series from any CSV byte stream
    pub fn read<R: Read>(&self, reader: R) -> IoResult<TimeSeries> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| IoError::MissingColumn(name.to_string()))
        };

        let ts_idx = column(self.config.timestamp_column.as_str())?;
        let channel_idx = Channel::ALL
            .iter()
            .map(|&ch| Ok((ch, column(ch.column_name())?)))
            .collect::<IoResult<Vec<_>>>()?;

        let mut samples = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let raw_ts = record.get(ts_idx).unwrap_or("");
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| IoError::InvalidTimestamp {
                line,
                value: raw_ts.to_string(),
            })?;

            let mut sample = Sample::new(timestamp);
            for &(channel, idx) in &channel_idx {
                let raw = record.get(idx).unwrap_or("");
                if raw.is_empty() {
                    continue;
                }
                let value: f64 = raw.parse().map_err(|_| IoError::InvalidNumber {
                    line,
                    column: channel.column_name().to_string(),
                    value: raw.to_string(),
                })?;
                sample = sample.with(channel, value);
            }
            samples.push(sample);
        }

        if self.config.sort_by_timestamp
            && !samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
        {
            debug!(rows = samples.len(), "sorting rows by timestamp");
            samples.sort_by_key(|s| s.timestamp);
        }

        Ok(TimeSeries::new(samples)?)
    }
}

/// Load `path` with default settings
pub fn load(path: impl AsRef<Path>) -> IoResult<TimeSeries> {
    Loader::default().load(path)
}

/// Parse a naive timestamp, an RFC 3339 timestamp (converted to UTC) or a
/// bare date (midnight)
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use sensorlens_core::InputError;

    const HEADER: &str = "timestamp,current_A,voltage_V,temperature_C,vibration_mm_s,load_pct\n";

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-01-01 08:30:00"), Some(at(8, 30, 0)));
        assert_eq!(parse_timestamp("2024-01-01T08:30:00"), Some(at(8, 30, 0)));
        assert_eq!(parse_timestamp("2024-01-01 08:30"), Some(at(8, 30, 0)));
        assert_eq!(parse_timestamp("2024-01-01T10:30:00+02:00"), Some(at(8, 30, 0)));
        assert_eq!(parse_timestamp("2024-01-01"), Some(at(0, 0, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);

        let fractional = parse_timestamp("2024-01-01 08:30:00.250").unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_reads_rows() {
        let csv = format!(
            "{}{}{}",
            HEADER, "2024-01-01 00:00:00,10.5,400,60,2.1,75\n", "2024-01-01 00:01:00,11,401,61,2.2,76\n"
        );
        let series = Loader::default().read(csv.as_bytes()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value(Channel::Current), Some(10.5));
        assert_eq!(series[1].value(Channel::Load), Some(76.0));
    }

    #[test]
    fn test_extra_columns_and_reordered_header() {
        let csv = "site,load_pct,timestamp,vibration_mm_s,temperature_C,voltage_V,current_A\n\
                   A,50,2024-01-01 00:00:00,1.0,40,400,9\n";
        let series = Loader::default().read(csv.as_bytes()).unwrap();

        assert_eq!(series[0].value(Channel::Current), Some(9.0));
        assert_eq!(series[0].value(Channel::Load), Some(50.0));
    }

    #[test]
    fn test_empty_cell_is_absent_reading() {
        let csv = format!("{}2024-01-01 00:00:00,10,,60,2,75\n", HEADER);
        let series = Loader::default().read(csv.as_bytes()).unwrap();

        assert_eq!(series[0].value(Channel::Voltage), None);
        assert_eq!(series[0].value(Channel::Temperature), Some(60.0));
    }

    #[test]
    fn test_missing_column() {
        let csv = "timestamp,current_A,voltage_V,temperature_C,load_pct\n";
        let err = Loader::default().read(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::MissingColumn(c) if c == "vibration_mm_s"));
    }

    #[test]
    fn test_bad_number_names_line_and_column() {
        let csv = format!(
            "{}2024-01-01 00:00:00,10,400,60,2,75\n2024-01-01 00:01:00,ten,400,60,2,75\n",
            HEADER
        );
        let err = Loader::default().read(csv.as_bytes()).unwrap_err();
        match err {
            IoError::InvalidNumber { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "current_A");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_timestamp() {
        let csv = format!("{}not-a-time,10,400,60,2,75\n", HEADER);
        let err = Loader::default().read(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::InvalidTimestamp { line: 2, .. }));
    }

    #[test]
    fn test_unordered_rows_sorted_by_default() {
        let csv = format!(
            "{}2024-01-01 00:02:00,3,400,60,2,75\n2024-01-01 00:00:00,1,400,60,2,75\n2024-01-01 00:01:00,2,400,60,2,75\n",
            HEADER
        );
        let series = Loader::default().read(csv.as_bytes()).unwrap();

        let currents = series.channel_values(Channel::Current).unwrap();
        assert_eq!(currents, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_unordered_rows_rejected_when_strict() {
        let csv = format!(
            "{}2024-01-01 00:02:00,3,400,60,2,75\n2024-01-01 00:00:00,1,400,60,2,75\n",
            HEADER
        );
        let err = Loader::new(LoaderConfig::strict())
            .read(csv.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            IoError::Input(InputError::UnorderedTimestamps { index: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_timestamps_rejected_even_when_sorting() {
        let csv = format!(
            "{}2024-01-01 00:00:00,1,400,60,2,75\n2024-01-01 00:00:00,2,400,60,2,75\n",
            HEADER
        );
        let err = Loader::default().read(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IoError::Input(InputError::DuplicateTimestamp { .. })
        ));
    }

    #[test]
    fn test_header_only_gives_empty_series() {
        let series = Loader::default().read(HEADER.as_bytes()).unwrap();
        assert!(series.is_empty());
    }
}
