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

// sensorlens-analytics/src/anomaly.rs
//
// Z-score anomaly detection against rolling statistics
//
// Each sample is judged on its own: there is no hysteresis and no
// debouncing, so a run of outliers yields a run of flags and a single
// spike yields a single flag (as long as it dominates its window).

use crate::rolling::{RollingStats, RollingWindowStat};
use sensorlens_core::config::validate_threshold;
use sensorlens_core::{AnalysisResult, Channel, ConfigError, InputError, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Per-sample detection result
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    /// Standardized deviation from the rolling mean, if it can be computed
    pub z_score: Option<f64>,
    /// `|z_score| > threshold`; false whenever `z_score` is undefined
    pub is_anomaly: bool,
}

/// Threshold rule over rolling z-scores
#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    /// Sensitivity threshold (number of standard deviations)
    threshold: f64,
}

impl AnomalyDetector {
    /// Create a detector; the threshold must be positive and finite
    pub fn new(threshold: f64) -> Result<Self, ConfigError> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Judge a single reading against its rolling statistic
    pub fn score(&self, value: f64, stat: &RollingWindowStat) -> AnomalyRecord {
        let z_score = z_score(value, stat);
        AnomalyRecord {
            z_score,
            is_anomaly: z_score.is_some_and(|z| z.abs() > self.threshold),
        }
    }

    /// Score every sample of `series` against the aligned `stats`
    pub fn detect(
        &self,
        series: &TimeSeries,
        channel: Channel,
        stats: &RollingStats,
    ) -> AnalysisResult<Vec<AnomalyRecord>> {
        if stats.len() != series.len() {
            return Err(InputError::MisalignedStats {
                expected: series.len(),
                actual: stats.len(),
            }
            .into());
        }
        if stats.channel() != channel {
            warn!(
                scored = %channel,
                stats = %stats.channel(),
                "scoring a channel against statistics of a different channel"
            );
        }

        let records = series
            .iter()
            .zip(stats.iter())
            .enumerate()
            .map(|(index, (sample, stat))| {
                let value = sample.require(channel, index)?;
                Ok(self.score(value, stat))
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        debug!(
            %channel,
            threshold = self.threshold,
            samples = records.len(),
            anomalies = records.iter().filter(|r| r.is_anomaly).count(),
            "scored samples"
        );
        Ok(records)
    }
}

/// Detect anomalies in `channel` with the given threshold
pub fn detect(
    series: &TimeSeries,
    channel: Channel,
    stats: &RollingStats,
    threshold: f64,
) -> AnalysisResult<Vec<AnomalyRecord>> {
    AnomalyDetector::new(threshold)?.detect(series, channel, stats)
}

/// `(value - mean) / stddev`, or `None` when the statistic is incomplete,
/// the stddev is zero, or the quotient is not finite
pub fn z_score(value: f64, stat: &RollingWindowStat) -> Option<f64> {
    let mean = stat.mean?;
    let stddev = stat.stddev?;
    if stddev == 0.0 {
        return None;
    }
    Some((value - mean) / stddev).filter(|z| z.is_finite())
}
