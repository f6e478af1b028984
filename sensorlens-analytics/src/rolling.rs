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

// sensorlens-analytics/src/rolling.rs
//
// Fixed-window rolling mean and standard deviation
//
// ## Semantics
//
// - **Trailing windows**: the statistic at index `i` covers `[i - W + 1, i]`
// - **Warm-up**: the first `W - 1` samples have no statistic at all
// - **Sample stddev**: n - 1 denominator; a window of 1 has no stddev
// - **Deterministic**: every window is reduced from scratch with a two-pass
//   sum in index order, so results never depend on running-sum drift

use sensorlens_core::config::validate_window;
use sensorlens_core::{AnalysisResult, Channel, ConfigError, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Rolling statistic attached to one sample
///
/// `None` means "no value": not enough history (warm-up) or, for the
/// standard deviation, a window of a single sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingWindowStat {
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
}

impl RollingWindowStat {
    /// Statistic for a sample inside the warm-up period
    pub const UNDEFINED: RollingWindowStat = RollingWindowStat {
        mean: None,
        stddev: None,
    };

    /// Both mean and stddev are available
    pub fn is_defined(&self) -> bool {
        self.mean.is_some() && self.stddev.is_some()
    }
}

/// Rolling statistics for one channel, index-aligned with the source series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    channel: Channel,
    window: usize,
    stats: Vec<RollingWindowStat>,
}

impl RollingStats {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RollingWindowStat> {
        self.stats.get(index)
    }

    pub fn as_slice(&self) -> &[RollingWindowStat] {
        &self.stats
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RollingWindowStat> {
        self.stats.iter()
    }

    /// Number of samples past the warm-up period
    pub fn defined_count(&self) -> usize {
        self.stats.iter().filter(|s| s.mean.is_some()).count()
    }
}

/// Computes trailing-window statistics over a single channel
#[derive(Debug, Clone, Copy)]
pub struct RollingStatsEngine {
    window: usize,
}

impl RollingStatsEngine {
    /// Create an engine; the window must hold at least one sample
    pub fn new(window: usize) -> Result<Self, ConfigError> {
        validate_window(window)?;
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Rolling mean and stddev of `channel` for every sample in `series`
    pub fn compute(&self, series: &TimeSeries, channel: Channel) -> AnalysisResult<RollingStats> {
        let values = series.channel_values(channel)?;
        if !values.is_empty() && values.len() < self.window {
            warn!(
                %channel,
                samples = values.len(),
                window = self.window,
                "series is shorter than the rolling window; no statistics will be defined"
            );
        }

        let stats: Vec<RollingWindowStat> = (0..values.len())
            .map(|i| match self.window_at(i) {
                Some(start) => window_stat(&values[start..=i]),
                None => RollingWindowStat::UNDEFINED,
            })
            .collect();

        let result = RollingStats {
            channel,
            window: self.window,
            stats,
        };
        debug!(
            %channel,
            window = self.window,
            samples = result.len(),
            defined = result.defined_count(),
            "computed rolling statistics"
        );
        Ok(result)
    }

    /// Rolling mean only, for context channels
    ///
    /// Unlike [`compute`](Self::compute), absent readings are tolerated: a
    /// window that contains one has no mean.
    pub fn rolling_mean(&self, series: &TimeSeries, channel: Channel) -> Vec<Option<f64>> {
        let values: Vec<Option<f64>> = series.iter().map(|s| s.value(channel)).collect();
        let means: Vec<Option<f64>> = (0..values.len())
            .map(|i| {
                let start = self.window_at(i)?;
                let window = values[start..=i].iter().copied().collect::<Option<Vec<f64>>>()?;
                window_mean(&window)
            })
            .collect();

        let gaps = values.iter().filter(|v| v.is_none()).count();
        if gaps > 0 {
            debug!(%channel, gaps, "context channel has absent readings");
        }
        means
    }

    /// First index of the window ending at `i`, if the window is full
    fn window_at(&self, i: usize) -> Option<usize> {
        (i + 1).checked_sub(self.window)
    }
}

/// Rolling statistics of `channel` with a trailing window of `window` samples
pub fn compute(series: &TimeSeries, channel: Channel, window: usize) -> AnalysisResult<RollingStats> {
    RollingStatsEngine::new(window)?.compute(series, channel)
}

/// Mean and sample standard deviation of one full window
///
/// A window whose values are all identical reports a stddev of exactly
/// zero rather than whatever rounding residue the two-pass sum leaves.
pub fn window_stat(values: &[f64]) -> RollingWindowStat {
    let Some(&first) = values.first() else {
        return RollingWindowStat::UNDEFINED;
    };

    if values.iter().all(|&v| v == first) {
        return RollingWindowStat {
            mean: Some(first),
            stddev: (values.len() > 1).then_some(0.0),
        };
    }

    // Overflowing sums leave the window undefined rather than infinite
    let Some(mean) = mean(values) else {
        return RollingWindowStat::UNDEFINED;
    };
    let stddev = (values.len() > 1)
        .then(|| {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (values.len() - 1) as f64).sqrt()
        })
        .filter(|s| s.is_finite());

    RollingWindowStat {
        mean: Some(mean),
        stddev,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    Some(values.iter().sum::<f64>() / values.len() as f64).filter(|m| m.is_finite())
}

/// Mean of a non-empty window, exact for constant windows
fn window_mean(values: &[f64]) -> Option<f64> {
    match values.first() {
        Some(&first) if values.iter().all(|&v| v == first) => Some(first),
        _ => mean(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use sensorlens_core::{AnalysisError, InputError, Sample};

    fn series_of(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TimeSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Sample::new(start + Duration::minutes(i as i64)).current(*v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_warm_up_is_undefined() {
        let series = series_of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let stats = compute(&series, Channel::Current, 3).unwrap();

        assert_eq!(stats.len(), 5);
        assert_eq!(stats.as_slice()[0], RollingWindowStat::UNDEFINED);
        assert_eq!(stats.as_slice()[1], RollingWindowStat::UNDEFINED);
        assert_eq!(stats.defined_count(), 3);
    }

    #[test]
    fn test_window_values() {
        let series = series_of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let stats = compute(&series, Channel::Current, 3).unwrap();

        // [1, 2, 3] -> mean 2, sample stddev 1
        let first = stats.as_slice()[2];
        assert_eq!(first.mean, Some(2.0));
        assert!((first.stddev.unwrap() - 1.0).abs() < 1e-12);

        // [3, 4, 5]
        let last = stats.as_slice()[4];
        assert_eq!(last.mean, Some(4.0));
        assert!((last.stddev.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_of_one_has_mean_but_no_stddev() {
        let series = series_of(&[4.0, 8.0]);
        let stats = compute(&series, Channel::Current, 1).unwrap();

        for (stat, expected) in stats.iter().zip([4.0, 8.0]) {
            assert_eq!(stat.mean, Some(expected));
            assert_eq!(stat.stddev, None);
            assert!(!stat.is_defined());
        }
    }

    #[test]
    fn test_constant_window_has_exact_zero_stddev() {
        let series = series_of(&[0.1; 40]);
        let stats = compute(&series, Channel::Current, 30).unwrap();

        let stat = stats.as_slice()[35];
        assert_eq!(stat.mean, Some(0.1));
        assert_eq!(stat.stddev, Some(0.0));
    }

    #[test]
    fn test_empty_series_gives_empty_stats() {
        let stats = compute(&TimeSeries::empty(), Channel::Current, 30).unwrap();
        assert!(stats.is_empty());
    }

    #[test]
    fn test_zero_window_is_config_error() {
        let series = series_of(&[1.0]);
        let err = compute(&series, Channel::Current, 0).unwrap_err();
        assert_eq!(err, AnalysisError::Config(ConfigError::NonPositiveWindow));
    }

    #[test]
    fn test_missing_channel_is_input_error() {
        let series = series_of(&[1.0, 2.0]);
        let err = compute(&series, Channel::Vibration, 2).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Input(InputError::MissingChannel {
                channel: Channel::Vibration,
                index: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_rolling_mean_matches_full_stats() {
        let series = series_of(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let engine = RollingStatsEngine::new(4).unwrap();

        let means = engine.rolling_mean(&series, Channel::Current);
        let stats = engine.compute(&series, Channel::Current).unwrap();

        let expected: Vec<Option<f64>> = stats.iter().map(|s| s.mean).collect();
        assert_eq!(means, expected);
    }

    #[test]
    fn test_rolling_mean_skips_windows_with_gaps() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let series = TimeSeries::new(
            (0..6)
                .map(|i| {
                    let sample = Sample::new(start + Duration::minutes(i)).current(1.0);
                    if i == 2 {
                        sample
                    } else {
                        sample.temperature(60.0 + i as f64)
                    }
                })
                .collect(),
        )
        .unwrap();

        let engine = RollingStatsEngine::new(2).unwrap();
        let means = engine.rolling_mean(&series, Channel::Temperature);

        assert_eq!(means, vec![None, Some(60.5), None, None, Some(63.5), Some(64.5)]);
        // The scored path still requires every reading
        assert!(engine.compute(&series, Channel::Temperature).is_err());
    }

    #[test]
    fn test_overflowing_window_is_undefined() {
        let series = series_of(&[1e308, 1.5e308, 1.7e308]);
        let stats = compute(&series, Channel::Current, 2).unwrap();

        assert!(stats.iter().all(|s| *s == RollingWindowStat::UNDEFINED));
        assert_eq!(
            RollingStatsEngine::new(2)
                .unwrap()
                .rolling_mean(&series, Channel::Current),
            vec![None, None, None]
        );
    }

    #[test]
    fn test_large_spread_keeps_mean_but_drops_infinite_stddev() {
        // Sum is finite, squared deviations are not
        let stat = window_stat(&[-1e200, 1e200]);
        assert_eq!(stat.mean, Some(0.0));
        assert_eq!(stat.stddev, None);
    }

    #[test]
    fn test_window_stat_on_empty_slice() {
        assert_eq!(window_stat(&[]), RollingWindowStat::UNDEFINED);
    }
}
