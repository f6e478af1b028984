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

//! Anomaly pipeline: rolling statistics, scoring and the annotated view
//!
//! [`AnomalyPipeline::run`] borrows the input series and returns an
//! [`AnnotatedSeries`]: the original samples plus index-aligned derived
//! columns. Nothing in the input is modified.

use crate::anomaly::{AnomalyDetector, AnomalyRecord};
use crate::rolling::{RollingStats, RollingStatsEngine, RollingWindowStat};
use chrono::NaiveDateTime;
use sensorlens_core::{AnalysisResult, AnomalyConfig, Channel, Sample, TimeSeries};
use serde::Serialize;
use tracing::info;

/// Rolling mean of a context channel, aligned with the series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextMean {
    pub channel: Channel,
    pub means: Vec<Option<f64>>,
}

/// Runs rolling statistics and z-score detection from one configuration
#[derive(Debug, Clone)]
pub struct AnomalyPipeline {
    config: AnomalyConfig,
    engine: RollingStatsEngine,
    detector: AnomalyDetector,
}

impl AnomalyPipeline {
    pub fn new(config: AnomalyConfig) -> AnalysisResult<Self> {
        config.validate()?;
        let engine = RollingStatsEngine::new(config.window)?;
        let detector = AnomalyDetector::new(config.threshold)?;
        Ok(Self {
            config,
            engine,
            detector,
        })
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    pub fn run<'a>(&self, series: &'a TimeSeries) -> AnalysisResult<AnnotatedSeries<'a>> {
        let channel = self.config.channel;
        let stats = self.engine.compute(series, channel)?;
        let records = self.detector.detect(series, channel, &stats)?;

        let context = self
            .config
            .context_channels
            .iter()
            .map(|&ch| ContextMean {
                channel: ch,
                means: self.engine.rolling_mean(series, ch),
            })
            .collect();

        let annotated = AnnotatedSeries {
            series,
            threshold: self.detector.threshold(),
            stats,
            records,
            context,
        };

        info!(
            %channel,
            window = self.config.window,
            threshold = self.config.threshold,
            samples = series.len(),
            anomalies = annotated.anomaly_count(),
            "anomaly detection complete"
        );
        Ok(annotated)
    }
}

/// Input series plus rolling statistics, z-scores and flags
#[derive(Debug, Clone)]
pub struct AnnotatedSeries<'a> {
    series: &'a TimeSeries,
    threshold: f64,
    stats: RollingStats,
    records: Vec<AnomalyRecord>,
    context: Vec<ContextMean>,
}

impl<'a> AnnotatedSeries<'a> {
    pub fn series(&self) -> &'a TimeSeries {
        self.series
    }

    pub fn channel(&self) -> Channel {
        self.stats.channel()
    }

    pub fn window(&self) -> usize {
        self.stats.window()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn stats(&self) -> &RollingStats {
        &self.stats
    }

    pub fn records(&self) -> &[AnomalyRecord] {
        &self.records
    }

    pub fn context(&self) -> &[ContextMean] {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<AnnotatedRow<'_>> {
        Some(AnnotatedRow {
            index,
            sample: self.series.get(index)?,
            stat: *self.stats.get(index)?,
            record: *self.records.get(index)?,
            context: &self.context,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = AnnotatedRow<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// Rows flagged as anomalous, in series order
    pub fn anomalies(&self) -> impl Iterator<Item = AnnotatedRow<'_>> + '_ {
        self.rows().filter(|row| row.record.is_anomaly)
    }

    pub fn anomaly_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_anomaly).count()
    }

    pub fn summary(&self) -> DetectionSummary {
        let timestamp = |row: AnnotatedRow<'_>| row.sample.timestamp;
        DetectionSummary {
            channel: self.channel(),
            window: self.window(),
            threshold: self.threshold,
            samples: self.len(),
            scored: self.records.iter().filter(|r| r.z_score.is_some()).count(),
            anomalies: self.anomaly_count(),
            first_anomaly: self.anomalies().next().map(timestamp),
            last_anomaly: self.anomalies().last().map(timestamp),
        }
    }
}

/// One sample with its derived columns
#[derive(Debug, Clone, Copy)]
pub struct AnnotatedRow<'a> {
    pub index: usize,
    pub sample: &'a Sample,
    pub stat: RollingWindowStat,
    pub record: AnomalyRecord,
    context: &'a [ContextMean],
}

impl<'a> AnnotatedRow<'a> {
    /// Rolling mean of a context channel at this row
    pub fn context_mean(&self, channel: Channel) -> Option<f64> {
        self.context
            .iter()
            .find(|c| c.channel == channel)
            .and_then(|c| c.means.get(self.index).copied().flatten())
    }
}

/// Headline numbers of a detection run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSummary {
    pub channel: Channel,
    pub window: usize,
    pub threshold: f64,
    pub samples: usize,
    /// Samples with a defined z-score
    pub scored: usize,
    pub anomalies: usize,
    pub first_anomaly: Option<NaiveDateTime>,
    pub last_anomaly: Option<NaiveDateTime>,
}
