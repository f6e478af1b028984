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

//! Sensorlens Analytics
//!
//! Batch analysis of a materialized motor sensor series. Two independent
//! consumers share the same input:
//!
//! ```text
//! TimeSeries ──► RollingStatsEngine ──► AnomalyDetector ──► AnnotatedSeries
//!      │
//!      └───────► KpiAggregator ──────────────────────────► KpiSummary
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sensorlens_analytics::{AnomalyPipeline, KpiAggregator};
//! use sensorlens_core::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! let annotated = AnomalyPipeline::new(config.anomaly.clone())?.run(&series)?;
//! for row in annotated.anomalies() {
//!     println!("{} z={:?}", row.sample.timestamp, row.record.z_score);
//! }
//!
//! let kpis = KpiAggregator::new(config.kpi)?.summarize(&series)?;
//! ```

pub mod anomaly;
pub mod kpi;
pub mod pipeline;
pub mod rolling;

pub use anomaly::{detect, z_score, AnomalyDetector, AnomalyRecord};
pub use kpi::{summarize, KpiAggregator, KpiSummary, PowerSample, VoltageSource};
pub use pipeline::{AnnotatedRow, AnnotatedSeries, AnomalyPipeline, ContextMean, DetectionSummary};
pub use rolling::{compute, window_stat, RollingStats, RollingStatsEngine, RollingWindowStat};
