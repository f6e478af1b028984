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

//! Energy and operational KPIs over a whole series
//!
//! Power uses a simplified approximation:
//! `power_kW = voltage_V * current_A * power_factor / 1000`, and each sample
//! contributes `power_kW * sampling_interval_minutes / 60` kWh.

use chrono::NaiveDateTime;
use sensorlens_core::{AnalysisResult, Channel, ConfigError, InputError, KpiConfig, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where the voltage used for a power figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoltageSource {
    Measured,
    /// Reading missing; the configured nominal voltage was used
    Nominal,
}

/// Derived electrical figures for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSample {
    pub timestamp: NaiveDateTime,
    #[serde(rename = "power_kW")]
    pub power_kw: f64,
    #[serde(rename = "energy_kWh")]
    pub energy_kwh: f64,
    pub voltage_source: VoltageSource,
}

/// Whole-series KPI record
///
/// Averages and maxima are `None` for an empty series; the sums and the
/// operating hours are zero in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    #[serde(rename = "total_energy_kWh")]
    pub total_energy_kwh: f64,
    #[serde(rename = "average_power_kW")]
    pub average_power_kw: Option<f64>,
    #[serde(rename = "peak_power_kW")]
    pub peak_power_kw: Option<f64>,
    pub average_load_pct: Option<f64>,
    pub max_load_pct: Option<f64>,
    #[serde(rename = "average_temperature_C")]
    pub average_temperature_c: Option<f64>,
    pub average_vibration_mm_s: Option<f64>,
    pub operating_hours: f64,
    pub sample_count: usize,
    /// Samples whose power used the nominal voltage
    pub nominal_voltage_fills: usize,
}

impl KpiSummary {
    /// False for a summary over an empty series
    pub fn has_data(&self) -> bool {
        self.sample_count > 0
    }
}

/// Reduces a series to a [`KpiSummary`]
#[derive(Debug, Clone)]
pub struct KpiAggregator {
    config: KpiConfig,
}

impl KpiAggregator {
    pub fn new(config: KpiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &KpiConfig {
        &self.config
    }

    /// Per-sample power and energy
    pub fn derive_power(&self, series: &TimeSeries) -> Result<Vec<PowerSample>, InputError> {
        let hours = self.config.hours_per_sample();
        series
            .iter()
            .enumerate()
            .map(|(index, sample)| {
                let current = sample.require(Channel::Current, index)?;
                let (voltage, voltage_source) = match sample.value(Channel::Voltage) {
                    Some(v) => (v, VoltageSource::Measured),
                    None => (self.config.nominal_voltage, VoltageSource::Nominal),
                };
                let power_kw = voltage * current * self.config.power_factor / 1000.0;
                Ok(PowerSample {
                    timestamp: sample.timestamp,
                    power_kw,
                    energy_kwh: power_kw * hours,
                    voltage_source,
                })
            })
            .collect()
    }

    pub fn summarize(&self, series: &TimeSeries) -> AnalysisResult<KpiSummary> {
        let power = self.derive_power(series)?;

        let mut energy_kwh = 0.0;
        let mut power_kw = Aggregate::default();
        let mut fills = 0;
        for p in &power {
            energy_kwh += p.energy_kwh;
            power_kw.push(p.power_kw);
            if p.voltage_source == VoltageSource::Nominal {
                fills += 1;
            }
        }

        let load = Aggregate::over(series, Channel::Load)?;
        let temperature = Aggregate::over(series, Channel::Temperature)?;
        let vibration = Aggregate::over(series, Channel::Vibration)?;

        if fills > 0 {
            debug!(
                fills,
                nominal_voltage = self.config.nominal_voltage,
                "filled missing voltage readings with nominal voltage"
            );
        }

        let summary = KpiSummary {
            total_energy_kwh: energy_kwh,
            average_power_kw: power_kw.mean(),
            peak_power_kw: power_kw.max,
            average_load_pct: load.mean(),
            max_load_pct: load.max,
            average_temperature_c: temperature.mean(),
            average_vibration_mm_s: vibration.mean(),
            operating_hours: series.len() as f64 * self.config.hours_per_sample(),
            sample_count: series.len(),
            nominal_voltage_fills: fills,
        };

        info!(
            samples = summary.sample_count,
            total_energy_kwh = summary.total_energy_kwh,
            operating_hours = summary.operating_hours,
            "kpi aggregation complete"
        );
        Ok(summary)
    }
}

/// Summarize `series` with `config`
pub fn summarize(series: &TimeSeries, config: &KpiConfig) -> AnalysisResult<KpiSummary> {
    KpiAggregator::new(config.clone())?.summarize(series)
}

/// Sum, count and maximum of a stream of readings
#[derive(Debug, Default)]
struct Aggregate {
    sum: f64,
    count: usize,
    max: Option<f64>,
}

impl Aggregate {
    fn over(series: &TimeSeries, channel: Channel) -> Result<Self, InputError> {
        let mut agg = Self::default();
        for (index, sample) in series.iter().enumerate() {
            agg.push(sample.require(channel, index)?);
        }
        Ok(agg)
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use sensorlens_core::{AnalysisError, Sample};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample(minute: i64, current: f64, voltage: f64, load: f64) -> Sample {
        Sample::new(start() + Duration::minutes(minute))
            .current(current)
            .voltage(voltage)
            .temperature(55.0)
            .vibration(1.5)
            .load(load)
    }

    #[test]
    fn test_power_and_energy_for_one_sample() {
        let series = TimeSeries::new(vec![sample(0, 10.0, 400.0, 80.0)]).unwrap();
        let aggregator = KpiAggregator::new(KpiConfig::new(400.0, 0.85, 1.0)).unwrap();

        let power = aggregator.derive_power(&series).unwrap();
        assert!((power[0].power_kw - 3.4).abs() < 1e-12);
        assert!((power[0].energy_kwh - 3.4 / 60.0).abs() < 1e-12);
        assert!((power[0].energy_kwh - 0.0567).abs() < 1e-4);
        assert_eq!(power[0].voltage_source, VoltageSource::Measured);
    }

    #[test]
    fn test_summary_over_series() {
        let series = TimeSeries::new(vec![
            sample(0, 10.0, 400.0, 60.0),
            sample(1, 20.0, 400.0, 90.0),
            sample(2, 30.0, 400.0, 75.0),
        ])
        .unwrap();

        let summary = summarize(&series, &KpiConfig::new(400.0, 1.0, 1.0)).unwrap();

        // 4, 8 and 12 kW
        assert!((summary.average_power_kw.unwrap() - 8.0).abs() < 1e-12);
        assert_eq!(summary.peak_power_kw, Some(12.0));
        assert!((summary.total_energy_kwh - 24.0 / 60.0).abs() < 1e-12);
        assert_eq!(summary.average_load_pct, Some(75.0));
        assert_eq!(summary.max_load_pct, Some(90.0));
        assert_eq!(summary.average_temperature_c, Some(55.0));
        assert_eq!(summary.average_vibration_mm_s, Some(1.5));
        assert!((summary.operating_hours - 0.05).abs() < 1e-12);
        assert_eq!(summary.sample_count, 3);
        assert!(summary.has_data());
    }

    #[test]
    fn test_empty_series_has_no_averages() {
        let summary = summarize(&TimeSeries::empty(), &KpiConfig::default()).unwrap();

        assert_eq!(summary.total_energy_kwh, 0.0);
        assert_eq!(summary.operating_hours, 0.0);
        assert_eq!(summary.average_power_kw, None);
        assert_eq!(summary.peak_power_kw, None);
        assert_eq!(summary.average_load_pct, None);
        assert_eq!(summary.max_load_pct, None);
        assert_eq!(summary.average_temperature_c, None);
        assert_eq!(summary.average_vibration_mm_s, None);
        assert!(!summary.has_data());
    }

    #[test]
    fn test_missing_voltage_uses_nominal() {
        let mut gap = sample(1, 10.0, 0.0, 50.0);
        gap.voltage_v = None;
        let series = TimeSeries::new(vec![sample(0, 10.0, 400.0, 50.0), gap]).unwrap();

        let summary = summarize(&series, &KpiConfig::new(230.0, 1.0, 60.0)).unwrap();

        assert_eq!(summary.nominal_voltage_fills, 1);
        assert_eq!(summary.peak_power_kw, Some(4.0));
        assert!((summary.total_energy_kwh - (4.0 + 2.3)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_load_is_input_error() {
        let mut gap = sample(1, 10.0, 400.0, 0.0);
        gap.load_pct = None;
        let series = TimeSeries::new(vec![sample(0, 10.0, 400.0, 50.0), gap]).unwrap();

        let err = summarize(&series, &KpiConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Input(InputError::MissingChannel {
                channel: Channel::Load,
                index: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_power_factor() {
        let err = summarize(&TimeSeries::empty(), &KpiConfig::new(400.0, 1.2, 1.0)).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Config(ConfigError::PowerFactorOutOfRange(1.2))
        );
    }

    #[test]
    fn test_summary_serializes_with_report_column_names() {
        let summary = summarize(&TimeSeries::empty(), &KpiConfig::default()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["total_energy_kWh"], 0.0);
        assert!(json["average_power_kW"].is_null());
        assert!(json.get("peak_power_kW").is_some());
    }
}
