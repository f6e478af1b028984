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

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sensorlens_analytics::{AnomalyPipeline, KpiAggregator, RollingStatsEngine};
use sensorlens_core::{AnomalyConfig, Channel, KpiConfig, Sample, TimeSeries};

fn synthetic_series(len: usize) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let samples = (0..len)
        .map(|i| {
            let wobble = ((i * 7919) % 100) as f64 / 50.0;
            Sample::new(start + Duration::minutes(i as i64))
                .current(10.0 + wobble)
                .voltage(400.0)
                .temperature(60.0 + wobble)
                .vibration(2.0 + wobble / 10.0)
                .load(70.0 + wobble)
        })
        .collect();
    TimeSeries::new(samples).unwrap()
}

fn bench_rolling_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_stats");
    let engine = RollingStatsEngine::new(30).unwrap();

    for size in [1_000usize, 10_000, 100_000].iter() {
        let series = synthetic_series(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &series, |b, series| {
            b.iter(|| engine.compute(black_box(series), Channel::Current).unwrap());
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let series = synthetic_series(10_000);
    let pipeline = AnomalyPipeline::new(AnomalyConfig::default()).unwrap();

    c.bench_function("anomaly_pipeline_10k", |b| {
        b.iter(|| pipeline.run(black_box(&series)).unwrap().anomaly_count());
    });
}

fn bench_kpis(c: &mut Criterion) {
    let series = synthetic_series(10_000);
    let aggregator = KpiAggregator::new(KpiConfig::default()).unwrap();

    c.bench_function("kpi_summary_10k", |b| {
        b.iter(|| aggregator.summarize(black_box(&series)).unwrap());
    });
}

criterion_group!(benches, bench_rolling_stats, bench_pipeline, bench_kpis);
criterion_main!(benches);
