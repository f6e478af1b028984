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

//! Sensorlens CLI
//!
//! Command-line interface for motor sensor anomaly detection and KPIs.

mod logging;
mod settings;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sensorlens_analytics::{AnnotatedSeries, AnomalyPipeline, KpiAggregator, KpiSummary};
use sensorlens_core::{Channel, TimeSeries};
use sensorlens_io::{write_annotated, write_kpis, write_kpis_json, Loader};
use settings::{Overrides, Settings};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "sensorlens")]
#[command(about = "Sensorlens - motor sensor anomaly detection and KPIs", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flag z-score anomalies on one channel
    Detect {
        /// Sensor CSV export
        input: PathBuf,

        /// Write the annotated series to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print every flagged sample
        #[arg(long)]
        list: bool,

        #[command(flatten)]
        options: AnalysisArgs,
    },

    /// Aggregate energy and operational KPIs
    Kpis {
        /// Sensor CSV export
        input: PathBuf,

        /// Write the summary here (`.json` for JSON, CSV otherwise)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: AnalysisArgs,
    },

    /// Detection and KPIs, written to an output directory
    Run {
        /// Sensor CSV export
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./sensorlens-output")]
        output_dir: PathBuf,

        #[command(flatten)]
        options: AnalysisArgs,
    },
}

#[derive(Args, Clone, Default)]
struct AnalysisArgs {
    /// Monitored channel (e.g. current_A or current)
    #[arg(long)]
    channel: Option<Channel>,

    /// Rolling window in samples
    #[arg(long)]
    window: Option<usize>,

    /// Z-score threshold
    #[arg(long)]
    threshold: Option<f64>,

    /// Voltage used when a reading is missing
    #[arg(long)]
    nominal_voltage: Option<f64>,

    /// Power factor in (0, 1]
    #[arg(long)]
    power_factor: Option<f64>,

    /// Minutes between samples
    #[arg(long)]
    sampling_interval: Option<f64>,

    /// Reject out-of-order rows instead of sorting them
    #[arg(long)]
    strict_order: bool,
}

impl From<AnalysisArgs> for Overrides {
    fn from(args: AnalysisArgs) -> Self {
        Self {
            channel: args.channel,
            window: args.window,
            threshold: args.threshold,
            nominal_voltage: args.nominal_voltage,
            power_factor: args.power_factor,
            sampling_interval_minutes: args.sampling_interval,
            strict_order: args.strict_order,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Detect {
            input,
            output,
            list,
            options,
        } => {
            let settings = Settings::load(cli.config, &options.into())?;
            let series = load_series(&settings, &input)?;
            let annotated = detect(&settings, &series)?;

            if let Some(path) = &output {
                write_annotated(path, &annotated)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            print_detection(&annotated, list, cli.json)?;
        }

        Commands::Kpis {
            input,
            output,
            options,
        } => {
            let settings = Settings::load(cli.config, &options.into())?;
            let series = load_series(&settings, &input)?;
            let summary = kpis(&settings, &series)?;

            if let Some(path) = &output {
                let written = if path.extension().map_or(false, |ext| ext == "json") {
                    write_kpis_json(path, &summary)
                } else {
                    write_kpis(path, &summary)
                };
                written.with_context(|| format!("Failed to write {}", path.display()))?;
            }
            print_kpis(&summary, cli.json)?;
        }

        Commands::Run {
            input,
            output_dir,
            options,
        } => {
            let settings = Settings::load(cli.config, &options.into())?;
            let series = load_series(&settings, &input)?;
            let annotated = detect(&settings, &series)?;
            let summary = kpis(&settings, &series)?;

            write_annotated(output_dir.join("annotated.csv"), &annotated)
                .context("Failed to write annotated series")?;
            write_kpis(output_dir.join("kpis.csv"), &summary).context("Failed to write KPI CSV")?;
            write_kpis_json(output_dir.join("kpis.json"), &summary)
                .context("Failed to write KPI JSON")?;
            info!("Results written to {:?}", output_dir);

            if cli.json {
                let report = serde_json::json!({
                    "detection": annotated.summary(),
                    "kpis": summary,
                    "output_dir": output_dir.to_string_lossy(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_detection(&annotated, false, false)?;
                println!();
                print_kpis(&summary, false)?;
                println!();
                println!("✓ Results written to {}", output_dir.display());
            }
        }
    }

    Ok(())
}

fn load_series(settings: &Settings, input: &Path) -> Result<TimeSeries> {
    Loader::new(settings.loader.clone())
        .load(input)
        .with_context(|| format!("Failed to load {}", input.display()))
}

fn detect<'a>(settings: &Settings, series: &'a TimeSeries) -> Result<AnnotatedSeries<'a>> {
    let pipeline = AnomalyPipeline::new(settings.anomaly.clone())
        .context("Invalid anomaly configuration")?;
    pipeline.run(series).context("Anomaly detection failed")
}

fn kpis(settings: &Settings, series: &TimeSeries) -> Result<KpiSummary> {
    let aggregator = KpiAggregator::new(settings.kpi.clone()).context("Invalid KPI configuration")?;
    aggregator
        .summarize(series)
        .context("KPI aggregation failed")
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn print_detection(annotated: &AnnotatedSeries<'_>, list: bool, json: bool) -> Result<()> {
    let summary = annotated.summary();

    if json {
        if list {
            let flagged: Vec<_> = annotated
                .anomalies()
                .map(|row| {
                    serde_json::json!({
                        "index": row.index,
                        "timestamp": row.sample.timestamp,
                        "value": row.sample.value(summary.channel),
                        "z_score": row.record.z_score,
                    })
                })
                .collect();
            let report = serde_json::json!({ "summary": summary, "anomalies": flagged });
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        return Ok(());
    }

    println!("Anomaly Detection");
    println!("=================");
    println!("  Channel:   {}", summary.channel);
    println!("  Window:    {} samples", summary.window);
    println!("  Threshold: |z| > {}", summary.threshold);
    println!("  Samples:   {} ({} scored)", summary.samples, summary.scored);
    println!("  Anomalies: {}", summary.anomalies);
    if let (Some(first), Some(last)) = (summary.first_anomaly, summary.last_anomaly) {
        println!("  Span:      {} .. {}", first, last);
    }

    if list {
        for row in annotated.anomalies() {
            println!(
                "  {} {}={} z={}",
                row.sample.timestamp,
                summary.channel,
                fmt_opt(row.sample.value(summary.channel), 3),
                fmt_opt(row.record.z_score, 2)
            );
        }
    }
    Ok(())
}

fn print_kpis(summary: &KpiSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("KPI Summary");
    println!("===========");
    println!("  Samples:           {}", summary.sample_count);
    println!("  Operating hours:   {:.2}", summary.operating_hours);
    println!("  Total energy:      {:.3} kWh", summary.total_energy_kwh);
    println!("  Average power:     {} kW", fmt_opt(summary.average_power_kw, 3));
    println!("  Peak power:        {} kW", fmt_opt(summary.peak_power_kw, 3));
    println!("  Average load:      {} %", fmt_opt(summary.average_load_pct, 1));
    println!("  Max load:          {} %", fmt_opt(summary.max_load_pct, 1));
    println!("  Avg temperature:   {} °C", fmt_opt(summary.average_temperature_c, 1));
    println!("  Avg vibration:     {} mm/s", fmt_opt(summary.average_vibration_mm_s, 2));
    if summary.nominal_voltage_fills > 0 {
        println!(
            "  Nominal voltage used for {} sample(s)",
            summary.nominal_voltage_fills
        );
    }
    Ok(())
}
