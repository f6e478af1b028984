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

//! Writers for annotated series and KPI summaries
//!
//! Undefined values are written as empty cells (CSV) or `null` (JSON).
//! Annotated rows carry the timestamp and the five channel columns in
//! canonical order; source columns outside that set are not kept.

use crate::error::IoResult;
use sensorlens_analytics::{AnnotatedRow, AnnotatedSeries, KpiSummary};
use sensorlens_core::Channel;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Output layout for timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn create_parent(path: &Path) -> IoResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(dir = %parent.display(), "creating output directory");
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Shortest round-trip form with a decimal point, as `csv::Writer::serialize`
/// writes the KPI row
fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:?}", v)).unwrap_or_default()
}

/// Context channels written as their own `_mean` column
fn context_columns(annotated: &AnnotatedSeries<'_>) -> Vec<Channel> {
    annotated
        .context()
        .iter()
        .map(|c| c.channel)
        .filter(|&ch| ch != annotated.channel())
        .collect()
}

fn header(annotated: &AnnotatedSeries<'_>, context: &[Channel]) -> Vec<String> {
    let target = annotated.channel().stem();

    let mut columns = vec!["timestamp".to_string()];
    columns.extend(Channel::ALL.iter().map(|ch| ch.column_name().to_string()));
    columns.push(format!("{}_mean", target));
    columns.push(format!("{}_std", target));
    columns.extend(context.iter().map(|ch| format!("{}_mean", ch.stem())));
    columns.push(format!("{}_z", target));
    columns.push("anomaly".to_string());
    columns
}

fn record(row: &AnnotatedRow<'_>, context: &[Channel]) -> Vec<String> {
    let mut fields = vec![row.sample.timestamp.format(TIMESTAMP_FORMAT).to_string()];
    fields.extend(Channel::ALL.iter().map(|&ch| cell(row.sample.value(ch))));
    fields.push(cell(row.stat.mean));
    fields.push(cell(row.stat.stddev));
    fields.extend(context.iter().map(|&ch| cell(row.context_mean(ch))));
    fields.push(cell(row.record.z_score));
    fields.push(if row.record.is_anomaly { "1" } else { "0" }.to_string());
    fields
}

/// Write the annotated series as CSV to `path`
pub fn write_annotated(path: impl AsRef<Path>, annotated: &AnnotatedSeries<'_>) -> IoResult<()> {
    let path = path.as_ref();
    create_parent(path)?;
    write_annotated_to(BufWriter::new(File::create(path)?), annotated)?;
    info!(
        path = %path.display(),
        rows = annotated.len(),
        anomalies = annotated.anomaly_count(),
        "wrote annotated series"
    );
    Ok(())
}

/// Write the annotated series as CSV to any sink
pub fn write_annotated_to<W: Write>(writer: W, annotated: &AnnotatedSeries<'_>) -> IoResult<()> {
    let context = context_columns(annotated);
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(header(annotated, &context))?;
    for row in annotated.rows() {
        wtr.write_record(record(&row, &context))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the KPI summary as a single-row CSV to `path`
pub fn write_kpis(path: impl AsRef<Path>, summary: &KpiSummary) -> IoResult<()> {
    let path = path.as_ref();
    create_parent(path)?;
    write_kpis_to(BufWriter::new(File::create(path)?), summary)?;
    info!(path = %path.display(), "wrote KPI summary");
    Ok(())
}

pub fn write_kpis_to<W: Write>(writer: W, summary: &KpiSummary) -> IoResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.serialize(summary)?;
    wtr.flush()?;
    Ok(())
}

/// Write the KPI summary as pretty-printed JSON to `path`
pub fn write_kpis_json(path: impl AsRef<Path>, summary: &KpiSummary) -> IoResult<()> {
    let path = path.as_ref();
    create_parent(path)?;
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, summary)?;
    file.write_all(b"\n")?;
    file.flush()?;
    info!(path = %path.display(), "wrote KPI summary");
    Ok(())
}
