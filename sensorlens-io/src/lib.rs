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

//! Sensorlens I/O
//!
//! Tabular boundary of the analysis: CSV sensor exports in, annotated
//! series and KPI summaries out.

pub mod error;
pub mod loader;
pub mod writer;

pub use error::{IoError, IoResult};
pub use loader::{load, parse_timestamp, Loader, LoaderConfig};
pub use writer::{
    write_annotated, write_annotated_to, write_kpis, write_kpis_json, write_kpis_to,
    TIMESTAMP_FORMAT,
};
