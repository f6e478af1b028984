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

//! Loader and writer error types

use sensorlens_core::InputError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for tabular I/O
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading or writing tables
#[derive(Debug, Error)]
pub enum IoError {
    /// Backing file is absent
    #[error("Data file not found: {0}")]
    SourceNotFound(PathBuf),

    /// Header lacks a required column
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid timestamp {value:?} on line {line}")]
    InvalidTimestamp { line: u64, value: String },

    #[error("Invalid number {value:?} in column {column} on line {line}")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    /// Parsed rows do not form a valid series
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Serialization(e.to_string())
    }
}
