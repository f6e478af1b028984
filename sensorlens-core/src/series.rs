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

//! Ordered, validated sample sequences
//!
//! A [`TimeSeries`] can only be built through [`TimeSeries::new`], which
//! rejects out-of-order and duplicate timestamps. Every analysis component
//! can therefore rely on strictly increasing timestamps and plain index
//! arithmetic for its windows.

use crate::error::InputError;
use crate::sample::{Channel, Sample};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::ops::Index;
use tracing::debug;

/// Immutable, strictly time-ordered sequence of samples
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Build a series, failing fast on unordered or duplicate timestamps
    pub fn new(samples: Vec<Sample>) -> Result<Self, InputError> {
        validate_order(&samples)?;
        debug!(samples = samples.len(), "validated time series");
        Ok(Self { samples })
    }

    /// A series with no samples
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.samples.first().map(|s| s.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.samples.last().map(|s| s.timestamp)
    }

    /// Wall-clock time between the first and last sample
    pub fn span(&self) -> Option<Duration> {
        Some(self.last_timestamp()? - self.first_timestamp()?)
    }

    /// All readings of `channel`, index-aligned with the series
    ///
    /// Fails on the first sample that lacks the channel.
    pub fn channel_values(&self, channel: Channel) -> Result<Vec<f64>, InputError> {
        self.samples
            .iter()
            .enumerate()
            .map(|(index, sample)| sample.require(channel, index))
            .collect()
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl Index<usize> for TimeSeries {
    type Output = Sample;

    fn index(&self, index: usize) -> &Sample {
        &self.samples[index]
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Check that timestamps strictly increase
pub fn validate_order(samples: &[Sample]) -> Result<(), InputError> {
    for (offset, pair) in samples.windows(2).enumerate() {
        let (previous, current) = (pair[0].timestamp, pair[1].timestamp);
        let index = offset + 1;

        if current < previous {
            return Err(InputError::UnorderedTimestamps {
                index,
                previous,
                current,
            });
        }
        if current == previous {
            return Err(InputError::DuplicateTimestamp {
                index,
                timestamp: current,
            });
        }
    }
    Ok(())
}
