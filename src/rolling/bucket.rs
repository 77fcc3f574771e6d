// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::countmin::CountMinSketch;
use crate::error::Error;
use crate::rolling::serialization::BUCKET_SKETCH_ABSENT;
use crate::rolling::serialization::BUCKET_SKETCH_PRESENT;

/// A count-min sketch paired with the instant its bucket was opened.
///
/// The start time is set at construction and never changes. A bucket whose
/// sketch is absent (the serialized empty form) answers every count and
/// query with 0.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TimestampedSketch {
    sketch: Option<CountMinSketch>,
    start: i64,
}

impl TimestampedSketch {
    /// Opens a bucket at `start` (nanoseconds since the Unix epoch).
    pub(crate) fn new(epsilon: f64, delta: f64, start: i64) -> Self {
        Self {
            sketch: Some(CountMinSketch::new(epsilon, delta)),
            start,
        }
    }

    /// Returns the instant this bucket was opened.
    pub(crate) fn start(&self) -> i64 {
        self.start
    }

    pub(crate) fn count(&mut self, key: &[u8], delta: u64) -> u64 {
        match self.sketch.as_mut() {
            Some(sketch) => sketch.count(key, delta),
            None => 0,
        }
    }

    pub(crate) fn query(&self, key: &[u8]) -> u64 {
        match self.sketch.as_ref() {
            Some(sketch) => sketch.query(key),
            None => 0,
        }
    }

    pub(crate) fn write_into(&self, bytes: &mut SketchBytes) {
        match &self.sketch {
            Some(sketch) => {
                bytes.write_u8(BUCKET_SKETCH_PRESENT);
                sketch.write_into(bytes);
            }
            None => bytes.write_u8(BUCKET_SKETCH_ABSENT),
        }
        bytes.write_i64_le(self.start);
    }

    pub(crate) fn read_from(cursor: &mut SketchSlice<'_>) -> Result<Self, Error> {
        let tag = cursor
            .read_u8()
            .map_err(|_| Error::insufficient_data("bucket_tag"))?;
        let sketch = match tag {
            BUCKET_SKETCH_PRESENT => Some(CountMinSketch::read_from(cursor)?),
            BUCKET_SKETCH_ABSENT => None,
            other => {
                return Err(Error::deserial("invalid bucket sketch tag")
                    .with_context("tag", other))
            }
        };
        let start = cursor
            .read_i64_le()
            .map_err(|_| Error::insufficient_data("bucket_start"))?;
        Ok(Self { sketch, start })
    }
}
