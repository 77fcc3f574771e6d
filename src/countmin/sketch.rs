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

use crate::codec::assert::ensure_preamble_ints_is;
use crate::codec::assert::ensure_serial_version_is;
use crate::codec::family::Family;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::countmin::serialization::COUNTER_SIZE_BYTES;
use crate::countmin::serialization::FLAGS_IS_EMPTY;
use crate::countmin::serialization::PREAMBLE_INTS;
use crate::countmin::serialization::SERIAL_VERSION;
use crate::error::Error;
use crate::hash::HashKernel;

/// Accuracy parameter used when a sketch is constructed with epsilon 0.
pub const DEFAULT_EPSILON: f64 = 0.999;

/// Confidence parameter used when a sketch is constructed with delta 0.
pub const DEFAULT_DELTA: f64 = 0.99;

/// A count-min sketch keyed by opaque byte strings.
///
/// Queries for the count of observations of a particular key are within a
/// factor of `epsilon` of the true count, with probability `delta`. The
/// closer these parameters are to 1, the greater the storage and computation
/// cost: the sketch keeps `ceil(e / (1 - epsilon))` counters for each of
/// `ceil(ln(1 / (1 - delta)))` hash rows. For epsilon=0.999, delta=0.99
/// that is 2719 counters in each of five rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CountMinSketch {
    epsilon: f64,
    delta: f64,
    width: usize,
    depth: usize,
    matrix: Vec<u64>,
}

impl CountMinSketch {
    /// Creates a new, empty count-min sketch with the given parameters.
    ///
    /// An `epsilon` or `delta` of zero selects the corresponding default
    /// ([`DEFAULT_EPSILON`], [`DEFAULT_DELTA`]). Width, depth, and the
    /// matrix size are fixed for the life of the sketch.
    pub fn new(epsilon: f64, delta: f64) -> Self {
        let epsilon = if epsilon == 0.0 {
            DEFAULT_EPSILON
        } else {
            epsilon
        };
        let delta = if delta == 0.0 { DEFAULT_DELTA } else { delta };
        let width = (std::f64::consts::E / (1.0 - epsilon)).ceil() as usize;
        let depth = (1.0 / (1.0 - delta)).ln().ceil() as usize;
        Self {
            epsilon,
            delta,
            width,
            depth,
            matrix: vec![0; width * depth],
        }
    }

    /// Returns the configured accuracy parameter.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the configured confidence parameter.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Returns the number of counters per hash row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of hash rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns true if no mass has been inserted.
    pub fn is_empty(&self) -> bool {
        self.matrix.iter().all(|&v| v == 0)
    }

    /// Adds `delta` to the count of occurrences of the given key and returns
    /// the updated estimated count.
    ///
    /// The estimate equals what [`query`](Self::query) would report
    /// immediately after the update. Counter overflow is not defended
    /// against; callers are expected to count monotonically from zero over
    /// bounded windows.
    pub fn count(&mut self, key: &[u8], delta: u64) -> u64 {
        let kernel = HashKernel::derive(key);
        let mut min = u64::MAX;

        for i in 0..self.depth {
            let j = (kernel.hash(i as u64) % self.width as u64) as usize;
            let cell = i * self.width + j;
            self.matrix[cell] = self.matrix[cell].wrapping_add(delta);
            if self.matrix[cell] < min {
                min = self.matrix[cell];
            }
        }

        min
    }

    /// Returns the estimated count of the given key.
    pub fn query(&self, key: &[u8]) -> u64 {
        let kernel = HashKernel::derive(key);
        let mut min = u64::MAX;

        for i in 0..self.depth {
            let j = (kernel.hash(i as u64) % self.width as u64) as usize;
            let v = self.matrix[i * self.width + j];
            if v < min {
                min = v;
            }
        }

        min
    }

    /// Serializes the sketch to a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut size_bytes = PREAMBLE_INTS as usize * 4;
        if !self.is_empty() {
            size_bytes += 4 + self.matrix.len() * COUNTER_SIZE_BYTES;
        }
        let mut bytes = SketchBytes::with_capacity(size_bytes);
        self.write_into(&mut bytes);
        bytes.into_bytes()
    }

    /// Deserializes a sketch from a byte slice.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);
        Self::read_from(&mut cursor)
    }

    pub(crate) fn write_into(&self, bytes: &mut SketchBytes) {
        bytes.write_u8(PREAMBLE_INTS);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(Family::COUNTMIN.id);
        let flags = if self.is_empty() { FLAGS_IS_EMPTY } else { 0 };
        bytes.write_u8(flags);
        bytes.write_f64_le(self.epsilon);
        bytes.write_f64_le(self.delta);
        bytes.write_u32_le(self.width as u32);
        bytes.write_u32_le(self.depth as u32);

        if self.is_empty() {
            return;
        }

        bytes.write_u32_le(self.matrix.len() as u32);
        for &v in &self.matrix {
            bytes.write_u64_le(v);
        }
    }

    pub(crate) fn read_from(cursor: &mut SketchSlice<'_>) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let preamble_ints = cursor.read_u8().map_err(make_error("preamble_ints"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let epsilon = cursor.read_f64_le().map_err(make_error("epsilon"))?;
        let delta = cursor.read_f64_le().map_err(make_error("delta"))?;
        let width = cursor.read_u32_le().map_err(make_error("width"))? as usize;
        let depth = cursor.read_u32_le().map_err(make_error("depth"))? as usize;

        Family::COUNTMIN.validate_id(family_id)?;
        ensure_serial_version_is(SERIAL_VERSION, serial_version)?;
        ensure_preamble_ints_is(PREAMBLE_INTS, preamble_ints)?;
        if width == 0 || depth == 0 {
            return Err(Error::deserial("sketch dimensions must be non-zero")
                .with_context("width", width)
                .with_context("depth", depth));
        }

        let is_empty = (flags & FLAGS_IS_EMPTY) != 0;
        if is_empty {
            return Ok(Self {
                epsilon,
                delta,
                width,
                depth,
                matrix: vec![0; width * depth],
            });
        }

        let num_values = cursor.read_u32_le().map_err(make_error("num_values"))? as usize;
        if num_values != width * depth {
            return Err(
                Error::deserial("matrix length does not match sketch dimensions")
                    .with_context("num_values", num_values)
                    .with_context("expected", width * depth),
            );
        }
        let mut matrix = Vec::with_capacity(num_values);
        for _ in 0..num_values {
            matrix.push(cursor.read_u64_le().map_err(make_error("matrix"))?);
        }

        Ok(Self {
            epsilon,
            delta,
            width,
            depth,
            matrix,
        })
    }
}
