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

use std::time::Duration;

use crate::codec::assert::ensure_preamble_ints_is;
use crate::codec::assert::ensure_serial_version_is;
use crate::codec::family::Family;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::rolling::clock::{duration_nanos, system_clock, timestamp_nanos, Clock};
use crate::rolling::counter::{rate, RollingCounter};
use crate::rolling::serialization::ROLLUP_PREAMBLE_INTS;
use crate::rolling::serialization::ROLLUP_SERIAL_VERSION;
use crate::rolling::RateSketch;

/// A pyramid of rolling counters at progressively coarser resolutions.
///
/// Constructed from an ascending sequence of durations: level `i` keeps
/// buckets of span `durations[i]`, enough of them to cover
/// `durations[i + 1]`. Fine levels answer short windows with high
/// resolution; coarse levels extend reach without storing fine-grained
/// buckets for days.
///
/// A query walks the levels finest first. Each level consumes a prefix of
/// the remaining interval, and the next level continues from where the finer
/// one ran out, so every instant of the window is accounted for exactly
/// once. A query is not a snapshot across levels: each level is serialized
/// by its own mutex only, and a concurrent writer may advance a finer level
/// between two level reads. Callers that need a cross-level snapshot must
/// serialize externally.
pub struct RollupCounter {
    levels: Vec<RollingCounter>,
    clock: Clock,
}

impl std::fmt::Debug for RollupCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollupCounter")
            .field("levels", &self.levels)
            .finish()
    }
}

impl RollupCounter {
    /// Creates a rollup counter from an ascending sequence of durations.
    ///
    /// At least two durations are required, all positive and strictly
    /// ascending; otherwise
    /// [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// is returned. An `epsilon` or `delta` of zero selects the sketch
    /// defaults.
    pub fn new(epsilon: f64, delta: f64, durations: &[Duration]) -> Result<Self, Error> {
        if durations.len() < 2 {
            return Err(Error::config("at least two durations are required")
                .with_context("durations", durations.len()));
        }

        let mut levels = Vec::with_capacity(durations.len() - 1);
        for i in 1..durations.len() {
            let from = duration_nanos(durations[i - 1]);
            let to = duration_nanos(durations[i]);
            if from <= 0 {
                return Err(Error::config("durations must be positive")
                    .with_context("index", i - 1));
            }
            if to <= from {
                return Err(Error::config("durations must be strictly ascending")
                    .with_context("index", i));
            }
            let mut num_intervals = (to / from) as usize;
            if to % from > 0 {
                num_intervals += 1;
            }
            levels.push(RollingCounter::new(
                epsilon,
                delta,
                durations[i - 1],
                num_intervals,
            )?);
        }

        Ok(Self {
            levels,
            clock: system_clock(),
        })
    }

    /// Replaces the rollup's time source. Levels keep their own clocks, but
    /// rollup operations read time only through this one.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Returns the number of levels.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Records `delta` occurrences of `key` at every level, returning the
    /// updated observed rate in events per second over the given interval.
    ///
    /// The event is recorded independently at each resolution; the returned
    /// rate blends contributions across levels. If the interval is smaller
    /// than one second, or the available data covers less than a second,
    /// then 0 is returned.
    pub fn count(&self, key: &[u8], delta: u64, interval: Duration) -> f64 {
        let now = timestamp_nanos((self.clock)());
        let mut tc = 0.0f64;
        let mut td = 0i64;
        let mut interval = duration_nanos(interval);
        for level in &self.levels {
            if interval < 0 {
                interval = 0;
            }
            let (n, d) = level.count_at(key, delta, now, interval);
            tc += n;
            td += d;
            interval -= d;
        }
        rate(tc, td)
    }

    /// Returns the observed rate of the given key over the given interval.
    /// If the interval is smaller than one second, or the available data
    /// covers less than a second, then 0 is returned.
    pub fn query(&self, key: &[u8], interval: Duration) -> f64 {
        let mut now = timestamp_nanos((self.clock)());
        let mut tc = 0.0f64;
        let mut td = 0i64;
        let mut interval = duration_nanos(interval);
        for level in &self.levels {
            if interval <= 0 {
                break;
            }
            let (n, d) = level.query_at(key, now, interval);
            tc += n;
            td += d;
            now -= d;
            interval -= d;
        }
        rate(tc, td)
    }

    /// Serializes the rollup and all its levels to a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = SketchBytes::with_capacity(ROLLUP_PREAMBLE_INTS as usize * 4);
        bytes.write_u8(ROLLUP_PREAMBLE_INTS);
        bytes.write_u8(ROLLUP_SERIAL_VERSION);
        bytes.write_u8(Family::ROLLUP.id);
        bytes.write_u8(0);
        bytes.write_u32_le(self.levels.len() as u32);
        for level in &self.levels {
            level.write_into(&mut bytes);
        }
        bytes.into_bytes()
    }

    /// Deserializes a rollup from a byte slice, with the system wall clock.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_clock(bytes, system_clock())
    }

    /// Deserializes a rollup from a byte slice with an injected clock.
    pub fn deserialize_with_clock(bytes: &[u8], clock: Clock) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = SketchSlice::new(bytes);
        let preamble_ints = cursor.read_u8().map_err(make_error("preamble_ints"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        cursor.read_u8().map_err(make_error("flags"))?;
        let num_levels = cursor.read_u32_le().map_err(make_error("num_levels"))?;

        Family::ROLLUP.validate_id(family_id)?;
        ensure_serial_version_is(ROLLUP_SERIAL_VERSION, serial_version)?;
        ensure_preamble_ints_is(ROLLUP_PREAMBLE_INTS, preamble_ints)?;
        if num_levels == 0 {
            return Err(Error::deserial("rollup must have at least one level"));
        }

        let mut levels: Vec<RollingCounter> = Vec::with_capacity(num_levels as usize);
        for _ in 0..num_levels {
            let level = RollingCounter::read_from(&mut cursor)?;
            if let Some(prev) = levels.last() {
                if level.interval() <= prev.interval() {
                    return Err(Error::deserial(
                        "level intervals must be strictly ascending",
                    ));
                }
            }
            levels.push(level);
        }

        Ok(Self { levels, clock })
    }
}

impl RateSketch for RollupCounter {
    fn count(&self, key: &[u8], delta: u64, interval: Duration) -> f64 {
        RollupCounter::count(self, key, delta, interval)
    }

    fn query(&self, key: &[u8], interval: Duration) -> f64 {
        RollupCounter::query(self, key, interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const MINUTE: Duration = Duration::from_secs(60);
    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_levels_cover_the_next_coarser_horizon() {
        let rollup = RollupCounter::new(
            0.0,
            0.0,
            &[10 * MINUTE, HOUR, 6 * HOUR, 24 * HOUR],
        )
        .unwrap();

        assert_eq!(rollup.num_levels(), 3);
        let shapes: Vec<(Duration, usize)> = rollup
            .levels
            .iter()
            .map(|level| (level.interval(), level.num_intervals()))
            .collect();
        assert_eq!(
            shapes,
            vec![(10 * MINUTE, 6), (HOUR, 6), (6 * HOUR, 4)]
        );
    }

    #[test]
    fn test_partial_coverage_rounds_up() {
        let rollup = RollupCounter::new(0.0, 0.0, &[10 * MINUTE, 25 * MINUTE]).unwrap();
        assert_eq!(rollup.levels[0].num_intervals(), 3);
    }

    #[test]
    fn test_too_few_durations_is_rejected() {
        let err = RollupCounter::new(0.0, 0.0, &[MINUTE]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_non_ascending_durations_are_rejected() {
        let err = RollupCounter::new(0.0, 0.0, &[HOUR, HOUR]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = RollupCounter::new(0.0, 0.0, &[HOUR, MINUTE]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let err = RollupCounter::new(0.0, 0.0, &[Duration::ZERO, MINUTE]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
