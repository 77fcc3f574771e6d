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

use parking_lot::Mutex;

use crate::codec::assert::ensure_preamble_ints_is;
use crate::codec::assert::ensure_serial_version_is;
use crate::codec::family::Family;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::countmin::{DEFAULT_DELTA, DEFAULT_EPSILON};
use crate::error::Error;
use crate::rolling::bucket::TimestampedSketch;
use crate::rolling::clock::{
    duration_nanos, system_clock, timestamp_nanos, Clock, NANOS_PER_SEC,
};
use crate::rolling::serialization::ROLLING_PREAMBLE_INTS;
use crate::rolling::serialization::ROLLING_SERIAL_VERSION;
use crate::rolling::RateSketch;

/// A rolling rate counter over a ring of time-bucketed count-min sketches.
///
/// Counts are always applied to the current bucket, which is reinitialized
/// as needed: an event arriving beyond the current bucket's span opens a new
/// bucket, and when the maximum number of buckets would be exceeded the
/// oldest one is forgotten. Rate queries walk the buckets backward, weighting
/// the bucket that straddles the start of the query window by the fraction
/// actually covered.
///
/// A bucket's start time is the instant of its first write, not a
/// wall-clock-aligned boundary.
pub struct RollingCounter {
    epsilon: f64,
    delta: f64,
    // Maximum span of one bucket, in nanoseconds.
    interval: i64,
    num_intervals: usize,
    clock: Clock,
    buckets: Mutex<Vec<TimestampedSketch>>,
}

impl std::fmt::Debug for RollingCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollingCounter")
            .field("epsilon", &self.epsilon)
            .field("delta", &self.delta)
            .field("interval", &self.interval)
            .field("num_intervals", &self.num_intervals)
            .field("buckets", &self.buckets)
            .finish()
    }
}

impl RollingCounter {
    /// Creates a rolling counter whose buckets each cover at most `interval`
    /// and which retains at most `num_intervals` buckets.
    ///
    /// An `epsilon` or `delta` of zero selects the sketch defaults. Returns
    /// [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// when `num_intervals` is zero.
    pub fn new(
        epsilon: f64,
        delta: f64,
        interval: Duration,
        num_intervals: usize,
    ) -> Result<Self, Error> {
        if num_intervals == 0 {
            return Err(Error::config("num_intervals must be positive"));
        }
        Ok(Self::with_parts(
            epsilon,
            delta,
            duration_nanos(interval),
            num_intervals,
            Vec::new(),
        ))
    }

    fn with_parts(
        epsilon: f64,
        delta: f64,
        interval: i64,
        num_intervals: usize,
        buckets: Vec<TimestampedSketch>,
    ) -> Self {
        let epsilon = if epsilon == 0.0 {
            DEFAULT_EPSILON
        } else {
            epsilon
        };
        let delta = if delta == 0.0 { DEFAULT_DELTA } else { delta };
        Self {
            epsilon,
            delta,
            interval,
            num_intervals,
            clock: system_clock(),
            buckets: Mutex::new(buckets),
        }
    }

    /// Replaces the counter's time source.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Returns the accuracy parameter forwarded to new buckets.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the confidence parameter forwarded to new buckets.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Returns the maximum duration each bucket covers.
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(self.interval.max(0) as u64)
    }

    /// Returns the maximum number of buckets retained.
    pub fn num_intervals(&self) -> usize {
        self.num_intervals
    }

    /// Records `delta` occurrences of `key`, returning the updated observed
    /// rate in events per second over the given interval. If the interval is
    /// smaller than one second, or the available data covers less than a
    /// second, then 0 is returned.
    pub fn count(&self, key: &[u8], delta: u64, interval: Duration) -> f64 {
        let now = timestamp_nanos((self.clock)());
        let (tc, td) = self.count_at(key, delta, now, duration_nanos(interval));
        rate(tc, td)
    }

    /// Returns the observed rate of the given key over the given interval.
    /// If the interval is smaller than one second, or the available data
    /// covers less than a second, then 0 is returned.
    pub fn query(&self, key: &[u8], interval: Duration) -> f64 {
        let buckets = self.buckets.lock();
        if buckets.is_empty() {
            return 0.0;
        }
        let now = timestamp_nanos((self.clock)());
        let (tc, td) = self.walk(&buckets, key, now, duration_nanos(interval), 0);
        rate(tc, td)
    }

    /// Applies `delta` at the explicit instant `now` and walks the buckets,
    /// returning the accumulated `(count, covered duration)` pair.
    pub(crate) fn count_at(
        &self,
        key: &[u8],
        delta: u64,
        now: i64,
        interval: i64,
    ) -> (f64, i64) {
        let mut buckets = self.buckets.lock();

        let rotate = match buckets.last() {
            None => true,
            Some(last) => now - last.start() >= self.interval,
        };
        if rotate {
            if buckets.len() >= self.num_intervals {
                buckets.remove(0);
            }
            buckets.push(TimestampedSketch::new(self.epsilon, self.delta, now));
        }

        let latest = buckets
            .last_mut()
            .map(|bucket| bucket.count(key, delta))
            .unwrap_or(0);

        self.walk(&buckets, key, now, interval, latest)
    }

    /// Walks the buckets at the explicit instant `now` without mutating,
    /// returning the accumulated `(count, covered duration)` pair.
    pub(crate) fn query_at(&self, key: &[u8], now: i64, interval: i64) -> (f64, i64) {
        let buckets = self.buckets.lock();
        self.walk(&buckets, key, now, interval, 0)
    }

    /// The rate walk: iterates buckets newest to oldest, accumulating the
    /// per-bucket count and the duration each bucket accounts for, until the
    /// requested interval is used up.
    ///
    /// `latest` overrides the newest bucket's count when non-zero, saving a
    /// hash pass on the write path. A bucket whose start lies at or after
    /// the cursor is skipped. When the query window opens inside a bucket,
    /// only the covered tail of the bucket counts: the count is scaled by
    /// `d2 / d` and the accounted duration becomes the distance from the
    /// window start to the cursor. A straddling bucket that extends more
    /// than one interval before the window terminates the walk.
    ///
    /// Returns `(0, 0)` when the covered duration is less than one second.
    fn walk(
        &self,
        buckets: &[TimestampedSketch],
        key: &[u8],
        now: i64,
        interval: i64,
        latest: u64,
    ) -> (f64, i64) {
        let mut tc = 0.0f64;
        let mut td = 0i64;
        let mut now = now;
        let mut interval = interval;

        let interval_start = now - interval;
        for i in (0..buckets.len()).rev() {
            if interval <= 0 {
                break;
            }
            let bucket = &buckets[i];

            // How much time the bucket accounts for, from its start to the
            // walk cursor.
            let mut d = now - bucket.start();
            if d <= 0 {
                continue;
            }
            interval -= d;

            let mut n = if i == buckets.len() - 1 && latest != 0 {
                latest as f64
            } else {
                bucket.query(key) as f64
            };

            // If the query window begins after this bucket's start, scale the
            // count down to the covered tail.
            if interval_start > bucket.start() {
                // d2 is the portion between the window start and the cursor
                // that this bucket covers. It may be negative when the bucket
                // ended before the window opened.
                let mut end = bucket.start() + self.interval;
                if end > now {
                    end = now;
                }
                let d2 = end - interval_start;
                if d - d2 > self.interval {
                    break;
                }
                n = n * d2 as f64 / d as f64;
                d = now - interval_start;
            }

            tc += n;
            td += d;
            now = bucket.start();
        }

        if td < NANOS_PER_SEC {
            return (0.0, 0);
        }
        (tc, td)
    }

    /// Serializes the counter and its buckets to a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = SketchBytes::with_capacity(ROLLING_PREAMBLE_INTS as usize * 4);
        self.write_into(&mut bytes);
        bytes.into_bytes()
    }

    /// Deserializes a counter from a byte slice, with the system wall clock.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_clock(bytes, system_clock())
    }

    /// Deserializes a counter from a byte slice with an injected clock.
    pub fn deserialize_with_clock(bytes: &[u8], clock: Clock) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);
        let mut counter = Self::read_from(&mut cursor)?;
        counter.clock = clock;
        Ok(counter)
    }

    pub(crate) fn write_into(&self, bytes: &mut SketchBytes) {
        let buckets = self.buckets.lock();
        bytes.write_u8(ROLLING_PREAMBLE_INTS);
        bytes.write_u8(ROLLING_SERIAL_VERSION);
        bytes.write_u8(Family::ROLLING.id);
        bytes.write_u8(0);
        bytes.write_f64_le(self.epsilon);
        bytes.write_f64_le(self.delta);
        bytes.write_i64_le(self.interval);
        bytes.write_i32_le(self.num_intervals as i32);
        bytes.write_u32_le(buckets.len() as u32);
        for bucket in buckets.iter() {
            bucket.write_into(bytes);
        }
    }

    pub(crate) fn read_from(cursor: &mut SketchSlice<'_>) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let preamble_ints = cursor.read_u8().map_err(make_error("preamble_ints"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        cursor.read_u8().map_err(make_error("flags"))?;
        let epsilon = cursor.read_f64_le().map_err(make_error("epsilon"))?;
        let delta = cursor.read_f64_le().map_err(make_error("delta"))?;
        let interval = cursor.read_i64_le().map_err(make_error("interval"))?;
        let num_intervals = cursor.read_i32_le().map_err(make_error("num_intervals"))?;
        let num_buckets = cursor.read_u32_le().map_err(make_error("num_buckets"))?;

        Family::ROLLING.validate_id(family_id)?;
        ensure_serial_version_is(ROLLING_SERIAL_VERSION, serial_version)?;
        ensure_preamble_ints_is(ROLLING_PREAMBLE_INTS, preamble_ints)?;
        if num_intervals <= 0 {
            return Err(Error::deserial("num_intervals must be positive")
                .with_context("num_intervals", num_intervals));
        }
        let num_intervals = num_intervals as usize;
        if num_buckets as usize > num_intervals {
            return Err(Error::deserial("bucket count exceeds num_intervals")
                .with_context("num_buckets", num_buckets)
                .with_context("num_intervals", num_intervals));
        }

        let mut buckets: Vec<TimestampedSketch> = Vec::with_capacity(num_buckets as usize);
        for _ in 0..num_buckets {
            let bucket = TimestampedSketch::read_from(cursor)?;
            if let Some(prev) = buckets.last() {
                if bucket.start() <= prev.start() {
                    return Err(Error::deserial(
                        "bucket start times must be strictly increasing",
                    ));
                }
            }
            buckets.push(bucket);
        }

        Ok(Self::with_parts(
            epsilon,
            delta,
            interval,
            num_intervals,
            buckets,
        ))
    }
}

impl RateSketch for RollingCounter {
    fn count(&self, key: &[u8], delta: u64, interval: Duration) -> f64 {
        RollingCounter::count(self, key, delta, interval)
    }

    fn query(&self, key: &[u8], interval: Duration) -> f64 {
        RollingCounter::query(self, key, interval)
    }
}

/// Converts an accumulated `(count, duration)` pair to events per second.
pub(crate) fn rate(total_count: f64, total_duration: i64) -> f64 {
    if total_duration == 0 {
        return 0.0;
    }
    (total_count / total_duration as f64) * NANOS_PER_SEC as f64
}
