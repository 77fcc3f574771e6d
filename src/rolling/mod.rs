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

//! Time-windowed rate counters built on count-min sketches.
//!
//! A [`RollingCounter`] keeps a bounded ring of time-bucketed sketches and
//! estimates per-key event rates over a sliding window. A [`RollupCounter`]
//! stacks rolling counters at progressively coarser resolutions so a query
//! can span hours or days without storing fine-grained buckets for the whole
//! span.
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use ratesketch::rolling::RollupCounter;
//!
//! let counter = RollupCounter::new(
//!     0.0,
//!     0.0,
//!     &[
//!         Duration::from_secs(600),
//!         Duration::from_secs(3600),
//!         Duration::from_secs(6 * 3600),
//!         Duration::from_secs(24 * 3600),
//!     ],
//! )
//! .unwrap();
//! counter.count(b"key", 1, Duration::from_secs(60));
//! ```

mod bucket;
mod clock;
mod counter;
mod rollup;
mod serialization;

pub use self::clock::{system_clock, Clock};
pub use self::counter::RollingCounter;
pub use self::rollup::RollupCounter;

use std::time::Duration;

/// An interface for tracking the rate at which keys are observed.
pub trait RateSketch {
    /// Records `delta` occurrences of `key`, returning the updated observed
    /// rate in events per second over the given interval. If the interval is
    /// smaller than one second, or the available data covers less than a
    /// second, then 0 is returned.
    fn count(&self, key: &[u8], delta: u64, interval: Duration) -> f64;

    /// Returns the observed rate of the given key over the given interval.
    /// If the interval is smaller than one second, or the available data
    /// covers less than a second, then 0 is returned.
    fn query(&self, key: &[u8], interval: Duration) -> f64;
}
