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

//! Count- and rate-tracking sketches.
//!
//! These are probabilistic data structures that track the occurrences of a
//! very large number of distinct keys using a relatively small, fixed amount
//! of space. The resulting counts and rates are estimates with a
//! configurable level of accuracy.
//!
//! Three layers are provided:
//!
//! - [`countmin::CountMinSketch`] approximates per-key event totals.
//! - [`rolling::RollingCounter`] keeps a ring of time-bucketed sketches and
//!   answers per-key rate queries over a sliding window.
//! - [`rolling::RollupCounter`] stacks rolling counters at progressively
//!   coarser resolutions so a single query can span hours or days.
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use ratesketch::rolling::RollingCounter;
//!
//! let counter = RollingCounter::new(0.0, 0.0, Duration::from_secs(60), 10).unwrap();
//! counter.count(b"198.51.100.7", 1, Duration::from_secs(60));
//! let rate = counter.query(b"198.51.100.7", Duration::from_secs(60));
//! assert!(rate >= 0.0);
//! ```

mod codec;

pub mod countmin;
pub mod error;
pub mod hash;
pub mod rolling;
