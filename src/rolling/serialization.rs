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

//! Binary serialization format constants for the rate counters.
//!
//! The mutex and the clock function are never encoded: decoding restores an
//! unlocked counter whose clock must be re-injected or left defaulted to the
//! system wall clock.

/// Rolling counter preamble size in 4-byte ints: header, epsilon, delta,
/// interval, num_intervals, num_buckets.
pub(super) const ROLLING_PREAMBLE_INTS: u8 = 9;

/// Current rolling counter serialization version.
pub(super) const ROLLING_SERIAL_VERSION: u8 = 1;

/// Rollup counter preamble size in 4-byte ints: header, num_levels.
pub(super) const ROLLUP_PREAMBLE_INTS: u8 = 2;

/// Current rollup counter serialization version.
pub(super) const ROLLUP_SERIAL_VERSION: u8 = 1;

/// Bucket tag: a sketch encoding follows.
pub(super) const BUCKET_SKETCH_PRESENT: u8 = 1;

/// Bucket tag: the bucket was serialized in its empty form.
pub(super) const BUCKET_SKETCH_ABSENT: u8 = 0;
