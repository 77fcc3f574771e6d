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

mod common;

use std::time::Duration;

use common::ManualClock;
use googletest::assert_that;
use googletest::prelude::near;
use ratesketch::error::ErrorKind;
use ratesketch::rolling::RollingCounter;

const KEY: &[u8] = b"key";

fn counter(interval: Duration, num_intervals: usize, clock: &ManualClock) -> RollingCounter {
    let mut counter = RollingCounter::new(0.0, 0.0, interval, num_intervals).unwrap();
    counter.set_clock(clock.clock());
    counter
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[test]
fn zero_capacity_is_rejected() {
    let err = RollingCounter::new(0.0, 0.0, secs(60), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}

#[test]
fn empty_counter_reports_zero() {
    let clock = ManualClock::new();
    let counter = counter(secs(60), 3, &clock);
    assert_eq!(counter.query(KEY, secs(90)), 0.0);
}

#[test]
fn sub_second_interval_reports_zero() {
    let clock = ManualClock::new();
    let counter = counter(secs(60), 3, &clock);
    counter.count(KEY, 100, Duration::ZERO);
    clock.advance(secs(30));
    assert_eq!(counter.query(KEY, Duration::from_millis(500)), 0.0);
    assert_eq!(counter.count(KEY, 1, Duration::from_millis(999)), 0.0);
}

#[test]
fn single_key_rate_tracks_bucket_history() {
    let clock = ManualClock::new();
    let counter = counter(secs(60), 10, &clock);

    counter.count(KEY, 1, Duration::ZERO);
    clock.advance(secs(1));
    assert_eq!(counter.query(KEY, secs(60)), 1.0);

    counter.count(KEY, 479, Duration::ZERO);
    clock.advance(secs(59));
    assert_eq!(counter.query(KEY, secs(60)), 8.0);

    clock.advance(secs(1));
    counter.count(KEY, 240, Duration::ZERO);
    clock.advance(secs(60));
    assert_eq!(counter.query(KEY, secs(60)), 4.0);
    assert_that!(
        counter.query(KEY, secs(120)),
        near((480.0 * 59.0 / 61.0 + 240.0) / 120.0, 1e-9)
    );

    clock.advance(secs(1));
    counter.count(KEY, 120, Duration::ZERO);
    clock.advance(secs(60));
    assert_eq!(counter.query(KEY, secs(60)), 2.0);
    assert_that!(
        counter.query(KEY, secs(120)),
        near((240.0 * 59.0 / 61.0 + 120.0) / 120.0, 1e-9)
    );
    assert_that!(
        counter.query(KEY, secs(180)),
        near((480.0 * 58.0 / 61.0 + 240.0 + 120.0) / 180.0, 1e-9)
    );

    clock.advance(secs(1));
    assert_eq!(counter.count(KEY, 1, secs(1)), 0.0);
    assert_that!(
        counter.query(KEY, secs(60)),
        near((59.0 / 61.0 * 120.0) / 60.0, 1e-9)
    );
    assert_that!(
        counter.query(KEY, secs(120)),
        near((58.0 / 61.0 * 240.0 + 120.0) / 120.0, 1e-9)
    );
    assert_that!(
        counter.query(KEY, secs(180)),
        near((57.0 / 61.0 * 480.0 + 240.0 + 120.0) / 180.0, 1e-9)
    );
    assert_that!(
        counter.query(KEY, secs(300)),
        near((480.0 + 240.0 + 120.0) / 183.0, 1e-9)
    );
}

#[test]
fn sparse_rate_counts_only_covered_time() {
    let clock = ManualClock::new();
    let counter = counter(secs(60), 10, &clock);

    counter.count(KEY, 1, Duration::ZERO);
    clock.advance(secs(598));
    assert_that!(counter.count(KEY, 1, secs(600)), near(1.0 / 598.0, 1e-9));
    clock.advance(secs(1));
    assert_that!(counter.query(KEY, secs(600)), near(2.0 / 599.0, 1e-9));

    clock.advance(secs(599));
    assert_that!(counter.count(KEY, 1, secs(600)), near(1.0 / 600.0, 1e-9));
    clock.advance(secs(1));
    assert_eq!(counter.query(KEY, secs(600)), 1.0);

    clock.advance(secs(1200));
    assert_eq!(counter.count(KEY, 1, secs(600)), 0.0);
}

#[test]
fn intermittent_rate_spans_the_gap() {
    let clock = ManualClock::new();
    let counter = counter(secs(60), 10, &clock);

    for _ in 0..10 {
        counter.count(KEY, 1, Duration::ZERO);
        clock.advance(secs(60));
    }

    clock.advance(secs(420));
    counter.count(KEY, 1, Duration::ZERO);
    clock.advance(secs(60));
    assert_that!(counter.query(KEY, secs(600)), near(3.0 / 600.0, 1e-9));
    clock.advance(secs(359));
    assert_that!(counter.query(KEY, secs(600)), near(1.0 / 419.0, 1e-9));
}
