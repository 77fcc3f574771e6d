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

use std::collections::HashMap;

use common::{random_ipv4, XorShift64};
use ratesketch::countmin::CountMinSketch;

/// Builds a population of a few named keys plus random addresses, with the
/// true count of each key fixed by its insertion order.
fn population(rng: &mut XorShift64) -> HashMap<Vec<u8>, u64> {
    let mut counts: HashMap<Vec<u8>, u64> = HashMap::new();
    for (key, count) in [
        (&b"one"[..], 1u64),
        (b"two", 2),
        (b"three", 3),
        (b"a lot", 42),
        (b"a bunch", 512),
        (b"tons", 1024),
        (b"wow much spam", 64000),
    ] {
        counts.insert(key.to_vec(), count);
    }
    while counts.len() < 500 {
        let ip = random_ipv4(rng);
        if !counts.contains_key(&ip) {
            let next = counts.len() as u64;
            counts.insert(ip, next);
        }
    }
    counts
}

#[test]
fn counts_are_roughly_accurate() {
    let mut rng = XorShift64::new(0x00c0ffee);
    let counts = population(&mut rng);

    let total: u64 = counts.values().sum();
    let mut events: Vec<&[u8]> = Vec::with_capacity(total as usize);
    for (key, &count) in &counts {
        for _ in 0..count {
            events.push(key.as_slice());
        }
    }
    rng.shuffle(&mut events);

    let mut sketch = CountMinSketch::new(0.0, 0.0);
    let mut latest: HashMap<&[u8], u64> = HashMap::new();
    for &key in &events {
        let updated = sketch.count(key, 1);
        if let Some(&previous) = latest.get(&key) {
            assert!(updated >= previous, "estimates must be non-decreasing");
        }
        latest.insert(key, updated);
    }

    // Never undercounts, and overshoots by more than (1 - epsilon) of the
    // total mass for at most (1 - delta) of the keys.
    let bound = (0.001 * total as f64).ceil() as u64;
    let mut errs = 0usize;
    for (key, &truth) in &counts {
        let estimate = sketch.query(key);
        assert!(
            estimate >= truth,
            "estimate {estimate} under true count {truth}"
        );
        if estimate - truth > bound {
            errs += 1;
        }
    }
    let max_errs = 0.01 * counts.len() as f64;
    assert!(
        (errs as f64) <= max_errs,
        "more than {max_errs} counts ({errs}) were outside of the epsilon range"
    );
}

#[test]
fn query_never_drops_below_the_latest_update() {
    let mut rng = XorShift64::new(0xfeedbeef);
    let counts = population(&mut rng);

    let mut sketch = CountMinSketch::new(0.0, 0.0);
    let mut latest: HashMap<&Vec<u8>, u64> = HashMap::new();
    for (key, &count) in &counts {
        latest.insert(key, sketch.count(key, count));
    }
    for (key, &seen) in &latest {
        assert!(sketch.query(key) >= seen);
    }
}
