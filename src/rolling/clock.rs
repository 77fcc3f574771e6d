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

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Nanoseconds in one second, the granularity of all counter arithmetic.
pub(crate) const NANOS_PER_SEC: i64 = 1_000_000_000;

/// An injectable time source.
///
/// Counters read the current instant through a `Clock` so tests can drive
/// time deterministically. Monotonicity is assumed but not enforced: a clock
/// that moves backward shrinks the coverage of rate queries without
/// affecting correctness.
pub type Clock = Arc<dyn Fn() -> SystemTime + Send + Sync>;

/// Returns the default clock, reading the system wall clock.
pub fn system_clock() -> Clock {
    Arc::new(SystemTime::now)
}

/// Converts an instant to signed nanoseconds since the Unix epoch.
pub(crate) fn timestamp_nanos(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => saturating_nanos(d),
        Err(e) => -saturating_nanos(e.duration()),
    }
}

/// Converts a duration to signed nanoseconds, saturating at `i64::MAX`.
pub(crate) fn duration_nanos(d: Duration) -> i64 {
    saturating_nanos(d)
}

fn saturating_nanos(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_nanos_is_signed() {
        let after = UNIX_EPOCH + Duration::from_secs(5);
        let before = UNIX_EPOCH - Duration::from_secs(5);
        assert_eq!(timestamp_nanos(after), 5 * NANOS_PER_SEC);
        assert_eq!(timestamp_nanos(before), -5 * NANOS_PER_SEC);
    }

    #[test]
    fn test_duration_nanos_saturates() {
        assert_eq!(duration_nanos(Duration::from_secs(1)), NANOS_PER_SEC);
        assert_eq!(duration_nanos(Duration::MAX), i64::MAX);
    }
}
