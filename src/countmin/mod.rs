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

//! Count-Min sketch implementation for frequency estimation.
//!
//! The Count-Min sketch provides approximate occurrence counts for streaming
//! keys with configurable accuracy and confidence bounds. Queries never
//! undercount: the estimate for a key is at least its true count, and exceeds
//! it by more than `epsilon` times the total inserted mass only with
//! probability `1 - delta`.
//!
//! # Usage
//!
//! ```rust
//! use ratesketch::countmin::CountMinSketch;
//!
//! let mut sketch = CountMinSketch::new(0.0, 0.0);
//!
//! sketch.count(b"apple", 1);
//! sketch.count(b"banana", 3);
//!
//! let banana = sketch.query(b"banana");
//! assert!(banana >= 3);
//! ```

mod serialization;

mod sketch;
pub use self::sketch::CountMinSketch;
pub use self::sketch::{DEFAULT_DELTA, DEFAULT_EPSILON};
