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

//! Binary serialization format constants for the Count-Min sketch.

/// Preamble size in 4-byte ints: header, epsilon, delta, width, depth.
pub(super) const PREAMBLE_INTS: u8 = 7;

/// Current serialization version.
pub(super) const SERIAL_VERSION: u8 = 1;

/// Flag: the sketch holds no mass and the matrix is omitted.
pub(super) const FLAGS_IS_EMPTY: u8 = 1 << 2;

/// Size of a single matrix counter in bytes (u64).
pub(super) const COUNTER_SIZE_BYTES: usize = 8;
