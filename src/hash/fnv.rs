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

// Constants and derivation taken from the 64-bit FNV-1 hash.
const FNV_OFFSET_64: u64 = 0xcbf29ce484222325;
const FNV_PRIME_64: u64 = 0x100000001b3;

/// A 64-bit kernel from which a whole family of hash values is derived
/// without re-scanning the key.
///
/// The kernel is the FNV-1 hash of the key. The i-th member of the family
/// combines the low and high halves of the kernel as
/// `(kernel & 0xFFFFFFFF) + (kernel >> 32) * i`. Persisted sketches depend
/// on this derivation being bit-exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashKernel(u64);

impl HashKernel {
    /// Derives the kernel from a key in a single pass.
    pub fn derive(key: &[u8]) -> Self {
        let mut k = FNV_OFFSET_64;
        for &b in key {
            k = k.wrapping_mul(FNV_PRIME_64) ^ u64::from(b);
        }
        HashKernel(k)
    }

    /// Returns the `index`-th hash value of the family.
    pub fn hash(self, index: u64) -> u64 {
        (self.0 & 0xffff_ffff).wrapping_add((self.0 >> 32).wrapping_mul(index))
    }
}

impl From<HashKernel> for u64 {
    fn from(kernel: HashKernel) -> u64 {
        kernel.0
    }
}
