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

use crate::error::Error;

/// Defines the families of encodable sketch and counter classes.
///
/// A family identifies one encoding layout. The leading byte triple
/// (preamble size, serial version, family id) lets a decoder reject input
/// that was produced by a different type before reading any payload.
pub struct Family {
    /// The byte ID for this family.
    pub id: u8,
    /// The name for this family.
    pub name: &'static str,
}

impl Family {
    /// The count-min sketch.
    pub const COUNTMIN: Family = Family {
        id: 18,
        name: "COUNTMIN",
    };

    /// The rolling rate counter.
    pub const ROLLING: Family = Family {
        id: 19,
        name: "ROLLING",
    };

    /// The rollup rate counter.
    pub const ROLLUP: Family = Family {
        id: 20,
        name: "ROLLUP",
    };
}

impl Family {
    pub fn validate_id(&self, family_id: u8) -> Result<(), Error> {
        if family_id != self.id {
            Err(Error::invalid_family(self.id, family_id, self.name))
        } else {
            Ok(())
        }
    }
}
