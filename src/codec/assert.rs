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

/// Rejects input encoded with a serial version other than the expected one.
pub(crate) fn ensure_serial_version_is(expected: u8, actual: u8) -> Result<(), Error> {
    if actual != expected {
        return Err(Error::unsupported_serial_version(expected, actual));
    }
    Ok(())
}

/// Rejects input whose declared preamble size does not match the layout.
pub(crate) fn ensure_preamble_ints_is(expected: u8, actual: u8) -> Result<(), Error> {
    if actual != expected {
        return Err(Error::invalid_preamble_ints(expected, actual));
    }
    Ok(())
}
