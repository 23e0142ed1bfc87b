// Tapline - Streaming Test Anything Protocol Parser
//
// Copyright (c) 2025 Tapline contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! TAP protocol errors.
//!
//! These are not parser failures: a TAP stream never aborts parsing. Each
//! variant is a diagnosis attached to an assertion record or synthesized at
//! end of stream, and its `Display` text is the exact string consumers see
//! in `tapError` fields.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// The fixed set of protocol-error strings.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapError {
    /// The stream ended without ever declaring a plan.
    #[error("no plan")]
    NoPlan,

    /// The number of test points does not match the plan window.
    #[error("incorrect number of tests")]
    IncorrectCount,

    /// The smallest test-point id differs from the plan start.
    #[error("first test id does not match plan start")]
    FirstIdMismatch,

    /// The largest test-point id differs from the plan end.
    #[error("last test id does not match plan end")]
    LastIdMismatch,

    /// A test point carried an id below the declared window.
    #[error("id less than plan start")]
    IdLessThanPlanStart,

    /// A test point carried an id above the declared window.
    #[error("id greater than plan end")]
    IdGreaterThanPlanEnd,

    /// A `1..0` skip-all plan coexists with actual test points.
    #[error("Plan of 1..0, but test points encountered")]
    SkipAllWithTestPoints,

    /// Non-TAP input arrived while `pragma +strict` was in effect.
    #[error("Non-TAP data encountered in strict mode")]
    NonTapInStrictMode,
}

impl Serialize for TapError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
