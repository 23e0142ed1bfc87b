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

//! Final stream outcome: tallies, failures and the `complete` summary.

use crate::assertion::Assertion;
use crate::error::TapError;
use crate::plan::PlanSummary;
use serde::Serialize;

/// Running counters for one parser.
///
/// `pass` counts every point that does not count against the stream, so a
/// failing point excused by TODO or SKIP lands in `pass` (and in `todo` /
/// `skip`). `pass + fail == count` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub count: usize,
    pub pass: usize,
    pub fail: usize,
    pub todo: usize,
    pub skip: usize,
}

impl Tally {
    /// Fold one flushed assertion into the counters. Returns whether the
    /// point counts as a hard failure.
    pub fn record(&mut self, assertion: &Assertion) -> bool {
        self.count += 1;
        if assertion.todo.is_some() {
            self.todo += 1;
        }
        if assertion.skip.is_some() {
            self.skip += 1;
        }
        let hard_failure = !assertion.ok && !assertion.is_excused();
        if hard_failure {
            self.fail += 1;
        } else {
            self.pass += 1;
        }
        hard_failure
    }
}

/// One entry in [`Summary::failures`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Failure {
    /// A test point that failed without excuse, or carried a `tapError`.
    Assertion(Assertion),
    /// A protocol error synthesized by the parser itself.
    Protocol {
        #[serde(rename = "tapError")]
        tap_error: TapError,
    },
    /// Non-TAP input reported under `pragma +strict`.
    NonTap {
        #[serde(rename = "tapError")]
        tap_error: TapError,
        data: String,
    },
}

impl Failure {
    pub fn protocol(tap_error: TapError) -> Self {
        Failure::Protocol { tap_error }
    }

    pub fn non_tap(data: String) -> Self {
        Failure::NonTap {
            tap_error: TapError::NonTapInStrictMode,
            data,
        }
    }

    /// The protocol error carried by this entry, if any.
    pub fn tap_error(&self) -> Option<TapError> {
        match self {
            Failure::Assertion(a) => a.tap_error,
            Failure::Protocol { tap_error } | Failure::NonTap { tap_error, .. } => {
                Some(*tap_error)
            }
        }
    }

    pub fn as_assertion(&self) -> Option<&Assertion> {
        match self {
            Failure::Assertion(a) => Some(a),
            _ => None,
        }
    }
}

/// The record emitted exactly once on `complete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub ok: bool,
    pub count: usize,
    pub pass: usize,
    pub fail: usize,
    pub todo: usize,
    pub skip: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bailout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanSummary>,
    pub failures: Vec<Failure>,
}

impl Summary {
    /// The summary of a stream that never produced usable TAP: an empty
    /// passing run.
    pub fn empty_pass() -> Self {
        Summary {
            ok: true,
            count: 0,
            pass: 0,
            fail: 0,
            todo: 0,
            skip: 0,
            bailout: None,
            plan: Some(PlanSummary::empty()),
            failures: Vec::new(),
        }
    }
}
