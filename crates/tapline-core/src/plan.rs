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

//! Plan declarations.

use serde::Serialize;

/// A declared plan window, as emitted on the `plan` event.
///
/// The empty plan `1..0` means "skip everything"; its comment, when present,
/// is the skip reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub start: u64,
    pub end: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Plan {
    /// Number of test points the window calls for.
    #[inline]
    pub fn expected_count(&self) -> usize {
        (self.end + 1).saturating_sub(self.start) as usize
    }

    /// `1..0`, the skip-all declaration.
    #[inline]
    pub fn is_skip_all(&self) -> bool {
        self.start == 1 && self.end == 0
    }
}

/// The plan section of a final [`Summary`](crate::Summary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub start: u64,
    pub end: u64,
    pub skip_all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        let skip_all = plan.is_skip_all();
        PlanSummary {
            start: plan.start,
            end: plan.end,
            skip_all,
            skip_reason: if skip_all { plan.comment.clone() } else { None },
        }
    }
}

impl PlanSummary {
    /// The summary every stream without usable TAP collapses to: an empty,
    /// passing `1..0` run.
    pub fn empty() -> Self {
        PlanSummary {
            start: 1,
            end: 0,
            skip_all: true,
            skip_reason: None,
        }
    }
}
