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

//! Assertion records built from test-point lines.

use crate::error::TapError;
use crate::lex::{parse_directive, split_description, Directive, Reason, TestPoint};
use serde::Serialize;

/// One parsed test point.
///
/// Built from a classified line plus the ambient test counter; a diagnostic
/// block attached by the stream parser lands in `diag`, and protocol
/// problems diagnosed for this specific point land in `tap_error`.
///
/// # Examples
///
/// ```
/// use tapline_core::{classify, Assertion, TapLine};
///
/// let TapLine::TestPoint(point) = classify("not ok 3 - boom # TODO fix\n").unwrap() else {
///     panic!("expected test point");
/// };
/// let assertion = Assertion::from_test_point(point, 1);
/// assert!(!assertion.ok);
/// assert_eq!(assertion.id, 3);
/// assert_eq!(assertion.name.as_deref(), Some("boom"));
/// assert!(assertion.todo.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assertion {
    pub ok: bool,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo: Option<Reason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<Reason>,
    /// Runtime in milliseconds, from a `time=` directive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diag: Option<serde_yaml::Value>,
    #[serde(rename = "tapError", skip_serializing_if = "Option::is_none")]
    pub tap_error: Option<TapError>,
}

impl Assertion {
    /// Build an assertion from a classified test point.
    ///
    /// `fallback_id` is the id an unnumbered point receives (the ambient
    /// count plus one). The description tail is split into name and
    /// directive here; unrecognized directive text is folded back into the
    /// name with its `#`.
    pub fn from_test_point(point: TestPoint, fallback_id: u64) -> Self {
        let mut assertion = Assertion {
            ok: point.ok,
            id: point.id.unwrap_or(fallback_id),
            name: None,
            todo: None,
            skip: None,
            time: None,
            diag: None,
            tap_error: None,
        };

        if let Some(rest) = point.rest {
            let (head, tail) = split_description(&rest);
            let mut name = head.to_string();
            if let Some(raw) = tail {
                match parse_directive(raw) {
                    Some(Directive::Todo(reason)) => assertion.todo = Some(reason),
                    Some(Directive::Skip(reason)) => assertion.skip = Some(reason),
                    Some(Directive::Time(ms)) => assertion.time = Some(ms),
                    None => {
                        name.push('#');
                        name.push_str(raw);
                    }
                }
            }
            let name = name.trim();
            if !name.is_empty() {
                assertion.name = Some(name.to_string());
            }
        }

        assertion
    }

    /// Stamp a plan-window violation on this assertion, if any.
    pub fn check_plan(&mut self, start: u64, end: u64) {
        if self.id < start {
            self.tap_error = Some(TapError::IdLessThanPlanStart);
        } else if self.id > end {
            self.tap_error = Some(TapError::IdGreaterThanPlanEnd);
        }
    }

    /// A failure that is excused by a TODO or SKIP directive does not count
    /// against the stream.
    #[inline]
    pub fn is_excused(&self) -> bool {
        self.todo.is_some() || self.skip.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::{classify, TapLine};

    fn build(line: &str, fallback: u64) -> Assertion {
        match classify(line) {
            Some(TapLine::TestPoint(p)) => Assertion::from_test_point(p, fallback),
            other => panic!("expected test point, got {:?}", other),
        }
    }

    #[test]
    fn test_id_fallback_uses_ambient_count() {
        assert_eq!(build("ok\n", 4).id, 4);
        assert_eq!(build("ok 9\n", 4).id, 9);
    }

    #[test]
    fn test_name_extraction() {
        assert_eq!(build("ok 1 - hello\n", 1).name.as_deref(), Some("hello"));
        assert_eq!(build("ok 1\n", 1).name, None);
        assert_eq!(build("ok 1 -  padded  \n", 1).name.as_deref(), Some("padded"));
    }

    #[test]
    fn test_directives_attach() {
        let a = build("ok 1 - later # TODO not yet\n", 1);
        assert_eq!(a.todo, Some(Reason::Text("not yet".to_string())));
        assert_eq!(a.name.as_deref(), Some("later"));

        let a = build("ok 1 - windows # SKIP\n", 1);
        assert_eq!(a.skip, Some(Reason::Bare));

        let a = build("ok 1 - fast # time=12ms\n", 1);
        assert_eq!(a.time, Some(12.0));
    }

    #[test]
    fn test_unknown_directive_folds_back_into_name() {
        let a = build("ok 1 - see # issue 4\n", 1);
        assert_eq!(a.name.as_deref(), Some("see # issue 4"));
        assert!(a.todo.is_none());
    }

    #[test]
    fn test_escaped_hash_stays_in_name() {
        let a = build("ok 1 - count \\# of things # skip\n", 1);
        assert_eq!(a.name.as_deref(), Some(r"count \# of things"));
        assert_eq!(a.skip, Some(Reason::Bare));
    }

    #[test]
    fn test_check_plan_window() {
        let mut a = build("ok 7\n", 1);
        a.check_plan(1, 5);
        assert_eq!(a.tap_error, Some(TapError::IdGreaterThanPlanEnd));

        let mut a = build("ok 1\n", 1);
        a.check_plan(3, 5);
        assert_eq!(a.tap_error, Some(TapError::IdLessThanPlanStart));

        let mut a = build("ok 3\n", 1);
        a.check_plan(1, 5);
        assert_eq!(a.tap_error, None);
    }

    #[test]
    fn test_excused_failures() {
        assert!(build("not ok 1 # TODO\n", 1).is_excused());
        assert!(build("not ok 1 # skip why\n", 1).is_excused());
        assert!(!build("not ok 1\n", 1).is_excused());
    }
}
