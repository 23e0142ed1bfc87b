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

//! Events published by the streaming parser.
//!
//! Every parser in the subtest tree delivers its events to one
//! [`EventSink`]; the sink callback receives the nesting level of the
//! emitting parser (0 at the root), which is how consumers tell a subtest's
//! `plan` from its parent's. Subtests announce themselves with a
//! [`TapEvent::Child`] before their first event and close with their own
//! [`TapEvent::Complete`].
//!
//! # Example event sequence
//!
//! For this stream:
//!
//! ```text
//! TAP version 13
//! 1..1
//! ok 1 - hello
//! ```
//!
//! the parser delivers (line events elided):
//!
//! ```text
//! (0, Version(13))
//! (0, Plan { start: 1, end: 1 })
//! (0, Assert { ok: true, id: 1, name: "hello" })
//! (0, Complete { ok: true, count: 1, pass: 1, .. })
//! ```

use serde::Serialize;
use tapline_core::{Assertion, Plan, Summary};

/// A subtest announcement: the payload of [`TapEvent::Child`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildInfo {
    /// Indent prefix the subtest's lines carry in the parent stream.
    pub indent: String,
    /// Nesting depth of the new parser (parent level + 1).
    pub level: usize,
    /// Whether this is a brace-delimited (buffered) subtest.
    pub buffered: bool,
}

/// Events emitted while parsing a TAP stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TapEvent {
    /// Every completed line, verbatim (CRLF normalized, `\n` included).
    /// Concatenating the level-0 line payloads reproduces the normalized
    /// input.
    Line(String),
    /// A valid `TAP version N` announcement (N >= 13).
    Version(u64),
    /// A valid plan declaration.
    Plan(Plan),
    /// A flushed test point.
    Assert(Assertion),
    /// A comment line, delivered after the assertion it follows.
    Comment(String),
    /// Non-TAP input, passed through verbatim.
    Extra(String),
    /// A subtest parser was spawned.
    Child(ChildInfo),
    /// An accepted `pragma` switch.
    Pragma { name: String, enabled: bool },
    /// `Bail out!` - the stream is over.
    Bailout(String),
    /// The final summary; exactly one per parser.
    Complete(Summary),
}

impl TapEvent {
    #[inline]
    pub fn is_assert(&self) -> bool {
        matches!(self, TapEvent::Assert(_))
    }

    #[inline]
    pub fn as_assert(&self) -> Option<&Assertion> {
        match self {
            TapEvent::Assert(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn as_summary(&self) -> Option<&Summary> {
        match self {
            TapEvent::Complete(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_line(&self) -> Option<&str> {
        match self {
            TapEvent::Line(l) => Some(l),
            _ => None,
        }
    }
}

/// Receives events from a parser tree.
///
/// `level` is the nesting depth of the emitting parser. Implement it on
/// whatever accumulates your view of the stream:
///
/// ```
/// use tapline_stream::{EventSink, Parser, TapEvent};
///
/// #[derive(Default)]
/// struct AssertCounter(usize);
///
/// impl EventSink for AssertCounter {
///     fn event(&mut self, _level: usize, event: TapEvent) {
///         if event.is_assert() {
///             self.0 += 1;
///         }
///     }
/// }
///
/// let mut parser = Parser::new();
/// let mut counter = AssertCounter::default();
/// parser.write_str("1..1\nok 1\n", &mut counter);
/// parser.end(&mut counter);
/// assert_eq!(counter.0, 1);
/// ```
pub trait EventSink {
    fn event(&mut self, level: usize, event: TapEvent);
}

/// A sink that simply records everything, in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<(usize, TapEvent)>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All flushed assertions at the given level.
    pub fn asserts_at(&self, level: usize) -> impl Iterator<Item = &Assertion> {
        self.events
            .iter()
            .filter(move |(l, _)| *l == level)
            .filter_map(|(_, e)| e.as_assert())
    }

    /// The root summary, once `end` has run.
    pub fn summary(&self) -> Option<&Summary> {
        self.events
            .iter()
            .filter(|(l, _)| *l == 0)
            .find_map(|(_, e)| e.as_summary())
    }

    /// Concatenation of the root parser's raw lines.
    pub fn root_lines(&self) -> String {
        self.events
            .iter()
            .filter(|(l, _)| *l == 0)
            .filter_map(|(_, e)| e.as_line())
            .collect()
    }
}

impl EventSink for EventLog {
    #[inline]
    fn event(&mut self, level: usize, event: TapEvent) {
        self.events.push((level, event));
    }
}
