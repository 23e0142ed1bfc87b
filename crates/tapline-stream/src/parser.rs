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

//! The streaming TAP state machine.
//!
//! [`Parser`] ingests bytes in chunks of arbitrary size, cuts them into
//! lines, and dispatches each line against its current state: an optional
//! pending assertion (held back so a diagnostic block can attach to it), an
//! optional in-progress diagnostic block, an optional nested subtest parser,
//! and the declared plan window. Events go to an [`EventSink`]; nothing here
//! ever returns an error, because TAP reserves no way to fail - malformed
//! input degrades to `extra` events and protocol problems are reified as
//! `tapError` records.
//!
//! # Basic usage
//!
//! ```
//! use tapline_stream::{EventLog, Parser};
//!
//! let mut parser = Parser::new();
//! let mut log = EventLog::new();
//!
//! parser.write_str("TAP version 13\n1..2\nok 1 - math\n", &mut log);
//! parser.write_str("not ok 2 - gravity\n", &mut log);
//! let summary = parser.end(&mut log);
//!
//! assert!(!summary.ok);
//! assert_eq!(summary.count, 2);
//! assert_eq!(summary.pass, 1);
//! assert_eq!(summary.fail, 1);
//! ```
//!
//! # Subtests
//!
//! An indented TAP-shaped line opens a streamed subtest; a test point whose
//! name ends in `{` buffers one until the matching `}`. Subtests are full
//! recursive parsers owned by their parent; their events arrive on the same
//! sink tagged with their nesting level.

use crate::diagnostic::DiagnosticBlock;
use crate::event::{ChildInfo, EventSink, TapEvent};
use std::collections::BTreeMap;
use tapline_core::{
    classify, Assertion, Failure, Plan, PlanSummary, Summary, Tally, TapError, TapLine, TestPoint,
};

/// Construction options for a [`Parser`].
///
/// Root callers keep the defaults; `indent`, `level` and `buffered` exist
/// for the parser's own subtest spawning.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Prefix stripped from every line before this parser sees it.
    pub indent: String,
    /// Nesting depth; 0 at the root.
    pub level: usize,
    /// Whether this parser is a brace-delimited subtest.
    pub buffered: bool,
    /// Start in strict mode, as if `pragma +strict` had been seen.
    pub strict: bool,
}

/// Streaming push parser for one TAP stream (and, recursively, its
/// subtests).
///
/// Feed it with [`write`](Parser::write) / [`write_str`](Parser::write_str)
/// and finish with [`end`](Parser::end), which drains any unterminated
/// line, validates the plan and returns the [`Summary`] (also emitted as
/// [`TapEvent::Complete`]).
pub struct Parser {
    indent: String,
    level: usize,
    buffered: bool,

    line_buffer: Vec<u8>,
    bailed_out: Option<String>,
    plan: Option<Plan>,
    post_plan: bool,
    diag: Option<DiagnosticBlock>,
    child: Option<Box<Parser>>,
    current: Option<Assertion>,
    comment_queue: Vec<String>,

    tally: Tally,
    ok: bool,
    first: Option<u64>,
    last: Option<u64>,
    failures: Vec<Failure>,
    saw_valid_tap: bool,
    strict: bool,
    pragmas: BTreeMap<String, bool>,

    done: Option<Summary>,
}

impl Parser {
    /// A root parser with default options.
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Parser {
            indent: options.indent,
            level: options.level,
            buffered: options.buffered,
            line_buffer: Vec::new(),
            bailed_out: None,
            plan: None,
            post_plan: false,
            diag: None,
            child: None,
            current: None,
            comment_queue: Vec::new(),
            tally: Tally::default(),
            ok: true,
            first: None,
            last: None,
            failures: Vec::new(),
            saw_valid_tap: false,
            strict: options.strict,
            pragmas: BTreeMap::new(),
            done: None,
        }
    }

    /// Nesting depth of this parser; 0 at the root.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// The indent prefix this parser was bound to (empty at the root).
    #[inline]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// The bail-out reason, once one has been seen.
    #[inline]
    pub fn bailed_out(&self) -> Option<&str> {
        self.bailed_out.as_deref()
    }

    /// Whether `end` has run.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.is_some()
    }

    /// Whether strict mode is currently in effect.
    #[inline]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// All pragma switches seen so far.
    #[inline]
    pub fn pragmas(&self) -> &BTreeMap<String, bool> {
        &self.pragmas
    }

    /// Ingest a chunk of bytes. Complete lines are parsed eagerly; a
    /// trailing partial line waits in the buffer for the next chunk (or for
    /// `end`). Bytes are decoded as UTF-8, lossily, one line at a time.
    pub fn write<S: EventSink>(&mut self, chunk: &[u8], sink: &mut S) {
        if self.done.is_some() {
            return;
        }
        self.line_buffer.extend_from_slice(chunk);
        while let Some(pos) = self.line_buffer.iter().position(|&b| b == b'\n') {
            let rest = self.line_buffer.split_off(pos + 1);
            let raw = std::mem::replace(&mut self.line_buffer, rest);
            let line = String::from_utf8_lossy(&raw).into_owned();
            self.dispatch(line, sink);
        }
    }

    /// Ingest a string chunk.
    #[inline]
    pub fn write_str<S: EventSink>(&mut self, chunk: &str, sink: &mut S) {
        self.write(chunk.as_bytes(), sink);
    }

    /// Finish the stream: drain any unterminated trailing line, resolve the
    /// pending assertion, diagnostic block and subtest, validate the plan,
    /// and emit `Complete` exactly once. Calling `end` again returns the
    /// same summary without re-emitting.
    pub fn end<S: EventSink>(&mut self, sink: &mut S) -> Summary {
        if let Some(summary) = &self.done {
            return summary.clone();
        }

        if !self.line_buffer.is_empty() {
            // the input's last line was unterminated; synthesize the newline
            let mut raw = std::mem::take(&mut self.line_buffer);
            raw.push(b'\n');
            let line = String::from_utf8_lossy(&raw).into_owned();
            self.dispatch(line, sink);
        }

        if self.bailed_out.is_none() {
            self.end_child(sink);
        }
        if self.bailed_out.is_none() {
            self.break_diagnostic(sink);
            self.emit_result(sink);
            self.validate_plan();
        }

        let summary = self.build_summary();
        sink.event(self.level, TapEvent::Complete(summary.clone()));
        self.done = Some(summary.clone());
        summary
    }

    // ==================== line dispatch ====================

    fn dispatch<S: EventSink>(&mut self, mut line: String, sink: &mut S) {
        if self.bailed_out.is_some() || self.done.is_some() {
            return;
        }

        if line.ends_with("\r\n") {
            line.truncate(line.len() - 2);
            line.push('\n');
        }

        sink.event(self.level, TapEvent::Line(line.clone()));

        // lines carrying the child's indent still belong to the child
        let forward = match &self.child {
            Some(child) if line.starts_with(child.indent.as_str()) => Some(child.indent.len()),
            _ => None,
        };
        if let Some(prefix_len) = forward {
            let stripped = line.split_off(prefix_len);
            self.forward_to_child(stripped, sink);
            return;
        }

        if line == "\n" {
            self.on_blank_line(sink);
            return;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            self.on_indented_line(line, sink);
            return;
        }

        // unindented: any open subtest is over, except that a buffered one
        // gets to consume its closing brace first
        if let Some(child) = &self.child {
            if child.buffered && line == "}\n" {
                self.close_buffered_child(sink);
                return;
            }
            self.end_child(sink);
        }

        if line.starts_with('#') {
            self.on_comment(line, sink);
            return;
        }

        if self.post_plan {
            // after a trailing plan only comments are TAP
            self.non_tap(line, sink);
            return;
        }

        match classify(&line) {
            Some(TapLine::Bailout { reason }) => self.on_bailout(reason, sink),
            shape => {
                if self.diag.is_some() {
                    self.break_diagnostic(sink);
                }
                match shape {
                    Some(TapLine::Pragma { enabled, name }) => {
                        self.on_pragma(&name, enabled, sink)
                    }
                    Some(TapLine::Version { version }) => self.on_version(version, line, sink),
                    Some(TapLine::Plan {
                        start,
                        end,
                        comment,
                    }) => self.on_plan(start, end, comment, line, sink),
                    Some(TapLine::TestPoint(point)) => self.on_test_point(point, sink),
                    _ => self.non_tap(line, sink),
                }
            }
        }
    }

    fn on_blank_line<S: EventSink>(&mut self, sink: &mut S) {
        if self.child.is_some() {
            // re-prefix and forward: the child decides what a blank means
            self.forward_to_child("\n".to_string(), sink);
        } else if let Some(diag) = self.diag.as_mut() {
            diag.push_blank();
        }
        // otherwise ignorable
    }

    fn on_indented_line<S: EventSink>(&mut self, line: String, sink: &mut S) {
        if self.diag.is_some() {
            self.diagnostic_line(line, sink);
            return;
        }

        // an indented line that escaped the child's prefix dedents past it
        if self.child.is_some() {
            self.end_child(sink);
        }

        // a pending assertion named `... {` adopts the next indented
        // content as a buffered subtest, whatever it looks like
        if self.pending_opens_brace() {
            let indent = leading_whitespace(&line).to_string();
            self.spawn_child(indent, true, line, sink);
            return;
        }

        let indent = leading_whitespace(&line);
        if self.current.is_some() && line == format!("{indent}---\n") {
            self.diag = Some(DiagnosticBlock::open(indent.to_string()));
            return;
        }

        if !self.post_plan && classify(&line[indent.len()..]).is_some() {
            let indent = indent.to_string();
            self.spawn_child(indent, false, line, sink);
            return;
        }

        self.non_tap(line, sink);
    }

    fn diagnostic_line<S: EventSink>(&mut self, line: String, sink: &mut S) {
        let (closes, extends) = match &self.diag {
            Some(diag) => (diag.closes(&line), diag.extends(&line)),
            None => return,
        };
        if closes {
            self.close_diagnostic(sink);
        } else if extends {
            if let Some(diag) = self.diag.as_mut() {
                diag.push_line(&line);
            }
        } else if let Some(diag) = self.diag.take() {
            // indent shrank mid-block: the whole thing was garbage,
            // breaking line included
            self.non_tap(diag.into_garbage(Some(&line)), sink);
        }
    }

    fn close_diagnostic<S: EventSink>(&mut self, sink: &mut S) {
        let Some(diag) = self.diag.take() else { return };
        if self.current.is_none() {
            self.non_tap(diag.into_garbage(None), sink);
            return;
        }
        match diag.load() {
            Ok(document) => {
                if let Some(current) = self.current.as_mut() {
                    current.diag = Some(document);
                }
                self.emit_result(sink);
            }
            // not yaml after all; the assertion stays pending
            Err(_) => self.non_tap(diag.into_garbage(None), sink),
        }
    }

    fn break_diagnostic<S: EventSink>(&mut self, sink: &mut S) {
        if let Some(diag) = self.diag.take() {
            self.non_tap(diag.into_garbage(None), sink);
        }
    }

    // ==================== subtests ====================

    fn pending_opens_brace(&self) -> bool {
        self.current
            .as_ref()
            .and_then(|current| current.name.as_deref())
            .is_some_and(|name| name.ends_with('{'))
    }

    fn spawn_child<S: EventSink>(
        &mut self,
        indent: String,
        buffered: bool,
        first_line: String,
        sink: &mut S,
    ) {
        let child = Parser::with_options(ParserOptions {
            indent: indent.clone(),
            level: self.level + 1,
            buffered,
            strict: self.strict,
        });
        self.child = Some(Box::new(child));
        sink.event(
            self.level,
            TapEvent::Child(ChildInfo {
                indent: indent.clone(),
                level: self.level + 1,
                buffered,
            }),
        );
        self.forward_to_child(first_line[indent.len()..].to_string(), sink);
    }

    fn forward_to_child<S: EventSink>(&mut self, line: String, sink: &mut S) {
        let bailed = {
            let Some(child) = self.child.as_deref_mut() else {
                return;
            };
            child.dispatch(line, sink);
            child.bailed_out.clone()
        };
        // a child bail-out takes the whole tree down, synchronously
        if let Some(reason) = bailed {
            self.on_bailout(reason, sink);
        }
    }

    fn end_child<S: EventSink>(&mut self, sink: &mut S) {
        if let Some(mut child) = self.child.take() {
            let summary = child.end(sink);
            if !summary.ok && self.saw_valid_tap {
                self.ok = false;
            }
        }
    }

    fn close_buffered_child<S: EventSink>(&mut self, sink: &mut S) {
        self.end_child(sink);
        if let Some(current) = self.current.as_mut() {
            if let Some(name) = current.name.take() {
                let name = name.strip_suffix('{').unwrap_or(&name).trim();
                if !name.is_empty() {
                    current.name = Some(name.to_string());
                }
            }
        }
        self.emit_result(sink);
    }

    // ==================== line handlers ====================

    fn on_comment<S: EventSink>(&mut self, line: String, sink: &mut S) {
        if self.current.is_some() || !self.comment_queue.is_empty() {
            // held back so the pending assertion is emitted first
            self.comment_queue.push(line);
        } else {
            sink.event(self.level, TapEvent::Comment(line));
        }
    }

    fn on_test_point<S: EventSink>(&mut self, point: TestPoint, sink: &mut S) {
        self.emit_result(sink);
        let mut assertion = Assertion::from_test_point(point, self.tally.count as u64 + 1);
        if let Some(plan) = &self.plan {
            assertion.check_plan(plan.start, plan.end);
        }
        self.first = Some(self.first.map_or(assertion.id, |f| f.min(assertion.id)));
        self.last = Some(self.last.map_or(assertion.id, |l| l.max(assertion.id)));
        self.saw_valid_tap = true;
        self.current = Some(assertion);
    }

    fn on_plan<S: EventSink>(
        &mut self,
        start: u64,
        end: u64,
        comment: Option<String>,
        line: String,
        sink: &mut S,
    ) {
        // a second plan, a plan in the middle of a block or subtest, or a
        // window that is not even empty, is not a plan
        if self.plan.is_some()
            || self.child.is_some()
            || self.diag.is_some()
            || end.saturating_add(1) < start
        {
            self.non_tap(line, sink);
            return;
        }
        self.emit_result(sink);
        let plan = Plan {
            start,
            end,
            comment,
        };
        self.post_plan = self.tally.count > 0 || end == 0;
        self.saw_valid_tap = true;
        sink.event(self.level, TapEvent::Plan(plan.clone()));
        self.plan = Some(plan);
    }

    fn on_version<S: EventSink>(&mut self, version: u64, line: String, sink: &mut S) {
        let acceptable = version >= 13
            && self.plan.is_none()
            && self.tally.count == 0
            && self.current.is_none();
        if acceptable {
            self.saw_valid_tap = true;
            sink.event(self.level, TapEvent::Version(version));
        } else {
            self.non_tap(line, sink);
        }
    }

    fn on_pragma<S: EventSink>(&mut self, name: &str, enabled: bool, sink: &mut S) {
        self.emit_result(sink);
        if name == "strict" {
            self.strict = enabled;
        }
        self.pragmas.insert(name.to_string(), enabled);
        self.saw_valid_tap = true;
        sink.event(
            self.level,
            TapEvent::Pragma {
                name: name.to_string(),
                enabled,
            },
        );
    }

    fn on_bailout<S: EventSink>(&mut self, reason: String, sink: &mut S) {
        if self.bailed_out.is_some() {
            return;
        }
        self.emit_result(sink);
        if self.bailed_out.is_some() {
            return;
        }
        self.ok = false;
        self.saw_valid_tap = true;
        self.bailed_out = Some(reason.clone());
        sink.event(self.level, TapEvent::Bailout(reason));
    }

    fn non_tap<S: EventSink>(&mut self, data: String, sink: &mut S) {
        if self.strict {
            self.ok = false;
            self.failures.push(Failure::non_tap(data.clone()));
        }
        sink.event(self.level, TapEvent::Extra(data));
    }

    // ==================== flush and finalization ====================

    /// Close the pending-assertion window: resolve the subtest, drop any
    /// half-open diagnostic (it was already attached or reported), emit the
    /// assertion, then release the comments queued behind it.
    fn emit_result<S: EventSink>(&mut self, sink: &mut S) {
        self.end_child(sink);
        self.diag = None;
        if let Some(assertion) = self.current.take() {
            let hard_failure = self.tally.record(&assertion);
            if hard_failure || assertion.tap_error.is_some() {
                self.ok = false;
                self.failures.push(Failure::Assertion(assertion.clone()));
            }
            sink.event(self.level, TapEvent::Assert(assertion));
        }
        for comment in std::mem::take(&mut self.comment_queue) {
            sink.event(self.level, TapEvent::Comment(comment));
        }
    }

    fn validate_plan(&mut self) {
        match &self.plan {
            Some(plan) if plan.is_skip_all() => {
                if self.tally.count > 0 {
                    self.ok = false;
                    self.failures
                        .push(Failure::protocol(TapError::SkipAllWithTestPoints));
                }
            }
            None => {
                self.ok = false;
                self.failures.push(Failure::protocol(TapError::NoPlan));
            }
            Some(plan) => {
                if self.tally.count != plan.expected_count() {
                    self.ok = false;
                    self.failures
                        .push(Failure::protocol(TapError::IncorrectCount));
                } else if self.ok {
                    if self.first != Some(plan.start) {
                        self.ok = false;
                        self.failures
                            .push(Failure::protocol(TapError::FirstIdMismatch));
                    }
                    if self.last != Some(plan.end) {
                        self.ok = false;
                        self.failures
                            .push(Failure::protocol(TapError::LastIdMismatch));
                    }
                }
            }
        }
    }

    fn build_summary(&self) -> Summary {
        if !self.saw_valid_tap {
            // console-log-only input is an empty passing run
            return Summary::empty_pass();
        }
        Summary {
            ok: self.ok,
            count: self.tally.count,
            pass: self.tally.pass,
            fail: self.tally.fail,
            todo: self.tally.todo,
            skip: self.tally.skip,
            bailout: self.bailed_out.clone(),
            plan: self.plan.as_ref().map(PlanSummary::from),
            failures: self.failures.clone(),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("level", &self.level)
            .field("indent", &self.indent)
            .field("buffered", &self.buffered)
            .field("count", &self.tally.count)
            .field("ok", &self.ok)
            .field("bailed_out", &self.bailed_out)
            .field("done", &self.done.is_some())
            .finish_non_exhaustive()
    }
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}
