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

//! Streaming parser for the Test Anything Protocol.
//!
//! This crate turns a TAP byte stream of arbitrary chunking into a stream
//! of structured events: test-point assertions, plans, comments, version
//! announcements, pragmas, bail-outs, diagnostic payloads attached to their
//! assertions, recursive subtests and a final summary. Anything that is not
//! TAP passes through verbatim as `extra`.
//!
//! # Push or pull
//!
//! The core surface is push-based: feed [`Parser`] with `write`/`end` and
//! receive events through an [`EventSink`]. When the input is an
//! `io::Read`, [`TapReader`] drives the parser for you and exposes the
//! events as an iterator.
//!
//! ```
//! use tapline_stream::parse;
//!
//! let (summary, log) = parse("TAP version 13\n1..1\nok 1 - hello\n");
//! assert!(summary.ok);
//! assert_eq!(summary.count, 1);
//!
//! let assertion = log.asserts_at(0).next().unwrap();
//! assert_eq!(assertion.name.as_deref(), Some("hello"));
//! ```
//!
//! # Subtests
//!
//! Indented TAP opens a streamed subtest; `ok 1 - name {` followed by
//! indented content opens a buffered one, closed by `}`. Each subtest is a
//! complete recursive parser whose events arrive on the same sink, tagged
//! with its nesting level:
//!
//! ```
//! use tapline_stream::parse;
//!
//! let (summary, log) = parse("1..1\n    1..1\n    ok 1 - inner\nok 1 - outer\n");
//! assert!(summary.ok);
//! assert_eq!(log.asserts_at(1).count(), 1); // inner
//! assert_eq!(log.asserts_at(0).count(), 1); // outer
//! ```
//!
//! # Failure reporting
//!
//! The parser never raises: protocol problems (missing plan, id out of
//! window, count mismatch) become `tapError` entries in the summary's
//! `failures`, and a bail-out short-circuits the rest of the input.

mod diagnostic;
mod error;
mod event;
mod parser;
mod reader;

pub use error::{StreamError, StreamResult};
pub use event::{ChildInfo, EventLog, EventSink, TapEvent};
pub use parser::{Parser, ParserOptions};
pub use reader::{TapReader, TapReaderConfig};

/// Re-export the data model for convenience.
pub use tapline_core::{
    Assertion, Failure, Plan, PlanSummary, Reason, Summary, TapError,
};

/// Parse a complete in-memory TAP document in one call.
///
/// Returns the final [`Summary`] along with every event, in order, as
/// collected by an [`EventLog`].
pub fn parse(input: impl AsRef<[u8]>) -> (Summary, EventLog) {
    let mut parser = Parser::new();
    let mut log = EventLog::new();
    parser.write(input.as_ref(), &mut log);
    let summary = parser.end(&mut log);
    (summary, log)
}
