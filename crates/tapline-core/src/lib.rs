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

//! Line grammar and data model for the Test Anything Protocol.
//!
//! This crate provides the building blocks shared by TAP consumers:
//!
//! - The [`lex`] module classifies completed lines into the closed set of
//!   TAP shapes (test points, plans, pragmas, bail-outs, version
//!   announcements) and parses test-point directives (`# TODO`, `# SKIP`,
//!   `# time=...`).
//! - [`Assertion`] is the record built from a test-point line.
//! - [`Plan`], [`PlanSummary`], [`Summary`] and [`Failure`] describe the
//!   declared plan and the final outcome of a TAP stream.
//! - [`TapError`] carries the fixed set of protocol-error strings that a
//!   parser attaches to assertions or synthesizes at end of stream.
//!
//! The streaming state machine that drives these types lives in
//! `tapline-stream`.
//!
//! # Examples
//!
//! ```
//! use tapline_core::{classify, TapLine};
//!
//! let line = classify("ok 1 - it works # TODO flaky on CI\n").unwrap();
//! let TapLine::TestPoint(point) = line else { panic!("expected test point") };
//! assert!(point.ok);
//! assert_eq!(point.id, Some(1));
//! ```

mod assertion;
mod error;
pub mod lex;
mod plan;
mod summary;

pub use assertion::Assertion;
pub use error::TapError;
pub use lex::{classify, Directive, Reason, TapLine, TestPoint};
pub use plan::{Plan, PlanSummary};
pub use summary::{Failure, Summary, Tally};
