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

//! Lexical analysis for TAP lines.
//!
//! - [`line`] - the line classifier: one completed line in, at most one
//!   [`TapLine`] shape out
//! - [`directive`] - trailing `# TODO` / `# SKIP` / `time=` directive
//!   parsing, including the backslash-escape rule for `#`
//!
//! The classifier is pure: it never looks at parser state, so the caller
//! decides what a non-matching line means (comment, diagnostic continuation,
//! or garbage).

pub mod directive;
pub mod line;

pub use directive::{parse_directive, split_description, Directive, Reason};
pub use line::{classify, TapLine, TestPoint};
