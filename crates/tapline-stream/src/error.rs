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

//! Errors for the stream-driving surface.
//!
//! The parser itself never fails: malformed TAP degrades to `extra` events
//! and protocol problems become `tapError` records. The only thing that can
//! actually go wrong is the I/O feeding a [`TapReader`](crate::TapReader).

use thiserror::Error;

/// Errors surfaced while driving a parser from a reader.
#[derive(Error, Debug)]
pub enum StreamError {
    /// IO error from the underlying reader.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
