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

//! The in-progress diagnostic block attached to a pending assertion.
//!
//! A block opens on an indented `---` line, accumulates every line sharing
//! that indent (with the indent kept, so a broken block can be replayed
//! verbatim as non-TAP), and closes on the matching `...`. The body is then
//! handed to the YAML loader; YAML is a black box here and a load failure
//! just downgrades the block to garbage.

/// Accumulator for one indented YAML-ish block.
#[derive(Debug, Clone)]
pub(crate) struct DiagnosticBlock {
    indent: String,
    text: String,
}

impl DiagnosticBlock {
    pub fn open(indent: String) -> Self {
        DiagnosticBlock {
            indent,
            text: String::new(),
        }
    }

    /// Whether `line` is this block's closing `...` fence.
    pub fn closes(&self, line: &str) -> bool {
        line.len() == self.indent.len() + 4
            && line.starts_with(&self.indent)
            && line.ends_with("...\n")
    }

    /// Whether `line` continues the block (shares the block indent).
    pub fn extends(&self, line: &str) -> bool {
        line.starts_with(&self.indent)
    }

    /// Append one continuation line, indent and newline included.
    pub fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
    }

    /// A bare `\n` inside the block is re-prefixed with the block indent,
    /// which keeps the block alive.
    pub fn push_blank(&mut self) {
        self.text.push_str(&self.indent);
        self.text.push('\n');
    }

    /// Reassemble the block as the non-TAP text it turned out to be,
    /// optionally swallowing the line that broke it.
    pub fn into_garbage(self, breaking_line: Option<&str>) -> String {
        let mut out = self.indent;
        out.push_str("---\n");
        out.push_str(&self.text);
        if let Some(line) = breaking_line {
            out.push_str(line);
        }
        out
    }

    /// Hand the accumulated body to the YAML loader. An empty body is a
    /// null document rather than a load error.
    pub fn load(&self) -> Result<serde_yaml::Value, serde_yaml::Error> {
        if self.text.trim().is_empty() {
            return Ok(serde_yaml::Value::Null);
        }
        serde_yaml::from_str(&self.text)
    }
}
