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

//! Test-point directive parsing.
//!
//! The tail of a test-point description may carry a directive after a `#`:
//! `# TODO reason`, `# SKIP reason` or `# time=12ms`. A `#` only starts a
//! directive when it is preceded by an even number of backslashes (including
//! none); escaped hashes stay in the description, backslashes included.

use serde::{Serialize, Serializer};

/// Reason attached to a TODO or SKIP directive.
///
/// A bare `# TODO` carries no explanation and serializes as `true`; a
/// `# TODO why` serializes as the reason string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Bare,
    Text(String),
}

impl Reason {
    /// Build a reason from directive remainder text; whitespace-only text
    /// counts as a bare directive.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Reason::Bare
        } else {
            Reason::Text(text.to_string())
        }
    }

    /// The explanation, if one was given.
    pub fn text(&self) -> Option<&str> {
        match self {
            Reason::Bare => None,
            Reason::Text(text) => Some(text),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reason::Bare => serializer.serialize_bool(true),
            Reason::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// A parsed test-point directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Todo(Reason),
    Skip(Reason),
    /// Duration in milliseconds.
    Time(f64),
}

/// Split a test-point description at the first unescaped `#`.
///
/// Returns the description head and, when a directive marker was found, the
/// raw text after the `#` (not yet trimmed or validated). Escaped `\#`
/// sequences are preserved verbatim in the head.
///
/// # Examples
///
/// ```
/// use tapline_core::lex::split_description;
///
/// assert_eq!(split_description("name # SKIP"), ("name ", Some(" SKIP")));
/// assert_eq!(split_description(r"issue \# 4"), (r"issue \# 4", None));
/// assert_eq!(split_description(r"even \\# directive"), (r"even \\", Some(" directive")));
/// ```
pub fn split_description(rest: &str) -> (&str, Option<&str>) {
    let mut backslashes = 0usize;
    for (i, b) in rest.bytes().enumerate() {
        match b {
            b'\\' => backslashes += 1,
            b'#' => {
                if backslashes % 2 == 0 {
                    return (&rest[..i], Some(&rest[i + 1..]));
                }
                backslashes = 0;
            }
            _ => backslashes = 0,
        }
    }
    (rest, None)
}

/// Parse directive text (the part after an unescaped `#`).
///
/// Returns `None` when the text is not a recognized directive, in which case
/// the caller re-attaches it to the description.
pub fn parse_directive(text: &str) -> Option<Directive> {
    let text = text.trim();

    if let Some(ms) = parse_time(text) {
        return Some(Directive::Time(ms));
    }

    if let Some(rest) = keyword(text, "todo") {
        return Some(Directive::Todo(Reason::from_text(rest)));
    }
    if let Some(rest) = keyword(text, "skip") {
        return Some(Directive::Skip(Reason::from_text(rest)));
    }

    None
}

/// Case-insensitive keyword match with a word boundary: `skipped` is not a
/// SKIP directive.
fn keyword<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    if text.len() < word.len()
        || !text.as_bytes()[..word.len()].eq_ignore_ascii_case(word.as_bytes())
    {
        return None;
    }
    let rest = &text[word.len()..];
    match rest.bytes().next() {
        Some(b) if b.is_ascii_alphanumeric() || b == b'_' => None,
        _ => Some(rest),
    }
}

/// `time=<number><ms|s>`, yielding milliseconds.
///
/// Second values are scaled with fixed-point rounding to the nearest
/// microsecond so the conversion is deterministic across platforms.
fn parse_time(text: &str) -> Option<f64> {
    let rest = text.strip_prefix("time=")?;
    let (digits, seconds) = match rest.strip_suffix("ms") {
        Some(digits) => (digits, false),
        None => (rest.strip_suffix('s')?, true),
    };

    let mut dots = 0usize;
    let mut saw_digit = false;
    for b in digits.bytes() {
        match b {
            b'0'..=b'9' => saw_digit = true,
            b'.' => dots += 1,
            _ => return None,
        }
    }
    if !saw_digit || dots > 1 {
        return None;
    }

    let value: f64 = digits.parse().ok()?;
    if seconds {
        let micros = (value * 1_000_000.0).round() as i64;
        Some(micros as f64 / 1_000.0)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== escape splitting tests ====================

    #[test]
    fn test_split_plain() {
        assert_eq!(split_description("no directive"), ("no directive", None));
        assert_eq!(split_description("a # b"), ("a ", Some(" b")));
    }

    #[test]
    fn test_split_escaped_hash_stays() {
        assert_eq!(split_description(r"a \# b"), (r"a \# b", None));
    }

    #[test]
    fn test_split_double_backslash_escapes_the_escape() {
        assert_eq!(split_description(r"a \\# b"), (r"a \\", Some(" b")));
        assert_eq!(split_description(r"a \\\# b"), (r"a \\\# b", None));
        assert_eq!(split_description(r"a \\\\# b"), (r"a \\\\", Some(" b")));
    }

    #[test]
    fn test_split_takes_first_unescaped() {
        assert_eq!(split_description("a # b # c"), ("a ", Some(" b # c")));
        assert_eq!(split_description(r"a \# b # c"), (r"a \# b ", Some(" c")));
    }

    #[test]
    fn test_split_backslash_run_reset_by_other_chars() {
        // the backslash is not adjacent to the hash, so it does not escape
        assert_eq!(split_description(r"a \x# b"), (r"a \x", Some(" b")));
    }

    // ==================== directive keyword tests ====================

    #[test]
    fn test_todo_and_skip() {
        assert_eq!(
            parse_directive(" TODO later"),
            Some(Directive::Todo(Reason::Text("later".to_string())))
        );
        assert_eq!(
            parse_directive("skip"),
            Some(Directive::Skip(Reason::Bare))
        );
        assert_eq!(
            parse_directive("SKIP: windows only"),
            Some(Directive::Skip(Reason::Text(": windows only".to_string())))
        );
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        assert_eq!(parse_directive("skipped"), None);
        assert_eq!(parse_directive("todos"), None);
        assert_eq!(parse_directive("todo_1"), None);
    }

    #[test]
    fn test_unknown_directive() {
        assert_eq!(parse_directive("whatever"), None);
        assert_eq!(parse_directive(""), None);
    }

    // ==================== time tests ====================

    #[test]
    fn test_time_milliseconds() {
        assert_eq!(parse_directive("time=33ms"), Some(Directive::Time(33.0)));
        assert_eq!(
            parse_directive("time=0.25ms"),
            Some(Directive::Time(0.25))
        );
    }

    #[test]
    fn test_time_seconds_fixed_point() {
        assert_eq!(parse_directive("time=1s"), Some(Directive::Time(1000.0)));
        assert_eq!(parse_directive("time=0.4s"), Some(Directive::Time(400.0)));
        // 0.0000015s rounds at the microsecond: 1.5us -> 2us -> 0.002ms
        assert_eq!(
            parse_directive("time=0.0000015s"),
            Some(Directive::Time(0.002))
        );
    }

    #[test]
    fn test_time_rejects_malformed() {
        assert_eq!(parse_directive("time=ms"), None);
        assert_eq!(parse_directive("time=1.2.3s"), None);
        assert_eq!(parse_directive("time=1"), None);
        assert_eq!(parse_directive("time=1e3ms"), None);
        assert_eq!(parse_directive("time=-1ms"), None);
    }

    // ==================== reason tests ====================

    #[test]
    fn test_reason_from_text() {
        assert_eq!(Reason::from_text("   "), Reason::Bare);
        assert_eq!(Reason::from_text(" why "), Reason::Text("why".to_string()));
        assert_eq!(Reason::Bare.text(), None);
        assert_eq!(Reason::Text("x".into()).text(), Some("x"));
    }

    #[test]
    fn test_reason_serialization() {
        assert_eq!(serde_json::to_string(&Reason::Bare).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&Reason::Text("ci".into())).unwrap(),
            "\"ci\""
        );
    }
}
