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

//! The TAP line classifier.
//!
//! [`classify`] matches one completed line (terminating `\n` included,
//! `\r\n` already normalized) against the closed set of TAP line shapes and
//! extracts their fields. Shapes are tried in a fixed priority order and a
//! line matches at most one of them.
//!
//! Everything here is an explicit scanner over the line; there is no regex
//! machinery, which keeps the escape and backtracking rules auditable.

/// A classified TAP line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapLine {
    /// `ok` / `not ok` with optional id and trailing description.
    TestPoint(TestPoint),
    /// `pragma +name` / `pragma -name`.
    Pragma { enabled: bool, name: String },
    /// `Bail out! <reason>` (case-insensitive).
    Bailout { reason: String },
    /// `TAP version <n>` (case-insensitive).
    Version { version: u64 },
    /// `<start>..<end>` with an optional `# comment` tail.
    Plan {
        start: u64,
        end: u64,
        comment: Option<String>,
    },
}

/// The raw fields of a test-point line, before directive parsing.
///
/// `rest` is the text after the optional ` -` separator with the single
/// separating space removed; directive splitting happens later, against the
/// ambient parser state, in [`crate::Assertion::from_test_point`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPoint {
    pub ok: bool,
    pub id: Option<u64>,
    pub rest: Option<String>,
}

/// Classify a completed line against the TAP line shapes.
///
/// Returns `None` for anything else: comments, diagnostic framing and
/// garbage all look the same to the classifier and are told apart by the
/// caller's state.
///
/// # Examples
///
/// ```
/// use tapline_core::lex::{classify, TapLine};
///
/// assert!(matches!(
///     classify("not ok 2 - boom\n"),
///     Some(TapLine::TestPoint(_))
/// ));
/// assert!(matches!(
///     classify("1..5 # skip everything\n"),
///     Some(TapLine::Plan { start: 1, end: 5, .. })
/// ));
/// assert_eq!(classify("# just a comment\n"), None);
/// ```
pub fn classify(line: &str) -> Option<TapLine> {
    let body = line.strip_suffix('\n')?;
    test_point(body)
        .or_else(|| pragma(body))
        .or_else(|| bailout(body))
        .or_else(|| version(body))
        .or_else(|| plan(body))
}

/// `^(not )?ok( <id>)?(( -)? <rest>)?$`
fn test_point(body: &str) -> Option<TapLine> {
    let (ok, after) = match body.strip_prefix("not ok") {
        Some(rest) => (false, rest),
        None => (true, body.strip_prefix("ok")?),
    };

    if after.is_empty() {
        return Some(TapLine::TestPoint(TestPoint {
            ok,
            id: None,
            rest: None,
        }));
    }
    if !after.starts_with(' ') {
        return None;
    }

    // An id is only an id when the digits run out at end of line or at a
    // space; `ok 1x` keeps "1x" in the description.
    let (id, tail) = match point_id(after) {
        Some((id, tail)) => (Some(id), tail),
        None => (None, after),
    };

    let rest = if tail.is_empty() {
        None
    } else if let Some(dashed) = tail.strip_prefix(" -").filter(|t| t.starts_with(' ')) {
        Some(dashed[1..].to_string())
    } else {
        Some(tail[1..].to_string())
    };

    Some(TapLine::TestPoint(TestPoint { ok, id, rest }))
}

fn point_id(s: &str) -> Option<(u64, &str)> {
    let digits = s.strip_prefix(' ')?;
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let tail = &digits[end..];
    if !tail.is_empty() && !tail.starts_with(' ') {
        return None;
    }
    let id = digits[..end].parse().ok()?;
    Some((id, tail))
}

/// `^pragma ([+-])([a-z]+)$`
fn pragma(body: &str) -> Option<TapLine> {
    let rest = body.strip_prefix("pragma ")?;
    let enabled = match rest.bytes().next()? {
        b'+' => true,
        b'-' => false,
        _ => return None,
    };
    let name = &rest[1..];
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    Some(TapLine::Pragma {
        enabled,
        name: name.to_string(),
    })
}

/// Case-insensitive ASCII prefix match; byte-wise so that multi-byte
/// input can never land a slice mid-character.
fn strip_prefix_ignore_case<'a>(body: &'a str, head: &str) -> Option<&'a str> {
    if body.len() < head.len() {
        return None;
    }
    if !body.as_bytes()[..head.len()].eq_ignore_ascii_case(head.as_bytes()) {
        return None;
    }
    Some(&body[head.len()..])
}

/// `^bail out!(.*)$`, case-insensitive.
fn bailout(body: &str) -> Option<TapLine> {
    let reason = strip_prefix_ignore_case(body, "bail out!")?;
    Some(TapLine::Bailout {
        reason: reason.trim().to_string(),
    })
}

/// `^TAP version ([0-9]+)$`, case-insensitive.
fn version(body: &str) -> Option<TapLine> {
    let digits = strip_prefix_ignore_case(body, "tap version ")?;
    if digits.is_empty() {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(TapLine::Version {
        version: digits.parse().ok()?,
    })
}

/// `^([0-9]+)\.\.([0-9]+)(\s+#\s*(.*))?$`
fn plan(body: &str) -> Option<TapLine> {
    let dots = body.find("..")?;
    let start_digits = &body[..dots];
    if start_digits.is_empty() || !start_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let rest = &body[dots + 2..];
    let end_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end_len == 0 {
        return None;
    }

    let tail = &rest[end_len..];
    let comment = if tail.is_empty() {
        None
    } else {
        let after_ws = tail.trim_start();
        if after_ws.len() == tail.len() {
            // something other than whitespace right after the end number
            return None;
        }
        let text = after_ws.strip_prefix('#')?.trim_start();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    };

    Some(TapLine::Plan {
        start: start_digits.parse().ok()?,
        end: rest[..end_len].parse().ok()?,
        comment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(line: &str) -> TestPoint {
        match classify(line) {
            Some(TapLine::TestPoint(p)) => p,
            other => panic!("expected test point for {:?}, got {:?}", line, other),
        }
    }

    // ==================== test point tests ====================

    #[test]
    fn test_point_bare() {
        assert_eq!(
            point("ok\n"),
            TestPoint {
                ok: true,
                id: None,
                rest: None
            }
        );
        assert_eq!(
            point("not ok\n"),
            TestPoint {
                ok: false,
                id: None,
                rest: None
            }
        );
    }

    #[test]
    fn test_point_with_id() {
        assert_eq!(point("ok 42\n").id, Some(42));
        assert_eq!(point("not ok 7\n").id, Some(7));
    }

    #[test]
    fn test_point_with_description() {
        let p = point("ok 1 - hello world\n");
        assert_eq!(p.id, Some(1));
        assert_eq!(p.rest.as_deref(), Some("hello world"));
    }

    #[test]
    fn test_point_without_dash_separator() {
        let p = point("ok 1 hello\n");
        assert_eq!(p.rest.as_deref(), Some("hello"));
    }

    #[test]
    fn test_point_description_without_id() {
        let p = point("ok - anonymous\n");
        assert_eq!(p.id, None);
        assert_eq!(p.rest.as_deref(), Some("anonymous"));
    }

    #[test]
    fn test_point_id_glued_to_text_is_description() {
        // digits not followed by space or EOL belong to the description
        let p = point("ok 1x\n");
        assert_eq!(p.id, None);
        assert_eq!(p.rest.as_deref(), Some("1x"));
    }

    #[test]
    fn test_point_lone_dash() {
        // " -" with nothing after keeps the dash as description text
        let p = point("ok 1 -\n");
        assert_eq!(p.rest.as_deref(), Some("-"));
    }

    #[test]
    fn test_point_dash_glued_to_text() {
        let p = point("ok 1 -x\n");
        assert_eq!(p.rest.as_deref(), Some("-x"));
    }

    #[test]
    fn test_point_rejects_near_misses() {
        assert_eq!(classify("okay\n"), None);
        assert_eq!(classify("not okay\n"), None);
        assert_eq!(classify("ok\tfoo\n"), None);
        assert_eq!(classify("ok"), None); // unterminated
    }

    // ==================== pragma tests ====================

    #[test]
    fn test_pragma() {
        assert_eq!(
            classify("pragma +strict\n"),
            Some(TapLine::Pragma {
                enabled: true,
                name: "strict".to_string()
            })
        );
        assert_eq!(
            classify("pragma -strict\n"),
            Some(TapLine::Pragma {
                enabled: false,
                name: "strict".to_string()
            })
        );
    }

    #[test]
    fn test_pragma_rejects_bad_names() {
        assert_eq!(classify("pragma +Strict\n"), None);
        assert_eq!(classify("pragma +\n"), None);
        assert_eq!(classify("pragma strict\n"), None);
        assert_eq!(classify("pragma +st rict\n"), None);
    }

    // ==================== bail out tests ====================

    #[test]
    fn test_bailout() {
        assert_eq!(
            classify("Bail out! kaboom\n"),
            Some(TapLine::Bailout {
                reason: "kaboom".to_string()
            })
        );
        assert_eq!(
            classify("bail out!\n"),
            Some(TapLine::Bailout {
                reason: String::new()
            })
        );
        assert_eq!(
            classify("BAIL OUT! stop\n"),
            Some(TapLine::Bailout {
                reason: "stop".to_string()
            })
        );
    }

    #[test]
    fn test_bailout_requires_bang() {
        assert_eq!(classify("bail out\n"), None);
    }

    // ==================== version tests ====================

    #[test]
    fn test_version() {
        assert_eq!(
            classify("TAP version 13\n"),
            Some(TapLine::Version { version: 13 })
        );
        assert_eq!(
            classify("tap VERSION 14\n"),
            Some(TapLine::Version { version: 14 })
        );
    }

    #[test]
    fn test_version_rejects_non_numeric() {
        assert_eq!(classify("TAP version thirteen\n"), None);
        assert_eq!(classify("TAP version 13 \n"), None);
        assert_eq!(classify("TAP version \n"), None);
    }

    // ==================== plan tests ====================

    #[test]
    fn test_plan() {
        assert_eq!(
            classify("1..5\n"),
            Some(TapLine::Plan {
                start: 1,
                end: 5,
                comment: None
            })
        );
        assert_eq!(
            classify("1..0 # nothing to do\n"),
            Some(TapLine::Plan {
                start: 1,
                end: 0,
                comment: Some("nothing to do".to_string())
            })
        );
    }

    #[test]
    fn test_plan_comment_requires_whitespace_and_hash() {
        assert_eq!(classify("1..2  \n"), None);
        assert_eq!(classify("1..2# no space\n"), None);
        assert_eq!(classify("1..2 trailing\n"), None);
    }

    #[test]
    fn test_plan_empty_comment_is_none() {
        assert_eq!(
            classify("1..0 #\n"),
            Some(TapLine::Plan {
                start: 1,
                end: 0,
                comment: None
            })
        );
    }

    #[test]
    fn test_plan_rejects_malformed_ranges() {
        assert_eq!(classify("1..\n"), None);
        assert_eq!(classify("..5\n"), None);
        assert_eq!(classify("a..5\n"), None);
        assert_eq!(classify("1.5\n"), None);
    }

    // ==================== priority tests ====================

    #[test]
    fn test_comments_and_garbage_do_not_classify() {
        assert_eq!(classify("# comment\n"), None);
        assert_eq!(classify("random console output\n"), None);
        assert_eq!(classify("\n"), None);
    }
}
