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

//! Pull-based adapter over the push parser.
//!
//! [`TapReader`] drives a [`Parser`] from any [`Read`] source and hands the
//! resulting events out through the standard iterator interface, which
//! composes with `filter_map`, `collect` and friends. Each item is the
//! nesting level of the emitting parser paired with the event.
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//! use tapline_stream::{TapEvent, TapReader};
//!
//! let input = "TAP version 13\n1..1\nok 1 - hello\n";
//! let mut reader = TapReader::new(Cursor::new(input));
//!
//! let asserts = reader
//!     .by_ref()
//!     .filter_map(|event| event.ok())
//!     .filter(|(_, event)| event.is_assert())
//!     .count();
//! assert_eq!(asserts, 1);
//! assert!(reader.summary().unwrap().ok);
//! ```

use crate::error::{StreamError, StreamResult};
use crate::event::{EventSink, TapEvent};
use crate::parser::Parser;
use std::collections::VecDeque;
use std::io::Read;
use tapline_core::Summary;

/// Sink that spools events into the reader's queue.
struct QueueSink<'a> {
    queue: &'a mut VecDeque<(usize, TapEvent)>,
}

impl EventSink for QueueSink<'_> {
    #[inline]
    fn event(&mut self, level: usize, event: TapEvent) {
        self.queue.push_back((level, event));
    }
}

/// Configuration for [`TapReader`].
#[derive(Debug, Clone)]
pub struct TapReaderConfig {
    /// Chunk size for reads from the underlying source.
    ///
    /// Default: 64KB.
    pub buffer_size: usize,
}

impl Default for TapReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
        }
    }
}

/// Iterator over the events of a TAP stream read from any `Read` source.
///
/// The underlying parser never fails, so the only `Err` items are I/O
/// errors from the source. After the iterator is exhausted the final
/// [`Summary`] is available from [`summary`](TapReader::summary).
pub struct TapReader<R: Read> {
    reader: R,
    parser: Parser,
    buf: Vec<u8>,
    queue: VecDeque<(usize, TapEvent)>,
    summary: Option<Summary>,
    finished: bool,
}

impl<R: Read> TapReader<R> {
    /// Create a reader with default configuration.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, TapReaderConfig::default())
    }

    /// Create a reader with a custom chunk size.
    pub fn with_config(reader: R, config: TapReaderConfig) -> Self {
        TapReader {
            reader,
            parser: Parser::new(),
            buf: vec![0u8; config.buffer_size.max(1)],
            queue: VecDeque::new(),
            summary: None,
            finished: false,
        }
    }

    /// The final summary, once the source has been drained.
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// Read one chunk from the source into the parser.
    fn pump(&mut self) -> StreamResult<()> {
        let n = self.reader.read(&mut self.buf).map_err(StreamError::Io)?;
        let mut sink = QueueSink {
            queue: &mut self.queue,
        };
        if n == 0 {
            let summary = self.parser.end(&mut sink);
            self.summary = Some(summary);
            self.finished = true;
        } else {
            self.parser.write(&self.buf[..n], &mut sink);
        }
        Ok(())
    }
}

impl<R: Read> Iterator for TapReader<R> {
    type Item = StreamResult<(usize, TapEvent)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.queue.pop_front() {
                return Some(Ok(item));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.pump() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_yields_events_in_order() {
        let input = "1..1\nok 1 - hello\n";
        let reader = TapReader::new(Cursor::new(input));
        let events: Vec<_> = reader.filter_map(|e| e.ok()).collect();

        let kinds: Vec<&str> = events
            .iter()
            .map(|(_, e)| match e {
                TapEvent::Line(_) => "line",
                TapEvent::Plan(_) => "plan",
                TapEvent::Assert(_) => "assert",
                TapEvent::Complete(_) => "complete",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["line", "plan", "line", "assert", "complete"]);
    }

    #[test]
    fn test_reader_summary_after_drain() {
        let mut reader = TapReader::new(Cursor::new("1..1\nok 1\n"));
        assert!(reader.summary().is_none());
        for _ in reader.by_ref() {}
        assert!(reader.summary().unwrap().ok);
    }

    #[test]
    fn test_reader_empty_source() {
        let mut reader = TapReader::new(Cursor::new(""));
        let events: Vec<_> = reader.by_ref().filter_map(|e| e.ok()).collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].1, TapEvent::Complete(_)));
        assert!(reader.summary().unwrap().ok);
    }

    #[test]
    fn test_reader_tiny_buffer() {
        let input = "1..2\nok 1\nok 2\n";
        let reader = TapReader::with_config(
            Cursor::new(input),
            TapReaderConfig { buffer_size: 1 },
        );
        let asserts = reader
            .filter_map(|e| e.ok())
            .filter(|(_, e)| e.is_assert())
            .count();
        assert_eq!(asserts, 2);
    }

    #[test]
    fn test_reader_levels_for_subtests() {
        let input = "1..1\n    1..1\n    ok 1 - inner\nok 1 - outer\n";
        let reader = TapReader::new(Cursor::new(input));
        let assert_levels: Vec<usize> = reader
            .filter_map(|e| e.ok())
            .filter(|(_, e)| e.is_assert())
            .map(|(level, _)| level)
            .collect();
        assert_eq!(assert_levels, vec![1, 0]);
    }
}
