// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeahead: jump to an item by typing the start of its label.
//!
//! Alphanumeric characters typed within a short window accumulate into a
//! buffer. The search starts just after the current item and wraps, matching
//! labels case-insensitively by prefix (ignoring surrounding whitespace).
//!
//! ```rust
//! use understory_focus::typeahead::Typeahead;
//!
//! let labels = ["Copy", "Cut", "Paste", "Cursor"];
//! let mut ta = Typeahead::new();
//!
//! assert_eq!(ta.type_char('c', 0, &labels, None), Some(0));
//! assert_eq!(ta.type_char('u', 100, &labels, Some(0)), Some(1));
//! assert_eq!(ta.type_char('r', 200, &labels, Some(1)), Some(3));
//!
//! // After a pause the buffer starts over.
//! assert_eq!(ta.type_char('p', 1000, &labels, Some(3)), Some(2));
//! ```

use alloc::string::String;

/// Default inactivity window after which the buffer resets, in milliseconds.
pub const DEFAULT_RESET_MS: u64 = 500;

/// Longest buffer kept; older characters are dropped first.
pub const MAX_BUFFER_CHARS: usize = 32;

/// Typeahead buffer with an inactivity reset.
#[derive(Clone, Debug)]
pub struct Typeahead {
    buffer: String,
    last_input: Option<u64>,
    /// Inactivity window after which the buffer resets, in milliseconds.
    pub reset_ms: u64,
}

impl Default for Typeahead {
    fn default() -> Self {
        Self::new()
    }
}

impl Typeahead {
    /// An empty buffer with the default reset window.
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            last_input: None,
            reset_ms: DEFAULT_RESET_MS,
        }
    }

    /// Current buffer contents (lowercase).
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Whether `c` takes part in typeahead.
    pub fn accepts(c: char) -> bool {
        c.is_alphanumeric()
    }

    /// Clear the buffer.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_input = None;
    }

    /// Append a character typed at `now`, resetting first if the window lapsed.
    ///
    /// Characters that do not take part in typeahead are ignored.
    pub fn push(&mut self, c: char, now: u64) -> &str {
        if !Self::accepts(c) {
            return &self.buffer;
        }
        if self
            .last_input
            .is_some_and(|t| now.saturating_sub(t) >= self.reset_ms)
        {
            self.buffer.clear();
        }
        self.last_input = Some(now);
        self.buffer.extend(c.to_lowercase());
        let excess = self.buffer.chars().count().saturating_sub(MAX_BUFFER_CHARS);
        if excess > 0 {
            let cut = self
                .buffer
                .char_indices()
                .nth(excess)
                .map_or(self.buffer.len(), |(i, _)| i);
            self.buffer.drain(..cut);
        }
        &self.buffer
    }

    /// First label after `current` (wrapping) that starts with the buffer.
    pub fn search<S: AsRef<str>>(&self, labels: &[S], current: Option<usize>) -> Option<usize> {
        if self.buffer.is_empty() || labels.is_empty() {
            return None;
        }
        let n = labels.len();
        let start = current.map_or(0, |c| (c + 1) % n);
        (0..n)
            .map(|off| (start + off) % n)
            .find(|&i| starts_with_folded(labels[i].as_ref(), &self.buffer))
    }

    /// Push `c` and search in one step.
    pub fn type_char<S: AsRef<str>>(
        &mut self,
        c: char,
        now: u64,
        labels: &[S],
        current: Option<usize>,
    ) -> Option<usize> {
        if !Self::accepts(c) {
            return None;
        }
        self.push(c, now);
        self.search(labels, current)
    }
}

fn starts_with_folded(label: &str, lower_prefix: &str) -> bool {
    let mut label = label.trim().chars().flat_map(char::to_lowercase);
    lower_prefix.chars().all(|p| label.next() == Some(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_starts_after_current_and_wraps() {
        let labels = ["apple", "banana", "avocado"];
        let mut ta = Typeahead::new();
        ta.push('a', 0);
        assert_eq!(ta.search(&labels, Some(0)), Some(2));
        assert_eq!(ta.search(&labels, Some(2)), Some(0));
        assert_eq!(ta.search(&labels, None), Some(0));
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let labels = ["  Open File", "Close"];
        let mut ta = Typeahead::new();
        assert_eq!(ta.type_char('O', 0, &labels, Some(1)), Some(0));
    }

    #[test]
    fn no_match_is_none() {
        let labels = ["one", "two"];
        let mut ta = Typeahead::new();
        assert_eq!(ta.type_char('z', 0, &labels, Some(0)), None);
    }

    #[test]
    fn punctuation_is_ignored() {
        let mut ta = Typeahead::new();
        ta.push('-', 0);
        ta.push('#', 0);
        assert_eq!(ta.buffer(), "");
        assert_eq!(ta.type_char(' ', 0, &["x"], None), None);
    }

    #[test]
    fn buffer_keeps_the_most_recent_characters() {
        let mut ta = Typeahead::new();
        for i in 0..40_u64 {
            ta.push(if i < 8 { 'x' } else { 'y' }, i);
        }
        assert_eq!(ta.buffer().chars().count(), MAX_BUFFER_CHARS);
        assert!(ta.buffer().chars().all(|c| c == 'y'));
    }

    #[test]
    fn window_resets_buffer() {
        let mut ta = Typeahead::new();
        ta.push('a', 0);
        ta.push('b', 499);
        assert_eq!(ta.buffer(), "ab");
        ta.push('c', 999);
        assert_eq!(ta.buffer(), "c");
    }
}
