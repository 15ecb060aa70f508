//! Character offset spans.
//!
//! Gold annotation, system output, and the auxiliary parse all address text by
//! character offsets into the same raw document. Every span in this crate is
//! half-open: `start` inclusive, `end` exclusive.
//!
//! ```text
//! Text:  "Rebels attacked the base"
//!         0     6        15  19  24
//!
//! "Rebels"   -> CharSpan { start: 0,  end: 6 }
//! "the base" -> CharSpan { start: 16, end: 24 }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open character span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharSpan {
    /// Character offset (start, inclusive)
    pub start: usize,
    /// Character offset (end, exclusive)
    pub end: usize,
}

impl CharSpan {
    /// Create a span from half-open offsets.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Character length.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `other` lies entirely within this span.
    #[must_use]
    pub const fn contains(&self, other: &CharSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for CharSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{})", self.start, self.end)
    }
}
