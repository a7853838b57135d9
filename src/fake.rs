//! Synthetic CFI codec
//!
//! Books without native structural addressing (image-page or
//! rendered-page books) still need spine-level CFIs for bookmarks and
//! progress tracking. These helpers encode a plain integer index as a
//! minimal CFI segment and back, and splice a base segment onto a
//! content CFI with the indirection separator so callers can treat both
//! kinds of base uniformly.

use crate::parser::{parse, ParseError};
use crate::types::{Cfi, Segment, Step};

/// Encode a 0-based index as a minimal spine-shaped CFI, e.g.
/// `fake::from_index(1)` is `epubcfi(/6/4)`.
pub fn from_index(index: usize) -> String {
    let steps = vec![Step::new(6), Step::new(((index + 1) * 2) as u32)];
    Cfi::new(vec![Segment::with_steps(steps)]).to_string()
}

/// Recover the index encoded by [`from_index`]. `None` for segments that
/// do not carry a spine step.
pub fn to_index(segment: &Segment) -> Option<usize> {
    let step = segment.last()?;
    (step.index as usize / 2).checked_sub(1)
}

/// Join a base CFI (real or synthetic) and a content CFI with the
/// indirection separator, yielding one fully qualified CFI. The content
/// part may itself be a range CFI.
pub fn join_indir(base: &str, content: &str) -> Result<String, ParseError> {
    let base = parse(base)?.collapse(false);
    let content = parse(content)?;
    let mut segments = base.segments;
    segments.extend(content.segments);
    Ok(Cfi {
        segments,
        range: content.range,
    }
    .to_string())
}
