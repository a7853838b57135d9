//! CFI comparison and ordering
//!
//! Implements the total order over CFIs used to sort annotations and
//! determine reading order. Range CFIs compare by their collapsed start
//! point. ID assertions never participate in ordering.

use std::cmp::Ordering;

use crate::parser::{parse, ParseError};
use crate::types::Cfi;

/// Compare two CFIs.
///
/// Segments are walked pairwise, then steps pairwise within each segment,
/// comparing `(index, offset)`. The first difference decides. When one
/// path is a strict prefix of the other, the shorter sorts first at a
/// segment boundary (a bare container reference precedes any location
/// reached through further indirection), while within a segment the
/// longer step list sorts after.
pub fn compare(a: &Cfi, b: &Cfi) -> Ordering {
    let a = a.collapse(false);
    let b = b.collapse(false);

    for i in 0..a.segments.len().max(b.segments.len()) {
        let (p, q) = match (a.segments.get(i), b.segments.get(i)) {
            (Some(p), Some(q)) => (p, q),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => break,
        };

        let step_count = p.len().max(q.len());
        for j in 0..step_count {
            let (x, y) = match (p.steps.get(j), q.steps.get(j)) {
                (Some(x), Some(y)) => (x, y),
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => break,
            };

            match x.index.cmp(&y.index) {
                Ordering::Equal => {}
                decided => return decided,
            }

            // offsets only decide on the final step of the segment
            if j + 1 == step_count {
                match x.offset.cmp(&y.offset) {
                    Ordering::Equal => {}
                    decided => return decided,
                }
            }
        }
    }

    Ordering::Equal
}

/// Compare two CFI strings
pub fn compare_str(a: &str, b: &str) -> Result<Ordering, ParseError> {
    Ok(compare(&parse(a)?, &parse(b)?))
}

/// Determine if CFI `a` comes before CFI `b` in reading order
pub fn is_before(a: &Cfi, b: &Cfi) -> bool {
    compare(a, b) == Ordering::Less
}

/// Determine if CFI `a` comes after CFI `b` in reading order
pub fn is_after(a: &Cfi, b: &Cfi) -> bool {
    compare(a, b) == Ordering::Greater
}

/// Check if a CFI falls within `[start, end]`, inclusive
pub fn is_in_range(cfi: &Cfi, start: &Cfi, end: &Cfi) -> bool {
    compare(cfi, start) != Ordering::Less && compare(cfi, end) != Ordering::Greater
}
