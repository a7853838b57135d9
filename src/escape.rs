//! CFI string escaping
//!
//! Characters that are meaningful in the CFI grammar must be escaped with
//! `^` when they appear inside an ID assertion or text assertion. These two
//! functions are exact inverses for any input string.

/// Characters the serializer escapes inside assertion brackets.
const RESERVED: &[char] = &['^', '[', ']', '(', ')', ',', ';', '='];

/// Escape reserved characters with a `^` prefix.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if RESERVED.contains(&ch) {
            out.push('^');
        }
        out.push(ch);
    }
    out
}

/// Remove `^` escapes, keeping the escaped character verbatim.
///
/// A trailing lone `^` escapes nothing and is dropped.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '^' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}
