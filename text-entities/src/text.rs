//! Byte-offset helpers shared by the scanners.
//!
//! Offsets that do not fall on a character boundary read as "no character"
//! instead of panicking.

/// The character starting at byte offset `pos`.
pub(crate) fn char_at(text: &str, pos: usize) -> Option<char> {
    text.get(pos..)?.chars().next()
}

/// The character ending at byte offset `pos`.
pub(crate) fn char_before(text: &str, pos: usize) -> Option<char> {
    text.get(..pos)?.chars().next_back()
}

/// Whether `text[pos..]` starts with the ASCII literal `lit`, ignoring case.
pub(crate) fn starts_with_ignore_case(text: &str, pos: usize, lit: &str) -> bool {
    text.as_bytes()
        .get(pos..pos + lit.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(lit.as_bytes()))
}

/// Whether `text[..pos]` ends with the ASCII literal `lit`, ignoring case.
pub(crate) fn ends_with_ignore_case(text: &str, pos: usize, lit: &str) -> bool {
    pos.checked_sub(lit.len())
        .and_then(|start| text.as_bytes().get(start..pos))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(lit.as_bytes()))
}

/// Offset just past the longest run of characters accepted by `accept`,
/// starting at `pos` and taking at most `limit` characters.
pub(crate) fn run_end(text: &str, pos: usize, limit: usize, accept: impl Fn(char) -> bool) -> usize {
    let Some(rest) = text.get(pos..) else {
        return pos;
    };
    let mut end = pos;
    for c in rest.chars().take(limit) {
        if !accept(c) {
            break;
        }
        end += c.len_utf8();
    }
    end
}
