//! UTF-8 byte offset to codepoint index conversion.

/// Converts byte offsets of one text into codepoint indices.
///
/// Keeps a cursor so that converting offsets in roughly ascending order
/// costs time proportional to the distance travelled, not to the offset.
/// Moving backwards is supported too.
#[derive(Debug, Clone)]
pub struct IndexConverter<'a> {
    text: &'a str,
    byte: usize,
    codepoint: usize,
}

impl<'a> IndexConverter<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            codepoint: 0,
        }
    }

    /// Codepoint index of byte offset `offset`.
    ///
    /// Offsets past the end clamp to the text length. An offset inside a
    /// multi-byte character counts that character as already passed.
    pub fn to_codepoint(&mut self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        let bytes = self.text.as_bytes();
        if offset >= self.byte {
            self.codepoint += count_char_starts(&bytes[self.byte..offset]);
        } else {
            self.codepoint -= count_char_starts(&bytes[offset..self.byte]);
        }
        self.byte = offset;
        self.codepoint
    }

    /// Codepoint range of a byte range.
    pub fn to_codepoints(&mut self, start: usize, end: usize) -> (usize, usize) {
        let start = self.to_codepoint(start);
        (start, self.to_codepoint(end))
    }
}

fn count_char_starts(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b & 0xC0 != 0x80).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ascii_is_identity() {
        let mut converter = IndexConverter::new("hello");
        assert_eq!(converter.to_codepoint(3), 3);
        assert_eq!(converter.to_codepoint(5), 5);
    }

    #[test]
    fn test_multibyte_and_astral() {
        // 'é' is 2 bytes, '😀' is 4 bytes.
        let text = "é😀#tag";
        let mut converter = IndexConverter::new(text);
        assert_eq!(converter.to_codepoints(6, text.len()), (2, 6));
        assert_eq!(converter.to_codepoint(2), 1);
        assert_eq!(converter.to_codepoint(0), 0);
        assert_eq!(converter.to_codepoint(6), 2);
    }

    #[test]
    fn test_clamps_past_end() {
        let mut converter = IndexConverter::new("日本");
        assert_eq!(converter.to_codepoint(100), 2);
    }
}
