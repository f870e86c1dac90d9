//! Unicode character classes used by the scanners.
//!
//! Each class is written as a regex bracket expression and compiled once.
//! ASCII membership is precomputed into a table. Other characters are
//! answered by the compiled class one 256-codepoint page at a time, and the
//! page is kept for later lookups.

use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;

use regex::Regex;

use crate::error::{EntityError, Result};

/// Horizontal and vertical whitespace, including the Unicode space
/// separators and the line/paragraph separators.
pub(crate) const SPACES: &str = r"\x{0009}-\x{000D}\x{0020}\x{0085}\x{00A0}\x{1680}\x{180E}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}";

/// Latin letters with diacritics. Leaves out U+00D7 and U+00F7.
pub(crate) const LATIN_ACCENTS: &str = r"\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{00FF}\x{0100}-\x{024F}\x{0253}-\x{0254}\x{0256}-\x{0257}\x{0259}\x{025B}\x{0263}\x{0268}\x{026F}\x{0272}\x{0289}\x{028B}\x{02BB}\x{0300}-\x{036F}\x{1E00}-\x{1EFF}";

/// Byte order marks, noncharacters and directional overrides.
pub(crate) const INVALID_CHARS: &str = r"\x{202A}-\x{202E}\x{FEFF}\x{FFFE}\x{FFFF}";

const HASHTAG_LETTERS: &str = r"\p{L}\p{M}";
const HASHTAG_NUMERALS: &str = r"\p{Nd}";
const HASHTAG_SPECIALS: &str = r"_\x{200C}\x{200D}\x{A67E}\x{05BE}\x{05F3}\x{05F4}\x{FF5E}\x{301C}\x{309B}\x{309C}\x{30A0}\x{30FB}\x{3003}\x{0F0B}\x{0F0C}\x{00B7}";

const PAGE_BITS: u32 = 8;

type Page = [u64; 4];

/// Membership test for a single character.
#[derive(Debug)]
pub(crate) struct CharClass {
    ascii: [bool; 128],
    matcher: Regex,
    pages: RwLock<HashMap<u32, Page>>,
}

impl CharClass {
    /// Compile `class`, a bracket expression such as `[a-z]`.
    pub(crate) fn new(name: &'static str, class: &str) -> Result<Self> {
        let matcher = Regex::new(&format!(r"\A(?:{class})\z"))
            .map_err(|source| EntityError::Pattern { name, source })?;

        let mut ascii = [false; 128];
        let mut buf = [0u8; 4];
        for (byte, slot) in (0u8..128).zip(ascii.iter_mut()) {
            *slot = matcher.is_match(char::from(byte).encode_utf8(&mut buf));
        }

        Ok(Self {
            ascii,
            matcher,
            pages: RwLock::new(HashMap::new()),
        })
    }

    pub(crate) fn contains(&self, c: char) -> bool {
        if c.is_ascii() {
            return self.ascii[c as usize];
        }
        let code = u32::from(c);
        let page = code >> PAGE_BITS;
        let bit = (code & ((1 << PAGE_BITS) - 1)) as usize;
        let is_set = |bits: &Page| bits[bit / 64] & (1 << (bit % 64)) != 0;

        let cached = self
            .pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&page)
            .map(is_set);
        if let Some(hit) = cached {
            return hit;
        }

        let bits = self.fill_page(page);
        let hit = is_set(&bits);
        self.pages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(page, bits);
        hit
    }

    fn fill_page(&self, page: u32) -> Page {
        let mut bits = Page::default();
        let mut buf = [0u8; 4];
        for offset in 0..(1u32 << PAGE_BITS) {
            let Some(c) = char::from_u32((page << PAGE_BITS) | offset) else {
                continue;
            };
            if self.matcher.is_match(c.encode_utf8(&mut buf)) {
                let bit = offset as usize;
                bits[bit / 64] |= 1 << (bit % 64);
            }
        }
        bits
    }

    /// Like [`contains`](Self::contains), treating end of text as a miss.
    pub(crate) fn contains_opt(&self, c: Option<char>) -> bool {
        c.is_some_and(|c| self.contains(c))
    }
}

/// Every class the scanners consult.
#[derive(Debug)]
pub(crate) struct CharClasses {
    pub(crate) spaces: CharClass,
    pub(crate) at_signs: CharClass,
    pub(crate) hash_signs: CharClass,
    pub(crate) latin_accents: CharClass,

    pub(crate) hashtag_letters: CharClass,
    /// Letters, numerals and the word-internal specials.
    pub(crate) hashtag_body: CharClass,
    /// Characters that may sit right before a hash sign.
    pub(crate) hashtag_boundary: CharClass,

    pub(crate) mention_preceding: CharClass,
    pub(crate) cashtag_terminator: CharClass,

    pub(crate) url_preceding: CharClass,
    pub(crate) domain_chars: CharClass,
    pub(crate) unicode_domain_chars: CharClass,
    pub(crate) path_chars: CharClass,
    pub(crate) path_ending_chars: CharClass,
    pub(crate) query_chars: CharClass,
    pub(crate) query_ending_chars: CharClass,
}

impl CharClasses {
    pub(crate) fn build() -> Result<Self> {
        let latin = LATIN_ACCENTS;
        Ok(Self {
            spaces: CharClass::new("spaces", &format!("[{SPACES}]"))?,
            at_signs: CharClass::new("at_signs", "[@＠]")?,
            hash_signs: CharClass::new("hash_signs", "[#＃]")?,
            latin_accents: CharClass::new("latin_accents", &format!("[{latin}]"))?,

            hashtag_letters: CharClass::new("hashtag_letters", &format!("[{HASHTAG_LETTERS}]"))?,
            hashtag_body: CharClass::new(
                "hashtag_body",
                &format!("[{HASHTAG_LETTERS}{HASHTAG_NUMERALS}{HASHTAG_SPECIALS}]"),
            )?,
            hashtag_boundary: CharClass::new(
                "hashtag_boundary",
                &format!(
                    r"[\x{{FE0E}}\x{{FE0F}}]|[^&{HASHTAG_LETTERS}{HASHTAG_NUMERALS}{HASHTAG_SPECIALS}]"
                ),
            )?,

            mention_preceding: CharClass::new("mention_preceding", r"[^a-zA-Z0-9_!#$%&*@＠/]")?,
            cashtag_terminator: CharClass::new(
                "cashtag_terminator",
                r"[\s\p{P}\x21-\x2F\x3A-\x40\x5B-\x60\x7B-\x7E]",
            )?,

            url_preceding: CharClass::new(
                "url_preceding",
                &format!("(?i)[^A-Z0-9_@＠$#＃{INVALID_CHARS}]"),
            )?,
            domain_chars: CharClass::new("domain_chars", &format!("(?i)[0-9a-z{latin}]"))?,
            unicode_domain_chars: CharClass::new(
                "unicode_domain_chars",
                &format!(r"[^\p{{P}}\p{{Z}}\p{{C}}\x{{FFFD}}{INVALID_CHARS}{SPACES}]"),
            )?,
            path_chars: CharClass::new(
                "path_chars",
                &format!(r"(?i)[a-z\p{{Cyrillic}}0-9!*;:=+,.$/%#\[\]\-_~&|@{latin}]"),
            )?,
            path_ending_chars: CharClass::new(
                "path_ending_chars",
                &format!(r"(?i)[a-z\p{{Cyrillic}}0-9=_#/+\-{latin}]"),
            )?,
            query_chars: CharClass::new("query_chars", r"(?i)[a-z0-9!?*'();:&=+$/%#\[\]\-_.,~|@]")?,
            query_ending_chars: CharClass::new("query_ending_chars", r"(?i)[a-z0-9_&=#/\-]")?,
        })
    }
}
