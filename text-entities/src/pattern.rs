//! The pattern library: per-kind matchers built from Unicode character
//! classes and TLD tables.
//!
//! Every matcher is an explicit left-to-right scanner. Offsets are UTF-8
//! byte offsets into the text being scanned; [`IndexConverter`] turns them
//! into codepoint indices afterwards.
//!
//! [`IndexConverter`]: crate::IndexConverter

use std::ops::Range;
use std::sync::OnceLock;

use tracing::debug;

use crate::classes::CharClasses;
use crate::config::PatternConfig;
use crate::entity::EntityKind;
use crate::error::Result;
use crate::text::{char_at, char_before, ends_with_ignore_case, run_end, starts_with_ignore_case};
use crate::tld::{TldLists, TldProvider, TldTable};
use crate::url::UrlParts;

/// Longest screen name, in characters.
pub const MAX_SCREEN_NAME_LEN: usize = 20;

/// Longest list slug after its first letter, in characters.
pub const MAX_LIST_SLUG_TAIL_LEN: usize = 24;

static SHARED: OnceLock<Result<PatternLibrary>> = OnceLock::new();

/// Immutable set of matchers for every [`EntityKind`].
///
/// Build one with [`PatternLibrary::new`] at startup, or use
/// [`PatternLibrary::shared`] for the process-wide instance backed by the
/// bundled TLD lists.
#[derive(Debug)]
pub struct PatternLibrary {
    pub(crate) classes: CharClasses,
    pub(crate) generic_tlds: TldTable,
    pub(crate) country_tlds: TldTable,
    pub(crate) special_cctlds: Option<TldTable>,
}

impl PatternLibrary {
    /// Build the library from TLD lists.
    ///
    /// Fails when either TLD list is empty or holds an unusable entry.
    pub fn new<P>(tlds: &P, config: &PatternConfig) -> Result<Self>
    where
        P: TldProvider + ?Sized,
    {
        let generic_tlds = TldTable::new("generic", tlds.generic_tlds())?;
        let country_tlds = TldTable::new("country", tlds.country_tlds())?;
        let special_cctlds = if config.special_cctlds.is_empty() {
            None
        } else {
            Some(TldTable::new("special country", &config.special_cctlds)?)
        };
        let classes = CharClasses::build()?;

        debug!(
            generic = generic_tlds.len(),
            country = country_tlds.len(),
            special = config.special_cctlds.len(),
            "Built entity pattern library"
        );

        Ok(Self {
            classes,
            generic_tlds,
            country_tlds,
            special_cctlds,
        })
    }

    /// The process-wide library built from the bundled TLD lists.
    ///
    /// Built on first call; every later call returns the same instance (or
    /// the same construction error).
    pub fn shared() -> Result<&'static PatternLibrary> {
        SHARED
            .get_or_init(|| {
                let tlds = TldLists::bundled()?;
                Self::new(&tlds, &PatternConfig::default())
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The matcher for one entity kind.
    ///
    /// `Mention` and `MentionOrList` share a grammar; the extractor decides
    /// which matches carry a list slug.
    pub fn matcher(&self, kind: EntityKind) -> Matcher<'_> {
        Matcher {
            library: self,
            kind,
        }
    }

    /// Whether `tld` is in the generic TLD list.
    pub fn is_generic_tld(&self, tld: &str) -> bool {
        self.generic_tlds.contains(tld)
    }

    /// Whether `tld` is in the country-code TLD list.
    pub fn is_country_tld(&self, tld: &str) -> bool {
        self.country_tlds.contains(tld)
    }

    fn find_hashtag(&self, text: &str, from: usize) -> Option<RawMatch> {
        let classes = &self.classes;
        let mut pos = from;
        let is_sigil = |c: char| classes.hash_signs.contains(c);
        while let Some(offset) = text.get(pos..)?.find(is_sigil) {
            let sigil = pos + offset;
            pos = sigil + char_at(text, sigil).map_or(1, char::len_utf8);

            let preceded_ok = match char_before(text, sigil) {
                None => true,
                Some(c) => sigil > from && classes.hashtag_boundary.contains(c),
            };
            // A variation selector or keycap after the sign means emoji.
            if !preceded_ok || matches!(char_at(text, pos), Some('\u{FE0F}' | '\u{20E3}')) {
                continue;
            }

            let end = run_end(text, pos, usize::MAX, |c| classes.hashtag_body.contains(c));
            let has_letter = text
                .get(pos..end)
                .is_some_and(|body| body.chars().any(|c| classes.hashtag_letters.contains(c)));
            if has_letter {
                return Some(RawMatch::tagged(sigil, pos, end));
            }
        }
        None
    }

    fn find_mention(&self, text: &str, from: usize) -> Option<RawMatch> {
        let classes = &self.classes;
        let mut pos = from;
        let is_sigil = |c: char| classes.at_signs.contains(c);
        while let Some(offset) = text.get(pos..)?.find(is_sigil) {
            let sigil = pos + offset;
            pos = sigil + char_at(text, sigil).map_or(1, char::len_utf8);

            let preceded_ok = match char_before(text, sigil) {
                None => true,
                Some(c) => {
                    sigil > from
                        && (classes.mention_preceding.contains(c)
                            || self.follows_retweet_marker(text, sigil))
                }
            };
            if !preceded_ok {
                continue;
            }

            let Some(mut found) = self.screen_name_at(text, sigil, pos) else {
                continue;
            };
            let name_end = found.span.end;
            if char_at(text, name_end) == Some('/')
                && char_at(text, name_end + 1).is_some_and(|c| c.is_ascii_alphabetic())
            {
                let slug_end = run_end(text, name_end + 2, MAX_LIST_SLUG_TAIL_LEN, |c| {
                    c.is_ascii_alphanumeric() || c == '_' || c == '-'
                });
                found.list_slug = Some(name_end..slug_end);
                found.span.end = slug_end;
            }
            return Some(found);
        }
        None
    }

    fn find_reply(&self, text: &str, from: usize) -> Option<RawMatch> {
        if from > 0 {
            return None;
        }
        let sigil = run_end(text, 0, usize::MAX, |c| self.classes.spaces.contains(c));
        let at = char_at(text, sigil)?;
        if !self.classes.at_signs.contains(at) {
            return None;
        }
        self.screen_name_at(text, sigil, sigil + at.len_utf8())
    }

    fn find_cashtag(&self, text: &str, from: usize) -> Option<RawMatch> {
        let classes = &self.classes;
        let terminates =
            |at: usize| char_at(text, at).is_none_or(|c| classes.cashtag_terminator.contains(c));

        let mut pos = from;
        while let Some(offset) = text.get(pos..)?.find('$') {
            let sigil = pos + offset;
            pos = sigil + 1;

            let preceded_ok = match char_before(text, sigil) {
                None => true,
                Some(c) => sigil > from && classes.spaces.contains(c),
            };
            if !preceded_ok {
                continue;
            }

            // Longest symbol first, then the optional `.xx` / `_xx` suffix,
            // as a backtracking matcher would.
            let letters_end = run_end(text, pos, 6, |c| c.is_ascii_alphabetic());
            for symbol_end in (pos + 1..=letters_end).rev() {
                if matches!(char_at(text, symbol_end), Some('.' | '_')) {
                    let suffix_start = symbol_end + 1;
                    let suffix_end = run_end(text, suffix_start, 2, |c| c.is_ascii_alphabetic());
                    for end in (suffix_start + 1..=suffix_end).rev() {
                        if terminates(end) {
                            return Some(RawMatch::tagged(sigil, pos, end));
                        }
                    }
                }
                if terminates(symbol_end) {
                    return Some(RawMatch::tagged(sigil, pos, symbol_end));
                }
            }
        }
        None
    }

    /// `@name` starting at `sigil`, with the name beginning at `name_start`.
    fn screen_name_at(&self, text: &str, sigil: usize, name_start: usize) -> Option<RawMatch> {
        let end = run_end(text, name_start, MAX_SCREEN_NAME_LEN, |c| {
            c.is_ascii_alphanumeric() || c == '_'
        });
        (end > name_start).then(|| RawMatch::tagged(sigil, name_start, end))
    }

    /// `RT` or `RT:` right before `sigil`, not glued to a preceding word.
    fn follows_retweet_marker(&self, text: &str, sigil: usize) -> bool {
        let marker_end = if char_before(text, sigil) == Some(':') {
            sigil - 1
        } else {
            sigil
        };
        if !ends_with_ignore_case(text, marker_end, "rt") {
            return false;
        }
        char_before(text, marker_end - 2).is_none_or(|c| {
            !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '~' | '.' | '-'))
        })
    }

    /// Whether the text at `end` makes the preceding match invalid.
    fn rejects_continuation(&self, kind: EntityKind, text: &str, end: usize) -> bool {
        let next = char_at(text, end);
        let classes = &self.classes;
        let disallowed = match kind {
            EntityKind::Url => return false,
            EntityKind::Hashtag => classes.hash_signs.contains_opt(next),
            EntityKind::Mention | EntityKind::MentionOrList | EntityKind::ReplyScreenname => {
                classes.at_signs.contains_opt(next) || classes.latin_accents.contains_opt(next)
            }
            EntityKind::Cashtag => next == Some('$'),
        };
        disallowed || starts_with_ignore_case(text, end, "://")
    }
}

/// Matcher for one entity kind, borrowed from a [`PatternLibrary`].
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    library: &'a PatternLibrary,
    kind: EntityKind,
}

impl Matcher<'_> {
    /// The kind this matcher recognizes.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// First match whose leading boundary character lies at or after byte
    /// offset `from`. Offset 0 also accepts a match at the very start.
    pub fn find_at(&self, text: &str, from: usize) -> Option<RawMatch> {
        let library = self.library;
        match self.kind {
            EntityKind::Url => library.find_url(text, from),
            EntityKind::Hashtag => library.find_hashtag(text, from),
            EntityKind::Mention | EntityKind::MentionOrList => library.find_mention(text, from),
            EntityKind::Cashtag => library.find_cashtag(text, from),
            EntityKind::ReplyScreenname => library.find_reply(text, from),
        }
    }

    /// Whether the character(s) at byte offset `end` disqualify a match
    /// ending there, e.g. `#tag#` or `@user@`.
    pub fn rejects_continuation(&self, text: &str, end: usize) -> bool {
        self.library.rejects_continuation(self.kind, text, end)
    }
}

/// A match in UTF-8 byte offsets, before validation and index conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// The whole entity, sigil and list slug included.
    pub span: Range<usize>,

    /// Where scanning resumes if the match is rejected.
    pub sigil_end: usize,

    /// The entity value.
    pub value: Range<usize>,

    /// `/slug` of a list reference.
    pub list_slug: Option<Range<usize>>,

    /// URL components, for URL matches.
    pub url: Option<UrlParts>,
}

impl RawMatch {
    fn tagged(sigil: usize, value_start: usize, end: usize) -> Self {
        Self {
            span: sigil..end,
            sigil_end: value_start,
            value: value_start..end,
            list_slug: None,
            url: None,
        }
    }
}
