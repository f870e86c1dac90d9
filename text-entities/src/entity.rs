//! Extracted entities and their kinds.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Kind of entity recognized in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A link, with or without protocol.
    Url,
    /// A `#hashtag`.
    Hashtag,
    /// An `@screen_name` that does not reference a list.
    Mention,
    /// An `@screen_name` optionally followed by `/list-slug`.
    MentionOrList,
    /// A `$CASHTAG`.
    Cashtag,
    /// The `@screen_name` a text opens with.
    ReplyScreenname,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 6] = [
        Self::Url,
        Self::Hashtag,
        Self::Mention,
        Self::MentionOrList,
        Self::Cashtag,
        Self::ReplyScreenname,
    ];

    /// Get a display name for this entity kind.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Url => "URL",
            Self::Hashtag => "Hashtag",
            Self::Mention => "Mention",
            Self::MentionOrList => "Mention or List",
            Self::Cashtag => "Cashtag",
            Self::ReplyScreenname => "Reply Screen Name",
        }
    }

    /// Rank used when two kinds start at the same offset; lower wins.
    ///
    /// `Mention` and `MentionOrList` never compete: a plain `@name` is
    /// reported under both when both are requested.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Url => 0,
            Self::Mention | Self::MentionOrList | Self::ReplyScreenname => 1,
            Self::Hashtag => 2,
            Self::Cashtag => 3,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// An entity found in a text, indexed in Unicode codepoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Kind of entity.
    pub kind: EntityKind,

    /// Matched value without its sigil.
    pub value: String,

    /// Codepoint index of the first character, sigil included.
    pub start: usize,

    /// Codepoint index one past the last character.
    pub end: usize,

    /// List slug, including its leading `/`, for list references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_slug: Option<String>,
}

impl Entity {
    /// Create a new entity.
    pub fn new(kind: EntityKind, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            start,
            end,
            list_slug: None,
        }
    }

    /// Attach a list slug.
    pub fn with_list_slug(mut self, slug: impl Into<String>) -> Self {
        self.list_slug = Some(slug.into());
        self
    }

    /// The `(start, end)` codepoint pair.
    pub fn indices(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// The codepoint range covered by this entity.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length in codepoints.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Entities always cover at least one codepoint.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether the two entities share at least one codepoint.
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Screen name and list slug joined, e.g. `user/list`.
    pub fn qualified_value(&self) -> String {
        match &self.list_slug {
            Some(slug) => format!("{}{slug}", self.value),
            None => self.value.clone(),
        }
    }
}
