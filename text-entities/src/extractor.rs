//! Entity extraction over a shared [`PatternLibrary`].

use std::ops::Range;

use tracing::trace;

use crate::config::ExtractorConfig;
use crate::entity::{Entity, EntityKind};
use crate::error::Result;
use crate::index::IndexConverter;
use crate::pattern::{PatternLibrary, RawMatch};
use crate::resolver::EntityResolver;

/// Extracts entities from text.
///
/// An extractor is a cheap view over a [`PatternLibrary`] plus an
/// [`ExtractorConfig`]. Extraction never fails and never mutates the
/// library, so one extractor can serve any number of threads.
///
/// ```
/// use codex_text_entities::{EntityKind, Extractor};
///
/// let extractor = Extractor::shared()?;
/// let entities = extractor.extract("#rust at example.com", &[EntityKind::Hashtag, EntityKind::Url]);
/// assert_eq!(entities.len(), 2);
/// assert_eq!(entities[1].value, "example.com");
/// # Ok::<(), codex_text_entities::EntityError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Extractor<'a> {
    library: &'a PatternLibrary,
    config: ExtractorConfig,
}

impl<'a> Extractor<'a> {
    /// Create an extractor with the default configuration.
    pub fn new(library: &'a PatternLibrary) -> Self {
        Self::with_config(library, ExtractorConfig::default())
    }

    pub fn with_config(library: &'a PatternLibrary, config: ExtractorConfig) -> Self {
        Self { library, config }
    }

    /// Set whether bare domains such as `example.com` count as URLs.
    pub fn extract_url_without_protocol(mut self, enabled: bool) -> Self {
        self.config.extract_url_without_protocol = enabled;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract every entity of the requested kinds, sorted by start.
    ///
    /// URLs are always located, even when not requested, so that nothing
    /// inside a URL is reported as another kind. A plain `@name` requested
    /// as both `Mention` and `MentionOrList` is reported once per kind, as
    /// is a reply screen name.
    pub fn extract(&self, text: &str, kinds: &[EntityKind]) -> Vec<Entity> {
        if text.is_empty() || kinds.is_empty() {
            return Vec::new();
        }

        let resolver = EntityResolver::new(self.library, &self.config);
        let mut candidates = Vec::new();

        // Every URL domain needs a dot.
        if text.contains('.') {
            self.scan(EntityKind::Url, text, |found| {
                for span in resolver.validate_url(text, &found) {
                    candidates.push(Candidate {
                        kind: EntityKind::Url,
                        value: span.clone(),
                        span,
                        list_slug: None,
                    });
                }
            });
        }

        for kind in [EntityKind::Hashtag, EntityKind::Cashtag, EntityKind::ReplyScreenname] {
            if kinds.contains(&kind) {
                self.scan(kind, text, |found| candidates.push(Candidate::new(kind, found)));
            }
        }

        let mentions = kinds.contains(&EntityKind::Mention);
        let lists = kinds.contains(&EntityKind::MentionOrList);
        if mentions || lists {
            self.scan(EntityKind::MentionOrList, text, |found| {
                if mentions && found.list_slug.is_none() {
                    candidates.push(Candidate::new(EntityKind::Mention, found.clone()));
                }
                if lists {
                    candidates.push(Candidate::new(EntityKind::MentionOrList, found));
                }
            });
        }

        candidates.sort_by_key(|candidate| candidate.span.start);
        let found = candidates.len();
        let mut converter = IndexConverter::new(text);
        let entities = candidates
            .into_iter()
            .map(|candidate| candidate.into_entity(text, &mut converter))
            .collect();

        let resolved = resolver.resolve(entities, kinds);
        trace!(candidates = found, entities = resolved.len(), "Extracted entities");
        resolved
    }

    /// Like [`extract`](Self::extract) for bytes that may not be valid
    /// UTF-8. Invalid sequences become U+FFFD, which no entity contains;
    /// indices refer to the repaired text.
    pub fn extract_from_bytes(&self, bytes: &[u8], kinds: &[EntityKind]) -> Vec<Entity> {
        self.extract(&String::from_utf8_lossy(bytes), kinds)
    }

    /// URLs, hashtags, mentions or lists, and cashtags together.
    pub fn extract_entities_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(
            text,
            &[
                EntityKind::Url,
                EntityKind::Hashtag,
                EntityKind::MentionOrList,
                EntityKind::Cashtag,
            ],
        )
    }

    pub fn extract_urls(&self, text: &str) -> Vec<String> {
        values(self.extract_urls_with_indices(text))
    }

    pub fn extract_urls_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, &[EntityKind::Url])
    }

    /// Hashtag texts, without the `#`.
    pub fn extract_hashtags(&self, text: &str) -> Vec<String> {
        values(self.extract_hashtags_with_indices(text))
    }

    pub fn extract_hashtags_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, &[EntityKind::Hashtag])
    }

    /// Screen names mentioned with `@`, list references excluded.
    pub fn extract_mentioned_screen_names(&self, text: &str) -> Vec<String> {
        values(self.extract_mentioned_screen_names_with_indices(text))
    }

    pub fn extract_mentioned_screen_names_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, &[EntityKind::Mention])
    }

    /// Screen names and list references, e.g. `user` and `user/list`.
    pub fn extract_mentions_or_lists(&self, text: &str) -> Vec<String> {
        self.extract_mentions_or_lists_with_indices(text)
            .iter()
            .map(Entity::qualified_value)
            .collect()
    }

    pub fn extract_mentions_or_lists_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, &[EntityKind::MentionOrList])
    }

    /// Cashtag symbols, without the `$`.
    pub fn extract_cashtags(&self, text: &str) -> Vec<String> {
        values(self.extract_cashtags_with_indices(text))
    }

    pub fn extract_cashtags_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, &[EntityKind::Cashtag])
    }

    /// The screen name a reply starts with, if any.
    pub fn extract_reply_screenname(&self, text: &str) -> Option<String> {
        self.extract_reply_screenname_with_indices(text)
            .map(|entity| entity.value)
    }

    pub fn extract_reply_screenname_with_indices(&self, text: &str) -> Option<Entity> {
        self.extract(text, &[EntityKind::ReplyScreenname])
            .into_iter()
            .next()
    }

    /// Run one matcher over `text`, skipping matches whose continuation
    /// disqualifies them.
    fn scan(&self, kind: EntityKind, text: &str, mut visit: impl FnMut(RawMatch)) {
        let matcher = self.library.matcher(kind);
        let mut from = 0;
        while let Some(found) = matcher.find_at(text, from) {
            if matcher.rejects_continuation(text, found.span.end) {
                from = found.sigil_end;
                continue;
            }
            from = found.span.end;
            visit(found);
        }
    }
}

impl Extractor<'static> {
    /// An extractor over [`PatternLibrary::shared`].
    pub fn shared() -> Result<Self> {
        Ok(Self::new(PatternLibrary::shared()?))
    }
}

/// A surviving match, still in byte offsets.
struct Candidate {
    kind: EntityKind,
    span: Range<usize>,
    value: Range<usize>,
    list_slug: Option<Range<usize>>,
}

impl Candidate {
    fn new(kind: EntityKind, found: RawMatch) -> Self {
        Self {
            kind,
            span: found.span,
            value: found.value,
            list_slug: found.list_slug,
        }
    }

    fn into_entity(self, text: &str, converter: &mut IndexConverter<'_>) -> Entity {
        let (start, end) = converter.to_codepoints(self.span.start, self.span.end);
        let value = text.get(self.value).unwrap_or_default();
        let entity = Entity::new(self.kind, value, start, end);
        match self.list_slug.and_then(|slug| text.get(slug)) {
            Some(slug) => entity.with_list_slug(slug),
            None => entity,
        }
    }
}

fn values(entities: Vec<Entity>) -> Vec<String> {
    entities.into_iter().map(|entity| entity.value).collect()
}
