//! URL validation and cross-kind resolution.

use std::cmp::Reverse;
use std::ops::Range;

use tracing::trace;

use crate::config::ExtractorConfig;
use crate::entity::{Entity, EntityKind};
use crate::pattern::{PatternLibrary, RawMatch};
use crate::text::{run_end, starts_with_ignore_case};
use crate::url::UrlParts;

/// Decides which candidates survive and in what order.
#[derive(Debug, Clone, Copy)]
pub struct EntityResolver<'a> {
    library: &'a PatternLibrary,
    config: &'a ExtractorConfig,
}

impl<'a> EntityResolver<'a> {
    pub fn new(library: &'a PatternLibrary, config: &'a ExtractorConfig) -> Self {
        Self { library, config }
    }

    /// Validate a URL candidate, returning the byte spans it yields.
    ///
    /// A candidate with a protocol yields itself (shortened for `t.co`
    /// links). A bare domain is re-scanned for ASCII domains and may yield
    /// none or several; a short `label.cc` domain only counts when it has a
    /// path or uses a special ccTLD such as `co`.
    pub fn validate_url(&self, text: &str, candidate: &RawMatch) -> Vec<Range<usize>> {
        let Some(parts) = &candidate.url else {
            return vec![candidate.span.clone()];
        };

        if parts.protocol.is_some() {
            let end = if self.config.trim_tco_paths {
                tco_end(text, parts).unwrap_or(candidate.span.end)
            } else {
                candidate.span.end
            };
            return vec![candidate.span.start..end];
        }

        if !self.config.extract_url_without_protocol {
            trace!(
                start = candidate.span.start,
                clause = ?parts.clause,
                "Skipping URL without protocol"
            );
            return Vec::new();
        }
        if matches!(parts.before, Some('-' | '_' | '.' | '/')) {
            trace!(
                start = candidate.span.start,
                clause = ?parts.clause,
                "Skipping URL glued to preceding text"
            );
            return Vec::new();
        }

        let Some(domain) = text.get(parts.domain.clone()) else {
            return Vec::new();
        };
        let library = self.library;
        let has_path = parts.path.is_some();
        let offset = parts.domain.start;
        let mut spans: Vec<Range<usize>> = library
            .ascii_domains(domain)
            .into_iter()
            .filter(|found| {
                let ascii = &domain[found.clone()];
                has_path
                    || library.is_special_short_domain(ascii)
                    || !library.is_short_country_domain(ascii)
            })
            .map(|found| offset + found.start..offset + found.end)
            .collect();

        if has_path && let Some(last) = spans.last_mut() {
            last.end = candidate.span.end;
        }
        if spans.is_empty() {
            trace!(domain, clause = ?parts.clause, "Rejected URL candidate");
        }
        spans
    }

    /// Apply URL suppression and precedence, keep the requested kinds and
    /// sort by start.
    ///
    /// Reply screen names are reported alongside the other kinds and never
    /// compete with them. A `MentionOrList` on exactly the span of a kept
    /// `Mention` is kept too.
    pub fn resolve(&self, entities: Vec<Entity>, kinds: &[EntityKind]) -> Vec<Entity> {
        let (replies, mut candidates): (Vec<Entity>, Vec<Entity>) = entities
            .into_iter()
            .partition(|entity| entity.kind == EntityKind::ReplyScreenname);

        let urls: Vec<Range<usize>> = candidates
            .iter()
            .filter(|entity| entity.kind == EntityKind::Url)
            .map(Entity::range)
            .collect();
        candidates.retain(|entity| {
            let inside_url = entity.kind != EntityKind::Url
                && urls
                    .iter()
                    .any(|url| entity.start < url.end && url.start < entity.end);
            if inside_url {
                trace!(kind = %entity.kind, start = entity.start, "Dropping entity inside a URL");
            }
            !inside_url
        });

        candidates.sort_by_key(|entity| {
            (
                entity.start,
                entity.kind.precedence(),
                Reverse(entity.len()),
                entity.kind,
            )
        });

        let mut resolved = Vec::with_capacity(candidates.len() + replies.len());
        let mut covered = 0;
        for entity in candidates {
            if entity.start >= covered {
                covered = entity.end;
                resolved.push(entity);
            } else if resolved.last().is_some_and(|kept| same_mention(kept, &entity)) {
                resolved.push(entity);
            }
        }
        resolved.retain(|entity| kinds.contains(&entity.kind));
        debug_assert!(
            resolved
                .windows(2)
                .all(|pair| pair[0].end <= pair[1].start || same_mention(&pair[0], &pair[1]))
        );

        if kinds.contains(&EntityKind::ReplyScreenname) {
            resolved.extend(replies);
            resolved.sort_by_key(|entity| entity.start);
        }
        resolved
    }
}

/// `mention_or_list` reports the same `@name` as `mention`.
fn same_mention(mention: &Entity, mention_or_list: &Entity) -> bool {
    mention.kind == EntityKind::Mention
        && mention_or_list.kind == EntityKind::MentionOrList
        && mention.range() == mention_or_list.range()
}

/// End of `t.co/<alnum>+` right after the protocol.
fn tco_end(text: &str, parts: &UrlParts) -> Option<usize> {
    let host = parts.domain.start;
    if !starts_with_ignore_case(text, host, "t.co/") {
        return None;
    }
    let code_start = host + "t.co/".len();
    let end = run_end(text, code_start, usize::MAX, |c| c.is_ascii_alphanumeric());
    (end > code_start).then_some(end)
}
