//! URL grammar.
//!
//! A URL candidate is an optional `http://` / `https://`, a domain, an
//! optional port, path and query. The domain rules are tried in a fixed
//! order and the first one that fits wins:
//!
//! ```text
//! subdomains+ label . (gTLD | ccTLD | xn--punycode)
//! label . gTLD                  (unicode label too, after a protocol)
//! label . xn--punycode
//! label . special-ccTLD         (co, tv, ...)
//! label . ccTLD                 (after a protocol only; unicode label too)
//! label . ccTLD /               (bare domain needs a path)
//! ```
//!
//! A scan keeps a [`DomainMemo`] of label runs and subdomain chains, so
//! each byte offset is resolved once however many candidates start before
//! it.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::pattern::{PatternLibrary, RawMatch};
use crate::text::{char_at, char_before, ends_with_ignore_case, run_end, starts_with_ignore_case};

/// Which domain rule accepted a URL candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainClause {
    /// One or more subdomains before the domain label.
    Subdomains,
    /// A generic TLD.
    GenericTld,
    /// An `xn--` punycode TLD.
    Punycode,
    /// One of the configured special country-code TLDs.
    SpecialCountryTld,
    /// A country-code TLD right after a protocol.
    ProtocolCountryTld,
    /// A country-code TLD followed by a path.
    CountryTldWithPath,
}

/// Components of a URL candidate, as byte ranges into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// The character right before the URL, if any.
    pub before: Option<char>,
    pub protocol: Option<Range<usize>>,
    pub domain: Range<usize>,
    pub clause: DomainClause,
    /// Port digits, without the colon.
    pub port: Option<Range<usize>>,
    /// Path, leading `/` included.
    pub path: Option<Range<usize>>,
    /// Query, leading `?` included.
    pub query: Option<Range<usize>>,
}

struct DomainMatch {
    end: usize,
    clause: DomainClause,
}

/// Scan-local results keyed by byte offset.
#[derive(Debug, Default)]
pub(crate) struct DomainMemo {
    /// End of the run of label characters, hyphens included.
    label_runs: HashMap<usize, usize>,
    /// Same, with underscores allowed.
    subdomain_runs: HashMap<usize, usize>,
    /// End of the deepest `label.tld` reachable through subdomains.
    chains: HashMap<usize, Option<usize>>,
}

impl PatternLibrary {
    pub(crate) fn find_url(&self, text: &str, from: usize) -> Option<RawMatch> {
        let mut memo = DomainMemo::default();
        let mut pos = from;
        loop {
            let current = char_at(text, pos);
            if let Some(c) = current
                && self.classes.url_preceding.contains(c)
                && let Some(found) = self.url_at(text, pos + c.len_utf8(), Some(c), &mut memo)
            {
                return Some(found);
            }
            if pos == 0
                && let Some(found) = self.url_at(text, 0, None, &mut memo)
            {
                return Some(found);
            }
            pos += current?.len_utf8();
        }
    }

    fn url_at(
        &self,
        text: &str,
        start: usize,
        before: Option<char>,
        memo: &mut DomainMemo,
    ) -> Option<RawMatch> {
        let protocol_end = if starts_with_ignore_case(text, start, "https://") {
            Some(start + 8)
        } else if starts_with_ignore_case(text, start, "http://") {
            Some(start + 7)
        } else {
            None
        };

        let with_protocol = protocol_end
            .and_then(|end| self.domain_at(text, end, memo).map(|domain| (end, domain)));
        let (protocol, domain_start, domain) = match with_protocol {
            Some((end, domain)) => (Some(start..end), end, domain),
            None => (None, start, self.domain_at(text, start, memo)?),
        };

        let mut end = domain.end;
        let mut port = None;
        if char_at(text, end) == Some(':') {
            let digits_end = run_end(text, end + 1, usize::MAX, |c| c.is_ascii_digit());
            if digits_end > end + 1 {
                port = Some(end + 1..digits_end);
                end = digits_end;
            }
        }

        let mut path = None;
        if char_at(text, end) == Some('/') {
            let path_end = self.path_end(text, end + 1);
            path = Some(end..path_end);
            end = path_end;
        }

        let mut query = None;
        if char_at(text, end) == Some('?')
            && let Some(query_end) = self.query_end(text, end + 1)
        {
            query = Some(end..query_end);
            end = query_end;
        }

        let first_len = char_at(text, start).map_or(1, char::len_utf8);
        Some(RawMatch {
            span: start..end,
            sigil_end: start + first_len,
            value: start..end,
            list_slug: None,
            url: Some(UrlParts {
                before,
                protocol,
                domain: domain_start..domain.end,
                clause: domain.clause,
                port,
                path,
                query,
            }),
        })
    }

    fn domain_at(&self, text: &str, start: usize, memo: &mut DomainMemo) -> Option<DomainMatch> {
        let after_protocol = ends_with_ignore_case(text, start, "http://")
            || ends_with_ignore_case(text, start, "https://");
        let found = |end, clause| Some(DomainMatch { end, clause });

        if let Some(end) = self
            .label_end(text, start, true, memo)
            .and_then(|first| self.deepest_domain_end(text, first, memo))
        {
            return found(end, DomainClause::Subdomains);
        }

        let label = self.label_end(text, start, false, memo);
        let unicode_label = if after_protocol {
            self.unicode_label_end(text, start)
        } else {
            None
        };

        let generic = label
            .and_then(|l| self.generic_tld(text, l))
            .or_else(|| unicode_label.and_then(|l| self.generic_tld(text, l)));
        if let Some(end) = generic {
            return found(end, DomainClause::GenericTld);
        }
        if let Some(end) = label.and_then(|l| self.punycode_end(text, l)) {
            return found(end, DomainClause::Punycode);
        }
        if let Some(end) = label.and_then(|l| self.special_cctld(text, l)) {
            return found(end, DomainClause::SpecialCountryTld);
        }
        if after_protocol {
            let country = label
                .and_then(|l| self.country_tld(text, l))
                .or_else(|| unicode_label.and_then(|l| self.country_tld(text, l)));
            if let Some(end) = country {
                return found(end, DomainClause::ProtocolCountryTld);
            }
        }
        label
            .and_then(|l| self.country_tld(text, l))
            .filter(|&end| char_at(text, end) == Some('/'))
            .and_then(|end| found(end, DomainClause::CountryTldWithPath))
    }

    /// End of the deepest `label.tld` found by following subdomain labels
    /// from `start`. Zero subdomains count, so this is also `label.tld` at
    /// `start` itself.
    fn deepest_domain_end(&self, text: &str, start: usize, memo: &mut DomainMemo) -> Option<usize> {
        let mut chain = Vec::new();
        let mut pos = start;
        let mut deepest = loop {
            if let Some(&known) = memo.chains.get(&pos) {
                break known;
            }
            chain.push(pos);
            match self.label_end(text, pos, true, memo) {
                Some(next) => pos = next,
                None => break None,
            }
        };
        for &label_start in chain.iter().rev() {
            if deepest.is_none() {
                deepest = self
                    .label_end(text, label_start, false, memo)
                    .and_then(|tld_start| self.any_tld(text, tld_start));
            }
            memo.chains.insert(label_start, deepest);
        }
        deepest
    }

    /// Offset past `label.` starting at `start`. Hyphens (and underscores,
    /// for subdomains) may appear inside a label but not at either end.
    fn label_end(
        &self,
        text: &str,
        start: usize,
        allow_underscore: bool,
        memo: &mut DomainMemo,
    ) -> Option<usize> {
        let domain_chars = &self.classes.domain_chars;
        if !domain_chars.contains_opt(char_at(text, start)) {
            return None;
        }
        let end = self.label_run_end(text, start, allow_underscore, memo);
        (domain_chars.contains_opt(char_before(text, end)) && char_at(text, end) == Some('.'))
            .then_some(end + 1)
    }

    fn label_run_end(
        &self,
        text: &str,
        start: usize,
        allow_underscore: bool,
        memo: &mut DomainMemo,
    ) -> usize {
        let runs = if allow_underscore {
            &mut memo.subdomain_runs
        } else {
            &mut memo.label_runs
        };
        let in_label = |c: char| {
            self.classes.domain_chars.contains(c) || c == '-' || (allow_underscore && c == '_')
        };

        let mut visited = Vec::new();
        let mut pos = start;
        let end = loop {
            if let Some(&end) = runs.get(&pos) {
                break end;
            }
            match char_at(text, pos) {
                Some(c) if in_label(c) => {
                    visited.push(pos);
                    pos += c.len_utf8();
                }
                _ => break pos,
            }
        };
        for offset in visited {
            runs.insert(offset, end);
        }
        end
    }

    fn unicode_label_end(&self, text: &str, start: usize) -> Option<usize> {
        let end = run_end(text, start, usize::MAX, |c| {
            self.classes.unicode_domain_chars.contains(c)
        });
        (end > start && char_at(text, end) == Some('.')).then_some(end + 1)
    }

    fn any_tld(&self, text: &str, pos: usize) -> Option<usize> {
        self.generic_tld(text, pos)
            .or_else(|| self.country_tld(text, pos))
            .or_else(|| self.punycode_end(text, pos))
    }

    fn generic_tld(&self, text: &str, pos: usize) -> Option<usize> {
        self.generic_tlds.match_at(text, pos, ends_tld)
    }

    fn country_tld(&self, text: &str, pos: usize) -> Option<usize> {
        self.country_tlds.match_at(text, pos, ends_tld)
    }

    fn special_cctld(&self, text: &str, pos: usize) -> Option<usize> {
        self.special_cctlds.as_ref()?.match_at(text, pos, |next| {
            next.is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '@'))
        })
    }

    fn punycode_end(&self, text: &str, pos: usize) -> Option<usize> {
        if !starts_with_ignore_case(text, pos, "xn--") {
            return None;
        }
        let end = run_end(text, pos + 4, usize::MAX, |c| c.is_ascii_alphanumeric());
        (end > pos + 4).then_some(end)
    }

    /// End of the path that starts at `start` (just past the `/`): the
    /// longest run of path tokens that finishes on an ending token.
    fn path_end(&self, text: &str, start: usize) -> usize {
        let classes = &self.classes;
        let mut pos = start;
        let mut end = start;
        loop {
            if let Some(after) = self.balanced_parens_end(text, pos) {
                pos = after;
                end = pos;
                continue;
            }
            match char_at(text, pos) {
                Some(c) if classes.path_chars.contains(c) => {
                    pos += c.len_utf8();
                    if classes.path_ending_chars.contains(c) {
                        end = pos;
                    }
                }
                _ => return end,
            }
        }
    }

    /// `(chars)` or `(chars(chars)chars)` at `pos`.
    fn balanced_parens_end(&self, text: &str, pos: usize) -> Option<usize> {
        if char_at(text, pos) != Some('(') {
            return None;
        }
        let path_chars = |c| self.classes.path_chars.contains(c);
        let inner_start = pos + 1;
        let first_end = run_end(text, inner_start, usize::MAX, path_chars);
        match char_at(text, first_end)? {
            ')' if first_end > inner_start => Some(first_end + 1),
            '(' => {
                let nested_start = first_end + 1;
                let nested_end = run_end(text, nested_start, usize::MAX, path_chars);
                if nested_end == nested_start || char_at(text, nested_end) != Some(')') {
                    return None;
                }
                let tail_end = run_end(text, nested_end + 1, usize::MAX, path_chars);
                (char_at(text, tail_end) == Some(')')).then_some(tail_end + 1)
            }
            _ => None,
        }
    }

    /// End of the query that starts at `start` (just past the `?`).
    fn query_end(&self, text: &str, start: usize) -> Option<usize> {
        let classes = &self.classes;
        let mut pos = start;
        let mut end = None;
        while let Some(c) = char_at(text, pos)
            && classes.query_chars.contains(c)
        {
            pos += c.len_utf8();
            if classes.query_ending_chars.contains(c) {
                end = Some(pos);
            }
        }
        end
    }

    /// ASCII domains inside `domain`, leftmost first, as byte ranges.
    pub(crate) fn ascii_domains(&self, domain: &str) -> Vec<Range<usize>> {
        let mut memo = DomainMemo::default();
        let mut found = Vec::new();
        let mut pos = 0;
        while let Some(c) = char_at(domain, pos) {
            match self.deepest_domain_end(domain, pos, &mut memo) {
                Some(end) => {
                    found.push(pos..end);
                    pos = end;
                }
                None => pos += c.len_utf8(),
            }
        }
        found
    }

    /// `label.cc` and nothing else, with a ccTLD.
    pub(crate) fn is_short_country_domain(&self, domain: &str) -> bool {
        self.label_end(domain, 0, false, &mut DomainMemo::default())
            .and_then(|tld_start| self.country_tld(domain, tld_start))
            .is_some_and(|end| end == domain.len())
    }

    /// `label.co`-style domain built on one of the special ccTLDs.
    pub(crate) fn is_special_short_domain(&self, domain: &str) -> bool {
        self.label_end(domain, 0, false, &mut DomainMemo::default())
            .and_then(|tld_start| self.special_cctld(domain, tld_start))
            .is_some_and(|end| end == domain.len())
    }
}

fn ends_tld(next: Option<char>) -> bool {
    next.is_none_or(|c| !(c.is_ascii_alphanumeric() || matches!(c, '@' | '+' | '-')))
}
