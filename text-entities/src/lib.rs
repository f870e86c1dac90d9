//! # Text Entities
//!
//! This crate finds structured entities in short-form text:
//!
//! - **URLs**: with or without `http://` / `https://`, validated against TLD lists
//! - **Hashtags**: `#tag` in any script, must contain a letter
//! - **Mentions and lists**: `@user` and `@user/list`
//! - **Cashtags**: `$TSLA`, `$BRK.A`
//! - **Reply screen names**: the `@user` a text opens with
//!
//! Every entity carries Unicode codepoint offsets, so an emoji counts as one
//! position.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Pattern Library (built once)                 │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  TldProvider ──► TldTable          CharClasses                  │
//! │                      │                  │                       │
//! │                      └────────┬─────────┘                       │
//! │                               ▼                                 │
//! │                     Matcher (per EntityKind)                    │
//! └─────────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Extraction                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  text ──► Extractor ──► RawMatch (bytes) ──► URL validation     │
//! │                                                   │             │
//! │                                                   ▼             │
//! │  Vec<Entity> ◄── EntityResolver ◄── IndexConverter              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use codex_text_entities::Extractor;
//!
//! let extractor = Extractor::shared()?;
//! let text = "Hello @twitter, check #flutter and $TSLA at http://t.co/xyz";
//! assert_eq!(extractor.extract_mentioned_screen_names(text), vec!["twitter"]);
//! assert_eq!(extractor.extract_hashtags(text), vec!["flutter"]);
//! assert_eq!(extractor.extract_cashtags(text), vec!["TSLA"]);
//! assert_eq!(extractor.extract_urls(text), vec!["http://t.co/xyz"]);
//! # Ok::<(), codex_text_entities::EntityError>(())
//! ```

mod classes;
mod text;

pub mod config;
pub mod entity;
pub mod error;
pub mod extractor;
pub mod index;
pub mod pattern;
pub mod resolver;
pub mod tld;
pub mod url;

pub use config::{ExtractorConfig, PatternConfig};
pub use entity::{Entity, EntityKind};
pub use error::{EntityError, Result};
pub use extractor::Extractor;
pub use index::IndexConverter;
pub use pattern::{Matcher, PatternLibrary, RawMatch};
pub use resolver::EntityResolver;
pub use tld::{TldLists, TldProvider};
pub use url::{DomainClause, UrlParts};
