//! Integration tests for entity extraction.
//!
//! Runs the conformance cases in `tests/fixtures/extract.yml` plus the
//! end-to-end scenarios the crate documents.

use std::path::PathBuf;

use codex_text_entities::{
    Entity, EntityKind, Extractor, ExtractorConfig, PatternConfig, PatternLibrary, TldLists,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[derive(Debug, Deserialize)]
struct Fixture {
    tests: Sections,
}

#[derive(Debug, Deserialize)]
struct Sections {
    mentions: Vec<Case<Vec<String>>>,
    mentions_with_indices: Vec<Case<Vec<Indexed>>>,
    mentions_or_lists_with_indices: Vec<Case<Vec<Indexed>>>,
    replies: Vec<Case<Option<String>>>,
    urls: Vec<Case<Vec<String>>>,
    urls_with_indices: Vec<Case<Vec<Indexed>>>,
    hashtags: Vec<Case<Vec<String>>>,
    hashtags_with_indices: Vec<Case<Vec<Indexed>>>,
    cashtags: Vec<Case<Vec<String>>>,
    cashtags_with_indices: Vec<Case<Vec<Indexed>>>,
}

#[derive(Debug, Deserialize)]
struct Case<T> {
    description: String,
    text: String,
    expected: T,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Indexed {
    value: String,
    #[serde(default)]
    list_slug: Option<String>,
    indices: (usize, usize),
}

impl From<Entity> for Indexed {
    fn from(entity: Entity) -> Self {
        Self {
            indices: entity.indices(),
            value: entity.value,
            list_slug: entity.list_slug,
        }
    }
}

fn load_fixture() -> anyhow::Result<Fixture> {
    let raw = std::fs::read_to_string(fixtures_dir().join("extract.yml"))?;
    Ok(serde_yaml::from_str(&raw)?)
}

fn indexed(entities: Vec<Entity>) -> Vec<Indexed> {
    entities.into_iter().map(Indexed::from).collect()
}

fn check<T, F>(cases: Vec<Case<T>>, extract: F)
where
    T: std::fmt::Debug + PartialEq,
    F: Fn(&str) -> T,
{
    for case in cases {
        assert_eq!(extract(&case.text), case.expected, "{}", case.description);
    }
}

#[test]
fn test_fixture_mentions() -> anyhow::Result<()> {
    let tests = load_fixture()?.tests;
    let extractor = Extractor::shared()?;
    check(tests.mentions, |text| extractor.extract_mentioned_screen_names(text));
    check(tests.mentions_with_indices, |text| {
        indexed(extractor.extract_mentioned_screen_names_with_indices(text))
    });
    check(tests.mentions_or_lists_with_indices, |text| {
        indexed(extractor.extract_mentions_or_lists_with_indices(text))
    });
    check(tests.replies, |text| extractor.extract_reply_screenname(text));
    Ok(())
}

#[test]
fn test_fixture_urls() -> anyhow::Result<()> {
    let tests = load_fixture()?.tests;
    let extractor = Extractor::shared()?;
    check(tests.urls, |text| extractor.extract_urls(text));
    check(tests.urls_with_indices, |text| {
        indexed(extractor.extract_urls_with_indices(text))
    });
    Ok(())
}

#[test]
fn test_fixture_hashtags_and_cashtags() -> anyhow::Result<()> {
    let tests = load_fixture()?.tests;
    let extractor = Extractor::shared()?;
    check(tests.hashtags, |text| extractor.extract_hashtags(text));
    check(tests.hashtags_with_indices, |text| {
        indexed(extractor.extract_hashtags_with_indices(text))
    });
    check(tests.cashtags, |text| extractor.extract_cashtags(text));
    check(tests.cashtags_with_indices, |text| {
        indexed(extractor.extract_cashtags_with_indices(text))
    });
    Ok(())
}

#[test]
fn test_mixed_entities() -> anyhow::Result<()> {
    let extractor = Extractor::shared()?;
    let text = "Hello @twitter, check #flutter and $TSLA at http://t.co/xyz";
    let entities = extractor.extract(text, &EntityKind::ALL);

    let found: Vec<(EntityKind, &str, usize, usize)> = entities
        .iter()
        .map(|e| (e.kind, e.value.as_str(), e.start, e.end))
        .collect();
    assert_eq!(
        found,
        vec![
            (EntityKind::Mention, "twitter", 6, 14),
            (EntityKind::Hashtag, "flutter", 22, 30),
            (EntityKind::Cashtag, "TSLA", 35, 40),
            (EntityKind::Url, "http://t.co/xyz", 44, 59),
        ]
    );
    for entity in &entities {
        let slice: String = text
            .chars()
            .skip(entity.start)
            .take(entity.len())
            .collect();
        assert!(slice.ends_with(&entity.value), "{slice} vs {}", entity.value);
    }
    Ok(())
}

#[test]
fn test_entities_with_indices_combines_kinds() -> anyhow::Result<()> {
    let extractor = Extractor::shared()?;
    let entities = extractor.extract_entities_with_indices("@team/devs ship #rust $RUST example.com");
    let kinds: Vec<EntityKind> = entities.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EntityKind::MentionOrList,
            EntityKind::Hashtag,
            EntityKind::Cashtag,
            EntityKind::Url,
        ]
    );
    assert_eq!(entities[0].qualified_value(), "team/devs");
    Ok(())
}

#[test]
fn test_protocol_required_mode() -> anyhow::Result<()> {
    let extractor = Extractor::shared()?.extract_url_without_protocol(false);
    assert_eq!(
        extractor.extract_urls("text: example.com http://foobar.example.com"),
        vec!["http://foobar.example.com"]
    );
    assert!(extractor.extract_urls_with_indices("text: example.com").is_empty());
    Ok(())
}

#[test]
fn test_url_suppresses_inner_entities() -> anyhow::Result<()> {
    let extractor = Extractor::shared()?;
    let entities = extractor.extract(
        "http://example.com/@foo#bar $X",
        &[EntityKind::Mention, EntityKind::Hashtag, EntityKind::Cashtag],
    );
    assert_eq!(entities, vec![Entity::new(EntityKind::Cashtag, "X", 28, 30)]);
    Ok(())
}

#[test]
fn test_trailing_period_not_in_url() -> anyhow::Result<()> {
    let extractor = Extractor::shared()?;
    let urls = extractor.extract_urls_with_indices("see http://example.com/foo.");
    assert_eq!(urls, vec![Entity::new(EntityKind::Url, "http://example.com/foo", 4, 26)]);
    Ok(())
}

#[test]
fn test_custom_tld_lists() -> anyhow::Result<()> {
    let tlds = TldLists::from_yaml("generic: [test]\ncountry: [zz]\n")?;
    let config = PatternConfig::default().with_special_cctlds(["zz"]);
    let library = PatternLibrary::new(&tlds, &config)?;
    let extractor = Extractor::with_config(&library, ExtractorConfig::default());

    assert_eq!(
        extractor.extract_urls("a.test b.com c.zz d.zz/x"),
        vec!["a.test", "c.zz", "d.zz/x"]
    );
    Ok(())
}

#[test]
fn test_repetitive_input_scans_quickly() -> anyhow::Result<()> {
    let extractor = Extractor::shared()?;
    let inputs = [
        "a.".repeat(8000),
        format!("{}.", "é".repeat(8000)),
        format!("http://{}", "a-b.".repeat(4000)),
        "@a#b$c ".repeat(2000),
    ];
    for text in &inputs {
        let started = std::time::Instant::now();
        let entities = extractor.extract(text, &EntityKind::ALL);
        let elapsed = started.elapsed();
        assert!(
            elapsed < std::time::Duration::from_secs(5),
            "{} bytes took {elapsed:?}",
            text.len()
        );
        let chars = text.chars().count();
        assert!(entities.iter().all(|entity| entity.end <= chars));
    }
    assert!(extractor.extract_urls(&inputs[0]).is_empty());
    assert!(extractor.extract_urls(&inputs[1]).is_empty());
    Ok(())
}

#[test]
fn test_concurrent_extraction() -> anyhow::Result<()> {
    let extractor = Extractor::shared()?;
    let text = "RT @alice: #news at https://example.org/a?b=c $ABC";
    let expected = extractor.extract(text, &EntityKind::ALL);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| extractor.extract(text, &EntityKind::ALL)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().ok(), Some(expected.clone()));
        }
    });
    Ok(())
}
