//! Property tests over arbitrary and entity-shaped text.

use codex_text_entities::{EntityKind, Extractor};
use proptest::prelude::*;

const FRAGMENTS: &[&str] = &[
    "@user",
    "@user/list",
    "#tag",
    "＃タグ",
    "$TSLA",
    "$BRK.A",
    "example.com",
    "http://t.co/abc",
    "https://пример.рф/путь?x=1",
    "😀",
    "RT",
];

/// Text built from fragments that exercise every scanner.
fn entity_text() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        3 => prop::sample::select(FRAGMENTS).prop_map(str::to_string),
        1 => "[ .,:/@#$_a-z0-9é]{0,6}",
    ];
    prop::collection::vec(fragment, 0..12).prop_map(|parts| parts.concat())
}

fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![entity_text(), any::<String>()]
}

proptest! {
    #[test]
    fn entities_are_sorted_and_disjoint(text in any_text()) {
        let extractor = Extractor::shared().unwrap();
        for kind in EntityKind::ALL {
            let entities = extractor.extract(&text, &[kind]);
            for pair in entities.windows(2) {
                prop_assert!(pair[0].end <= pair[1].start, "{pair:?}");
            }
        }
        let combined = extractor.extract_entities_with_indices(&text);
        for pair in combined.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start, "{pair:?}");
        }
    }

    #[test]
    fn entities_map_back_onto_the_text(text in any_text()) {
        let extractor = Extractor::shared().unwrap();
        let chars: Vec<char> = text.chars().collect();
        for entity in extractor.extract(&text, &EntityKind::ALL) {
            prop_assert!(entity.start < entity.end);
            prop_assert!(entity.end <= chars.len());
            let covered: String = chars[entity.start..entity.end].iter().collect();
            prop_assert!(
                covered.ends_with(&entity.qualified_value()),
                "{covered:?} does not end with {:?}",
                entity.qualified_value()
            );
        }
    }

    #[test]
    fn extraction_is_deterministic(text in any_text()) {
        let extractor = Extractor::shared().unwrap();
        let first = extractor.extract(&text, &EntityKind::ALL);
        let second = extractor.extract(&text, &EntityKind::ALL);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let extractor = Extractor::shared().unwrap();
        let repaired = String::from_utf8_lossy(&bytes).chars().count();
        for entity in extractor.extract_from_bytes(&bytes, &EntityKind::ALL) {
            prop_assert!(entity.end <= repaired);
            prop_assert!(!entity.value.contains('\u{FFFD}'), "{:?}", entity.value);
        }
    }
}
