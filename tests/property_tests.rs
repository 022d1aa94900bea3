//! Property-based tests for the diff parser and naming rules.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use wikistore::core::naming::{capitalize_first, normalize_segments, Namer};
use wikistore::core::types::{Revision, RevisionRange, VersionId};
use wikistore::store::diff::{parse, parse_hunk_header};
use wikistore::store::{LineKind, LineNumber, Locator};

/// Strategy for one body line of a hunk.
fn body_line() -> impl Strategy<Value = String> {
    let text = "[a-zA-Z0-9 ,.]{0,20}";
    prop_oneof![
        text.prop_map(|t| format!(" {}", t)),
        text.prop_map(|t| format!("+{}", t)),
        text.prop_map(|t| format!("-{}", t)),
        Just("\\ No newline at end of file".to_string()),
    ]
}

/// Strategy for a hunk: header numbers plus body lines.
fn hunk() -> impl Strategy<Value = (u32, u32, Vec<String>)> {
    (1u32..10_000, 1u32..10_000, prop::collection::vec(body_line(), 0..30))
}

/// Strategy for a complete diff with file headers.
fn diff_text() -> impl Strategy<Value = String> {
    prop::collection::vec(hunk(), 1..5).prop_map(|hunks| {
        let mut out = String::from("diff --git a/P.md b/P.md\nindex 1111111..2222222 100644\n--- a/P.md\n+++ b/P.md\n");
        for (left, right, body) in hunks {
            out.push_str(&format!("@@ -{},3 +{},3 @@\n", left, right));
            for line in body {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    })
}

/// Strategy for hex version ids.
fn version_id() -> impl Strategy<Value = String> {
    "[0-9a-f]{7,40}"
}

proptest! {
    #[test]
    fn parse_is_deterministic(raw in diff_text()) {
        prop_assert_eq!(parse(&raw), parse(&raw));
    }

    #[test]
    fn no_backslash_or_header_lines(raw in diff_text()) {
        for line in parse(&raw) {
            prop_assert!(!line.text.starts_with('\\'));
            prop_assert!(!line.text.starts_with("diff --git"));
            prop_assert!(!line.text.starts_with("index "));
        }
    }

    #[test]
    fn one_row_per_content_line(raw in diff_text()) {
        let expected = raw
            .lines()
            .skip(4)
            .filter(|l| !l.starts_with('\\'))
            .count();
        prop_assert_eq!(parse(&raw).len(), expected);
    }

    #[test]
    fn counters_increase_within_hunk(raw in diff_text()) {
        let mut last_left: Option<u32> = None;
        let mut last_right: Option<u32> = None;

        for line in parse(&raw) {
            match line.kind {
                LineKind::HunkHeader => {
                    prop_assert_eq!(line.left, LineNumber::HunkMarker);
                    prop_assert_eq!(line.right, LineNumber::HunkMarker);
                    last_left = None;
                    last_right = None;
                }
                LineKind::Added => {
                    prop_assert_eq!(line.left, LineNumber::Blank);
                    let n = line.right.value().unwrap();
                    prop_assert!(last_right.map_or(true, |prev| n == prev + 1));
                    last_right = Some(n);
                }
                LineKind::Removed => {
                    prop_assert_eq!(line.right, LineNumber::Blank);
                    let n = line.left.value().unwrap();
                    prop_assert!(last_left.map_or(true, |prev| n == prev + 1));
                    last_left = Some(n);
                }
                LineKind::Context => {
                    let l = line.left.value().unwrap();
                    let r = line.right.value().unwrap();
                    prop_assert!(last_left.map_or(true, |prev| l == prev + 1));
                    prop_assert!(last_right.map_or(true, |prev| r == prev + 1));
                    last_left = Some(l);
                    last_right = Some(r);
                }
            }
        }
    }

    #[test]
    fn hunk_header_numbers_start_counters((left, right, body) in hunk()) {
        let header = format!("@@ -{},7 +{},9 @@ context", left, right);
        prop_assert_eq!(parse_hunk_header(&header), Some((left, right)));

        let mut raw = format!("{}\n", header);
        for line in &body {
            raw.push_str(line);
            raw.push('\n');
        }
        let rows = parse(&raw);
        if let Some(first_context) = rows.iter().find(|l| l.kind == LineKind::Context) {
            prop_assert!(first_context.left.value().unwrap() >= left);
            prop_assert!(first_context.right.value().unwrap() >= right);
        }
    }

    #[test]
    fn arbitrary_text_never_panics(raw in "(?s).{0,400}") {
        let _ = parse(&raw);
    }

    #[test]
    fn wikify_has_no_whitespace(title in "[ a-zA-Z0-9?*#]{0,40}") {
        let name = Namer::default().wikify(&title);
        prop_assert!(!name.contains(char::is_whitespace));
        prop_assert!(!name.contains(&['?', '*', '#'][..]));
    }

    #[test]
    fn wikify_unwikify_round_trip(words in prop::collection::vec("[A-Za-z0-9]{1,8}", 1..5)) {
        let namer = Namer::default();
        let title = words.join(" ");
        prop_assert_eq!(namer.unwikify(&namer.wikify(&title)), title);
    }

    #[test]
    fn capitalize_is_idempotent(name in "[a-zA-Z0-9-]{0,20}") {
        let once = capitalize_first(&name);
        prop_assert_eq!(capitalize_first(&once), once.clone());
        prop_assert_eq!(once.len(), name.len());
    }

    #[test]
    fn normalized_segments_never_climb(raw in "[a-z./\\\\]{0,30}") {
        if let Some(segments) = normalize_segments(&raw) {
            prop_assert!(!segments.is_empty());
            for segment in segments {
                prop_assert!(segment != ".." && segment != "." && !segment.is_empty());
                prop_assert!(!segment.contains('/'));
            }
        }
    }

    #[test]
    fn version_ids_normalize_to_lowercase(id in version_id()) {
        let upper = VersionId::new(id.to_uppercase()).unwrap();
        prop_assert_eq!(upper.as_str(), id.as_str());
    }

    #[test]
    fn range_display_parses_back(a in version_id(), b in version_id()) {
        let range = RevisionRange::new(VersionId::new(a).unwrap(), VersionId::new(b).unwrap());
        let parsed: RevisionRange = range.to_string().parse().unwrap();
        prop_assert_eq!(parsed, range);
    }

    #[test]
    fn show_urls_parse_back(
        name in "[A-Za-z][A-Za-z0-9 &]{0,15}",
        id in prop::option::of(version_id()),
    ) {
        let locator = Locator::new("/kb");
        let revision = match id {
            Some(id) => Revision::Version(VersionId::new(id).unwrap()),
            None => Revision::Current,
        };
        let url = locator.show(&name, &revision);
        prop_assert_eq!(locator.parse_show(&url), Some((name, revision)));
    }
}
