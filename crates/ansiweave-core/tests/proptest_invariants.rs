//! Property-based invariant tests for ansiweave-core.
//!
//! These tests verify structural invariants that must hold for **any** input:
//!
//! 1. Lexing is lossless and offsets are contiguous.
//! 2. Normalization is idempotent (parse ∘ stringify is a fixed point).
//! 3. Closing every open SGR attribute leaves nothing open.
//! 4. Visible-to-raw mapping is monotonic and clamped.
//! 5. Insertion never changes the visible text around the insertion point.

use ansiweave_core::{Registry, Token, TokenStream, close_codes, simplify_codes};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// One SGR attribute opener or closer, as a self-delimiting code group.
fn sgr_group() -> impl Strategy<Value = Vec<u32>> {
    prop_oneof![
        prop::sample::select(vec![
            0u32, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 19, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31,
            37, 39, 40, 44, 49, 50, 51, 52, 53, 54, 55, 59, 60, 64, 65, 73, 74, 75, 90, 97, 100,
            107,
        ])
        .prop_map(|code| vec![code]),
        (0u32..256).prop_map(|n| vec![38, 5, n]),
        (0u32..256, 0u32..256, 0u32..256).prop_map(|(r, g, b)| vec![38, 2, r, g, b]),
        (0u32..256).prop_map(|n| vec![48, 5, n]),
        (0u32..256, 0u32..256, 0u32..256).prop_map(|(r, g, b)| vec![48, 2, r, g, b]),
        (0u32..256).prop_map(|n| vec![58, 5, n]),
    ]
}

fn sgr_codes() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(sgr_group(), 0..16).prop_map(|groups| groups.concat())
}

fn sgr_sequence(codes: &[u32]) -> String {
    let joined: Vec<String> = codes.iter().map(u32::to_string).collect();
    format!("\x1b[{}m", joined.join(";"))
}

/// A fragment of ANSI text with no stray escape bytes.
fn clean_piece() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z0-9 .,é─-]{1,12}",
        3 => prop::collection::vec(sgr_group(), 1..3).prop_map(|g| sgr_sequence(&g.concat())),
        1 => Just("\x1b[m".to_string()),
        1 => "[a-z]{1,8}".prop_map(|host| format!("\x1b]8;;https://{host}\x07")),
        1 => "[a-z]{1,8}".prop_map(|host| format!("\x1b]8;id={host};https://{host}\x1b\\")),
        1 => Just("\x1b]8;;\x07".to_string()),
        1 => Just("\x1b]8;;\x1b\\".to_string()),
        1 => (0u8..100).prop_map(|n| format!("\x1b[{n}A")),
        1 => (0u8..50, 0u8..50).prop_map(|(r, c)| format!("\x1b[{r};{c}H")),
    ]
}

/// A fragment that may also contain escape bytes no matcher claims.
fn any_piece() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => clean_piece(),
        1 => Just("\x1b".to_string()),
        1 => Just("\x1b[?25l".to_string()),
    ]
}

fn clean_text() -> impl Strategy<Value = String> {
    prop::collection::vec(clean_piece(), 0..14).prop_map(|pieces| pieces.concat())
}

fn any_text() -> impl Strategy<Value = String> {
    prop::collection::vec(any_piece(), 0..14).prop_map(|pieces| pieces.concat())
}

fn assert_contiguous(stream: &TokenStream, total: usize) {
    let mut expected = 0;
    for token in stream {
        assert_eq!(token.start(), expected, "gap or overlap at {token:?}");
        assert!(!token.is_empty());
        expected = token.end();
    }
    assert_eq!(expected, total);
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Lexing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tokenize_is_lossless(text in any_text()) {
        let stream = Registry::standard().tokenize(&text);
        prop_assert_eq!(stream.to_string(), text.clone());
        assert_contiguous(&stream, text.len());
    }

    #[test]
    fn parse_offsets_are_contiguous(text in any_text()) {
        let stream = Registry::standard().parse(&text).unwrap();
        let rendered = stream.to_string();
        assert_contiguous(&stream, rendered.len());
    }

    #[test]
    fn text_tokens_never_adjacent(text in any_text()) {
        let stream = Registry::standard().tokenize(&text);
        for pair in stream.tokens().windows(2) {
            prop_assert!(
                !(matches!(pair[0], Token::Text(_)) && matches!(pair[1], Token::Text(_)))
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Normalization
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn normalization_is_idempotent(text in any_text()) {
        let registry = Registry::standard();
        let once = registry.parse(&text).unwrap().to_string();
        let twice = registry.parse(&once).unwrap().to_string();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalization_keeps_visible_text(text in any_text()) {
        let registry = Registry::standard();
        let stream = registry.parse(&text).unwrap();
        prop_assert_eq!(stream.strip(), registry.strip_ansi(&text));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. SGR algebra
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn closing_closes_everything(codes in sgr_codes()) {
        let mut all = codes.clone();
        all.extend(close_codes(&codes).unwrap());
        prop_assert!(simplify_codes(&all).unwrap().is_empty());
    }

    #[test]
    fn reset_after_simplify_is_empty(codes in sgr_codes()) {
        let mut simplified = simplify_codes(&codes).unwrap();
        simplified.push(0);
        prop_assert!(simplify_codes(&simplified).unwrap().is_empty());
    }

    #[test]
    fn simplify_is_a_fixed_point(codes in sgr_codes()) {
        let simplified = simplify_codes(&codes).unwrap();
        prop_assert_eq!(simplify_codes(&simplified).unwrap(), simplified);
    }

    #[test]
    fn one_close_code_per_open_attribute(codes in sgr_codes()) {
        let closes = close_codes(&codes).unwrap();
        let reopened = simplify_codes(&simplify_codes(&codes).unwrap()).unwrap();
        prop_assert_eq!(closes, close_codes(&reopened).unwrap());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Stripping and positions
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn strip_has_no_escapes(text in clean_text()) {
        prop_assert!(!Registry::standard().strip_ansi(&text).contains('\x1b'));
    }

    #[test]
    fn strip_leaves_nothing_recognizable(text in any_text()) {
        let registry = Registry::standard();
        prop_assert!(!registry.tokenize(&registry.strip_ansi(&text)).has_escapes());
    }

    #[test]
    fn position_is_monotonic_and_clamped(text in any_text()) {
        let stream = Registry::standard().parse(&text).unwrap();
        let rendered = stream.to_string();
        let visible = stream.visible_len();
        let mut previous = 0;
        for pos in 0..=visible + 2 {
            let raw = stream.ansi_position(pos);
            prop_assert!(raw >= previous);
            prop_assert!(raw <= rendered.len());
            prop_assert!(rendered.is_char_boundary(raw));
            previous = raw;
        }
        prop_assert_eq!(stream.ansi_position(visible + 5), stream.raw_len());
    }

    #[test]
    fn position_agrees_with_visible_prefix(text in clean_text(), pos in 0usize..40) {
        let registry = Registry::standard();
        let stream = registry.parse(&text).unwrap();
        let rendered = stream.to_string();
        let raw = stream.ansi_position(pos);
        let expected: String = stream.strip().chars().take(pos).collect();
        prop_assert_eq!(registry.strip_ansi(&rendered[..raw]), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Insertion
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn insert_preserves_visible_text(
        text in clean_text(),
        pos in 0usize..40,
        value in "[a-z\n]{0,4}",
    ) {
        let registry = Registry::standard();
        let visible: Vec<char> = registry.parse(&text).unwrap().strip().chars().collect();
        let at = pos.min(visible.len());
        let mut expected: String = visible[..at].iter().collect();
        expected.push_str(&value);
        expected.extend(&visible[at..]);
        let out = registry.insert_at(&text, pos, &value).unwrap();
        prop_assert_eq!(registry.strip_ansi(&out), expected);
    }

    #[test]
    fn inserted_value_starts_clean(text in clean_text(), pos in 0usize..40) {
        let registry = Registry::standard();
        let out = registry.insert_at(&text, pos, "\u{1}").unwrap();
        let (before, _) = out.split_once('\u{1}').unwrap();
        let stream = registry.tokenize(before);
        prop_assert!(registry.close_sequences(&stream).unwrap().is_empty());
    }
}
