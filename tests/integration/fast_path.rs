//! Zero-copy fast path.

use kvquery::fast::{fast_parse, DecodeScratch, FAST_DECODE_CAPACITY};
use kvquery::scan::{count_pairs, is_valid};
use kvquery::{Pair, ParseFlags};

#[test]
fn test_fast_parse_plain() {
    let mut scratch = DecodeScratch::new();
    let mut out = [Pair::EMPTY; 10];
    let n = fast_parse(b"a=1&b=2&c=3", &mut scratch, &mut out, ParseFlags::NONE);
    assert_eq!(n, 3);
    assert_eq!(out[1].key, b"b");
    assert_eq!(out[1].value, b"2");
}

#[test]
fn test_fast_parse_limits_to_output() {
    let mut scratch = DecodeScratch::new();
    let mut out = [Pair::EMPTY; 3];
    let n = fast_parse(
        b"a=1&b=2&c=3&d=4&e=5&f=6",
        &mut scratch,
        &mut out,
        ParseFlags::NONE,
    );
    assert_eq!(n, 3);
}

#[test]
fn test_fast_parse_declines() {
    let mut scratch = DecodeScratch::new();
    let mut empty: [Pair<'_>; 0] = [];
    assert_eq!(fast_parse(b"a=1", &mut scratch, &mut empty, ParseFlags::NONE), 0);

    let mut out = [Pair::EMPTY; 2];
    assert_eq!(fast_parse(b"", &mut scratch, &mut out, ParseFlags::NONE), 0);

    let long = format!("q={}", "%41".repeat(FAST_DECODE_CAPACITY));
    let mut scratch = DecodeScratch::new();
    assert_eq!(
        fast_parse(long.as_bytes(), &mut scratch, &mut out, ParseFlags::AUTO_DECODE),
        0
    );
}

#[test]
fn test_fast_parse_decodes() {
    let mut scratch = DecodeScratch::default();
    let mut out = [Pair::EMPTY; 4];
    let n = fast_parse(
        b"?city=S%C3%A3o+Paulo",
        &mut scratch,
        &mut out,
        ParseFlags::AUTO_DECODE,
    );
    assert_eq!(n, 1);
    assert_eq!(out[0].value_str(), "S\u{e3}o Paulo");
    assert!(out[0].is_encoded);
}

#[test]
fn test_validation_and_counting() {
    assert_eq!(count_pairs(b"?a=1&b=2"), 2);
    assert_eq!(count_pairs(b"a&&b&"), 2);
    assert!(is_valid(b"?a=1&b=%20"));
    assert!(!is_valid(b"a=1;b=2"));
    assert!(!is_valid(b""));
}
