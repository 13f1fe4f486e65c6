//! Parsing behavior through the public table API.

use crate::helpers::*;
use kvquery::{ErrorKind, ParseFlags, QueryError, QueryTable};

#[test]
fn test_simple_pairs() {
    let table = parsed("key1=value1&key2=value2", ParseFlags::DEFAULT);
    assert_eq!(table.count(), 2);
    assert_eq!(table.get_value("key1"), Some(&b"value1"[..]));
    assert_eq!(table.get_value("key2"), Some(&b"value2"[..]));
}

#[test]
fn test_auto_decode() {
    let table = parsed("name=John+Doe&lang=zh%2Fcn", ParseFlags::DEFAULT);
    assert_eq!(
        pairs_of(&table),
        pairs(&[("name", "John Doe"), ("lang", "zh/cn")])
    );
    assert!(table.get(0).unwrap().is_encoded);
}

#[test]
fn test_leading_question_mark() {
    let table = parsed("?a=1", ParseFlags::DEFAULT);
    assert_eq!(pairs_of(&table), pairs(&[("a", "1")]));

    // Only the first one is stripped
    let table = parsed("??a=1", ParseFlags::DEFAULT);
    assert_eq!(pairs_of(&table), pairs(&[("?a", "1")]));
}

#[test]
fn test_empty_key_yields_nothing() {
    let table = parsed("=value", ParseFlags::DEFAULT);
    assert_eq!(table.count(), 0);
}

#[test]
fn test_malformed_escape_stays_literal() {
    let table = parsed("bad=%GG&short=%4&tail=%", ParseFlags::DEFAULT);
    assert_eq!(
        pairs_of(&table),
        pairs(&[("bad", "%GG"), ("short", "%4"), ("tail", "%")])
    );
}

#[test]
fn test_capacity_non_strict_truncates() {
    let mut table = QueryTable::new(2, ParseFlags::DEFAULT).unwrap();
    table.parse("a=1&b=2&c=3").unwrap();
    assert_eq!(pairs_of(&table), pairs(&[("a", "1"), ("b", "2")]));
}

#[test]
fn test_capacity_strict_errors() {
    let mut table = QueryTable::new(2, ParseFlags::DEFAULT | ParseFlags::STRICT).unwrap();
    let err = table.parse("a=1&b=2&c=3").unwrap_err();
    assert!(err.is_too_many_pairs());
    assert_eq!(err.kind().description(), "Too many key-value pairs");
    // Pairs stored before the overflow remain readable
    assert_eq!(table.count(), 2);
}

#[test]
fn test_count_is_min_of_segments_and_capacity() {
    for capacity in 1u16..=6 {
        let mut table = QueryTable::new(capacity, ParseFlags::DEFAULT).unwrap();
        table.parse("a=1&b=2&c=3&d=4").unwrap();
        assert_eq!(table.count(), capacity.min(4));
    }
}

#[test]
fn test_empty_input_is_an_error() {
    let mut table = QueryTable::new(0, ParseFlags::DEFAULT).unwrap();
    let err = table.parse("").unwrap_err();
    assert_eq!(err, QueryError::EmptyString);
    assert_eq!(err.kind(), ErrorKind::EmptyString);
    assert_eq!(ErrorKind::EmptyString.to_string(), "Empty string");
}

#[test]
fn test_flags_apply_in_order() {
    let flags = ParseFlags::DEFAULT
        | ParseFlags::LOWERCASE_KEYS
        | ParseFlags::TRIM_VALUES
        | ParseFlags::KEEP_EMPTY;
    let table = parsed("User=+Alice+&EMPTY=+++&Id=7", flags);
    assert_eq!(
        pairs_of(&table),
        pairs(&[("user", "Alice"), ("empty", ""), ("id", "7")])
    );
}

#[test]
fn test_duplicates_kept_in_order() {
    let flags = ParseFlags::DEFAULT | ParseFlags::MERGE_DUPLICATES;
    let table = parsed("tag=a&x=1&tag=b&tag=c", flags);
    assert_eq!(table.count(), 4);
    assert_eq!(table.get_value("tag"), Some(&b"a"[..]));

    let mut out: [&[u8]; 4] = [&[]; 4];
    let n = table.get_all_values("tag", &mut out);
    assert_eq!(&out[..n], &[&b"a"[..], &b"b"[..], &b"c"[..]]);
}

#[test]
fn test_stringify_round_trip() {
    let source = "name=John+Doe&path=%2Fhome%2Fuser&q=a%26b";
    let table = parsed(source, ParseFlags::DEFAULT);
    // %26 decodes to a separator before tokenizing
    assert_eq!(
        pairs_of(&table),
        pairs(&[("name", "John Doe"), ("path", "/home/user"), ("q", "a")])
    );

    let encoded = table.to_query_string(true);
    assert_eq!(encoded, "name=John+Doe&path=%2Fhome%2Fuser&q=a");
    let again = parsed(&encoded, ParseFlags::DEFAULT);
    assert_eq!(pairs_of(&again), pairs_of(&table));
}

#[test]
fn test_stringify_measure_then_fill() {
    let table = parsed("a=1&b=2", ParseFlags::DEFAULT);
    let needed = table.stringify(&mut [], false);
    assert_eq!(needed, 7);

    let mut exact = vec![0u8; needed];
    assert_eq!(table.stringify(&mut exact, false), 7);
    assert_eq!(exact, b"a=1&b=2");
}
