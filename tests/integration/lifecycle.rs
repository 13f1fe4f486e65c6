//! Table lifecycle: reset, clone, filter, sort, iterate, free.

use std::ops::ControlFlow;

use crate::helpers::*;
use kvquery::{ParseFlags, QueryTable};

#[test]
fn test_reset_then_parse_matches_fresh_table() {
    let mut reused = QueryTable::new(0, ParseFlags::DEFAULT).unwrap();
    reused.parse("x=%20&y=1&z=2").unwrap();
    reused.reset();
    reused.reset();
    assert_eq!(reused.count(), 0);

    reused.parse("a=1&b=hello+world").unwrap();
    let fresh = parsed("a=1&b=hello+world", ParseFlags::DEFAULT);
    assert_eq!(pairs_of(&reused), pairs_of(&fresh));
}

#[test]
fn test_clone_is_independent() {
    let mut table = parsed("a=1&b=2", ParseFlags::DEFAULT);
    let copy = table.try_clone().unwrap();
    assert_eq!(pairs_of(&copy), pairs_of(&table));
    assert_eq!(copy.max_pairs(), table.max_pairs());
    assert_eq!(copy.flags(), table.flags());

    table.parse("c=3").unwrap();
    table.filter(|_| false);
    assert_eq!(pairs_of(&copy), pairs(&[("a", "1"), ("b", "2")]));
}

#[test]
fn test_filter_keeps_relative_order() {
    let mut table = parsed("a=1&drop=x&b=2&drop=y&c=3", ParseFlags::DEFAULT);
    let kept = table.filter(|p| p.key != b"drop");
    assert_eq!(kept, 3);
    assert_eq!(
        pairs_of(&table),
        pairs(&[("a", "1"), ("b", "2"), ("c", "3")])
    );
}

#[test]
fn test_sort_by_key_then_custom() {
    let mut table = parsed("zeta=1&alpha=2&al=3", ParseFlags::DEFAULT);
    table.sort();
    assert_eq!(
        pairs_of(&table),
        pairs(&[("al", "3"), ("alpha", "2"), ("zeta", "1")])
    );

    table.sort_by(|a, b| a.value.cmp(b.value));
    assert_eq!(
        pairs_of(&table),
        pairs(&[("zeta", "1"), ("alpha", "2"), ("al", "3")])
    );
}

#[test]
fn test_iterate_early_stop() {
    let table = parsed("a=1&b=2&c=3&d=4", ParseFlags::DEFAULT);
    let mut keys = Vec::new();
    let visited = table.iterate(|p| {
        if p.value == b"3" {
            return ControlFlow::Break(());
        }
        keys.push(p.key_str().into_owned());
        ControlFlow::Continue(())
    });
    assert_eq!(visited, 2);
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn test_set_flags_affects_next_parse() {
    let mut table = QueryTable::new(0, ParseFlags::DEFAULT).unwrap();
    table.parse("A=1").unwrap();
    assert!(table.has_key("A"));

    table.set_flags(ParseFlags::DEFAULT | ParseFlags::LOWERCASE_KEYS);
    table.parse("A=1").unwrap();
    assert!(table.has_key("a"));
    assert!(!table.has_key("A"));
}

#[test]
fn test_free_consumes_table() {
    let (budget, shared) = budget(1 << 16);
    let mut table = QueryTable::with_allocator(0, ParseFlags::DEFAULT, shared).unwrap();
    table.parse("a=1&b=%20").unwrap();
    table.free();
    assert_no_leaks(&budget);
}
