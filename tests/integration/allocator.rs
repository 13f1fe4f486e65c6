//! Allocator accounting: every buffer comes back exactly once.

use std::sync::Arc;

use crate::helpers::*;
use kvquery::alloc::Allocator;
use kvquery::{AllocError, BudgetAllocator, ParseFlags, QueryTable, SharedAllocator};

#[test]
fn test_parse_reset_releases_everything() {
    let (budget, shared) = budget(1 << 16);
    let mut table = QueryTable::with_allocator(0, ParseFlags::DEFAULT, shared).unwrap();

    for query in ["a=1&b=2", "x=%41%42&y=z+w", "?k", "p=1&p=2&p=3"] {
        table.parse(query).unwrap();
        assert!(budget.in_use() > 0);
    }
    table.reset();
    assert_no_leaks(&budget);
    assert!(budget.allocations() > 0);
}

#[test]
fn test_clone_and_filter_release() {
    let (budget, shared) = budget(1 << 16);
    let mut table = QueryTable::with_allocator(0, ParseFlags::DEFAULT, shared).unwrap();
    table.parse("a=1&b=2&c=%20x").unwrap();

    let mut copy = table.try_clone().unwrap();
    copy.filter(|p| p.key == b"b");
    assert_eq!(copy.count(), 1);

    drop(copy);
    drop(table);
    assert_no_leaks(&budget);
}

#[test]
fn test_arena_refused_falls_back_to_direct() {
    let (budget, shared) = budget(64);
    let mut table = QueryTable::with_allocator(0, ParseFlags::NONE, shared)
        .unwrap()
        .with_pool_slack(4096);

    table.parse("a=1&b=2").unwrap();
    let stats = table.pool_stats();
    assert!(!stats.present);
    assert_eq!(table.count(), 2);
    assert!(budget.failures() >= 1);

    table.reset();
    assert_no_leaks(&budget);
}

#[test]
fn test_exhausted_budget_is_memory_error() {
    let (budget, shared) = budget(3);
    let mut table = QueryTable::with_allocator(0, ParseFlags::NONE, shared)
        .unwrap()
        .with_pool_slack(4096);

    let err = table.parse("a=1&b=2").unwrap_err();
    assert!(err.is_memory());
    assert_eq!(table.count(), 1);
    assert_eq!(table.get_value("a"), Some(&b"1"[..]));

    drop(table);
    assert_no_leaks(&budget);
}

#[test]
fn test_swapped_allocator_gets_only_new_buffers() {
    let (first, first_shared) = budget(1 << 16);
    let (second, second_shared) = budget(1 << 16);

    let mut table = QueryTable::with_allocator(0, ParseFlags::DEFAULT, first_shared).unwrap();
    table.parse("a=%20").unwrap();
    let first_allocations = first.allocations();

    table.set_allocator(second_shared);
    table.parse("b=2").unwrap();
    assert_eq!(first.allocations(), first_allocations);
    assert!(second.allocations() > 0);

    table.free();
    assert_no_leaks(&first);
    assert_no_leaks(&second);
}

/// Allocator that refuses everything.
#[derive(Debug)]
struct Refusing;

impl Allocator for Refusing {
    fn allocate(&self, size: usize) -> Result<Vec<u8>, AllocError> {
        Err(AllocError { requested: size })
    }

    fn name(&self) -> &'static str {
        "refusing"
    }
}

#[test]
fn test_custom_allocator() {
    let shared: SharedAllocator = Arc::new(Refusing);
    let mut table = QueryTable::with_allocator(4, ParseFlags::DEFAULT, shared).unwrap();
    assert_eq!(table.allocator_name(), "refusing");

    let err = table.parse("a=1").unwrap_err();
    assert!(err.is_memory());
    assert_eq!(table.count(), 0);

    // A zero budget refuses every non-empty string
    let budget = Arc::new(BudgetAllocator::new(0));
    let shared: SharedAllocator = budget.clone();
    table.set_allocator(shared);
    assert!(table.parse("a=1").unwrap_err().is_memory());
    assert_eq!(budget.in_use(), 0);
}
