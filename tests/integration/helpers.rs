//! Test helpers and utilities

use std::sync::Arc;

use kvquery::{BudgetAllocator, ParseFlags, QueryTable, SharedAllocator};

/// Table with default capacity parsed from `query`.
pub fn parsed(query: &str, flags: ParseFlags) -> QueryTable {
    let mut table = QueryTable::new(0, flags).expect("Failed to create table");
    table.parse(query).expect("Parse failed");
    table
}

/// Pairs of `table` as owned strings, in table order.
pub fn pairs_of(table: &QueryTable) -> Vec<(String, String)> {
    table
        .iter()
        .map(|p| (p.key_str().into_owned(), p.value_str().into_owned()))
        .collect()
}

/// Owned pair list from string literals.
pub fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Budget allocator plus a shared handle to it.
pub fn budget(bytes: usize) -> (Arc<BudgetAllocator>, SharedAllocator) {
    let budget = Arc::new(BudgetAllocator::new(bytes));
    let shared: SharedAllocator = budget.clone();
    (budget, shared)
}

/// Assert every byte handed out by `budget` has come back.
#[track_caller]
pub fn assert_no_leaks(budget: &BudgetAllocator) {
    assert_eq!(budget.in_use(), 0, "bytes still in use");
    assert_eq!(
        budget.allocations(),
        budget.releases(),
        "allocations and releases differ"
    );
}
