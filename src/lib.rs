//! kvquery - bounded query-string parsing.
//!
//! Parses `application/x-www-form-urlencoded` style strings into a table of
//! key/value pairs with a fixed capacity, an arena per parse and a pluggable
//! allocator. A zero-copy path parses into caller storage without touching
//! the heap.
//!
//! # Features
//!
//! - **Bounded tables**: capacity fixed at creation; overflow truncates or,
//!   in strict mode, is an error
//! - **Tolerant decoding**: `%XX` and `+` decoded once, malformed escapes kept
//!   as literal text
//! - **Pooled storage**: strings bump-allocated from one arena per parse,
//!   with a counted spill to direct allocation
//! - **Pluggable allocators**: every buffer returns to the allocator that
//!   produced it
//! - **Zero-copy fast path**: pairs borrowed from the input or a stack buffer
//!
//! # Example
//!
//! ```rust
//! use kvquery::{ParseFlags, QueryTable};
//!
//! let mut table = QueryTable::new(16, ParseFlags::DEFAULT | ParseFlags::SORT_KEYS)?;
//! table.parse("?page=2&q=rust+parser&tag=cli&tag=fast")?;
//!
//! assert_eq!(table.get_value("q"), Some(&b"rust parser"[..]));
//! assert_eq!(table.values_of(b"tag").count(), 2);
//! assert_eq!(table.to_query_string(true), "page=2&q=rust+parser&tag=cli&tag=fast");
//! # Ok::<(), kvquery::QueryError>(())
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod alloc;
pub mod charclass;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod fast;
pub mod flags;
pub mod logging;
pub mod observability;
pub mod pool;
pub mod query;
pub mod scan;

// Re-exports for convenience
pub use crate::alloc::{Allocator, BudgetAllocator, SharedAllocator, SystemAllocator};
pub use error::{AllocError, ErrorKind, QueryError, Result};
pub use flags::ParseFlags;
pub use pool::PoolStats;
pub use query::{Pair, QueryTable, DEFAULT_MAX_PAIRS};
