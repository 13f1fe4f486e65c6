//! Prometheus metrics for parse outcomes.
//!
//! ```rust
//! use kvquery::observability::QueryMetrics;
//! use kvquery::{ParseFlags, QueryTable};
//!
//! let metrics = QueryMetrics::new()?;
//! let mut table = QueryTable::new(0, ParseFlags::DEFAULT)?;
//! let query = "a=1&b=2";
//! let result = table.parse(query);
//! metrics.record_parse(query.len(), &result, &table);
//! println!("{}", metrics.encode()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod metrics;

pub use metrics::QueryMetrics;
