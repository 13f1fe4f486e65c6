//! Pair table: storage, lifecycle and ownership of parsed pairs.
//!
//! A [`QueryTable`] owns every key and value it stores. Strings come either
//! from the per-parse [`StringPool`] arena or from individual allocations,
//! and each stored [`Slot`] records which one, so reset, filter and drop
//! release each string exactly once.
//!
//! # Example
//!
//! ```rust
//! use kvquery::{ParseFlags, QueryTable};
//!
//! let mut table = QueryTable::new(0, ParseFlags::DEFAULT)?;
//! table.parse("name=John+Doe&lang=zh%2Fcn")?;
//!
//! assert_eq!(table.count(), 2);
//! assert_eq!(table.get_value("name"), Some(&b"John Doe"[..]));
//! assert_eq!(table.get_value("lang"), Some(&b"zh/cn"[..]));
//! # Ok::<(), kvquery::QueryError>(())
//! ```

mod ops;
mod parser;

use std::borrow::Cow;
use std::mem;

use tracing::debug;

use crate::alloc::{self, DirectBuf, SharedAllocator};
use crate::error::{AllocError, Result};
use crate::flags::ParseFlags;
use crate::pool::{PoolStats, Slot, StringPool, DEFAULT_POOL_SLACK};

pub use ops::compare_keys;

/// Capacity used when a table is created with `max_pairs == 0`.
pub const DEFAULT_MAX_PAIRS: u16 = 128;

/// One key/value pair, borrowed from a table or from fast-path input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pair<'a> {
    pub key: &'a [u8],
    pub value: &'a [u8],
    /// Whether the query was percent/plus-decoded (set for the whole parse).
    pub is_encoded: bool,
}

impl<'a> Pair<'a> {
    /// Pair with empty key and value.
    pub const EMPTY: Pair<'static> = Pair {
        key: &[],
        value: &[],
        is_encoded: false,
    };

    /// Key as text, with invalid UTF-8 replaced.
    pub fn key_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.key)
    }

    /// Value as text, with invalid UTF-8 replaced.
    pub fn value_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.value)
    }
}

/// Table-owned pair.
#[derive(Debug)]
struct StoredPair {
    key: Slot,
    value: Slot,
    is_encoded: bool,
}

/// Where the decoded copy of the last query lives.
#[derive(Debug)]
enum DecodeBuffer {
    None,
    /// Allocated and owned by the table.
    Owned(DirectBuf),
    /// Written into a caller buffer; only the decoded length is kept.
    External { len: usize },
}

/// Parsed query string with bounded capacity.
#[derive(Debug)]
pub struct QueryTable {
    pairs: Vec<StoredPair>,
    max_pairs: u16,
    flags: ParseFlags,
    pool: StringPool,
    decode: DecodeBuffer,
    allocator: SharedAllocator,
    pool_slack: usize,
}

#[inline]
fn view<'a>(pool: &'a StringPool, pair: &'a StoredPair) -> Pair<'a> {
    Pair {
        key: pool.get(&pair.key),
        value: pool.get(&pair.value),
        is_encoded: pair.is_encoded,
    }
}

impl QueryTable {
    /// Create a table holding up to `max_pairs` pairs (0 = [`DEFAULT_MAX_PAIRS`])
    /// using the system allocator.
    pub fn new(max_pairs: u16, flags: ParseFlags) -> Result<Self> {
        Self::with_allocator(max_pairs, flags, alloc::system())
    }

    /// Create a table whose strings, pools and decode buffers come from
    /// `allocator`.
    pub fn with_allocator(
        max_pairs: u16,
        flags: ParseFlags,
        allocator: SharedAllocator,
    ) -> Result<Self> {
        let max_pairs = if max_pairs == 0 {
            DEFAULT_MAX_PAIRS
        } else {
            max_pairs
        };

        let mut pairs = Vec::new();
        pairs
            .try_reserve_exact(max_pairs as usize)
            .map_err(|_| AllocError {
                requested: max_pairs as usize * mem::size_of::<StoredPair>(),
            })?;

        debug!(
            max_pairs,
            flags = %flags,
            allocator = allocator.name(),
            "query table initialized"
        );

        Ok(Self {
            pairs,
            max_pairs,
            flags,
            pool: StringPool::direct_only(&allocator),
            decode: DecodeBuffer::None,
            allocator,
            pool_slack: DEFAULT_POOL_SLACK,
        })
    }

    /// Override the fixed slack added to the arena size estimate.
    pub fn with_pool_slack(mut self, slack: usize) -> Self {
        self.pool_slack = slack;
        self
    }

    /// Release every stored string, the arena and the decode buffer.
    ///
    /// Capacity, flags and allocator are kept; the table can parse again.
    pub fn reset(&mut self) {
        // Direct slots go back to their allocators as they drop
        self.pairs.clear();
        self.pool = StringPool::direct_only(&self.allocator);
        self.decode = DecodeBuffer::None;
    }

    /// Release everything the table holds and consume it.
    pub fn free(mut self) {
        self.reset();
        debug!(max_pairs = self.max_pairs, "query table freed");
    }

    /// Deep copy with independent storage.
    ///
    /// Every string of the copy is an individual allocation from this
    /// table's allocator; the copy never shares this table's arena.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::with_allocator(self.max_pairs, self.flags, self.allocator.clone())?
            .with_pool_slack(self.pool_slack);

        for pair in &self.pairs {
            let key = DirectBuf::copy_from(&copy.allocator, self.pool.get(&pair.key))?;
            let value = DirectBuf::copy_from(&copy.allocator, self.pool.get(&pair.value))?;
            copy.pairs.push(StoredPair {
                key: Slot::Direct(key),
                value: Slot::Direct(value),
                is_encoded: pair.is_encoded,
            });
        }

        copy.decode = match &self.decode {
            DecodeBuffer::None => DecodeBuffer::None,
            DecodeBuffer::Owned(buf) => {
                DecodeBuffer::Owned(DirectBuf::copy_from(&copy.allocator, buf)?)
            }
            DecodeBuffer::External { len } => DecodeBuffer::External { len: *len },
        };

        Ok(copy)
    }

    /// Use `allocator` for every future allocation.
    ///
    /// Strings already stored keep a handle to the allocator that produced
    /// them and are returned to it when released.
    pub fn set_allocator(&mut self, allocator: SharedAllocator) {
        debug!(
            from = self.allocator.name(),
            to = allocator.name(),
            "query table allocator replaced"
        );
        self.allocator = allocator;
    }

    /// Name of the current allocator.
    pub fn allocator_name(&self) -> &'static str {
        self.allocator.name()
    }

    /// Number of stored pairs.
    #[inline]
    pub fn count(&self) -> u16 {
        self.pairs.len() as u16
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Maximum number of pairs a parse stores.
    #[inline]
    pub fn max_pairs(&self) -> u16 {
        self.max_pairs
    }

    #[inline]
    pub fn flags(&self) -> ParseFlags {
        self.flags
    }

    /// Flags for subsequent parses.
    pub fn set_flags(&mut self, flags: ParseFlags) {
        self.flags = flags;
    }

    /// Decoded copy of the last query, if the table allocated one.
    pub fn decoded_input(&self) -> Option<&[u8]> {
        match &self.decode {
            DecodeBuffer::Owned(buf) => Some(&buf[..]),
            _ => None,
        }
    }

    /// Length of the decoded query, whichever buffer holds it.
    pub fn decoded_len(&self) -> Option<usize> {
        match &self.decode {
            DecodeBuffer::None => None,
            DecodeBuffer::Owned(buf) => Some(buf.len()),
            DecodeBuffer::External { len } => Some(*len),
        }
    }

    /// Arena usage of the last parse.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
