//! Bump-allocated string pool.
//!
//! One arena is allocated per parse, sized from the input length. Strings are
//! carved out of it front to back; nothing is reclaimed until the whole pool
//! is dropped. Once a request does not fit, the arena is closed and every
//! later string of the parse is allocated directly; each spill is counted and
//! the switch is logged so the fallback is observable.

use tracing::debug;

use crate::alloc::{DirectBuf, SharedAllocator};
use crate::error::AllocError;

/// Fixed slack added to the arena estimate.
pub const DEFAULT_POOL_SLACK: usize = 256;

/// Arena size for a query of `input_len` bytes: `2 * input_len + slack`.
///
/// The estimate is generous on purpose; a parse never stores more string
/// bytes than its input holds.
#[inline]
pub fn estimate_capacity(input_len: usize, slack: usize) -> usize {
    input_len.saturating_mul(2).saturating_add(slack)
}

/// Location of a pooled string inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

/// Storage of one key or value, tagged with its provenance.
#[derive(Debug)]
pub enum Slot {
    /// Lives in the arena; released with the pool.
    Pooled(Span),
    /// Owns its own buffer; released on drop.
    Direct(DirectBuf),
}

impl Slot {
    #[inline]
    pub fn is_pooled(&self) -> bool {
        matches!(self, Slot::Pooled(_))
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Slot::Pooled(span) => span.len,
            Slot::Direct(buf) => buf.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Narrow the string to `start..end` of its current contents.
    pub fn narrow(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.len());
        match self {
            Slot::Pooled(span) => {
                span.offset += start;
                span.len = end - start;
            }
            Slot::Direct(buf) => buf.retain_range(start, end),
        }
    }
}

/// Snapshot of pool usage for one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Whether the arena allocation succeeded.
    pub present: bool,
    /// Arena size in bytes.
    pub capacity: usize,
    /// Arena bytes handed out.
    pub used: usize,
    /// Strings served from the arena.
    pub pooled: usize,
    /// Strings that spilled to direct allocation.
    pub spilled: usize,
}

/// Arena plus spill path.
#[derive(Debug)]
pub struct StringPool {
    arena: Option<DirectBuf>,
    limit: usize,
    exhausted: bool,
    allocator: SharedAllocator,
    pooled: usize,
    spilled: usize,
}

impl StringPool {
    /// Create a pool with an arena of `capacity` bytes.
    ///
    /// If the arena cannot be allocated the pool still works, with every
    /// string allocated directly.
    pub fn new(capacity: usize, allocator: &SharedAllocator) -> Self {
        let arena = match DirectBuf::with_capacity(allocator, capacity) {
            Ok(buf) => Some(buf),
            Err(e) => {
                debug!(
                    capacity,
                    allocator = allocator.name(),
                    "string pool unavailable, using direct allocation: {}",
                    e
                );
                None
            }
        };
        Self {
            limit: if arena.is_some() { capacity } else { 0 },
            arena,
            exhausted: false,
            allocator: allocator.clone(),
            pooled: 0,
            spilled: 0,
        }
    }

    /// Pool without an arena; every string is allocated directly.
    pub fn direct_only(allocator: &SharedAllocator) -> Self {
        Self {
            arena: None,
            limit: 0,
            exhausted: false,
            allocator: allocator.clone(),
            pooled: 0,
            spilled: 0,
        }
    }

    /// Arena bytes handed out.
    #[inline]
    pub fn used(&self) -> usize {
        self.arena.as_ref().map_or(0, |a| a.len())
    }

    /// Arena size, 0 when absent.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.limit
    }

    /// Whether the arena exists.
    #[inline]
    pub fn has_arena(&self) -> bool {
        self.arena.is_some()
    }

    /// Whether a request has overflowed the arena.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Store a copy of `bytes`, from the arena if it fits.
    pub fn alloc(&mut self, bytes: &[u8]) -> Result<Slot, AllocError> {
        if let Some(arena) = self.arena.as_mut().filter(|_| !self.exhausted) {
            let offset = arena.len();
            if offset + bytes.len() <= self.limit && arena.push_within_capacity(bytes) {
                self.pooled += 1;
                return Ok(Slot::Pooled(Span {
                    offset,
                    len: bytes.len(),
                }));
            }
            debug!(
                requested = bytes.len(),
                used = offset,
                capacity = self.limit,
                "string pool exhausted, spilling to direct allocation"
            );
            self.exhausted = true;
        }

        let buf = DirectBuf::copy_from(&self.allocator, bytes)?;
        if self.arena.is_some() {
            self.spilled += 1;
        }
        Ok(Slot::Direct(buf))
    }

    /// Contents of `slot`.
    #[inline]
    pub fn get<'a>(&'a self, slot: &'a Slot) -> &'a [u8] {
        match slot {
            Slot::Pooled(span) => self
                .arena
                .as_ref()
                .and_then(|a| a.get(span.offset..span.offset + span.len))
                .unwrap_or(&[]),
            Slot::Direct(buf) => &buf[..],
        }
    }

    /// Mutable contents of `slot`.
    #[inline]
    pub fn get_mut<'a>(&'a mut self, slot: &'a mut Slot) -> &'a mut [u8] {
        match slot {
            Slot::Pooled(span) => match self.arena.as_mut() {
                Some(a) => a
                    .get_mut(span.offset..span.offset + span.len)
                    .unwrap_or(&mut []),
                None => &mut [],
            },
            Slot::Direct(buf) => &mut buf[..],
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            present: self.arena.is_some(),
            capacity: self.limit,
            used: self.used(),
            pooled: self.pooled,
            spilled: self.spilled,
        }
    }
}
