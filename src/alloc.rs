//! Pluggable byte allocators.
//!
//! Every string a table owns outside the arena is a [`DirectBuf`], which keeps
//! a handle to the allocator that produced it and hands the memory back to
//! that allocator exactly once, when dropped. Swapping a table's allocator
//! therefore never routes an old buffer to the wrong deallocator.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::trace;

use crate::error::AllocError;

/// Source of byte buffers for pools, decode buffers and direct strings.
pub trait Allocator: fmt::Debug + Send + Sync {
    /// Allocate an empty buffer with room for at least `size` bytes.
    fn allocate(&self, size: usize) -> Result<Vec<u8>, AllocError>;

    /// Take back a buffer produced by [`Allocator::allocate`].
    fn deallocate(&self, buf: Vec<u8>) {
        drop(buf);
    }

    /// Short name for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Global heap allocator with fallible reservation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, size: usize) -> Result<Vec<u8>, AllocError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(size)
            .map_err(|_| AllocError { requested: size })?;
        Ok(buf)
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

/// Allocator with a fixed byte budget.
///
/// Requests that would push the live total over the budget fail. Counters
/// make leaks and double releases visible: once everything handed out has
/// been returned, `in_use()` is zero and `allocations() == releases()`.
#[derive(Debug)]
pub struct BudgetAllocator {
    budget: usize,
    in_use: AtomicUsize,
    peak: AtomicUsize,
    allocations: AtomicUsize,
    releases: AtomicUsize,
    failures: AtomicUsize,
}

impl BudgetAllocator {
    /// Create an allocator that never holds more than `budget` bytes.
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            allocations: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    /// Budget in bytes.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Bytes currently handed out.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Highest `in_use` value observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    /// Successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Buffers returned so far.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    /// Requests refused for lack of budget.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Buffers handed out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.allocations() - self.releases()
    }
}

impl Allocator for BudgetAllocator {
    fn allocate(&self, size: usize) -> Result<Vec<u8>, AllocError> {
        let reserved = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(size).filter(|total| *total <= self.budget)
            });
        if reserved.is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(AllocError { requested: size });
        }

        let mut buf = Vec::new();
        if buf.try_reserve_exact(size).is_err() {
            self.in_use.fetch_sub(size, Ordering::AcqRel);
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(AllocError { requested: size });
        }

        // Account the real capacity so deallocate can subtract the same amount
        let extra = buf.capacity() - size;
        let now = if extra > 0 {
            self.in_use.fetch_add(extra, Ordering::AcqRel) + extra
        } else {
            self.in_use()
        };
        self.peak.fetch_max(now, Ordering::Relaxed);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        Ok(buf)
    }

    fn deallocate(&self, buf: Vec<u8>) {
        self.in_use.fetch_sub(buf.capacity(), Ordering::AcqRel);
        self.releases.fetch_add(1, Ordering::Relaxed);
        drop(buf);
    }

    fn name(&self) -> &'static str {
        "budget"
    }
}

/// Shared handle to an allocator.
pub type SharedAllocator = Arc<dyn Allocator>;

/// Default allocator handle.
pub fn system() -> SharedAllocator {
    Arc::new(SystemAllocator)
}

/// A buffer owned through a specific allocator.
///
/// The buffer never grows past the capacity it was allocated with, so the
/// allocator always gets back exactly what it handed out.
pub struct DirectBuf {
    bytes: Vec<u8>,
    allocator: SharedAllocator,
}

impl DirectBuf {
    /// Allocate `size` bytes of room from `allocator`.
    pub fn with_capacity(allocator: &SharedAllocator, size: usize) -> Result<Self, AllocError> {
        let bytes = allocator.allocate(size)?;
        trace!(size, allocator = allocator.name(), "direct allocation");
        Ok(Self {
            bytes,
            allocator: Arc::clone(allocator),
        })
    }

    /// Allocate and fill with a copy of `src`.
    pub fn copy_from(allocator: &SharedAllocator, src: &[u8]) -> Result<Self, AllocError> {
        let mut buf = Self::with_capacity(allocator, src.len())?;
        buf.bytes.extend_from_slice(src);
        Ok(buf)
    }

    /// Room allocated for this buffer.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Append bytes without growing past the allocated capacity.
    ///
    /// Returns `false` (and writes nothing) if they do not fit.
    pub fn push_within_capacity(&mut self, src: &[u8]) -> bool {
        if self.bytes.len() + src.len() > self.bytes.capacity() {
            return false;
        }
        self.bytes.extend_from_slice(src);
        true
    }

    /// Keep only `range` of the current contents.
    pub fn retain_range(&mut self, start: usize, end: usize) {
        self.bytes.truncate(end);
        self.bytes.drain(..start);
    }

    /// Allocator this buffer returns to.
    pub fn allocator(&self) -> &SharedAllocator {
        &self.allocator
    }
}

impl Deref for DirectBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl DerefMut for DirectBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl fmt::Debug for DirectBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectBuf")
            .field("len", &self.bytes.len())
            .field("capacity", &self.bytes.capacity())
            .field("allocator", &self.allocator.name())
            .finish()
    }
}

impl Drop for DirectBuf {
    fn drop(&mut self) {
        let bytes = std::mem::take(&mut self.bytes);
        self.allocator.deallocate(bytes);
    }
}
