//! Query tokenizer.
//!
//! Grammar, after an optional leading `?` and optional decoding:
//!
//! ```text
//! query = *( "&" ) [ pair *( "&" pair ) ]
//! pair  = key [ "=" value ]
//! key   = *( any byte except "=" and "&" )
//! value = *( any byte except "&" )
//! ```
//!
//! Decoding runs once over the whole query before tokenizing, so an encoded
//! `%26` or `%3D` acts as a separator.

use tracing::{debug, trace};

use super::{DecodeBuffer, QueryTable, StoredPair};
use crate::alloc::DirectBuf;
use crate::charclass;
use crate::codec;
use crate::error::{AllocError, QueryError, Result};
use crate::flags::ParseFlags;
use crate::pool::{estimate_capacity, StringPool};

/// Where the tokenizer stopped.
struct Scan {
    /// Input bytes left unread after the last stored pair.
    remaining: usize,
}

impl QueryTable {
    /// Parse `input`, replacing the table contents.
    ///
    /// A leading `?` is ignored. When [`ParseFlags::AUTO_DECODE`] is set and
    /// the query holds `%` or `+`, the table decodes it into a buffer of its
    /// own first.
    ///
    /// On [`QueryError::Memory`] the pairs stored before the failure stay in
    /// the table. An empty `input` returns [`QueryError::EmptyString`] and
    /// leaves the previous contents untouched.
    pub fn parse(&mut self, input: impl AsRef<[u8]>) -> Result<()> {
        self.parse_with(input.as_ref(), None)
    }

    /// Parse `input`, decoding into `decode_buf` instead of an owned buffer.
    ///
    /// `decode_buf` must hold at least `input.len()` bytes; it is only
    /// touched when decoding is needed. Stored pairs are copies, so the
    /// buffer is free for reuse as soon as this returns.
    pub fn parse_into(&mut self, input: impl AsRef<[u8]>, decode_buf: &mut [u8]) -> Result<()> {
        self.parse_with(input.as_ref(), Some(decode_buf))
    }

    fn parse_with(&mut self, input: &[u8], external: Option<&mut [u8]>) -> Result<()> {
        if input.is_empty() {
            return Err(QueryError::EmptyString);
        }

        self.reset();

        let query = input.strip_prefix(b"?").unwrap_or(input);
        if query.is_empty() {
            return Ok(());
        }

        let encoded = self.flags.contains(ParseFlags::AUTO_DECODE) && codec::has_encoded(query);

        let mut external_view: Option<&[u8]> = None;
        if encoded {
            match external {
                Some(buf) => {
                    if buf.len() < query.len() {
                        return Err(QueryError::BufferTooSmall {
                            needed: query.len(),
                            capacity: buf.len(),
                        });
                    }
                    buf[..query.len()].copy_from_slice(query);
                    let len = codec::decode_in_place(&mut buf[..query.len()]);
                    self.decode = DecodeBuffer::External { len };
                    let decoded: &[u8] = buf;
                    external_view = Some(&decoded[..len]);
                }
                None => {
                    let mut buf = DirectBuf::copy_from(&self.allocator, query)?;
                    let len = codec::decode_in_place(&mut buf);
                    buf.retain_range(0, len);
                    self.decode = DecodeBuffer::Owned(buf);
                }
            }
        }

        let capacity = estimate_capacity(query.len(), self.pool_slack);
        self.pool = StringPool::new(capacity, &self.allocator);

        let work: &[u8] = match (external_view, &self.decode) {
            (Some(view), _) => view,
            (None, DecodeBuffer::Owned(buf)) => &buf[..],
            _ => query,
        };

        let scan = tokenize(
            work,
            &mut self.pool,
            &mut self.pairs,
            self.max_pairs as usize,
            self.flags,
            encoded,
        );
        let scan = match scan {
            Ok(scan) => scan,
            Err(e) => {
                debug!(
                    stored = self.pairs.len(),
                    requested = e.requested,
                    "parse aborted on allocation failure"
                );
                return Err(e.into());
            }
        };

        if self.flags.contains(ParseFlags::SORT_KEYS) {
            self.sort();
        }

        let stats = self.pool.stats();
        trace!(
            input_len = input.len(),
            decoded = encoded,
            pairs = self.pairs.len(),
            pooled = stats.pooled,
            spilled = stats.spilled,
            remaining = scan.remaining,
            "query parsed"
        );

        if scan.remaining > 0 && self.pairs.len() >= self.max_pairs as usize {
            if self.flags.contains(ParseFlags::STRICT) {
                return Err(QueryError::TooManyPairs {
                    limit: self.max_pairs,
                });
            }
            debug!(
                limit = self.max_pairs,
                remaining = scan.remaining,
                "pair limit reached, rest of query ignored"
            );
        }

        Ok(())
    }
}

/// Split `input` into pairs and store them until `max` pairs are held.
fn tokenize(
    input: &[u8],
    pool: &mut StringPool,
    pairs: &mut Vec<StoredPair>,
    max: usize,
    flags: ParseFlags,
    is_encoded: bool,
) -> std::result::Result<Scan, AllocError> {
    let end = input.len();
    let mut cur = 0;

    while cur < end && pairs.len() < max {
        while cur < end && charclass::is_separator(input[cur]) {
            cur += 1;
        }
        if cur >= end {
            break;
        }

        let key_start = cur;
        while cur < end && !charclass::is_equals(input[cur]) && !charclass::is_separator(input[cur])
        {
            cur += 1;
        }
        let key_end = cur;

        let (value_start, value_end) = if cur < end && charclass::is_equals(input[cur]) {
            cur += 1;
            let start = cur;
            while cur < end && !charclass::is_separator(input[cur]) {
                cur += 1;
            }
            (start, cur)
        } else {
            (cur, cur)
        };

        if cur < end {
            cur += 1;
        }

        if key_start == key_end {
            continue;
        }

        let mut key = pool.alloc(&input[key_start..key_end])?;
        let mut value = pool.alloc(&input[value_start..value_end])?;

        if flags.contains(ParseFlags::LOWERCASE_KEYS) {
            for b in pool.get_mut(&mut key) {
                *b = charclass::to_lower(*b);
            }
        }

        if flags.contains(ParseFlags::TRIM_VALUES) {
            let (lo, hi) = trim_bounds(pool.get(&value));
            value.narrow(lo, hi);
        }

        if value.is_empty() && !flags.contains(ParseFlags::KEEP_EMPTY) {
            continue;
        }

        pairs.push(StoredPair {
            key,
            value,
            is_encoded,
        });
    }

    Ok(Scan {
        remaining: end - cur,
    })
}

/// Bounds of `bytes` with surrounding whitespace removed.
fn trim_bounds(bytes: &[u8]) -> (usize, usize) {
    let start = bytes
        .iter()
        .position(|&b| !charclass::is_space(b))
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|&b| !charclass::is_space(b))
        .map_or(start, |i| i + 1);
    (start, end)
}
