//! Allocation-free parsing into caller storage.
//!
//! [`fast_parse`] never touches the heap: pairs borrow directly from the
//! input, or from a caller-provided [`DecodeScratch`] when decoding is
//! needed. It applies none of the table options except
//! [`ParseFlags::AUTO_DECODE`], and keeps pairs with empty keys or values.
//!
//! ```rust
//! use kvquery::fast::{fast_parse, DecodeScratch};
//! use kvquery::{Pair, ParseFlags};
//!
//! let mut scratch = DecodeScratch::new();
//! let mut out = [Pair::EMPTY; 4];
//! let n = fast_parse(b"?q=rust+lang&page=2", &mut scratch, &mut out, ParseFlags::AUTO_DECODE);
//!
//! assert_eq!(n, 2);
//! assert_eq!(out[0].value, b"rust lang");
//! ```

use crate::charclass;
use crate::codec;
use crate::flags::ParseFlags;
use crate::query::Pair;

/// Inputs of this many bytes or more are not decoded by the fast path.
pub const FAST_DECODE_CAPACITY: usize = 2048;

/// Fixed scratch space for decoding in [`fast_parse`].
pub struct DecodeScratch {
    buf: [u8; FAST_DECODE_CAPACITY],
}

impl DecodeScratch {
    pub const fn new() -> Self {
        Self {
            buf: [0; FAST_DECODE_CAPACITY],
        }
    }
}

impl Default for DecodeScratch {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `input` into `out` and return the number of pairs written.
///
/// Returns 0 when `input` or `out` is empty, and when the input needs
/// decoding but is [`FAST_DECODE_CAPACITY`] bytes or longer. At most
/// `out.len()` pairs are written; the rest of the input is ignored.
pub fn fast_parse<'a>(
    input: &'a [u8],
    scratch: &'a mut DecodeScratch,
    out: &mut [Pair<'a>],
    flags: ParseFlags,
) -> usize {
    if input.is_empty() || out.is_empty() {
        return 0;
    }

    let query = input.strip_prefix(b"?").unwrap_or(input);
    let encoded = flags.contains(ParseFlags::AUTO_DECODE) && codec::has_encoded(query);

    let work: &'a [u8] = if encoded {
        if query.len() >= FAST_DECODE_CAPACITY {
            return 0;
        }
        let buf = &mut scratch.buf[..query.len()];
        buf.copy_from_slice(query);
        let len = codec::decode_in_place(buf);
        &scratch.buf[..len]
    } else {
        query
    };

    let end = work.len();
    let mut cur = 0;
    let mut count = 0;

    while cur < end && count < out.len() {
        while cur < end && charclass::is_separator(work[cur]) {
            cur += 1;
        }
        if cur >= end {
            break;
        }

        let key_start = cur;
        while cur < end && !charclass::is_equals(work[cur]) && !charclass::is_separator(work[cur]) {
            cur += 1;
        }
        let key = &work[key_start..cur];

        let value = if cur < end && charclass::is_equals(work[cur]) {
            cur += 1;
            let value_start = cur;
            while cur < end && !charclass::is_separator(work[cur]) {
                cur += 1;
            }
            &work[value_start..cur]
        } else {
            &[][..]
        };

        out[count] = Pair {
            key,
            value,
            is_encoded: encoded,
        };
        count += 1;

        if cur < end {
            cur += 1;
        }
    }

    count
}
