//! Percent/plus codec.
//!
//! Decoding is tolerant: a `%` that is not followed by two hex digits is kept
//! as literal text. Sizing functions follow the measure-then-fill convention:
//! with an empty or undersized output buffer they write nothing and return the
//! number of bytes the output needs.

use percent_encoding::{percent_encode, percent_encode_byte, AsciiSet, NON_ALPHANUMERIC};

use crate::charclass;

/// Bytes escaped by [`encode`]: everything except alphanumerics and `-_.~`.
///
/// Space is in the set as well; the encoder handles it before the set is
/// consulted and emits `+`.
pub const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Byte produced by a valid `%XX` escape starting at `input[i]`.
#[inline]
fn escape_at(input: &[u8], i: usize) -> Option<u8> {
    if i + 2 >= input.len() {
        return None;
    }
    let hi = charclass::hex_value(input[i + 1])?;
    let lo = charclass::hex_value(input[i + 2])?;
    Some((hi << 4) | lo)
}

/// Decoded byte at `input[i]` and the number of input bytes it consumes.
#[inline]
fn decode_step(input: &[u8], i: usize) -> (u8, usize) {
    match input[i] {
        b'+' => (b' ', 1),
        b'%' => match escape_at(input, i) {
            Some(decoded) => (decoded, 3),
            None => (b'%', 1),
        },
        b => (b, 1),
    }
}

/// Check if `input` contains `%` or `+`.
#[inline]
pub fn has_encoded(input: &[u8]) -> bool {
    input.iter().any(|&b| charclass::is_encoded(b))
}

/// Decode `buf` in place and return the decoded length.
///
/// `buf[..len]` holds the result; bytes after it are left unspecified.
pub fn decode_in_place(buf: &mut [u8]) -> usize {
    let mut src = 0;
    let mut dst = 0;

    // dst never passes src, so every byte is read before it is overwritten
    while src < buf.len() {
        let (b, step) = decode_step(buf, src);
        buf[dst] = b;
        dst += 1;
        src += step;
    }

    dst
}

/// Length of `input` once decoded.
pub fn decoded_len(input: &[u8]) -> usize {
    let mut src = 0;
    let mut needed = 0;
    while src < input.len() {
        src += decode_step(input, src).1;
        needed += 1;
    }
    needed
}

/// Decode `input` into `output`.
///
/// Returns the decoded length. Nothing is written unless `output` is
/// non-empty and large enough; compare the result with `output.len()`.
pub fn decode(input: &[u8], output: &mut [u8]) -> usize {
    let needed = decoded_len(input);
    if output.is_empty() || output.len() < needed {
        return needed;
    }

    let mut src = 0;
    let mut dst = 0;
    while src < input.len() {
        let (b, step) = decode_step(input, src);
        output[dst] = b;
        dst += 1;
        src += step;
    }
    dst
}

/// Decode into a freshly allocated vector.
pub fn decode_to_vec(input: &[u8]) -> Vec<u8> {
    let mut buf = input.to_vec();
    let len = decode_in_place(&mut buf);
    buf.truncate(len);
    buf
}

/// Length of `input` once encoded.
pub fn encoded_len(input: &[u8]) -> usize {
    input
        .iter()
        .map(|&b| {
            if charclass::is_unreserved(b) || b == b' ' {
                1
            } else {
                3
            }
        })
        .sum()
}

/// Percent-encode `input` into `output`; space becomes `+`.
///
/// Returns the encoded length. Nothing is written unless `output` is
/// non-empty and large enough.
pub fn encode(input: &[u8], output: &mut [u8]) -> usize {
    let needed = encoded_len(input);
    if output.is_empty() || output.len() < needed {
        return needed;
    }

    let mut pos = 0;
    for &b in input {
        if charclass::is_unreserved(b) {
            output[pos] = b;
            pos += 1;
        } else if b == b' ' {
            output[pos] = b'+';
            pos += 1;
        } else {
            let escaped = percent_encode_byte(b).as_bytes();
            output[pos..pos + escaped.len()].copy_from_slice(escaped);
            pos += escaped.len();
        }
    }
    pos
}

/// Percent-encode into a `String`; same output as [`encode`].
pub fn encode_to_string(input: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(input));
    for (i, chunk) in input.split(|&b| b == b' ').enumerate() {
        if i > 0 {
            out.push('+');
        }
        out.extend(percent_encode(chunk, QUERY_COMPONENT));
    }
    out
}
