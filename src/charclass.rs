//! Byte classification table.
//!
//! Every byte maps to a bitset of properties so the tokenizer, codec and
//! validator classify input with a single table lookup. ASCII only: bytes
//! `>= 0x80` have no properties.

/// `&` pair separator.
pub const SEPARATOR: u8 = 0x01;
/// `=` key/value delimiter.
pub const EQUALS: u8 = 0x02;
/// `%` escape introducer.
pub const PERCENT: u8 = 0x04;
/// `+` encoded space.
pub const PLUS: u8 = 0x08;
/// `0-9`, `A-F`, `a-f`.
pub const HEX: u8 = 0x10;
/// Space and `\t` `\n` `\v` `\f` `\r`.
pub const SPACE: u8 = 0x20;
/// `A-Z`.
pub const UPPER: u8 = 0x40;
/// `A-Z` and `a-z`.
pub const ALPHA: u8 = 0x80;

/// Marker for "not a hex digit" in [`HEX_VALUES`].
const NOT_HEX: u8 = 0xFF;

/// Property table, built at compile time.
pub static CLASS_TABLE: [u8; 256] = build_class_table();

/// Nibble value of every hex digit, [`NOT_HEX`] elsewhere.
static HEX_VALUES: [u8; 256] = build_hex_table();

const fn build_class_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 128 {
        let b = i as u8;
        let mut bits = 0u8;
        if b == b'&' {
            bits |= SEPARATOR;
        }
        if b == b'=' {
            bits |= EQUALS;
        }
        if b == b'%' {
            bits |= PERCENT;
        }
        if b == b'+' {
            bits |= PLUS;
        }
        if b.is_ascii_hexdigit() {
            bits |= HEX;
        }
        if b == b' ' || (b >= 0x09 && b <= 0x0D) {
            bits |= SPACE;
        }
        if b.is_ascii_uppercase() {
            bits |= UPPER | ALPHA;
        }
        if b.is_ascii_lowercase() {
            bits |= ALPHA;
        }
        table[i] = bits;
        i += 1;
    }
    table
}

const fn build_hex_table() -> [u8; 256] {
    let mut table = [NOT_HEX; 256];
    let mut i = 0;
    while i < 10 {
        table[b'0' as usize + i] = i as u8;
        i += 1;
    }
    let mut i = 0;
    while i < 6 {
        table[b'A' as usize + i] = 10 + i as u8;
        table[b'a' as usize + i] = 10 + i as u8;
        i += 1;
    }
    table
}

/// Property bits of `b`.
#[inline(always)]
pub fn class_of(b: u8) -> u8 {
    CLASS_TABLE[b as usize]
}

#[inline(always)]
pub fn is_separator(b: u8) -> bool {
    class_of(b) & SEPARATOR != 0
}

#[inline(always)]
pub fn is_equals(b: u8) -> bool {
    class_of(b) & EQUALS != 0
}

/// `%` or `+`.
#[inline(always)]
pub fn is_encoded(b: u8) -> bool {
    class_of(b) & (PERCENT | PLUS) != 0
}

#[inline(always)]
pub fn is_hex_digit(b: u8) -> bool {
    class_of(b) & HEX != 0
}

#[inline(always)]
pub fn is_space(b: u8) -> bool {
    class_of(b) & SPACE != 0
}

#[inline(always)]
pub fn is_upper(b: u8) -> bool {
    class_of(b) & UPPER != 0
}

#[inline(always)]
pub fn is_alpha(b: u8) -> bool {
    class_of(b) & ALPHA != 0
}

/// Digits carry the hex bit, letters the alpha bit.
#[inline(always)]
pub fn is_alnum(b: u8) -> bool {
    class_of(b) & (HEX | ALPHA) != 0
}

/// RFC 3986 unreserved: alphanumerics and `-_.~`.
#[inline(always)]
pub fn is_unreserved(b: u8) -> bool {
    is_alnum(b) || matches!(b, b'-' | b'_' | b'.' | b'~')
}

/// Value of a hex digit, `None` for anything else.
#[inline(always)]
pub fn hex_value(b: u8) -> Option<u8> {
    match HEX_VALUES[b as usize] {
        NOT_HEX => None,
        v => Some(v),
    }
}

/// ASCII-only lowercase of `b` (A-Z to a-z, everything else unchanged).
#[inline(always)]
pub fn to_lower(b: u8) -> u8 {
    if is_upper(b) {
        b + (b'a' - b'A')
    } else {
        b
    }
}
