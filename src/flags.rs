//! Parse option flags.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

/// Combinable parse options.
///
/// `MERGE_DUPLICATES` is accepted but has no effect: duplicate keys are
/// always kept as separate pairs (see `QueryTable::get_all_values`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseFlags(u16);

impl ParseFlags {
    pub const NONE: ParseFlags = ParseFlags(0);
    /// Decode `%XX` escapes and `+` before tokenizing.
    pub const AUTO_DECODE: ParseFlags = ParseFlags(1 << 0);
    pub const MERGE_DUPLICATES: ParseFlags = ParseFlags(1 << 1);
    /// Keep pairs whose value is empty.
    pub const KEEP_EMPTY: ParseFlags = ParseFlags(1 << 2);
    /// Report capacity overflow as an error instead of truncating.
    pub const STRICT: ParseFlags = ParseFlags(1 << 3);
    /// Sort pairs by key after every parse.
    pub const SORT_KEYS: ParseFlags = ParseFlags(1 << 4);
    /// ASCII-lowercase keys.
    pub const LOWERCASE_KEYS: ParseFlags = ParseFlags(1 << 5);
    /// Strip whitespace around values.
    pub const TRIM_VALUES: ParseFlags = ParseFlags(1 << 6);
    pub const DEFAULT: ParseFlags = ParseFlags::AUTO_DECODE;

    const NAMED: [(&'static str, ParseFlags); 7] = [
        ("auto_decode", ParseFlags::AUTO_DECODE),
        ("merge_duplicates", ParseFlags::MERGE_DUPLICATES),
        ("keep_empty", ParseFlags::KEEP_EMPTY),
        ("strict", ParseFlags::STRICT),
        ("sort_keys", ParseFlags::SORT_KEYS),
        ("lowercase_keys", ParseFlags::LOWERCASE_KEYS),
        ("trim_values", ParseFlags::TRIM_VALUES),
    ];

    const ALL_BITS: u16 = 0x7F;

    /// Raw bit representation.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Build from raw bits, dropping unknown ones.
    #[inline]
    pub const fn from_bits_truncate(bits: u16) -> Self {
        ParseFlags(bits & Self::ALL_BITS)
    }

    /// Check if every flag in `other` is set.
    #[inline]
    pub const fn contains(self, other: ParseFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: ParseFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: ParseFlags) {
        self.0 &= !other.0;
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the set flags, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(_, flag)| self.contains(*flag))
            .map(|(name, _)| name)
    }
}

impl Default for ParseFlags {
    fn default() -> Self {
        ParseFlags::DEFAULT
    }
}

impl BitOr for ParseFlags {
    type Output = ParseFlags;

    fn bitor(self, rhs: ParseFlags) -> ParseFlags {
        ParseFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ParseFlags {
    fn bitor_assign(&mut self, rhs: ParseFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ParseFlags {
    type Output = ParseFlags;

    fn bitand(self, rhs: ParseFlags) -> ParseFlags {
        ParseFlags(self.0 & rhs.0)
    }
}

impl fmt::Debug for ParseFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("ParseFlags(none)");
        }
        f.write_str("ParseFlags(")?;
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for ParseFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.names().collect();
        f.write_str(&names.join(","))
    }
}

/// Parses a comma-separated list such as `"auto_decode,strict"`.
///
/// `"none"`, `"default"` and the empty string are also accepted. Names are
/// case-insensitive and may use `-` instead of `_`.
impl FromStr for ParseFlags {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = ParseFlags::NONE;
        for part in s.split(',') {
            let name = part.trim().to_lowercase().replace('-', "_");
            match name.as_str() {
                "" | "none" => {}
                "default" => flags |= ParseFlags::DEFAULT,
                other => {
                    let flag = Self::NAMED
                        .iter()
                        .find(|(n, _)| *n == other)
                        .map(|(_, f)| *f)
                        .ok_or_else(|| format!("unknown flag: {}", other))?;
                    flags |= flag;
                }
            }
        }
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_auto_decode() {
        assert_eq!(ParseFlags::default(), ParseFlags::AUTO_DECODE);
        assert!(ParseFlags::default().contains(ParseFlags::AUTO_DECODE));
        assert!(!ParseFlags::default().contains(ParseFlags::STRICT));
    }

    #[test]
    fn test_combine_and_remove() {
        let mut flags = ParseFlags::AUTO_DECODE | ParseFlags::STRICT;
        assert!(flags.contains(ParseFlags::STRICT));
        flags.remove(ParseFlags::STRICT);
        assert!(!flags.contains(ParseFlags::STRICT));
        flags.insert(ParseFlags::TRIM_VALUES);
        assert_eq!(flags.bits(), 0x41);
        assert_eq!(ParseFlags::from_bits_truncate(0xFFFF).bits(), 0x7F);
    }

    #[test]
    fn test_from_str() {
        let flags: ParseFlags = "auto_decode, Keep-Empty,strict".parse().unwrap();
        assert_eq!(
            flags,
            ParseFlags::AUTO_DECODE | ParseFlags::KEEP_EMPTY | ParseFlags::STRICT
        );
        assert_eq!("".parse::<ParseFlags>().unwrap(), ParseFlags::NONE);
        assert_eq!("default".parse::<ParseFlags>().unwrap(), ParseFlags::DEFAULT);
        assert!("bogus".parse::<ParseFlags>().is_err());
    }

    #[test]
    fn test_display() {
        let flags = ParseFlags::LOWERCASE_KEYS | ParseFlags::AUTO_DECODE;
        assert_eq!(flags.to_string(), "auto_decode,lowercase_keys");
        assert_eq!(ParseFlags::NONE.to_string(), "none");
        assert_eq!(
            format!("{:?}", flags),
            "ParseFlags(auto_decode | lowercase_keys)"
        );
    }
}
