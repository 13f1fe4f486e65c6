//! Lookup, iteration, ordering, filtering and serialization.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use super::{view, Pair, QueryTable};
use crate::codec;

/// Default pair ordering: bytewise by key, a prefix sorts first.
pub fn compare_keys(a: &Pair<'_>, b: &Pair<'_>) -> Ordering {
    a.key.cmp(b.key)
}

impl QueryTable {
    /// Pair at `index`, in table order.
    pub fn get(&self, index: usize) -> Option<Pair<'_>> {
        self.pairs.get(index).map(|p| view(&self.pool, p))
    }

    /// Pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = Pair<'_>> + '_ {
        self.pairs.iter().map(move |p| view(&self.pool, p))
    }

    /// Value of the first pair whose key equals `key` exactly.
    pub fn get_value(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        let key = key.as_ref();
        self.iter().find(|p| p.key == key).map(|p| p.value)
    }

    /// Check if any pair has key `key`.
    pub fn has_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.get_value(key).is_some()
    }

    /// Values of every pair with key `key`, in table order.
    pub fn values_of<'a>(&'a self, key: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.iter().filter(move |p| p.key == key).map(|p| p.value)
    }

    /// Fill `out` with the values of pairs keyed `key`, in table order.
    ///
    /// Stops when `out` is full and returns the number written.
    pub fn get_all_values<'a>(&'a self, key: impl AsRef<[u8]>, out: &mut [&'a [u8]]) -> usize {
        let key = key.as_ref();
        let mut written = 0;
        for pair in self.iter().filter(|p| p.key == key) {
            if written == out.len() {
                break;
            }
            out[written] = pair.value;
            written += 1;
        }
        written
    }

    /// Visit pairs in order until `visit` breaks.
    ///
    /// Returns the number of pairs visited without a break; the pair that
    /// breaks is not counted.
    pub fn iterate<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(&Pair<'_>) -> ControlFlow<()>,
    {
        let mut visited = 0;
        for pair in self.iter() {
            if visit(&pair).is_break() {
                break;
            }
            visited += 1;
        }
        visited
    }

    /// Sort pairs by key using [`compare_keys`].
    pub fn sort(&mut self) {
        self.sort_by(compare_keys);
    }

    /// Sort pairs with `compare`.
    ///
    /// The sort is stable: pairs that compare equal keep their order.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Pair<'_>, &Pair<'_>) -> Ordering,
    {
        // Tables are small and bounded; a bubble pass keeps equal keys in place
        let n = self.pairs.len();
        for i in 0..n.saturating_sub(1) {
            let mut swapped = false;
            for j in 0..n - 1 - i {
                let order = {
                    let a = view(&self.pool, &self.pairs[j]);
                    let b = view(&self.pool, &self.pairs[j + 1]);
                    compare(&a, &b)
                };
                if order == Ordering::Greater {
                    self.pairs.swap(j, j + 1);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }
    }

    /// Keep only pairs for which `keep` returns `true`.
    ///
    /// Dropped pairs release their storage; survivors keep their relative
    /// order. Returns the new count.
    pub fn filter<F>(&mut self, mut keep: F) -> u16
    where
        F: FnMut(&Pair<'_>) -> bool,
    {
        let pool = &self.pool;
        self.pairs.retain(|p| keep(&view(pool, p)));
        self.count()
    }

    fn serialized_len(&self, encode: bool) -> usize {
        let measure = |bytes: &[u8]| {
            if encode {
                codec::encoded_len(bytes)
            } else {
                bytes.len()
            }
        };
        self.iter()
            .enumerate()
            .map(|(i, p)| usize::from(i > 0) + measure(p.key) + 1 + measure(p.value))
            .sum()
    }

    /// Write the pairs as `k=v&k=v` into `buf`.
    ///
    /// With `encode` each key and value is percent-encoded. Returns the
    /// serialized length; nothing is written unless `buf` is non-empty and
    /// large enough.
    pub fn stringify(&self, buf: &mut [u8], encode: bool) -> usize {
        let needed = self.serialized_len(encode);
        if buf.is_empty() || buf.len() < needed {
            return needed;
        }

        let mut pos = 0;
        for (i, pair) in self.iter().enumerate() {
            if i > 0 {
                pos = put(buf, pos, b"&", false);
            }
            pos = put(buf, pos, pair.key, encode);
            pos = put(buf, pos, b"=", false);
            pos = put(buf, pos, pair.value, encode);
        }
        pos
    }

    /// Serialize to a `String`, replacing invalid UTF-8 when not encoding.
    pub fn to_query_string(&self, encode: bool) -> String {
        let mut buf = vec![0u8; self.serialized_len(encode)];
        let len = self.stringify(&mut buf, encode);
        buf.truncate(len);
        match String::from_utf8(buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

/// Copy or encode `bytes` into `buf` at `pos`; returns the new position.
fn put(buf: &mut [u8], pos: usize, bytes: &[u8], encode: bool) -> usize {
    if encode {
        pos + codec::encode(bytes, &mut buf[pos..])
    } else {
        buf[pos..pos + bytes.len()].copy_from_slice(bytes);
        pos + bytes.len()
    }
}
