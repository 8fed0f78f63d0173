//! Key comparator
//!
//! The single source of ordering for keys, records, ranges and cursors.

use std::cmp::Ordering;

use super::Key;

/// Compare two keys.
///
/// - Different kinds: by kind rank (number < date < string < binary < array)
/// - Numbers / dates: numerically, with `-0` equal to `0`
/// - Strings: lexicographically by UTF-16 code unit
/// - Binary: lexicographically by byte
/// - Arrays: element-wise with this same function; a strict prefix sorts first
pub fn compare(a: &Key, b: &Key) -> Ordering {
    match (a, b) {
        (Key::Number(x), Key::Number(y)) | (Key::Date(x), Key::Date(y)) => compare_f64(*x, *y),
        (Key::Text(x), Key::Text(y)) => x.encode_utf16().cmp(y.encode_utf16()),
        (Key::Binary(x), Key::Binary(y)) => x.as_slice().cmp(y.as_slice()),
        (Key::Array(x), Key::Array(y)) => x.iter().cmp(y.iter()),
        _ => a.kind().cmp(&b.kind()),
    }
}

/// NaN is rejected at key construction; `total_cmp` only keeps this total
/// for keys that bypassed validation.
fn compare_f64(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
}
