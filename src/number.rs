//! Exact comparisons between integers and floats
//!
//! Casting a large integer to `f64` loses precision, so `i64::MAX as f64 == 2f64.powi(63)`
//! even though the two numbers differ. The helpers here compare across kinds without
//! going through a lossy cast, and return `None` whenever a NaN is involved.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::FromPrimitive;

fn can_represent_as_f64(x: u64) -> bool {
    x.leading_zeros() + x.trailing_zeros() >= 11
}

/// Compares an integer with a float exactly.
pub fn cmp_i64_to_f64(a: i64, b: f64) -> Option<Ordering> {
    if a < 0 {
        cmp_u64_to_f64(a.unsigned_abs(), -b).map(Ordering::reverse)
    } else {
        cmp_u64_to_f64(a as u64, b)
    }
}

fn cmp_u64_to_f64(a: u64, b: f64) -> Option<Ordering> {
    if b.is_nan() {
        None
    } else if can_represent_as_f64(a) {
        // If we can represent as an f64, we can just cast and compare
        (a as f64).partial_cmp(&b)
    } else if b <= (0x0020_0000_0000_0000_u64 as f64) {
        // Every non-representable integer is above 2^53
        Some(Ordering::Greater)
    } else if b >= u64::MAX as f64 {
        Some(Ordering::Less)
    } else {
        // The remaining floating point values can be losslessly converted to u64.
        Some(a.cmp(&(b as u64)))
    }
}

/// Compares an arbitrary precision integer with a float exactly.
pub fn cmp_bigint_to_f64(a: &BigInt, b: f64) -> Option<Ordering> {
    if b.is_nan() {
        return None;
    }
    if b.is_infinite() {
        return Some(if b > 0.0 {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }
    let floor = b.floor();
    let whole = BigInt::from_f64(floor)?;
    Some(match a.cmp(&whole) {
        Ordering::Equal if b > floor => Ordering::Less,
        ord => ord,
    })
}

/// Whether an integer and a float denote the same number.
pub fn eq_i64_f64(a: i64, b: f64) -> bool {
    cmp_i64_to_f64(a, b) == Some(Ordering::Equal)
}

/// Total preorder used to sort raw floats: NaNs sort after every number and
/// compare equal to each other.
pub(crate) fn total_cmp_f64(a: &f64, b: &f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

/// Renders a float the way diagnostics show it: `1.0`, `0.1`, `1e+16`, `inf`,
/// `nan`.
pub fn format_f64(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    } else if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.into();
    }
    // `Debug` switches to scientific notation at the same magnitudes, but
    // writes the exponent without a sign or padding
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}
