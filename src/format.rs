//! Scalar rendering shared by the generic and hand-written serializers.
//!
//! Both paths must produce byte-identical output, so the numeric policy lives in one place.

use std::fmt::Write;

/// Two-decimal renderings of the fractional parts that sit exactly halfway between two
/// cent values, rounded away from zero.
const TIE_FRACTIONS: [&str; 4] = [".13", ".38", ".63", ".88"];

/// Appends `value` with exactly two decimal digits.
///
/// Rounds the exact binary value, half away from zero, at every magnitude. `0.125` renders
/// as `0.13` and `-0.125` as `-0.13`. `1.005` and `0.015` are stored slightly below their
/// midpoints and render as `1.00` and `0.01`. A result that rounds to zero never carries a
/// minus sign. Non-finite values render as `NaN`, `inf` and `-inf`.
pub fn write_fixed2(out: &mut String, value: f64) {
    if let Some(fraction) = tie_fraction(value) {
        if value < 0.0 {
            out.push('-');
        }
        let _ = write!(out, "{:.0}{fraction}", value.abs().trunc());
        return;
    }

    // No exact midpoint here, so the correctly rounded exact rendering is unambiguous.
    let start = out.len();
    let _ = write!(out, "{value:.2}");
    if &out[start..] == "-0.00" {
        out.remove(start);
    }
}

/// The rounded fraction when `value` lies exactly halfway between two cent values.
///
/// A binary double can only hit such a midpoint with a fractional part of 1/8, 3/8, 5/8 or
/// 7/8, that is when `|value| * 8` is an odd integer.
fn tie_fraction(value: f64) -> Option<&'static str> {
    let eighths = value.abs() * 8.0;
    if !eighths.is_finite() || eighths.fract() != 0.0 {
        return None;
    }
    let slot = (eighths % 8.0) as usize;
    (slot % 2 == 1).then(|| TIE_FRACTIONS[slot / 2])
}

pub fn write_integer(out: &mut String, value: i64) {
    let _ = write!(out, "{value}");
}

pub fn write_bool(out: &mut String, value: bool) {
    out.push_str(if value { "true" } else { "false" });
}

/// Wraps `value` in double quotes. No escaping is applied.
pub fn write_text(out: &mut String, value: &str) {
    out.push('"');
    out.push_str(value);
    out.push('"');
}

/// Appends `"name":`.
pub fn write_key(out: &mut String, name: &str) {
    write_text(out, name);
    out.push(':');
}

pub fn fixed2(value: f64) -> String {
    let mut s = String::new();
    write_fixed2(&mut s, value);
    s
}
