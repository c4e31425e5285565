//! Lua 5.3 number semantics: floor division, modulo, shifts, and the
//! conversions between integers, floats, and their string forms.
//!
//! Everything here is pure and allocation-free except the formatters.

/// 2^63 as a float; the first float above the `i64` range.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// Lua integer floor division (`//`), rounding toward negative infinity.
///
/// Returns `None` when `b == 0`. `i64::MIN // -1` wraps to `i64::MIN`.
pub fn ifloor_div(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let d = a.wrapping_div(b);
    let r = a.wrapping_rem(b);
    // Signs differ and the division was inexact: step down.
    if r != 0 && (r ^ b) < 0 {
        Some(d - 1)
    } else {
        Some(d)
    }
}

/// Lua float floor division.
pub fn ffloor_div(a: f64, b: f64) -> f64 {
    (a / b).floor()
}

/// Lua integer modulo: `a - (a // b) * b`. The result takes the divisor's sign.
///
/// Returns `None` when `b == 0`.
pub fn imod(a: i64, b: i64) -> Option<i64> {
    let q = ifloor_div(a, b)?;
    Some(a.wrapping_sub(q.wrapping_mul(b)))
}

/// Lua float modulo. The result takes the divisor's sign.
pub fn fmod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && ((r > 0.0) != (b > 0.0)) {
        r + b
    } else {
        r
    }
}

/// Logical left shift. Negative counts shift right; `|n| >= 64` yields zero.
pub fn shift_left(a: i64, n: i64) -> i64 {
    if n <= -64 || n >= 64 {
        0
    } else if n < 0 {
        ((a as u64) >> (-n) as u32) as i64
    } else {
        ((a as u64) << n as u32) as i64
    }
}

/// Logical right shift. Negative counts shift left; `|n| >= 64` yields zero.
pub fn shift_right(a: i64, n: i64) -> i64 {
    if n <= -64 || n >= 64 {
        0
    } else {
        shift_left(a, -n)
    }
}

/// Convert a float to an integer if it has an exact integer representation.
pub fn float_to_integer(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && (-TWO_POW_63..TWO_POW_63).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

/// Parse a Lua integer literal: optional sign, decimal or `0x` hex digits,
/// surrounded by optional whitespace.
///
/// Decimal literals that overflow are rejected (the caller falls back to a
/// float parse); hex literals wrap around, as in Lua.
pub fn str_to_integer(bytes: &[u8]) -> Option<i64> {
    let s = bytes.trim_ascii();
    let (neg, s) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if s.is_empty() {
        return None;
    }

    if let Some(hex) = strip_hex_prefix(s) {
        if hex.is_empty() {
            return None;
        }
        let mut n: i64 = 0;
        for &c in hex {
            let digit = (c as char).to_digit(16)?;
            n = n.wrapping_mul(16).wrapping_add(digit as i64);
        }
        return Some(if neg { n.wrapping_neg() } else { n });
    }

    // Accumulate negatively so that i64::MIN parses.
    let mut n: i64 = 0;
    for &c in s {
        if !c.is_ascii_digit() {
            return None;
        }
        n = n.checked_mul(10)?.checked_sub((c - b'0') as i64)?;
    }
    if neg {
        Some(n)
    } else {
        n.checked_neg()
    }
}

/// Parse a Lua numeral as a float. Accepts everything [`str_to_integer`]
/// accepts plus decimal floats with optional exponent and hex floats
/// (`0x1.8`, `0xAp-2`).
pub fn str_to_float(bytes: &[u8]) -> Option<f64> {
    let s = bytes.trim_ascii();
    let (neg, unsigned) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if let Some(hex) = strip_hex_prefix(unsigned) {
        // Hex integers wrap before widening, so try them first.
        return str_to_integer(s)
            .map(|i| i as f64)
            .or_else(|| hex_to_float(hex, neg));
    }
    // Rust's float grammar also accepts "inf", "infinity" and "nan".
    if s.iter().any(|c| c.is_ascii_alphabetic() && !matches!(c, b'e' | b'E')) {
        return None;
    }
    std::str::from_utf8(s).ok()?.parse::<f64>().ok()
}

/// Hex digits with an optional radix point, then an optional binary
/// exponent (`p` followed by a signed decimal).
fn hex_to_float(s: &[u8], neg: bool) -> Option<f64> {
    let (digits, exp) = match s.iter().position(|c| matches!(c, b'p' | b'P')) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };

    let mut mantissa = 0.0f64;
    let mut scale: i32 = 0;
    let mut any_digit = false;
    let mut seen_dot = false;
    for &c in digits {
        if c == b'.' {
            if seen_dot {
                return None;
            }
            seen_dot = true;
            continue;
        }
        let digit = (c as char).to_digit(16)?;
        mantissa = mantissa * 16.0 + f64::from(digit);
        if seen_dot {
            scale -= 4;
        }
        any_digit = true;
    }
    if !any_digit {
        return None;
    }

    if let Some(exp) = exp {
        let exp = std::str::from_utf8(exp).ok()?.parse::<i32>().ok()?;
        scale = scale.checked_add(exp)?;
    }
    // 0 * 2^big would be NaN.
    let f = if mantissa == 0.0 {
        0.0
    } else {
        mantissa * 2f64.powi(scale)
    };
    Some(if neg { -f } else { f })
}

fn strip_hex_prefix(s: &[u8]) -> Option<&[u8]> {
    s.strip_prefix(b"0x").or_else(|| s.strip_prefix(b"0X"))
}

/// Format an integer the way `tostring` does.
pub fn fmt_integer(i: i64) -> String {
    i.to_string()
}

/// Format a float the way `tostring` does: C's `%.14g`, with `.0` appended
/// when the result would otherwise read as an integer.
pub fn fmt_float(f: f64) -> String {
    if f.is_nan() {
        return if f.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if f.is_infinite() {
        return if f < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    let mut out = fmt_g14(f);
    if out.bytes().all(|c| c == b'-' || c.is_ascii_digit()) {
        out.push_str(".0");
    }
    out
}

/// `%.14g` for finite floats.
fn fmt_g14(f: f64) -> String {
    const PRECISION: i32 = 14;

    if f == 0.0 {
        return if f.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to 14 significant digits first gives the exponent %g decides on.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, f);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= PRECISION {
        let mantissa = strip_fraction_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        strip_fraction_zeros(&format!("{f:.decimals$}")).to_string()
    }
}

fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
