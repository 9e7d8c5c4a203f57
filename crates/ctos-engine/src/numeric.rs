//! Exact repair of numeric identifiers corrupted into scientific notation.
//!
//! Source spreadsheets store long account/reference numbers as floats, so a
//! value like `450000000000` arrives as `4.5E+11`. The repair shifts the
//! decimal point textually; no float round-trip is involved, so values that
//! are exactly representable come back digit-for-digit.

use ctos_model::schema::is_numeric_id_field;

/// Identifiers never run past a few dozen digits; anything larger is corrupt
/// rather than a real account number.
const MAX_EXPONENT: usize = 40;

/// Apply scientific-notation repair to `value` if `field` designates a
/// numeric identifier. All other fields pass through untouched.
pub fn renormalize_identifier(field: &str, value: String) -> String {
    if !is_numeric_id_field(field) {
        return value;
    }
    match expand_scientific(&value) {
        Some(expanded) => expanded,
        None => value,
    }
}

/// Expand `raw` from scientific notation to its exact integer string form.
///
/// Returns `None` when `raw` is not scientific notation, does not denote an
/// integer, or is implausibly large.
pub fn expand_scientific(raw: &str) -> Option<String> {
    let s = raw.trim();
    let e_pos = s.find(['e', 'E'])?;
    let (mantissa, exp) = (&s[..e_pos], &s[e_pos + 1..]);

    let exp = exp.strip_prefix('+').unwrap_or(exp);
    let exp: usize = exp.parse().ok()?;
    if exp > MAX_EXPONENT {
        return None;
    }

    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let digits: String = [int_part, frac_part].concat();
    // Where the decimal point lands within `digits` after applying the
    // exponent.
    let point = int_part.len() + exp;
    if point < digits.len() {
        // A fractional remainder means the value is not an integer; leave the
        // raw text alone unless the remainder is all zeros.
        if digits[point..].chars().any(|c| c != '0') {
            return None;
        }
    }

    let mut result: String = digits;
    result.truncate(result.len().min(point));
    while result.len() < point {
        result.push('0');
    }
    let trimmed = result.trim_start_matches('0');
    let result = if trimmed.is_empty() { "0" } else { trimmed };
    Some(format!("{sign}{result}"))
}
