//! Loose text-to-integer coercion.
//!
//! Identifiers handed out before the base58 format existed were bare numerals, and some
//! callers still pass them around as text.  Both the decode fallback and
//! [`Codec::encode_numeral`](crate::Codec::encode_numeral) accept text the way a
//! loosely typed numeric conversion would, limited to integral values:
//!
//! - surrounding whitespace (including a byte order mark) is ignored, and blank text
//!   is zero,
//! - `0x`, `0o` and `0b` prefixes select hexadecimal, octal and binary digits,
//! - signed decimal integers are accepted,
//! - decimal and exponent notation (`1e3`, `12.0`) is accepted if the value is integral.

const RADIX_PREFIXES: [(&str, u32); 6] = [
    ("0x", 16),
    ("0X", 16),
    ("0o", 8),
    ("0O", 8),
    ("0b", 2),
    ("0B", 2),
];

/// Coerces `text` to an integer, or returns `None` if it is not an integral numeral.
pub(crate) fn coerce_integer(text: &str) -> Option<i128> {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if trimmed.is_empty() {
        return Some(0);
    }

    for (prefix, radix) in RADIX_PREFIXES {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u128::from_str_radix(digits, radix)
                .ok()
                .and_then(|value| i128::try_from(value).ok());
        }
    }

    if let Ok(value) = trimmed.parse::<i128>() {
        return Some(value);
    }

    // `f64` parsing also accepts "inf" and "nan" spellings; neither is integral.
    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    Some(value as i128)
}
