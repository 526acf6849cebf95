//! Best-effort parsing of kernel text fields
//!
//! `/proc` values are read the way `strtol`/`atoi` would read them: skip
//! leading whitespace, accept an optional sign, take the longest run of
//! digits and stop there. No digits means zero. These helpers never fail.

/// Parse the leading integer of `token`, or 0.
///
/// Saturates at the `i64` bounds instead of wrapping.
pub fn lenient_i64(token: &[u8]) -> i64 {
    let mut rest = token;
    while let [b, tail @ ..] = rest {
        if b.is_ascii_whitespace() {
            rest = tail;
        } else {
            break;
        }
    }

    let negative = match rest {
        [b'-', tail @ ..] => {
            rest = tail;
            true
        }
        [b'+', tail @ ..] => {
            rest = tail;
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for &b in rest {
        if !b.is_ascii_digit() {
            break;
        }
        let digit = (b - b'0') as i64;
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// Like [`lenient_i64`], clamping negatives to 0.
pub fn lenient_u64(token: &[u8]) -> u64 {
    lenient_i64(token).max(0) as u64
}

/// If `line` starts with `tag`, return what follows with any non-digit
/// prefix (spaces, tabs) skipped.
pub fn value_after_tag<'a>(line: &'a [u8], tag: &[u8]) -> Option<&'a [u8]> {
    let rest = line.strip_prefix(tag)?;
    let start = rest
        .iter()
        .position(|b| b.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[start..])
}
