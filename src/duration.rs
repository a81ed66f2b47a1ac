//! Duration text in the `1h30m`, `250ms`, `1.5h` notation.
//!
//! Units: `ns`, `us` (also `µs`/`μs`), `ms`, `s`, `m`, `h`. Components may be
//! chained and each may carry a decimal fraction. A bare number without any
//! unit counts nanoseconds, and `"0"` is zero.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        _ => return None,
    })
}

/// Parse duration text. The error string says what was wrong.
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let s = text.trim();
    if s.is_empty() {
        return Err("empty duration".into());
    }
    if s.starts_with('-') {
        return Err(format!("negative duration '{s}'"));
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    if s.chars().all(|c| c.is_ascii_digit()) {
        let nanos: u64 = s
            .parse()
            .map_err(|_| format!("duration '{s}' is out of range"))?;
        return Ok(Duration::from_nanos(nanos));
    }

    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        if number.is_empty() || number == "." {
            return Err(format!("invalid duration '{text}'"));
        }
        if unit.is_empty() {
            return Err(format!("missing unit in duration '{text}'"));
        }
        let per_unit =
            unit_nanos(unit).ok_or_else(|| format!("unknown unit '{unit}' in duration '{text}'"))?;

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if fraction.contains('.') {
            return Err(format!("invalid duration '{text}'"));
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| format!("invalid duration '{text}'"))?
        };
        total = whole
            .checked_mul(per_unit)
            .and_then(|n| n.checked_add(total))
            .ok_or_else(|| format!("duration '{text}' is out of range"))?;

        if !fraction.is_empty() {
            let digits: f64 = format!("0.{fraction}")
                .parse()
                .map_err(|_| format!("invalid duration '{text}'"))?;
            total = total
                .checked_add((digits * per_unit as f64).round() as u128)
                .ok_or_else(|| format!("duration '{text}' is out of range"))?;
        }
        rest = tail;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC)
        .map_err(|_| format!("duration '{text}' is out of range"))?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Render a duration as its non-zero components, e.g. `1h30m15s250ms`.
/// Zero renders as `0s`.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".into();
    }
    let secs = d.as_secs();
    let nanos = d.subsec_nanos();
    let parts = [
        (secs / 3_600, "h"),
        ((secs % 3_600) / 60, "m"),
        (secs % 60, "s"),
        (u64::from(nanos / 1_000_000), "ms"),
        (u64::from((nanos / 1_000) % 1_000), "us"),
        (u64::from(nanos % 1_000), "ns"),
    ];

    let mut out = String::new();
    for (amount, unit) in parts {
        if amount > 0 {
            out.push_str(&amount.to_string());
            out.push_str(unit);
        }
    }
    out
}
