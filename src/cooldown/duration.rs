//! Cooldown duration parsing
//!
//! Accepts the usual `h`/`m`/`s` style durations (`1h30m`, `90s`, `1.5h`) and
//! extends them with calendar units: `d` (24 hours), `M` (30 days) and `y`
//! (365 days). Segments chain left to right, so `1d12h` and `2y6M` are valid,
//! and magnitudes may be fractional (`0.5d` is 12 hours).

use chrono::TimeDelta;

use crate::cooldown::error::DurationError;

const NANOS_PER_HOUR: i64 = 3_600 * 1_000_000_000;

/// Parses a cooldown duration such as `7d`, `2M`, `1y`, `36h` or `1d12h`.
///
/// A bare number without a unit is rejected (except `0`), as is a trailing
/// number after a valid segment (`7d5`).
pub fn parse_duration(input: &str) -> Result<TimeDelta, DurationError> {
    if input.is_empty() {
        return Err(DurationError::Empty);
    }

    if let Ok(delta) = parse_standard(input) {
        return Ok(delta);
    }

    parse_calendar(input)
}

fn calendar_unit_hours(unit: char) -> Option<i64> {
    match unit {
        'd' => Some(24),
        'M' => Some(30 * 24),
        'y' => Some(365 * 24),
        _ => None,
    }
}

fn standard_unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

/// Walks `input` collecting numbers and applying calendar units. The first
/// non-calendar unit hands the rest of the string (starting at its number) to
/// the standard parser.
fn parse_calendar(input: &str) -> Result<TimeDelta, DurationError> {
    let mut total: i64 = 0;
    let mut number_start: Option<usize> = None;

    for (i, c) in input.char_indices() {
        if c.is_ascii_digit() || c == '.' {
            number_start.get_or_insert(i);
            continue;
        }

        let Some(start) = number_start.take() else {
            return Err(DurationError::MissingNumber(input.to_string()));
        };

        let Some(unit_hours) = calendar_unit_hours(c) else {
            let rest = parse_standard(&input[start..]).map_err(|err| match err {
                DurationError::Overflow(_) => DurationError::Overflow(input.to_string()),
                _ => DurationError::UnknownUnit {
                    input: input.to_string(),
                    unit: c.to_string(),
                },
            })?;
            let rest = rest
                .num_nanoseconds()
                .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
            let total = total
                .checked_add(rest)
                .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
            return Ok(TimeDelta::nanoseconds(total));
        };

        let value: f64 = input[start..i]
            .parse()
            .map_err(|_| DurationError::InvalidNumber(input.to_string()))?;

        let nanos = value * (unit_hours * NANOS_PER_HOUR) as f64;
        if !nanos.is_finite() || nanos >= i64::MAX as f64 {
            return Err(DurationError::Overflow(input.to_string()));
        }

        total = total
            .checked_add(nanos as i64)
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
    }

    if number_start.is_some() {
        return Err(DurationError::MissingUnit(input.to_string()));
    }

    Ok(TimeDelta::nanoseconds(total))
}

/// Parses `[-+]?([0-9]*(\.[0-9]*)?[a-z]+)+` with units `ns`, `us`, `ms`, `s`,
/// `m` and `h`. A lone `0` is also accepted.
fn parse_standard(input: &str) -> Result<TimeDelta, DurationError> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(DurationError::InvalidNumber(input.to_string()));
    }

    let mut total: u64 = 0;

    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after) = rest.split_at(int_len);

        let (frac_digits, after) = match after.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
                after_dot.split_at(frac_len)
            }
            None => ("", after),
        };

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(DurationError::MissingNumber(input.to_string()));
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);

        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let unit_nanos =
            standard_unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
                input: input.to_string(),
                unit: unit.to_string(),
            })?;

        let whole: u64 = if int_digits.is_empty() {
            0
        } else {
            int_digits
                .parse()
                .map_err(|_| DurationError::Overflow(input.to_string()))?
        };

        let mut scale = 1.0_f64;
        let mut fraction = 0.0_f64;
        for digit in frac_digits.bytes() {
            scale /= 10.0;
            fraction += f64::from(digit - b'0') * scale;
        }

        total = whole
            .checked_mul(unit_nanos)
            .and_then(|v| v.checked_add((fraction * unit_nanos as f64) as u64))
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;

        rest = after;
    }

    let nanos = i64::try_from(total).map_err(|_| DurationError::Overflow(input.to_string()))?;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}
