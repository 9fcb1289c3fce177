//! Number, currency, percentage, byte-size and duration formatting.
//!
//! Every function is total: non-finite input renders as [`NOT_AVAILABLE`]
//! instead of panicking or printing `NaN`.

/// Placeholder rendered for NaN and infinite values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Magnitude suffixes, smallest first.
const MAGNITUDES: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a dollar amount.
///
/// Zero renders as `$0`. Amounts of a thousand or more are abbreviated with
/// one decimal and a `K`/`M`/`B`/`T` suffix (`$1.2K`, `$3.4M`); smaller amounts
/// keep `decimals` places with thousands separators.
pub fn format_currency(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    if value == 0.0 {
        return "$0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    if value.abs() >= 1000.0 {
        let (scaled, suffix) = abbreviate(value.abs());
        return format!("{}${:.1}{}", sign, scaled, suffix);
    }

    let body = grouped(value.abs(), decimals);
    if is_zero_text(&body) {
        return format!("${}", body);
    }
    format!("{}${}", sign, body)
}

/// Formats a value that is already expressed in percent, e.g. `12.345 → "12.35%"`.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{}%", signed_grouped(value, decimals))
}

/// Abbreviates large counts (`1.2K`, `3.4M`, `5.6B`); zero renders as `0`.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.abs() >= 1000.0 {
        let sign = if value < 0.0 { "-" } else { "" };
        let (scaled, suffix) = abbreviate(value.abs());
        return format!("{}{:.1}{}", sign, scaled, suffix);
    }
    signed_grouped(value, decimals)
}

/// Renders a byte count with 1024-based units and one decimal (`1.0 MB`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", round_to(value, 1), BYTE_UNITS[unit])
}

/// Converts a duration in hours into a compact label: `30m`, `5h`, `1d 12h`, `2d`.
pub fn format_duration(hours: f64) -> String {
    if !hours.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    if hours < 1.0 {
        let minutes = (hours * 60.0).round() as i64;
        if minutes >= 60 {
            return "1h".to_string();
        }
        return format!("{}m", minutes);
    }

    if hours < 24.0 {
        let whole = hours.round() as i64;
        if whole >= 24 {
            return "1d".to_string();
        }
        return format!("{}h", whole);
    }

    let mut days = (hours / 24.0).floor() as i64;
    let mut remaining = (hours % 24.0).round() as i64;
    // 47.6h must read "2d", not "1d 24h".
    if remaining == 24 {
        days += 1;
        remaining = 0;
    }
    if remaining == 0 {
        format!("{}d", days)
    } else {
        format!("{}d {}h", days, remaining)
    }
}

/// Prints at most `max_decimals` places and drops trailing zeros (`1.50000 → "1.5"`).
pub fn format_decimal(value: f64, max_decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let fixed = format!("{:.*}", max_decimals, round_to(value, max_decimals));
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        return "0".to_string();
    }
    trimmed.to_string()
}

/// Direction of a signed percentage, used to pick a display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

pub fn percentage_tone(value: f64) -> Tone {
    if value > 0.0 {
        Tone::Positive
    } else if value < 0.0 {
        Tone::Negative
    } else {
        Tone::Neutral
    }
}

// --- Helpers ---

/// Rounds half away from zero at `places` decimals.
///
/// The shift happens on the decimal text (`"12.345e2"`) rather than by
/// multiplying, so `12.345` rounds to `12.35` as it reads instead of to
/// `12.34` because of its binary representation.
pub(crate) fn round_to(value: f64, places: usize) -> f64 {
    let shifted: f64 = format!("{}e{}", value, places)
        .parse()
        .unwrap_or_else(|_| value * 10f64.powi(places as i32));
    let rounded = shifted.round();
    format!("{}e-{}", rounded, places)
        .parse()
        .unwrap_or_else(|_| rounded / 10f64.powi(places as i32))
}

/// Picks the largest suffix not exceeding `abs` and scales to one decimal,
/// bumping to the next suffix when rounding reaches 1000 (`999_999 → 1.0M`).
fn abbreviate(abs: f64) -> (f64, &'static str) {
    let mut index = MAGNITUDES
        .iter()
        .rposition(|(threshold, _)| abs >= *threshold)
        .unwrap_or(0);

    let mut scaled = round_to(abs / MAGNITUDES[index].0, 1);
    if scaled >= 1000.0 && index + 1 < MAGNITUDES.len() {
        index += 1;
        scaled = round_to(abs / MAGNITUDES[index].0, 1);
    }
    (scaled, MAGNITUDES[index].1)
}

/// Fixed-point text with thousands separators; `abs` must be non-negative.
fn grouped(abs: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, round_to(abs, decimals));
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn signed_grouped(value: f64, decimals: usize) -> String {
    let body = grouped(value.abs(), decimals);
    if value < 0.0 && !is_zero_text(&body) {
        format!("-{}", body)
    } else {
        body
    }
}

fn is_zero_text(text: &str) -> bool {
    text.chars().all(|c| matches!(c, '0' | '.' | ','))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_zero_is_bare_dollar() {
        assert_eq!(format_currency(0.0, 2), "$0");
        assert_ne!(format_currency(0.004, 2), "$0");
    }

    #[test]
    fn currency_small_values_keep_decimals() {
        assert_eq!(format_currency(12.5, 2), "$12.50");
        assert_eq!(format_currency(999.994, 2), "$999.99");
        assert_eq!(format_currency(7.0, 0), "$7");
        assert_eq!(format_currency(-42.1, 2), "-$42.10");
    }

    #[test]
    fn currency_large_values_use_suffixes() {
        assert_eq!(format_currency(1000.0, 2), "$1.0K");
        assert_eq!(format_currency(1234.0, 2), "$1.2K");
        assert_eq!(format_currency(15_000.0, 2), "$15.0K");
        assert_eq!(format_currency(3_400_000.0, 2), "$3.4M");
        assert_eq!(format_currency(2_500_000_000.0, 2), "$2.5B");
        assert_eq!(format_currency(-1500.0, 2), "-$1.5K");
    }

    #[test]
    fn currency_at_least_a_thousand_always_has_a_suffix() {
        for value in [1000.0, 9_999.0, 999_999.0, 1e7, 4.2e9, 7e12, 3e15] {
            let text = format_currency(value, 2);
            assert!(
                ["K", "M", "B", "T"].iter().any(|suffix| text.ends_with(suffix)),
                "{} -> {}",
                value,
                text
            );
        }
    }

    #[test]
    fn rounding_up_bumps_the_suffix() {
        assert_eq!(format_currency(999_999.0, 2), "$1.0M");
        assert_eq!(format_number(999_960.0, 1), "1.0M");
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(format_percentage(12.345, 2), "12.35%");
        assert_eq!(format_percentage(0.0, 2), "0.00%");
        assert_eq!(format_percentage(5.0, 0), "5%");
        assert_eq!(format_percentage(1234.5, 1), "1,234.5%");
        assert_eq!(format_percentage(-3.21, 2), "-3.21%");
        assert_eq!(format_percentage(-0.001, 2), "0.00%");
    }

    #[test]
    fn number_abbreviations() {
        assert_eq!(format_number(0.0, 1), "0");
        assert_eq!(format_number(12.34, 1), "12.3");
        assert_eq!(format_number(1_200.0, 1), "1.2K");
        assert_eq!(format_number(3_400_000.0, 1), "3.4M");
        assert_eq!(format_number(5_600_000_000.0, 1), "5.6B");
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512.0 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
        assert_eq!(format_bytes(u64::MAX), "16777216.0 TB");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(0.5), "30m");
        assert_eq!(format_duration(0.0), "0m");
        assert_eq!(format_duration(5.0), "5h");
        assert_eq!(format_duration(36.0), "1d 12h");
        assert_eq!(format_duration(48.0), "2d");
        assert_eq!(format_duration(47.6), "2d");
        assert_eq!(format_duration(0.999), "1h");
    }

    #[test]
    fn decimals_are_trimmed() {
        assert_eq!(format_decimal(1.5, 8), "1.5");
        assert_eq!(format_decimal(0.000000123, 8), "0.00000012");
        assert_eq!(format_decimal(42.0, 8), "42");
        assert_eq!(format_decimal(-0.0000000001, 8), "0");
    }

    #[test]
    fn non_finite_values_are_not_available() {
        assert_eq!(format_currency(f64::NAN, 2), NOT_AVAILABLE);
        assert_eq!(format_percentage(f64::INFINITY, 2), NOT_AVAILABLE);
        assert_eq!(format_duration(f64::NAN), NOT_AVAILABLE);
    }

    #[test]
    fn tones() {
        assert_eq!(percentage_tone(1.2), Tone::Positive);
        assert_eq!(percentage_tone(-0.1), Tone::Negative);
        assert_eq!(percentage_tone(0.0), Tone::Neutral);
    }
}
