/// Label used when a percentage change cannot be computed.
pub const NOT_APPLICABLE: &str = "(N/A)";

/// Renders `(current - previous) / |previous|` as a signed percentage.
pub struct ChangeFormatter;

impl ChangeFormatter {
    /// `+3.2%`, `-0.5%`, or [`NOT_APPLICABLE`] when either value is absent or
    /// NaN, or when `previous` is zero.
    pub fn format(current: impl Into<Option<f64>>, previous: impl Into<Option<f64>>) -> String {
        match (current.into(), previous.into()) {
            (Some(current), Some(previous))
                if previous != 0.0 && !current.is_nan() && !previous.is_nan() =>
            {
                let percent = (current - previous) / previous.abs() * 100.0;
                format!("{:+.1}%", percent)
            }
            _ => NOT_APPLICABLE.to_string(),
        }
    }
}

/// Fixed two-decimal rendering with comma thousands separators (`1,234.50`).
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    grouped.push('.');
    grouped.push_str(frac_part);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_and_negative_change() {
        assert_eq!(ChangeFormatter::format(110.0, 100.0), "+10.0%");
        assert_eq!(ChangeFormatter::format(90.0, 100.0), "-10.0%");
        assert_eq!(ChangeFormatter::format(103.2, 100.0), "+3.2%");
    }

    #[test]
    fn test_uses_absolute_previous() {
        // -50 -> -40 is an increase relative to |previous|
        assert_eq!(ChangeFormatter::format(-40.0, -50.0), "+20.0%");
    }

    #[test]
    fn test_not_applicable_cases() {
        for x in [0.0, 1.0, -5.5, 1e9] {
            assert_eq!(ChangeFormatter::format(x, 0.0), NOT_APPLICABLE);
            assert_eq!(ChangeFormatter::format(x, None), NOT_APPLICABLE);
            assert_eq!(ChangeFormatter::format(None, x), NOT_APPLICABLE);
        }
        assert_eq!(ChangeFormatter::format(f64::NAN, 10.0), NOT_APPLICABLE);
        assert_eq!(ChangeFormatter::format(10.0, f64::NAN), NOT_APPLICABLE);
    }

    #[test]
    fn test_unchanged_value() {
        assert_eq!(ChangeFormatter::format(42.0, 42.0), "+0.0%");
    }

    #[test]
    fn test_format_price_grouping() {
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(999.999), "1,000.00");
        assert_eq!(format_price(1234.5), "1,234.50");
        assert_eq!(format_price(1234567.891), "1,234,567.89");
        assert_eq!(format_price(-98765.4), "-98,765.40");
    }
}
