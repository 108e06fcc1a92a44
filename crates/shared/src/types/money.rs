//! Money rendering for human-readable findings.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts stay `rust_decimal::Decimal` until they are turned into text here.

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats an amount as US dollars with thousands separators, e.g. `$1,234.50`.
///
/// Negative amounts render as `-$12.00`. Rounds half away from zero to cents.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let mut plain = rounded.abs();
    plain.rescale(2);
    let text = plain.to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Formats a percentage with two decimals, e.g. `12.35%`.
#[must_use]
pub fn format_percent(percent: Decimal) -> String {
    let mut rounded =
        percent.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    format!("{rounded}%")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), "$0.00")]
    #[case(dec!(5), "$5.00")]
    #[case(dec!(100.01), "$100.01")]
    #[case(dec!(1234.5), "$1,234.50")]
    #[case(dec!(28500000), "$28,500,000.00")]
    #[case(dec!(-12), "-$12.00")]
    #[case(dec!(0.005), "$0.01")]
    #[case(dec!(-0.001), "$0.00")]
    fn test_format_usd(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_usd(amount), expected);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(10)), "10.00%");
        assert_eq!(format_percent(dec!(12.345)), "12.35%");
    }
}
