use rust_decimal::{Decimal, RoundingStrategy};

/// Group the digits of a non-negative integer string in threes: 1234567 → 1,234,567
fn with_commas(int_part: &str) -> String {
    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.chars().rev().collect()
}

/// Format an amount with a currency symbol and thousands separators: $1,234.56
pub fn money(val: Decimal, symbol: &str) -> String {
    let rounded = val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let cents = format!("{:.2}", rounded.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{symbol}{}.{dec_part}", with_commas(int_part))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn m(s: &str) -> String {
        money(Decimal::from_str(s).unwrap(), "$")
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(m("1234.56"), "$1,234.56");
        assert_eq!(m("-500.00"), "-$500.00");
        assert_eq!(m("0"), "$0.00");
        assert_eq!(m("1000000.99"), "$1,000,000.99");
        assert_eq!(m("42.1"), "$42.10");
    }

    #[test]
    fn test_money_rounds_to_cents() {
        assert_eq!(m("176.666666"), "$176.67");
        assert_eq!(m("0.125"), "$0.13");
        assert_eq!(m("-0.001"), "$0.00");
    }

    #[test]
    fn test_money_other_symbol() {
        assert_eq!(money(Decimal::new(99900, 2), "€"), "€999.00");
    }
}
