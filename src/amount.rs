//! Amount Codec
//!
//! Chain quantities arrive as human-readable decimal strings with comma
//! thousands separators ("10,522,124,629,456,843"). Balances can exceed
//! `u64` and must never lose precision, so amounts are parsed into
//! arbitrary-precision integers and rendered back with the separators
//! restored. A string that is not a well-formed amount is a data defect:
//! parsing fails instead of coercing to zero.

use anyhow::{Context, Result};
use num_bigint::BigInt;
use num_traits::Signed;

/// Parse a decimal amount string, tolerating comma separators and
/// surrounding whitespace. Anything else is an error.
pub fn parse_amount(text: &str) -> Result<BigInt> {
    let cleaned: String = text.trim().chars().filter(|&c| c != ',').collect();
    cleaned
        .parse::<BigInt>()
        .with_context(|| format!("invalid amount: {:?}", text))
}

/// Render an amount with comma separators every three digits, sign first.
pub fn format_amount(value: &BigInt) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value.is_negative() {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_parse_plain_decimal() {
        assert_eq!(parse_amount("0").unwrap(), BigInt::zero());
        assert_eq!(parse_amount("42").unwrap(), BigInt::from(42u32));
        assert_eq!(parse_amount("-300").unwrap(), BigInt::from(-300));
    }

    #[test]
    fn test_parse_thousands_separators() {
        assert_eq!(
            parse_amount("10,522,124,629,456,843").unwrap(),
            BigInt::from(10_522_124_629_456_843u64)
        );
        assert_eq!(parse_amount("1,000").unwrap(), BigInt::from(1000u32));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_amount("  1,500 ").unwrap(), BigInt::from(1500u32));
    }

    #[test]
    fn test_parse_exceeds_u64() {
        // 2^128, well past any machine integer.
        let parsed = parse_amount("340,282,366,920,938,463,463,374,607,431,768,211,456").unwrap();
        assert_eq!(parsed, BigInt::from(2u32).pow(128));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("   ").is_err());
        assert!(parse_amount("garbage").is_err());
        assert!(parse_amount("12.5").is_err());
        assert!(parse_amount("1 000").is_err());
    }

    #[test]
    fn test_format_groups_digits() {
        assert_eq!(format_amount(&BigInt::zero()), "0");
        assert_eq!(format_amount(&BigInt::from(999u32)), "999");
        assert_eq!(format_amount(&BigInt::from(1000u32)), "1,000");
        assert_eq!(
            format_amount(&BigInt::from(10_522_124_629_456_843u64)),
            "10,522,124,629,456,843"
        );
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_amount(&BigInt::from(-42_000)), "-42,000");
        assert_eq!(format_amount(&BigInt::from(-7)), "-7");
    }

    #[test]
    fn test_round_trip() {
        for raw in ["0", "7", "-1", "999", "1,000", "-42,000", "10,522,124,629,456,843"] {
            let value = parse_amount(raw).unwrap();
            assert_eq!(format_amount(&value), raw);
            assert_eq!(parse_amount(&format_amount(&value)).unwrap(), value);
        }
    }
}
