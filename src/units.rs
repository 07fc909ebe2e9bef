//! Token and native-currency unit conversion.
//!
//! All arithmetic is integer-only on [`U256`]; floating point never touches a
//! cost or balance. Display rounding happens once, at string render time.

use alloy::primitives::U256;

use crate::constants::{native_decimals, WALLET_NATIVE_DECIMALS};
use crate::error::InfraLinkError;

/// Fractional digits shown in human-readable amounts.
pub const DISPLAY_FRACTION_DIGITS: usize = 6;

fn pow10(exp: u8) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

/// Render an amount in a token's smallest unit as a decimal string with
/// exactly [`DISPLAY_FRACTION_DIGITS`] fractional digits.
///
/// Display-only: the rounded string must never feed back into cost or
/// balance arithmetic.
pub fn to_display_amount(raw: U256, decimals: u8) -> String {
    let (whole, fraction) = match pow10(decimals) {
        Some(divisor) => {
            let rem = raw % divisor;
            let mut frac = rem.to_string();
            if frac.len() < decimals as usize {
                frac = format!("{}{}", "0".repeat(decimals as usize - frac.len()), frac);
            }
            ((raw / divisor).to_string(), frac)
        }
        // decimals beyond U256 range: the whole amount is fractional and
        // still needs left-padding to its decimal position
        None => {
            let mut frac = raw.to_string();
            if frac.len() < decimals as usize {
                frac = format!("{}{}", "0".repeat(decimals as usize - frac.len()), frac);
            }
            ("0".to_string(), frac)
        }
    };

    let mut shown: String = fraction.chars().take(DISPLAY_FRACTION_DIGITS).collect();
    while shown.len() < DISPLAY_FRACTION_DIGITS {
        shown.push('0');
    }
    format!("{whole}.{shown}")
}

/// Parse a human decimal string (e.g. `"0.25"`, `"10"`) into a token's
/// smallest unit. Integer-only parsing: split on the decimal point, truncate
/// the fraction to `decimals` digits, scale the parts separately.
pub fn from_display_amount(text: &str, decimals: u8) -> Result<U256, InfraLinkError> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return Err(InfraLinkError::InvalidAmount(format!(
            "'{text}': no numeric content"
        )));
    }

    let multiplier = pow10(decimals)
        .ok_or_else(|| InfraLinkError::InvalidAmount(format!("unsupported decimals {decimals}")))?;

    let (integer_part, fractional_part) = match cleaned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (cleaned.as_str(), ""),
    };

    let integer = parse_decimal(integer_part, text)?;

    // Truncate the fraction to `decimals` digits, then scale it up by the
    // digits it is short of.
    let frac_str = if fractional_part.len() > decimals as usize {
        &fractional_part[..decimals as usize]
    } else {
        fractional_part
    };
    let fractional = parse_decimal(frac_str, text)?;
    let scale = pow10(decimals - frac_str.len() as u8)
        .ok_or_else(|| InfraLinkError::InvalidAmount(format!("'{text}': overflow")))?;

    let whole = integer
        .checked_mul(multiplier)
        .ok_or_else(|| InfraLinkError::InvalidAmount(format!("'{text}': overflow")))?;
    let frac = fractional
        .checked_mul(scale)
        .ok_or_else(|| InfraLinkError::InvalidAmount(format!("'{text}': overflow")))?;
    whole
        .checked_add(frac)
        .ok_or_else(|| InfraLinkError::InvalidAmount(format!("'{text}': overflow")))
}

fn parse_decimal(digits: &str, original: &str) -> Result<U256, InfraLinkError> {
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10)
        .map_err(|e| InfraLinkError::InvalidAmount(format!("'{original}': {e}")))
}

/// Correct a native-currency cost for the transport layer.
///
/// Wallet transports submit native values assuming
/// [`WALLET_NATIVE_DECIMALS`]; on chains whose native unit uses fewer
/// decimals (Hedera's 8-decimal tinybars) the contract-side cost must be
/// scaled up before going into a payable call. The reverse direction is
/// handled too, even though no listed network currently needs it.
pub fn to_transport_amount(cost: U256, chain_id: u64) -> U256 {
    let actual = native_decimals(chain_id);
    if actual < WALLET_NATIVE_DECIMALS {
        // diff is at most 18, pow10 cannot fail
        let factor = pow10(WALLET_NATIVE_DECIMALS - actual).unwrap_or(U256::from(1u8));
        cost.saturating_mul(factor)
    } else if actual > WALLET_NATIVE_DECIMALS {
        let factor = pow10(actual - WALLET_NATIVE_DECIMALS).unwrap_or(U256::MAX);
        cost / factor
    } else {
        cost
    }
}

/// Human-readable duration, e.g. `"1h 5m 20s"` / `"9m 30s"`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else {
        format!("{minutes}m {secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_six_fraction_digits() {
        assert_eq!(to_display_amount(U256::from(600_000u64), 18), "0.000001");
        assert_eq!(to_display_amount(U256::from(1_500_000u64), 6), "1.500000");
        assert_eq!(to_display_amount(U256::ZERO, 18), "0.000000");
    }

    #[test]
    fn test_display_zero_decimals() {
        assert_eq!(to_display_amount(U256::from(42u64), 0), "42.000000");
    }

    #[test]
    fn test_display_truncates_not_rounds() {
        // 0.0000019 with 7 decimals -> shown as 0.000001
        assert_eq!(to_display_amount(U256::from(19u64), 7), "0.000001");
    }

    #[test]
    fn test_display_decimals_beyond_u256_range() {
        // 10^80 exceeds U256; the raw value sits 80 places right of the
        // point, far below the shown precision
        assert_eq!(to_display_amount(U256::from(5u64), 80), "0.000000");
        assert_eq!(to_display_amount(U256::MAX, 255), "0.000000");
    }

    #[test]
    fn test_display_beyond_f64_precision() {
        // 2^53 + 1 in 6-decimal units; f64 formatting would lose the low digit
        let raw = U256::from(9_007_199_254_740_993u64);
        assert_eq!(to_display_amount(raw, 6), "9007199254.740993");
    }

    #[test]
    fn test_from_display_basic() {
        assert_eq!(from_display_amount("0.25", 8).unwrap(), U256::from(25_000_000u64));
        assert_eq!(from_display_amount("10", 6).unwrap(), U256::from(10_000_000u64));
        assert_eq!(from_display_amount(".5", 2).unwrap(), U256::from(50u64));
    }

    #[test]
    fn test_from_display_truncates_excess_fraction() {
        assert_eq!(from_display_amount("0.0000019", 6).unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_from_display_rejects_empty() {
        assert!(from_display_amount("", 6).is_err());
        assert!(from_display_amount("abc", 6).is_err());
    }

    #[test]
    fn test_from_display_round_trips_display() {
        for (text, decimals) in [("1.250000", 18u8), ("0.000001", 18), ("42.000000", 8)] {
            let raw = from_display_amount(text, decimals).unwrap();
            assert_eq!(to_display_amount(raw, decimals), text);
        }
    }

    #[test]
    fn test_transport_amount_hedera_upscale() {
        // 8-decimal tinybar cost scaled to the 18-decimal transport unit
        let corrected = to_transport_amount(U256::from(250u64), 296);
        assert_eq!(corrected, U256::from(2_500_000_000_000u64));
    }

    #[test]
    fn test_transport_amount_identity_on_18_decimal_chains() {
        let cost = U256::from(1_000_000_000u64);
        assert_eq!(to_transport_amount(cost, 1), cost);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3925), "1h 5m 25s");
        assert_eq!(format_duration(570), "9m 30s");
        assert_eq!(format_duration(0), "0m 0s");
    }
}
