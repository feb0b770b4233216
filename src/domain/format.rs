//! Display formatting for raw subgraph and RPC fields.
//!
//! Every function here is pure and total: input that cannot be parsed is
//! rendered as [`PLACEHOLDER`] instead of failing. Amounts are scaled with
//! exact 256-bit integer arithmetic, so wei values never lose precision.

use alloy_primitives::U256;
use alloy_primitives::utils::{ParseUnits, parse_units};
use chrono::{DateTime, Utc};

// ============================================================================
// Constants
// ============================================================================

/// Decimals of wei relative to the native currency unit.
pub const WEI_DECIMALS: u8 = 18;

/// Decimals of wei relative to gwei.
pub const GWEI_DECIMALS: u8 = 9;

/// Fractional digits shown for native-currency amounts.
pub const AMOUNT_PLACES: u8 = 6;

/// Fractional digits shown for gas prices in gwei.
pub const GAS_PRICE_PLACES: u8 = 2;

/// Rendered in place of a value that could not be parsed.
pub const PLACEHOLDER: &str = "-";

/// Leading characters kept by [`format_hash`].
const HASH_PREFIX: usize = 10;

/// Trailing characters kept by [`format_hash`].
const HASH_SUFFIX: usize = 8;

/// Leading characters kept by [`shorten_address`].
const ADDRESS_PREFIX: usize = 6;

/// Trailing characters kept by [`shorten_address`].
const ADDRESS_SUFFIX: usize = 4;

const ELLIPSIS: &str = "...";

// ============================================================================
// Numeric Helpers
// ============================================================================

/// Parses a base-10 (or `0x`-prefixed hex) integer string into a `U256`.
#[must_use]
pub fn parse_wei(raw: &str) -> Option<U256> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.strip_prefix("0x") {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None => U256::from_str_radix(raw, 10).ok(),
    }
}

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Scales `value` down by `10^decimals` and renders exactly `places`
/// fractional digits, rounding half up.
#[must_use]
pub fn format_fixed(value: U256, decimals: u8, places: u8) -> String {
    let places = places.min(decimals);
    let divisor = pow10(decimals - places);

    let mut scaled = value / divisor;
    let remainder = value % divisor;
    if remainder * U256::from(2u64) >= divisor && !remainder.is_zero() {
        scaled = scaled.saturating_add(U256::from(1u64));
    }

    if places == 0 {
        return scaled.to_string();
    }

    let unit = pow10(places);
    let whole = scaled / unit;
    let fraction = (scaled % unit).to_string();
    format!("{whole}.{fraction:0>width$}", width = usize::from(places))
}

/// Parses a decimal amount such as `"0.5"` into base units scaled by
/// `10^decimals`. Returns `None` for signs, exponents, stray characters, or
/// more than `decimals` fractional digits.
///
/// `parse_units` silently truncates excess precision, so the digits are
/// checked up front and rejected instead.
#[must_use]
pub fn parse_amount(raw: &str, decimals: u8) -> Option<U256> {
    let raw = raw.trim();
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    if (whole.is_empty() && fraction.is_empty())
        || !all_digits(whole)
        || !all_digits(fraction)
        || fraction.len() > usize::from(decimals)
    {
        return None;
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };
    match parse_units(&normalized, decimals).ok()? {
        ParseUnits::U256(value) => Some(value),
        ParseUnits::I256(_) => None,
    }
}

/// Inserts thousands separators into an unsigned integer.
#[must_use]
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// Amounts
// ============================================================================

/// Formats a wei amount as native currency with six decimals.
///
/// `"1000000000000000000"` becomes `"1.000000"`.
#[must_use]
pub fn format_amount(wei: &str) -> String {
    parse_wei(wei).map_or_else(
        || PLACEHOLDER.to_string(),
        |value| format_fixed(value, WEI_DECIMALS, AMOUNT_PLACES),
    )
}

/// Formats a wei gas price in gwei with two decimals.
///
/// `"20000000000"` becomes `"20.00"`.
#[must_use]
pub fn format_gas_price(wei: &str) -> String {
    parse_wei(wei).map_or_else(
        || PLACEHOLDER.to_string(),
        |value| format_fixed(value, GWEI_DECIMALS, GAS_PRICE_PLACES),
    )
}

/// Gas usage of a block, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasUsage {
    /// Gas used, with thousands separators.
    pub used: String,
    /// Gas limit, with thousands separators.
    pub limit: String,
    /// Used / limit as a percentage with one decimal.
    pub percentage: String,
}

/// Formats block gas usage against its limit.
#[must_use]
pub fn format_gas_usage(used: &str, limit: &str) -> GasUsage {
    let used_value = used.trim().parse::<u64>().ok();
    let limit_value = limit.trim().parse::<u64>().ok();

    let percentage = match (used_value, limit_value) {
        (Some(u), Some(l)) if l > 0 => {
            let permille = (u128::from(u) * 1000 + u128::from(l) / 2) / u128::from(l);
            format!("{}.{}", permille / 10, permille % 10)
        }
        (Some(_), Some(_)) => "0.0".to_string(),
        _ => PLACEHOLDER.to_string(),
    };

    GasUsage {
        used: used_value.map_or_else(|| PLACEHOLDER.to_string(), format_count),
        limit: limit_value.map_or_else(|| PLACEHOLDER.to_string(), format_count),
        percentage,
    }
}

// ============================================================================
// Time
// ============================================================================

/// Formats Unix seconds as a UTC date-time.
#[must_use]
pub fn format_timestamp_secs(secs: i64) -> String {
    if secs == 0 {
        return "Timestamp not available".to_string();
    }
    DateTime::from_timestamp(secs, 0).map_or_else(
        || PLACEHOLDER.to_string(),
        |dt| dt.format("%a, %d %b %Y %H:%M:%S").to_string(),
    )
}

/// Formats a Unix-seconds string as a UTC date-time.
#[must_use]
pub fn format_timestamp(unix_secs: &str) -> String {
    unix_secs
        .trim()
        .parse::<i64>()
        .map_or_else(|_| PLACEHOLDER.to_string(), format_timestamp_secs)
}

/// Renders how long ago a Unix-seconds timestamp was, relative to `now`.
///
/// Timestamps in the future count as zero seconds ago.
#[must_use]
pub fn relative_time(unix_secs: &str, now: DateTime<Utc>) -> String {
    let Ok(secs) = unix_secs.trim().parse::<i64>() else {
        return PLACEHOLDER.to_string();
    };
    let elapsed = now.timestamp().saturating_sub(secs).max(0);

    match elapsed {
        0..60 => format!("{elapsed}s ago"),
        60..3_600 => format!("{}m ago", elapsed / 60),
        3_600..86_400 => format!("{}h ago", elapsed / 3_600),
        _ => format!("{}d ago", elapsed / 86_400),
    }
}

// ============================================================================
// Hashes and Addresses
// ============================================================================

fn elide(value: &str, prefix: usize, suffix: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < prefix + suffix {
        return value.to_string();
    }
    let head: String = chars[..prefix].iter().collect();
    let tail: String = chars[chars.len() - suffix..].iter().collect();
    format!("{head}{ELLIPSIS}{tail}")
}

/// Shortens a hash to its first 10 and last 8 characters joined by `...`.
///
/// The result is always 21 characters long. Inputs shorter than 18
/// characters are returned unchanged.
#[must_use]
pub fn format_hash(hash: &str) -> String {
    elide(hash, HASH_PREFIX, HASH_SUFFIX)
}

/// Shortens an address to its first 6 and last 4 characters.
#[must_use]
pub fn shorten_address(address: &str) -> String {
    elide(address, ADDRESS_PREFIX, ADDRESS_SUFFIX)
}

// ============================================================================
// Tests
// ============================================================================
