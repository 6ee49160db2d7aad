use anyhow::{anyhow, bail, Result};
use ethereum_types::U256;

pub const ETHER_DECIMALS: u8 = 18;

/// Largest `n` with `10^n` representable in a `U256`.
pub const MAX_EXP10: u8 = 77;

/// Parse a human readable amount, e.g. "1000" or "0.25", into base units.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256> {
    let value = value.trim();
    let (int_part, frac_part) = value.split_once('.').unwrap_or((value, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        bail!("empty amount");
    }
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(int_part) || !is_digits(frac_part) {
        bail!("invalid amount: {}", value);
    }

    let frac_part = frac_part.trim_end_matches('0');
    let decimals = decimals as usize;
    if frac_part.len() > decimals {
        bail!(
            "amount {} has more than {} fractional digits",
            value,
            decimals
        );
    }

    let digits = format!(
        "{}{}{}",
        int_part,
        frac_part,
        "0".repeat(decimals - frac_part.len())
    );
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|err| anyhow!("invalid amount {}: {:?}", value, err))
}

/// Format base units the way ethers' `formatUnits` does: at least one
/// fractional digit, trailing zeros trimmed.
pub fn format_units(value: U256, decimals: u8) -> String {
    // every U256 is below 10^decimals past MAX_EXP10
    let (int_part, frac_part) = if decimals > MAX_EXP10 {
        (U256::zero(), value)
    } else {
        let base = U256::exp10(decimals as usize);
        (value / base, value % base)
    };
    let frac_part = format!(
        "{:0>width$}",
        frac_part.to_string(),
        width = decimals as usize
    );
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{}.0", int_part)
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

pub fn parse_ether(value: &str) -> Result<U256> {
    parse_units(value, ETHER_DECIMALS)
}

pub fn format_ether(value: U256) -> String {
    format_units(value, ETHER_DECIMALS)
}
