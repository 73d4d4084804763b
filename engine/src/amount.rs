//! Exact conversion between human-scale `Decimal` values and raw ledger integers.
//!
//! Raw amounts are `i128` scaled by the denomination's decimal context.
//! Withholding rates are raw fixed point where `WITHHOLDING_PRECISION` is 100%;
//! at the engine boundary they are percentages.

use primitive_types::U256;
use rust_decimal::Decimal;

use crate::error::{DividendError, Result};

pub use dividend_checkpoint::WITHHOLDING_PRECISION;

/// Fractional digits of a percentage in the raw withholding representation.
pub const PERCENT_DECIMALS: u32 = 16;

/// Convert a human-scale amount to raw units. Never rounds.
pub fn to_raw(value: Decimal, decimals: u32) -> Result<i128> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DividendError::InvalidData(format!(
            "negative amount {value}"
        )));
    }
    let value = value.normalize();
    if value.scale() > decimals {
        return Err(DividendError::InvalidData(format!(
            "amount {value} has more than {decimals} fractional digits"
        )));
    }
    10i128
        .checked_pow(decimals - value.scale())
        .and_then(|factor| value.mantissa().checked_mul(factor))
        .ok_or_else(|| DividendError::InvalidData(format!("amount {value} overflows")))
}

/// Convert raw units back to a human-scale amount.
pub fn from_raw(raw: i128, decimals: u32) -> Result<Decimal> {
    Decimal::try_from_i128_with_scale(raw, decimals).map_err(|err| {
        DividendError::InvalidData(format!(
            "raw amount {raw} at {decimals} decimals is not representable: {err}"
        ))
    })
}

/// Percentage (0 to 100) to raw withholding fixed point.
pub fn percent_to_raw(percent: Decimal) -> Result<i128> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(DividendError::InvalidData(format!(
            "withholding rate {percent} is outside 0..=100"
        )));
    }
    to_raw(percent, PERCENT_DECIMALS)
}

pub fn raw_to_percent(raw: i128) -> Result<Decimal> {
    from_raw(raw, PERCENT_DECIMALS)
}

/// floor(a * b / c) with a 256-bit intermediate. A zero divisor yields zero.
pub fn mul_div(a: i128, b: i128, c: i128) -> Result<i128> {
    if a < 0 || b < 0 || c < 0 {
        return Err(DividendError::InvalidData(
            "negative operand in proportional split".to_string(),
        ));
    }
    if c == 0 {
        return Ok(0);
    }
    let quotient = U256::from(a as u128) * U256::from(b as u128) / U256::from(c as u128);
    if quotient > U256::from(i128::MAX as u128) {
        return Err(DividendError::InvalidData(
            "proportional split overflows".to_string(),
        ));
    }
    Ok(quotient.as_u128() as i128)
}

/// Split a gross raw amount into (claim, withheld) for a raw withholding rate.
pub fn split_withholding(gross: i128, rate: i128) -> Result<(i128, i128)> {
    let withheld = mul_div(gross, rate, WITHHOLDING_PRECISION)?;
    Ok((gross - withheld, withheld))
}
