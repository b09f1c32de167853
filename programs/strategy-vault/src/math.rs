use anchor_lang::prelude::*;

use crate::constants::BPS_DENOMINATOR;
use crate::errors::VaultError;

/// amount * numerator / denominator with a u128 intermediate.
/// Floor division throughout; residual dust accrues to the pool.
pub fn mul_div(amount: u64, numerator: u64, denominator: u64) -> Result<u64> {
    if denominator == 0 {
        return err!(VaultError::DivisionByZero);
    }
    let result = (amount as u128)
        .checked_mul(numerator as u128)
        .ok_or(error!(VaultError::MathOverflow))?
        / (denominator as u128);
    u64::try_from(result).map_err(|_| error!(VaultError::MathOverflow))
}

/// Basis-point share of an amount (floor)
pub fn apply_bps(amount: u64, bps: u16) -> Result<u64> {
    mul_div(amount, bps as u64, BPS_DENOMINATOR as u64)
}

/// a * b / c over u128 operands, for WAD-scaled price math
pub fn mul_div_u128(a: u128, b: u128, c: u128) -> Result<u128> {
    if c == 0 {
        return err!(VaultError::DivisionByZero);
    }
    a.checked_mul(b)
        .map(|p| p / c)
        .ok_or(error!(VaultError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_floors() {
        assert_eq!(mul_div(100, 333, 1000).unwrap(), 33);
        assert_eq!(mul_div(7, 1, 2).unwrap(), 3);
    }

    #[test]
    fn mul_div_large_operands() {
        // u128 intermediate keeps u64::MAX * u64-scale products alive
        assert_eq!(mul_div(u64::MAX, 1, 1).unwrap(), u64::MAX);
        assert_eq!(mul_div(u64::MAX, 2, 4).unwrap(), u64::MAX / 2);
    }

    #[test]
    fn mul_div_zero_denominator() {
        assert!(mul_div(1, 1, 0).is_err());
    }

    #[test]
    fn apply_bps_splits() {
        assert_eq!(apply_bps(1000, 6000).unwrap(), 600);
        assert_eq!(apply_bps(1000, 4000).unwrap(), 400);
        assert_eq!(apply_bps(1000, 0).unwrap(), 0);
        assert_eq!(apply_bps(1000, 10_000).unwrap(), 1000);
    }
}
