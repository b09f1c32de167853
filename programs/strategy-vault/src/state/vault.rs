use anchor_lang::prelude::*;

use crate::errors::VaultError;

/// Global vault state tracking the share ledger
///
/// Security considerations:
/// - Authority stored in state (not instruction args)
/// - total_shares mirrors the share mint supply
/// - Bumps stored for efficient PDA signing
/// - 128 bytes padding for future upgrades
///
/// Pool value is never cached here: it is recomputed on every operation as
/// idle vault balance + current strategy reported value, so deposits and
/// withdrawals always price shares against the same denominator.
#[account]
pub struct VaultState {
    /// Authority that can manage strategies and rebalance pooled funds
    pub authority: Pubkey,          // 32 bytes

    /// Mint of the underlying asset token
    pub asset_mint: Pubkey,         // 32 bytes

    /// Mint of the vault share token
    pub share_mint: Pubkey,         // 32 bytes

    /// Total shares issued to depositors; mirrors share_mint.supply
    pub total_shares: u64,          // 8 bytes

    /// Swap-protection bound in basis points, 0..=10_000
    pub max_slippage_bps: u16,      // 2 bytes

    /// Bump seed for vault state PDA
    pub bump: u8,                   // 1 byte

    /// Bump seed for share mint PDA
    pub share_bump: u8,             // 1 byte

    /// Bump seed for vault authority PDA
    pub authority_bump: u8,         // 1 byte

    // Padding for future upgrades
    pub _reserved: [u8; 128],       // 128 bytes
}

impl VaultState {
    /// Shares to mint for a deposit, priced against the pool value
    /// measured before the deposit landed.
    ///
    /// - First deposit bootstraps the 1:1 rate: shares = amount
    /// - Otherwise: shares = amount * total_shares / pool_value_before
    ///
    /// Security: u128 intermediate prevents overflow; floor division, dust
    /// accrues to existing holders.
    pub fn shares_for_deposit(&self, amount: u64, pool_value_before: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(amount);
        }
        if pool_value_before == 0 {
            // shares exist but the pool reports no value; minting here would
            // hand the depositor the whole pool
            return err!(VaultError::DivisionByZero);
        }

        let shares = (amount as u128)
            .checked_mul(self.total_shares as u128)
            .ok_or(error!(VaultError::MathOverflow))?
            / (pool_value_before as u128);

        u64::try_from(shares).map_err(|_| error!(VaultError::MathOverflow))
    }

    /// Asset value of a share quantity at the given pool value.
    ///
    /// amount = shares * pool_value / total_shares, floor division.
    pub fn assets_for_shares(&self, shares: u64, pool_value: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return err!(VaultError::DivisionByZero);
        }

        let amount = (shares as u128)
            .checked_mul(pool_value as u128)
            .ok_or(error!(VaultError::MathOverflow))?
            / (self.total_shares as u128);

        u64::try_from(amount).map_err(|_| error!(VaultError::MathOverflow))
    }

    /// Read-side valuation: 0 for an empty pool instead of an error.
    pub fn share_value(&self, shares: u64, pool_value: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }
        self.assets_for_shares(shares, pool_value)
    }
}
