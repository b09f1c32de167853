use anchor_lang::prelude::*;

use crate::constants::MAX_PRICE_AGE_SECONDS;
use crate::errors::VaultError;

/// One oracle observation, WAD-scaled (1e18)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSample {
    pub price: i128,
    pub started_at: i64,
    pub updated_at: i64,
}

impl PriceSample {
    /// Validate the sample against `now` and return the usable price.
    ///
    /// Rejected as `InvalidPrice`: non-positive price, or a round that
    /// claims to have finished before it started. Rejected as `StalePrice`:
    /// older than the freshness bound.
    pub fn validate(&self, now: i64) -> Result<u128> {
        require!(self.price > 0, VaultError::InvalidPrice);
        require!(self.updated_at >= self.started_at, VaultError::InvalidPrice);
        require!(
            now.saturating_sub(self.updated_at) <= MAX_PRICE_AGE_SECONDS,
            VaultError::StalePrice
        );
        Ok(self.price as u128)
    }
}
