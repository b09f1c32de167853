//! Read-only views of collaborator program state.
//!
//! These layouts are declared locally and deserialized from raw account
//! data; the owning programs validate all writes. The vault only ever
//! reads them to value positions and to quote swaps.

use anchor_lang::prelude::*;

use crate::state::PriceSample;

/// Oracle price feed account.
///
/// `price` is the value of one quote-asset unit expressed in base-asset
/// units, WAD-scaled (1e18).
#[account]
#[derive(Debug)]
pub struct PriceFeed {
    pub asset_mint: Pubkey,
    pub price: i128,
    pub started_at: i64,
    pub updated_at: i64,
}

impl PriceFeed {
    pub fn sample(&self) -> PriceSample {
        PriceSample {
            price: self.price,
            started_at: self.started_at,
            updated_at: self.updated_at,
        }
    }
}

/// Lending market reserve state.
///
/// Collateral tokens appreciate against the liquidity they represent;
/// exchange rate = liquidity_available / collateral_mint_supply.
#[account]
#[derive(Debug)]
pub struct LendingMarket {
    pub asset_mint: Pubkey,
    pub market_authority: Pubkey,
    pub liquidity_vault: Pubkey,
    pub collateral_mint: Pubkey,
    pub liquidity_available: u64,
    pub collateral_mint_supply: u64,
}

/// Per-account position in the lending market, for leverage strategies.
///
/// `health_factor` is WAD-scaled; below 1e18 the position risks
/// liquidation.
#[account]
#[derive(Debug)]
pub struct Obligation {
    pub owner: Pubkey,
    pub market: Pubkey,
    pub collateral_value: u64,
    pub debt_value: u64,
    pub health_factor: u128,
}

/// Constant-product AMM pool; `base` is the vault accounting asset.
#[account]
#[derive(Debug)]
pub struct AmmPool {
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub pool_authority: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_reserve: u64,
    pub quote_reserve: u64,
    pub fee_bps: u16,
}
