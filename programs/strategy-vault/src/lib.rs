// Strategy Vault - pooled custody vault with pluggable yield strategies
// Depositors hold proportional share tokens; the authority routes pooled
// funds into approved external strategies and rebalances between them.

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;
pub mod strategy;

use instructions::*;
use state::{StrategyAllocation, StrategyKind};
use strategy::lending::RateMode;

declare_id!("2Fh8HiT2N6LvSiPYcgT7P1xBGWuXvKjMZc3pk2GovGTa");

#[program]
pub mod strategy_vault {
    use super::*;

    /// Initialize a new vault for a given asset token
    ///
    /// Security considerations:
    /// - Validates authority is signer
    /// - Initializes vault state with proper PDAs
    /// - Creates share mint with vault as mint authority
    pub fn initialize(ctx: Context<Initialize>, max_slippage_bps: u16) -> Result<()> {
        instructions::initialize::handler(ctx, max_slippage_bps)
    }

    /// Deposit assets into the vault and receive shares
    ///
    /// Shares are priced against the pool value before the deposit; the
    /// fresh deposit is forwarded to the current strategy when one is set.
    ///
    /// Security considerations:
    /// - Validates user token accounts (mint, owner)
    /// - Uses checked math for share calculation
    /// - Follows checks-effects-interactions pattern
    /// - A strategy deploy failure fails the whole deposit
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        instructions::deposit::handler(ctx, amount)
    }

    /// Redeem shares for the proportional slice of the pool
    ///
    /// Recalls any shortfall from the current strategy before paying out,
    /// then burns the shares.
    pub fn withdraw(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
        instructions::withdraw::handler(ctx, shares)
    }

    /// Value a holder's shares against the live pool value
    pub fn user_share_value(ctx: Context<UserShareValue>) -> Result<u64> {
        instructions::user_share_value::handler(ctx)
    }

    /// Add a new strategy to the approved registry
    ///
    /// Security considerations:
    /// - Authority-only function
    /// - Validates strategy doesn't already exist
    /// - Enforces registry size limits
    pub fn add_strategy(
        ctx: Context<AddStrategy>,
        market: Pubkey,
        kind: StrategyKind,
        name: String,
    ) -> Result<()> {
        instructions::add_strategy::handler(ctx, market, kind, name)
    }

    /// Remove a strategy from the registry
    ///
    /// Refused while the strategy is current or still holds funds.
    pub fn remove_strategy(ctx: Context<RemoveStrategy>, market: Pubkey) -> Result<()> {
        instructions::remove_strategy::handler(ctx, market)
    }

    /// Enable or disable a strategy without removing it
    ///
    /// Security considerations:
    /// - Authority-only function
    /// - Emergency shutdown capability per strategy
    /// - Deployed funds remain recallable while disabled
    pub fn toggle_strategy(
        ctx: Context<ToggleStrategy>,
        market: Pubkey,
        enabled: bool,
    ) -> Result<()> {
        instructions::toggle_strategy::handler(ctx, market, enabled)
    }

    /// Edit target allocations without moving funds
    ///
    /// The resulting table total must stay within [0, 10_000] bps; funds
    /// only move through rebalance.
    pub fn update_allocations(
        ctx: Context<UpdateAllocations>,
        allocations: Vec<StrategyAllocation>,
    ) -> Result<()> {
        instructions::update_allocations::handler(ctx, allocations)
    }

    /// Switch the current strategy, moving all pooled funds into it
    pub fn set_strategy(ctx: Context<SetStrategy>, new_market: Pubkey) -> Result<()> {
        instructions::set_strategy::handler(ctx, new_market)
    }

    /// Move pooled funds to match a submitted allocation set
    ///
    /// Allocations must sum to exactly 10_000 bps. Fully exits the current
    /// strategy, then redeploys pro-rata; a stuck strategy aborts the whole
    /// operation.
    pub fn rebalance(
        ctx: Context<Rebalance>,
        allocations: Vec<StrategyAllocation>,
    ) -> Result<()> {
        instructions::rebalance::handler(ctx, allocations)
    }

    /// Update the swap-protection bound
    pub fn set_max_slippage(ctx: Context<SetMaxSlippage>, max_slippage_bps: u16) -> Result<()> {
        instructions::set_max_slippage::handler(ctx, max_slippage_bps)
    }

    /// Repay lending-market debt while the position is underwater
    ///
    /// Permitted only when the obligation health factor is below 1.0.
    pub fn emergency_repay(
        ctx: Context<EmergencyRepay>,
        amount: u64,
        rate_mode: RateMode,
    ) -> Result<()> {
        instructions::emergency_repay::handler(ctx, amount, rate_mode)
    }
}
