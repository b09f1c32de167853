use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Edit target allocations without moving funds
///
/// Entries not named keep their allocation; the resulting total must stay
/// within [0, 10_000]. Actual fund movement happens only via rebalance.
#[derive(Accounts)]
pub struct UpdateAllocations<'info> {
    /// Vault authority - only they can manage allocations
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Strategy registry PDA
    #[account(
        mut,
        seeds = [REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

pub fn handler(
    ctx: Context<UpdateAllocations>,
    allocations: Vec<StrategyAllocation>,
) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;

    registry.check_allocation_edit(&allocations)?;
    registry.apply_allocations(&allocations);

    emit!(AllocationsUpdated {
        vault: registry.vault,
        total_allocation_bps: registry.total_allocation_bps(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
