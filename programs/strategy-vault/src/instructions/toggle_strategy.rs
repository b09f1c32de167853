use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Enable or disable a strategy without removing it
///
/// A disabled entry cannot be targeted by set_strategy or receive a new
/// allocation; funds already deployed can still be recalled.
#[derive(Accounts)]
pub struct ToggleStrategy<'info> {
    /// Vault authority - only they can manage strategies
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

pub fn handler(ctx: Context<ToggleStrategy>, market: Pubkey, enabled: bool) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;

    let entry = registry
        .get_strategy_mut(&market)
        .ok_or(error!(VaultError::StrategyNotFound))?;

    entry.enabled = enabled;

    emit!(StrategyToggled {
        vault: registry.vault,
        market,
        enabled,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
