use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Remove a strategy from the registry
///
/// Refused while the entry is the current strategy or still holds funds;
/// removal implicitly zeroes its allocation.
#[derive(Accounts)]
pub struct RemoveStrategy<'info> {
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

pub fn handler(ctx: Context<RemoveStrategy>, market: Pubkey) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;

    let entry = registry
        .get_strategy(&market)
        .ok_or(error!(VaultError::StrategyNotFound))?;

    require!(
        registry.current_strategy != market,
        VaultError::StrategyInUse
    );
    require!(entry.deployed_amount == 0, VaultError::StrategyInUse);

    registry.strategies.retain(|s| s.market != market);

    emit!(StrategyRemoved {
        vault: registry.vault,
        market,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
