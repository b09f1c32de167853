use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Add a new strategy to the approved registry
#[derive(Accounts)]
pub struct AddStrategy<'info> {
    /// Vault authority - only they can manage strategies
    /// Security: Must be signer and match vault_state.authority
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: has_one constraint validates authority from state
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Strategy registry PDA
    /// Security: Initialized on first add_strategy call
    #[account(
        init_if_needed,
        payer = authority,
        space = StrategyRegistry::SPACE,
        seeds = [REGISTRY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<AddStrategy>,
    market: Pubkey,
    kind: StrategyKind,
    name: String,
) -> Result<()> {
    // CHECKS: Validate inputs
    require!(name.len() <= MAX_NAME_LEN, VaultError::NameTooLong);

    let registry = &mut ctx.accounts.strategy_registry;

    // Initialize registry if first time
    if registry.vault == Pubkey::default() {
        registry.vault = ctx.accounts.vault_state.key();
        registry.current_strategy = Pubkey::default();
        registry.bump = ctx.bumps.strategy_registry;
        registry.strategies = Vec::new();
    }

    // Check if strategy already exists
    require!(
        !registry.strategies.iter().any(|s| s.market == market),
        VaultError::StrategyAlreadyExists
    );

    // Check registry capacity
    require!(
        registry.strategies.len() < MAX_STRATEGIES,
        VaultError::RegistryFull
    );

    // EFFECTS: Add strategy to registry with a zero allocation; funds only
    // move through rebalance/set_strategy
    registry.strategies.push(StrategyEntry {
        market,
        kind,
        enabled: true,
        allocation_bps: 0,
        deployed_amount: 0,
        name: name.clone(),
    });

    emit!(StrategyAdded {
        vault: registry.vault,
        market,
        kind,
        name,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
