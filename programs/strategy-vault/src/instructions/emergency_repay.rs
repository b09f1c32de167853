use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::strategy::lending::{LendingAdapter, RateMode};
use crate::strategy::StrategyContext;
use crate::{constants::*, errors::*, events::*, state::*};

/// Repay lending-market debt while the position is underwater
///
/// The designed circuit-breaker for leverage strategies: permitted only
/// when the obligation health factor has fallen below 1.0. Remaining
/// accounts: the current lending strategy's adapter accounts.
#[derive(Accounts)]
pub struct EmergencyRepay<'info> {
    /// Vault authority - only they can trigger the emergency path
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
        seeds = [REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's token account; source of the repayment
    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<EmergencyRepay>, amount: u64, rate_mode: RateMode) -> Result<()> {
    require!(amount > 0, VaultError::InvalidAmount);

    let registry = &ctx.accounts.strategy_registry;
    require!(registry.has_current_strategy(), VaultError::NoStrategySet);

    let entry = registry
        .current_entry()
        .ok_or(error!(VaultError::StrategyNotFound))?;
    require!(
        entry.kind == StrategyKind::Lending,
        VaultError::NoStrategySet
    );
    let market = entry.market;

    let asset_mint_key = ctx.accounts.vault_state.asset_mint;
    let authority_bump = ctx.accounts.vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];

    let vault_asset_info = ctx.accounts.vault_token_account.to_account_info();
    let vault_authority_info = ctx.accounts.vault_authority.to_account_info();
    let token_program_info = ctx.accounts.token_program.to_account_info();

    let strategy_ctx = StrategyContext {
        vault_asset_account: &vault_asset_info,
        vault_authority: &vault_authority_info,
        token_program: &token_program_info,
        authority_seeds,
        max_slippage_bps: ctx.accounts.vault_state.max_slippage_bps,
    };

    let adapter = LendingAdapter::load(&market, ctx.remaining_accounts, strategy_ctx)?;
    let health_factor = adapter.emergency_repay(amount, rate_mode)?;

    emit!(EmergencyRepaid {
        vault: registry.vault,
        market,
        amount,
        health_factor,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
