use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::strategy::{StrategyContext, StrategyGateway};
use crate::{constants::*, errors::*, events::*, state::*};

/// Switch the current strategy
///
/// Fully exits the old strategy (when one is set), deploys the freed idle
/// balance into the new one and moves the pointer. Remaining accounts:
/// old strategy adapter accounts (when a strategy is set), then the new
/// strategy's adapter accounts.
#[derive(Accounts)]
pub struct SetStrategy<'info> {
    /// Vault authority - only they can switch strategies
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

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's token account
    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<SetStrategy>, new_market: Pubkey) -> Result<()> {
    let registry = &ctx.accounts.strategy_registry;

    let new_entry = registry
        .get_strategy(&new_market)
        .ok_or(error!(VaultError::StrategyNotFound))?
        .clone();
    require!(new_entry.enabled, VaultError::StrategyDisabled);

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

    let old_market = ctx.accounts.strategy_registry.current_strategy;
    let mut cursor = 0usize;

    // Exit the old position first; zero returned from an already-empty
    // strategy is success
    if old_market != Pubkey::default() {
        let old_entry = ctx
            .accounts
            .strategy_registry
            .get_strategy(&old_market)
            .ok_or(error!(VaultError::StrategyNotFound))?
            .clone();
        let (old_gateway, consumed) =
            StrategyGateway::load(&old_entry, ctx.remaining_accounts, strategy_ctx)?;
        cursor += consumed;

        let expected = old_gateway.current_value()?;
        let returned = old_gateway.recall_all()?;
        require!(
            expected == 0 || returned > 0,
            VaultError::RebalanceFailed
        );
        ctx.accounts
            .strategy_registry
            .record_recall(&old_market, returned)?;
    }

    // Deploy everything the vault now holds idle into the new strategy
    ctx.accounts.vault_token_account.reload()?;
    let idle = ctx.accounts.vault_token_account.amount;

    if idle > 0 {
        let (new_gateway, _) = StrategyGateway::load(
            &new_entry,
            &ctx.remaining_accounts[cursor..],
            strategy_ctx,
        )?;
        new_gateway.deploy(idle)?;
        ctx.accounts
            .strategy_registry
            .record_deploy(&new_market, idle)?;
    }

    ctx.accounts.strategy_registry.current_strategy = new_market;

    emit!(StrategySwitched {
        vault: ctx.accounts.strategy_registry.vault,
        old_strategy: old_market,
        new_strategy: new_market,
        moved_amount: idle,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
