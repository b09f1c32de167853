use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::strategy::{StrategyContext, StrategyGateway};
use crate::{constants::*, errors::*, state::*};

/// Value a holder's shares against the live pool value; pure read
#[derive(Accounts)]
pub struct UserShareValue<'info> {
    /// Vault state PDA
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Strategy registry PDA; absent until the first strategy is added
    #[account(
        seeds = [REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Option<Account<'info, StrategyRegistry>>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Holder's share token account
    #[account(
        constraint = user_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    /// Vault's token account
    #[account(
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    // remaining accounts: current strategy adapter accounts, when one is set
}

pub fn handler(ctx: Context<UserShareValue>) -> Result<u64> {
    if ctx.accounts.vault_state.total_shares == 0 {
        return Ok(0);
    }

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

    let current_entry = ctx
        .accounts
        .strategy_registry
        .as_ref()
        .and_then(|r| r.current_entry().cloned());

    let strategy_value = match &current_entry {
        Some(entry) => {
            let (gateway, _) =
                StrategyGateway::load(entry, ctx.remaining_accounts, strategy_ctx)?;
            gateway.current_value()?
        }
        None => 0,
    };

    let pool_value = ctx
        .accounts
        .vault_token_account
        .amount
        .checked_add(strategy_value)
        .ok_or(VaultError::MathOverflow)?;

    ctx.accounts
        .vault_state
        .share_value(ctx.accounts.user_share_account.amount, pool_value)
}
