use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::math::apply_bps;
use crate::strategy::{StrategyContext, StrategyGateway};
use crate::{constants::*, errors::*, events::*, state::*};

/// Move pooled funds to match a submitted allocation set
///
/// Fully exits the current strategy, then splits the freed idle balance
/// pro-rata across the targets. Remaining accounts: current strategy
/// adapter accounts (when one is set), then one adapter account set per
/// target in argument order.
#[derive(Accounts)]
pub struct Rebalance<'info> {
    /// Vault authority - only they can rebalance
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

pub fn handler(ctx: Context<Rebalance>, allocations: Vec<StrategyAllocation>) -> Result<()> {
    // CHECKS: reject before anything moves so a bad allocation set leaves
    // the table and pointer untouched
    ctx.accounts
        .strategy_registry
        .check_rebalance_allocations(&allocations)?;

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
    let mut recalled = 0u64;

    // Full exit from the current strategy. A strategy that reports value
    // but returns nothing is stuck; abort. Zero-after-empty is success.
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
        recalled = old_gateway.recall_all()?;
        require!(
            expected == 0 || recalled > 0,
            VaultError::RebalanceFailed
        );
        ctx.accounts
            .strategy_registry
            .record_recall(&old_market, recalled)?;
    }

    // Redeploy the freed balance pro-rata; floor division leaves the dust
    // remainder idle
    ctx.accounts.vault_token_account.reload()?;
    let idle = ctx.accounts.vault_token_account.amount;

    let mut redeployed = 0u64;
    for target in &allocations {
        let entry = ctx
            .accounts
            .strategy_registry
            .get_strategy(&target.market)
            .ok_or(error!(VaultError::StrategyNotFound))?
            .clone();
        let (gateway, consumed) = StrategyGateway::load(
            &entry,
            &ctx.remaining_accounts[cursor..],
            strategy_ctx,
        )?;
        cursor += consumed;

        let amount = apply_bps(idle, target.allocation_bps)?;
        if amount > 0 {
            gateway.deploy(amount)?;
            ctx.accounts
                .strategy_registry
                .record_deploy(&target.market, amount)?;
            redeployed = redeployed
                .checked_add(amount)
                .ok_or(VaultError::MathOverflow)?;
        }
    }

    // Table and pointer update: exactly one non-zero target stays
    // SingleActive, any split clears the pointer (Distributed)
    let registry = &mut ctx.accounts.strategy_registry;
    registry.apply_allocations(&allocations);
    registry.current_strategy = StrategyRegistry::resolve_current_after_rebalance(&allocations);

    emit!(Rebalanced {
        vault: registry.vault,
        recalled_amount: recalled,
        redeployed_amount: redeployed,
        target_count: allocations.len() as u8,
        current_strategy: registry.current_strategy,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
