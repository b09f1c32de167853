use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::strategy::{StrategyContext, StrategyGateway};
use crate::{constants::*, errors::*, events::*, state::*};

/// Redeem shares for the proportional slice of the pool
///
/// The payout is priced against the live pool value. When the idle balance
/// cannot cover it the shortfall is recalled from the current strategy in
/// the same transaction; any recall failure fails the whole withdrawal.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// User redeeming shares
    /// Security: Must be signer
    #[account(mut)]
    pub user: Signer<'info>,

    /// Vault state PDA
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Strategy registry PDA; absent until the first strategy is added
    #[account(
        mut,
        seeds = [REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Option<Account<'info, StrategyRegistry>>,

    /// Asset mint
    #[account(
        address = vault_state.asset_mint,
    )]
    pub asset_mint: Account<'info, Mint>,

    /// Share mint
    #[account(
        mut,
        address = vault_state.share_mint,
    )]
    pub share_mint: Account<'info, Mint>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// User's asset token account (destination)
    #[account(
        mut,
        constraint = user_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    /// User's share token account (source of the burn)
    #[account(
        mut,
        constraint = user_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = user_share_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    /// Vault's token account
    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    // remaining accounts: current strategy adapter accounts, when one is set
}

pub fn handler(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
    // CHECKS: Validate shares against the caller's balance
    require!(shares > 0, VaultError::InvalidShares);
    require!(
        ctx.accounts.user_share_account.amount >= shares,
        VaultError::InsufficientShares
    );

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

    // Pool value before the withdrawal prices the shares
    let idle = ctx.accounts.vault_token_account.amount;
    let current_entry = ctx
        .accounts
        .strategy_registry
        .as_ref()
        .and_then(|r| r.current_entry().cloned());

    let gateway = match &current_entry {
        Some(entry) => {
            let (gateway, _) =
                StrategyGateway::load(entry, ctx.remaining_accounts, strategy_ctx)?;
            Some(gateway)
        }
        None => None,
    };

    let strategy_value = match &gateway {
        Some(g) => g.current_value()?,
        None => 0,
    };
    let pool_value = idle
        .checked_add(strategy_value)
        .ok_or(VaultError::MathOverflow)?;

    let amount = ctx
        .accounts
        .vault_state
        .assets_for_shares(shares, pool_value)?;

    // Recall the shortfall from the current strategy when the idle balance
    // cannot cover the payout
    let mut recalled = 0u64;
    if amount > idle {
        let shortfall = amount - idle;
        let gateway = gateway.as_ref().ok_or(VaultError::NoStrategySet)?;
        recalled = gateway.recall(shortfall)?;
        let market = current_entry.as_ref().map(|e| e.market).unwrap_or_default();
        ctx.accounts
            .strategy_registry
            .as_mut()
            .ok_or(VaultError::NoStrategySet)?
            .record_recall(&market, recalled)?;
    }

    // EFFECTS: Update the share ledger before moving funds out
    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.total_shares = vault_state
        .total_shares
        .checked_sub(shares)
        .ok_or(VaultError::InsufficientShares)?;

    // INTERACTIONS

    // Burn the user's shares
    let burn_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Burn {
            mint: ctx.accounts.share_mint.to_account_info(),
            from: ctx.accounts.user_share_account.to_account_info(),
            authority: ctx.accounts.user.to_account_info(),
        },
    );
    token::burn(burn_ctx, shares)?;

    // Pay the user out of the (possibly replenished) idle balance
    ctx.accounts.vault_token_account.reload()?;
    require!(
        ctx.accounts.vault_token_account.amount >= amount,
        VaultError::TransferFailed
    );

    let signer_seeds = &[authority_seeds];
    let transfer_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.vault_token_account.to_account_info(),
            to: ctx.accounts.user_asset_account.to_account_info(),
            authority: ctx.accounts.vault_authority.to_account_info(),
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, amount)?;

    emit!(Withdrawn {
        vault: ctx.accounts.vault_state.key(),
        user: ctx.accounts.user.key(),
        shares_burned: shares,
        asset_amount: amount,
        recalled_amount: recalled,
        total_shares: ctx.accounts.vault_state.total_shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
