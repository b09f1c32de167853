use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::strategy::{StrategyContext, StrategyGateway};
use crate::{constants::*, errors::*, events::*, state::*};

/// Deposit assets into the vault and receive shares
///
/// Shares are priced against the pool value measured before the deposit:
/// idle vault balance plus the current strategy's reported value. When a
/// strategy is active its adapter accounts travel as remaining accounts and
/// the fresh deposit is forwarded in the same transaction; a deploy failure
/// fails the whole deposit.
#[derive(Accounts)]
pub struct Deposit<'info> {
    /// User depositing assets
    /// Security: Must be signer
    #[account(mut)]
    pub user: Signer<'info>,

    /// Vault state PDA
    /// Security: Validated by seeds, contains authority and totals
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
    /// Security: Must match vault_state.asset_mint
    #[account(
        address = vault_state.asset_mint,
    )]
    pub asset_mint: Account<'info, Mint>,

    /// Share mint
    /// Security: Must match vault_state.share_mint
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

    /// User's asset token account (source)
    /// Security: Must be owned by user and correct mint
    #[account(
        mut,
        constraint = user_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    /// User's share token account (destination)
    /// Security: Must be owned by user and correct mint
    #[account(
        mut,
        constraint = user_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = user_share_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    /// Vault's token account
    /// Security: Must be correct mint and owned by vault_authority
    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    // remaining accounts: current strategy adapter accounts, when one is set
}

pub fn handler(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    // CHECKS: Validate amount
    require!(amount > 0, VaultError::InvalidAmount);

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

    // Pool value before the deposit: idle balance + strategy reported value
    let idle_before = ctx.accounts.vault_token_account.amount;
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
    let pool_value_before = idle_before
        .checked_add(strategy_value)
        .ok_or(VaultError::MathOverflow)?;

    let vault_state = &mut ctx.accounts.vault_state;
    let shares_to_mint = vault_state.shares_for_deposit(amount, pool_value_before)?;

    // EFFECTS: Update the share ledger BEFORE external calls
    vault_state.total_shares = vault_state
        .total_shares
        .checked_add(shares_to_mint)
        .ok_or(VaultError::MathOverflow)?;

    // INTERACTIONS: External calls after state updates

    // Pull assets from user to vault
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.user_asset_account.to_account_info(),
            to: ctx.accounts.vault_token_account.to_account_info(),
            authority: ctx.accounts.user.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, amount)?;

    // Forward the fresh deposit into the current strategy; a failure here
    // aborts the whole deposit
    if let Some(gateway) = &gateway {
        gateway.deploy(amount)?;
        let market = current_entry.as_ref().map(|e| e.market).unwrap_or_default();
        ctx.accounts
            .strategy_registry
            .as_mut()
            .ok_or(VaultError::NoStrategySet)?
            .record_deploy(&market, amount)?;
    }

    // Mint shares to user
    let signer_seeds = &[authority_seeds];
    let mint_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        MintTo {
            mint: ctx.accounts.share_mint.to_account_info(),
            to: ctx.accounts.user_share_account.to_account_info(),
            authority: ctx.accounts.vault_authority.to_account_info(),
        },
        signer_seeds,
    );
    token::mint_to(mint_ctx, shares_to_mint)?;

    emit!(Deposited {
        vault: ctx.accounts.vault_state.key(),
        user: ctx.accounts.user.key(),
        asset_amount: amount,
        shares_minted: shares_to_mint,
        pool_value_before,
        total_shares: ctx.accounts.vault_state.total_shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
