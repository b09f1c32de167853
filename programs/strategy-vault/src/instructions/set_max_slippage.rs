use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Update the swap-protection bound
#[derive(Accounts)]
pub struct SetMaxSlippage<'info> {
    /// Vault authority
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<SetMaxSlippage>, max_slippage_bps: u16) -> Result<()> {
    require!(
        max_slippage_bps <= BPS_DENOMINATOR,
        VaultError::InvalidAmount
    );

    let vault_state = &mut ctx.accounts.vault_state;
    let old = vault_state.max_slippage_bps;
    vault_state.max_slippage_bps = max_slippage_bps;

    emit!(MaxSlippageUpdated {
        vault: vault_state.key(),
        old_max_slippage_bps: old,
        new_max_slippage_bps: max_slippage_bps,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
