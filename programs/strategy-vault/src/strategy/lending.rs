use anchor_lang::{
    prelude::*,
    solana_program::{instruction::Instruction, program::invoke_signed},
};

use crate::constants::WAD;
use crate::errors::VaultError;
use crate::math::mul_div;
use crate::state::{LendingMarket, Obligation};
use crate::strategy::{expect_token_account, token_amount, StrategyContext};

/// Remaining-accounts layout for a lending strategy:
/// [lending_program, market, market_authority, liquidity_vault,
///  collateral_mint, vault_collateral_account, obligation]
pub const ACCOUNTS_LEN: usize = 7;

/// Repay rate mode forwarded to the lending program
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateMode {
    Stable,
    Variable,
}

pub fn get_supply_discriminator() -> Vec<u8> {
    // discriminator = sha256("global:supply")[0..8]
    vec![81, 67, 116, 61, 250, 209, 5, 198]
}

pub fn get_withdraw_discriminator() -> Vec<u8> {
    // discriminator = sha256("global:withdraw")[0..8]
    vec![183, 18, 70, 156, 148, 109, 161, 34]
}

pub fn get_repay_discriminator() -> Vec<u8> {
    // discriminator = sha256("global:repay")[0..8]
    vec![234, 103, 67, 82, 208, 234, 219, 166]
}

/// Adapter over an external lending market.
///
/// The vault holds collateral tokens; their value follows the market's
/// liquidity/collateral exchange rate. Deploy supplies liquidity, recall
/// withdraws it directly (no swap involved).
pub struct LendingAdapter<'a, 'info> {
    ctx: StrategyContext<'a, 'info>,
    lending_program: &'a AccountInfo<'info>,
    market: &'a AccountInfo<'info>,
    market_authority: &'a AccountInfo<'info>,
    liquidity_vault: &'a AccountInfo<'info>,
    collateral_mint: &'a AccountInfo<'info>,
    vault_collateral_account: &'a AccountInfo<'info>,
    obligation: &'a AccountInfo<'info>,
    market_state: LendingMarket,
}

impl<'a, 'info> LendingAdapter<'a, 'info> {
    pub fn load(
        expected_market: &Pubkey,
        accounts: &'a [AccountInfo<'info>],
        ctx: StrategyContext<'a, 'info>,
    ) -> Result<Self> {
        require!(
            accounts.len() >= ACCOUNTS_LEN,
            VaultError::InvalidStrategyAccount
        );
        let lending_program = &accounts[0];
        let market = &accounts[1];
        let market_authority = &accounts[2];
        let liquidity_vault = &accounts[3];
        let collateral_mint = &accounts[4];
        let vault_collateral_account = &accounts[5];
        let obligation = &accounts[6];

        require_keys_eq!(
            market.key(),
            *expected_market,
            VaultError::InvalidStrategyAccount
        );

        let market_state =
            LendingMarket::try_deserialize(&mut &market.data.borrow()[..])?;
        require_keys_eq!(
            market_authority.key(),
            market_state.market_authority,
            VaultError::InvalidStrategyAccount
        );
        require_keys_eq!(
            liquidity_vault.key(),
            market_state.liquidity_vault,
            VaultError::InvalidStrategyAccount
        );
        require_keys_eq!(
            collateral_mint.key(),
            market_state.collateral_mint,
            VaultError::InvalidStrategyAccount
        );
        expect_token_account(
            vault_collateral_account,
            &market_state.collateral_mint,
            ctx.vault_authority.key,
        )?;

        let obligation_state =
            Obligation::try_deserialize(&mut &obligation.data.borrow()[..])?;
        require_keys_eq!(
            obligation_state.owner,
            *ctx.vault_authority.key,
            VaultError::InvalidStrategyAccount
        );
        require_keys_eq!(
            obligation_state.market,
            *expected_market,
            VaultError::InvalidStrategyAccount
        );

        Ok(Self {
            ctx,
            lending_program,
            market,
            market_authority,
            liquidity_vault,
            collateral_mint,
            vault_collateral_account,
            obligation,
            market_state,
        })
    }

    fn invoke(&self, mut data: Vec<u8>, source: &AccountInfo<'info>, dest: &AccountInfo<'info>, amount: u64) -> Result<()> {
        data.extend_from_slice(&amount.to_le_bytes());

        let accounts = vec![
            AccountMeta::new(self.market.key(), false),
            AccountMeta::new_readonly(self.market_authority.key(), false),
            AccountMeta::new(self.liquidity_vault.key(), false),
            AccountMeta::new(self.collateral_mint.key(), false),
            AccountMeta::new(source.key(), false),
            AccountMeta::new(dest.key(), false),
            AccountMeta::new(self.obligation.key(), false),
            AccountMeta::new_readonly(self.ctx.vault_authority.key(), true),
            AccountMeta::new_readonly(self.ctx.token_program.key(), false),
        ];

        let ix = Instruction {
            program_id: self.lending_program.key(),
            accounts,
            data,
        };

        let account_infos = [
            self.market.clone(),
            self.market_authority.clone(),
            self.liquidity_vault.clone(),
            self.collateral_mint.clone(),
            source.clone(),
            dest.clone(),
            self.obligation.clone(),
            self.ctx.vault_authority.clone(),
            self.ctx.token_program.clone(),
        ];

        invoke_signed(&ix, &account_infos, &[self.ctx.authority_seeds])?;
        Ok(())
    }

    /// Supply liquidity to the market; collateral tokens land in the
    /// vault's collateral account.
    pub fn deploy(&self, amount: u64) -> Result<()> {
        self.invoke(
            get_supply_discriminator(),
            self.ctx.vault_asset_account,
            self.vault_collateral_account,
            amount,
        )
    }

    /// Withdraw liquidity back to the vault asset account; returns the
    /// measured balance delta.
    pub fn recall(&self, amount: u64) -> Result<u64> {
        let before = token_amount(self.ctx.vault_asset_account)?;
        self.invoke(
            get_withdraw_discriminator(),
            self.vault_collateral_account,
            self.ctx.vault_asset_account,
            amount,
        )?;
        let after = token_amount(self.ctx.vault_asset_account)?;
        Ok(after.saturating_sub(before))
    }

    pub fn recall_all(&self) -> Result<u64> {
        let value = self.current_value()?;
        if value == 0 {
            return Ok(0);
        }
        self.recall(value)
    }

    /// Supplied-collateral value: collateral balance priced at the
    /// market's liquidity/collateral exchange rate.
    pub fn current_value(&self) -> Result<u64> {
        let collateral = token_amount(self.vault_collateral_account)?;
        if collateral == 0 || self.market_state.collateral_mint_supply == 0 {
            return Ok(0);
        }
        mul_div(
            collateral,
            self.market_state.liquidity_available,
            self.market_state.collateral_mint_supply,
        )
    }

    /// WAD-scaled safety ratio, re-read on every call since repays move it
    pub fn health_factor(&self) -> Result<u128> {
        let obligation =
            Obligation::try_deserialize(&mut &self.obligation.data.borrow()[..])?;
        Ok(obligation.health_factor)
    }

    /// Circuit-breaker: repay debt while the position is underwater.
    /// Permitted only when health_factor < 1.0.
    pub fn emergency_repay(&self, amount: u64, rate_mode: RateMode) -> Result<u64> {
        let health_factor = self.health_factor()?;
        require!(health_factor < WAD, VaultError::UnsafeHealthFactor);

        let mut data = get_repay_discriminator();
        data.extend_from_slice(&amount.to_le_bytes());
        data.push(rate_mode as u8);

        let accounts = vec![
            AccountMeta::new(self.market.key(), false),
            AccountMeta::new(self.liquidity_vault.key(), false),
            AccountMeta::new(self.ctx.vault_asset_account.key(), false),
            AccountMeta::new(self.obligation.key(), false),
            AccountMeta::new_readonly(self.ctx.vault_authority.key(), true),
            AccountMeta::new_readonly(self.ctx.token_program.key(), false),
        ];

        let ix = Instruction {
            program_id: self.lending_program.key(),
            accounts,
            data,
        };

        let account_infos = [
            self.market.clone(),
            self.liquidity_vault.clone(),
            self.ctx.vault_asset_account.clone(),
            self.obligation.clone(),
            self.ctx.vault_authority.clone(),
            self.ctx.token_program.clone(),
        ];

        invoke_signed(&ix, &account_infos, &[self.ctx.authority_seeds])?;

        msg!("Emergency repay of {} executed", amount);
        Ok(health_factor)
    }
}
