use anchor_lang::{
    prelude::*,
    solana_program::{instruction::Instruction, program::invoke_signed},
};

use crate::constants::{BPS_DENOMINATOR, WAD};
use crate::errors::VaultError;
use crate::math::mul_div_u128;
use crate::state::{AmmPool, PriceFeed};
use crate::strategy::{expect_token_account, token_amount, StrategyContext};

/// Remaining-accounts layout for an AMM strategy:
/// [amm_program, pool, pool_authority, pool_base_vault, pool_quote_vault,
///  vault_quote_account, price_feed]
pub const ACCOUNTS_LEN: usize = 7;

pub fn get_swap_discriminator() -> Vec<u8> {
    // discriminator = sha256("global:swap")[0..8]
    vec![248, 198, 158, 145, 225, 117, 135, 200]
}

/// Constant-product output quote with the pool fee applied on input
pub fn quote_out(amount_in: u64, reserve_in: u64, reserve_out: u64, fee_bps: u16) -> Result<u64> {
    if reserve_in == 0 || reserve_out == 0 {
        return err!(VaultError::DivisionByZero);
    }
    let in_with_fee = (amount_in as u128)
        .checked_mul((BPS_DENOMINATOR - fee_bps) as u128)
        .ok_or(error!(VaultError::MathOverflow))?;
    let numerator = in_with_fee
        .checked_mul(reserve_out as u128)
        .ok_or(error!(VaultError::MathOverflow))?;
    let denominator = (reserve_in as u128)
        .checked_mul(BPS_DENOMINATOR as u128)
        .ok_or(error!(VaultError::MathOverflow))?
        .checked_add(in_with_fee)
        .ok_or(error!(VaultError::MathOverflow))?;
    u64::try_from(numerator / denominator).map_err(|_| error!(VaultError::MathOverflow))
}

/// Input required to draw `amount_out` from the pool (rounded up)
pub fn quote_in(amount_out: u64, reserve_in: u64, reserve_out: u64, fee_bps: u16) -> Result<u64> {
    require!(amount_out < reserve_out, VaultError::ExcessiveSlippage);
    let numerator = (reserve_in as u128)
        .checked_mul(amount_out as u128)
        .ok_or(error!(VaultError::MathOverflow))?
        .checked_mul(BPS_DENOMINATOR as u128)
        .ok_or(error!(VaultError::MathOverflow))?;
    let denominator = ((reserve_out - amount_out) as u128)
        .checked_mul((BPS_DENOMINATOR - fee_bps) as u128)
        .ok_or(error!(VaultError::MathOverflow))?;
    if denominator == 0 {
        return err!(VaultError::DivisionByZero);
    }
    u64::try_from(numerator / denominator + 1).map_err(|_| error!(VaultError::MathOverflow))
}

/// Zero-impact output at the pool spot price, fee ignored
pub fn spot_out(amount_in: u64, reserve_in: u64, reserve_out: u64) -> Result<u64> {
    crate::math::mul_div(amount_in, reserve_out, reserve_in)
}

/// Value lost to the pool's curvature, in basis points of the spot output
pub fn price_impact_bps(spot: u64, quoted: u64) -> Result<u64> {
    if spot == 0 {
        return err!(VaultError::DivisionByZero);
    }
    if quoted >= spot {
        return Ok(0);
    }
    crate::math::mul_div(spot - quoted, BPS_DENOMINATOR as u64, spot)
}

/// Slippage floor below an oracle-derived expected output
pub fn oracle_floor(expected_out: u64, max_slippage_bps: u16) -> Result<u64> {
    crate::math::apply_bps(expected_out, BPS_DENOMINATOR - max_slippage_bps)
}

enum SwapDirection {
    BaseToQuote,
    QuoteToBase,
}

/// Adapter over an external constant-product AMM.
///
/// The position is held as the pool's quote asset; deploys swap base in,
/// recalls swap back out. Every swap runs the two-layer protection: the
/// pool's own quote must stay inside the impact bound AND the realized
/// output must clear an oracle-derived floor.
pub struct AmmAdapter<'a, 'info> {
    ctx: StrategyContext<'a, 'info>,
    amm_program: &'a AccountInfo<'info>,
    pool: &'a AccountInfo<'info>,
    pool_authority: &'a AccountInfo<'info>,
    pool_base_vault: &'a AccountInfo<'info>,
    pool_quote_vault: &'a AccountInfo<'info>,
    vault_quote_account: &'a AccountInfo<'info>,
    price_feed: &'a AccountInfo<'info>,
    pool_state: AmmPool,
}

impl<'a, 'info> AmmAdapter<'a, 'info> {
    pub fn load(
        expected_market: &Pubkey,
        accounts: &'a [AccountInfo<'info>],
        ctx: StrategyContext<'a, 'info>,
    ) -> Result<Self> {
        require!(
            accounts.len() >= ACCOUNTS_LEN,
            VaultError::InvalidStrategyAccount
        );
        let amm_program = &accounts[0];
        let pool = &accounts[1];
        let pool_authority = &accounts[2];
        let pool_base_vault = &accounts[3];
        let pool_quote_vault = &accounts[4];
        let vault_quote_account = &accounts[5];
        let price_feed = &accounts[6];

        require_keys_eq!(
            pool.key(),
            *expected_market,
            VaultError::InvalidStrategyAccount
        );

        let pool_state = AmmPool::try_deserialize(&mut &pool.data.borrow()[..])?;
        require!(
            pool_state.fee_bps < BPS_DENOMINATOR,
            VaultError::InvalidStrategyAccount
        );
        require_keys_eq!(
            pool_authority.key(),
            pool_state.pool_authority,
            VaultError::InvalidStrategyAccount
        );
        require_keys_eq!(
            pool_base_vault.key(),
            pool_state.base_vault,
            VaultError::InvalidStrategyAccount
        );
        require_keys_eq!(
            pool_quote_vault.key(),
            pool_state.quote_vault,
            VaultError::InvalidStrategyAccount
        );
        expect_token_account(
            vault_quote_account,
            &pool_state.quote_mint,
            ctx.vault_authority.key,
        )?;

        let feed = PriceFeed::try_deserialize(&mut &price_feed.data.borrow()[..])?;
        require_keys_eq!(
            feed.asset_mint,
            pool_state.quote_mint,
            VaultError::InvalidStrategyAccount
        );

        Ok(Self {
            ctx,
            amm_program,
            pool,
            pool_authority,
            pool_base_vault,
            pool_quote_vault,
            vault_quote_account,
            price_feed,
            pool_state,
        })
    }

    /// Validated WAD price of one quote unit in base units
    fn oracle_price(&self) -> Result<u128> {
        let feed = PriceFeed::try_deserialize(&mut &self.price_feed.data.borrow()[..])?;
        let now = Clock::get()?.unix_timestamp;
        feed.sample().validate(now)
    }

    fn swap_with_protection(
        &self,
        direction: SwapDirection,
        amount_in: u64,
        extra_floor: u64,
    ) -> Result<u64> {
        let (reserve_in, reserve_out, source, dest, base_to_quote) = match direction {
            SwapDirection::BaseToQuote => (
                self.pool_state.base_reserve,
                self.pool_state.quote_reserve,
                self.ctx.vault_asset_account,
                self.vault_quote_account,
                true,
            ),
            SwapDirection::QuoteToBase => (
                self.pool_state.quote_reserve,
                self.pool_state.base_reserve,
                self.vault_quote_account,
                self.ctx.vault_asset_account,
                false,
            ),
        };

        // layer 1: the pool's own quote must stay inside the impact bound
        let quoted = quote_out(amount_in, reserve_in, reserve_out, self.pool_state.fee_bps)?;
        let spot = spot_out(amount_in, reserve_in, reserve_out)?;
        let impact = price_impact_bps(spot, quoted)?;
        require!(
            impact <= self.ctx.max_slippage_bps as u64,
            VaultError::ExcessiveSlippage
        );

        // layer 2: a fresh oracle sample sets an independent floor
        let price = self.oracle_price()?;
        let oracle_expected = match direction {
            SwapDirection::BaseToQuote => mul_div_u128(amount_in as u128, WAD, price)?,
            SwapDirection::QuoteToBase => mul_div_u128(amount_in as u128, price, WAD)?,
        };
        let oracle_expected =
            u64::try_from(oracle_expected).map_err(|_| error!(VaultError::MathOverflow))?;
        let minimum_out = oracle_floor(oracle_expected, self.ctx.max_slippage_bps)?.max(extra_floor);

        let before = token_amount(dest)?;
        self.invoke_swap(source, dest, amount_in, minimum_out, base_to_quote)?;
        let after = token_amount(dest)?;

        let realized = after.saturating_sub(before);
        require!(realized >= minimum_out, VaultError::SlippageExceeded);
        Ok(realized)
    }

    fn invoke_swap(
        &self,
        source: &AccountInfo<'info>,
        dest: &AccountInfo<'info>,
        amount_in: u64,
        minimum_out: u64,
        base_to_quote: bool,
    ) -> Result<()> {
        let mut data = get_swap_discriminator();
        data.extend_from_slice(&amount_in.to_le_bytes());
        data.extend_from_slice(&minimum_out.to_le_bytes());
        data.push(base_to_quote as u8);

        let accounts = vec![
            AccountMeta::new(self.pool.key(), false),
            AccountMeta::new_readonly(self.pool_authority.key(), false),
            AccountMeta::new(source.key(), false),
            AccountMeta::new(dest.key(), false),
            AccountMeta::new(self.pool_base_vault.key(), false),
            AccountMeta::new(self.pool_quote_vault.key(), false),
            AccountMeta::new_readonly(self.ctx.vault_authority.key(), true),
            AccountMeta::new_readonly(self.ctx.token_program.key(), false),
        ];

        let ix = Instruction {
            program_id: self.amm_program.key(),
            accounts,
            data,
        };

        let account_infos = [
            self.pool.clone(),
            self.pool_authority.clone(),
            source.clone(),
            dest.clone(),
            self.pool_base_vault.clone(),
            self.pool_quote_vault.clone(),
            self.ctx.vault_authority.clone(),
            self.ctx.token_program.clone(),
        ];

        invoke_signed(&ix, &account_infos, &[self.ctx.authority_seeds])?;
        Ok(())
    }

    /// Swap base into the quote position
    pub fn deploy(&self, amount: u64) -> Result<()> {
        self.swap_with_protection(SwapDirection::BaseToQuote, amount, 0)?;
        Ok(())
    }

    /// Swap back enough of the position to return at least `amount` base
    pub fn recall(&self, amount: u64) -> Result<u64> {
        let quote_needed = quote_in(
            amount,
            self.pool_state.quote_reserve,
            self.pool_state.base_reserve,
            self.pool_state.fee_bps,
        )?;
        let held = token_amount(self.vault_quote_account)?;
        require!(quote_needed <= held, VaultError::TransferFailed);

        // the caller needs `amount` back; the swap floor is the stricter of
        // that and the oracle floor
        self.swap_with_protection(SwapDirection::QuoteToBase, quote_needed, amount)
    }

    /// Swap the entire quote position back to base
    pub fn recall_all(&self) -> Result<u64> {
        let held = token_amount(self.vault_quote_account)?;
        if held == 0 {
            return Ok(0);
        }
        self.swap_with_protection(SwapDirection::QuoteToBase, held, 0)
    }

    /// Held quote balance valued at the validated oracle price
    pub fn current_value(&self) -> Result<u64> {
        let held = token_amount(self.vault_quote_account)?;
        if held == 0 {
            return Ok(0);
        }
        let price = self.oracle_price()?;
        let value = mul_div_u128(held as u128, price, WAD)?;
        u64::try_from(value).map_err(|_| error!(VaultError::MathOverflow))
    }
}
