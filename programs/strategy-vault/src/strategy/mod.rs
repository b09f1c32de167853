//! Strategy capability: deploy / recall / recall_all / current_value.
//!
//! Each kind parses a fixed slice of remaining accounts, cross-checks every
//! key against the deserialized external state, and routes funds with CPIs
//! signed by the vault authority PDA. Adding a strategy kind means adding a
//! variant here; the vault entry points stay untouched.

pub mod amm;
pub mod lending;

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::errors::VaultError;
use crate::state::{StrategyEntry, StrategyKind};

pub use amm::AmmAdapter;
pub use lending::LendingAdapter;

/// Accounts every adapter needs from the enclosing instruction
#[derive(Clone, Copy)]
pub struct StrategyContext<'a, 'info> {
    /// The vault's asset token account; source of deploys, destination of
    /// recalls
    pub vault_asset_account: &'a AccountInfo<'info>,

    /// Vault authority PDA; signs all strategy CPIs
    pub vault_authority: &'a AccountInfo<'info>,

    pub token_program: &'a AccountInfo<'info>,

    /// Seeds of the vault authority PDA for invoke_signed
    pub authority_seeds: &'a [&'a [u8]],

    /// Swap-protection bound from VaultState
    pub max_slippage_bps: u16,
}

/// Tagged-variant dispatch over the strategy capability set
pub enum StrategyGateway<'a, 'info> {
    Lending(LendingAdapter<'a, 'info>),
    Amm(AmmAdapter<'a, 'info>),
}

impl<'a, 'info> StrategyGateway<'a, 'info> {
    /// Parse one adapter from the head of `accounts`; returns the adapter
    /// and how many accounts it consumed.
    pub fn load(
        entry: &StrategyEntry,
        accounts: &'a [AccountInfo<'info>],
        ctx: StrategyContext<'a, 'info>,
    ) -> Result<(Self, usize)> {
        match entry.kind {
            StrategyKind::Lending => {
                let adapter = LendingAdapter::load(&entry.market, accounts, ctx)?;
                Ok((Self::Lending(adapter), lending::ACCOUNTS_LEN))
            }
            StrategyKind::Amm => {
                let adapter = AmmAdapter::load(&entry.market, accounts, ctx)?;
                Ok((Self::Amm(adapter), amm::ACCOUNTS_LEN))
            }
        }
    }

    /// Move `amount` from the vault asset account into the external
    /// protocol. Fails the enclosing operation on any protocol error.
    pub fn deploy(&self, amount: u64) -> Result<()> {
        require!(amount > 0, VaultError::InvalidAmount);
        match self {
            Self::Lending(a) => a.deploy(amount),
            Self::Amm(a) => a.deploy(amount),
        }
    }

    /// Return at least `amount` of the vault asset from the external
    /// protocol; reports the amount actually moved.
    pub fn recall(&self, amount: u64) -> Result<u64> {
        require!(amount > 0, VaultError::InvalidAmount);
        match self {
            Self::Lending(a) => a.recall(amount),
            Self::Amm(a) => a.recall(amount),
        }
    }

    /// Fully exit the position; reports the true amount moved (zero from an
    /// already-empty position is a valid result, judged by the caller).
    pub fn recall_all(&self) -> Result<u64> {
        match self {
            Self::Lending(a) => a.recall_all(),
            Self::Amm(a) => a.recall_all(),
        }
    }

    /// Present value of the position in the vault accounting asset
    pub fn current_value(&self) -> Result<u64> {
        match self {
            Self::Lending(a) => a.current_value(),
            Self::Amm(a) => a.current_value(),
        }
    }
}

/// Balance of a token account given only its AccountInfo
pub(crate) fn token_amount(info: &AccountInfo) -> Result<u64> {
    let data = info.try_borrow_data()?;
    let account = TokenAccount::try_deserialize(&mut &data[..])?;
    Ok(account.amount)
}

/// Deserialize a token account and confirm mint + owner
pub(crate) fn expect_token_account(
    info: &AccountInfo,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<()> {
    let data = info.try_borrow_data()?;
    let account = TokenAccount::try_deserialize(&mut &data[..])?;
    require_keys_eq!(account.mint, *mint, VaultError::InvalidMint);
    require_keys_eq!(account.owner, *owner, VaultError::InvalidOwner);
    Ok(())
}
