use anchor_lang::prelude::*;

use crate::state::StrategyKind;

/// Event emitted when a new vault is initialized
#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub max_slippage_bps: u16,
    pub timestamp: i64,
}

/// Event emitted when assets are deposited
#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub asset_amount: u64,
    pub shares_minted: u64,
    pub pool_value_before: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when shares are redeemed for assets
#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub shares_burned: u64,
    pub asset_amount: u64,
    pub recalled_amount: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a strategy is added to the registry
#[event]
pub struct StrategyAdded {
    pub vault: Pubkey,
    pub market: Pubkey,
    pub kind: StrategyKind,
    pub name: String,
    pub timestamp: i64,
}

/// Event emitted when a strategy is removed from the registry
#[event]
pub struct StrategyRemoved {
    pub vault: Pubkey,
    pub market: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when a strategy is enabled or disabled
#[event]
pub struct StrategyToggled {
    pub vault: Pubkey,
    pub market: Pubkey,
    pub enabled: bool,
    pub timestamp: i64,
}

/// Event emitted when the allocation table changes without moving funds
#[event]
pub struct AllocationsUpdated {
    pub vault: Pubkey,
    pub total_allocation_bps: u16,
    pub timestamp: i64,
}

/// Event emitted when the current strategy is switched
#[event]
pub struct StrategySwitched {
    pub vault: Pubkey,
    pub old_strategy: Pubkey,
    pub new_strategy: Pubkey,
    pub moved_amount: u64,
    pub timestamp: i64,
}

/// Event emitted after a rebalance moves funds across the allocation table
#[event]
pub struct Rebalanced {
    pub vault: Pubkey,
    pub recalled_amount: u64,
    pub redeployed_amount: u64,
    pub target_count: u8,
    pub current_strategy: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when the slippage bound is changed
#[event]
pub struct MaxSlippageUpdated {
    pub vault: Pubkey,
    pub old_max_slippage_bps: u16,
    pub new_max_slippage_bps: u16,
    pub timestamp: i64,
}

/// Event emitted when debt is repaid through the emergency path
#[event]
pub struct EmergencyRepaid {
    pub vault: Pubkey,
    pub market: Pubkey,
    pub amount: u64,
    pub health_factor: u128,
    pub timestamp: i64,
}
