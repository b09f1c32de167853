use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, MAX_STRATEGIES};
use crate::errors::VaultError;

/// The two strategy kinds the vault can route funds through.
///
/// New kinds are added by extending this enum and its gateway adapter; the
/// vault entry points never change.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    /// Supplies the vault asset to an external lending market
    Lending,
    /// Swaps the vault asset into a target asset on an external AMM
    Amm,
}

/// Engine state derived from the registry; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationState {
    /// No current strategy, nothing deployed
    Idle,
    /// Exactly one strategy holds all deployed funds
    SingleActive,
    /// Funds split across entries, no single current pointer
    Distributed,
}

/// A rebalance / allocation-edit target
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct StrategyAllocation {
    pub market: Pubkey,
    pub allocation_bps: u16,
}

/// Registry of approved strategies plus the allocation table
///
/// Architecture: authority-controlled whitelist. Funds can only be routed
/// to markets registered here; allocation edits never move funds.
#[account]
pub struct StrategyRegistry {
    /// Vault this registry belongs to
    pub vault: Pubkey,              // 32 bytes

    /// Current strategy market, Pubkey::default() when none
    pub current_strategy: Pubkey,   // 32 bytes

    /// Approved strategies with their target allocations
    pub strategies: Vec<StrategyEntry>, // 4 + (n * ~80) bytes

    /// Bump seed for PDA
    pub bump: u8,                   // 1 byte
}

/// Individual approved strategy entry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct StrategyEntry {
    /// The external protocol's market/pool account; the strategy identity
    pub market: Pubkey,             // 32 bytes

    /// Which adapter routes funds to this market
    pub kind: StrategyKind,         // 1 byte

    /// Whether this strategy may be targeted by switches and new
    /// allocations; deployed funds stay recallable while disabled
    pub enabled: bool,              // 1 byte

    /// Target allocation in basis points, 0..=10_000
    pub allocation_bps: u16,        // 2 bytes

    /// Principal currently deployed; bookkeeping only, never valuation
    pub deployed_amount: u64,       // 8 bytes

    /// Human-readable name (e.g., "Klend", "Orca")
    pub name: String,               // 4 + up to 32 bytes
}

impl StrategyRegistry {
    /// Space calculation: accommodates up to 10 strategies comfortably
    /// 8 (discriminator) + 32 (vault) + 32 (current) + 4 (vec len) + (10 * 88) + 1 (bump) + 128 (padding)
    pub const SPACE: usize = 8 + 32 + 32 + 4 + (MAX_STRATEGIES * 88) + 1 + 128;

    pub fn has_current_strategy(&self) -> bool {
        self.current_strategy != Pubkey::default()
    }

    /// Check if a market is registered and enabled
    pub fn is_strategy_approved(&self, market: &Pubkey) -> bool {
        self.strategies
            .iter()
            .any(|s| s.market == *market && s.enabled)
    }

    pub fn get_strategy(&self, market: &Pubkey) -> Option<&StrategyEntry> {
        self.strategies.iter().find(|s| s.market == *market)
    }

    pub fn get_strategy_mut(&mut self, market: &Pubkey) -> Option<&mut StrategyEntry> {
        self.strategies.iter_mut().find(|s| s.market == *market)
    }

    pub fn current_entry(&self) -> Option<&StrategyEntry> {
        if self.has_current_strategy() {
            self.get_strategy(&self.current_strategy)
        } else {
            None
        }
    }

    /// Sum of target allocations across all entries
    pub fn total_allocation_bps(&self) -> u16 {
        self.strategies
            .iter()
            .map(|s| s.allocation_bps)
            .fold(0u16, u16::saturating_add)
    }

    /// Track principal moved into a strategy
    pub fn record_deploy(&mut self, market: &Pubkey, amount: u64) -> Result<()> {
        let entry = self
            .get_strategy_mut(market)
            .ok_or(error!(VaultError::StrategyNotFound))?;
        entry.deployed_amount = entry
            .deployed_amount
            .checked_add(amount)
            .ok_or(error!(VaultError::MathOverflow))?;
        Ok(())
    }

    /// Track principal returned from a strategy; recalls above principal
    /// (yield) clamp to zero
    pub fn record_recall(&mut self, market: &Pubkey, amount: u64) -> Result<()> {
        let entry = self
            .get_strategy_mut(market)
            .ok_or(error!(VaultError::StrategyNotFound))?;
        entry.deployed_amount = entry.deployed_amount.saturating_sub(amount);
        Ok(())
    }

    /// Validate a submitted allocation set for `rebalance`:
    /// non-empty, no duplicate markets, every market approved, sum == 10_000.
    pub fn check_rebalance_allocations(&self, targets: &[StrategyAllocation]) -> Result<()> {
        require!(!targets.is_empty(), VaultError::AllocationMismatch);

        let mut total: u32 = 0;
        for (i, t) in targets.iter().enumerate() {
            require!(
                self.is_strategy_approved(&t.market),
                VaultError::StrategyNotFound
            );
            require!(
                !targets[..i].iter().any(|prev| prev.market == t.market),
                VaultError::AllocationMismatch
            );
            total += t.allocation_bps as u32;
        }
        require!(
            total == BPS_DENOMINATOR as u32,
            VaultError::AllocationMismatch
        );
        Ok(())
    }

    /// Validate a table-only allocation edit: markets must exist,
    /// resulting total stays within [0, 10_000].
    pub fn check_allocation_edit(&self, targets: &[StrategyAllocation]) -> Result<()> {
        let mut total: u32 = 0;
        for (i, t) in targets.iter().enumerate() {
            require!(
                self.get_strategy(&t.market).is_some(),
                VaultError::StrategyNotFound
            );
            require!(
                !targets[..i].iter().any(|prev| prev.market == t.market),
                VaultError::AllocationMismatch
            );
            total += t.allocation_bps as u32;
        }
        // entries not named in the edit keep their allocation
        for s in &self.strategies {
            if !targets.iter().any(|t| t.market == s.market) {
                total += s.allocation_bps as u32;
            }
        }
        require!(
            total <= BPS_DENOMINATOR as u32,
            VaultError::AllocationMismatch
        );
        Ok(())
    }

    /// Apply a validated allocation set to the table
    pub fn apply_allocations(&mut self, targets: &[StrategyAllocation]) {
        for t in targets {
            if let Some(entry) = self.get_strategy_mut(&t.market) {
                entry.allocation_bps = t.allocation_bps;
            }
        }
    }

    /// Pointer update after a rebalance: exactly one non-zero target makes
    /// that strategy current; any other shape clears the pointer.
    pub fn resolve_current_after_rebalance(targets: &[StrategyAllocation]) -> Pubkey {
        let mut nonzero = targets.iter().filter(|t| t.allocation_bps > 0);
        match (nonzero.next(), nonzero.next()) {
            (Some(only), None) => only.market,
            _ => Pubkey::default(),
        }
    }

    pub fn allocation_state(&self) -> AllocationState {
        if self.has_current_strategy() {
            AllocationState::SingleActive
        } else if self.strategies.iter().any(|s| s.deployed_amount > 0) {
            AllocationState::Distributed
        } else {
            AllocationState::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(market: Pubkey, kind: StrategyKind, bps: u16, deployed: u64) -> StrategyEntry {
        StrategyEntry {
            market,
            kind,
            enabled: true,
            allocation_bps: bps,
            deployed_amount: deployed,
            name: "Test".to_string(),
        }
    }

    fn registry(entries: Vec<StrategyEntry>) -> StrategyRegistry {
        StrategyRegistry {
            vault: Pubkey::new_unique(),
            current_strategy: Pubkey::default(),
            strategies: entries,
            bump: 0,
        }
    }

    #[test]
    fn test_approval_requires_enabled() {
        let enabled = Pubkey::new_unique();
        let disabled = Pubkey::new_unique();
        let mut reg = registry(vec![
            entry(enabled, StrategyKind::Lending, 0, 0),
            entry(disabled, StrategyKind::Amm, 0, 0),
        ]);
        reg.strategies[1].enabled = false;

        assert!(reg.is_strategy_approved(&enabled));
        assert!(!reg.is_strategy_approved(&disabled));
        assert!(!reg.is_strategy_approved(&Pubkey::new_unique()));
    }

    #[test]
    fn test_rebalance_allocations_must_sum_to_total() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let reg = registry(vec![
            entry(a, StrategyKind::Lending, 0, 0),
            entry(b, StrategyKind::Amm, 0, 0),
        ]);

        let ok = vec![
            StrategyAllocation { market: a, allocation_bps: 6000 },
            StrategyAllocation { market: b, allocation_bps: 4000 },
        ];
        assert!(reg.check_rebalance_allocations(&ok).is_ok());

        let short = vec![
            StrategyAllocation { market: a, allocation_bps: 6000 },
            StrategyAllocation { market: b, allocation_bps: 3000 },
        ];
        assert!(reg.check_rebalance_allocations(&short).is_err());

        let over = vec![
            StrategyAllocation { market: a, allocation_bps: 6000 },
            StrategyAllocation { market: b, allocation_bps: 5000 },
        ];
        assert!(reg.check_rebalance_allocations(&over).is_err());
    }

    #[test]
    fn test_rebalance_rejects_unknown_and_duplicate_markets() {
        let a = Pubkey::new_unique();
        let reg = registry(vec![entry(a, StrategyKind::Lending, 0, 0)]);

        let unknown = vec![StrategyAllocation {
            market: Pubkey::new_unique(),
            allocation_bps: 10_000,
        }];
        assert!(reg.check_rebalance_allocations(&unknown).is_err());

        let dup = vec![
            StrategyAllocation { market: a, allocation_bps: 5000 },
            StrategyAllocation { market: a, allocation_bps: 5000 },
        ];
        assert!(reg.check_rebalance_allocations(&dup).is_err());

        assert!(reg.check_rebalance_allocations(&[]).is_err());
    }

    #[test]
    fn test_allocation_edit_bounds() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let reg = registry(vec![
            entry(a, StrategyKind::Lending, 3000, 0),
            entry(b, StrategyKind::Amm, 0, 0),
        ]);

        // partial edit: a keeps 3000, b gets 7000 -> exactly 10000
        let edit = vec![StrategyAllocation { market: b, allocation_bps: 7000 }];
        assert!(reg.check_allocation_edit(&edit).is_ok());

        // b at 8000 would push the total to 11000
        let over = vec![StrategyAllocation { market: b, allocation_bps: 8000 }];
        assert!(reg.check_allocation_edit(&over).is_err());
    }

    #[test]
    fn test_current_pointer_resolution() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        let single = vec![
            StrategyAllocation { market: a, allocation_bps: 10_000 },
            StrategyAllocation { market: b, allocation_bps: 0 },
        ];
        assert_eq!(StrategyRegistry::resolve_current_after_rebalance(&single), a);

        let split = vec![
            StrategyAllocation { market: a, allocation_bps: 6000 },
            StrategyAllocation { market: b, allocation_bps: 4000 },
        ];
        assert_eq!(
            StrategyRegistry::resolve_current_after_rebalance(&split),
            Pubkey::default()
        );
    }

    #[test]
    fn test_allocation_state_machine() {
        let a = Pubkey::new_unique();
        let mut reg = registry(vec![entry(a, StrategyKind::Lending, 0, 0)]);
        assert_eq!(reg.allocation_state(), AllocationState::Idle);

        reg.current_strategy = a;
        assert_eq!(reg.allocation_state(), AllocationState::SingleActive);

        reg.current_strategy = Pubkey::default();
        reg.strategies[0].deployed_amount = 500;
        assert_eq!(reg.allocation_state(), AllocationState::Distributed);
    }

    #[test]
    fn test_deploy_recall_bookkeeping() {
        let a = Pubkey::new_unique();
        let mut reg = registry(vec![entry(a, StrategyKind::Lending, 0, 0)]);

        reg.record_deploy(&a, 1000).unwrap();
        assert_eq!(reg.get_strategy(&a).unwrap().deployed_amount, 1000);

        reg.record_recall(&a, 400).unwrap();
        assert_eq!(reg.get_strategy(&a).unwrap().deployed_amount, 600);

        // recalling yield above principal clamps to zero
        reg.record_recall(&a, 10_000).unwrap();
        assert_eq!(reg.get_strategy(&a).unwrap().deployed_amount, 0);

        assert!(reg.record_deploy(&Pubkey::new_unique(), 1).is_err());
    }

    #[test]
    fn test_record_deploy_overflow() {
        let a = Pubkey::new_unique();
        let mut reg = registry(vec![entry(a, StrategyKind::Lending, 0, u64::MAX - 10)]);
        assert!(reg.record_deploy(&a, 100).is_err());
    }
}
