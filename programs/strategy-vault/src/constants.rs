// Constants for the Strategy Vault program

/// Seed for vault state PDA
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for share mint PDA
pub const SHARE_MINT_SEED: &[u8] = b"shares";

/// Seed for vault authority PDA
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Seed for strategy registry PDA
pub const REGISTRY_SEED: &[u8] = b"strategy_registry";

/// Space for VaultState account (8 discriminator + 32 authority + 32 asset_mint +
/// 32 share_mint + 8 total_shares + 2 max_slippage_bps + 1 bump + 1 share_bump +
/// 1 authority_bump + 128 padding)
pub const VAULT_STATE_SIZE: usize = 8 + 32 + 32 + 32 + 8 + 2 + 1 + 1 + 1 + 128;

/// Basis-point denominator: 10_000 bps == 100%
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Scale of oracle prices and health factors (1e18)
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Oracle samples older than this are rejected as stale
pub const MAX_PRICE_AGE_SECONDS: i64 = 60 * 60;

/// Registry capacity; bounded by account size
pub const MAX_STRATEGIES: usize = 10;

/// Maximum length of a strategy display name
pub const MAX_NAME_LEN: usize = 32;
