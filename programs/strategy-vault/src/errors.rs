use anchor_lang::prelude::*;

/// Custom error codes for the Strategy Vault program
///
/// Security: Descriptive error messages without information leakage
#[error_code]
pub enum VaultError {
    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Share amount must be greater than zero")]
    InvalidShares,

    #[msg("Share amount exceeds the caller's balance")]
    InsufficientShares,

    #[msg("Unauthorized - only the vault authority can perform this action")]
    Unauthorized,

    #[msg("Strategy not found in registry")]
    StrategyNotFound,

    #[msg("Strategy already exists in registry")]
    StrategyAlreadyExists,

    #[msg("Strategy is disabled")]
    StrategyDisabled,

    #[msg("Strategy still holds funds or is the current strategy")]
    StrategyInUse,

    #[msg("Allocations do not sum to the required total")]
    AllocationMismatch,

    #[msg("No strategy is set for an operation that requires one")]
    NoStrategySet,

    #[msg("Rebalance aborted - full recall from the previous strategy returned nothing")]
    RebalanceFailed,

    #[msg("Oracle price sample is older than the staleness bound")]
    StalePrice,

    #[msg("Oracle price sample is unusable")]
    InvalidPrice,

    #[msg("Quoted price impact exceeds the configured maximum")]
    ExcessiveSlippage,

    #[msg("Realized swap output fell below the oracle-derived floor")]
    SlippageExceeded,

    #[msg("Asset transfer failed - insufficient balance")]
    TransferFailed,

    #[msg("Health factor out of range for this operation")]
    UnsafeHealthFactor,

    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Cannot divide by zero - vault has no shares")]
    DivisionByZero,

    #[msg("Invalid token mint - does not match vault asset")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    #[msg("Strategy account list does not match the registered strategy")]
    InvalidStrategyAccount,

    #[msg("Strategy registry is full - maximum strategies reached")]
    RegistryFull,

    #[msg("Strategy name too long - maximum 32 characters")]
    NameTooLong,
}
