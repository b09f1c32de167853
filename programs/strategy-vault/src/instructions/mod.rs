pub mod add_strategy;
pub mod deposit;
pub mod emergency_repay;
pub mod initialize;
pub mod rebalance;
pub mod remove_strategy;
pub mod set_max_slippage;
pub mod set_strategy;
pub mod toggle_strategy;
pub mod update_allocations;
pub mod user_share_value;
pub mod withdraw;

pub use add_strategy::*;
pub use deposit::*;
pub use emergency_repay::*;
pub use initialize::*;
pub use rebalance::*;
pub use remove_strategy::*;
pub use set_max_slippage::*;
pub use set_strategy::*;
pub use toggle_strategy::*;
pub use update_allocations::*;
pub use user_share_value::*;
pub use withdraw::*;
