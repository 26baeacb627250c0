//! Helpers shared by the cross-chain test suites.
pub mod mock_ledger;
pub mod utils;

pub use mock_ledger::*;
pub use utils::*;
