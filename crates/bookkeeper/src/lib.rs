//! Collateralized-debt accounting ledger
//!
//! Tracks collateral deposits, minted stablecoin debt, position solvency and
//! system bad debt across multiple collateral pools. All arithmetic is
//! checked; every entry point is all-or-nothing.

pub mod error;
pub mod types;
pub mod math;
pub mod state;
pub mod access;
pub mod events;
pub mod ledger;
pub mod transitions;
pub mod helpers;

// Re-export commonly used types
pub use error::*;
pub use types::*;
pub use math::*;
pub use state::*;
pub use events::*;
pub use ledger::Ledger;
pub use primitive_types::U256;
