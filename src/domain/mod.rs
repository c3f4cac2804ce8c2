//! Domain types for the leveraged-trading client engine.
//!
//! This module provides:
//! - Scaled-integer primitives: Address, PositionId, BlockHeight, Direction
//! - Position and LpShare records decoded from the ledger
//! - TransactionState, the caller-visible lifecycle of one protocol call
//! - PoolState and OraclePrice, the public mapping read model

pub mod pool;
pub mod position;
pub mod primitives;
pub mod transaction;

pub use pool::{OraclePrice, PoolState};
pub use position::{LpShare, Position};
pub use primitives::{Address, BlockHeight, Direction, PositionId};
pub use transaction::{TransactionState, TxStatus};
