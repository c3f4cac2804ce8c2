//! Client-side engine for a leveraged-trading protocol on a record-based,
//! privacy-preserving ledger.
//!
//! The engine owns the parts that carry real risk:
//! - a deterministic fixed-point position model (leverage, liquidation
//!   price, PnL, margin ratio, borrow fee, buffered expected payout)
//! - the transaction lifecycle state machine (submit, poll under bounded
//!   budgets, resolve to a terminal status)
//! - decoders for record plaintexts and public mapping values
//! - the pool read model and the batch position scanner
//!
//! Wallet and explorer adapters are injected behind capability traits; the
//! engine never renders, routes, or formats for display.

pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod math;
pub mod parser;
pub mod pool;
pub mod protocol;
pub mod scanner;
pub mod store;

pub use config::{ConfigError, EngineConfig};
pub use domain::{
    Address, BlockHeight, Direction, LpShare, OraclePrice, PoolState, Position, PositionId,
    TransactionState, TxStatus,
};
pub use error::EngineError;
pub use executor::{Clock, InstantClock, SystemClock, TransactionExecutor};
pub use ledger::{
    ChainReader, ExplorerChainReader, LedgerError, MockChainReader, MockWalletClient,
    StatusResponse, WalletClient,
};
pub use parser::ParseError;
pub use pool::{PoolAccounting, PoolSnapshot};
pub use protocol::{generate_nonce, CallBuilder, SubmitRequest};
pub use scanner::PositionScanner;
pub use store::{
    ClosedPositionStore, MemoryClosedPositionStore, SqliteClosedPositionStore, StoreError,
};
