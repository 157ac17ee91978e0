//! A small append-only ledger: hash-linked blocks, proof-of-work mining and
//! a validator that gates every append.

pub mod blockchain;
pub mod config;
pub mod error;
pub mod transaction;
pub mod validator;

pub use blockchain::{Block, Blockchain, MiningOptions};
pub use error::{ChainError, Result};
pub use transaction::{Contract, Transaction};
pub use validator::Validator;
