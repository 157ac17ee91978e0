pub mod block;
pub mod model;
pub mod pow;

pub use block::Block;
pub use model::Blockchain;
pub use pow::{MiningOptions, spawn_miner};

/// Default Proof-of-Work difficulty (number of leading hex zeros).
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// A SHA-256 hex digest has 64 characters; anything above is unmineable.
pub const MAX_DIFFICULTY: u32 = 64;

/// Nonce candidates are drawn from `1..=NONCE_SPACE`; 0 stays the unmined sentinel.
pub const NONCE_SPACE: u64 = 1_000_000_000;
