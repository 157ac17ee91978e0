use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::Block;
use crate::error::Result;

/// Knobs for a bounded mining search. The default is unbounded,
/// entropy-seeded and not cancellable.
#[derive(Debug, Clone, Default)]
pub struct MiningOptions {
    /// Give up with `Exhausted` after this many candidate nonces.
    pub max_attempts: Option<u64>,
    /// Seed for the nonce generator; same seed + same block = same nonce.
    pub seed: Option<u64>,
    /// Checked before every attempt.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl MiningOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// True when the first `difficulty` characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    if hash.is_empty() || hash.len() < difficulty {
        return false;
    }
    hash.bytes().take(difficulty).all(|b| b == b'0')
}

/// Mine `block` on a dedicated thread. Join the handle to get the mined
/// block back, or `Cancelled`/`Exhausted` if the options stopped the search.
pub fn spawn_miner(
    mut block: Block,
    difficulty: u32,
    options: MiningOptions,
) -> JoinHandle<Result<Block>> {
    thread::spawn(move || -> Result<Block> {
        let attempts = block.mine_with(difficulty, &options)?;
        info!("background miner found nonce {} in {attempts} attempts", block.nonce);
        Ok(block)
    })
}
