use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{Block, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::error::{ChainError, Result};
use crate::validator::Validator;

/// Simple in-memory blockchain with Proof-of-Work.
///
/// `append` does not validate. Run a [`Validator`] first, or use
/// [`Blockchain::append_if_valid`].
///
/// Deserializing runs the same audit as [`Blockchain::from_json`], so an
/// empty or broken chain never comes out of serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawChain")]
pub struct Blockchain {
    difficulty: u32,
    blocks: Vec<Block>,
}

/// Unchecked wire shape of a chain export.
#[derive(Deserialize)]
struct RawChain {
    difficulty: u32,
    blocks: Vec<Block>,
}

impl TryFrom<RawChain> for Blockchain {
    type Error = ChainError;

    fn try_from(raw: RawChain) -> Result<Self> {
        if raw.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::PreconditionViolation("difficulty above 64"));
        }
        let chain = Self {
            difficulty: raw.difficulty,
            blocks: raw.blocks,
        };
        chain.verify()?;
        Ok(chain)
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Initialize a new blockchain with a genesis block and the default difficulty.
    pub fn new() -> Self {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    /// Difficulty is fixed for the lifetime of the chain.
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            difficulty,
            blocks: vec![Block::genesis()],
        }
    }

    /// Return the last block in the chain.
    pub fn latest(&self) -> Result<&Block> {
        self.blocks
            .last()
            .ok_or(ChainError::PreconditionViolation("chain has no blocks"))
    }

    /// Add `block` at the end without any checks.
    pub fn append(&mut self, block: Block) {
        info!(
            "appending block #{} at height {} hash={}",
            block.index,
            self.blocks.len(),
            block.hash
        );
        self.blocks.push(block);
    }

    /// Validate against the current tip, then append. The chain is left
    /// unchanged on rejection.
    pub fn append_if_valid(&mut self, block: Block) -> Result<&Block> {
        Validator::new(self).validate(&block)?;
        self.append(block);
        self.latest()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Audit the entire chain: genesis shape, then linkage, hash integrity,
    /// PoW, payload and nonce for every later block.
    pub fn verify(&self) -> Result<()> {
        let genesis = self
            .blocks
            .first()
            .ok_or(ChainError::PreconditionViolation("chain has no blocks"))?;
        if genesis.index != 0
            || !genesis.previous_hash.is_empty()
            || !genesis.hash.is_empty()
            || !genesis.transactions.is_empty()
            || !genesis.contracts.is_empty()
            || genesis.nonce != 0
        {
            return Err(ChainError::InvalidBlockAt {
                position: 0,
                source: Box::new(ChainError::PreconditionViolation("malformed genesis block")),
            });
        }

        for (position, pair) in self.blocks.windows(2).enumerate() {
            let (prev, current) = (&pair[0], &pair[1]);
            check_successor(prev, current, self.difficulty).map_err(|err| {
                ChainError::InvalidBlockAt {
                    position: position + 1,
                    source: Box::new(err),
                }
            })?;
        }

        debug!("chain of {} blocks verified", self.blocks.len());
        Ok(())
    }

    pub fn is_valid_chain(&self) -> bool {
        self.verify().is_ok()
    }

    /// Pretty JSON with the difficulty and every block field.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an export produced by [`Blockchain::to_json`] and audit it.
    /// Audit failures come back as their own variants, not as `Json`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawChain = serde_json::from_str(json)?;
        Self::try_from(raw)
    }
}

/// Same rules the validator applies to a candidate, plus hash integrity.
fn check_successor(prev: &Block, current: &Block, difficulty: u32) -> Result<()> {
    if !current.has_consistent_hash() {
        return Err(ChainError::HashMismatch);
    }
    if !current.is_valid(difficulty) {
        return Err(ChainError::InvalidHash);
    }
    if current.previous_hash != prev.hash {
        return Err(ChainError::InvalidLink);
    }
    if current.transactions.is_empty() {
        return Err(ChainError::EmptyPayload);
    }
    if current.nonce == 0 {
        return Err(ChainError::InvalidNonce);
    }
    Ok(())
}
