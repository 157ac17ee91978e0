use std::fmt;

use chrono::{DateTime, Utc};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::NONCE_SPACE;
use super::pow::{self, MiningOptions};
use crate::error::{ChainError, Result};
use crate::transaction::{Contract, Transaction};

/// A single block in the chain holding transactions and contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub contracts: Vec<Contract>,
    pub hash: String, // empty until mined
    pub previous_hash: String,
    pub created_at: DateTime<Utc>,
    pub nonce: u64, // Proof-of-Work nonce, 0 = unmined
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        Self::new(Vec::new(), Vec::new(), String::new())
    }

    /// Create a new block (not mined yet). Call `mine()` to perform PoW.
    ///
    /// The index is a placeholder and is not renumbered when the block is
    /// appended.
    pub fn new(
        transactions: Vec<Transaction>,
        contracts: Vec<Contract>,
        previous_hash: impl Into<String>,
    ) -> Self {
        Self {
            index: 0,
            transactions,
            contracts,
            hash: String::new(),
            previous_hash: previous_hash.into(),
            created_at: Utc::now(),
            nonce: 0,
        }
    }

    /// Compute the SHA-256 hash of this block using its fields
    /// (excluding the `hash` field itself), hex-encoded.
    pub fn compute_hash(&self) -> String {
        digest_with_nonce(&self.preimage_hasher(), self.nonce)
    }

    /// Stored hash matches the block content.
    pub fn has_consistent_hash(&self) -> bool {
        !self.hash.is_empty() && self.hash == self.compute_hash()
    }

    /// True when `hash` starts with `difficulty` hex zeros.
    /// An empty or too short hash is never valid.
    pub fn is_valid(&self, difficulty: u32) -> bool {
        pow::meets_difficulty(&self.hash, difficulty)
    }

    /// Perform Proof-of-Work by drawing random nonces until the hash
    /// starts with `difficulty` leading zeros (in hex). Runs until it
    /// succeeds.
    pub fn mine(&mut self, difficulty: u32) {
        let prefix = self.preimage_hasher();
        let mut rng = StdRng::from_entropy();
        let mut attempts: u64 = 0;
        loop {
            attempts += 1;
            let nonce = rng.gen_range(1..=NONCE_SPACE);
            let hash = digest_with_nonce(&prefix, nonce);
            if pow::meets_difficulty(&hash, difficulty) {
                self.nonce = nonce;
                self.hash = hash;
                break;
            }
        }
        debug!(
            "mined block nonce={} hash={} after {} attempts",
            self.nonce, self.hash, attempts
        );
    }

    /// Bounded variant of [`Block::mine`]. Returns the number of attempts
    /// on success. On `Cancelled` or `Exhausted` the block is left untouched.
    pub fn mine_with(&mut self, difficulty: u32, options: &MiningOptions) -> Result<u64> {
        let prefix = self.preimage_hasher();
        let mut rng = options.rng();
        let mut attempts: u64 = 0;
        loop {
            if options.is_cancelled() {
                debug!("mining cancelled after {attempts} attempts");
                return Err(ChainError::Cancelled { attempts });
            }
            if options.max_attempts.is_some_and(|max| attempts >= max) {
                debug!("mining exhausted after {attempts} attempts");
                return Err(ChainError::Exhausted { attempts });
            }

            attempts += 1;
            let nonce = rng.gen_range(1..=NONCE_SPACE);
            let hash = digest_with_nonce(&prefix, nonce);
            if pow::meets_difficulty(&hash, difficulty) {
                self.nonce = nonce;
                self.hash = hash;
                debug!(
                    "mined block nonce={} hash={} after {} attempts",
                    self.nonce, self.hash, attempts
                );
                return Ok(attempts);
            }
        }
    }

    /// Hasher primed with every field except the nonce, which goes last.
    /// Strings are length-prefixed so neighbouring fields cannot bleed
    /// into each other.
    fn preimage_hasher(&self) -> Sha256 {
        let mut hasher = Sha256::new();
        hasher.update(self.index.to_be_bytes());

        hasher.update((self.transactions.len() as u64).to_be_bytes());
        for tx in &self.transactions {
            update_str(&mut hasher, &tx.sender);
            update_str(&mut hasher, &tx.receiver);
            hasher.update(tx.amount.to_bits().to_be_bytes());
        }

        hasher.update((self.contracts.len() as u64).to_be_bytes());
        for contract in &self.contracts {
            update_str(&mut hasher, &contract.code);
        }

        update_str(&mut hasher, &self.previous_hash);
        hasher.update(self.created_at.timestamp().to_be_bytes());
        hasher.update(self.created_at.timestamp_subsec_nanos().to_be_bytes());
        hasher
    }
}

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}

fn digest_with_nonce(prefix: &Sha256, nonce: u64) -> String {
    let mut hasher = prefix.clone();
    hasher.update(nonce.to_be_bytes());
    hex::encode(hasher.finalize())
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Block #{} (nonce {}, created {})",
            self.index,
            self.nonce,
            self.created_at.to_rfc3339()
        )?;
        writeln!(f, "  previous: {}", or_none(&self.previous_hash))?;
        write!(f, "  hash:     {}", or_none(&self.hash))?;
        for tx in &self.transactions {
            write!(f, "\n  tx       {tx}")?;
        }
        for contract in &self.contracts {
            write!(f, "\n  {contract}")?;
        }
        Ok(())
    }
}

fn or_none(hash: &str) -> &str {
    if hash.is_empty() { "<none>" } else { hash }
}
