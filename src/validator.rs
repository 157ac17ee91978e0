use log::{debug, warn};

use crate::blockchain::{Block, Blockchain};
use crate::error::{ChainError, Result};

/// Gatekeeper for chain mutation. Holds no state beyond the borrowed chain.
pub struct Validator<'a> {
    chain: &'a Blockchain,
}

impl<'a> Validator<'a> {
    pub fn new(chain: &'a Blockchain) -> Self {
        Self { chain }
    }

    /// Check a mined candidate against the current tip. Rules run in a fixed
    /// order and the first failure is returned:
    ///
    /// 1. proof-of-work meets the chain difficulty (`InvalidHash`)
    /// 2. `previous_hash` equals the tip hash (`InvalidLink`)
    /// 3. at least one transaction (`EmptyPayload`)
    /// 4. nonce is not the unmined sentinel 0 (`InvalidNonce`)
    ///
    /// Rule 4 is a heuristic "was this mined" signal, not a cryptographic check.
    pub fn validate(&self, block: &Block) -> Result<()> {
        let result = self.check(block);
        match &result {
            Ok(()) => debug!("block hash={} accepted", block.hash),
            Err(err) => warn!("block hash={} rejected: {err}", block.hash),
        }
        result
    }

    fn check(&self, block: &Block) -> Result<()> {
        if !block.is_valid(self.chain.difficulty()) {
            return Err(ChainError::InvalidHash);
        }
        if block.previous_hash != self.chain.latest()?.hash {
            return Err(ChainError::InvalidLink);
        }
        if block.transactions.is_empty() {
            return Err(ChainError::EmptyPayload);
        }
        if block.nonce == 0 {
            return Err(ChainError::InvalidNonce);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Validator;
    use crate::blockchain::{Block, Blockchain};
    use crate::error::ChainError;
    use crate::transaction::{Contract, Transaction};

    fn alice_to_bob() -> Vec<Transaction> {
        vec![Transaction::new("Alice", "Bob", 5.0)]
    }

    #[test]
    fn accepts_mined_block_on_tip() {
        let chain = Blockchain::new();
        let mut b = Block::new(alice_to_bob(), vec![], chain.latest().unwrap().hash.clone());
        b.mine(chain.difficulty());
        assert!(Validator::new(&chain).validate(&b).is_ok());
    }

    #[test]
    fn rejects_unmined_block() {
        let chain = Blockchain::new();
        let b = Block::new(alice_to_bob(), vec![], "");
        let err = Validator::new(&chain).validate(&b).unwrap_err();
        assert!(matches!(err, ChainError::InvalidHash));
    }

    #[test]
    fn rejects_weak_proof_of_work() {
        let chain = Blockchain::with_difficulty(3);
        let mut b = Block::new(alice_to_bob(), vec![], "");
        b.mine(0);
        // whatever was found, force a hash that misses the target
        b.hash = format!("f{}", &b.hash[1..]);
        let err = Validator::new(&chain).validate(&b).unwrap_err();
        assert!(matches!(err, ChainError::InvalidHash));
    }

    #[test]
    fn rejects_bad_link() {
        let chain = Blockchain::new();
        let mut b = Block::new(alice_to_bob(), vec![], "not-the-tip");
        b.mine(chain.difficulty());
        let err = Validator::new(&chain).validate(&b).unwrap_err();
        assert!(matches!(err, ChainError::InvalidLink));
    }

    #[test]
    fn rejects_empty_payload() {
        let chain = Blockchain::new();
        let mut b = Block::new(vec![], vec![Contract::new("Smart Contract 1")], "");
        b.mine(chain.difficulty());
        let err = Validator::new(&chain).validate(&b).unwrap_err();
        assert!(matches!(err, ChainError::EmptyPayload));
    }

    #[test]
    fn rejects_sentinel_nonce() {
        let chain = Blockchain::with_difficulty(0);
        let mut b = Block::new(alice_to_bob(), vec![], "");
        b.hash = b.compute_hash(); // nonce still 0
        let err = Validator::new(&chain).validate(&b).unwrap_err();
        assert!(matches!(err, ChainError::InvalidNonce));
    }

    #[test]
    fn hash_rule_runs_before_link_rule() {
        let chain = Blockchain::new();
        let b = Block::new(vec![], vec![], "not-the-tip");
        let err = Validator::new(&chain).validate(&b).unwrap_err();
        assert!(matches!(err, ChainError::InvalidHash));
    }

    #[test]
    fn link_rule_runs_before_payload_rule() {
        let chain = Blockchain::new();
        let mut b = Block::new(vec![], vec![], "not-the-tip");
        b.mine(chain.difficulty());
        let err = Validator::new(&chain).validate(&b).unwrap_err();
        assert!(matches!(err, ChainError::InvalidLink));
    }

    #[test]
    fn payload_rule_runs_before_nonce_rule() {
        let chain = Blockchain::with_difficulty(0);
        let mut b = Block::new(vec![], vec![], "");
        b.hash = b.compute_hash(); // nonce still 0
        let err = Validator::new(&chain).validate(&b).unwrap_err();
        assert!(matches!(err, ChainError::EmptyPayload));
    }

    #[test]
    fn end_to_end_two_blocks() {
        let mut chain = Blockchain::new();
        assert_eq!(chain.difficulty(), 3);

        let genesis_hash = chain.latest().unwrap().hash.clone();
        let mut first = Block::new(alice_to_bob(), vec![], genesis_hash);
        first.mine(chain.difficulty());
        Validator::new(&chain).validate(&first).unwrap();
        chain.append(first);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.blocks()[1].previous_hash, "");

        let tip = chain.blocks()[1].hash.clone();
        let mut second = Block::new(
            vec![Transaction::new("Charlie", "David", 1.5)],
            vec![Contract::new("Smart Contract 2")],
            tip,
        );
        second.mine(chain.difficulty());
        Validator::new(&chain).validate(&second).unwrap();
        chain.append(second);

        assert_eq!(chain.len(), 3);
        assert!(chain.is_valid_chain());
    }
}
