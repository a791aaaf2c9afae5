//! Local nonce sequencing for batch submission
//!
//! The network accepts transactions with sequential nonces while earlier
//! ones are still unconfirmed, so a sender can push an entire batch in one
//! pass. The sequencer is seeded once from the on-chain account state and
//! advanced locally from then on; it never rewinds. An issued nonce counts
//! as consumed even when its transaction later fails or times out, because
//! the network advances nonce state regardless of execution outcome.
//!
//! Exactly one sequencer must own one account within one process run.
//! Concurrent processes driving the same account are unsupported.

use crate::gateway::Account;

/// Assigns strictly increasing sequence numbers for one account
#[derive(Debug)]
pub struct NonceSequencer {
    current: u64,
}

impl NonceSequencer {
    /// Seed the sequencer with the account's next expected nonce
    pub fn new(seed: u64) -> Self {
        Self { current: seed }
    }

    /// Seed from a freshly fetched account
    pub fn from_account(account: &Account) -> Self {
        Self::new(account.nonce)
    }

    /// Return the next nonce and advance. First call returns the seed.
    pub fn next(&mut self) -> u64 {
        let nonce = self.current;
        self.current += 1;
        nonce
    }

    /// The nonce the next call to [`next`](Self::next) will return
    pub fn peek(&self) -> u64 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_from_seed() {
        let mut sequencer = NonceSequencer::new(42);
        let issued: Vec<u64> = (0..5).map(|_| sequencer.next()).collect();
        assert_eq!(issued, vec![42, 43, 44, 45, 46]);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut sequencer = NonceSequencer::new(7);
        assert_eq!(sequencer.peek(), 7);
        assert_eq!(sequencer.peek(), 7);
        assert_eq!(sequencer.next(), 7);
        assert_eq!(sequencer.peek(), 8);
    }
}
