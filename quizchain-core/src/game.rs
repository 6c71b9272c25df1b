use crate::commitment::{digest, salted_digest, Digest};
use crate::error::{QuizchainError, Result};
use crate::types::{AccountId, Amount, InstanceId};
use serde::{Deserialize, Serialize};

/// Question every instance asks. A logic-level constant, never stored per
/// instance.
pub const QUESTION: &str = "Can you guess the secret string?";

/// Lifecycle phase of one game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Uninitialized,
    Funded,
    Resolved,
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GamePhase::Uninitialized => f.write_str("uninitialized"),
            GamePhase::Funded => f.write_str("funded"),
            GamePhase::Resolved => f.write_str("resolved"),
        }
    }
}

/// Result of one serialized guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Candidate matched; the full prize pool was released to the caller.
    Hit { prize: Amount },
    /// Candidate did not match; nothing changed.
    Miss,
}

/// One funded, single-question, single-winner quiz instance.
///
/// The four fields are the instance's entire durable state. `answer` holds
/// `salted_digest(committed)` once initialized and stays all-zero before
/// that; `initialized` flips exactly once and `winner`, once set, is
/// permanent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizGame {
    answer: Digest,
    winner: Option<AccountId>,
    prize_pool: Amount,
    initialized: bool,
}

impl QuizGame {
    /// Fresh zeroed instance, as a factory clone or logic deployment starts.
    pub fn new() -> Self {
        Self {
            answer: Digest::ZERO,
            winner: None,
            prize_pool: Amount::ZERO,
            initialized: false,
        }
    }

    pub(crate) fn from_parts(
        answer: Digest,
        winner: Option<AccountId>,
        prize_pool: Amount,
        initialized: bool,
    ) -> Self {
        Self {
            answer,
            winner,
            prize_pool,
            initialized,
        }
    }

    pub fn question(&self) -> &'static str {
        QUESTION
    }

    /// Stored digest; all-zero until initialization.
    pub fn answer(&self) -> Digest {
        self.answer
    }

    pub fn winner(&self) -> Option<&AccountId> {
        self.winner.as_ref()
    }

    pub fn prize_pool(&self) -> Amount {
        self.prize_pool
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }

    pub fn phase(&self) -> GamePhase {
        if self.winner.is_some() {
            GamePhase::Resolved
        } else if self.initialized {
            GamePhase::Funded
        } else {
            GamePhase::Uninitialized
        }
    }

    /// Commit the answer and fund the pool, exactly once per instance.
    ///
    /// The caller supplies the digest of the plaintext answer, not the
    /// plaintext itself; the instance re-hashes it under the shared salt
    /// before persisting.
    pub fn initialize(&mut self, committed: Digest, deposit: Amount) -> Result<()> {
        if self.initialized {
            return Err(QuizchainError::AlreadyInitialized);
        }

        self.answer = salted_digest(&committed);
        self.prize_pool = self
            .prize_pool
            .checked_add(deposit)
            .ok_or_else(|| QuizchainError::internal("prize pool overflow"))?;
        self.initialized = true;
        Ok(())
    }

    /// Unsolicited value transfer; accepted only while unsolved.
    pub fn deposit(&mut self, amount: Amount) -> Result<()> {
        if self.winner.is_some() {
            return Err(QuizchainError::AlreadyResolved);
        }

        self.prize_pool = self
            .prize_pool
            .checked_add(amount)
            .ok_or_else(|| QuizchainError::internal("prize pool overflow"))?;
        Ok(())
    }

    /// Compare a candidate against the stored digest.
    ///
    /// A hit records the caller as winner, empties the pool and makes the
    /// instance terminal; a miss changes nothing. An uninitialized instance
    /// can never match, since its stored digest is all-zero.
    pub fn guess(&mut self, caller: &AccountId, candidate: &str) -> Result<GuessOutcome> {
        if self.winner.is_some() {
            return Err(QuizchainError::AlreadyResolved);
        }

        if salted_digest(&digest(candidate.as_bytes())) != self.answer {
            return Ok(GuessOutcome::Miss);
        }

        let prize = self.prize_pool;
        self.winner = Some(caller.clone());
        self.prize_pool = Amount::ZERO;
        Ok(GuessOutcome::Hit { prize })
    }

    pub fn info(&self, id: InstanceId) -> InstanceInfo {
        InstanceInfo {
            id,
            question: QUESTION.to_string(),
            answer: self.answer,
            winner: self.winner.clone(),
            prize_pool: self.prize_pool,
            initialized: self.initialized,
            phase: self.phase(),
        }
    }
}

impl Default for QuizGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of one instance for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub id: InstanceId,
    pub question: String,
    pub answer: Digest,
    pub winner: Option<AccountId>,
    pub prize_pool: Amount,
    pub initialized: bool,
    pub phase: GamePhase,
}
