//! quizchain - single-use, funded guessing games with a commit-reveal
//! answer scheme, and a factory that stamps out independent instances
//! sharing one logic implementation.
//!
//! The system is modeled as a deterministic single-node ledger: [`QuizNode`]
//! executes every operation atomically in one global serialization order,
//! tracks external account balances, and persists all durable state. Each
//! game instance owns exactly four fields (stored digest, winner, prize
//! pool, initialized flag); the factory records only handles.

pub mod arena;
pub mod commitment;
pub mod error;
pub mod factory;
pub mod game;
pub mod ledger;
pub mod node;
pub mod storage;
pub mod types;

pub use arena::GameArena;
pub use commitment::{digest, salted_digest, Digest, SALT};
pub use error::{QuizchainError, Result};
pub use factory::Factory;
pub use game::{GamePhase, GuessOutcome, InstanceInfo, QuizGame, QUESTION};
pub use ledger::Ledger;
pub use node::QuizNode;
pub use types::{AccountId, Amount, Event, EventRecord, FactoryId, InstanceId};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn deploy_initialize_and_solve_round_trip() {
        let dir = tempdir().unwrap();
        let node = QuizNode::new(dir.path()).await.unwrap();

        let logic = node.deploy_logic().await.unwrap();
        let factory = node.deploy_factory(logic).await.unwrap();
        let instance = node.deploy_instance(factory, logic).await.unwrap();

        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");
        node.fund(&alice, Amount::from_wei(2_000)).await.unwrap();

        node.initialize(instance, &alice, digest(b"answer"), Amount::from_wei(1_500))
            .await
            .unwrap();

        let outcome = node
            .guess(instance, &bob, "answer", Amount::ZERO)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            GuessOutcome::Hit {
                prize: Amount::from_wei(1_500)
            }
        );
        assert_eq!(node.winner(instance).unwrap(), Some(bob.clone()));
        assert_eq!(node.balance_of(&bob), Amount::from_wei(1_500));
        assert_eq!(node.balance_of(&alice), Amount::from_wei(500));
    }
}
