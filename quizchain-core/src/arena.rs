use crate::error::{QuizchainError, Result};
use crate::game::QuizGame;
use crate::types::InstanceId;
use serde::{Deserialize, Serialize};

/// Arena of deployed game records.
///
/// Every deployment allocates one fresh zeroed record here, the master
/// logic record and each factory clone alike. All records share the same
/// executable logic and constants; each owns its own storage, so no
/// instance's mutation can leak into a sibling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameArena {
    games: Vec<QuizGame>,
}

impl GameArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh zeroed record and hand back its handle.
    pub fn deploy(&mut self) -> InstanceId {
        self.insert(QuizGame::new())
    }

    pub(crate) fn insert(&mut self, game: QuizGame) -> InstanceId {
        let id = InstanceId::new(self.games.len() as u64);
        self.games.push(game);
        id
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        (id.raw() as usize) < self.games.len()
    }

    pub fn get(&self, id: InstanceId) -> Result<&QuizGame> {
        self.games
            .get(id.raw() as usize)
            .ok_or(QuizchainError::UnknownInstance { id })
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Result<&mut QuizGame> {
        self.games
            .get_mut(id.raw() as usize)
            .ok_or(QuizchainError::UnknownInstance { id })
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &QuizGame)> {
        self.games
            .iter()
            .enumerate()
            .map(|(i, game)| (InstanceId::new(i as u64), game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::digest;
    use crate::types::{AccountId, Amount};

    #[test]
    fn deploy_hands_out_dense_distinct_handles() {
        let mut arena = GameArena::new();
        let a = arena.deploy();
        let b = arena.deploy();
        let c = arena.deploy();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(arena.len(), 3);
        assert!(arena.get(a).unwrap().answer().is_zero());
        assert!(arena.get(c).unwrap().answer().is_zero());
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let arena = GameArena::new();
        assert!(matches!(
            arena.get(InstanceId::new(0)),
            Err(QuizchainError::UnknownInstance { .. })
        ));
    }

    #[test]
    fn records_are_isolated_from_each_other() {
        let mut arena = GameArena::new();
        let master = arena.deploy();
        let clone = arena.deploy();

        arena
            .get_mut(master)
            .unwrap()
            .initialize(digest(b"answer"), Amount::from_wei(500))
            .unwrap();
        arena
            .get_mut(master)
            .unwrap()
            .guess(&AccountId::new("alice"), "answer")
            .unwrap();

        let untouched = arena.get(clone).unwrap();
        assert!(untouched.answer().is_zero());
        assert!(untouched.winner().is_none());
        assert_eq!(untouched.prize_pool(), Amount::ZERO);
    }
}
