use crate::arena::GameArena;
use crate::error::{QuizchainError, Result};
use crate::types::InstanceId;
use serde::{Deserialize, Serialize};

/// Clone factory and instance registry.
///
/// Records the shared implementation handle at construction and the
/// ordered, append-only list of instances it has deployed. The factory owns
/// no game state; the arena holds the records, the factory only their
/// handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factory {
    implementation: InstanceId,
    instances: Vec<InstanceId>,
}

impl Factory {
    /// Registry for clones of `implementation`.
    ///
    /// Fails with a deployment error if the handle does not resolve to a
    /// deployed record.
    pub fn new(arena: &GameArena, implementation: InstanceId) -> Result<Self> {
        if !arena.contains(implementation) {
            return Err(QuizchainError::deployment(format!(
                "implementation handle {} does not resolve to deployed logic",
                implementation
            )));
        }

        Ok(Self {
            implementation,
            instances: Vec::new(),
        })
    }

    pub(crate) fn from_parts(implementation: InstanceId, instances: Vec<InstanceId>) -> Self {
        Self {
            implementation,
            instances,
        }
    }

    pub fn implementation(&self) -> InstanceId {
        self.implementation
    }

    pub fn instances(&self) -> &[InstanceId] {
        &self.instances
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instance_at(&self, index: usize) -> Result<InstanceId> {
        self.instances
            .get(index)
            .copied()
            .ok_or(QuizchainError::IndexOutOfRange {
                index,
                count: self.instances.len(),
            })
    }

    /// Deploy a fresh clone delegating to `logic`.
    ///
    /// The new record starts zeroed and fully isolated from the master and
    /// every sibling. On failure the registry is unchanged.
    pub fn deploy_instance(
        &mut self,
        arena: &mut GameArena,
        logic: InstanceId,
    ) -> Result<InstanceId> {
        if !arena.contains(logic) {
            return Err(QuizchainError::deployment(format!(
                "logic handle {} does not resolve to deployed logic",
                logic
            )));
        }

        let id = arena.deploy();
        self.instances.push(id);
        tracing::debug!("factory deployed instance {} from logic {}", id, logic);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::digest;
    use crate::game::QUESTION;
    use crate::types::{AccountId, Amount};

    fn arena_with_logic() -> (GameArena, InstanceId) {
        let mut arena = GameArena::new();
        let logic = arena.deploy();
        (arena, logic)
    }

    #[test]
    fn starts_with_an_empty_registry() {
        let (arena, logic) = arena_with_logic();
        let factory = Factory::new(&arena, logic).unwrap();
        assert_eq!(factory.instance_count(), 0);
        assert_eq!(factory.implementation(), logic);
    }

    #[test]
    fn construction_rejects_dangling_implementation() {
        let arena = GameArena::new();
        assert!(matches!(
            Factory::new(&arena, InstanceId::new(7)),
            Err(QuizchainError::Deployment(_))
        ));
    }

    #[test]
    fn deploys_distinct_independent_instances() {
        let (mut arena, logic) = arena_with_logic();
        let mut factory = Factory::new(&arena, logic).unwrap();

        let handles: Vec<_> = (0..5)
            .map(|_| factory.deploy_instance(&mut arena, logic).unwrap())
            .collect();

        assert_eq!(factory.instance_count(), 5);
        for (i, &id) in handles.iter().enumerate() {
            assert_eq!(factory.instance_at(i).unwrap(), id);
            let game = arena.get(id).unwrap();
            assert!(game.answer().is_zero());
            assert!(!game.is_initialized());
            assert_eq!(game.question(), QUESTION);
        }
        let mut unique = handles.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), handles.len());
    }

    #[test]
    fn dangling_logic_handle_leaves_registry_unchanged() {
        let (mut arena, logic) = arena_with_logic();
        let mut factory = Factory::new(&arena, logic).unwrap();
        factory.deploy_instance(&mut arena, logic).unwrap();

        let err = factory
            .deploy_instance(&mut arena, InstanceId::new(99))
            .unwrap_err();
        assert!(matches!(err, QuizchainError::Deployment(_)));
        assert_eq!(factory.instance_count(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn reads_past_the_end_fail_with_index_out_of_range() {
        let (mut arena, logic) = arena_with_logic();
        let mut factory = Factory::new(&arena, logic).unwrap();
        factory.deploy_instance(&mut arena, logic).unwrap();

        assert!(matches!(
            factory.instance_at(1),
            Err(QuizchainError::IndexOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn clones_stay_isolated_from_the_master() {
        let (mut arena, logic) = arena_with_logic();
        let mut factory = Factory::new(&arena, logic).unwrap();
        let clone = factory.deploy_instance(&mut arena, logic).unwrap();

        arena
            .get_mut(logic)
            .unwrap()
            .initialize(digest(b"answer"), Amount::from_wei(100))
            .unwrap();
        arena
            .get_mut(clone)
            .unwrap()
            .initialize(digest(b"other"), Amount::from_wei(7))
            .unwrap();
        arena
            .get_mut(clone)
            .unwrap()
            .guess(&AccountId::new("bob"), "other")
            .unwrap();

        let master = arena.get(logic).unwrap();
        assert!(master.winner().is_none());
        assert_eq!(master.prize_pool(), Amount::from_wei(100));
        assert_ne!(master.answer(), arena.get(clone).unwrap().answer());
    }
}
