use crate::error::Result;
use crate::factory::Factory;
use crate::types::{FactoryId, InstanceId};
use chrono::Utc;
use rusqlite::{params, Connection};

/// Row-level access to the `factories` and `factory_instances` tables.
pub struct RegistryStore<'a> {
    conn: &'a Connection,
}

impl<'a> RegistryStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record a newly constructed factory. The implementation handle is
    /// immutable, so an existing row is never updated.
    pub fn save_factory(&self, id: FactoryId, factory: &Factory) -> Result<()> {
        self.conn.execute(
            "INSERT INTO factories (id, implementation, created_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO NOTHING",
            params![
                id.raw() as i64,
                factory.implementation().raw() as i64,
                Utc::now().timestamp(),
            ],
        )?;

        Ok(())
    }

    pub fn append_instance(
        &self,
        factory: FactoryId,
        seq: usize,
        instance: InstanceId,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO factory_instances (factory_id, seq, instance_id)
             VALUES (?1, ?2, ?3)",
            params![factory.raw() as i64, seq as i64, instance.raw() as i64],
        )?;

        Ok(())
    }

    pub fn load_factories(&self) -> Result<Vec<(FactoryId, Factory)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, implementation FROM factories ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let implementation: i64 = row.get(1)?;
            Ok((id, implementation))
        })?;

        let mut factories = Vec::new();
        for row in rows {
            let (id, implementation) = row?;

            let mut stmt = self.conn.prepare(
                "SELECT instance_id FROM factory_instances
                 WHERE factory_id = ?1 ORDER BY seq",
            )?;
            let instance_rows = stmt.query_map(params![id], |row| {
                let instance: i64 = row.get(0)?;
                Ok(InstanceId::new(instance as u64))
            })?;

            let mut instances = Vec::new();
            for instance in instance_rows {
                instances.push(instance?);
            }

            factories.push((
                FactoryId::new(id as u64),
                Factory::from_parts(InstanceId::new(implementation as u64), instances),
            ));
        }

        Ok(factories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::GameArena;
    use crate::storage::Storage;
    use tempfile::tempdir;

    #[tokio::test]
    async fn registries_survive_a_round_trip() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(&dir.path().join("test.db")).await.unwrap();
        let conn = storage.connection();
        let store = RegistryStore::new(&conn);

        let mut arena = GameArena::new();
        let logic = arena.deploy();
        let mut factory = Factory::new(&arena, logic).unwrap();
        let id = FactoryId::new(0);
        store.save_factory(id, &factory).unwrap();

        for seq in 0..3 {
            let instance = factory.deploy_instance(&mut arena, logic).unwrap();
            store.append_instance(id, seq, instance).unwrap();
        }

        let loaded = store.load_factories().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0, id);
        assert_eq!(loaded[0].1.implementation(), logic);
        assert_eq!(loaded[0].1.instances(), factory.instances());
    }
}
