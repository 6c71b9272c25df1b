pub mod game_store;
pub mod ledger_store;
pub mod registry_store;

pub use game_store::GameStore;
pub use ledger_store::LedgerStore;
pub use registry_store::RegistryStore;

use crate::error::{QuizchainError, Result};
use crate::types::Amount;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::path::Path;

/// SQLite-backed persistence for the node's durable state: game records,
/// factory registries, account balances and the event log.
///
/// The connection sits behind a synchronous mutex so an operation can run
/// its transaction inside the node's critical section without a suspension
/// point.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| QuizchainError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY,
                answer BLOB NOT NULL,
                winner TEXT,
                prize_pool INTEGER NOT NULL,
                initialized INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS factories (
                id INTEGER PRIMARY KEY,
                implementation INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS factory_instances (
                factory_id INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                instance_id INTEGER NOT NULL,
                FOREIGN KEY (factory_id) REFERENCES factories(id),
                PRIMARY KEY (factory_id, seq)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                balance INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                seq INTEGER PRIMARY KEY,
                at INTEGER NOT NULL,
                payload TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}

pub(crate) fn amount_to_sql(amount: Amount) -> Result<i64> {
    i64::try_from(amount.to_wei())
        .map_err(|_| QuizchainError::internal("amount exceeds storage range"))
}

pub(crate) fn amount_from_sql(raw: i64) -> Result<Amount> {
    u64::try_from(raw)
        .map(Amount::from_wei)
        .map_err(|_| QuizchainError::internal("negative amount in storage"))
}
