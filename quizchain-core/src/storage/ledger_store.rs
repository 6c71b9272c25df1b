use crate::error::Result;
use crate::storage::{amount_from_sql, amount_to_sql};
use crate::types::{AccountId, Amount, EventRecord};
use chrono::Utc;
use rusqlite::{params, Connection};

/// Row-level access to the `accounts` and `events` tables.
pub struct LedgerStore<'a> {
    conn: &'a Connection,
}

impl<'a> LedgerStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save_account(&self, account: &AccountId, balance: Amount) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO accounts (id, balance) VALUES (?1, ?2)",
            params![account.as_str(), amount_to_sql(balance)?],
        )?;

        Ok(())
    }

    pub fn load_accounts(&self) -> Result<Vec<(AccountId, Amount)>> {
        let mut stmt = self.conn.prepare("SELECT id, balance FROM accounts")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let balance: i64 = row.get(1)?;
            Ok((id, balance))
        })?;

        let mut accounts = Vec::new();
        for row in rows {
            let (id, balance) = row?;
            accounts.push((AccountId::new(id), amount_from_sql(balance)?));
        }

        Ok(accounts)
    }

    pub fn append_event(&self, record: &EventRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO events (seq, at, payload) VALUES (?1, ?2, ?3)",
            params![
                record.seq as i64,
                record.at.timestamp(),
                serde_json::to_string(&record.event)?,
            ],
        )?;

        Ok(())
    }

    pub fn load_events(&self) -> Result<Vec<EventRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, at, payload FROM events ORDER BY seq")?;
        let rows = stmt.query_map([], |row| {
            let seq: i64 = row.get(0)?;
            let at: i64 = row.get(1)?;
            let payload: String = row.get(2)?;
            Ok((seq, at, payload))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (seq, at, payload) = row?;
            events.push(EventRecord {
                seq: seq as u64,
                at: chrono::DateTime::from_timestamp(at, 0).unwrap_or_else(Utc::now),
                event: serde_json::from_str(&payload)?,
            });
        }

        Ok(events)
    }
}
