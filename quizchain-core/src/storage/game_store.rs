use crate::commitment::Digest;
use crate::error::{QuizchainError, Result};
use crate::game::QuizGame;
use crate::storage::{amount_from_sql, amount_to_sql};
use crate::types::{AccountId, InstanceId};
use chrono::Utc;
use rusqlite::{params, Connection};

/// Row-level access to the `games` table.
pub struct GameStore<'a> {
    conn: &'a Connection,
}

impl<'a> GameStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save_game(&self, id: InstanceId, game: &QuizGame) -> Result<()> {
        self.conn.execute(
            "INSERT INTO games (id, answer, winner, prize_pool, initialized, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                answer = excluded.answer,
                winner = excluded.winner,
                prize_pool = excluded.prize_pool,
                initialized = excluded.initialized",
            params![
                id.raw() as i64,
                game.answer().as_bytes().as_slice(),
                game.winner().map(|w| w.as_str().to_string()),
                amount_to_sql(game.prize_pool())?,
                game.is_initialized(),
                Utc::now().timestamp(),
            ],
        )?;

        Ok(())
    }

    pub fn load_games(&self) -> Result<Vec<(InstanceId, QuizGame)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, answer, winner, prize_pool, initialized
             FROM games ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let answer: Vec<u8> = row.get(1)?;
            let winner: Option<String> = row.get(2)?;
            let prize_pool: i64 = row.get(3)?;
            let initialized: bool = row.get(4)?;
            Ok((id, answer, winner, prize_pool, initialized))
        })?;

        let mut games = Vec::new();
        for row in rows {
            let (id, answer, winner, prize_pool, initialized) = row?;
            let answer = Digest::try_from(answer.as_slice())
                .map_err(|_| QuizchainError::internal("corrupt answer digest in storage"))?;
            let game = QuizGame::from_parts(
                answer,
                winner.map(AccountId::new),
                amount_from_sql(prize_pool)?,
                initialized,
            );
            games.push((InstanceId::new(id as u64), game));
        }

        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::digest;
    use crate::storage::Storage;
    use crate::types::Amount;
    use tempfile::tempdir;

    #[tokio::test]
    async fn games_survive_a_round_trip() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(&dir.path().join("test.db")).await.unwrap();
        let conn = storage.connection();
        let store = GameStore::new(&conn);

        let fresh = QuizGame::new();
        let mut solved = QuizGame::new();
        solved
            .initialize(digest(b"answer"), Amount::from_wei(1_000))
            .unwrap();
        solved.guess(&AccountId::new("bob"), "answer").unwrap();

        store.save_game(InstanceId::new(0), &fresh).unwrap();
        store.save_game(InstanceId::new(1), &solved).unwrap();

        let loaded = store.load_games().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].1, fresh);
        assert_eq!(loaded[1].1, solved);
    }

    #[tokio::test]
    async fn saving_twice_keeps_one_row() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(&dir.path().join("test.db")).await.unwrap();
        let conn = storage.connection();
        let store = GameStore::new(&conn);

        let mut game = QuizGame::new();
        store.save_game(InstanceId::new(0), &game).unwrap();
        game.initialize(digest(b"answer"), Amount::from_wei(5)).unwrap();
        store.save_game(InstanceId::new(0), &game).unwrap();

        let loaded = store.load_games().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].1.is_initialized());
    }
}
