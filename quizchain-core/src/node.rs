use crate::arena::GameArena;
use crate::commitment::Digest;
use crate::error::{QuizchainError, Result};
use crate::factory::Factory;
use crate::game::{GuessOutcome, InstanceInfo, QuizGame, QUESTION};
use crate::ledger::Ledger;
use crate::storage::{GameStore, LedgerStore, RegistryStore, Storage};
use crate::types::{AccountId, Amount, Event, EventRecord, FactoryId, InstanceId};
use chrono::Utc;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// In-memory chain state, mirrored row for row by storage.
#[derive(Debug, Default)]
struct ChainState {
    arena: GameArena,
    factories: Vec<Factory>,
    ledger: Ledger,
    events: Vec<EventRecord>,
}

/// Single-node executor for the quiz system.
///
/// Every operation runs to completion under one write lock, giving the
/// single global serialization order the design assumes: two guesses can
/// never interleave, and if both would match, the second observes a winner
/// and fails. Operations are all-or-nothing — preconditions are checked
/// first, the SQLite writes run in one transaction, and the in-memory state
/// is only touched after that transaction commits. A failed call leaves
/// balances and stored fields exactly as they were.
pub struct QuizNode {
    storage: Arc<Storage>,
    state: RwLock<ChainState>,
}

impl QuizNode {
    /// Open (or create) a node rooted at `data_dir` and load all persisted
    /// state.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        let db_path = data_dir.join("quizchain.db");
        let storage = Arc::new(Storage::new(&db_path).await?);
        let state = Self::load_state(&storage)?;

        Ok(Self {
            storage,
            state: RwLock::new(state),
        })
    }

    fn load_state(storage: &Storage) -> Result<ChainState> {
        let conn = storage.connection();
        let mut state = ChainState::default();

        for (id, game) in GameStore::new(&conn).load_games()? {
            let assigned = state.arena.insert(game);
            if assigned != id {
                return Err(QuizchainError::internal(format!(
                    "non-contiguous game handles in storage: expected {}, found {}",
                    assigned, id
                )));
            }
        }

        for (id, factory) in RegistryStore::new(&conn).load_factories()? {
            if id.raw() as usize != state.factories.len() {
                return Err(QuizchainError::internal(format!(
                    "non-contiguous factory handles in storage: found {}",
                    id
                )));
            }
            state.factories.push(factory);
        }

        let ledger_store = LedgerStore::new(&conn);
        for (account, balance) in ledger_store.load_accounts()? {
            state.ledger.set_balance(account, balance);
        }
        state.events = ledger_store.load_events()?;

        Ok(state)
    }

    fn next_event(events: &[EventRecord], event: Event) -> EventRecord {
        EventRecord {
            seq: events.len() as u64,
            at: Utc::now(),
            event,
        }
    }

    fn factory_ref(factories: &[Factory], id: FactoryId) -> Result<&Factory> {
        factories
            .get(id.raw() as usize)
            .ok_or(QuizchainError::UnknownFactory { id })
    }

    /// Deploy the shared game logic. The master record is itself a playable
    /// instance.
    pub async fn deploy_logic(&self) -> Result<InstanceId> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let id = InstanceId::new(state.arena.len() as u64);
        let record = Self::next_event(&state.events, Event::LogicDeployed { instance: id });

        {
            let mut conn = self.storage.connection();
            let tx = conn.transaction()?;
            GameStore::new(&tx).save_game(id, &QuizGame::new())?;
            LedgerStore::new(&tx).append_event(&record)?;
            tx.commit()?;
        }

        state.arena.deploy();
        state.events.push(record);
        tracing::info!("deployed quiz logic at handle {}", id);
        Ok(id)
    }

    /// Deploy a factory bound to `implementation`.
    pub async fn deploy_factory(&self, implementation: InstanceId) -> Result<FactoryId> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let factory = Factory::new(&state.arena, implementation)?;
        let id = FactoryId::new(state.factories.len() as u64);
        let record = Self::next_event(
            &state.events,
            Event::FactoryDeployed {
                factory: id,
                implementation,
            },
        );

        {
            let mut conn = self.storage.connection();
            let tx = conn.transaction()?;
            RegistryStore::new(&tx).save_factory(id, &factory)?;
            LedgerStore::new(&tx).append_event(&record)?;
            tx.commit()?;
        }

        state.factories.push(factory);
        state.events.push(record);
        tracing::info!("deployed factory {} delegating to logic {}", id, implementation);
        Ok(id)
    }

    /// Deploy a fresh clone through `factory`, delegating to `logic`.
    ///
    /// The new handle is returned and also carried by the deployment event,
    /// which is the channel external tooling parses.
    pub async fn deploy_instance(
        &self,
        factory: FactoryId,
        logic: InstanceId,
    ) -> Result<InstanceId> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        Self::factory_ref(&state.factories, factory)?;
        if !state.arena.contains(logic) {
            return Err(QuizchainError::deployment(format!(
                "logic handle {} does not resolve to deployed logic",
                logic
            )));
        }

        let id = InstanceId::new(state.arena.len() as u64);
        let seq = state.factories[factory.raw() as usize].instance_count();
        let record = Self::next_event(
            &state.events,
            Event::Deployment {
                factory,
                instance: id,
            },
        );

        {
            let mut conn = self.storage.connection();
            let tx = conn.transaction()?;
            GameStore::new(&tx).save_game(id, &QuizGame::new())?;
            RegistryStore::new(&tx).append_instance(factory, seq, id)?;
            LedgerStore::new(&tx).append_event(&record)?;
            tx.commit()?;
        }

        let assigned =
            state.factories[factory.raw() as usize].deploy_instance(&mut state.arena, logic)?;
        debug_assert_eq!(assigned, id);
        state.events.push(record);
        tracing::info!("factory {} deployed instance {}", factory, id);
        Ok(id)
    }

    /// Commit an answer digest and fund the pool, debiting `caller`.
    pub async fn initialize(
        &self,
        instance: InstanceId,
        caller: &AccountId,
        committed: Digest,
        deposit: Amount,
    ) -> Result<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let mut next = state.arena.get(instance)?.clone();
        next.initialize(committed, deposit)?;

        let available = state.ledger.balance_of(caller);
        let remaining =
            available
                .checked_sub(deposit)
                .ok_or(QuizchainError::InsufficientFunds {
                    need: deposit.to_wei(),
                    available: available.to_wei(),
                })?;
        let record = Self::next_event(&state.events, Event::Initialized { instance, deposit });

        {
            let mut conn = self.storage.connection();
            let tx = conn.transaction()?;
            GameStore::new(&tx).save_game(instance, &next)?;
            LedgerStore::new(&tx).save_account(caller, remaining)?;
            LedgerStore::new(&tx).append_event(&record)?;
            tx.commit()?;
        }

        state.ledger.debit(caller, deposit)?;
        *state.arena.get_mut(instance)? = next;
        state.events.push(record);
        tracing::info!(
            "instance {} initialized by {} with {}",
            instance,
            caller,
            deposit
        );
        Ok(())
    }

    /// Submit a guess. Guess calls accept no value: a non-zero `attached`
    /// fails the whole call and nothing is retained.
    ///
    /// A hit pays the full pool to `caller` and resolves the instance in the
    /// same operation; the payout and the state transition are indivisible.
    pub async fn guess(
        &self,
        instance: InstanceId,
        caller: &AccountId,
        candidate: &str,
        attached: Amount,
    ) -> Result<GuessOutcome> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let mut next = state.arena.get(instance)?.clone();
        if !attached.is_zero() {
            return Err(QuizchainError::GuessNotPayable);
        }
        let outcome = next.guess(caller, candidate)?;

        let paid_balance = match &outcome {
            GuessOutcome::Hit { prize } => Some(
                state
                    .ledger
                    .balance_of(caller)
                    .checked_add(*prize)
                    .ok_or_else(|| QuizchainError::internal("account balance overflow"))?,
            ),
            GuessOutcome::Miss => None,
        };

        let event = match &outcome {
            GuessOutcome::Hit { prize } => Event::Solved {
                instance,
                winner: caller.clone(),
                candidate: candidate.to_string(),
                prize: *prize,
            },
            GuessOutcome::Miss => Event::Missed {
                instance,
                caller: caller.clone(),
                candidate: candidate.to_string(),
            },
        };
        let record = Self::next_event(&state.events, event);

        {
            let mut conn = self.storage.connection();
            let tx = conn.transaction()?;
            if let Some(balance) = paid_balance {
                GameStore::new(&tx).save_game(instance, &next)?;
                LedgerStore::new(&tx).save_account(caller, balance)?;
            }
            LedgerStore::new(&tx).append_event(&record)?;
            tx.commit()?;
        }

        match &outcome {
            GuessOutcome::Hit { prize } => {
                state.ledger.credit(caller, *prize)?;
                *state.arena.get_mut(instance)? = next;
                tracing::info!(
                    "instance {} solved by {}, prize {}",
                    instance,
                    caller,
                    prize
                );
            }
            GuessOutcome::Miss => {
                tracing::debug!("wrong guess on instance {} by {}", instance, caller);
            }
        }
        state.events.push(record);
        Ok(outcome)
    }

    /// Unsolicited value transfer into an instance, debiting `from`.
    /// Accepted while unsolved, rejected once a winner exists.
    pub async fn send_to_instance(
        &self,
        instance: InstanceId,
        from: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let mut next = state.arena.get(instance)?.clone();
        next.deposit(amount)?;

        let available = state.ledger.balance_of(from);
        let remaining =
            available
                .checked_sub(amount)
                .ok_or(QuizchainError::InsufficientFunds {
                    need: amount.to_wei(),
                    available: available.to_wei(),
                })?;
        let record = Self::next_event(
            &state.events,
            Event::Deposited {
                instance,
                from: from.clone(),
                amount,
            },
        );

        {
            let mut conn = self.storage.connection();
            let tx = conn.transaction()?;
            GameStore::new(&tx).save_game(instance, &next)?;
            LedgerStore::new(&tx).save_account(from, remaining)?;
            LedgerStore::new(&tx).append_event(&record)?;
            tx.commit()?;
        }

        state.ledger.debit(from, amount)?;
        *state.arena.get_mut(instance)? = next;
        state.events.push(record);
        tracing::info!("{} deposited {} into instance {}", from, amount, instance);
        Ok(())
    }

    /// Credit an external account out of thin air. Stands in for the funding
    /// the surrounding tooling performs.
    pub async fn fund(&self, account: &AccountId, amount: Amount) -> Result<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let balance = state
            .ledger
            .balance_of(account)
            .checked_add(amount)
            .ok_or_else(|| QuizchainError::internal("account balance overflow"))?;

        {
            let conn = self.storage.connection();
            LedgerStore::new(&conn).save_account(account, balance)?;
        }

        state.ledger.credit(account, amount)?;
        tracing::info!("funded {} with {}", account, amount);
        Ok(())
    }

    pub fn question(&self) -> &'static str {
        QUESTION
    }

    /// Stored digest of an instance; all-zero until initialization.
    pub fn stored_digest(&self, instance: InstanceId) -> Result<Digest> {
        Ok(self.state.read().arena.get(instance)?.answer())
    }

    pub fn winner(&self, instance: InstanceId) -> Result<Option<AccountId>> {
        Ok(self.state.read().arena.get(instance)?.winner().cloned())
    }

    pub fn prize_pool(&self, instance: InstanceId) -> Result<Amount> {
        Ok(self.state.read().arena.get(instance)?.prize_pool())
    }

    pub fn instance_info(&self, instance: InstanceId) -> Result<InstanceInfo> {
        Ok(self.state.read().arena.get(instance)?.info(instance))
    }

    /// Snapshots of every deployed record, masters and clones alike.
    pub fn instances(&self) -> Vec<InstanceInfo> {
        self.state
            .read()
            .arena
            .iter()
            .map(|(id, game)| game.info(id))
            .collect()
    }

    /// Total number of deployed records in the arena.
    pub fn game_count(&self) -> usize {
        self.state.read().arena.len()
    }

    pub fn factory_count(&self) -> usize {
        self.state.read().factories.len()
    }

    pub fn factory_implementation(&self, factory: FactoryId) -> Result<InstanceId> {
        let state = self.state.read();
        Ok(Self::factory_ref(&state.factories, factory)?.implementation())
    }

    pub fn instance_count(&self, factory: FactoryId) -> Result<usize> {
        let state = self.state.read();
        Ok(Self::factory_ref(&state.factories, factory)?.instance_count())
    }

    pub fn instance_at(&self, factory: FactoryId, index: usize) -> Result<InstanceId> {
        let state = self.state.read();
        Self::factory_ref(&state.factories, factory)?.instance_at(index)
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.state.read().ledger.balance_of(account)
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.state.read().events.clone()
    }
}
