use crate::error::{QuizchainError, Result};
use crate::types::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// External account balances.
///
/// Instances custody their prize pools themselves; this ledger tracks the
/// accounts that fund games and collect payouts. Unknown accounts read as
/// zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    accounts: HashMap<AccountId, Amount>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.accounts.get(account).copied().unwrap_or(Amount::ZERO)
    }

    pub fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<()> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or_else(|| QuizchainError::internal("account balance overflow"))?;
        self.accounts.insert(account.clone(), balance);
        Ok(())
    }

    pub fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(account);
        let balance =
            available
                .checked_sub(amount)
                .ok_or(QuizchainError::InsufficientFunds {
                    need: amount.to_wei(),
                    available: available.to_wei(),
                })?;
        self.accounts.insert(account.clone(), balance);
        Ok(())
    }

    pub(crate) fn set_balance(&mut self, account: AccountId, amount: Amount) {
        self.accounts.insert(account, amount);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, Amount)> {
        self.accounts.iter().map(|(id, amount)| (id, *amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_accounts_read_as_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance_of(&AccountId::new("alice")), Amount::ZERO);
    }

    #[test]
    fn credit_and_debit_round_trip() {
        let mut ledger = Ledger::new();
        let alice = AccountId::new("alice");

        ledger.credit(&alice, Amount::from_wei(1_000)).unwrap();
        ledger.debit(&alice, Amount::from_wei(400)).unwrap();
        assert_eq!(ledger.balance_of(&alice), Amount::from_wei(600));
    }

    #[test]
    fn overdraft_is_rejected_without_mutation() {
        let mut ledger = Ledger::new();
        let alice = AccountId::new("alice");
        ledger.credit(&alice, Amount::from_wei(100)).unwrap();

        let err = ledger.debit(&alice, Amount::from_wei(101)).unwrap_err();
        assert!(matches!(
            err,
            QuizchainError::InsufficientFunds {
                need: 101,
                available: 100
            }
        ));
        assert_eq!(ledger.balance_of(&alice), Amount::from_wei(100));
    }
}
