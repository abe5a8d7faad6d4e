use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use treasury_accounting::{
    Account, AccountMovement, DocumentRef, LodgeAccount, LodgeAccountMovement, LodgeGlobalAccount,
};
use treasury_core::{
    AccountId, AccountMovementId, AffiliationId, Entity, LodgeAccountId, LodgeAccountMovementId,
    LodgeAccountOwner, LodgeGlobalAccountId, LodgeId, PeriodId,
};
use treasury_invoicing::Invoice;

use super::r#trait::{BalanceWrite, LedgerStore, LedgerTx, StatusWrite, StoreError};

/// Insertion-ordered table keyed by entity id.
#[derive(Debug)]
struct Rows<V: Entity> {
    rows: Vec<V>,
    index: HashMap<V::Id, usize>,
}

impl<V: Entity> Default for Rows<V> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: Entity + Clone> Rows<V> {
    fn get(&self, id: V::Id) -> Option<&V> {
        self.index.get(&id).map(|&pos| &self.rows[pos])
    }

    fn iter(&self) -> impl Iterator<Item = &V> {
        self.rows.iter()
    }

    fn push(&mut self, row: V) -> Result<(), StoreError> {
        let id = row.id();
        if self.index.contains_key(&id) {
            return Err(StoreError::DuplicateKey(format!("{id:?}")));
        }
        self.index.insert(id, self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    /// Undo of the latest `push`.
    fn pop(&mut self) {
        if let Some(row) = self.rows.pop() {
            self.index.remove(&row.id());
        }
    }

    /// Apply `f` to a row and return its previous version.
    fn update(&mut self, id: V::Id, f: impl FnOnce(&mut V)) -> Result<V, StoreError> {
        let pos = *self
            .index
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(format!("{id:?}")))?;
        let row = &mut self.rows[pos];
        let prev = row.clone();
        f(row);
        Ok(prev)
    }

    fn restore(&mut self, prev: V) {
        if let Some(&pos) = self.index.get(&prev.id()) {
            self.rows[pos] = prev;
        }
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: Rows<Account>,
    account_owners: HashMap<AffiliationId, AccountId>,
    lodge_accounts: Rows<LodgeAccount>,
    lodge_account_owners: HashMap<LodgeAccountOwner, LodgeAccountId>,
    global_accounts: Rows<LodgeGlobalAccount>,
    global_account_lodges: HashMap<LodgeId, LodgeGlobalAccountId>,
    account_movements: Rows<AccountMovement>,
    lodge_account_movements: Rows<LodgeAccountMovement>,
    invoices: Rows<Invoice>,
}

type Undo = Box<dyn FnOnce(&mut LedgerState)>;

/// In-memory ledger store.
///
/// Intended for tests/dev. Units of work are fully serialized: a transaction
/// holds the store lock from `begin()` until it commits or rolls back. Writes
/// are applied in place and recorded in an undo log that rollback replays
/// backwards.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    type Tx<'a> = InMemoryTx<'a>;

    fn begin(&self) -> Result<InMemoryTx<'_>, StoreError> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(InMemoryTx {
            state,
            undo: Vec::new(),
            finished: false,
        })
    }
}

/// Transaction over [`InMemoryLedgerStore`].
pub struct InMemoryTx<'a> {
    state: MutexGuard<'a, LedgerState>,
    undo: Vec<Undo>,
    finished: bool,
}

impl InMemoryTx<'_> {
    fn record(&mut self, undo: impl FnOnce(&mut LedgerState) + 'static) {
        self.undo.push(Box::new(undo));
    }

    fn undo_all(&mut self) {
        while let Some(undo) = self.undo.pop() {
            undo(&mut *self.state);
        }
    }
}

impl Drop for InMemoryTx<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.undo_all();
        }
    }
}

fn not_found(what: &str, id: impl core::fmt::Display) -> StoreError {
    StoreError::NotFound(format!("{what} {id}"))
}

impl LedgerTx for InMemoryTx<'_> {
    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.state.accounts.get(id).cloned())
    }

    fn account_by_affiliation(&self, affiliation_id: AffiliationId) -> Result<Option<Account>, StoreError> {
        Ok(self
            .state
            .account_owners
            .get(&affiliation_id)
            .and_then(|id| self.state.accounts.get(*id))
            .cloned())
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.state.accounts.iter().cloned().collect())
    }

    fn insert_account(&mut self, account: Account) -> Result<(), StoreError> {
        let (id, owner) = (account.id, account.affiliation_id);
        if self.state.account_owners.contains_key(&owner) {
            return Err(StoreError::DuplicateKey(format!("account for affiliation {owner}")));
        }
        self.state.accounts.push(account)?;
        self.state.account_owners.insert(owner, id);
        self.record(move |s| {
            s.accounts.pop();
            s.account_owners.remove(&owner);
        });
        Ok(())
    }

    fn write_account_balance(&mut self, id: AccountId, write: BalanceWrite) -> Result<(), StoreError> {
        let prev = self
            .state
            .accounts
            .update(id, |a| {
                a.balance = write.balance;
                a.audit.last_modified_by = write.last_modified_by;
                a.audit.last_modified_on = write.last_modified_on;
            })
            .map_err(|_| not_found("account", id))?;
        self.record(move |s| s.accounts.restore(prev));
        Ok(())
    }

    fn lodge_account(&self, id: LodgeAccountId) -> Result<Option<LodgeAccount>, StoreError> {
        Ok(self.state.lodge_accounts.get(id).cloned())
    }

    fn lodge_account_by_owner(&self, owner: LodgeAccountOwner) -> Result<Option<LodgeAccount>, StoreError> {
        Ok(self
            .state
            .lodge_account_owners
            .get(&owner)
            .and_then(|id| self.state.lodge_accounts.get(*id))
            .cloned())
    }

    fn lodge_accounts(&self) -> Result<Vec<LodgeAccount>, StoreError> {
        Ok(self.state.lodge_accounts.iter().cloned().collect())
    }

    fn insert_lodge_account(&mut self, lodge_account: LodgeAccount) -> Result<(), StoreError> {
        let (id, owner) = (lodge_account.id, lodge_account.owner);
        if self.state.lodge_account_owners.contains_key(&owner) {
            return Err(StoreError::DuplicateKey(format!("lodge account for {owner}")));
        }
        if self.state.global_accounts.get(lodge_account.global_account_id).is_none() {
            return Err(not_found("lodge global account", lodge_account.global_account_id));
        }
        self.state.lodge_accounts.push(lodge_account)?;
        self.state.lodge_account_owners.insert(owner, id);
        self.record(move |s| {
            s.lodge_accounts.pop();
            s.lodge_account_owners.remove(&owner);
        });
        Ok(())
    }

    fn write_lodge_account_balance(&mut self, id: LodgeAccountId, write: BalanceWrite) -> Result<(), StoreError> {
        let prev = self
            .state
            .lodge_accounts
            .update(id, |a| {
                a.balance = write.balance;
                a.audit.last_modified_by = write.last_modified_by;
                a.audit.last_modified_on = write.last_modified_on;
            })
            .map_err(|_| not_found("lodge account", id))?;
        self.record(move |s| s.lodge_accounts.restore(prev));
        Ok(())
    }

    fn global_account(&self, id: LodgeGlobalAccountId) -> Result<Option<LodgeGlobalAccount>, StoreError> {
        Ok(self.state.global_accounts.get(id).cloned())
    }

    fn global_account_by_lodge(&self, lodge_id: LodgeId) -> Result<Option<LodgeGlobalAccount>, StoreError> {
        Ok(self
            .state
            .global_account_lodges
            .get(&lodge_id)
            .and_then(|id| self.state.global_accounts.get(*id))
            .cloned())
    }

    fn global_accounts(&self) -> Result<Vec<LodgeGlobalAccount>, StoreError> {
        Ok(self.state.global_accounts.iter().cloned().collect())
    }

    fn insert_global_account(&mut self, global: LodgeGlobalAccount) -> Result<(), StoreError> {
        let (id, lodge_id) = (global.id, global.lodge_id);
        if self.state.global_account_lodges.contains_key(&lodge_id) {
            return Err(StoreError::DuplicateKey(format!("global account for lodge {lodge_id}")));
        }
        self.state.global_accounts.push(global)?;
        self.state.global_account_lodges.insert(lodge_id, id);
        self.record(move |s| {
            s.global_accounts.pop();
            s.global_account_lodges.remove(&lodge_id);
        });
        Ok(())
    }

    fn write_global_account_balance(&mut self, id: LodgeGlobalAccountId, write: BalanceWrite) -> Result<(), StoreError> {
        let prev = self
            .state
            .global_accounts
            .update(id, |a| {
                a.balance = write.balance;
                a.audit.last_modified_by = write.last_modified_by;
                a.audit.last_modified_on = write.last_modified_on;
            })
            .map_err(|_| not_found("lodge global account", id))?;
        self.record(move |s| s.global_accounts.restore(prev));
        Ok(())
    }

    fn account_movement(&self, id: AccountMovementId) -> Result<Option<AccountMovement>, StoreError> {
        Ok(self.state.account_movements.get(id).cloned())
    }

    fn account_movements(&self, account_id: AccountId) -> Result<Vec<AccountMovement>, StoreError> {
        Ok(self
            .state
            .account_movements
            .iter()
            .filter(|m| m.account_id == account_id)
            .cloned()
            .collect())
    }

    fn account_movements_for(&self, document: DocumentRef) -> Result<Vec<AccountMovement>, StoreError> {
        Ok(self
            .state
            .account_movements
            .iter()
            .filter(|m| m.document == document)
            .cloned()
            .collect())
    }

    fn insert_account_movement(&mut self, movement: AccountMovement) -> Result<(), StoreError> {
        if self.state.accounts.get(movement.account_id).is_none() {
            return Err(not_found("account", movement.account_id));
        }
        self.state.account_movements.push(movement)?;
        self.record(|s| s.account_movements.pop());
        Ok(())
    }

    fn write_account_movement_status(&mut self, id: AccountMovementId, write: StatusWrite) -> Result<(), StoreError> {
        let prev = self
            .state
            .account_movements
            .update(id, |m| {
                m.is_active = write.is_active;
                m.audit.last_modified_by = write.last_modified_by;
                m.audit.last_modified_on = write.last_modified_on;
            })
            .map_err(|_| not_found("account movement", id))?;
        self.record(move |s| s.account_movements.restore(prev));
        Ok(())
    }

    fn lodge_account_movement(&self, id: LodgeAccountMovementId) -> Result<Option<LodgeAccountMovement>, StoreError> {
        Ok(self.state.lodge_account_movements.get(id).cloned())
    }

    fn lodge_account_movements(&self, lodge_account_id: LodgeAccountId) -> Result<Vec<LodgeAccountMovement>, StoreError> {
        Ok(self
            .state
            .lodge_account_movements
            .iter()
            .filter(|m| m.lodge_account_id == lodge_account_id)
            .cloned()
            .collect())
    }

    fn lodge_account_movements_for(&self, document: DocumentRef) -> Result<Vec<LodgeAccountMovement>, StoreError> {
        Ok(self
            .state
            .lodge_account_movements
            .iter()
            .filter(|m| m.document == document)
            .cloned()
            .collect())
    }

    fn insert_lodge_account_movement(&mut self, movement: LodgeAccountMovement) -> Result<(), StoreError> {
        if self.state.lodge_accounts.get(movement.lodge_account_id).is_none() {
            return Err(not_found("lodge account", movement.lodge_account_id));
        }
        self.state.lodge_account_movements.push(movement)?;
        self.record(|s| s.lodge_account_movements.pop());
        Ok(())
    }

    fn write_lodge_account_movement_status(
        &mut self,
        id: LodgeAccountMovementId,
        write: StatusWrite,
    ) -> Result<(), StoreError> {
        let prev = self
            .state
            .lodge_account_movements
            .update(id, |m| {
                m.is_active = write.is_active;
                m.audit.last_modified_by = write.last_modified_by;
                m.audit.last_modified_on = write.last_modified_on;
            })
            .map_err(|_| not_found("lodge account movement", id))?;
        self.record(move |s| s.lodge_account_movements.restore(prev));
        Ok(())
    }

    fn insert_invoice(&mut self, invoice: Invoice) -> Result<(), StoreError> {
        self.state.invoices.push(invoice)?;
        self.record(|s| s.invoices.pop());
        Ok(())
    }

    fn invoices_for_period(&self, period_id: PeriodId) -> Result<Vec<Invoice>, StoreError> {
        Ok(self
            .state
            .invoices
            .iter()
            .filter(|i| i.period_id == period_id)
            .cloned()
            .collect())
    }

    fn commit(mut self) -> Result<(), StoreError> {
        self.undo.clear();
        self.finished = true;
        Ok(())
    }

    fn rollback(mut self) {
        self.undo_all();
        self.finished = true;
    }
}
