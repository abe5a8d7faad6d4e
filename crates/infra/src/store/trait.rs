use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use treasury_accounting::{
    Account, AccountMovement, Balance, DocumentRef, LodgeAccount, LodgeAccountMovement,
    LodgeGlobalAccount,
};
use treasury_core::{
    AccountId, AccountMovementId, AffiliationId, LodgeAccountId, LodgeAccountMovementId,
    LodgeAccountOwner, LodgeGlobalAccountId, LodgeId, PeriodId, UserId,
};
use treasury_invoicing::Invoice;

/// Persistence operation error.
///
/// These are **infrastructure errors** as opposed to domain errors. Any of them
/// aborts the unit of work it occurred in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Partial write of `(balance, last_modified_by, last_modified_on)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceWrite {
    pub balance: Decimal,
    pub last_modified_by: UserId,
    pub last_modified_on: DateTime<Utc>,
}

impl BalanceWrite {
    pub fn of<B: Balance>(record: &B) -> Self {
        let audit = record.audit();
        Self {
            balance: record.balance(),
            last_modified_by: audit.last_modified_by,
            last_modified_on: audit.last_modified_on,
        }
    }
}

/// Partial write of `(is_active, last_modified_by, last_modified_on)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWrite {
    pub is_active: bool,
    pub last_modified_by: UserId,
    pub last_modified_on: DateTime<Utc>,
}

impl From<&AccountMovement> for StatusWrite {
    fn from(movement: &AccountMovement) -> Self {
        Self {
            is_active: movement.is_active,
            last_modified_by: movement.audit.last_modified_by,
            last_modified_on: movement.audit.last_modified_on,
        }
    }
}

impl From<&LodgeAccountMovement> for StatusWrite {
    fn from(movement: &LodgeAccountMovement) -> Self {
        Self {
            is_active: movement.is_active,
            last_modified_by: movement.audit.last_modified_by,
            last_modified_on: movement.audit.last_modified_on,
        }
    }
}

/// One unit of work against the ledger tables.
///
/// A transaction has exclusive access to every record it reads or writes until
/// it finishes, so read-modify-write sequences on a balance never interleave
/// with another unit of work.
///
/// ## Finishing
///
/// - `commit()` makes every write visible at once.
/// - `rollback()`, or dropping the transaction unfinished, discards every write
///   made through it.
///
/// ## Writes
///
/// Records are inserted whole. Afterwards only named field subsets are written
/// (`BalanceWrite`, `StatusWrite`); movements are otherwise immutable.
pub trait LedgerTx {
    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;
    fn account_by_affiliation(&self, affiliation_id: AffiliationId) -> Result<Option<Account>, StoreError>;
    fn accounts(&self) -> Result<Vec<Account>, StoreError>;
    /// Fails with `DuplicateKey` if the affiliation already has an account.
    fn insert_account(&mut self, account: Account) -> Result<(), StoreError>;
    fn write_account_balance(&mut self, id: AccountId, write: BalanceWrite) -> Result<(), StoreError>;

    fn lodge_account(&self, id: LodgeAccountId) -> Result<Option<LodgeAccount>, StoreError>;
    fn lodge_account_by_owner(&self, owner: LodgeAccountOwner) -> Result<Option<LodgeAccount>, StoreError>;
    fn lodge_accounts(&self) -> Result<Vec<LodgeAccount>, StoreError>;
    fn insert_lodge_account(&mut self, lodge_account: LodgeAccount) -> Result<(), StoreError>;
    fn write_lodge_account_balance(&mut self, id: LodgeAccountId, write: BalanceWrite) -> Result<(), StoreError>;

    fn global_account(&self, id: LodgeGlobalAccountId) -> Result<Option<LodgeGlobalAccount>, StoreError>;
    fn global_account_by_lodge(&self, lodge_id: LodgeId) -> Result<Option<LodgeGlobalAccount>, StoreError>;
    fn global_accounts(&self) -> Result<Vec<LodgeGlobalAccount>, StoreError>;
    fn insert_global_account(&mut self, global: LodgeGlobalAccount) -> Result<(), StoreError>;
    fn write_global_account_balance(&mut self, id: LodgeGlobalAccountId, write: BalanceWrite) -> Result<(), StoreError>;

    fn account_movement(&self, id: AccountMovementId) -> Result<Option<AccountMovement>, StoreError>;
    /// Movements of one account, in posting order.
    fn account_movements(&self, account_id: AccountId) -> Result<Vec<AccountMovement>, StoreError>;
    fn account_movements_for(&self, document: DocumentRef) -> Result<Vec<AccountMovement>, StoreError>;
    fn insert_account_movement(&mut self, movement: AccountMovement) -> Result<(), StoreError>;
    fn write_account_movement_status(&mut self, id: AccountMovementId, write: StatusWrite) -> Result<(), StoreError>;

    fn lodge_account_movement(&self, id: LodgeAccountMovementId) -> Result<Option<LodgeAccountMovement>, StoreError>;
    fn lodge_account_movements(&self, lodge_account_id: LodgeAccountId) -> Result<Vec<LodgeAccountMovement>, StoreError>;
    fn lodge_account_movements_for(&self, document: DocumentRef) -> Result<Vec<LodgeAccountMovement>, StoreError>;
    fn insert_lodge_account_movement(&mut self, movement: LodgeAccountMovement) -> Result<(), StoreError>;
    fn write_lodge_account_movement_status(
        &mut self,
        id: LodgeAccountMovementId,
        write: StatusWrite,
    ) -> Result<(), StoreError>;

    /// Invoices are the one source document the ledger itself creates (billing runs).
    fn insert_invoice(&mut self, invoice: Invoice) -> Result<(), StoreError>;
    fn invoices_for_period(&self, period_id: PeriodId) -> Result<Vec<Invoice>, StoreError>;

    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;

    fn rollback(self)
    where
        Self: Sized;
}

/// Source of ledger transactions.
pub trait LedgerStore: Send + Sync {
    type Tx<'a>: LedgerTx
    where
        Self: 'a;

    /// Start a unit of work. Blocks until no other unit of work holds the ledger.
    fn begin(&self) -> Result<Self::Tx<'_>, StoreError>;
}

impl<S> LedgerStore for std::sync::Arc<S>
where
    S: LedgerStore,
{
    type Tx<'a>
        = S::Tx<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Tx<'_>, StoreError> {
        (**self).begin()
    }
}
