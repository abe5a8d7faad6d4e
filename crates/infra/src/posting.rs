//! Ledger posting engine.
//!
//! Balances are running totals. They change through exactly two deltas:
//!
//! - **post**: a new movement applies `+amount` to its account.
//! - **reverse**: deactivating a movement applies `-amount`, once.
//!
//! Lodge-level deltas cascade to the lodge's global account within the same
//! transaction. Balances are never recomputed from movement history here.
//!
//! Every operation re-reads the accounts it touches through the transaction, so
//! the delta is always applied on top of the latest committed balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use treasury_accounting::{
    Account, AccountMovement, AccountMovementKind, Balance, DocumentRef, LodgeAccount,
    LodgeAccountMovement, LodgeAccountMovementKind, LodgeGlobalAccount,
};
use treasury_core::{
    AccountId, AccountMovementId, Audit, LodgeAccountId, LodgeAccountMovementId,
    LodgeGlobalAccountId, UserId,
};

use crate::error::{PostingError, PostingResult};
use crate::store::{BalanceWrite, LedgerTx, StatusWrite, StoreError};

#[derive(Debug, Default, Clone, Copy)]
pub struct LedgerPostingEngine;

impl LedgerPostingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Post `amount` (signed) against a member account.
    ///
    /// `audit` is the source document's; it is copied onto the movement and
    /// its last modifier stamped on the account.
    pub fn post_account_movement(
        &self,
        tx: &mut dyn LedgerTx,
        document: DocumentRef,
        account_id: AccountId,
        kind: AccountMovementKind,
        amount: Decimal,
        audit: Audit,
    ) -> PostingResult<AccountMovement> {
        if AccountMovementKind::for_document(&document) != Some(kind) {
            return Err(PostingError::InvalidMovementType {
                document,
                kind: kind.as_str(),
            });
        }

        let mut account = load_account(tx, account_id)?;
        let movement = AccountMovement::post(document, &mut account, kind, amount, audit)?;

        tx.write_account_balance(account.id, BalanceWrite::of(&account))?;
        tx.insert_account_movement(movement.clone())?;

        info!(
            document = %document,
            account = %account.id,
            kind = kind.as_str(),
            amount = %amount,
            balance = %movement.balance,
            "account movement posted"
        );
        Ok(movement)
    }

    /// Post `amount` (signed) against a lodge account and cascade it to the
    /// lodge's global account.
    pub fn post_lodge_account_movement(
        &self,
        tx: &mut dyn LedgerTx,
        document: DocumentRef,
        lodge_account_id: LodgeAccountId,
        kind: LodgeAccountMovementKind,
        amount: Decimal,
        audit: Audit,
    ) -> PostingResult<LodgeAccountMovement> {
        if LodgeAccountMovementKind::for_document(&document) != Some(kind) {
            return Err(PostingError::InvalidMovementType {
                document,
                kind: kind.as_str(),
            });
        }

        let mut lodge_account = load_lodge_account(tx, lodge_account_id)?;
        let mut global = load_global_account(tx, lodge_account.global_account_id)?;

        let movement = LodgeAccountMovement::post(document, &mut lodge_account, kind, amount, audit)?;
        let global_balance = global.apply_delta(amount, audit.last_modified_by, audit.last_modified_on)?;

        tx.write_lodge_account_balance(lodge_account.id, BalanceWrite::of(&lodge_account))?;
        tx.write_global_account_balance(global.id, BalanceWrite::of(&global))?;
        tx.insert_lodge_account_movement(movement.clone())?;

        info!(
            document = %document,
            lodge_account = %lodge_account.id,
            kind = kind.as_str(),
            amount = %amount,
            balance = %movement.balance,
            global_balance = %global_balance,
            "lodge account movement posted"
        );
        Ok(movement)
    }

    /// Undo a member account movement's delta and clear its `is_active`.
    ///
    /// Returns `false` without touching anything when the movement was already
    /// reversed.
    pub fn reverse_account_movement(
        &self,
        tx: &mut dyn LedgerTx,
        movement_id: AccountMovementId,
        by: UserId,
        on: DateTime<Utc>,
    ) -> PostingResult<bool> {
        let mut movement = tx
            .account_movement(movement_id)?
            .ok_or_else(|| StoreError::NotFound(format!("account movement {movement_id}")))?;

        let Some(delta) = movement.deactivate(by, on) else {
            warn!(document = %movement.document, movement = %movement_id, "account movement already reversed");
            return Ok(false);
        };

        let mut account = load_account(tx, movement.account_id)?;
        let balance = account.apply_delta(delta, by, on)?;

        tx.write_account_balance(account.id, BalanceWrite::of(&account))?;
        tx.write_account_movement_status(movement.id, StatusWrite::from(&movement))?;

        info!(
            document = %movement.document,
            account = %account.id,
            kind = movement.kind.as_str(),
            amount = %delta,
            balance = %balance,
            "account movement reversed"
        );
        Ok(true)
    }

    /// Undo a lodge account movement's delta, cascade the negation to the
    /// global account and clear the movement's `is_active`.
    pub fn reverse_lodge_account_movement(
        &self,
        tx: &mut dyn LedgerTx,
        movement_id: LodgeAccountMovementId,
        by: UserId,
        on: DateTime<Utc>,
    ) -> PostingResult<bool> {
        let mut movement = tx
            .lodge_account_movement(movement_id)?
            .ok_or_else(|| StoreError::NotFound(format!("lodge account movement {movement_id}")))?;

        let Some(delta) = movement.deactivate(by, on) else {
            warn!(document = %movement.document, movement = %movement_id, "lodge account movement already reversed");
            return Ok(false);
        };

        let mut lodge_account = load_lodge_account(tx, movement.lodge_account_id)?;
        let mut global = load_global_account(tx, lodge_account.global_account_id)?;
        let balance = lodge_account.apply_delta(delta, by, on)?;
        let global_balance = global.apply_delta(delta, by, on)?;

        tx.write_lodge_account_balance(lodge_account.id, BalanceWrite::of(&lodge_account))?;
        tx.write_global_account_balance(global.id, BalanceWrite::of(&global))?;
        tx.write_lodge_account_movement_status(movement.id, StatusWrite::from(&movement))?;

        info!(
            document = %movement.document,
            lodge_account = %lodge_account.id,
            kind = movement.kind.as_str(),
            amount = %delta,
            balance = %balance,
            global_balance = %global_balance,
            "lodge account movement reversed"
        );
        Ok(true)
    }
}

fn load_account(tx: &dyn LedgerTx, id: AccountId) -> Result<Account, StoreError> {
    tx.account(id)?
        .ok_or_else(|| StoreError::NotFound(format!("account {id}")))
}

fn load_lodge_account(tx: &dyn LedgerTx, id: LodgeAccountId) -> Result<LodgeAccount, StoreError> {
    tx.lodge_account(id)?
        .ok_or_else(|| StoreError::NotFound(format!("lodge account {id}")))
}

fn load_global_account(tx: &dyn LedgerTx, id: LodgeGlobalAccountId) -> Result<LodgeGlobalAccount, StoreError> {
    tx.global_account(id)?
        .ok_or_else(|| StoreError::NotFound(format!("lodge global account {id}")))
}
