//! Treasury ledger entry point.
//!
//! Whatever layer persists source documents calls [`TreasuryLedger`] right
//! after the document write, passing a [`DocumentChange`]. Two forms:
//!
//! - [`TreasuryLedger::on_document_change`] opens its own unit of work, commits
//!   on success and rolls back on any error.
//! - [`TreasuryLedger::on_document_change_in`] runs inside a transaction the
//!   caller already holds (the one its document write went through), leaving
//!   commit or rollback to the caller.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::error;

use treasury_accounting::{Account, AccountMovement, LodgeAccount, LodgeAccountMovement, LodgeGlobalAccount};
use treasury_core::{AccountId, AffiliationId, DomainError, LodgeAccountId, LodgeAccountOwner, LodgeId};
use treasury_events::{Document, DocumentChange, DocumentHandler};
use treasury_invoicing::{AffiliationDirectory, PricingCatalog};

use crate::config::{ConfigError, TreasuryConfig};
use crate::error::{PostingError, PostingResult};
use crate::store::{LedgerStore, LedgerTx, StoreError};
use crate::translators::{SourceDocument, Translators};

pub struct TreasuryLedger<S> {
    store: S,
    translators: Translators,
}

impl<S> TreasuryLedger<S>
where
    S: LedgerStore,
{
    pub fn new(
        store: S,
        pricing: Arc<dyn PricingCatalog>,
        affiliations: Arc<dyn AffiliationDirectory>,
        config: &TreasuryConfig,
    ) -> Self {
        Self {
            store,
            translators: Translators::new(pricing, affiliations, config.amount_scale),
        }
    }

    /// Install logging from `config.observability`, then build the ledger.
    ///
    /// Embedders that already own a tracing subscriber should call [`Self::new`].
    pub fn from_config(
        store: S,
        pricing: Arc<dyn PricingCatalog>,
        affiliations: Arc<dyn AffiliationDirectory>,
        config: &TreasuryConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        treasury_observability::init_with(&config.observability);
        Ok(Self::new(store, pricing, affiliations, config))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Post whatever `change` implies as one unit of work.
    pub fn on_document_change(&self, change: &DocumentChange<SourceDocument>) -> PostingResult<()> {
        let mut tx = self.store.begin()?;
        match self.on_document_change_in(&mut tx, change) {
            Ok(()) => {
                tx.commit()?;
                Ok(())
            }
            Err(err) => {
                error!(
                    document_type = change.document().document_type(),
                    error = %err,
                    "posting failed, unit of work rolled back"
                );
                tx.rollback();
                Err(err)
            }
        }
    }

    /// Post whatever `change` implies inside the caller's transaction.
    pub fn on_document_change_in(
        &self,
        tx: &mut dyn LedgerTx,
        change: &DocumentChange<SourceDocument>,
    ) -> PostingResult<()> {
        self.translators.handle(tx, change)
    }

    fn read<T>(&self, f: impl FnOnce(&dyn LedgerTx) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let tx = self.store.begin()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    pub fn account(&self, affiliation_id: AffiliationId) -> Result<Option<Account>, StoreError> {
        self.read(|tx| tx.account_by_affiliation(affiliation_id))
    }

    pub fn lodge_account(&self, owner: LodgeAccountOwner) -> Result<Option<LodgeAccount>, StoreError> {
        self.read(|tx| tx.lodge_account_by_owner(owner))
    }

    pub fn global_account(&self, lodge_id: LodgeId) -> Result<Option<LodgeGlobalAccount>, StoreError> {
        self.read(|tx| tx.global_account_by_lodge(lodge_id))
    }

    pub fn account_movements(&self, account_id: AccountId) -> Result<Vec<AccountMovement>, StoreError> {
        self.read(|tx| tx.account_movements(account_id))
    }

    pub fn lodge_account_movements(
        &self,
        lodge_account_id: LodgeAccountId,
    ) -> Result<Vec<LodgeAccountMovement>, StoreError> {
        self.read(|tx| tx.lodge_account_movements(lodge_account_id))
    }

    /// Re-derive every balance from active movements and compare.
    ///
    /// Reports the first mismatch. Diagnostic only: balances are never
    /// repaired from here.
    pub fn verify_balances(&self) -> PostingResult<()> {
        let tx = self.store.begin()?;

        for account in tx.accounts()? {
            let expected = active_sum(tx.account_movements(account.id)?.iter().map(|m| (m.is_active, m.amount)));
            check("account", &account.id, account.balance, expected)?;
        }

        let lodge_accounts = tx.lodge_accounts()?;
        for lodge_account in &lodge_accounts {
            let expected = active_sum(
                tx.lodge_account_movements(lodge_account.id)?
                    .iter()
                    .map(|m| (m.is_active, m.amount)),
            );
            check("lodge account", &lodge_account.id, lodge_account.balance, expected)?;
        }

        for global in tx.global_accounts()? {
            let mut expected = Decimal::ZERO;
            for lodge_account in lodge_accounts.iter().filter(|l| l.global_account_id == global.id) {
                expected += active_sum(
                    tx.lodge_account_movements(lodge_account.id)?
                        .iter()
                        .map(|m| (m.is_active, m.amount)),
                );
            }
            check("lodge global account", &global.id, global.balance, expected)?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn active_sum(movements: impl Iterator<Item = (bool, Decimal)>) -> Decimal {
    movements.filter(|(active, _)| *active).map(|(_, amount)| amount).sum()
}

fn check(what: &str, id: &dyn core::fmt::Display, balance: Decimal, expected: Decimal) -> Result<(), PostingError> {
    if balance != expected {
        return Err(DomainError::invariant(format!(
            "{what} {id}: balance {balance} != sum of active movements {expected}"
        ))
        .into());
    }
    Ok(())
}
