//! Get-or-create resolution of ledger accounts by owner.

use tracing::debug;

use treasury_accounting::{Account, LodgeAccount, LodgeGlobalAccount};
use treasury_core::{AffiliationId, Audit, LodgeAccountOwner, LodgeId};

use crate::store::{LedgerTx, StoreError};

/// Resolves the single account bound to an owner, opening it on first use.
///
/// Uniqueness per owner is enforced by the store (`insert_*` fails with
/// `DuplicateKey`), and the lookup and insert run inside the caller's
/// transaction, which holds the ledger exclusively.
///
/// Accounts opened here are stamped with the triggering document's last
/// modifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccountRegistry;

impl AccountRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn account(
        &self,
        tx: &mut dyn LedgerTx,
        affiliation_id: AffiliationId,
        audit: &Audit,
    ) -> Result<Account, StoreError> {
        if let Some(account) = tx.account_by_affiliation(affiliation_id)? {
            return Ok(account);
        }

        let account = Account::open(affiliation_id, opened_by(audit));
        tx.insert_account(account.clone())?;
        debug!(account = %account.id, affiliation = %affiliation_id, "account opened");
        Ok(account)
    }

    pub fn global_account(
        &self,
        tx: &mut dyn LedgerTx,
        lodge_id: LodgeId,
        audit: &Audit,
    ) -> Result<LodgeGlobalAccount, StoreError> {
        if let Some(global) = tx.global_account_by_lodge(lodge_id)? {
            return Ok(global);
        }

        let global = LodgeGlobalAccount::open(lodge_id, opened_by(audit));
        tx.insert_global_account(global.clone())?;
        debug!(global_account = %global.id, lodge = %lodge_id, "lodge global account opened");
        Ok(global)
    }

    /// Lodge account of `owner`; the lodge's global account is resolved first.
    pub fn lodge_account(
        &self,
        tx: &mut dyn LedgerTx,
        owner: LodgeAccountOwner,
        audit: &Audit,
    ) -> Result<LodgeAccount, StoreError> {
        if let Some(lodge_account) = tx.lodge_account_by_owner(owner)? {
            return Ok(lodge_account);
        }

        let global = self.global_account(tx, owner.lodge_id, audit)?;
        let lodge_account = LodgeAccount::open(owner, global.id, opened_by(audit));
        tx.insert_lodge_account(lodge_account.clone())?;
        debug!(lodge_account = %lodge_account.id, owner = %owner, "lodge account opened");
        Ok(lodge_account)
    }
}

fn opened_by(audit: &Audit) -> Audit {
    Audit::created(audit.last_modified_by, audit.last_modified_on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use treasury_core::UserId;

    use crate::store::{InMemoryLedgerStore, LedgerStore};

    #[test]
    fn account_is_created_once_per_affiliation() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let registry = AccountRegistry::new();
        let affiliation = AffiliationId::new();
        let audit = Audit::created(UserId::new(), Utc::now());

        let first = registry.account(&mut tx, affiliation, &audit).unwrap();
        let second = registry.account(&mut tx, affiliation, &audit).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(tx.accounts().unwrap().len(), 1);
        assert_eq!(first.audit.created_by, audit.last_modified_by);
    }

    #[test]
    fn lodge_accounts_of_one_lodge_share_a_global_account() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let registry = AccountRegistry::new();
        let lodge = LodgeId::new();
        let audit = Audit::created(UserId::new(), Utc::now());

        let a = registry
            .lodge_account(&mut tx, LodgeAccountOwner::new(lodge, AffiliationId::new()), &audit)
            .unwrap();
        let b = registry
            .lodge_account(&mut tx, LodgeAccountOwner::new(lodge, AffiliationId::new()), &audit)
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.global_account_id, b.global_account_id);
        assert_eq!(tx.global_accounts().unwrap().len(), 1);
    }

    #[test]
    fn other_lodge_gets_its_own_global_account() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let registry = AccountRegistry::new();
        let audit = Audit::created(UserId::new(), Utc::now());

        let a = registry
            .lodge_account(&mut tx, LodgeAccountOwner::new(LodgeId::new(), AffiliationId::new()), &audit)
            .unwrap();
        let b = registry
            .lodge_account(&mut tx, LodgeAccountOwner::new(LodgeId::new(), AffiliationId::new()), &audit)
            .unwrap();

        assert_ne!(a.global_account_id, b.global_account_id);
    }
}
