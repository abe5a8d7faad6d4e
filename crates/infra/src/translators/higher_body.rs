use tracing::debug;

use treasury_accounting::{AccountMovementKind, DocumentRef};
use treasury_cashbook::HigherBodyDeposit;
use treasury_events::{fields, DocumentChange, DocumentHandler};

use super::{document_amount, LedgerCtx};
use crate::error::{PostingError, PostingResult};
use crate::posting::LedgerPostingEngine;
use crate::registry::AccountRegistry;

/// Credits a higher body deposit to the payer once it is accredited.
///
/// Status transitions:
///
/// - creation, whatever the status: nothing
/// - to ACCREDITED: post `+amount` (`AlreadyPosted` if it was posted before)
/// - away from ACCREDITED after posting: `StatusRegressionUnsupported`
/// - anything else: nothing
#[derive(Debug, Clone, Copy)]
pub struct HigherBodyDepositTranslator {
    engine: LedgerPostingEngine,
    registry: AccountRegistry,
}

impl HigherBodyDepositTranslator {
    pub fn new(engine: LedgerPostingEngine, registry: AccountRegistry) -> Self {
        Self { engine, registry }
    }
}

impl<'t> DocumentHandler<HigherBodyDeposit, LedgerCtx<'t>> for HigherBodyDepositTranslator {
    type Error = PostingError;

    fn handle(&self, tx: &mut LedgerCtx<'t>, change: &DocumentChange<HigherBodyDeposit>) -> PostingResult<()> {
        let deposit = change.document();
        let document = DocumentRef::HigherBodyDeposit(deposit.id);

        if !change.field_changed(fields::STATUS) {
            debug!(document = %document, status = ?deposit.status, "higher body deposit not posted");
            return Ok(());
        }

        let posted = !tx.account_movements_for(document)?.is_empty();
        match (deposit.is_accredited(), posted) {
            (true, false) => {
                let amount = document_amount(document, deposit.amount)?;
                let account = self.registry.account(tx, deposit.payer_id, &deposit.audit)?;
                self.engine.post_account_movement(
                    tx,
                    document,
                    account.id,
                    AccountMovementKind::HigherBodyDeposit,
                    amount,
                    deposit.audit,
                )?;
                Ok(())
            }
            (true, true) => Err(PostingError::AlreadyPosted(document)),
            (false, true) => Err(PostingError::StatusRegressionUnsupported(document)),
            (false, false) => {
                debug!(document = %document, status = ?deposit.status, "status change posts nothing");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use treasury_cashbook::HigherBodyDepositStatus;
    use treasury_core::AffiliationId;

    use crate::store::{InMemoryLedgerStore, LedgerStore, LedgerTx};
    use crate::translators::test_support::{higher_body_deposit, translators};
    use crate::translators::SourceDocument;

    fn status_change(deposit: &HigherBodyDeposit) -> DocumentChange<SourceDocument> {
        DocumentChange::updated(SourceDocument::from(deposit.clone()), [fields::STATUS])
    }

    #[test]
    fn posts_only_when_accredited() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let translators = translators();
        let payer = AffiliationId::new();
        let mut d = higher_body_deposit(payer, dec!(500));
        let document = DocumentRef::HigherBodyDeposit(d.id);

        translators
            .handle(tx, &DocumentChange::created(SourceDocument::from(d.clone())))
            .unwrap();
        assert!(tx.account_movements_for(document).unwrap().is_empty());
        assert!(tx.account_by_affiliation(payer).unwrap().is_none());

        d.status = HigherBodyDepositStatus::Accredited;
        translators.handle(tx, &status_change(&d)).unwrap();

        let movements = tx.account_movements_for(document).unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, AccountMovementKind::HigherBodyDeposit);
        assert_eq!(tx.account_by_affiliation(payer).unwrap().unwrap().balance, dec!(500));
    }

    #[test]
    fn creation_as_accredited_posts_nothing() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let mut d = higher_body_deposit(AffiliationId::new(), dec!(500));
        d.status = HigherBodyDepositStatus::Accredited;

        translators()
            .handle(tx, &DocumentChange::created(SourceDocument::from(d.clone())))
            .unwrap();
        assert!(tx.account_movements_for(DocumentRef::HigherBodyDeposit(d.id)).unwrap().is_empty());
    }

    #[test]
    fn rejection_posts_nothing() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let mut d = higher_body_deposit(AffiliationId::new(), dec!(500));
        d.status = HigherBodyDepositStatus::Rejected;

        translators().handle(tx, &status_change(&d)).unwrap();
        assert!(tx.accounts().unwrap().is_empty());
    }

    #[test]
    fn second_accreditation_and_regression_are_rejected() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let translators = translators();
        let mut d = higher_body_deposit(AffiliationId::new(), dec!(500));

        d.status = HigherBodyDepositStatus::Accredited;
        translators.handle(tx, &status_change(&d)).unwrap();

        let err = translators.handle(tx, &status_change(&d)).unwrap_err();
        assert!(matches!(err, PostingError::AlreadyPosted(_)));

        d.status = HigherBodyDepositStatus::Pending;
        let err = translators.handle(tx, &status_change(&d)).unwrap_err();
        assert!(matches!(err, PostingError::StatusRegressionUnsupported(_)));
    }
}
