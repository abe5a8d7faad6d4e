use rust_decimal::Decimal;

use treasury_accounting::{AccountMovementKind, DocumentRef};
use treasury_core::{AffiliationId, Audit};
use treasury_events::{DocumentChange, DocumentHandler};
use treasury_invoicing::{Charge, Invoice};

use super::{document_amount, sync_active_flag, LedgerCtx, Levels};
use crate::error::{PostingError, PostingResult};
use crate::posting::LedgerPostingEngine;
use crate::registry::AccountRegistry;

/// Bills invoices and charges to the member's account.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceTranslator {
    engine: LedgerPostingEngine,
    registry: AccountRegistry,
}

impl InvoiceTranslator {
    pub fn new(engine: LedgerPostingEngine, registry: AccountRegistry) -> Self {
        Self { engine, registry }
    }

    fn bill(
        &self,
        tx: &mut LedgerCtx<'_>,
        document: DocumentRef,
        kind: AccountMovementKind,
        affiliation_id: AffiliationId,
        amount: Decimal,
        audit: &Audit,
    ) -> PostingResult<()> {
        let amount = document_amount(document, amount)?;
        let account = self.registry.account(tx, affiliation_id, audit)?;
        self.engine
            .post_account_movement(tx, document, account.id, kind, -amount, *audit)?;
        Ok(())
    }
}

impl<'t> DocumentHandler<Invoice, LedgerCtx<'t>> for InvoiceTranslator {
    type Error = PostingError;

    fn handle(&self, tx: &mut LedgerCtx<'t>, change: &DocumentChange<Invoice>) -> PostingResult<()> {
        let invoice = change.document();
        let document = DocumentRef::Invoice(invoice.id);

        if change.was_created() {
            return self.bill(
                tx,
                document,
                AccountMovementKind::Invoice,
                invoice.affiliation_id,
                invoice.amount,
                &invoice.audit,
            );
        }
        sync_active_flag(&self.engine, tx, change, document, invoice.is_active, Levels::Account)
    }
}

impl<'t> DocumentHandler<Charge, LedgerCtx<'t>> for InvoiceTranslator {
    type Error = PostingError;

    fn handle(&self, tx: &mut LedgerCtx<'t>, change: &DocumentChange<Charge>) -> PostingResult<()> {
        let charge = change.document();
        let document = DocumentRef::Charge(charge.id);

        if change.was_created() {
            return self.bill(
                tx,
                document,
                AccountMovementKind::Charge,
                charge.affiliation_id,
                charge.amount,
                &charge.audit,
            );
        }
        sync_active_flag(&self.engine, tx, change, document, charge.is_active, Levels::Account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use treasury_core::UserId;
    use treasury_events::fields;

    use crate::translators::test_support::{audit, charge, now, translators};
    use crate::store::{InMemoryLedgerStore, LedgerStore, LedgerTx};
    use crate::translators::SourceDocument;

    #[test]
    fn charge_debits_the_member_account() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let member = AffiliationId::new();
        let c = charge(member, dec!(40));

        translators()
            .handle(tx, &DocumentChange::created(SourceDocument::from(c.clone())))
            .unwrap();

        let account = tx.account_by_affiliation(member).unwrap().unwrap();
        assert_eq!(account.balance, dec!(-40));
        let movements = tx.account_movements_for(DocumentRef::Charge(c.id)).unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, AccountMovementKind::Charge);
        assert_eq!(movements[0].amount, dec!(-40));
        assert_eq!(movements[0].audit.created_by, c.audit.created_by);
    }

    #[test]
    fn deactivating_a_charge_restores_the_balance_once() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let translators = translators();
        let member = AffiliationId::new();
        let mut c = charge(member, dec!(40));

        translators
            .handle(tx, &DocumentChange::created(SourceDocument::from(c.clone())))
            .unwrap();

        let editor = UserId::new();
        c.is_active = false;
        c.audit = c.audit.touched(editor, now());
        let deactivation = DocumentChange::updated(SourceDocument::from(c.clone()), [fields::IS_ACTIVE]);
        translators.handle(tx, &deactivation).unwrap();
        translators.handle(tx, &deactivation).unwrap();

        assert_eq!(tx.account_by_affiliation(member).unwrap().unwrap().balance, dec!(0));
        let movement = &tx.account_movements_for(DocumentRef::Charge(c.id)).unwrap()[0];
        assert!(!movement.is_active);
        assert_eq!(movement.audit.last_modified_by, editor);
    }

    #[test]
    fn unrelated_updates_post_nothing() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let translators = translators();
        let member = AffiliationId::new();
        let mut c = charge(member, dec!(40));

        translators
            .handle(tx, &DocumentChange::created(SourceDocument::from(c.clone())))
            .unwrap();
        c.description = "banquet (rescheduled)".to_string();
        translators
            .handle(tx, &DocumentChange::updated(SourceDocument::from(c), ["description"]))
            .unwrap();

        assert_eq!(tx.account_by_affiliation(member).unwrap().unwrap().balance, dec!(-40));
    }

    #[test]
    fn reactivation_is_rejected() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let translators = translators();
        let mut c = charge(AffiliationId::new(), dec!(5));

        translators
            .handle(tx, &DocumentChange::created(SourceDocument::from(c.clone())))
            .unwrap();
        c.is_active = false;
        translators
            .handle(tx, &DocumentChange::updated(SourceDocument::from(c.clone()), [fields::IS_ACTIVE]))
            .unwrap();
        c.is_active = true;
        let err = translators
            .handle(tx, &DocumentChange::updated(SourceDocument::from(c.clone()), [fields::IS_ACTIVE]))
            .unwrap_err();

        assert!(matches!(err, PostingError::ReactivationUnsupported(DocumentRef::Charge(id)) if id == c.id));
    }

    #[test]
    fn deactivating_an_unposted_invoice_fails() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let invoice = Invoice {
            id: treasury_core::InvoiceId::new(),
            period_id: treasury_core::PeriodId::new(),
            affiliation_id: AffiliationId::new(),
            amount: dec!(100),
            is_active: false,
            audit: audit(),
        };

        let err = translators()
            .handle(tx, &DocumentChange::updated(SourceDocument::from(invoice), [fields::IS_ACTIVE]))
            .unwrap_err();
        assert!(matches!(err, PostingError::MovementNotFound(_)));
    }
}
