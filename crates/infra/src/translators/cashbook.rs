use rust_decimal::Decimal;

use treasury_accounting::{DocumentRef, LodgeAccountMovementKind};
use treasury_cashbook::{LodgeAccountEgress, LodgeAccountIngress};
use treasury_core::{Audit, LodgeAccountOwner};
use treasury_events::{DocumentChange, DocumentHandler};

use super::{document_amount, sync_active_flag, LedgerCtx, Levels};
use crate::error::{PostingError, PostingResult};
use crate::posting::LedgerPostingEngine;
use crate::registry::AccountRegistry;

/// Posts lodge cash ingress (`+amount`) and egress (`-amount`).
#[derive(Debug, Clone, Copy)]
pub struct CashbookTranslator {
    engine: LedgerPostingEngine,
    registry: AccountRegistry,
}

impl CashbookTranslator {
    pub fn new(engine: LedgerPostingEngine, registry: AccountRegistry) -> Self {
        Self { engine, registry }
    }

    fn post(
        &self,
        tx: &mut LedgerCtx<'_>,
        document: DocumentRef,
        kind: LodgeAccountMovementKind,
        owner: LodgeAccountOwner,
        amount: Decimal,
        audit: &Audit,
    ) -> PostingResult<()> {
        let lodge_account = self.registry.lodge_account(tx, owner, audit)?;
        self.engine
            .post_lodge_account_movement(tx, document, lodge_account.id, kind, amount, *audit)?;
        Ok(())
    }
}

impl<'t> DocumentHandler<LodgeAccountIngress, LedgerCtx<'t>> for CashbookTranslator {
    type Error = PostingError;

    fn handle(&self, tx: &mut LedgerCtx<'t>, change: &DocumentChange<LodgeAccountIngress>) -> PostingResult<()> {
        let ingress = change.document();
        let document = DocumentRef::LodgeAccountIngress(ingress.id);

        if !change.was_created() {
            return sync_active_flag(&self.engine, tx, change, document, ingress.is_active, Levels::LodgeAccount);
        }
        let amount = document_amount(document, ingress.amount)?;
        self.post(
            tx,
            document,
            LodgeAccountMovementKind::Ingress,
            ingress.lodge_account,
            amount,
            &ingress.audit,
        )
    }
}

impl<'t> DocumentHandler<LodgeAccountEgress, LedgerCtx<'t>> for CashbookTranslator {
    type Error = PostingError;

    fn handle(&self, tx: &mut LedgerCtx<'t>, change: &DocumentChange<LodgeAccountEgress>) -> PostingResult<()> {
        let egress = change.document();
        let document = DocumentRef::LodgeAccountEgress(egress.id);

        if !change.was_created() {
            return sync_active_flag(&self.engine, tx, change, document, egress.is_active, Levels::LodgeAccount);
        }
        let amount = document_amount(document, egress.amount)?;
        self.post(
            tx,
            document,
            LodgeAccountMovementKind::Egress,
            egress.lodge_account,
            -amount,
            &egress.audit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use treasury_core::{AffiliationId, LodgeId};
    use treasury_events::fields;

    use crate::store::{InMemoryLedgerStore, LedgerStore, LedgerTx};
    use crate::translators::test_support::{egress, ingress, translators};
    use crate::translators::SourceDocument;

    #[test]
    fn ingress_and_egress_move_lodge_and_global_balances() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let translators = translators();
        let owner = LodgeAccountOwner::new(LodgeId::new(), AffiliationId::new());

        translators
            .handle(tx, &DocumentChange::created(SourceDocument::from(ingress(owner, dec!(300)))))
            .unwrap();
        translators
            .handle(tx, &DocumentChange::created(SourceDocument::from(egress(owner, dec!(120.75)))))
            .unwrap();

        let lodge_account = tx.lodge_account_by_owner(owner).unwrap().unwrap();
        assert_eq!(lodge_account.balance, dec!(179.25));
        assert_eq!(
            tx.global_account(lodge_account.global_account_id).unwrap().unwrap().balance,
            dec!(179.25)
        );
        let kinds: Vec<_> = tx
            .lodge_account_movements(lodge_account.id)
            .unwrap()
            .into_iter()
            .map(|m| (m.kind, m.amount))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (LodgeAccountMovementKind::Ingress, dec!(300)),
                (LodgeAccountMovementKind::Egress, dec!(-120.75)),
            ]
        );
    }

    #[test]
    fn deactivating_an_egress_gives_the_cash_back() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let translators = translators();
        let owner = LodgeAccountOwner::new(LodgeId::new(), AffiliationId::new());
        let mut out = egress(owner, dec!(45));

        translators
            .handle(tx, &DocumentChange::created(SourceDocument::from(out.clone())))
            .unwrap();
        out.is_active = false;
        translators
            .handle(tx, &DocumentChange::updated(SourceDocument::from(out), [fields::IS_ACTIVE]))
            .unwrap();

        let lodge_account = tx.lodge_account_by_owner(owner).unwrap().unwrap();
        assert_eq!(lodge_account.balance, dec!(0));
        assert_eq!(
            tx.global_account(lodge_account.global_account_id).unwrap().unwrap().balance,
            dec!(0)
        );
    }
}
