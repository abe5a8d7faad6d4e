use treasury_accounting::{DocumentRef, LodgeAccountMovementKind};
use treasury_cashbook::LodgeAccountTransfer;
use treasury_core::DomainError;
use treasury_events::{DocumentChange, DocumentHandler};

use super::{document_amount, sync_active_flag, LedgerCtx, Levels};
use crate::error::{PostingError, PostingResult};
use crate::posting::LedgerPostingEngine;
use crate::registry::AccountRegistry;

/// Moves cash between two lodge accounts as a zero-sum pair of movements.
#[derive(Debug, Clone, Copy)]
pub struct TransferTranslator {
    engine: LedgerPostingEngine,
    registry: AccountRegistry,
}

impl TransferTranslator {
    pub fn new(engine: LedgerPostingEngine, registry: AccountRegistry) -> Self {
        Self { engine, registry }
    }
}

impl<'t> DocumentHandler<LodgeAccountTransfer, LedgerCtx<'t>> for TransferTranslator {
    type Error = PostingError;

    fn handle(&self, tx: &mut LedgerCtx<'t>, change: &DocumentChange<LodgeAccountTransfer>) -> PostingResult<()> {
        let transfer = change.document();
        let document = DocumentRef::LodgeAccountTransfer(transfer.id);

        if !change.was_created() {
            return sync_active_flag(&self.engine, tx, change, document, transfer.is_active, Levels::LodgeAccount);
        }

        let amount = document_amount(document, transfer.amount)?;
        if transfer.from == transfer.to {
            return Err(DomainError::validation(format!("{document}: transfer to its own lodge account")).into());
        }

        let from = self.registry.lodge_account(tx, transfer.from, &transfer.audit)?;
        let to = self.registry.lodge_account(tx, transfer.to, &transfer.audit)?;

        self.engine.post_lodge_account_movement(
            tx,
            document,
            from.id,
            LodgeAccountMovementKind::Transfer,
            -amount,
            transfer.audit,
        )?;
        self.engine.post_lodge_account_movement(
            tx,
            document,
            to.id,
            LodgeAccountMovementKind::Transfer,
            amount,
            transfer.audit,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use treasury_core::{AffiliationId, LodgeAccountOwner, LodgeId};
    use treasury_events::fields;

    use crate::store::{InMemoryLedgerStore, LedgerStore, LedgerTx};
    use crate::translators::test_support::{ingress, transfer, translators};
    use crate::translators::SourceDocument;

    #[test]
    fn transfer_to_same_account_is_rejected() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let owner = LodgeAccountOwner::new(LodgeId::new(), AffiliationId::new());

        let err = translators()
            .handle(tx, &DocumentChange::created(SourceDocument::from(transfer(owner, owner, dec!(10)))))
            .unwrap_err();
        assert!(matches!(err, PostingError::Domain(DomainError::Validation(_))));
    }

    #[test]
    fn deactivation_reverses_both_legs() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().unwrap();
        let tx: &mut dyn LedgerTx = &mut tx;
        let translators = translators();
        let lodge = LodgeId::new();
        let from = LodgeAccountOwner::new(lodge, AffiliationId::new());
        let to = LodgeAccountOwner::new(lodge, AffiliationId::new());
        let mut t = transfer(from, to, dec!(25));

        translators
            .handle(tx, &DocumentChange::created(SourceDocument::from(t.clone())))
            .unwrap();
        t.is_active = false;
        translators
            .handle(tx, &DocumentChange::updated(SourceDocument::from(t.clone()), [fields::IS_ACTIVE]))
            .unwrap();

        assert_eq!(tx.lodge_account_by_owner(from).unwrap().unwrap().balance, dec!(0));
        assert_eq!(tx.lodge_account_by_owner(to).unwrap().unwrap().balance, dec!(0));
        let legs = tx.lodge_account_movements_for(DocumentRef::LodgeAccountTransfer(t.id)).unwrap();
        assert_eq!(legs.len(), 2);
        assert!(legs.iter().all(|m| !m.is_active));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a transfer's two legs cancel out, each side moves by the
        /// amount and the global balance of the lodge does not change.
        #[test]
        fn transfer_is_zero_sum(opening in 1i64..10_000_000, cents in 1i64..10_000_000) {
            let store = InMemoryLedgerStore::new();
            let mut tx = store.begin().unwrap();
            let tx: &mut dyn LedgerTx = &mut tx;
            let translators = translators();
            let lodge = LodgeId::new();
            let from = LodgeAccountOwner::new(lodge, AffiliationId::new());
            let to = LodgeAccountOwner::new(lodge, AffiliationId::new());
            let opening = Decimal::new(opening, 2);
            let amount = Decimal::new(cents, 2);

            translators
                .handle(tx, &DocumentChange::created(SourceDocument::from(ingress(from, opening))))
                .unwrap();
            let global_before = tx.global_account_by_lodge(lodge).unwrap().unwrap().balance;

            let t = transfer(from, to, amount);
            translators
                .handle(tx, &DocumentChange::created(SourceDocument::from(t.clone())))
                .unwrap();

            let legs = tx.lodge_account_movements_for(DocumentRef::LodgeAccountTransfer(t.id)).unwrap();
            prop_assert_eq!(legs.len(), 2);
            prop_assert_eq!(legs.iter().map(|m| m.amount).sum::<Decimal>(), Decimal::ZERO);
            prop_assert_eq!(tx.lodge_account_by_owner(from).unwrap().unwrap().balance, opening - amount);
            prop_assert_eq!(tx.lodge_account_by_owner(to).unwrap().unwrap().balance, amount);
            prop_assert_eq!(tx.global_account_by_lodge(lodge).unwrap().unwrap().balance, global_before);
        }
    }
}
