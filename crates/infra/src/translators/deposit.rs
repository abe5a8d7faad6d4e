use treasury_accounting::{AccountMovementKind, DocumentRef, LodgeAccountMovementKind};
use treasury_cashbook::Deposit;
use treasury_events::{DocumentChange, DocumentHandler};

use super::{document_amount, sync_active_flag, LedgerCtx, Levels};
use crate::error::{PostingError, PostingResult};
use crate::posting::LedgerPostingEngine;
use crate::registry::AccountRegistry;

/// Credits a member deposit to the payer and to the receiving lodge account.
#[derive(Debug, Clone, Copy)]
pub struct DepositTranslator {
    engine: LedgerPostingEngine,
    registry: AccountRegistry,
}

impl DepositTranslator {
    pub fn new(engine: LedgerPostingEngine, registry: AccountRegistry) -> Self {
        Self { engine, registry }
    }
}

impl<'t> DocumentHandler<Deposit, LedgerCtx<'t>> for DepositTranslator {
    type Error = PostingError;

    fn handle(&self, tx: &mut LedgerCtx<'t>, change: &DocumentChange<Deposit>) -> PostingResult<()> {
        let deposit = change.document();
        let document = DocumentRef::Deposit(deposit.id);

        if !change.was_created() {
            return sync_active_flag(&self.engine, tx, change, document, deposit.is_active, Levels::Both);
        }

        let amount = document_amount(document, deposit.amount)?;

        let account = self.registry.account(tx, deposit.payer_id, &deposit.audit)?;
        self.engine.post_account_movement(
            tx,
            document,
            account.id,
            AccountMovementKind::Deposit,
            amount,
            deposit.audit,
        )?;

        let lodge_account = self.registry.lodge_account(tx, deposit.lodge_account, &deposit.audit)?;
        self.engine.post_lodge_account_movement(
            tx,
            document,
            lodge_account.id,
            LodgeAccountMovementKind::Deposit,
            amount,
            deposit.audit,
        )?;
        Ok(())
    }
}
