//! Source document translators.
//!
//! One translator per document family. Each reacts to a [`DocumentChange`],
//! resolves the accounts involved through the [`AccountRegistry`] and hands
//! signed amounts to the [`LedgerPostingEngine`]. Sign conventions:
//!
//! | Document | Account | Lodge account |
//! |---|---|---|
//! | Invoice, Charge | `-amount` | |
//! | Deposit | `+amount` | `+amount` |
//! | HigherBodyDeposit (on ACCREDITED) | `+amount` | |
//! | LodgeAccountIngress | | `+amount` |
//! | LodgeAccountEgress | | `-amount` |
//! | LodgeAccountTransfer | | `-amount` from, `+amount` to |
//!
//! Clearing `is_active` on a document reverses every movement it posted.

pub mod billing;
pub mod cashbook;
pub mod deposit;
pub mod higher_body;
pub mod invoice;
pub mod transfer;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use treasury_accounting::DocumentRef;
use treasury_cashbook::{
    Deposit, HigherBodyDeposit, LodgeAccountEgress, LodgeAccountIngress, LodgeAccountTransfer,
};
use treasury_core::{Audit, DomainError};
use treasury_events::{fields, Document, DocumentChange, DocumentHandler};
use treasury_invoicing::{AffiliationDirectory, Charge, Invoice, Period, PricingCatalog};

use crate::error::{PostingError, PostingResult};
use crate::posting::LedgerPostingEngine;
use crate::registry::AccountRegistry;
use crate::store::LedgerTx;

pub use billing::BillingTranslator;
pub use cashbook::CashbookTranslator;
pub use deposit::DepositTranslator;
pub use higher_body::HigherBodyDepositTranslator;
pub use invoice::InvoiceTranslator;
pub use transfer::TransferTranslator;

/// Handler context of every translator: the open ledger transaction.
pub type LedgerCtx<'t> = dyn LedgerTx + 't;

/// Every source document kind the ledger subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "document", rename_all = "snake_case")]
pub enum SourceDocument {
    Period(Period),
    Invoice(Invoice),
    Charge(Charge),
    Deposit(Deposit),
    HigherBodyDeposit(HigherBodyDeposit),
    LodgeAccountIngress(LodgeAccountIngress),
    LodgeAccountEgress(LodgeAccountEgress),
    LodgeAccountTransfer(LodgeAccountTransfer),
}

impl SourceDocument {
    /// Reference movements carry back to this document. Periods post nothing
    /// themselves and have none.
    pub fn reference(&self) -> Option<DocumentRef> {
        match self {
            SourceDocument::Period(_) => None,
            SourceDocument::Invoice(d) => Some(DocumentRef::Invoice(d.id)),
            SourceDocument::Charge(d) => Some(DocumentRef::Charge(d.id)),
            SourceDocument::Deposit(d) => Some(DocumentRef::Deposit(d.id)),
            SourceDocument::HigherBodyDeposit(d) => Some(DocumentRef::HigherBodyDeposit(d.id)),
            SourceDocument::LodgeAccountIngress(d) => Some(DocumentRef::LodgeAccountIngress(d.id)),
            SourceDocument::LodgeAccountEgress(d) => Some(DocumentRef::LodgeAccountEgress(d.id)),
            SourceDocument::LodgeAccountTransfer(d) => Some(DocumentRef::LodgeAccountTransfer(d.id)),
        }
    }
}

impl Document for SourceDocument {
    fn document_type(&self) -> &'static str {
        match self {
            SourceDocument::Period(d) => d.document_type(),
            SourceDocument::Invoice(d) => d.document_type(),
            SourceDocument::Charge(d) => d.document_type(),
            SourceDocument::Deposit(d) => d.document_type(),
            SourceDocument::HigherBodyDeposit(d) => d.document_type(),
            SourceDocument::LodgeAccountIngress(d) => d.document_type(),
            SourceDocument::LodgeAccountEgress(d) => d.document_type(),
            SourceDocument::LodgeAccountTransfer(d) => d.document_type(),
        }
    }

    fn audit(&self) -> &Audit {
        match self {
            SourceDocument::Period(d) => &d.audit,
            SourceDocument::Invoice(d) => &d.audit,
            SourceDocument::Charge(d) => &d.audit,
            SourceDocument::Deposit(d) => &d.audit,
            SourceDocument::HigherBodyDeposit(d) => &d.audit,
            SourceDocument::LodgeAccountIngress(d) => &d.audit,
            SourceDocument::LodgeAccountEgress(d) => &d.audit,
            SourceDocument::LodgeAccountTransfer(d) => &d.audit,
        }
    }
}

macro_rules! impl_from_document {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for SourceDocument {
                fn from(document: $variant) -> Self {
                    SourceDocument::$variant(document)
                }
            }
        )*
    };
}

impl_from_document!(
    Period,
    Invoice,
    Charge,
    Deposit,
    HigherBodyDeposit,
    LodgeAccountIngress,
    LodgeAccountEgress,
    LodgeAccountTransfer,
);

/// Routes a [`SourceDocument`] change to the translator of its family.
#[derive(Clone)]
pub struct Translators {
    billing: BillingTranslator,
    invoices: InvoiceTranslator,
    deposits: DepositTranslator,
    higher_body: HigherBodyDepositTranslator,
    cashbook: CashbookTranslator,
    transfers: TransferTranslator,
}

impl Translators {
    pub fn new(
        pricing: Arc<dyn PricingCatalog>,
        affiliations: Arc<dyn AffiliationDirectory>,
        amount_scale: u32,
    ) -> Self {
        let engine = LedgerPostingEngine::new();
        let registry = AccountRegistry::new();
        let invoices = InvoiceTranslator::new(engine, registry);
        Self {
            billing: BillingTranslator::new(pricing, affiliations, amount_scale, invoices),
            invoices,
            deposits: DepositTranslator::new(engine, registry),
            higher_body: HigherBodyDepositTranslator::new(engine, registry),
            cashbook: CashbookTranslator::new(engine, registry),
            transfers: TransferTranslator::new(engine, registry),
        }
    }
}

impl<'t> DocumentHandler<SourceDocument, LedgerCtx<'t>> for Translators {
    type Error = PostingError;

    fn handle(&self, tx: &mut LedgerCtx<'t>, change: &DocumentChange<SourceDocument>) -> PostingResult<()> {
        match change.document() {
            SourceDocument::Period(d) => self.billing.handle(tx, &change.with_document(d.clone())),
            SourceDocument::Invoice(d) => self.invoices.handle(tx, &change.with_document(d.clone())),
            SourceDocument::Charge(d) => self.invoices.handle(tx, &change.with_document(d.clone())),
            SourceDocument::Deposit(d) => self.deposits.handle(tx, &change.with_document(d.clone())),
            SourceDocument::HigherBodyDeposit(d) => self.higher_body.handle(tx, &change.with_document(d.clone())),
            SourceDocument::LodgeAccountIngress(d) => self.cashbook.handle(tx, &change.with_document(d.clone())),
            SourceDocument::LodgeAccountEgress(d) => self.cashbook.handle(tx, &change.with_document(d.clone())),
            SourceDocument::LodgeAccountTransfer(d) => self.transfers.handle(tx, &change.with_document(d.clone())),
        }
    }
}

/// Document amounts are unsigned in meaning; the translator picks the sign.
pub(crate) fn document_amount(document: DocumentRef, amount: Decimal) -> PostingResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation(format!("{document}: amount must be positive, got {amount}")).into());
    }
    Ok(amount)
}

/// Account levels a document posts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Levels {
    Account,
    LodgeAccount,
    Both,
}

impl Levels {
    fn account(self) -> bool {
        matches!(self, Levels::Account | Levels::Both)
    }

    fn lodge_account(self) -> bool {
        matches!(self, Levels::LodgeAccount | Levels::Both)
    }
}

/// Mirror an `is_active` write on `document` onto the movements it posted.
///
/// - field not written: nothing to do
/// - cleared: reverse every linked movement (already reversed ones are skipped)
/// - set while a linked movement is reversed: `ReactivationUnsupported`
pub(crate) fn sync_active_flag<D: Document>(
    engine: &LedgerPostingEngine,
    tx: &mut LedgerCtx<'_>,
    change: &DocumentChange<D>,
    document: DocumentRef,
    is_active: bool,
    levels: Levels,
) -> PostingResult<()> {
    if !change.field_changed(fields::IS_ACTIVE) {
        return Ok(());
    }

    let account_movements = if levels.account() {
        tx.account_movements_for(document)?
    } else {
        Vec::new()
    };
    let lodge_movements = if levels.lodge_account() {
        tx.lodge_account_movements_for(document)?
    } else {
        Vec::new()
    };

    if (levels.account() && account_movements.is_empty()) || (levels.lodge_account() && lodge_movements.is_empty()) {
        return Err(PostingError::MovementNotFound(document));
    }

    if is_active {
        let reversed = account_movements.iter().any(|m| !m.is_active) || lodge_movements.iter().any(|m| !m.is_active);
        if reversed {
            return Err(PostingError::ReactivationUnsupported(document));
        }
        debug!(document = %document, "is_active rewritten without change");
        return Ok(());
    }

    let audit = change.document().audit();
    for movement in account_movements {
        engine.reverse_account_movement(tx, movement.id, audit.last_modified_by, audit.last_modified_on)?;
    }
    for movement in lodge_movements {
        engine.reverse_lodge_account_movement(tx, movement.id, audit.last_modified_by, audit.last_modified_on)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    use treasury_cashbook::{
        Deposit, HigherBodyDeposit, HigherBodyDepositStatus, LodgeAccountEgress, LodgeAccountIngress,
        LodgeAccountTransfer,
    };
    use treasury_core::{
        AffiliationId, Audit, ChargeId, DepositId, HigherBodyDepositId, LodgeAccountEgressId,
        LodgeAccountIngressId, LodgeAccountOwner, LodgeAccountTransferId, UserId,
    };
    use treasury_invoicing::{Charge, InMemoryAffiliationDirectory, InMemoryPriceCatalog};

    use super::Translators;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    pub fn audit() -> Audit {
        Audit::created(UserId::new(), now())
    }

    pub fn translators() -> Translators {
        Translators::new(
            Arc::new(InMemoryPriceCatalog::new()),
            Arc::new(InMemoryAffiliationDirectory::new()),
            2,
        )
    }

    pub fn charge(affiliation_id: AffiliationId, amount: Decimal) -> Charge {
        Charge {
            id: ChargeId::new(),
            affiliation_id,
            description: "banquet".to_string(),
            amount,
            is_active: true,
            audit: audit(),
        }
    }

    pub fn deposit(payer_id: AffiliationId, lodge_account: LodgeAccountOwner, amount: Decimal) -> Deposit {
        Deposit {
            id: DepositId::new(),
            payer_id,
            lodge_account,
            amount,
            is_active: true,
            audit: audit(),
        }
    }

    pub fn higher_body_deposit(payer_id: AffiliationId, amount: Decimal) -> HigherBodyDeposit {
        HigherBodyDeposit {
            id: HigherBodyDepositId::new(),
            payer_id,
            amount,
            status: HigherBodyDepositStatus::Pending,
            audit: audit(),
        }
    }

    pub fn ingress(lodge_account: LodgeAccountOwner, amount: Decimal) -> LodgeAccountIngress {
        LodgeAccountIngress {
            id: LodgeAccountIngressId::new(),
            lodge_account,
            description: "raffle".to_string(),
            amount,
            is_active: true,
            audit: audit(),
        }
    }

    pub fn egress(lodge_account: LodgeAccountOwner, amount: Decimal) -> LodgeAccountEgress {
        LodgeAccountEgress {
            id: LodgeAccountEgressId::new(),
            lodge_account,
            description: "rent".to_string(),
            amount,
            is_active: true,
            audit: audit(),
        }
    }

    pub fn transfer(from: LodgeAccountOwner, to: LodgeAccountOwner, amount: Decimal) -> LodgeAccountTransfer {
        LodgeAccountTransfer {
            id: LodgeAccountTransferId::new(),
            from,
            to,
            amount,
            is_active: true,
            audit: audit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use treasury_core::{AffiliationId, ChargeId, DepositId};

    use super::test_support::{audit, charge};

    #[test]
    fn reference_names_the_document() {
        let c = charge(AffiliationId::new(), dec!(10));
        let id = c.id;
        let doc = SourceDocument::from(c);

        assert_eq!(doc.reference(), Some(DocumentRef::Charge(id)));
        assert_eq!(doc.document_type(), "invoicing.charge");
    }

    #[test]
    fn periods_have_no_reference() {
        let period = Period {
            id: treasury_core::PeriodId::new(),
            lodge_id: treasury_core::LodgeId::new(),
            description: "June".to_string(),
            price_multiplier: dec!(1),
            audit: audit(),
        };
        let doc = SourceDocument::from(period);
        assert_eq!(doc.reference(), None);
        assert_eq!(doc.document_type(), "invoicing.period");
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let document = DocumentRef::Deposit(DepositId::new());
        assert!(matches!(
            document_amount(document, dec!(0)),
            Err(PostingError::Domain(DomainError::Validation(_)))
        ));
        assert!(document_amount(DocumentRef::Charge(ChargeId::new()), dec!(-3)).is_err());
        assert_eq!(document_amount(document, dec!(0.01)).unwrap(), dec!(0.01));
    }

    #[test]
    fn source_document_serializes_with_type_tag() {
        let doc = SourceDocument::from(charge(AffiliationId::new(), dec!(10)));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "charge");
        assert_eq!(json["document"]["amount"], "10");
    }
}
