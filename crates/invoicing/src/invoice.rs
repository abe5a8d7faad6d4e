use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use treasury_core::{AffiliationId, Audit, ChargeId, Entity, InvoiceId, PeriodId};
use treasury_events::Document;

/// Dues invoice billed to one affiliation for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub period_id: PeriodId,
    pub affiliation_id: AffiliationId,
    /// Billed amount (positive); the ledger posts it negated.
    pub amount: Decimal,
    pub is_active: bool,
    pub audit: Audit,
}

/// Ad-hoc charge billed to one affiliation outside a billing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub id: ChargeId,
    pub affiliation_id: AffiliationId,
    pub description: String,
    pub amount: Decimal,
    pub is_active: bool,
    pub audit: Audit,
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }
}

impl Document for Invoice {
    fn document_type(&self) -> &'static str {
        "invoicing.invoice"
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }
}

impl Entity for Charge {
    type Id = ChargeId;

    fn id(&self) -> ChargeId {
        self.id
    }
}

impl Document for Charge {
    fn document_type(&self) -> &'static str {
        "invoicing.charge"
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }
}
