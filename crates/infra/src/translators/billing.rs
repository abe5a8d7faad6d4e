use std::sync::Arc;

use tracing::info;

use treasury_events::{DocumentChange, DocumentHandler};
use treasury_invoicing::{AffiliationDirectory, Period, PricingCatalog};

use super::{InvoiceTranslator, LedgerCtx};
use crate::error::{PostingError, PostingResult};

/// Dues billing run: one invoice per active affiliation of the period's lodge.
///
/// Prices are looked up at the period's billing date. A missing or ambiguous
/// price fails the whole run; invoices already issued by it are rolled back
/// with the transaction.
#[derive(Clone)]
pub struct BillingTranslator {
    pricing: Arc<dyn PricingCatalog>,
    affiliations: Arc<dyn AffiliationDirectory>,
    amount_scale: u32,
    invoices: InvoiceTranslator,
}

impl BillingTranslator {
    pub fn new(
        pricing: Arc<dyn PricingCatalog>,
        affiliations: Arc<dyn AffiliationDirectory>,
        amount_scale: u32,
        invoices: InvoiceTranslator,
    ) -> Self {
        Self {
            pricing,
            affiliations,
            amount_scale,
            invoices,
        }
    }
}

impl<'t> DocumentHandler<Period, LedgerCtx<'t>> for BillingTranslator {
    type Error = PostingError;

    fn handle(&self, tx: &mut LedgerCtx<'t>, change: &DocumentChange<Period>) -> PostingResult<()> {
        if !change.was_created() {
            return Ok(());
        }

        let period = change.document();
        let on = period.billing_date();
        let affiliations = self.affiliations.active_affiliations(period.lodge_id)?;

        for affiliation in &affiliations {
            let price = self.pricing.find_active_price(affiliation.category_id, on)?;
            let invoice = period.invoice_for(affiliation, &price, self.amount_scale);
            tx.insert_invoice(invoice.clone())?;
            self.invoices.handle(tx, &DocumentChange::created(invoice))?;
        }

        info!(
            period = %period.id,
            lodge = %period.lodge_id,
            billed_on = %on,
            invoices = affiliations.len(),
            "billing run completed"
        );
        Ok(())
    }
}
