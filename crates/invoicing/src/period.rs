use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use treasury_core::{Audit, Entity, InvoiceId, LodgeId, PeriodId};
use treasury_events::Document;

use crate::{Affiliation, CategoryPrice, Invoice};

/// Dues-billing run for one lodge.
///
/// Creating a period bills every active affiliation of the lodge once. The
/// multiplier scales the monthly category price (e.g. 3 for a quarter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub lodge_id: LodgeId,
    pub description: String,
    pub price_multiplier: Decimal,
    pub audit: Audit,
}

impl Period {
    /// Date prices are looked up at: the day the period was created (UTC).
    pub fn billing_date(&self) -> NaiveDate {
        self.audit.created_on.date_naive()
    }

    /// Build the invoice this period bills to `affiliation` at `price`.
    ///
    /// Amount is `price × multiplier`, rounded half-even to `scale` places.
    /// The invoice carries the period's audit stamp unchanged.
    pub fn invoice_for(&self, affiliation: &Affiliation, price: &CategoryPrice, scale: u32) -> Invoice {
        let amount = (price.price * self.price_multiplier)
            .round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);

        Invoice {
            id: InvoiceId::new(),
            period_id: self.id,
            affiliation_id: affiliation.id,
            amount,
            is_active: true,
            audit: self.audit,
        }
    }
}

impl Entity for Period {
    type Id = PeriodId;

    fn id(&self) -> PeriodId {
        self.id
    }
}

impl Document for Period {
    fn document_type(&self) -> &'static str {
        "invoicing.period"
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use treasury_core::{AffiliationId, CategoryId, UserId};

    fn period(multiplier: Decimal) -> Period {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        Period {
            id: PeriodId::new(),
            lodge_id: LodgeId::new(),
            description: "Q1".to_string(),
            price_multiplier: multiplier,
            audit: Audit::created(UserId::new(), at),
        }
    }

    fn affiliation(lodge_id: LodgeId, category_id: CategoryId) -> Affiliation {
        Affiliation {
            id: AffiliationId::new(),
            lodge_id,
            category_id,
            is_active: true,
        }
    }

    fn price(category_id: CategoryId, amount: Decimal) -> CategoryPrice {
        CategoryPrice {
            category_id,
            price: amount,
            is_active: true,
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            date_until: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }
    }

    #[test]
    fn invoice_amount_is_price_times_multiplier() {
        let p = period(dec!(3));
        let category = CategoryId::new();
        let aff = affiliation(p.lodge_id, category);

        let invoice = p.invoice_for(&aff, &price(category, dec!(33.35)), 2);
        assert_eq!(invoice.amount, dec!(100.05));
        assert_eq!(invoice.period_id, p.id);
        assert_eq!(invoice.affiliation_id, aff.id);
        assert!(invoice.is_active);
        assert_eq!(invoice.audit.created_by, p.audit.created_by);
        assert_eq!(invoice.audit.last_modified_by, p.audit.last_modified_by);
    }

    #[test]
    fn invoice_audit_mirrors_period_audit() {
        let mut p = period(dec!(1));
        let editor = UserId::new();
        let edited_at = Utc.with_ymd_and_hms(2024, 3, 4, 8, 15, 0).unwrap();
        p.audit = p.audit.touched(editor, edited_at);
        let category = CategoryId::new();

        let invoice = p.invoice_for(&affiliation(p.lodge_id, category), &price(category, dec!(10)), 2);
        assert_eq!(invoice.audit, p.audit);
        assert_eq!(invoice.audit.created_on, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        assert_eq!(invoice.audit.last_modified_on, edited_at);
    }

    #[test]
    fn invoice_amount_rounds_half_even() {
        let p = period(dec!(0.5));
        let category = CategoryId::new();
        let aff = affiliation(p.lodge_id, category);

        // 0.125 -> 0.12 with banker's rounding
        let invoice = p.invoice_for(&aff, &price(category, dec!(0.25)), 2);
        assert_eq!(invoice.amount, dec!(0.12));
    }

    #[test]
    fn billing_date_is_creation_day() {
        let p = period(dec!(1));
        assert_eq!(p.billing_date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
