use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use treasury_core::{AffiliationId, Audit, DepositId, Entity, HigherBodyDepositId, LodgeAccountOwner};
use treasury_events::Document;

/// Money a member paid into a lodge account.
///
/// Credits the payer's account and the receiving lodge account by the same amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: DepositId,
    pub payer_id: AffiliationId,
    pub lodge_account: LodgeAccountOwner,
    pub amount: Decimal,
    pub is_active: bool,
    pub audit: Audit,
}

impl Entity for Deposit {
    type Id = DepositId;

    fn id(&self) -> DepositId {
        self.id
    }
}

impl Document for Deposit {
    fn document_type(&self) -> &'static str {
        "cashbook.deposit"
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }
}

/// Accreditation lifecycle of a higher-body deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HigherBodyDepositStatus {
    Pending,
    Accredited,
    Rejected,
}

/// Payment a member made directly to the higher organizing body.
///
/// Only affects the member's account, and only once the higher body accredits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HigherBodyDeposit {
    pub id: HigherBodyDepositId,
    pub payer_id: AffiliationId,
    pub amount: Decimal,
    pub status: HigherBodyDepositStatus,
    pub audit: Audit,
}

impl HigherBodyDeposit {
    pub fn is_accredited(&self) -> bool {
        self.status == HigherBodyDepositStatus::Accredited
    }
}

impl Entity for HigherBodyDeposit {
    type Id = HigherBodyDepositId;

    fn id(&self) -> HigherBodyDepositId {
        self.id
    }
}

impl Document for HigherBodyDeposit {
    fn document_type(&self) -> &'static str {
        "cashbook.higher_body_deposit"
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_upper_snake_case_on_the_wire() {
        let json = serde_json::to_value(HigherBodyDepositStatus::Accredited).unwrap();
        assert_eq!(json, serde_json::json!("ACCREDITED"));

        let parsed: HigherBodyDepositStatus = serde_json::from_value(serde_json::json!("PENDING")).unwrap();
        assert_eq!(parsed, HigherBodyDepositStatus::Pending);
    }
}
