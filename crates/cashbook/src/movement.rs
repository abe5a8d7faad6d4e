use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use treasury_core::{
    Audit, Entity, LodgeAccountEgressId, LodgeAccountIngressId, LodgeAccountOwner,
    LodgeAccountTransferId,
};
use treasury_events::Document;

/// Cash received by a lodge account from outside the membership ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodgeAccountIngress {
    pub id: LodgeAccountIngressId,
    pub lodge_account: LodgeAccountOwner,
    pub description: String,
    pub amount: Decimal,
    pub is_active: bool,
    pub audit: Audit,
}

/// Cash paid out of a lodge account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodgeAccountEgress {
    pub id: LodgeAccountEgressId,
    pub lodge_account: LodgeAccountOwner,
    pub description: String,
    pub amount: Decimal,
    pub is_active: bool,
    pub audit: Audit,
}

/// Cash moved from one lodge account to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodgeAccountTransfer {
    pub id: LodgeAccountTransferId,
    pub from: LodgeAccountOwner,
    pub to: LodgeAccountOwner,
    pub amount: Decimal,
    pub is_active: bool,
    pub audit: Audit,
}

impl Entity for LodgeAccountIngress {
    type Id = LodgeAccountIngressId;

    fn id(&self) -> LodgeAccountIngressId {
        self.id
    }
}

impl Document for LodgeAccountIngress {
    fn document_type(&self) -> &'static str {
        "cashbook.lodge_account_ingress"
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }
}

impl Entity for LodgeAccountEgress {
    type Id = LodgeAccountEgressId;

    fn id(&self) -> LodgeAccountEgressId {
        self.id
    }
}

impl Document for LodgeAccountEgress {
    fn document_type(&self) -> &'static str {
        "cashbook.lodge_account_egress"
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }
}

impl Entity for LodgeAccountTransfer {
    type Id = LodgeAccountTransferId;

    fn id(&self) -> LodgeAccountTransferId {
        self.id
    }
}

impl Document for LodgeAccountTransfer {
    fn document_type(&self) -> &'static str {
        "cashbook.lodge_account_transfer"
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }
}
