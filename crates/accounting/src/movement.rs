use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use treasury_core::{
    AccountId, AccountMovementId, Audit, ChargeId, DepositId, DomainResult, Entity,
    HigherBodyDepositId, InvoiceId, LodgeAccountEgressId, LodgeAccountId,
    LodgeAccountIngressId, LodgeAccountMovementId, LodgeAccountTransferId, UserId,
};

use crate::account::{Account, Balance, LodgeAccount};

/// Reference from a movement to the source document it records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum DocumentRef {
    Invoice(InvoiceId),
    Charge(ChargeId),
    Deposit(DepositId),
    HigherBodyDeposit(HigherBodyDepositId),
    LodgeAccountIngress(LodgeAccountIngressId),
    LodgeAccountEgress(LodgeAccountEgressId),
    LodgeAccountTransfer(LodgeAccountTransferId),
}

impl DocumentRef {
    pub fn document_type(&self) -> &'static str {
        match self {
            DocumentRef::Invoice(_) => "invoicing.invoice",
            DocumentRef::Charge(_) => "invoicing.charge",
            DocumentRef::Deposit(_) => "cashbook.deposit",
            DocumentRef::HigherBodyDeposit(_) => "cashbook.higher_body_deposit",
            DocumentRef::LodgeAccountIngress(_) => "cashbook.lodge_account_ingress",
            DocumentRef::LodgeAccountEgress(_) => "cashbook.lodge_account_egress",
            DocumentRef::LodgeAccountTransfer(_) => "cashbook.lodge_account_transfer",
        }
    }
}

impl core::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let id = match self {
            DocumentRef::Invoice(id) => id.to_string(),
            DocumentRef::Charge(id) => id.to_string(),
            DocumentRef::Deposit(id) => id.to_string(),
            DocumentRef::HigherBodyDeposit(id) => id.to_string(),
            DocumentRef::LodgeAccountIngress(id) => id.to_string(),
            DocumentRef::LodgeAccountEgress(id) => id.to_string(),
            DocumentRef::LodgeAccountTransfer(id) => id.to_string(),
        };
        write!(f, "{}:{}", self.document_type(), id)
    }
}

/// Kind of a member account movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountMovementKind {
    Invoice,
    Charge,
    Deposit,
    HigherBodyDeposit,
}

impl AccountMovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "INVOICE",
            Self::Charge => "CHARGE",
            Self::Deposit => "DEPOSIT",
            Self::HigherBodyDeposit => "HIGHER_BODY_DEPOSIT",
        }
    }

    /// Movement kind a document posts against a member account, if any.
    pub fn for_document(document: &DocumentRef) -> Option<Self> {
        match document {
            DocumentRef::Invoice(_) => Some(Self::Invoice),
            DocumentRef::Charge(_) => Some(Self::Charge),
            DocumentRef::Deposit(_) => Some(Self::Deposit),
            DocumentRef::HigherBodyDeposit(_) => Some(Self::HigherBodyDeposit),
            _ => None,
        }
    }
}

/// Kind of a lodge account movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LodgeAccountMovementKind {
    Deposit,
    Ingress,
    Egress,
    Transfer,
}

impl LodgeAccountMovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Ingress => "INGRESS",
            Self::Egress => "EGRESS",
            Self::Transfer => "TRANSFER",
        }
    }

    /// Movement kind a document posts against a lodge account, if any.
    pub fn for_document(document: &DocumentRef) -> Option<Self> {
        match document {
            DocumentRef::Deposit(_) => Some(Self::Deposit),
            DocumentRef::LodgeAccountIngress(_) => Some(Self::Ingress),
            DocumentRef::LodgeAccountEgress(_) => Some(Self::Egress),
            DocumentRef::LodgeAccountTransfer(_) => Some(Self::Transfer),
            _ => None,
        }
    }
}

/// Immutable posting against a member account.
///
/// Only `is_active` (and its modifier) may change after creation, once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMovement {
    pub id: AccountMovementId,
    pub document: DocumentRef,
    pub account_id: AccountId,
    pub kind: AccountMovementKind,
    /// Signed amount applied to the account balance.
    pub amount: Decimal,
    /// Account balance right after this movement was posted.
    pub balance: Decimal,
    pub is_active: bool,
    pub audit: Audit,
}

impl AccountMovement {
    /// Apply `amount` to `account` and record the movement.
    ///
    /// `audit` comes from the source document; the account is stamped with its
    /// last modifier.
    pub fn post(
        document: DocumentRef,
        account: &mut Account,
        kind: AccountMovementKind,
        amount: Decimal,
        audit: Audit,
    ) -> DomainResult<Self> {
        let balance = account.apply_delta(amount, audit.last_modified_by, audit.last_modified_on)?;
        Ok(Self {
            id: AccountMovementId::new(),
            document,
            account_id: account.id,
            kind,
            amount,
            balance,
            is_active: true,
            audit,
        })
    }

    /// Clear `is_active` and return the delta that undoes this movement.
    ///
    /// Returns `None` when the movement was already deactivated.
    pub fn deactivate(&mut self, by: UserId, on: DateTime<Utc>) -> Option<Decimal> {
        deactivate(&mut self.is_active, &mut self.audit, self.amount, by, on)
    }
}

/// Immutable posting against a lodge account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodgeAccountMovement {
    pub id: LodgeAccountMovementId,
    pub document: DocumentRef,
    pub lodge_account_id: LodgeAccountId,
    pub kind: LodgeAccountMovementKind,
    pub amount: Decimal,
    pub balance: Decimal,
    pub is_active: bool,
    pub audit: Audit,
}

impl LodgeAccountMovement {
    /// Apply `amount` to `lodge_account` and record the movement.
    ///
    /// The cascade to the global account is the caller's job.
    pub fn post(
        document: DocumentRef,
        lodge_account: &mut LodgeAccount,
        kind: LodgeAccountMovementKind,
        amount: Decimal,
        audit: Audit,
    ) -> DomainResult<Self> {
        let balance = lodge_account.apply_delta(amount, audit.last_modified_by, audit.last_modified_on)?;
        Ok(Self {
            id: LodgeAccountMovementId::new(),
            document,
            lodge_account_id: lodge_account.id,
            kind,
            amount,
            balance,
            is_active: true,
            audit,
        })
    }

    pub fn deactivate(&mut self, by: UserId, on: DateTime<Utc>) -> Option<Decimal> {
        deactivate(&mut self.is_active, &mut self.audit, self.amount, by, on)
    }
}

fn deactivate(
    is_active: &mut bool,
    audit: &mut Audit,
    amount: Decimal,
    by: UserId,
    on: DateTime<Utc>,
) -> Option<Decimal> {
    if !*is_active {
        return None;
    }
    *is_active = false;
    *audit = audit.touched(by, on);
    Some(-amount)
}

impl Entity for AccountMovement {
    type Id = AccountMovementId;

    fn id(&self) -> AccountMovementId {
        self.id
    }
}

impl Entity for LodgeAccountMovement {
    type Id = LodgeAccountMovementId;

    fn id(&self) -> LodgeAccountMovementId {
        self.id
    }
}
