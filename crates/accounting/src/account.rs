use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use treasury_core::{
    AccountId, AffiliationId, Audit, DomainError, DomainResult, Entity, LodgeAccountId,
    LodgeAccountOwner, LodgeGlobalAccountId, LodgeId, UserId,
};

/// A record holding a running balance.
///
/// The balance only ever changes through [`Balance::apply_delta`], which also
/// stamps the record as modified by whoever caused the change.
pub trait Balance {
    fn balance(&self) -> Decimal;

    fn audit(&self) -> &Audit;

    #[doc(hidden)]
    fn balance_mut(&mut self) -> &mut Decimal;

    #[doc(hidden)]
    fn audit_mut(&mut self) -> &mut Audit;

    /// Add `delta` to the balance and return the new balance.
    fn apply_delta(&mut self, delta: Decimal, by: UserId, on: DateTime<Utc>) -> DomainResult<Decimal> {
        let next = self
            .balance()
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("balance overflow"))?;
        *self.balance_mut() = next;
        let audit = self.audit_mut();
        *audit = audit.touched(by, on);
        Ok(next)
    }
}

/// Balance ledger of one member affiliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub affiliation_id: AffiliationId,
    pub balance: Decimal,
    pub audit: Audit,
}

impl Account {
    /// Zero-balance account for `affiliation_id`.
    pub fn open(affiliation_id: AffiliationId, audit: Audit) -> Self {
        Self {
            id: AccountId::new(),
            affiliation_id,
            balance: Decimal::ZERO,
            audit,
        }
    }
}

/// Balance ledger of one cash handler within a lodge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodgeAccount {
    pub id: LodgeAccountId,
    pub owner: LodgeAccountOwner,
    /// Global account every movement on this account cascades to.
    pub global_account_id: LodgeGlobalAccountId,
    pub balance: Decimal,
    pub audit: Audit,
}

impl LodgeAccount {
    pub fn open(owner: LodgeAccountOwner, global_account_id: LodgeGlobalAccountId, audit: Audit) -> Self {
        Self {
            id: LodgeAccountId::new(),
            owner,
            global_account_id,
            balance: Decimal::ZERO,
            audit,
        }
    }
}

/// Aggregate balance of all lodge accounts of one lodge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodgeGlobalAccount {
    pub id: LodgeGlobalAccountId,
    pub lodge_id: LodgeId,
    pub balance: Decimal,
    pub audit: Audit,
}

impl LodgeGlobalAccount {
    pub fn open(lodge_id: LodgeId, audit: Audit) -> Self {
        Self {
            id: LodgeGlobalAccountId::new(),
            lodge_id,
            balance: Decimal::ZERO,
            audit,
        }
    }
}

macro_rules! impl_balance {
    ($t:ty, $id:ty) => {
        impl Balance for $t {
            fn balance(&self) -> Decimal {
                self.balance
            }

            fn audit(&self) -> &Audit {
                &self.audit
            }

            fn balance_mut(&mut self) -> &mut Decimal {
                &mut self.balance
            }

            fn audit_mut(&mut self) -> &mut Audit {
                &mut self.audit
            }
        }

        impl Entity for $t {
            type Id = $id;

            fn id(&self) -> $id {
                self.id
            }
        }
    };
}

impl_balance!(Account, AccountId);
impl_balance!(LodgeAccount, LodgeAccountId);
impl_balance!(LodgeGlobalAccount, LodgeGlobalAccountId);
