//! Strongly-typed identifiers used across the ledger.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_newtype!(
    /// Identifier of a user (actor identity recorded in audit fields).
    UserId,
    "UserId"
);
uuid_newtype!(
    /// Identifier of a lodge (the organizing body).
    LodgeId,
    "LodgeId"
);
uuid_newtype!(
    /// Identifier of a member affiliation to a lodge.
    AffiliationId,
    "AffiliationId"
);
uuid_newtype!(
    /// Identifier of a membership category (prices are per category).
    CategoryId,
    "CategoryId"
);

uuid_newtype!(AccountId, "AccountId");
uuid_newtype!(LodgeAccountId, "LodgeAccountId");
uuid_newtype!(LodgeGlobalAccountId, "LodgeGlobalAccountId");
uuid_newtype!(AccountMovementId, "AccountMovementId");
uuid_newtype!(LodgeAccountMovementId, "LodgeAccountMovementId");

uuid_newtype!(PeriodId, "PeriodId");
uuid_newtype!(InvoiceId, "InvoiceId");
uuid_newtype!(ChargeId, "ChargeId");
uuid_newtype!(DepositId, "DepositId");
uuid_newtype!(HigherBodyDepositId, "HigherBodyDepositId");
uuid_newtype!(LodgeAccountIngressId, "LodgeAccountIngressId");
uuid_newtype!(LodgeAccountEgressId, "LodgeAccountEgressId");
uuid_newtype!(LodgeAccountTransferId, "LodgeAccountTransferId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_round_trip() {
        let id = AccountId::new();
        let parsed: AccountId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_error_names_the_identifier() {
        let err = "not-a-uuid".parse::<LodgeId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.starts_with("LodgeId")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn serializes_transparently() {
        let uuid = Uuid::now_v7();
        let id = InvoiceId::from_uuid(uuid);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(uuid.to_string()));
    }
}
