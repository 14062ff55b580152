//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `VoucherId` where an `AccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(TenantId, "Unique identifier for a tenant (company).");
typed_id!(UserId, "Unique identifier for an acting user.");
typed_id!(AccountId, "Unique identifier for a chart of accounts entry.");
typed_id!(VoucherId, "Unique identifier for a voucher.");
typed_id!(VoucherEntryId, "Unique identifier for a voucher entry line.");
typed_id!(FiscalPeriodId, "Unique identifier for a fiscal period.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = VoucherId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(VoucherId::from(uuid), id);
    }

    #[test]
    fn test_typed_id_display_roundtrip() {
        let id = AccountId::new();
        let parsed = AccountId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_typed_id_from_str_error() {
        assert!(TenantId::from_str("invalid").is_err());
    }

    #[test]
    fn test_typed_ids_are_time_ordered() {
        let first = VoucherId::new();
        let second = VoucherId::new();
        assert!(first <= second);
    }
}
