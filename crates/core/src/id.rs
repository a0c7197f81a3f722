//! Sequential identifiers.
//!
//! All ids are assigned by the persistence collaborator, monotonically per
//! entity collection. Newtypes keep call sites from mixing them up.

use serde::{Deserialize, Serialize};

macro_rules! sequential_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub fn raw(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

sequential_id!(
    /// Inventory item identifier.
    ItemId
);
sequential_id!(
    /// User account identifier.
    UserId
);
sequential_id!(
    /// Quantity event identifier (ledger sequence).
    EventId
);
sequential_id!(
    /// Audit entry identifier.
    AuditId
);
