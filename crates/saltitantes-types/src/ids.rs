//! Type-safe identifiers for simulation entities.
//!
//! Sessions use UUID v7 (time-ordered) so archived stats sort naturally.
//! Creatures use a per-roster sequence number: they live only as long as
//! one session and the render surface needs a stable, compact handle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_uuid_id! {
    /// Unique identifier for one simulation session (Idle to Stopped).
    SessionId
}

/// Identifier of a creature within a single roster.
///
/// Allocated monotonically by the roster; never reused within a session,
/// so a removed creature's id cannot alias a newly merged cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub u64);

impl CreatureId {
    /// Return the raw sequence number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for CreatureId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
