//! Strongly-typed identifiers for brokerage entities
//!
//! Each identifier wraps a UUID in its own newtype so a quote id can never be
//! handed to an operation expecting a sales process id. The display form
//! carries a short prefix (`SP-…`, `QUO-…`) and parsing accepts either the
//! prefixed or the bare UUID form, which is what the backend stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Display prefix, e.g. `SP` for sales processes
            pub fn prefix() -> &'static str {
                $prefix
            }

            /// First eight hex digits, for log lines and UI badges
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.trim();
                let uuid_str = raw.strip_prefix(concat!($prefix, "-")).unwrap_or(raw);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a sales process (an opportunity in the pipeline)
    SalesProcessId,
    "SP"
);
define_id!(
    /// Identifier of an insurer quote attached to a sales process
    QuoteId,
    "QUO"
);
define_id!(
    /// Identifier of a bound policy
    PolicyId,
    "POL"
);
define_id!(
    /// Identifier of an issued import token
    ImportTokenId,
    "IMP"
);
define_id!(
    /// Identifier of an authenticated backend user
    UserId,
    "USR"
);
