//! Strongly-typed identifiers for domain entities

use serde::{Deserialize, Serialize};

macro_rules! define_row_id {
    ($name:ident) => {
        /// Integer identity assigned by the record store on insert
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn from_i64(value: i64) -> Self {
                Self(value)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_row_id!(CreatureId);

/// Identifier of one sprite job, scoped to the kind of item it animates
///
/// Rendered as `move_<n>`, `expression_<n>` (1-based) or `generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteJobId {
    Move(usize),
    Expression(usize),
    Generic,
}

impl std::fmt::Display for SpriteJobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Move(n) => write!(f, "move_{}", n),
            Self::Expression(n) => write!(f, "expression_{}", n),
            Self::Generic => write!(f, "generic"),
        }
    }
}

impl Serialize for SpriteJobId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
