//! Domain types for the show catalog with strong typing.
//!
//! Identifiers are newtypes so a show id can never be passed where a
//! related-entity id is expected, and the relation kinds are a closed enum
//! whose static descriptors drive every table-specific statement.

pub mod error;
pub mod relation;

pub use error::CatalogError;
pub use relation::{RelationKind, RelationTable};

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                i32::deserialize(deserializer).map(Self::new)
            }
        }
    };
}

id_newtype!(
    /// Unique identifier of a show (`tv_shows.id`).
    ///
    /// ```rust
    /// use tvcatalog::domain::ShowId;
    ///
    /// let id = ShowId::new(42);
    /// assert_eq!(id.value(), 42);
    /// assert_eq!(id.to_string(), "42");
    /// ```
    ShowId
);

id_newtype!(
    /// Identifier of a related entity (actor, network, ...). Only meaningful
    /// together with its [`RelationKind`].
    EntityId
);

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }

    /// Parses `asc`/`desc` case-insensitively. Anything else, including a
    /// missing value, yields `fallback`.
    #[must_use]
    pub fn parse_or(raw: Option<&str>, fallback: Self) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Ascending,
            Some(s) if s.eq_ignore_ascii_case("desc") => Self::Descending,
            _ => fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_id_conversions() {
        let id = ShowId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(ShowId::from(42), id);
    }

    #[test]
    fn entity_id_serialization() {
        let id = EntityId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn sort_order_parsing_falls_back() {
        use SortOrder::{Ascending, Descending};
        assert_eq!(SortOrder::parse_or(Some("DESC"), Ascending), Descending);
        assert_eq!(SortOrder::parse_or(Some("asc"), Descending), Ascending);
        assert_eq!(SortOrder::parse_or(Some("sideways"), Descending), Descending);
        assert_eq!(SortOrder::parse_or(None, Ascending), Ascending);
        assert!(!Descending.is_ascending());
    }
}
