use crate::domain::EntityId;
use crate::models::{Page, ShowView};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a relation list in a show payload.
///
/// Clients may send a bare name (`"Drama"`) or an object carrying link
/// attributes (`{"name": "Jane", "character_name": "Queen"}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RelationEntryInput")]
pub struct RelationEntry {
    pub name: String,
    pub character_name: Option<String>,
    pub display_order: Option<i32>,
}

impl RelationEntry {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            character_name: None,
            display_order: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RelationEntryInput {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        character_name: Option<String>,
        #[serde(default)]
        display_order: Option<i32>,
    },
}

impl From<RelationEntryInput> for RelationEntry {
    fn from(input: RelationEntryInput) -> Self {
        match input {
            RelationEntryInput::Name(name) => Self::named(name),
            RelationEntryInput::Detailed {
                name,
                character_name,
                display_order,
            } => Self {
                name,
                character_name,
                display_order,
            },
        }
    }
}

/// A row of an entity table. Optional columns (`profile_url`, `logo_url`,
/// `country`) are flattened into the JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationEntity {
    pub id: EntityId,
    pub name: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Option<String>>,
}

/// An entity as linked to one show, with the link's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedEntity {
    pub id: EntityId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Option<String>>,
}

/// Create/update payload for an entity. Attribute keys are checked against
/// the kind's column list before they reach the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Option<String>>,
}

/// Shows linked to one entity, returned with the entity itself.
#[derive(Debug, Clone, Serialize)]
pub struct EntityShows {
    pub entity: RelationEntity,
    #[serde(flatten)]
    pub page: Page<ShowView>,
}
