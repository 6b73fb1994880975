use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Static description of one relation kind's storage.
///
/// Every statement touching an entity table or a link table is built from
/// these identifiers, so they are the only table/column names that ever
/// reach SQL text for relation data.
#[derive(Debug)]
pub struct RelationTable {
    /// Entity table, e.g. `actors`.
    pub table: &'static str,
    /// Link table joining `tv_shows` to the entity table.
    pub link_table: &'static str,
    /// Foreign key column in the link table pointing at the entity.
    pub link_fk: &'static str,
    /// Optional text columns stored on the entity row.
    pub attributes: &'static [&'static str],
    /// Whether links carry a `display_order` rank.
    pub ranked: bool,
    /// Whether links carry a `character_name`.
    pub has_character: bool,
    /// Column of the aggregate view holding the flattened name list.
    pub summary_column: &'static str,
}

const ACTORS: RelationTable = RelationTable {
    table: "actors",
    link_table: "show_actors",
    link_fk: "actor_id",
    attributes: &["profile_url"],
    ranked: true,
    has_character: true,
    summary_column: "actor_names",
};

const NETWORKS: RelationTable = RelationTable {
    table: "networks",
    link_table: "show_networks",
    link_fk: "network_id",
    attributes: &["logo_url", "country"],
    ranked: false,
    has_character: false,
    summary_column: "network_names",
};

const GENRES: RelationTable = RelationTable {
    table: "genres",
    link_table: "show_genres",
    link_fk: "genre_id",
    attributes: &[],
    ranked: false,
    has_character: false,
    summary_column: "genre_names",
};

const CREATORS: RelationTable = RelationTable {
    table: "creators",
    link_table: "show_creators",
    link_fk: "creator_id",
    attributes: &[],
    ranked: false,
    has_character: false,
    summary_column: "creator_names",
};

const STUDIOS: RelationTable = RelationTable {
    table: "studios",
    link_table: "show_studios",
    link_fk: "studio_id",
    attributes: &[],
    ranked: false,
    has_character: false,
    summary_column: "studio_names",
};

/// The auxiliary entity kinds a show can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Actor,
    Network,
    Genre,
    Creator,
    Studio,
}

impl RelationKind {
    pub const ALL: [Self; 5] = [
        Self::Actor,
        Self::Network,
        Self::Genre,
        Self::Creator,
        Self::Studio,
    ];

    #[must_use]
    pub const fn table(self) -> &'static RelationTable {
        match self {
            Self::Actor => &ACTORS,
            Self::Network => &NETWORKS,
            Self::Genre => &GENRES,
            Self::Creator => &CREATORS,
            Self::Studio => &STUDIOS,
        }
    }

    /// Plural name used in URLs, request bodies and response fields.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        self.table().table
    }

    /// Human-readable singular, used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Actor => "Actor",
            Self::Network => "Network",
            Self::Genre => "Genre",
            Self::Creator => "Creator",
            Self::Studio => "Studio",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

impl FromStr for RelationKind {
    type Err = String;

    /// Accepts the plural path segment (`actors`) or the singular (`actor`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| {
                let plural = kind.plural();
                lowered == plural || lowered == plural[..plural.len() - 1]
            })
            .ok_or_else(|| format!("Unknown relation type: {s}"))
    }
}
