use crate::domain::{CatalogError, RelationKind, ShowId};
use crate::models::relation::{LinkedEntity, RelationEntry};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Deserializes a field that was present in the payload, keeping an explicit
/// `null` as `Some(None)`. Absent fields fall back to `None` via `default`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parses the date forms the catalog accepts and strips any time-of-day or
/// offset, keeping the calendar date as written.
#[must_use]
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
                .ok()
                .map(|dt| dt.date())
        })
}

/// Normalized `YYYY-MM-DD` form of `raw`, or `None` when it is not a date.
#[must_use]
pub fn normalize_calendar_date(raw: &str) -> Option<String> {
    parse_calendar_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Show payload as sent by clients for create, replace and patch.
///
/// Every scalar distinguishes "absent" (`None`) from "explicitly null"
/// (`Some(None)`). Relation lists are `None` when the key is missing, which
/// leaves that kind's links untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ShowInput {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub original_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub first_air_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub last_air_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub number_of_seasons: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub number_of_episodes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub overview: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub popularity: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub tmdb_rating: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub vote_count: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub poster_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub backdrop_url: Option<Option<String>>,

    #[serde(default)]
    pub actors: Option<Vec<RelationEntry>>,
    #[serde(default)]
    pub networks: Option<Vec<RelationEntry>>,
    #[serde(default)]
    pub genres: Option<Vec<RelationEntry>>,
    #[serde(default)]
    pub creators: Option<Vec<RelationEntry>>,
    #[serde(default)]
    pub studios: Option<Vec<RelationEntry>>,
}

/// How a [`ShowInput`] is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// New show; name, first air date and overview are required.
    Create,
    /// Full replacement; same requirements as create, omitted optional
    /// fields are cleared.
    Replace,
    /// Sparse update; only present fields are written.
    Patch,
}

/// Validated show column values. Required columns are `Option<T>` (absent or
/// set), nullable columns are `Option<Option<T>>` (absent, cleared or set).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowFields {
    pub name: Option<String>,
    pub original_name: Option<Option<String>>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<Option<String>>,
    pub number_of_seasons: Option<Option<i32>>,
    pub number_of_episodes: Option<Option<i32>>,
    pub status: Option<Option<String>>,
    pub overview: Option<String>,
    pub popularity: Option<Option<f64>>,
    pub tmdb_rating: Option<Option<f64>>,
    pub vote_count: Option<Option<i32>>,
    pub poster_url: Option<Option<String>>,
    pub backdrop_url: Option<Option<String>>,
}

impl ShowFields {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A validated write: column changes plus the relation kinds to replace,
/// in the order they will be synchronized.
#[derive(Debug, Clone, Default)]
pub struct ShowChanges {
    pub fields: ShowFields,
    pub relations: Vec<(RelationKind, Vec<RelationEntry>)>,
}

fn required_text(
    value: Option<Option<String>>,
    field: &str,
    mode: WriteMode,
) -> Result<Option<String>, CatalogError> {
    match value {
        None if mode == WriteMode::Patch => Ok(None),
        Some(Some(v)) if !v.trim().is_empty() => Ok(Some(v.trim().to_string())),
        _ => Err(CatalogError::validation(format!("{field} is required"))),
    }
}

fn required_date(
    value: Option<Option<String>>,
    field: &str,
    mode: WriteMode,
) -> Result<Option<String>, CatalogError> {
    required_text(value, field, mode)?
        .map(|raw| {
            normalize_calendar_date(&raw).ok_or_else(|| {
                CatalogError::validation(format!("{field} must be a calendar date (YYYY-MM-DD)"))
            })
        })
        .transpose()
}

fn optional_date(
    value: Option<Option<String>>,
    field: &str,
) -> Result<Option<Option<String>>, CatalogError> {
    match value {
        Some(Some(raw)) if !raw.trim().is_empty() => normalize_calendar_date(&raw)
            .map(|d| Some(Some(d)))
            .ok_or_else(|| {
                CatalogError::validation(format!("{field} must be a calendar date (YYYY-MM-DD)"))
            }),
        Some(_) => Ok(Some(None)),
        None => Ok(None),
    }
}

fn non_negative_count(
    value: Option<Option<i32>>,
    field: &str,
) -> Result<Option<Option<i32>>, CatalogError> {
    if let Some(Some(v)) = value
        && v < 0
    {
        return Err(CatalogError::validation(format!(
            "{field} must be a non-negative integer"
        )));
    }
    Ok(value)
}

fn bounded_real(
    value: Option<Option<f64>>,
    field: &str,
    max: Option<f64>,
) -> Result<Option<Option<f64>>, CatalogError> {
    if let Some(Some(v)) = value {
        let in_range = v.is_finite() && v >= 0.0 && max.is_none_or(|m| v <= m);
        if !in_range {
            let bound = max.map_or_else(
                || "a non-negative number".to_string(),
                |m| format!("between 0 and {m}"),
            );
            return Err(CatalogError::validation(format!("{field} must be {bound}")));
        }
    }
    Ok(value)
}

/// In replace mode an omitted nullable column is cleared.
fn replace_default<T>(value: Option<Option<T>>, mode: WriteMode) -> Option<Option<T>> {
    match (value, mode) {
        (None, WriteMode::Replace) => Some(None),
        (value, _) => value,
    }
}

fn trimmed(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

impl ShowInput {
    /// Validates the payload for `mode`.
    pub fn into_changes(self, mode: WriteMode) -> Result<ShowChanges, CatalogError> {
        let fields = ShowFields {
            name: required_text(self.name, "name", mode)?,
            original_name: replace_default(trimmed(self.original_name), mode),
            first_air_date: required_date(self.first_air_date, "first_air_date", mode)?,
            last_air_date: replace_default(
                optional_date(self.last_air_date, "last_air_date")?,
                mode,
            ),
            number_of_seasons: replace_default(
                non_negative_count(self.number_of_seasons, "number_of_seasons")?,
                mode,
            ),
            number_of_episodes: replace_default(
                non_negative_count(self.number_of_episodes, "number_of_episodes")?,
                mode,
            ),
            status: replace_default(trimmed(self.status), mode),
            overview: required_text(self.overview, "overview", mode)?,
            popularity: replace_default(
                bounded_real(self.popularity, "popularity", None)?,
                mode,
            ),
            tmdb_rating: replace_default(
                bounded_real(self.tmdb_rating, "tmdb_rating", Some(10.0))?,
                mode,
            ),
            vote_count: replace_default(non_negative_count(self.vote_count, "vote_count")?, mode),
            poster_url: replace_default(self.poster_url, mode),
            backdrop_url: replace_default(self.backdrop_url, mode),
        };

        let relations: Vec<(RelationKind, Vec<RelationEntry>)> = [
            (RelationKind::Genre, self.genres),
            (RelationKind::Network, self.networks),
            (RelationKind::Creator, self.creators),
            (RelationKind::Studio, self.studios),
            (RelationKind::Actor, self.actors),
        ]
        .into_iter()
        .filter_map(|(kind, entries)| entries.map(|e| (kind, e)))
        .collect();

        if mode == WriteMode::Patch && fields.is_empty() && relations.is_empty() {
            return Err(CatalogError::validation(
                "At least one field or relation list must be provided",
            ));
        }

        Ok(ShowChanges { fields, relations })
    }
}

/// One row of the `show_details` view, optionally with the link attributes
/// of an actor-scoped listing.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct ShowRow {
    pub id: i32,
    pub name: String,
    pub original_name: Option<String>,
    pub first_air_date: String,
    pub last_air_date: Option<String>,
    pub number_of_seasons: Option<i32>,
    pub number_of_episodes: Option<i32>,
    pub status: Option<String>,
    pub overview: String,
    pub popularity: Option<f64>,
    pub tmdb_rating: Option<f64>,
    pub vote_count: Option<i32>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub actor_names: Option<String>,
    pub genre_names: Option<String>,
    pub network_names: Option<String>,
    pub creator_names: Option<String>,
    pub studio_names: Option<String>,
    pub character_name: Option<String>,
    pub display_order: Option<i32>,
}

/// Public shape of a show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowView {
    pub id: ShowId,
    pub name: String,
    pub original_name: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub number_of_seasons: Option<i32>,
    pub number_of_episodes: Option<i32>,
    pub status: Option<String>,
    pub overview: String,
    pub popularity: Option<f64>,
    pub tmdb_rating: Option<f64>,
    pub vote_count: Option<i32>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub actors: Option<String>,
    pub genres: Option<String>,
    pub networks: Option<String>,
    pub creators: Option<String>,
    pub studios: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    /// Ordered link rows per kind; only present on single-show reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<BTreeMap<String, Vec<LinkedEntity>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(json: serde_json::Value) -> ShowInput {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn calendar_dates_drop_time_and_offset() {
        assert_eq!(normalize_calendar_date("2024-03-01").as_deref(), Some("2024-03-01"));
        assert_eq!(
            normalize_calendar_date("2024-03-01T23:30:00-05:00").as_deref(),
            Some("2024-03-01")
        );
        assert_eq!(
            normalize_calendar_date("2024-03-01 10:00:00").as_deref(),
            Some("2024-03-01")
        );
        assert_eq!(normalize_calendar_date("March 1st"), None);
        assert_eq!(normalize_calendar_date("2024-02-30"), None);
    }

    #[test]
    fn create_requires_core_fields() {
        let err = input(serde_json::json!({ "name": "Alpha", "overview": "x" }))
            .into_changes(WriteMode::Create)
            .unwrap_err();
        assert!(err.to_string().contains("first_air_date"));

        let changes = input(serde_json::json!({
            "name": "  Alpha ",
            "first_air_date": "2023-01-02T00:00:00Z",
            "overview": "A show"
        }))
        .into_changes(WriteMode::Create)
        .unwrap();
        assert_eq!(changes.fields.name.as_deref(), Some("Alpha"));
        assert_eq!(changes.fields.first_air_date.as_deref(), Some("2023-01-02"));
        assert!(changes.relations.is_empty());
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let changes = input(serde_json::json!({ "status": null, "vote_count": 3 }))
            .into_changes(WriteMode::Patch)
            .unwrap();
        assert_eq!(changes.fields.status, Some(None));
        assert_eq!(changes.fields.vote_count, Some(Some(3)));
        assert_eq!(changes.fields.poster_url, None);
        assert_eq!(changes.fields.name, None);
    }

    #[test]
    fn patch_rejects_null_required_field() {
        let err = input(serde_json::json!({ "name": null }))
            .into_changes(WriteMode::Patch)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert!(input(serde_json::json!({})).into_changes(WriteMode::Patch).is_err());
    }

    #[test]
    fn relation_only_patch_is_accepted() {
        let changes = input(serde_json::json!({ "actors": ["A", { "name": "B", "character_name": "Bee" }] }))
            .into_changes(WriteMode::Patch)
            .unwrap();
        assert!(changes.fields.is_empty());
        let (kind, entries) = &changes.relations[0];
        assert_eq!(*kind, RelationKind::Actor);
        assert_eq!(entries[1].character_name.as_deref(), Some("Bee"));
    }

    #[test]
    fn rating_and_counts_are_range_checked() {
        let bad_rating = input(serde_json::json!({ "tmdb_rating": 10.5 }))
            .into_changes(WriteMode::Patch)
            .unwrap_err();
        assert!(bad_rating.to_string().contains("tmdb_rating"));

        let bad_count = input(serde_json::json!({ "number_of_seasons": -1 }))
            .into_changes(WriteMode::Patch)
            .unwrap_err();
        assert!(bad_count.to_string().contains("number_of_seasons"));
    }

    #[test]
    fn replace_clears_omitted_optional_columns() {
        let changes = input(serde_json::json!({
            "name": "Alpha",
            "first_air_date": "2023-01-02",
            "overview": "A show"
        }))
        .into_changes(WriteMode::Replace)
        .unwrap();
        assert_eq!(changes.fields.tmdb_rating, Some(None));
        assert_eq!(changes.fields.last_air_date, Some(None));
    }
}
