//! Turns aggregate-view rows into the public show shape.

use crate::domain::{RelationKind, ShowId};
use crate::models::show::normalize_calendar_date;
use crate::models::{LinkedEntity, ShowRow, ShowView};
use std::collections::BTreeMap;

fn calendar_date(raw: Option<String>) -> Option<String> {
    raw.as_deref().and_then(normalize_calendar_date)
}

/// Merges a view row with its relation summaries. Dates that cannot be
/// read as calendar dates come out as `None`.
#[must_use]
pub fn assemble(row: ShowRow) -> ShowView {
    ShowView {
        id: ShowId::new(row.id),
        name: row.name,
        original_name: row.original_name,
        first_air_date: calendar_date(Some(row.first_air_date)),
        last_air_date: calendar_date(row.last_air_date),
        number_of_seasons: row.number_of_seasons,
        number_of_episodes: row.number_of_episodes,
        status: row.status,
        overview: row.overview,
        popularity: row.popularity,
        tmdb_rating: row.tmdb_rating,
        vote_count: row.vote_count,
        poster_url: row.poster_url,
        backdrop_url: row.backdrop_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
        actors: row.actor_names,
        genres: row.genre_names,
        networks: row.network_names,
        creators: row.creator_names,
        studios: row.studio_names,
        character_name: row.character_name,
        display_order: row.display_order,
        relations: None,
    }
}

/// [`assemble`] plus the ordered link rows of every kind, for single-show
/// reads.
#[must_use]
pub fn assemble_detail(row: ShowRow, links: Vec<(RelationKind, Vec<LinkedEntity>)>) -> ShowView {
    let relations: BTreeMap<String, Vec<LinkedEntity>> = links
        .into_iter()
        .map(|(kind, linked)| (kind.plural().to_string(), linked))
        .collect();

    ShowView {
        relations: Some(relations),
        ..assemble(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityId;

    fn row() -> ShowRow {
        ShowRow {
            id: 1,
            name: "Alpha".into(),
            original_name: None,
            first_air_date: "2021-04-05T00:00:00Z".into(),
            last_air_date: Some("2022-01-01 12:00:00".into()),
            number_of_seasons: Some(2),
            number_of_episodes: Some(20),
            status: Some("Ended".into()),
            overview: "A show".into(),
            popularity: Some(1.5),
            tmdb_rating: Some(8.1),
            vote_count: Some(100),
            poster_url: None,
            backdrop_url: None,
            created_at: "2024-01-01T00:00:00+00:00".into(),
            updated_at: "2024-01-01T00:00:00+00:00".into(),
            actor_names: Some("A, B".into()),
            genre_names: Some("Drama".into()),
            network_names: None,
            creator_names: None,
            studio_names: None,
            character_name: None,
            display_order: None,
        }
    }

    #[test]
    fn renames_summaries_and_normalizes_dates() {
        let view = assemble(row());
        assert_eq!(view.first_air_date.as_deref(), Some("2021-04-05"));
        assert_eq!(view.last_air_date.as_deref(), Some("2022-01-01"));
        assert_eq!(view.actors.as_deref(), Some("A, B"));
        assert_eq!(view.genres.as_deref(), Some("Drama"));
        assert!(view.networks.is_none());
        assert!(view.relations.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("character_name").is_none());
        assert!(json.get("relations").is_none());
        assert_eq!(json["actors"], "A, B");
    }

    #[test]
    fn malformed_dates_become_none() {
        let mut bad = row();
        bad.first_air_date = "someday".into();
        bad.last_air_date = Some(String::new());
        let view = assemble(bad);
        assert!(view.first_air_date.is_none());
        assert!(view.last_air_date.is_none());
    }

    #[test]
    fn detail_carries_ordered_links() {
        let links = vec![(
            RelationKind::Actor,
            vec![LinkedEntity {
                id: EntityId::new(4),
                name: "A".into(),
                character_name: Some("Hero".into()),
                display_order: Some(1),
                attributes: BTreeMap::from([("profile_url".to_string(), None)]),
            }],
        )];
        let view = assemble_detail(row(), links);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["relations"]["actors"][0]["character_name"], "Hero");
        assert_eq!(json["relations"]["actors"][0]["display_order"], 1);
    }
}
