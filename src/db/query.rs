//! Listing statements for every paginated resource.
//!
//! Filters and sort fields are closed enums mapped onto fixed column
//! references; request values only ever reach SQL as bound parameters.

use crate::domain::{CatalogError, EntityId, RelationKind, SortOrder};
use sea_orm::sea_query::{
    Alias, Asterisk, Condition, Expr, Func, JoinType, LikeExpr, Order, Query, SelectStatement,
    SimpleExpr,
};
use sea_orm::{DbBackend, Statement};
use serde::Deserialize;
use std::collections::BTreeMap;

const SHOW_ALIAS: &str = "d";
const ENTITY_ALIAS: &str = "e";
const LINK_ALIAS: &str = "l";
const FILTER_LINK_ALIAS: &str = "fl";
const FILTER_ENTITY_ALIAS: &str = "fe";

/// Largest `LIMIT`/`OFFSET` SQLite can bind.
const MAX_BOUND: u64 = i64::MAX.unsigned_abs();

/// What a listing enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    /// All shows, read from the `show_details` view.
    Shows,
    /// Rows of one entity table.
    Entities(RelationKind),
    /// Shows linked to one entity of `kind`.
    ShowsOf(RelationKind, EntityId),
}

impl ListSource {
    const fn lists_shows(self) -> bool {
        !matches!(self, Self::Entities(_))
    }

    const fn alias(self) -> &'static str {
        if self.lists_shows() {
            SHOW_ALIAS
        } else {
            ENTITY_ALIAS
        }
    }

    const fn default_sort(self) -> (SortField, SortOrder) {
        match self {
            Self::Shows | Self::ShowsOf(_, _) if self.is_genre_scoped() => {
                (SortField::TmdbRating, SortOrder::Descending)
            }
            Self::Shows | Self::ShowsOf(_, _) => (SortField::FirstAirDate, SortOrder::Descending),
            Self::Entities(_) => (SortField::Name, SortOrder::Ascending),
        }
    }

    const fn is_genre_scoped(self) -> bool {
        matches!(self, Self::ShowsOf(RelationKind::Genre, _))
    }

    fn accepts_filter(self, key: FilterKey) -> bool {
        self.lists_shows() || matches!(key, FilterKey::Name | FilterKey::Search)
    }

    fn accepts_sort(self, field: SortField) -> bool {
        self.lists_shows() || matches!(field, SortField::Id | SortField::Name)
    }
}

/// Query-string filters understood by listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Name,
    Search,
    Genre,
    Actor,
    Network,
    Creator,
    Studio,
    Year,
    MinRating,
}

impl FilterKey {
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::Search,
        Self::Genre,
        Self::Actor,
        Self::Network,
        Self::Creator,
        Self::Studio,
        Self::Year,
        Self::MinRating,
    ];

    /// Query parameter carrying this filter.
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Search => "search",
            Self::Genre => "genre",
            Self::Actor => "actor",
            Self::Network => "network",
            Self::Creator => "creator",
            Self::Studio => "studio",
            Self::Year => "year",
            Self::MinRating => "minRating",
        }
    }

    fn predicate(self, alias: &'static str, raw: &str) -> Result<SimpleExpr, CatalogError> {
        let column = |name: &str| Expr::col((Alias::new(alias), Alias::new(name)));

        match self {
            Self::Name | Self::Search => Ok(column("name").like(contains(raw))),
            Self::Genre => Ok(linked_entity_named(alias, RelationKind::Genre, raw)),
            Self::Actor => Ok(linked_entity_named(alias, RelationKind::Actor, raw)),
            Self::Network => Ok(linked_entity_named(alias, RelationKind::Network, raw)),
            Self::Creator => Ok(linked_entity_named(alias, RelationKind::Creator, raw)),
            Self::Studio => Ok(linked_entity_named(alias, RelationKind::Studio, raw)),
            Self::Year => {
                let year = raw
                    .parse::<i32>()
                    .ok()
                    .filter(|y| (0..=9999).contains(y))
                    .ok_or_else(|| {
                        CatalogError::validation(format!("year must be an integer, got '{raw}'"))
                    })?;
                Ok(Expr::expr(
                    Func::cust(Alias::new("strftime"))
                        .arg(Expr::val("%Y"))
                        .arg(column("first_air_date")),
                )
                .eq(format!("{year:04}")))
            }
            Self::MinRating => {
                let rating = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|r| r.is_finite())
                    .ok_or_else(|| {
                        CatalogError::validation(format!("minRating must be a number, got '{raw}'"))
                    })?;
                Ok(column("tmdb_rating").gte(rating))
            }
        }
    }
}

/// `EXISTS` over the show's links of `kind`, matching one entity name at a
/// time so a pattern never spans two names.
fn linked_entity_named(show_alias: &'static str, kind: RelationKind, raw: &str) -> SimpleExpr {
    let table = kind.table();
    let link = Alias::new(FILTER_LINK_ALIAS);
    let entity = Alias::new(FILTER_ENTITY_ALIAS);

    let mut linked = Query::select();
    linked
        .expr(Expr::cust("1"))
        .from_as(Alias::new(table.link_table), link.clone())
        .join_as(
            JoinType::InnerJoin,
            Alias::new(table.table),
            entity.clone(),
            Expr::col((entity.clone(), Alias::new("id")))
                .equals((link.clone(), Alias::new(table.link_fk))),
        )
        .and_where(
            Expr::col((link, Alias::new("show_id")))
                .equals((Alias::new(show_alias), Alias::new("id"))),
        )
        .and_where(Expr::col((entity, Alias::new("name"))).like(contains(raw)));

    Expr::exists(linked)
}

/// Case-insensitive (ASCII) substring pattern with `LIKE` wildcards escaped.
fn contains(raw: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(raw.len() + 2);
    escaped.push('%');
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    FirstAirDate,
    TmdbRating,
    Popularity,
    VoteCount,
}

impl SortField {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::FirstAirDate => "first_air_date",
            Self::TmdbRating => "tmdb_rating",
            Self::Popularity => "popularity",
            Self::VoteCount => "vote_count",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        [
            Self::Id,
            Self::Name,
            Self::FirstAirDate,
            Self::TmdbRating,
            Self::Popularity,
            Self::VoteCount,
        ]
        .into_iter()
        .find(|field| field.column() == raw.trim())
    }
}

/// Raw query-string parameters of a listing request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ListParams(BTreeMap<String, String>);

impl ListParams {
    /// Trimmed value of `key`; blank values count as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Positive integer value of `key`, capped at the largest bindable bound.
    fn positive(&self, key: &str) -> Option<u64> {
        self.get(key)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .map(|v| v.min(MAX_BOUND))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ListParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Count and data statements sharing one filter condition.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub count: Statement,
    pub data: Statement,
    pub page: u64,
    pub page_size: u64,
    pub sort: SortField,
    pub order: SortOrder,
}

/// Composes listing statements for any [`ListSource`].
#[derive(Debug, Clone, Copy)]
pub struct ListQuery {
    default_page_size: u64,
}

impl ListQuery {
    #[must_use]
    pub const fn new(default_page_size: u64) -> Self {
        Self { default_page_size }
    }

    /// Builds the count and data statements for `source`.
    ///
    /// Unknown filter keys and sort fields are ignored; only a non-numeric
    /// `year` or `minRating` is rejected.
    pub fn build(&self, source: ListSource, params: &ListParams) -> Result<BuiltQuery, CatalogError> {
        let alias = source.alias();

        let mut condition = Condition::all();
        if let ListSource::ShowsOf(kind, entity_id) = source {
            condition = condition.add(
                Expr::col((Alias::new(LINK_ALIAS), Alias::new(kind.table().link_fk)))
                    .eq(entity_id.value()),
            );
        }
        for key in FilterKey::ALL {
            if !source.accepts_filter(key) {
                continue;
            }
            if let Some(raw) = params.get(key.param()) {
                condition = condition.add(key.predicate(alias, raw)?);
            }
        }

        let (default_field, default_order) = source.default_sort();
        let sort = params
            .get("sortBy")
            .and_then(SortField::parse)
            .filter(|field| source.accepts_sort(*field))
            .unwrap_or(default_field);
        let order = SortOrder::parse_or(params.get("order"), default_order);

        let page = params.positive("page").unwrap_or(1);
        let page_size = params
            .positive("pageSize")
            .unwrap_or(self.default_page_size.clamp(1, MAX_BOUND));
        let offset = (page - 1)
            .checked_mul(page_size)
            .map_or(MAX_BOUND, |offset| offset.min(MAX_BOUND));

        let mut count = base(source);
        count
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("total"))
            .cond_where(condition.clone());

        let mut data = base(source);
        project(&mut data, source);
        data.cond_where(condition)
            .order_by(
                (Alias::new(alias), Alias::new(sort.column())),
                if order.is_ascending() {
                    Order::Asc
                } else {
                    Order::Desc
                },
            );
        if sort != SortField::Id {
            data.order_by((Alias::new(alias), Alias::new("id")), Order::Asc);
        }
        data.limit(page_size).offset(offset);

        Ok(BuiltQuery {
            count: DbBackend::Sqlite.build(&count),
            data: DbBackend::Sqlite.build(&data),
            page,
            page_size,
            sort,
            order,
        })
    }
}

fn base(source: ListSource) -> SelectStatement {
    let mut select = Query::select();
    match source {
        ListSource::Shows => {
            select.from_as(Alias::new("show_details"), Alias::new(SHOW_ALIAS));
        }
        ListSource::Entities(kind) => {
            select.from_as(Alias::new(kind.table().table), Alias::new(ENTITY_ALIAS));
        }
        ListSource::ShowsOf(kind, _) => {
            select
                .from_as(Alias::new("show_details"), Alias::new(SHOW_ALIAS))
                .join_as(
                    JoinType::InnerJoin,
                    Alias::new(kind.table().link_table),
                    Alias::new(LINK_ALIAS),
                    Expr::col((Alias::new(LINK_ALIAS), Alias::new("show_id")))
                        .equals((Alias::new(SHOW_ALIAS), Alias::new("id"))),
                );
        }
    }
    select
}

fn project(select: &mut SelectStatement, source: ListSource) {
    match source {
        ListSource::Entities(kind) => {
            let alias = Alias::new(ENTITY_ALIAS);
            select
                .column((alias.clone(), Alias::new("id")))
                .column((alias.clone(), Alias::new("name")));
            for attribute in kind.table().attributes {
                select.column((alias.clone(), Alias::new(*attribute)));
            }
        }
        ListSource::ShowsOf(kind, _) if kind.table().has_character => {
            select
                .column((Alias::new(SHOW_ALIAS), Asterisk))
                .column((Alias::new(LINK_ALIAS), Alias::new("character_name")))
                .column((Alias::new(LINK_ALIAS), Alias::new("display_order")));
        }
        ListSource::Shows | ListSource::ShowsOf(_, _) => {
            select.column((Alias::new(SHOW_ALIAS), Asterisk));
            project_no_link_attributes(select);
        }
    }
}

/// Show rows always carry the link attribute columns so one row type serves
/// every show listing.
pub(crate) fn project_no_link_attributes(select: &mut SelectStatement) {
    select
        .expr_as(Expr::cust("NULL"), Alias::new("character_name"))
        .expr_as(Expr::cust("NULL"), Alias::new("display_order"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Value;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        pairs.iter().copied().collect()
    }

    fn values(stmt: &Statement) -> Vec<Value> {
        stmt.values.clone().map(|v| v.0).unwrap_or_default()
    }

    #[test]
    fn data_values_extend_count_values_with_paging() {
        let built = ListQuery::new(25)
            .build(
                ListSource::Shows,
                &params(&[("name", "alpha"), ("minRating", "8"), ("page", "2")]),
            )
            .unwrap();

        let count = values(&built.count);
        let data = values(&built.data);
        assert_eq!(count.len(), 2);
        assert_eq!(data.len(), count.len() + 2);
        assert_eq!(data[..count.len()], count[..]);
        assert_eq!(built.page, 2);
        assert_eq!(built.page_size, 25);
        assert!(built.count.sql.contains("COUNT(*)"));
        assert!(built.data.sql.contains("LIMIT"));
        assert!(built.data.sql.contains("OFFSET"));
    }

    #[test]
    fn filter_values_never_reach_sql_text() {
        let hostile = "x'; DROP TABLE tv_shows; --";
        let built = ListQuery::new(25)
            .build(ListSource::Shows, &params(&[("genre", hostile), ("sortBy", hostile)]))
            .unwrap();

        assert!(!built.data.sql.contains("DROP TABLE"));
        assert!(!built.count.sql.contains("DROP TABLE"));
        assert!(built.data.sql.contains("ESCAPE"));
        assert_eq!(built.sort, SortField::FirstAirDate);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        let built = ListQuery::new(25)
            .build(ListSource::Shows, &params(&[("name", "100%_x")]))
            .unwrap();
        assert_eq!(values(&built.count)[0], Value::from("%100\\%\\_x%".to_string()));
    }

    #[test]
    fn unknown_sort_falls_back_to_resource_default() {
        let shows = ListQuery::new(25)
            .build(ListSource::Shows, &params(&[("sortBy", "bogus"), ("order", "sideways")]))
            .unwrap();
        assert_eq!(shows.sort, SortField::FirstAirDate);
        assert_eq!(shows.order, SortOrder::Descending);

        let genre = ListQuery::new(25)
            .build(
                ListSource::ShowsOf(RelationKind::Genre, EntityId::new(1)),
                &ListParams::default(),
            )
            .unwrap();
        assert_eq!(genre.sort, SortField::TmdbRating);

        let actors = ListQuery::new(25)
            .build(
                ListSource::Entities(RelationKind::Actor),
                &params(&[("sortBy", "tmdb_rating")]),
            )
            .unwrap();
        assert_eq!(actors.sort, SortField::Name);
        assert_eq!(actors.order, SortOrder::Ascending);
    }

    #[test]
    fn secondary_id_key_keeps_pages_stable() {
        let built = ListQuery::new(25)
            .build(ListSource::Shows, &params(&[("sortBy", "name"), ("order", "ASC")]))
            .unwrap();
        assert!(built.data.sql.contains(r#"ORDER BY "d"."name" ASC, "d"."id" ASC"#));
    }

    #[test]
    fn non_numeric_year_and_rating_are_rejected() {
        let query = ListQuery::new(25);
        assert!(matches!(
            query.build(ListSource::Shows, &params(&[("year", "twenty")])),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            query.build(ListSource::Shows, &params(&[("minRating", "NaN")])),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn bad_paging_uses_defaults() {
        let built = ListQuery::new(10)
            .build(ListSource::Shows, &params(&[("page", "-3"), ("pageSize", "abc")]))
            .unwrap();
        assert_eq!(built.page, 1);
        assert_eq!(built.page_size, 10);
    }

    #[test]
    fn oversized_paging_is_capped_to_bindable_bounds() {
        let built = ListQuery::new(10)
            .build(
                ListSource::Shows,
                &params(&[("page", "9223372036854775807"), ("pageSize", "18446744073709551615")]),
            )
            .unwrap();
        assert_eq!(built.page, MAX_BOUND);
        assert_eq!(built.page_size, MAX_BOUND);

        let data = values(&built.data);
        let bounds = &data[data.len() - 2..];
        assert_eq!(bounds[0], Value::from(MAX_BOUND));
        assert_eq!(bounds[1], Value::from(MAX_BOUND));
    }

    #[test]
    fn relation_filter_matches_single_entity_names() {
        let built = ListQuery::new(25)
            .build(ListSource::Shows, &params(&[("genre", "dra")]))
            .unwrap();
        assert!(built.count.sql.contains("EXISTS"));
        assert!(built.count.sql.contains(r#""genres" AS "fe""#));
        assert!(!built.count.sql.contains("genre_names"));
        assert_eq!(values(&built.count), vec![Value::from("%dra%".to_string())]);
    }

    #[test]
    fn entity_listing_ignores_show_filters() {
        let built = ListQuery::new(25)
            .build(
                ListSource::Entities(RelationKind::Network),
                &params(&[("search", "hb"), ("year", "not-a-year")]),
            )
            .unwrap();
        assert_eq!(values(&built.count).len(), 1);
        assert!(built.data.sql.contains(r#""e"."country""#));
    }

    #[test]
    fn scoped_listing_binds_entity_id_first() {
        let built = ListQuery::new(25)
            .build(
                ListSource::ShowsOf(RelationKind::Actor, EntityId::new(9)),
                &params(&[("name", "a")]),
            )
            .unwrap();
        assert_eq!(values(&built.count)[0], Value::from(9));
        assert!(built.data.sql.contains(r#""l"."character_name""#));
        assert!(built.data.sql.contains("INNER JOIN"));
    }
}
