use crate::db::query::{BuiltQuery, project_no_link_attributes};
use crate::domain::{CatalogError, RelationKind, ShowId};
use crate::entities::{prelude::*, tv_shows};
use crate::models::{ShowFields, ShowRow};
use sea_orm::sea_query::{Alias, Asterisk, Expr, Query};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, Statement,
};

/// Access to `tv_shows` and the `show_details` view.
///
/// Generic over the connection so the same statements run on the pool for
/// reads and on an open transaction inside a unit.
pub struct ShowRepository<'a, C> {
    conn: &'a C,
}

fn set<T: Into<sea_orm::Value>>(value: Option<T>) -> sea_orm::ActiveValue<T> {
    value.map_or(NotSet, Set)
}

impl<'a, C: ConnectionTrait> ShowRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn active_model(fields: ShowFields, now: &str) -> tv_shows::ActiveModel {
        tv_shows::ActiveModel {
            id: NotSet,
            name: set(fields.name),
            original_name: set(fields.original_name),
            first_air_date: set(fields.first_air_date),
            last_air_date: set(fields.last_air_date),
            number_of_seasons: set(fields.number_of_seasons),
            number_of_episodes: set(fields.number_of_episodes),
            status: set(fields.status),
            overview: set(fields.overview),
            popularity: set(fields.popularity),
            tmdb_rating: set(fields.tmdb_rating),
            vote_count: set(fields.vote_count),
            poster_url: set(fields.poster_url),
            backdrop_url: set(fields.backdrop_url),
            created_at: NotSet,
            updated_at: Set(now.to_string()),
        }
    }

    pub async fn exists(&self, id: ShowId) -> Result<bool, CatalogError> {
        Ok(TvShows::find_by_id(id.value())
            .one(self.conn)
            .await?
            .is_some())
    }

    pub async fn ensure_exists(&self, id: ShowId) -> Result<(), CatalogError> {
        if self.exists(id).await? {
            Ok(())
        } else {
            Err(CatalogError::not_found("Show", id))
        }
    }

    /// Inserts a show. Name, first air date and overview must be present.
    pub async fn insert(&self, fields: ShowFields) -> Result<ShowId, CatalogError> {
        if fields.name.is_none() || fields.first_air_date.is_none() || fields.overview.is_none() {
            return Err(CatalogError::validation(
                "name, first_air_date and overview are required",
            ));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let mut model = Self::active_model(fields, &now);
        model.created_at = Set(now);

        let result = TvShows::insert(model).exec(self.conn).await?;
        Ok(ShowId::new(result.last_insert_id))
    }

    /// Writes the present fields and bumps `updated_at`. This is always a
    /// write, so a unit starting with it takes the write lock up front.
    pub async fn update(&self, id: ShowId, fields: ShowFields) -> Result<(), CatalogError> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = TvShows::update_many()
            .set(Self::active_model(fields, &now))
            .filter(tv_shows::Column::Id.eq(id.value()))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(CatalogError::not_found("Show", id));
        }
        Ok(())
    }

    /// Deletes the show, then its links of every kind.
    pub async fn delete(&self, id: ShowId) -> Result<(), CatalogError> {
        let backend = self.conn.get_database_backend();

        let result = TvShows::delete_by_id(id.value()).exec(self.conn).await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::not_found("Show", id));
        }

        for kind in RelationKind::ALL {
            let delete = Query::delete()
                .from_table(Alias::new(kind.table().link_table))
                .and_where(Expr::col(Alias::new("show_id")).eq(id.value()))
                .to_owned();
            self.conn.execute(backend.build(&delete)).await?;
        }

        Ok(())
    }

    /// One row of the aggregate view.
    pub async fn find_row(&self, id: ShowId) -> Result<Option<ShowRow>, CatalogError> {
        let mut select = Query::select();
        select
            .column(Asterisk)
            .from(Alias::new("show_details"))
            .and_where(Expr::col(Alias::new("id")).eq(id.value()));
        project_no_link_attributes(&mut select);

        let stmt = self.conn.get_database_backend().build(&select);
        Ok(ShowRow::find_by_statement(stmt).one(self.conn).await?)
    }

    pub async fn page(&self, built: &BuiltQuery) -> Result<(Vec<ShowRow>, u64), CatalogError> {
        let total = count(self.conn, built.count.clone()).await?;
        let rows = ShowRow::find_by_statement(built.data.clone())
            .all(self.conn)
            .await?;
        Ok((rows, total))
    }
}

/// Runs a `COUNT(*) AS total` statement.
pub async fn count<C: ConnectionTrait>(conn: &C, stmt: Statement) -> Result<u64, CatalogError> {
    let total: i64 = match conn.query_one(stmt).await? {
        Some(row) => row.try_get("", "total")?,
        None => 0,
    };
    Ok(u64::try_from(total).unwrap_or_default())
}
