use crate::db::query::BuiltQuery;
use crate::db::repositories::show::{ShowRepository, count};
use crate::domain::{CatalogError, EntityId, RelationKind, RelationTable, ShowId};
use crate::models::{EntityInput, LinkedEntity, RelationEntity, RelationEntry};
use metrics::counter;
use sea_orm::sea_query::{
    Alias, Expr, JoinType, OnConflict, Order, Query, SelectStatement, SimpleExpr,
};
use sea_orm::{ConnectionTrait, DbErr, QueryResult, Statement, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Entity tables and link tables of one relation kind.
///
/// Every identifier in the statements below comes from the kind's
/// [`RelationTable`] descriptor; names and attributes are always bound.
pub struct RelationRepository<'a, C> {
    conn: &'a C,
    kind: RelationKind,
}

impl<'a, C: ConnectionTrait> RelationRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C, kind: RelationKind) -> Self {
        Self { conn, kind }
    }

    const fn table(&self) -> &'static RelationTable {
        self.kind.table()
    }

    fn build<S: sea_orm::StatementBuilder>(&self, stmt: &S) -> Statement {
        self.conn.get_database_backend().build(stmt)
    }

    /// Id of the entity called `name`, creating it when absent.
    ///
    /// Insert-or-ignore followed by a read-back on the same connection, so two
    /// callers racing on a new name converge on the same row.
    pub async fn resolve(&self, name: &str) -> Result<EntityId, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::validation(format!(
                "{} name must not be empty",
                self.kind.label()
            )));
        }

        let table = self.table();
        let insert = Query::insert()
            .into_table(Alias::new(table.table))
            .columns([Alias::new("name")])
            .values_panic([name.into()])
            .on_conflict(OnConflict::column(Alias::new("name")).do_nothing().to_owned())
            .to_owned();
        let inserted = self.conn.execute(self.build(&insert)).await?.rows_affected() > 0;

        if inserted {
            counter!("catalog_entities_created_total", "kind" => table.table).increment(1);
            debug!(kind = table.table, name, "Created entity");
        }

        let select = Query::select()
            .column(Alias::new("id"))
            .from(Alias::new(table.table))
            .and_where(Expr::col(Alias::new("name")).eq(name))
            .to_owned();

        match self.conn.query_one(self.build(&select)).await? {
            Some(row) => Ok(EntityId::new(row.try_get("", "id")?)),
            None => Err(CatalogError::conflict(format!(
                "{} '{name}' could not be resolved",
                self.kind.label()
            ))),
        }
    }

    /// Replaces the show's links of this kind with `entries`, in order.
    ///
    /// Repeated names keep their first occurrence. Ranked kinds store the
    /// 1-based input position as `display_order`.
    pub async fn sync(
        &self,
        show_id: ShowId,
        entries: &[RelationEntry],
    ) -> Result<Vec<LinkedEntity>, CatalogError> {
        ShowRepository::new(self.conn).ensure_exists(show_id).await?;

        let delete = Query::delete()
            .from_table(Alias::new(self.table().link_table))
            .and_where(Expr::col(Alias::new("show_id")).eq(show_id.value()))
            .to_owned();
        self.conn.execute(self.build(&delete)).await?;

        let mut seen = HashSet::new();
        let mut position = 0;
        for entry in entries {
            if !seen.insert(entry.name.trim().to_string()) {
                continue;
            }
            let entity_id = self.resolve(&entry.name).await?;
            position += 1;
            self.insert_link(show_id, entity_id, entry, position).await?;
        }

        debug!(
            show_id = show_id.value(),
            kind = self.table().table,
            links = position,
            "Synchronized links"
        );

        self.linked(show_id).await
    }

    async fn insert_link(
        &self,
        show_id: ShowId,
        entity_id: EntityId,
        entry: &RelationEntry,
        display_order: i32,
    ) -> Result<(), CatalogError> {
        let table = self.table();

        let mut columns = vec![Alias::new("show_id"), Alias::new(table.link_fk)];
        let mut values: Vec<SimpleExpr> = vec![show_id.value().into(), entity_id.value().into()];
        if table.has_character {
            columns.push(Alias::new("character_name"));
            values.push(
                entry
                    .character_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .into(),
            );
        }
        if table.ranked {
            columns.push(Alias::new("display_order"));
            values.push(display_order.into());
        }
        columns.push(Alias::new("created_at"));
        values.push(chrono::Utc::now().to_rfc3339().into());

        let insert = Query::insert()
            .into_table(Alias::new(table.link_table))
            .columns(columns)
            .values_panic(values)
            .to_owned();

        self.conn
            .execute(self.build(&insert))
            .await
            .map_err(|e| {
                CatalogError::unique_or_db(
                    e,
                    format!(
                        "{} '{}' is already linked to show {show_id}",
                        self.kind.label(),
                        entry.name.trim()
                    ),
                )
            })?;
        Ok(())
    }

    async fn is_linked(&self, show_id: ShowId, entity_id: EntityId) -> Result<bool, CatalogError> {
        let select = Query::select()
            .expr(Expr::val(1))
            .from(Alias::new(self.table().link_table))
            .and_where(Expr::col(Alias::new("show_id")).eq(show_id.value()))
            .and_where(Expr::col(Alias::new(self.table().link_fk)).eq(entity_id.value()))
            .to_owned();
        Ok(self.conn.query_one(self.build(&select)).await?.is_some())
    }

    /// Adds one link, resolving the entity by name. Ranked kinds append after
    /// the current last rank unless the entry carries its own.
    pub async fn link(
        &self,
        show_id: ShowId,
        entry: &RelationEntry,
    ) -> Result<LinkedEntity, CatalogError> {
        let entity_id = self.resolve(&entry.name).await?;
        ShowRepository::new(self.conn).ensure_exists(show_id).await?;

        if self.is_linked(show_id, entity_id).await? {
            return Err(CatalogError::conflict(format!(
                "{} '{}' is already linked to show {show_id}",
                self.kind.label(),
                entry.name.trim()
            )));
        }

        let display_order = match entry.display_order {
            Some(order) => order,
            None if self.table().ranked => self.max_rank(show_id).await? + 1,
            None => 0,
        };
        self.insert_link(show_id, entity_id, entry, display_order)
            .await?;

        self.linked(show_id)
            .await?
            .into_iter()
            .find(|linked| linked.id == entity_id)
            .ok_or_else(|| CatalogError::not_found("Link", format!("{show_id}/{entity_id}")))
    }

    async fn max_rank(&self, show_id: ShowId) -> Result<i32, CatalogError> {
        let select = Query::select()
            .expr_as(
                Expr::cust("COALESCE(MAX(display_order), 0)"),
                Alias::new("max_rank"),
            )
            .from(Alias::new(self.table().link_table))
            .and_where(Expr::col(Alias::new("show_id")).eq(show_id.value()))
            .to_owned();

        Ok(match self.conn.query_one(self.build(&select)).await? {
            Some(row) => row.try_get("", "max_rank")?,
            None => 0,
        })
    }

    /// Removes one link; the entity itself stays.
    pub async fn unlink(&self, show_id: ShowId, entity_id: EntityId) -> Result<(), CatalogError> {
        let delete = Query::delete()
            .from_table(Alias::new(self.table().link_table))
            .and_where(Expr::col(Alias::new("show_id")).eq(show_id.value()))
            .and_where(Expr::col(Alias::new(self.table().link_fk)).eq(entity_id.value()))
            .to_owned();

        let result = self.conn.execute(self.build(&delete)).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found(
                "Link",
                format!("{show_id}/{}/{entity_id}", self.kind),
            ));
        }
        Ok(())
    }

    /// The show's links of this kind, by rank then insertion.
    pub async fn linked(&self, show_id: ShowId) -> Result<Vec<LinkedEntity>, CatalogError> {
        let table = self.table();
        let link = Alias::new("l");
        let entity = Alias::new("e");

        let mut select = Query::select();
        select
            .column((entity.clone(), Alias::new("id")))
            .column((entity.clone(), Alias::new("name")));
        for attribute in table.attributes {
            select.column((entity.clone(), Alias::new(*attribute)));
        }
        if table.has_character {
            select.column((link.clone(), Alias::new("character_name")));
        }
        if table.ranked {
            select.column((link.clone(), Alias::new("display_order")));
        }
        select
            .from_as(Alias::new(table.link_table), link.clone())
            .join_as(
                JoinType::InnerJoin,
                Alias::new(table.table),
                entity.clone(),
                Expr::col((entity, Alias::new("id"))).equals((link.clone(), Alias::new(table.link_fk))),
            )
            .and_where(Expr::col((link.clone(), Alias::new("show_id"))).eq(show_id.value()));
        if table.ranked {
            select.order_by((link, Alias::new("display_order")), Order::Asc);
        }
        select.order_by_expr(Expr::cust("l.rowid"), Order::Asc);

        let rows = self.conn.query_all(self.build(&select)).await?;
        rows.iter().map(|row| self.linked_from_row(row)).collect()
    }

    fn attributes_from_row(
        &self,
        row: &QueryResult,
    ) -> Result<BTreeMap<String, Option<String>>, CatalogError> {
        self.table()
            .attributes
            .iter()
            .map(|attribute| Ok(((*attribute).to_string(), row.try_get("", attribute)?)))
            .collect()
    }

    fn entity_from_row(&self, row: &QueryResult) -> Result<RelationEntity, CatalogError> {
        Ok(RelationEntity {
            id: EntityId::new(row.try_get("", "id")?),
            name: row.try_get("", "name")?,
            attributes: self.attributes_from_row(row)?,
        })
    }

    fn linked_from_row(&self, row: &QueryResult) -> Result<LinkedEntity, CatalogError> {
        let table = self.table();
        Ok(LinkedEntity {
            id: EntityId::new(row.try_get("", "id")?),
            name: row.try_get("", "name")?,
            character_name: if table.has_character {
                row.try_get("", "character_name")?
            } else {
                None
            },
            display_order: if table.ranked {
                row.try_get("", "display_order")?
            } else {
                None
            },
            attributes: self.attributes_from_row(row)?,
        })
    }

    fn entity_select(&self) -> SelectStatement {
        let table = self.table();
        let mut select = Query::select();
        select
            .column(Alias::new("id"))
            .column(Alias::new("name"));
        for attribute in table.attributes {
            select.column(Alias::new(*attribute));
        }
        select.from(Alias::new(table.table));
        select
    }

    /// Checks attribute keys against the kind's columns and trims values.
    fn checked_attributes(
        &self,
        attributes: BTreeMap<String, Option<String>>,
    ) -> Result<Vec<(&'static str, Option<String>)>, CatalogError> {
        attributes
            .into_iter()
            .map(|(key, value)| {
                let column = self
                    .table()
                    .attributes
                    .iter()
                    .find(|attribute| **attribute == key)
                    .ok_or_else(|| {
                        CatalogError::validation(format!(
                            "Unknown field '{key}' for {}",
                            self.kind
                        ))
                    })?;
                let value = value
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty());
                Ok((*column, value))
            })
            .collect()
    }

    fn checked_name(&self, name: Option<String>) -> Result<Option<String>, CatalogError> {
        match name.map(|n| n.trim().to_string()) {
            Some(n) if n.is_empty() => Err(CatalogError::validation(format!(
                "{} name must not be empty",
                self.kind.label()
            ))),
            other => Ok(other),
        }
    }

    pub async fn get(&self, id: EntityId) -> Result<Option<RelationEntity>, CatalogError> {
        let mut select = self.entity_select();
        select.and_where(Expr::col(Alias::new("id")).eq(id.value()));

        self.conn
            .query_one(self.build(&select))
            .await?
            .map(|row| self.entity_from_row(&row))
            .transpose()
    }

    /// Explicit create; a taken name is a conflict rather than a lookup.
    pub async fn create(&self, input: EntityInput) -> Result<RelationEntity, CatalogError> {
        let name = self.checked_name(input.name)?.ok_or_else(|| {
            CatalogError::validation(format!("{} name is required", self.kind.label()))
        })?;
        let attributes = self.checked_attributes(input.attributes)?;

        let mut columns = vec![Alias::new("name")];
        let mut values: Vec<SimpleExpr> = vec![name.clone().into()];
        for (column, value) in attributes {
            columns.push(Alias::new(column));
            values.push(value.into());
        }

        let insert = Query::insert()
            .into_table(Alias::new(self.table().table))
            .columns(columns)
            .values_panic(values)
            .to_owned();

        let result = self
            .conn
            .execute(self.build(&insert))
            .await
            .map_err(|e| {
                CatalogError::unique_or_db(
                    e,
                    format!("{} '{name}' already exists", self.kind.label()),
                )
            })?;

        counter!("catalog_entities_created_total", "kind" => self.table().table).increment(1);
        let id = inserted_id(result.last_insert_id())?;
        self.get(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(self.kind.label(), id))
    }

    /// Renames the entity and/or rewrites attributes. Links are untouched.
    pub async fn update(
        &self,
        id: EntityId,
        input: EntityInput,
    ) -> Result<RelationEntity, CatalogError> {
        let name = self.checked_name(input.name)?;
        let attributes = self.checked_attributes(input.attributes)?;

        let mut values: Vec<(Alias, SimpleExpr)> = Vec::new();
        if let Some(name) = &name {
            values.push((Alias::new("name"), name.clone().into()));
        }
        for (column, value) in attributes {
            values.push((Alias::new(column), Value::from(value).into()));
        }
        if values.is_empty() {
            return Err(CatalogError::validation(
                "At least one field must be provided",
            ));
        }

        let update = Query::update()
            .table(Alias::new(self.table().table))
            .values(values)
            .and_where(Expr::col(Alias::new("id")).eq(id.value()))
            .to_owned();

        let result = self
            .conn
            .execute(self.build(&update))
            .await
            .map_err(|e| {
                CatalogError::unique_or_db(
                    e,
                    format!(
                        "{} '{}' already exists",
                        self.kind.label(),
                        name.as_deref().unwrap_or_default()
                    ),
                )
            })?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found(self.kind.label(), id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(self.kind.label(), id))
    }

    pub async fn page(
        &self,
        built: &BuiltQuery,
    ) -> Result<(Vec<RelationEntity>, u64), CatalogError> {
        let total = count(self.conn, built.count.clone()).await?;
        let rows = self.conn.query_all(built.data.clone()).await?;
        let entities = rows
            .iter()
            .map(|row| self.entity_from_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((entities, total))
    }
}

/// Row id reported by an insert, as an [`EntityId`].
fn inserted_id(last_insert_id: u64) -> Result<EntityId, CatalogError> {
    i32::try_from(last_insert_id)
        .map(EntityId::new)
        .map_err(|_| {
            CatalogError::Database(DbErr::Custom(format!(
                "inserted row id {last_insert_id} is out of range"
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_id_rejects_out_of_range_row_ids() {
        assert_eq!(inserted_id(7).unwrap(), EntityId::new(7));

        let err = inserted_id(u64::from(u32::MAX)).unwrap_err();
        assert!(matches!(err, CatalogError::Database(_)));
        assert_eq!(err.kind(), "internal_error");
    }
}
