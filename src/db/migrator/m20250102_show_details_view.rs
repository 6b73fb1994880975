use crate::domain::{RelationKind, RelationTable};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Correlated subquery flattening one kind's linked names into a `", "`
/// delimited list, ordered by rank then insertion.
fn summary_column(relation: &RelationTable) -> String {
    let order = if relation.ranked {
        "l.display_order, l.rowid"
    } else {
        "l.rowid"
    };

    format!(
        "(SELECT group_concat(e.name, ', ' ORDER BY {order}) \
         FROM {link} AS l JOIN {table} AS e ON e.id = l.{fk} \
         WHERE l.show_id = s.id) AS {column}",
        link = relation.link_table,
        table = relation.table,
        fk = relation.link_fk,
        column = relation.summary_column,
    )
}

pub(crate) fn create_view_sql() -> String {
    let summaries = RelationKind::ALL
        .into_iter()
        .map(|kind| summary_column(kind.table()))
        .collect::<Vec<_>>()
        .join(",\n    ");

    format!("CREATE VIEW IF NOT EXISTS show_details AS\nSELECT s.*,\n    {summaries}\nFROM tv_shows AS s")
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&create_view_sql())
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP VIEW IF EXISTS show_details")
            .await?;
        Ok(())
    }
}
