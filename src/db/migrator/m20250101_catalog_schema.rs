use crate::domain::{RelationKind, RelationTable};
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn entity_table(relation: &RelationTable) -> TableCreateStatement {
    let mut table = Table::create();
    table
        .table(Alias::new(relation.table))
        .if_not_exists()
        .col(
            ColumnDef::new(Alias::new("id"))
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Alias::new("name"))
                .string()
                .not_null()
                .unique_key(),
        );

    for attribute in relation.attributes {
        table.col(ColumnDef::new(Alias::new(*attribute)).string().null());
    }

    table.to_owned()
}

fn link_table(relation: &RelationTable) -> TableCreateStatement {
    let link = Alias::new(relation.link_table);
    let mut table = Table::create();
    table
        .table(link.clone())
        .if_not_exists()
        .col(ColumnDef::new(Alias::new("show_id")).integer().not_null())
        .col(ColumnDef::new(Alias::new(relation.link_fk)).integer().not_null());

    if relation.has_character {
        table.col(ColumnDef::new(Alias::new("character_name")).string().null());
    }
    if relation.ranked {
        table.col(ColumnDef::new(Alias::new("display_order")).integer().null());
    }

    table
        .col(ColumnDef::new(Alias::new("created_at")).string().not_null())
        .primary_key(
            Index::create()
                .col(Alias::new("show_id"))
                .col(Alias::new(relation.link_fk)),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_show_id", relation.link_table))
                .from(link.clone(), Alias::new("show_id"))
                .to(TvShows, Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_{}", relation.link_table, relation.link_fk))
                .from(link, Alias::new(relation.link_fk))
                .to(Alias::new(relation.table), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(TvShows)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        for kind in RelationKind::ALL {
            let relation = kind.table();

            manager.create_table(entity_table(relation)).await?;
            manager.create_table(link_table(relation)).await?;

            // Reverse lookups ("shows of X") walk the link table by entity.
            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{}_{}", relation.link_table, relation.link_fk))
                        .table(Alias::new(relation.link_table))
                        .col(Alias::new(relation.link_fk))
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_tv_shows_first_air_date")
                    .table(TvShows)
                    .col(crate::entities::tv_shows::Column::FirstAirDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        for kind in RelationKind::ALL {
            let relation = kind.table();
            manager
                .drop_table(Table::drop().table(Alias::new(relation.link_table)).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Alias::new(relation.table)).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(TvShows).to_owned())
            .await
    }
}
