use sea_orm_migration::prelude::*;

mod m20250101_catalog_schema;
mod m20250102_show_details_view;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_catalog_schema::Migration),
            Box::new(m20250102_show_details_view::Migration),
        ]
    }
}
