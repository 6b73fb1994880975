//! `SeaORM` implementation of the `CatalogService` trait.

use crate::db::{ListParams, ListQuery, ListSource, RelationRepository, ShowRepository, Store};
use crate::domain::{CatalogError, EntityId, RelationKind, ShowId};
use crate::models::{
    EntityInput, EntityShows, LinkedEntity, Page, RelationEntity, RelationEntry, ShowInput,
    ShowView, WriteMode,
};
use crate::services::assembler::{assemble, assemble_detail};
use crate::services::catalog_service::CatalogService;
use async_trait::async_trait;
use futures::future::try_join_all;
use sea_orm::DatabaseTransaction;
use tracing::info;

pub struct SeaOrmCatalogService {
    store: Store,
    query: ListQuery,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store, default_page_size: u64) -> Self {
        Self {
            store,
            query: ListQuery::new(default_page_size),
        }
    }

    async fn read_show(&self, id: ShowId) -> Result<ShowView, CatalogError> {
        let row = self
            .store
            .shows()
            .find_row(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Show", id))?;

        let store = &self.store;
        let links = try_join_all(RelationKind::ALL.into_iter().map(|kind| async move {
            store
                .relations(kind)
                .linked(id)
                .await
                .map(|linked| (kind, linked))
        }))
        .await?;

        Ok(assemble_detail(row, links))
    }

    async fn show_page(
        &self,
        source: ListSource,
        params: &ListParams,
    ) -> Result<Page<ShowView>, CatalogError> {
        let built = self.query.build(source, params)?;
        let (rows, total) = self.store.shows().page(&built).await?;
        Ok(Page::new(rows, total, built.page, built.page_size).map(assemble))
    }
}

/// Replaces the links of every kind present in `relations`.
async fn sync_relations(
    txn: &DatabaseTransaction,
    id: ShowId,
    relations: &[(RelationKind, Vec<RelationEntry>)],
) -> Result<(), CatalogError> {
    for (kind, entries) in relations {
        RelationRepository::new(txn, *kind).sync(id, entries).await?;
    }
    Ok(())
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_shows(&self, params: &ListParams) -> Result<Page<ShowView>, CatalogError> {
        self.show_page(ListSource::Shows, params).await
    }

    async fn get_show(&self, id: ShowId) -> Result<ShowView, CatalogError> {
        self.read_show(id).await
    }

    async fn create_show(&self, input: ShowInput) -> Result<ShowView, CatalogError> {
        let changes = input.into_changes(WriteMode::Create)?;

        let id = self
            .store
            .coordinator()
            .run_unit("create_show", move |txn| {
                Box::pin(async move {
                    let id = ShowRepository::new(txn).insert(changes.fields).await?;
                    sync_relations(txn, id, &changes.relations).await?;
                    Ok(id)
                })
            })
            .await?;

        info!(show_id = id.value(), "Created show");
        self.read_show(id).await
    }

    async fn update_show(
        &self,
        id: ShowId,
        input: ShowInput,
        mode: WriteMode,
    ) -> Result<ShowView, CatalogError> {
        let changes = input.into_changes(mode)?;

        self.store
            .coordinator()
            .run_unit("update_show", move |txn| {
                Box::pin(async move {
                    ShowRepository::new(txn).update(id, changes.fields).await?;
                    sync_relations(txn, id, &changes.relations).await
                })
            })
            .await?;

        info!(show_id = id.value(), ?mode, "Updated show");
        self.read_show(id).await
    }

    async fn delete_show(&self, id: ShowId) -> Result<(), CatalogError> {
        self.store
            .coordinator()
            .run_unit("delete_show", move |txn| {
                Box::pin(async move { ShowRepository::new(txn).delete(id).await })
            })
            .await?;

        info!(show_id = id.value(), "Deleted show");
        Ok(())
    }

    async fn show_links(
        &self,
        id: ShowId,
        kind: RelationKind,
    ) -> Result<Vec<LinkedEntity>, CatalogError> {
        self.store.shows().ensure_exists(id).await?;
        self.store.relations(kind).linked(id).await
    }

    async fn link_entity(
        &self,
        id: ShowId,
        kind: RelationKind,
        entry: RelationEntry,
    ) -> Result<LinkedEntity, CatalogError> {
        let linked = self
            .store
            .coordinator()
            .run_unit("link_entity", move |txn| {
                Box::pin(async move { RelationRepository::new(txn, kind).link(id, &entry).await })
            })
            .await?;

        info!(show_id = id.value(), kind = %kind, entity_id = linked.id.value(), "Linked entity");
        Ok(linked)
    }

    async fn unlink_entity(
        &self,
        id: ShowId,
        kind: RelationKind,
        entity_id: EntityId,
    ) -> Result<(), CatalogError> {
        self.store.relations(kind).unlink(id, entity_id).await?;
        info!(show_id = id.value(), kind = %kind, entity_id = entity_id.value(), "Unlinked entity");
        Ok(())
    }

    async fn list_entities(
        &self,
        kind: RelationKind,
        params: &ListParams,
    ) -> Result<Page<RelationEntity>, CatalogError> {
        let built = self.query.build(ListSource::Entities(kind), params)?;
        let (entities, total) = self.store.relations(kind).page(&built).await?;
        Ok(Page::new(entities, total, built.page, built.page_size))
    }

    async fn create_entity(
        &self,
        kind: RelationKind,
        input: EntityInput,
    ) -> Result<RelationEntity, CatalogError> {
        let entity = self.store.relations(kind).create(input).await?;
        info!(kind = %kind, entity_id = entity.id.value(), name = %entity.name, "Created entity");
        Ok(entity)
    }

    async fn get_entity(
        &self,
        kind: RelationKind,
        id: EntityId,
    ) -> Result<RelationEntity, CatalogError> {
        self.store
            .relations(kind)
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(kind.label(), id))
    }

    async fn update_entity(
        &self,
        kind: RelationKind,
        id: EntityId,
        input: EntityInput,
    ) -> Result<RelationEntity, CatalogError> {
        self.store.relations(kind).update(id, input).await
    }

    async fn shows_of_entity(
        &self,
        kind: RelationKind,
        id: EntityId,
        params: &ListParams,
    ) -> Result<EntityShows, CatalogError> {
        let entity = self.get_entity(kind, id).await?;
        let page = self.show_page(ListSource::ShowsOf(kind, id), params).await?;
        Ok(EntityShows { entity, page })
    }
}
