//! Domain service for the show catalog.
//!
//! Handlers talk to this trait only; every multi-statement write behind it
//! runs inside one transactional unit.

use crate::db::ListParams;
use crate::domain::{CatalogError, EntityId, RelationKind, ShowId};
use crate::models::{
    EntityInput, EntityShows, LinkedEntity, Page, RelationEntity, RelationEntry, ShowInput,
    ShowView, WriteMode,
};

/// Catalog operations over shows and their related entities.
///
/// # Examples
///
/// ```rust,ignore
/// use tvcatalog::services::CatalogService;
/// use tvcatalog::domain::ShowId;
/// use std::sync::Arc;
///
/// async fn example(service: Arc<dyn CatalogService>) -> Result<(), tvcatalog::domain::CatalogError> {
///     let show = service.get_show(ShowId::new(1)).await?;
///     println!("{}", show.name);
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Filtered, sorted page of shows.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] for a non-numeric `year` or
    /// `minRating`.
    async fn list_shows(&self, params: &ListParams) -> Result<Page<ShowView>, CatalogError>;

    /// One show with its summaries and ordered links.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the show does not exist.
    async fn get_show(&self, id: ShowId) -> Result<ShowView, CatalogError>;

    /// Creates a show and synchronizes any relation lists in one unit.
    async fn create_show(&self, input: ShowInput) -> Result<ShowView, CatalogError>;

    /// Patches or replaces a show's fields and synchronizes the relation
    /// lists present in `input`, all in one unit.
    ///
    /// # Errors
    ///
    /// - Returns [`CatalogError::NotFound`] if the show does not exist
    /// - Returns [`CatalogError::Validation`] for invalid fields
    /// - Returns [`CatalogError::Database`] after rolling back on a store failure
    async fn update_show(
        &self,
        id: ShowId,
        input: ShowInput,
        mode: WriteMode,
    ) -> Result<ShowView, CatalogError>;

    /// Deletes a show and all of its links.
    async fn delete_show(&self, id: ShowId) -> Result<(), CatalogError>;

    async fn show_links(
        &self,
        id: ShowId,
        kind: RelationKind,
    ) -> Result<Vec<LinkedEntity>, CatalogError>;

    /// Links one entity, creating it by name if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Conflict`] if the entity is already linked.
    async fn link_entity(
        &self,
        id: ShowId,
        kind: RelationKind,
        entry: RelationEntry,
    ) -> Result<LinkedEntity, CatalogError>;

    async fn unlink_entity(
        &self,
        id: ShowId,
        kind: RelationKind,
        entity_id: EntityId,
    ) -> Result<(), CatalogError>;

    async fn list_entities(
        &self,
        kind: RelationKind,
        params: &ListParams,
    ) -> Result<Page<RelationEntity>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Conflict`] if the name is taken.
    async fn create_entity(
        &self,
        kind: RelationKind,
        input: EntityInput,
    ) -> Result<RelationEntity, CatalogError>;

    async fn get_entity(
        &self,
        kind: RelationKind,
        id: EntityId,
    ) -> Result<RelationEntity, CatalogError>;

    async fn update_entity(
        &self,
        kind: RelationKind,
        id: EntityId,
        input: EntityInput,
    ) -> Result<RelationEntity, CatalogError>;

    /// Shows linked to one entity, with the same filters as [`Self::list_shows`].
    async fn shows_of_entity(
        &self,
        kind: RelationKind,
        id: EntityId,
        params: &ListParams,
    ) -> Result<EntityShows, CatalogError>;
}
