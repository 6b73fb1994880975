pub mod page;
pub mod relation;
pub mod show;

pub use page::Page;
pub use relation::{EntityInput, EntityShows, LinkedEntity, RelationEntity, RelationEntry};
pub use show::{ShowChanges, ShowFields, ShowInput, ShowRow, ShowView, WriteMode};
