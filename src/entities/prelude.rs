pub use super::tv_shows::Entity as TvShows;
pub use super::users::Entity as Users;
