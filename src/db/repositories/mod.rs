pub mod relation;
pub mod show;
pub mod user;
