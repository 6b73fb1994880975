pub mod assembler;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::CatalogService;
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthResult, AuthService, Registration};
pub use auth_service_impl::SeaOrmAuthService;
