use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::GeneralConfig;
use crate::domain::RelationKind;

pub mod migrator;
pub mod query;
pub mod repositories;
pub mod transaction;

pub use query::{BuiltQuery, FilterKey, ListParams, ListQuery, ListSource, SortField};
pub use repositories::relation::RelationRepository;
pub use repositories::show::ShowRepository;
pub use repositories::user::{NewUser, User};
pub use transaction::{TransactionCoordinator, UnitFuture};

/// Owner of the connection pool.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

/// Filesystem path behind a sqlx SQLite URL, if it names a file.
fn sqlite_file(db_url: &str) -> Option<&str> {
    if db_url.contains(":memory:") {
        return None;
    }
    let path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    (!path.is_empty()).then_some(path)
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, &GeneralConfig::default()).await
    }

    pub async fn with_pool_options(db_url: &str, general: &GeneralConfig) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path_str) = sqlite_file(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(general.max_db_connections)
            .min_connections(general.min_db_connections)
            .connect_timeout(Duration::from_secs(general.db_connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(general.db_acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            general.min_db_connections, general.max_db_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn coordinator(&self) -> TransactionCoordinator {
        TransactionCoordinator::new(self.conn.clone())
    }

    #[must_use]
    pub const fn shows(&self) -> ShowRepository<'_, DatabaseConnection> {
        ShowRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn relations(&self, kind: RelationKind) -> RelationRepository<'_, DatabaseConnection> {
        RelationRepository::new(&self.conn, kind)
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_file_paths() {
        assert_eq!(sqlite_file("sqlite:data/app.db"), Some("data/app.db"));
        assert_eq!(sqlite_file("sqlite:///tmp/a.db?mode=rwc"), Some("/tmp/a.db"));
        assert_eq!(sqlite_file("sqlite::memory:"), None);
    }
}
