use crate::domain::CatalogError;
use metrics::counter;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// Future returned by a unit body. It borrows the transaction it runs on.
pub type UnitFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'c>>;

/// Runs multi-statement writes on exactly one transactional connection.
///
/// The body receives the transaction, never the pool, so every statement of
/// a unit shares the same connection. Dropping the unit future before it
/// completes drops the transaction, which rolls back.
#[derive(Clone)]
pub struct TransactionCoordinator {
    conn: DatabaseConnection,
}

impl TransactionCoordinator {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Commits when `body` returns `Ok`, rolls back and returns the error
    /// otherwise.
    pub async fn run_unit<F, T>(&self, unit: &'static str, body: F) -> Result<T, CatalogError>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> UnitFuture<'c, T> + Send,
        T: Send,
    {
        let txn = self.conn.begin().await?;

        let result = body(&txn).await;

        match result {
            Ok(value) => {
                txn.commit().await?;
                counter!("catalog_units_total", "outcome" => "committed").increment(1);
                debug!(unit, "Unit committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(unit, error = %rollback_err, "Rollback failed");
                }
                counter!("catalog_units_total", "outcome" => "rolled_back").increment(1);
                debug!(unit, error = %err, "Unit rolled back");
                Err(err)
            }
        }
    }
}
