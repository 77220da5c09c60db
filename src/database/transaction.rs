use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;

use sqlx::{PgPool, Postgres, Transaction};

#[derive(Debug)]
pub struct DatabaseTransaction;

impl DatabaseTransaction {
    /// Run a closure inside a transaction. Commits on `Ok`, rolls back on `Err`.
    pub async fn run<T, E, F>(pool: &PgPool, f: F) -> Result<T, E>
    where
        F: for<'a> FnOnce(
            &'a mut Transaction<'static, Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>,
        T: Send,
        E: From<sqlx::Error> + Display,
    {
        let mut tx = pool.begin().await.map_err(E::from)?;

        match f(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(E::from)?;
                Ok(value)
            }
            Err(err) => {
                log::warn!("Transaction failed with error: {}, rolling back", err);
                if let Err(rollback_err) = tx.rollback().await {
                    log::error!(
                        "Rollback failed after error (orig: {}, rollback: {})",
                        err,
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }
}
