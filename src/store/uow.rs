/// Unit of Work
///
/// Wraps one database transaction. `commit` consumes the value, so a
/// request can commit at most once; dropping without commit rolls back
/// and returns the connection to the pool.

use sqlx::{PgPool, Postgres, Transaction};

use crate::error::StoreError;
use crate::store::users::UserStore;

pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    /// Open a transaction on a pooled connection
    ///
    /// # Errors
    /// Returns error if no connection can be acquired
    pub async fn begin(pool: &PgPool) -> Result<Self, StoreError> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    /// User records staged on this transaction
    pub fn users(&mut self) -> UserStore<'_> {
        UserStore::new(&mut self.tx)
    }

    /// Make all staged changes durable
    ///
    /// # Errors
    /// Returns error if the database rejects the commit
    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
