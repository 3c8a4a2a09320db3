use sqlx::{PgPool, Postgres};

use super::{RepoError, RepoResult, Store, Transaction};

/// Postgres storage backed by a connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    #[tracing::instrument(name = "Begin database transaction", skip(self))]
    async fn begin(&self) -> RepoResult<Box<dyn Transaction>> {
        let tx = self.pool.begin().await?;

        Ok(Box::new(PgTransaction { tx }))
    }
}

/// Postgres transaction implementing every repository.
/// Rolled back by sqlx when dropped uncommitted.
pub struct PgTransaction {
    pub(super) tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl Transaction for PgTransaction {
    #[tracing::instrument(name = "Commit database transaction", skip(self))]
    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Map unique constraint violations to [`RepoError::UniqueViolation`]
pub(super) fn unique_violation(constraint: &'static str) -> impl FnOnce(sqlx::Error) -> RepoError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::UniqueViolation(constraint)
        }
        _ => RepoError::Database(e),
    }
}
