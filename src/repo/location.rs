use uuid::Uuid;

use super::{PgTransaction, RepoResult};
use crate::model::Location;

/// Location repository
#[async_trait::async_trait]
pub trait LocationRepo {
    /// Find a location by name, ignoring case
    async fn location_by_name(&mut self, name: &str) -> RepoResult<Option<Location>>;

    async fn location_by_id(&mut self, id: Uuid) -> RepoResult<Option<Location>>;

    /// Insert a location, or return the stored one if the name is taken
    async fn insert_location(&mut self, name: &str) -> RepoResult<Location>;
}

#[async_trait::async_trait]
impl LocationRepo for PgTransaction {
    #[tracing::instrument(name = "Fetch location by name", skip(self))]
    async fn location_by_name(&mut self, name: &str) -> RepoResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "select id, name from location where lower(name) = lower($1) order by name limit 1",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(location)
    }

    #[tracing::instrument(name = "Fetch location by id", skip(self))]
    async fn location_by_id(&mut self, id: Uuid) -> RepoResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>("select id, name from location where id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(location)
    }

    #[tracing::instrument(name = "Insert location", skip(self))]
    async fn insert_location(&mut self, name: &str) -> RepoResult<Location> {
        // The no-op update makes `returning` yield the existing row on conflict
        let location = sqlx::query_as::<_, Location>(
            "insert into location(id, name) values ($1, $2) \
             on conflict (name) do update set name = excluded.name \
             returning id, name",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(location)
    }
}
