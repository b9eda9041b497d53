//! Network entity model.
//!
//! Networks belong to exactly one owning user. The reconciliation core
//! reads them to enumerate a user's networks; it never creates or
//! deletes them.

use chrono::{DateTime, Utc};
use meshwork_core::UserId;
use sqlx::FromRow;

/// A controller network known to the admin application.
#[derive(Debug, Clone, FromRow)]
pub struct Network {
    /// Controller-issued network identity (opaque key).
    pub nwid: String,

    /// The user who owns this network.
    pub owner_id: uuid::Uuid,

    /// Display name, when set.
    pub name: Option<String>,

    /// When the network was registered.
    pub created_at: DateTime<Utc>,
}

impl Network {
    /// Get the owner ID as a typed `UserId`.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        UserId::from_uuid(self.owner_id)
    }

    /// Find all networks owned by a user.
    pub async fn find_by_owner(
        pool: &sqlx::PgPool,
        owner_id: uuid::Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM networks WHERE owner_id = $1 ORDER BY created_at")
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }
}
