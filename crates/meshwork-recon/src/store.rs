//! Reconciliation store.
//!
//! The persistence seam the jobs depend on, plus its PostgreSQL
//! implementation over the `meshwork-db` query functions. Tests substitute
//! an in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use meshwork_core::{NetworkId, UserId, UserRole};
use meshwork_db::models;
use meshwork_db::DbPool;

use crate::enrich::EnrichedMember;
use crate::error::StoreError;

/// An account as the reconciliation jobs see it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A network owned by one user.
#[derive(Debug, Clone)]
pub struct Network {
    pub nwid: NetworkId,
    pub owner: UserId,
    pub name: Option<String>,
}

/// Persistence operations used by the reconciliation jobs.
#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    /// Users whose `expires_at` is strictly before `now`, still active,
    /// role not ADMIN.
    ///
    /// The ADMIN exclusion is part of this contract: implementations never
    /// return an ADMIN account, and the sweep does not re-check.
    async fn find_expired_active_users(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<User>, StoreError>;

    /// All active users.
    async fn find_active_users(&self) -> Result<Vec<User>, StoreError>;

    /// Networks owned by `owner`.
    async fn find_networks_by_owner(&self, owner: UserId) -> Result<Vec<Network>, StoreError>;

    /// Set a user's active flag.
    async fn set_user_active(&self, user: UserId, active: bool) -> Result<(), StoreError>;

    /// Insert or update one member row keyed by `(node_id, nwid)`.
    ///
    /// Upsert-only by contract: no store operation deletes member rows.
    async fn upsert_member(&self, member: &EnrichedMember) -> Result<(), StoreError>;
}

/// [`ReconciliationStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgReconciliationStore {
    pool: DbPool,
}

impl PgReconciliationStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_user(row: models::User) -> User {
    User {
        id: row.user_id(),
        role: row.user_role(),
        email: row.email,
        is_active: row.is_active,
        expires_at: row.expires_at,
    }
}

fn map_network(row: models::Network) -> Result<Network, StoreError> {
    let owner = row.owner_id();
    let nwid = NetworkId::new(row.nwid).map_err(|e| StoreError::invalid_row(e.to_string()))?;
    Ok(Network {
        nwid,
        owner,
        name: row.name,
    })
}

#[async_trait]
impl ReconciliationStore for PgReconciliationStore {
    async fn find_expired_active_users(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<User>, StoreError> {
        let rows = models::User::find_expired_active(self.pool.inner(), now)
            .await
            .map_err(|e| StoreError::query_with_source("find expired active users", e))?;
        Ok(rows.into_iter().map(map_user).collect())
    }

    async fn find_active_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = models::User::find_active(self.pool.inner())
            .await
            .map_err(|e| StoreError::query_with_source("find active users", e))?;
        Ok(rows.into_iter().map(map_user).collect())
    }

    async fn find_networks_by_owner(&self, owner: UserId) -> Result<Vec<Network>, StoreError> {
        let rows = models::Network::find_by_owner(self.pool.inner(), *owner.as_uuid())
            .await
            .map_err(|e| StoreError::query_with_source("find networks by owner", e))?;
        rows.into_iter().map(map_network).collect()
    }

    async fn set_user_active(&self, user: UserId, active: bool) -> Result<(), StoreError> {
        let affected = models::User::set_active(self.pool.inner(), *user.as_uuid(), active)
            .await
            .map_err(|e| StoreError::query_with_source("set user active", e))?;
        if affected == 0 {
            return Err(StoreError::not_found(format!("user {user}")));
        }
        Ok(())
    }

    async fn upsert_member(&self, member: &EnrichedMember) -> Result<(), StoreError> {
        let connectivity = serde_json::to_value(&member.connectivity)
            .map_err(|e| StoreError::query_with_source("serialize connectivity", e))?;

        models::NetworkMember::upsert(
            self.pool.inner(),
            models::UpsertMember {
                nwid: member.nwid.as_str().to_string(),
                node_id: member.node_id.as_str().to_string(),
                authorized: member.authorized,
                name: member.name.clone(),
                ip_assignments: member.ip_assignments.clone(),
                connectivity,
            },
        )
        .await
        .map_err(|e| StoreError::query_with_source("upsert member", e))?;

        Ok(())
    }
}
