//! Network member entity model.
//!
//! The persisted side of the member reconciliation: one row per
//! `(nwid, node_id)` pair, upserted by the peer sync job. Rows are never
//! deleted by the sync; members the controller stops reporting simply
//! keep their last-synced state.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A device's membership record within a network.
#[derive(Debug, Clone, FromRow)]
pub struct NetworkMember {
    /// Network this membership belongs to.
    pub nwid: String,

    /// Device (node) identity within the network.
    pub node_id: String,

    /// Whether the controller authorized this member at last sync.
    pub authorized: bool,

    /// Controller-side display name, when set.
    pub name: Option<String>,

    /// Managed IP assignments at last sync.
    pub ip_assignments: Vec<String>,

    /// Connectivity snapshot document from the last sync.
    pub connectivity: serde_json::Value,

    /// When this row was last written by the sync.
    pub last_synced_at: DateTime<Utc>,

    /// When the row was first created.
    pub created_at: DateTime<Utc>,

    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Parameters for upserting a member row.
#[derive(Debug, Clone)]
pub struct UpsertMember {
    /// Network key.
    pub nwid: String,

    /// Device key.
    pub node_id: String,

    /// Authorization flag from the controller.
    pub authorized: bool,

    /// Display name from the controller.
    pub name: Option<String>,

    /// Managed IP assignments from the controller.
    pub ip_assignments: Vec<String>,

    /// Serialized connectivity section.
    pub connectivity: serde_json::Value,
}

impl NetworkMember {
    /// Insert or update a member row keyed by `(nwid, node_id)`.
    ///
    /// Existing rows are overwritten field-by-field with the new state;
    /// repeated upserts with identical data are idempotent.
    pub async fn upsert(pool: &sqlx::PgPool, data: UpsertMember) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO network_members
                (nwid, node_id, authorized, name, ip_assignments, connectivity, last_synced_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (nwid, node_id) DO UPDATE
            SET authorized = EXCLUDED.authorized,
                name = EXCLUDED.name,
                ip_assignments = EXCLUDED.ip_assignments,
                connectivity = EXCLUDED.connectivity,
                last_synced_at = EXCLUDED.last_synced_at,
                updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(&data.nwid)
        .bind(&data.node_id)
        .bind(data.authorized)
        .bind(&data.name)
        .bind(&data.ip_assignments)
        .bind(&data.connectivity)
        .fetch_one(pool)
        .await
    }

    /// Find all members of a network.
    pub async fn find_by_network(
        pool: &sqlx::PgPool,
        nwid: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM network_members WHERE nwid = $1 ORDER BY node_id")
            .bind(nwid)
            .fetch_all(pool)
            .await
    }
}
