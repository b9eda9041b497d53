//! User entity model.
//!
//! Represents an application user account. Accounts are created by the
//! admin surface; the reconciliation core reads them and deactivates the
//! ones whose expiry has passed.

use chrono::{DateTime, Utc};
use meshwork_core::{UserId, UserRole};
use sqlx::FromRow;

/// A user account.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Unique identifier for the user.
    pub id: uuid::Uuid,

    /// User's email address (unique).
    pub email: String,

    /// User's display name.
    pub display_name: Option<String>,

    /// Organization role in its database form (`ADMIN` / `USER`).
    pub role: String,

    /// Whether the account is active (false = deactivated).
    pub is_active: bool,

    /// When the account expires (None = never).
    pub expires_at: Option<DateTime<Utc>>,

    /// When the user was created.
    pub created_at: DateTime<Utc>,

    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Get the user ID as a typed `UserId`.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.id)
    }

    /// Get the role as a typed `UserRole`.
    ///
    /// The database constrains the column to known roles; unknown values
    /// fall back to `USER`.
    #[must_use]
    pub fn user_role(&self) -> UserRole {
        self.role.parse().unwrap_or(UserRole::User)
    }

    /// Check whether the account's expiry has passed relative to `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => expires_at < now,
        }
    }

    /// Find all active, expired, non-admin users.
    ///
    /// These are the expiry sweep's targets: `expires_at < now`,
    /// `is_active = true`, `role != ADMIN`.
    pub async fn find_expired_active(
        pool: &sqlx::PgPool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM users
            WHERE expires_at IS NOT NULL
              AND expires_at < $1
              AND is_active = TRUE
              AND role <> 'ADMIN'
            ORDER BY expires_at
            ",
        )
        .bind(now)
        .fetch_all(pool)
        .await
    }

    /// Find all active users.
    pub async fn find_active(pool: &sqlx::PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE is_active = TRUE ORDER BY created_at")
            .fetch_all(pool)
            .await
    }

    /// Set a user's active flag.
    ///
    /// Returns the number of rows updated (0 if the user no longer exists).
    pub async fn set_active(
        pool: &sqlx::PgPool,
        id: uuid::Uuid,
        active: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE users SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
