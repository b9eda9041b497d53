//! Database entity models for meshwork-db.
//!
//! These models represent the database tables and provide
//! type-safe interactions with PostgreSQL.

pub mod member;
pub mod network;
pub mod user;

pub use member::{NetworkMember, UpsertMember};
pub use network::Network;
pub use user::User;
