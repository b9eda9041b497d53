//! meshwork Core Library
//!
//! Shared types for the meshwork controller admin platform.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (UserId, NetworkId, NodeId)
//! - [`role`] - Organization roles (UserRole)
//! - [`context`] - Immutable per-request identity context (RequestContext)
//!
//! # Example
//!
//! ```
//! use meshwork_core::{NetworkId, RequestContext, UserId};
//!
//! let user_id = UserId::new();
//! let ctx = RequestContext::new(user_id);
//! let nwid = NetworkId::new("8056c2e21c000001").unwrap();
//!
//! assert_eq!(ctx.user_id(), user_id);
//! assert_eq!(nwid.as_str(), "8056c2e21c000001");
//! ```

pub mod context;
pub mod ids;
pub mod role;

// Re-export main types for convenient access
pub use context::RequestContext;
pub use ids::{NetworkId, NodeId, ParseIdError, UserId};
pub use role::UserRole;
