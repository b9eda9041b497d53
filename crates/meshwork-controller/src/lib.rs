//! meshwork Controller Client
//!
//! Capability boundary to the external network controller.
//!
//! # Modules
//!
//! - [`api`] - The [`ControllerApi`] capability trait
//! - [`client`] - HTTP implementation over `reqwest` ([`ControllerClient`])
//! - [`config`] - Client configuration ([`ControllerConfig`])
//! - [`error`] - Error taxonomy with transient/permanent classification
//! - [`types`] - Controller wire types

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

// Re-export main types for convenient access
pub use api::ControllerApi;
pub use client::ControllerClient;
pub use config::ControllerConfig;
pub use error::{ControllerError, ControllerResult};
pub use types::{ControllerStatus, MemberRecord, NetworkDetail, PeerPath, PeerSnapshot};
