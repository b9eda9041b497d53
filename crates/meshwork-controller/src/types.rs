//! Wire types for the network controller REST API.
//!
//! All shapes use the controller's camelCase field names. Fields the
//! controller may omit carry serde defaults so a sparse payload still
//! deserializes; anything beyond that is a contract violation surfaced as
//! [`ControllerError::InvalidResponse`](crate::ControllerError::InvalidResponse)
//! by the client.

use meshwork_core::{NetworkId, NodeId};
use serde::{Deserialize, Serialize};

/// A member record as reported by the controller for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    /// Device (node) identity within the network.
    pub id: NodeId,

    /// Whether the controller currently authorizes this member.
    #[serde(default)]
    pub authorized: bool,

    /// Controller-side display name, when set.
    #[serde(default)]
    pub name: Option<String>,

    /// Managed IP assignments for this member.
    #[serde(default)]
    pub ip_assignments: Vec<String>,
}

/// Full controller view of one network, including its member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDetail {
    /// Network identity (`nwid`).
    pub id: NetworkId,

    /// Controller-side network name, when set.
    #[serde(default)]
    pub name: Option<String>,

    /// Current member list. An empty list is a valid (empty) network.
    #[serde(default)]
    pub members: Vec<MemberRecord>,
}

/// One physical path the controller reports for a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerPath {
    /// Remote endpoint in `ip/port` form.
    pub address: String,

    /// Milliseconds-since-epoch of the last packet received on this path.
    #[serde(default)]
    pub last_receive: Option<i64>,

    /// Whether this is the preferred path.
    #[serde(default)]
    pub preferred: bool,
}

fn default_latency() -> i64 {
    -1
}

/// Connectivity facts for one member, as reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSnapshot {
    /// Device (node) identity this snapshot belongs to.
    pub id: NodeId,

    /// Round-trip latency in milliseconds; the controller reports `-1`
    /// when it has no measurement.
    #[serde(rename = "latency", default = "default_latency")]
    pub latency_ms: i64,

    /// Active physical paths to the peer.
    #[serde(default)]
    pub paths: Vec<PeerPath>,

    /// Peer software version, when reported.
    #[serde(default)]
    pub version: Option<String>,
}

impl PeerSnapshot {
    /// Latency measurement, when the controller has one.
    #[must_use]
    pub fn latency(&self) -> Option<i64> {
        (self.latency_ms >= 0).then_some(self.latency_ms)
    }
}

/// Controller status document returned by the status probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerStatus {
    /// Whether the controller reports itself online.
    #[serde(default)]
    pub online: bool,

    /// Controller software version, when reported.
    #[serde(default)]
    pub version: Option<String>,

    /// Controller clock in milliseconds since epoch, when reported.
    #[serde(default)]
    pub clock: Option<i64>,
}
