//! Member enrichment.
//!
//! Pure join of a network's controller member records with its peer
//! snapshots. No clock, no I/O: given identical inputs the output is
//! identical, which is what keeps it testable without a live controller.

use std::collections::HashMap;

use meshwork_controller::{MemberRecord, PeerSnapshot};
use meshwork_core::{NetworkId, NodeId};
use serde::{Deserialize, Serialize};

/// Connectivity observed for one member, derived from its peer snapshot.
///
/// The default value is the offline/empty section used when no snapshot
/// matches the member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connectivity {
    /// Whether the peer reported at least one active physical path.
    pub online: bool,

    /// Controller-measured latency in milliseconds, when known.
    pub latency_ms: Option<i64>,

    /// Number of active physical paths.
    pub direct_paths: usize,

    /// Peer software version, when reported.
    pub version: Option<String>,
}

impl From<&PeerSnapshot> for Connectivity {
    fn from(peer: &PeerSnapshot) -> Self {
        Self {
            online: !peer.paths.is_empty(),
            latency_ms: peer.latency(),
            direct_paths: peer.paths.len(),
            version: peer.version.clone(),
        }
    }
}

/// One member row ready for the store upsert, keyed by `(node_id, nwid)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedMember {
    pub nwid: NetworkId,
    pub node_id: NodeId,
    pub authorized: bool,
    pub name: Option<String>,
    pub ip_assignments: Vec<String>,
    pub connectivity: Connectivity,
}

/// Join member records with peer snapshots for one network.
///
/// Output order follows member input order. A member without a matching
/// snapshot is still emitted with [`Connectivity::default`]; snapshots
/// without a matching member are ignored.
#[must_use]
pub fn enrich_members(
    nwid: &NetworkId,
    members: &[MemberRecord],
    peers: &[PeerSnapshot],
) -> Vec<EnrichedMember> {
    let by_node: HashMap<&str, &PeerSnapshot> =
        peers.iter().map(|peer| (peer.id.as_str(), peer)).collect();

    members
        .iter()
        .map(|member| EnrichedMember {
            nwid: nwid.clone(),
            node_id: member.id.clone(),
            authorized: member.authorized,
            name: member.name.clone(),
            ip_assignments: member.ip_assignments.clone(),
            connectivity: by_node
                .get(member.id.as_str())
                .map(|peer| Connectivity::from(*peer))
                .unwrap_or_default(),
        })
        .collect()
}
