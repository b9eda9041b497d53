//! Controller capability trait.
//!
//! Reconciliation code depends on this seam, never on the concrete HTTP
//! client, so tests can substitute a scripted in-memory controller.

use async_trait::async_trait;
use meshwork_core::{NetworkId, NodeId, RequestContext};

use crate::error::ControllerResult;
use crate::types::{ControllerStatus, MemberRecord, NetworkDetail, PeerSnapshot};

/// Capability boundary to the external network controller.
///
/// Every call is a network round-trip with a client-level timeout; callers
/// treat failures as per-unit events (skip and continue), never as fatal.
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// Fetch the controller status document.
    ///
    /// Used as a reachability probe; no user context because it acts on
    /// behalf of the process, not a user.
    async fn status(&self) -> ControllerResult<ControllerStatus>;

    /// Fetch the controller's current view of one network.
    ///
    /// Returns `Ok(None)` when the controller has no usable member
    /// collection for this network (unknown network, null payload); callers
    /// skip the network for this cycle and continue with its siblings.
    async fn network_detail(
        &self,
        ctx: &RequestContext,
        nwid: &NetworkId,
    ) -> ControllerResult<Option<NetworkDetail>>;

    /// Resolve connectivity for a network's members in one batched round-trip.
    ///
    /// Members without live connectivity may be absent from the result; that
    /// is not an error.
    async fn peers(
        &self,
        ctx: &RequestContext,
        nwid: &NetworkId,
        members: &[MemberRecord],
    ) -> ControllerResult<Vec<PeerSnapshot>>;

    /// Set a member's authorization flag at the controller.
    async fn set_authorized(
        &self,
        ctx: &RequestContext,
        nwid: &NetworkId,
        node_id: &NodeId,
        authorized: bool,
    ) -> ControllerResult<()>;
}
