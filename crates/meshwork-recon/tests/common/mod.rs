//! Shared test doubles for the reconciliation jobs.
//!
//! Hand-written fakes for the two capability seams: a scripted controller
//! that records every call, and an in-memory store implementing the
//! `ReconciliationStore` contract (including the ADMIN exclusion in the
//! expiry enumeration).

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use meshwork_controller::{
    ControllerApi, ControllerError, ControllerResult, ControllerStatus, MemberRecord,
    NetworkDetail, PeerSnapshot,
};
use meshwork_core::{NetworkId, NodeId, RequestContext, UserId, UserRole};
use meshwork_recon::{EnrichedMember, Network, ReconciliationStore, StoreError, User};

/// One recorded controller call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCall {
    Status,
    NetworkDetail {
        user: UserId,
        nwid: String,
    },
    Peers {
        user: UserId,
        nwid: String,
        member_count: usize,
    },
    SetAuthorized {
        user: UserId,
        nwid: String,
        node: String,
        authorized: bool,
    },
}

enum DetailScript {
    Found(NetworkDetail),
    Absent,
    Fails,
}

enum PeersScript {
    Found(Vec<PeerSnapshot>),
    Fails,
}

/// Scripted in-memory controller.
///
/// Unknown networks behave as absent (`Ok(None)`); unknown peer scripts
/// return an empty snapshot list.
#[derive(Default)]
pub struct MockController {
    details: Mutex<HashMap<String, DetailScript>>,
    peers: Mutex<HashMap<String, PeersScript>>,
    fail_authorize: Mutex<HashSet<(String, String)>>,
    calls: Mutex<Vec<ControllerCall>>,
    detail_delay: Mutex<Option<Duration>>,
    details_in_flight: AtomicUsize,
    max_details_in_flight: AtomicUsize,
}

impl MockController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a network's detail response.
    pub fn script_network(&self, detail: NetworkDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(detail.id.as_str().to_string(), DetailScript::Found(detail));
    }

    /// Script `network_detail` to return `Ok(None)` for this network.
    pub fn script_absent(&self, nwid: &str) {
        self.details
            .lock()
            .unwrap()
            .insert(nwid.to_string(), DetailScript::Absent);
    }

    /// Script `network_detail` to fail for this network.
    pub fn script_detail_failure(&self, nwid: &str) {
        self.details
            .lock()
            .unwrap()
            .insert(nwid.to_string(), DetailScript::Fails);
    }

    /// Script the peer snapshots returned for this network.
    pub fn script_peers(&self, nwid: &str, peers: Vec<PeerSnapshot>) {
        self.peers
            .lock()
            .unwrap()
            .insert(nwid.to_string(), PeersScript::Found(peers));
    }

    /// Script the batched peers call to fail for this network.
    pub fn script_peers_failure(&self, nwid: &str) {
        self.peers
            .lock()
            .unwrap()
            .insert(nwid.to_string(), PeersScript::Fails);
    }

    /// Script `set_authorized` to fail for one member.
    pub fn fail_set_authorized(&self, nwid: &str, node: &str) {
        self.fail_authorize
            .lock()
            .unwrap()
            .insert((nwid.to_string(), node.to_string()));
    }

    /// Delay every `network_detail` response, to observe concurrency.
    pub fn set_detail_delay(&self, delay: Duration) {
        *self.detail_delay.lock().unwrap() = Some(delay);
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<ControllerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The recorded `set_authorized` calls as `(nwid, node, authorized)`.
    pub fn authorization_calls(&self) -> Vec<(String, String, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ControllerCall::SetAuthorized {
                    nwid,
                    node,
                    authorized,
                    ..
                } => Some((nwid, node, authorized)),
                _ => None,
            })
            .collect()
    }

    /// Highest number of `network_detail` calls observed in flight at once.
    pub fn max_details_in_flight(&self) -> usize {
        self.max_details_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: ControllerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ControllerApi for MockController {
    async fn status(&self) -> ControllerResult<ControllerStatus> {
        self.record(ControllerCall::Status);
        Ok(ControllerStatus {
            online: true,
            version: Some("1.14.2".to_string()),
            clock: None,
        })
    }

    async fn network_detail(
        &self,
        ctx: &RequestContext,
        nwid: &NetworkId,
    ) -> ControllerResult<Option<NetworkDetail>> {
        self.record(ControllerCall::NetworkDetail {
            user: ctx.user_id(),
            nwid: nwid.as_str().to_string(),
        });

        let delay = *self.detail_delay.lock().unwrap();
        if let Some(delay) = delay {
            let in_flight = self.details_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_details_in_flight
                .fetch_max(in_flight, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.details_in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        match self.details.lock().unwrap().get(nwid.as_str()) {
            Some(DetailScript::Found(detail)) => Ok(Some(detail.clone())),
            Some(DetailScript::Absent) | None => Ok(None),
            Some(DetailScript::Fails) => {
                Err(ControllerError::unavailable("scripted detail failure"))
            }
        }
    }

    async fn peers(
        &self,
        ctx: &RequestContext,
        nwid: &NetworkId,
        members: &[MemberRecord],
    ) -> ControllerResult<Vec<PeerSnapshot>> {
        self.record(ControllerCall::Peers {
            user: ctx.user_id(),
            nwid: nwid.as_str().to_string(),
            member_count: members.len(),
        });

        match self.peers.lock().unwrap().get(nwid.as_str()) {
            Some(PeersScript::Found(peers)) => Ok(peers.clone()),
            Some(PeersScript::Fails) => Err(ControllerError::unavailable("scripted peers failure")),
            None => Ok(Vec::new()),
        }
    }

    async fn set_authorized(
        &self,
        ctx: &RequestContext,
        nwid: &NetworkId,
        node_id: &NodeId,
        authorized: bool,
    ) -> ControllerResult<()> {
        self.record(ControllerCall::SetAuthorized {
            user: ctx.user_id(),
            nwid: nwid.as_str().to_string(),
            node: node_id.as_str().to_string(),
            authorized,
        });

        let key = (nwid.as_str().to_string(), node_id.as_str().to_string());
        if self.fail_authorize.lock().unwrap().contains(&key) {
            return Err(ControllerError::unavailable("scripted authorize failure"));
        }
        Ok(())
    }
}

/// In-memory `ReconciliationStore`.
///
/// Implements the trait contract, including the ADMIN and expiry filters in
/// `find_expired_active_users`, over mutex-guarded collections.
#[derive(Default)]
pub struct MemStore {
    users: Mutex<Vec<User>>,
    networks: Mutex<Vec<Network>>,
    members: Mutex<HashMap<(String, String), EnrichedMember>>,
    upsert_calls: AtomicUsize,
    fail_user_listing: Mutex<bool>,
    fail_networks_for: Mutex<HashSet<UserId>>,
    panic_networks_for: Mutex<HashSet<UserId>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    /// Register a network owned by `owner`.
    pub fn add_network(&self, owner: UserId, nwid: &str) {
        self.networks.lock().unwrap().push(Network {
            nwid: NetworkId::new(nwid).unwrap(),
            owner,
            name: None,
        });
    }

    /// Snapshot of one user, for assertions.
    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    /// Snapshot of one member row, for assertions.
    pub fn member(&self, nwid: &str, node: &str) -> Option<EnrichedMember> {
        self.members
            .lock()
            .unwrap()
            .get(&(nwid.to_string(), node.to_string()))
            .cloned()
    }

    /// Snapshot of all member rows keyed by `(nwid, node_id)`.
    pub fn members(&self) -> HashMap<(String, String), EnrichedMember> {
        self.members.lock().unwrap().clone()
    }

    pub fn member_count(&self) -> usize {
        self.members.lock().unwrap().len()
    }

    /// Number of `upsert_member` calls accepted so far.
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Make the user enumerations fail.
    pub fn fail_user_listing(&self) {
        *self.fail_user_listing.lock().unwrap() = true;
    }

    /// Make `find_networks_by_owner` fail for one user.
    pub fn fail_network_listing_for(&self, user: UserId) {
        self.fail_networks_for.lock().unwrap().insert(user);
    }

    /// Make `find_networks_by_owner` panic for one user.
    pub fn panic_network_listing_for(&self, user: UserId) {
        self.panic_networks_for.lock().unwrap().insert(user);
    }
}

#[async_trait]
impl ReconciliationStore for MemStore {
    async fn find_expired_active_users(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<User>, StoreError> {
        if *self.fail_user_listing.lock().unwrap() {
            return Err(StoreError::query("scripted user listing failure"));
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| {
                u.is_active
                    && u.role != UserRole::Admin
                    && u.expires_at.is_some_and(|expires_at| expires_at < now)
            })
            .cloned()
            .collect())
    }

    async fn find_active_users(&self) -> Result<Vec<User>, StoreError> {
        if *self.fail_user_listing.lock().unwrap() {
            return Err(StoreError::query("scripted user listing failure"));
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.is_active)
            .cloned()
            .collect())
    }

    async fn find_networks_by_owner(&self, owner: UserId) -> Result<Vec<Network>, StoreError> {
        if self.panic_networks_for.lock().unwrap().contains(&owner) {
            panic!("scripted network listing panic");
        }
        if self.fail_networks_for.lock().unwrap().contains(&owner) {
            return Err(StoreError::query("scripted network listing failure"));
        }
        Ok(self
            .networks
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.owner == owner)
            .cloned()
            .collect())
    }

    async fn set_user_active(&self, user: UserId, active: bool) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == user) {
            Some(found) => {
                found.is_active = active;
                Ok(())
            }
            None => Err(StoreError::not_found(format!("user {user}"))),
        }
    }

    async fn upsert_member(&self, member: &EnrichedMember) -> Result<(), StoreError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.members.lock().unwrap().insert(
            (
                member.nwid.as_str().to_string(),
                member.node_id.as_str().to_string(),
            ),
            member.clone(),
        );
        Ok(())
    }
}

/// An active, never-expiring user account.
pub fn active_user(email: &str) -> User {
    User {
        id: UserId::new(),
        email: email.to_string(),
        role: UserRole::User,
        is_active: true,
        expires_at: None,
    }
}

/// An active user whose expiry passed one day before `now`.
pub fn expired_user(email: &str, now: DateTime<Utc>) -> User {
    User {
        expires_at: Some(now - chrono::Duration::days(1)),
        ..active_user(email)
    }
}

/// A member record as the controller reports it.
pub fn member_record(id: &str, authorized: bool) -> MemberRecord {
    MemberRecord {
        id: NodeId::new(id).unwrap(),
        authorized,
        name: None,
        ip_assignments: Vec::new(),
    }
}

/// A peer snapshot with `paths` active paths.
pub fn peer_snapshot(id: &str, latency_ms: i64, paths: usize) -> PeerSnapshot {
    PeerSnapshot {
        id: NodeId::new(id).unwrap(),
        latency_ms,
        paths: (0..paths)
            .map(|i| meshwork_controller::PeerPath {
                address: format!("198.51.100.{i}/9993"),
                last_receive: Some(1_756_166_400_000),
                preferred: i == 0,
            })
            .collect(),
        version: Some("1.14.2".to_string()),
    }
}

/// A network detail document with the given members.
pub fn network_detail(nwid: &str, members: Vec<MemberRecord>) -> NetworkDetail {
    NetworkDetail {
        id: NetworkId::new(nwid).unwrap(),
        name: None,
        members,
    }
}
