//! Per-request identity context.

use crate::UserId;

/// Immutable identity context threaded through controller calls.
///
/// Reconciliation jobs construct one per target user and pass it by
/// parameter; it is never mutated in place and carries no ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestContext {
    user_id: UserId,
}

impl RequestContext {
    /// Creates a context for the given user.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The user this context acts on behalf of.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
