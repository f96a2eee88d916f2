//! Subscription primitives shared by the case store and the notifier.

/// Handle returned by a `subscribe` call, used to unsubscribe later.
///
/// Unsubscribing with a stale or already-removed id is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
