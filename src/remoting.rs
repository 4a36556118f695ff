//! The link boundary between a messaging system and the router.
//!
//! A system hands the router a [`Downlink`] and receives an [`Uplink`] back.
//! The pair is transport-agnostic: this is the seam at which a real
//! transport would serialize messages across a process or network boundary,
//! without either side changing.

use crate::actor::DispatchFn;
use crate::message::{ActorId, Message, SystemId};
use std::fmt;
use std::sync::Arc;

/// Callback through which the hub can unilaterally sever a link, without the
/// system side needing to poll.
pub type OnDisconnectedFn = Arc<dyn Fn() + Send + Sync>;

/// What a messaging system exposes to the router.
#[derive(Clone)]
pub struct Downlink {
    pub system_id: SystemId,
    pub dispatch: DispatchFn,
    pub on_disconnected: OnDisconnectedFn,
}

impl fmt::Debug for Downlink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downlink")
            .field("system_id", &self.system_id)
            .finish_non_exhaustive()
    }
}

/// What the router hands back to a linked system. Every operation is guarded
/// by the connection's kill switch: after teardown all calls are no-ops.
pub trait Uplink: Send + Sync {
    /// Forward a message toward its owning system. Discards on unknown
    /// destination; never fails.
    fn dispatch(&self, message: &Message);

    /// Advertise actor ids as reachable through the calling system.
    fn publish(&self, ids: &[ActorId]);

    /// Withdraw previously advertised ids.
    fn unpublish(&self, ids: &[ActorId]);

    /// Tear the link down from the system side.
    fn disconnect(&self);
}
