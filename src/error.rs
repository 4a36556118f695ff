//! Error taxonomy for the fabric.
//!
//! Only protocol violations and query failures surface as errors. Addressing
//! failures (no local owner, no uplink, no route) are resolved by discarding
//! the message, and publish collisions by quarantining the offending
//! connection, so neither appears here. Handler failures cross the
//! actor-function boundary as `anyhow::Error` and terminate in the
//! supervisor's log output.

use crate::message::{ActorId, SystemId};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FabricError {
    /// Disconnect was requested for an actor id that is not registered.
    #[error("could not disconnect: actor {0} not found")]
    ActorNotFound(ActorId),

    /// `connect_remotes` was called while an uplink is already attached.
    #[error("cannot connect remotes: already connected")]
    RemotesAlreadyConnected,

    /// `disconnect_remotes` was called with no uplink attached.
    #[error("cannot disconnect remotes: not connected")]
    RemotesNotConnected,

    /// A system tried to link under an id the router already has attached.
    #[error("system id collision: {0} is already linked")]
    SystemIdCollision(SystemId),

    /// A response template was built from a message that is not a query.
    #[error("cannot build response: message is not a query")]
    NotAQuery,

    /// The disposable query actor received a message that is not the
    /// response it was waiting for.
    #[error("unexpected query response received")]
    UnexpectedQueryResponse,

    /// No response arrived before the query deadline.
    #[error("query timed out after {0:?}")]
    QueryTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, FabricError>;
