//! Actor system facade.
//!
//! Ties one messaging fabric, actor spawning and the query protocol into a
//! single entry point. Everything here delegates; the behavior lives in the
//! underlying modules.

use crate::actor::{spawn, Actor, ActorFn, SpawnArgs};
use crate::error::Result;
use crate::message::{ActorId, Message, Payload, SystemId};
use crate::messaging::Messaging;
use crate::query::{query, QueryArgs, QueryResponse};
use crate::remoting::{Downlink, Uplink};
use std::sync::Arc;

/// Arguments for spawning an actor into a system. The system supplies the
/// dispatch; callers only pick id, behavior, initial state and visibility.
pub struct SpawnSystemArgs {
    pub id: ActorId,
    pub actor_fn: ActorFn,
    pub initial_state: Payload,
    /// Advertise the actor to the upstream link, when one is attached.
    pub is_public: bool,
}

impl SpawnSystemArgs {
    pub fn new(id: impl Into<ActorId>, actor_fn: ActorFn) -> Self {
        Self {
            id: id.into(),
            actor_fn,
            initial_state: Payload::Null,
            is_public: false,
        }
    }

    pub fn with_state(mut self, initial_state: Payload) -> Self {
        self.initial_state = initial_state;
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }
}

pub struct ActorSystem {
    messaging: Arc<Messaging>,
}

impl ActorSystem {
    pub fn new() -> Self {
        Self::with_id(SystemId::generate())
    }

    pub fn with_id(id: impl Into<SystemId>) -> Self {
        Self {
            messaging: Messaging::new(id.into()),
        }
    }

    pub fn id(&self) -> &SystemId {
        self.messaging.system_id()
    }

    /// Spawn an actor wired to this system's dispatch and register it with
    /// the messaging fabric.
    pub fn spawn(&self, args: SpawnSystemArgs) -> Actor {
        let actor = spawn(SpawnArgs {
            id: args.id,
            actor_fn: args.actor_fn,
            dispatch: self.messaging.dispatch_fn(),
            initial_state: args.initial_state,
        });
        self.messaging.connect_actor(actor.clone(), args.is_public);
        actor
    }

    /// Route a message toward its destination. Never blocks, never fails.
    pub fn dispatch(&self, message: &Message) {
        self.messaging.dispatch(message);
    }

    /// Request/response against any reachable actor.
    pub async fn query(&self, args: QueryArgs) -> Result<QueryResponse> {
        query(&self.messaging, args).await
    }

    /// Remove an actor from the fabric. After this nothing routes to it and
    /// dropping the last handle frees it.
    pub fn disconnect_actor(&self, id: &ActorId) -> Result<()> {
        self.messaging.disconnect_actor(id)
    }

    /// Attach this system to a hub, e.g. `system.connect_remotes(|downlink|
    /// router.link(downlink))`.
    pub fn connect_remotes<F>(&self, create_link: F) -> Result<()>
    where
        F: FnOnce(Downlink) -> Result<Arc<dyn Uplink>>,
    {
        self.messaging.connect_remotes(create_link)
    }

    pub fn disconnect_remotes(&self) -> Result<()> {
        self.messaging.disconnect_remotes()
    }

    /// The underlying fabric, for callers composing their own plumbing.
    pub fn messaging(&self) -> &Arc<Messaging> {
        &self.messaging
    }
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new()
    }
}
