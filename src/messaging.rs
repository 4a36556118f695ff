//! Per-system dispatch fabric.
//!
//! Holds the registry of locally hosted actors and at most one uplink toward
//! a router. `dispatch` resolves a destination locally first, then forwards
//! upstream, and otherwise discards the message: dispatch must be safe to
//! call speculatively and must never fail, so addressing failures do not
//! propagate into unrelated control flow.

use crate::actor::{Actor, DispatchFn};
use crate::error::{FabricError, Result};
use crate::message::{ActorId, Message, SystemId};
use crate::remoting::{Downlink, Uplink};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A locally hosted actor plus its visibility flag. Public connections are
/// advertised to the uplink whenever one is attached.
#[derive(Debug, Clone)]
pub struct ActorConnection {
    pub actor: Actor,
    pub is_public: bool,
}

pub struct Messaging {
    system_id: SystemId,
    locals: RwLock<HashMap<ActorId, ActorConnection>>,
    uplink: Mutex<Option<Arc<dyn Uplink>>>,
}

impl Messaging {
    pub fn new(system_id: SystemId) -> Arc<Self> {
        Arc::new(Self {
            system_id,
            locals: RwLock::new(HashMap::new()),
            uplink: Mutex::new(None),
        })
    }

    pub fn system_id(&self) -> &SystemId {
        &self.system_id
    }

    /// Route a message: local actor first, attached uplink second, otherwise
    /// the message is discarded. Never blocks, never fails.
    pub fn dispatch(&self, message: &Message) {
        let local = self.locals.read().get(message.to()).map(|c| c.actor.clone());
        if let Some(actor) = local {
            actor.deliver(message);
            return;
        }

        let uplink = self.uplink.lock().clone();
        if let Some(uplink) = uplink {
            uplink.dispatch(message);
        } else {
            debug!(
                system_id = %self.system_id,
                to = %message.to(),
                "message has no recipient, discarding"
            );
        }
    }

    /// A [`DispatchFn`] view of this fabric, handed to actors at spawn time
    /// and to the router as the downlink dispatch. Holds only a weak
    /// reference so actors do not keep their system alive.
    pub fn dispatch_fn(self: &Arc<Self>) -> DispatchFn {
        let weak = Arc::downgrade(self);
        Arc::new(move |message: &Message| {
            if let Some(messaging) = weak.upgrade() {
                messaging.dispatch(message);
            }
        })
    }

    /// Register a local actor. A public actor is advertised upstream
    /// immediately when an uplink is attached.
    pub fn connect_actor(&self, actor: Actor, is_public: bool) {
        let id = actor.id().clone();
        self.locals
            .write()
            .insert(id.clone(), ActorConnection { actor, is_public });

        if is_public {
            let uplink = self.uplink.lock().clone();
            if let Some(uplink) = uplink {
                uplink.publish(std::slice::from_ref(&id));
            }
        }
    }

    /// Remove a local actor, un-advertising it upstream first if it was
    /// public. Fails when the id is not registered.
    pub fn disconnect_actor(&self, id: &ActorId) -> Result<()> {
        let is_public = match self.locals.read().get(id) {
            Some(connection) => connection.is_public,
            None => return Err(FabricError::ActorNotFound(id.clone())),
        };

        if is_public {
            let uplink = self.uplink.lock().clone();
            if let Some(uplink) = uplink {
                uplink.unpublish(std::slice::from_ref(id));
            }
        }
        self.locals.write().remove(id);
        Ok(())
    }

    /// Attach this system to a hub. `create_link` receives our downlink and
    /// returns the uplink to route through. Every currently-public local
    /// actor is re-advertised over the fresh link.
    pub fn connect_remotes<F>(self: &Arc<Self>, create_link: F) -> Result<()>
    where
        F: FnOnce(Downlink) -> Result<Arc<dyn Uplink>>,
    {
        if self.uplink.lock().is_some() {
            return Err(FabricError::RemotesAlreadyConnected);
        }

        let weak = Arc::downgrade(self);
        let downlink = Downlink {
            system_id: self.system_id.clone(),
            dispatch: self.dispatch_fn(),
            on_disconnected: Arc::new(move || {
                if let Some(messaging) = weak.upgrade() {
                    messaging.uplink.lock().take();
                }
            }),
        };

        let uplink = create_link(downlink)?;
        *self.uplink.lock() = Some(Arc::clone(&uplink));

        let public_ids: Vec<ActorId> = self
            .locals
            .read()
            .values()
            .filter(|connection| connection.is_public)
            .map(|connection| connection.actor.id().clone())
            .collect();
        if !public_ids.is_empty() {
            uplink.publish(&public_ids);
        }
        Ok(())
    }

    /// Detach from the hub. Fails when no uplink is attached.
    pub fn disconnect_remotes(&self) -> Result<()> {
        let uplink = self
            .uplink
            .lock()
            .take()
            .ok_or(FabricError::RemotesNotConnected)?;
        uplink.disconnect();
        Ok(())
    }

    /// Whether an uplink is currently attached.
    pub fn is_linked(&self) -> bool {
        self.uplink.lock().is_some()
    }
}
