//! Star-topology hub interconnecting messaging systems.
//!
//! The router keeps one connection record per attached system and a single
//! global map from actor id to owning system; that map is the sole source of
//! truth for ownership. Its dispatch never fails, so it cannot interfere
//! with messaging or transport implementations sitting on either side of a
//! link.
//!
//! Address uniqueness cannot be allocated centrally (systems choose their
//! own ids), so on any id collision the router quarantines the violating
//! connection: the kill switch is engaged, its records are removed, and its
//! downlink is notified. That is preferable to corrupting routing state or
//! silently preferring one owner over another, and it never affects delivery
//! for the surviving connections.

use crate::error::{FabricError, Result};
use crate::killswitch::Killswitch;
use crate::message::{ActorId, Message, SystemId};
use crate::remoting::{Downlink, Uplink};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

struct SystemEntry {
    downlink: Downlink,
    actors: HashSet<ActorId>,
    kill: Killswitch,
}

#[derive(Default)]
struct RouterInner {
    systems: HashMap<SystemId, SystemEntry>,
    /// Actor id -> owning system. An id is owned by at most one system.
    actor_locations: HashMap<ActorId, SystemId>,
}

impl RouterInner {
    /// Drop a system's connection record and every ownership record it
    /// holds. Returns the entry so callbacks can run outside the lock.
    fn remove_system(&mut self, system_id: &SystemId) -> Option<SystemEntry> {
        let entry = self.systems.remove(system_id)?;
        for id in &entry.actors {
            self.actor_locations.remove(id);
        }
        Some(entry)
    }
}

pub struct Router {
    inner: Mutex<RouterInner>,
}

impl Router {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(RouterInner::default()),
        })
    }

    /// Attach a system. Fails when the system id is already linked. The
    /// returned uplink is wrapped in a fresh kill switch, so a torn-down
    /// connection can never act on the router again.
    pub fn link(self: &Arc<Self>, downlink: Downlink) -> Result<Arc<dyn Uplink>> {
        let mut inner = self.inner.lock();
        if inner.systems.contains_key(&downlink.system_id) {
            return Err(FabricError::SystemIdCollision(downlink.system_id.clone()));
        }

        let system_id = downlink.system_id.clone();
        let kill = Killswitch::new(true);
        debug!(system_id = %system_id, "linking system to router");
        inner.systems.insert(
            system_id.clone(),
            SystemEntry {
                downlink,
                actors: HashSet::new(),
                kill: kill.clone(),
            },
        );

        Ok(Arc::new(RouterUplink {
            router: Arc::clone(self),
            system_id,
            kill,
        }))
    }

    /// Number of currently attached systems.
    pub fn linked_systems(&self) -> usize {
        self.inner.lock().systems.len()
    }

    fn route(&self, message: &Message) {
        // resolve under the lock, call the downlink outside it: the target
        // system's dispatch may re-enter the router
        let target = {
            let inner = self.inner.lock();
            inner
                .actor_locations
                .get(message.to())
                .and_then(|system_id| inner.systems.get(system_id))
                .map(|entry| Arc::clone(&entry.downlink.dispatch))
        };
        match target {
            Some(dispatch) => dispatch(message),
            None => debug!(to = %message.to(), "no route for message, discarding"),
        }
    }

    fn publish(&self, system_id: &SystemId, ids: &[ActorId]) {
        let quarantined = {
            let mut inner = self.inner.lock();
            let collision = ids.iter().any(|id| {
                inner
                    .actor_locations
                    .get(id)
                    .is_some_and(|owner| owner != system_id)
            });
            if collision {
                inner.remove_system(system_id)
            } else {
                if let Some(entry) = inner.systems.get_mut(system_id) {
                    for id in ids {
                        entry.actors.insert(id.clone());
                    }
                }
                if inner.systems.contains_key(system_id) {
                    for id in ids {
                        inner.actor_locations.insert(id.clone(), system_id.clone());
                    }
                }
                None
            }
        };

        if let Some(entry) = quarantined {
            warn!(
                system_id = %system_id,
                "actor id collision, quarantining the publishing connection"
            );
            entry.kill.engage();
            (entry.downlink.on_disconnected)();
        }
    }

    fn unpublish(&self, system_id: &SystemId, ids: &[ActorId]) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.systems.get_mut(system_id) {
            for id in ids {
                entry.actors.remove(id);
            }
        }
        for id in ids {
            // only withdraw records the calling system owns
            if inner
                .actor_locations
                .get(id)
                .is_some_and(|owner| owner == system_id)
            {
                inner.actor_locations.remove(id);
            }
        }
    }

    fn disconnect(&self, system_id: &SystemId) {
        let entry = { self.inner.lock().remove_system(system_id) };
        if let Some(entry) = entry {
            debug!(system_id = %system_id, "system disconnected from router");
            entry.kill.engage();
            (entry.downlink.on_disconnected)();
        }
    }
}

/// Kill-switch-guarded uplink handed to one linked system.
struct RouterUplink {
    router: Arc<Router>,
    system_id: SystemId,
    kill: Killswitch,
}

impl Uplink for RouterUplink {
    fn dispatch(&self, message: &Message) {
        if !self.kill.check("dispatch") {
            return;
        }
        self.router.route(message);
    }

    fn publish(&self, ids: &[ActorId]) {
        if !self.kill.check("publish") {
            return;
        }
        self.router.publish(&self.system_id, ids);
    }

    fn unpublish(&self, ids: &[ActorId]) {
        if !self.kill.check("unpublish") {
            return;
        }
        self.router.unpublish(&self.system_id, ids);
    }

    fn disconnect(&self) {
        if !self.kill.check("disconnect") {
            return;
        }
        self.router.disconnect(&self.system_id);
    }
}
