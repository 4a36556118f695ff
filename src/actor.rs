//! Actor handles and spawning.
//!
//! An actor is not an object with behavior methods; it is a closure over a
//! mailbox, a state cell and a supervisor. The [`Actor`] handle exposes only
//! the id and the delivery entry point, so external code cannot reach past
//! the mailbox. Dropping the last handle (after it is disconnected from its
//! messaging) makes the actor unreachable and frees it.

use crate::mailbox::Mailbox;
use crate::message::{ActorId, Message, Payload};
use crate::state::StateHandler;
use crate::supervisor::Supervisor;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The uniform message hand-off boundary: takes one message, returns
/// nothing, never fails. Used for local delivery, upstream forwarding and
/// router forwarding alike.
pub type DispatchFn = Arc<dyn Fn(&Message) + Send + Sync>;

/// What one handler invocation is given: a defensive copy of the actor's
/// state, the message being processed, and the parent system's dispatch.
pub struct ActorContext {
    pub state: Payload,
    pub message: Message,
    pub dispatch: DispatchFn,
}

impl ActorContext {
    /// Route a message toward its destination. Non-blocking, never fails.
    pub fn dispatch(&self, message: &Message) {
        (self.dispatch)(message)
    }
}

impl fmt::Debug for ActorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorContext")
            .field("state", &self.state)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// The user-defined function that decides how an actor deals with a message.
/// Returns the new state, or `None` for "no state change". May suspend; the
/// supervisor will not start the next message until the returned future
/// settles.
pub type ActorFn =
    Arc<dyn Fn(ActorContext) -> BoxFuture<'static, anyhow::Result<Option<Payload>>> + Send + Sync>;

/// Lift an async closure into an [`ActorFn`].
pub fn actor_fn<F, Fut>(f: F) -> ActorFn
where
    F: Fn(ActorContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Option<Payload>>> + Send + 'static,
{
    Arc::new(move |ctx| f(ctx).boxed())
}

/// Dispatch that drops everything. Used by actors that must not talk
/// outward, such as the disposable query reply collector.
pub fn noop_dispatch() -> DispatchFn {
    Arc::new(|_message: &Message| {})
}

/// Everything needed to spawn one actor.
pub struct SpawnArgs {
    pub id: ActorId,
    pub actor_fn: ActorFn,
    pub dispatch: DispatchFn,
    pub initial_state: Payload,
}

/// Public handle to a running actor: an id plus a delivery entry point.
#[derive(Clone)]
pub struct Actor {
    id: ActorId,
    mailbox: Arc<Mailbox>,
    supervisor: Arc<Supervisor>,
}

impl Actor {
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Deliver a message into this actor's mailbox and trigger processing.
    /// Never blocks the caller; the processing pass runs as its own task.
    pub fn deliver(&self, message: &Message) {
        self.mailbox.deliver(message);
        self.supervisor.process_messages();
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Spawn an actor from its parts: one mailbox, one state cell, one
/// supervisor, for the actor's whole lifetime.
///
/// Actors can be spawned individually with any `dispatch`; this is useful
/// for tests and for single-purpose actors. Usually they are spawned through
/// an [`crate::ActorSystem`], which supplies its own dispatch and registers
/// the actor with its messaging.
pub fn spawn(args: SpawnArgs) -> Actor {
    let mailbox = Arc::new(Mailbox::new());
    let state = Arc::new(StateHandler::new(args.initial_state));
    let supervisor = Supervisor::new(
        args.id.clone(),
        args.actor_fn,
        args.dispatch,
        Arc::clone(&state),
        Arc::clone(&mailbox),
    );

    Actor {
        id: args.id,
        mailbox,
        supervisor,
    }
}
