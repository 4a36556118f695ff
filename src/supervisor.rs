//! Per-actor processing loop.
//!
//! The supervisor guarantees the binding invariant of the runtime: for a
//! given actor, at most one handler invocation is in flight at any time, and
//! invocations observe mailbox messages in strict FIFO delivery order.
//!
//! Triggering is non-blocking: [`Supervisor::process_messages`] schedules a
//! task instead of draining on the caller's stack, so a handler dispatching
//! to another actor (or to itself) can never recurse into a drain loop.
//! Handler errors drop the offending message, are reported through
//! `tracing`, and never tear the actor down.

use crate::actor::{ActorContext, ActorFn, DispatchFn};
use crate::mailbox::Mailbox;
use crate::message::ActorId;
use crate::state::StateHandler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::error;

pub struct Supervisor {
    actor_id: ActorId,
    actor_fn: ActorFn,
    dispatch: DispatchFn,
    state: Arc<StateHandler>,
    mailbox: Arc<Mailbox>,
    /// Idle (false) / Processing (true). Guards the single-flight drain.
    processing: AtomicBool,
}

impl Supervisor {
    pub fn new(
        actor_id: ActorId,
        actor_fn: ActorFn,
        dispatch: DispatchFn,
        state: Arc<StateHandler>,
        mailbox: Arc<Mailbox>,
    ) -> Arc<Self> {
        Arc::new(Self {
            actor_id,
            actor_fn,
            dispatch,
            state,
            mailbox,
            processing: AtomicBool::new(false),
        })
    }

    /// Trigger a processing pass. Returns immediately; if a drain loop is
    /// already running for this actor, the trigger is a no-op.
    pub fn process_messages(self: &Arc<Self>) {
        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if supervisor
                    .processing
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    // another trigger already owns the drain loop
                    return;
                }
                supervisor.drain().await;
                supervisor.processing.store(false, Ordering::Release);
                // a delivery racing the flag release must not be stranded
                if supervisor.mailbox.is_empty() {
                    return;
                }
            }
        });
    }

    async fn drain(&self) {
        while let Some(message) = self.mailbox.get_oldest() {
            let ctx = ActorContext {
                state: self.state.get(),
                message,
                dispatch: Arc::clone(&self.dispatch),
            };
            match (self.actor_fn)(ctx).await {
                Ok(Some(new_state)) => self.state.set(new_state),
                Ok(None) => {}
                Err(err) => {
                    // the message that caused the error is dropped below
                    error!(
                        actor_id = %self.actor_id,
                        error = %err,
                        "message handler failed, dropping message"
                    );
                }
            }
            self.mailbox.delete_oldest();
        }
    }
}
