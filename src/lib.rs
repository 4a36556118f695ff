//! Actor-based message passing runtime with a star-topology routing fabric.
//!
//! Independent units of state (actors) communicate exclusively by exchanging
//! immutable messages through per-actor mailboxes. A per-system messaging
//! fabric routes messages to local actors or to a single upstream link, and
//! a central router interconnects multiple systems, owning the global map
//! from actor id to hosting system.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────┐        ┌────────────┐        ┌───────────────────────┐
//! │   ActorSystem "A"     │        │   Router   │        │   ActorSystem "B"     │
//! │                       │ uplink │            │ uplink │                       │
//! │  Messaging ───────────┼────────┤ id → owner ├────────┼─────────── Messaging  │
//! │   │        downlink   │        │            │  down- │             │         │
//! │   ▼                   │        └────────────┘  link  │             ▼         │
//! │  Actor = mailbox      │                              │            Actor      │
//! │          + state      │                              │                       │
//! │          + supervisor │                              │                       │
//! └───────────────────────┘                              └───────────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - Per actor, at most one handler invocation is in flight at any time, and
//!   invocations observe messages in strict FIFO delivery order. Different
//!   actors run concurrently; there is no global lock.
//! - Every message hand-off is a structural deep copy. No actor ever holds a
//!   reference into another actor's mailbox or state.
//! - `dispatch` never blocks its caller and never fails. Messages without a
//!   reachable recipient are discarded.
//! - Actor id collisions across systems are resolved by quarantining the
//!   connection that published second; surviving connections are unaffected.
//!
//! # Example
//!
//! ```no_run
//! use actor_fabric::{actor_fn, ActorSystem, Message, QueryArgs, SpawnSystemArgs};
//! use serde_json::json;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let system = ActorSystem::new();
//!
//! system.spawn(SpawnSystemArgs::new(
//!     "greeter",
//!     actor_fn(|ctx| async move {
//!         if ctx.message.is_query() {
//!             let response =
//!                 Message::response_to(&ctx.message, "GREETING", Some(json!({ "hi": true })))?;
//!             ctx.dispatch(&response);
//!         }
//!         Ok(None)
//!     }),
//! ));
//!
//! let response = system.query(QueryArgs::new("greeter", "HELLO")).await?;
//! assert_eq!(response.message_type, "GREETING");
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod error;
pub mod killswitch;
pub mod mailbox;
pub mod message;
pub mod messaging;
pub mod query;
pub mod remoting;
pub mod router;
pub mod state;
pub mod supervisor;
pub mod system;

pub use actor::{actor_fn, noop_dispatch, spawn, Actor, ActorContext, ActorFn, DispatchFn, SpawnArgs};
pub use error::{FabricError, Result};
pub use killswitch::Killswitch;
pub use mailbox::Mailbox;
pub use message::{ActorId, Message, MessageId, MessageMeta, Payload, SystemId};
pub use messaging::{ActorConnection, Messaging};
pub use query::{QueryArgs, QueryResponse, DEFAULT_QUERY_TIMEOUT};
pub use remoting::{Downlink, OnDisconnectedFn, Uplink};
pub use router::Router;
pub use state::StateHandler;
pub use supervisor::Supervisor;
pub use system::{ActorSystem, SpawnSystemArgs};
