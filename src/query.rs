//! Request/response on top of fire-and-forget dispatch.
//!
//! Each query spawns a disposable, single-message actor to collect the
//! response, races it against a timeout, and disconnects it after exactly
//! one of: a matching response, a mismatched message, or timeout expiry.
//! A response arriving after the timeout finds no recipient and is silently
//! discarded by the messaging fabric; it never becomes an error.

use crate::actor::{actor_fn, noop_dispatch, spawn, SpawnArgs};
use crate::error::{FabricError, Result};
use crate::message::{ActorId, Message, MessageId, MessageMeta, Payload};
use crate::messaging::Messaging;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(500);

/// Parameters of one query call.
#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub to: ActorId,
    pub message_type: String,
    pub payload: Option<Payload>,
    pub timeout: Duration,
    /// Advertise the disposable reply actor upstream, so actors hosted on
    /// remote systems can answer.
    pub is_public: bool,
}

impl QueryArgs {
    pub fn new(to: impl Into<ActorId>, message_type: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            message_type: message_type.into(),
            payload: None,
            timeout: DEFAULT_QUERY_TIMEOUT,
            is_public: false,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }
}

/// Type and payload of the response a query resolved with.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub message_type: String,
    pub payload: Option<Payload>,
}

/// Run one request/response exchange through the given fabric.
///
/// Exactly one terminal outcome fires: the response value, an
/// unexpected-response error, or a timeout error.
pub async fn query(messaging: &Arc<Messaging>, args: QueryArgs) -> Result<QueryResponse> {
    let query_id = MessageId::generate();
    let reply_actor_id = ActorId::generate();

    let (response_tx, response_rx) = oneshot::channel::<Result<QueryResponse>>();
    let response_tx = Arc::new(Mutex::new(Some(response_tx)));

    let reply_actor = spawn(SpawnArgs {
        id: reply_actor_id.clone(),
        actor_fn: reply_collector(
            Arc::downgrade(messaging),
            reply_actor_id.clone(),
            query_id.clone(),
            response_tx,
        ),
        // the reply collector never talks outward
        dispatch: noop_dispatch(),
        initial_state: Payload::Null,
    });
    messaging.connect_actor(reply_actor, args.is_public);

    messaging.dispatch(&Message::query_with_id(
        query_id,
        args.to,
        args.message_type,
        args.payload,
        reply_actor_id.clone(),
    ));

    match tokio::time::timeout(args.timeout, response_rx).await {
        Ok(Ok(outcome)) => outcome,
        // the collector vanished without answering; treat like a timeout
        Ok(Err(_closed)) => Err(FabricError::QueryTimeout(args.timeout)),
        Err(_elapsed) => {
            debug!(timeout = ?args.timeout, "query timed out, disposing reply actor");
            let _ = messaging.disconnect_actor(&reply_actor_id);
            Err(FabricError::QueryTimeout(args.timeout))
        }
    }
}

/// Handler of the disposable reply actor: accept the one response correlated
/// to our query, reject anything else, and disconnect either way.
fn reply_collector(
    messaging: Weak<Messaging>,
    reply_actor_id: ActorId,
    query_id: MessageId,
    response_tx: Arc<Mutex<Option<oneshot::Sender<Result<QueryResponse>>>>>,
) -> crate::actor::ActorFn {
    actor_fn(move |ctx| {
        let messaging = messaging.clone();
        let reply_actor_id = reply_actor_id.clone();
        let query_id = query_id.clone();
        let response_tx = Arc::clone(&response_tx);
        async move {
            let outcome = match &ctx.message.meta {
                MessageMeta::Response { irt, .. } if *irt == query_id => Ok(QueryResponse {
                    message_type: ctx.message.message_type.clone(),
                    payload: ctx.message.payload.clone(),
                }),
                _ => Err(FabricError::UnexpectedQueryResponse),
            };

            if let Some(messaging) = messaging.upgrade() {
                let _ = messaging.disconnect_actor(&reply_actor_id);
            }
            if let Some(tx) = response_tx.lock().take() {
                let _ = tx.send(outcome);
            }
            Ok(None)
        }
    })
}
