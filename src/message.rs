//! Message envelope and identity types.
//!
//! Every message is one of three variants, discriminated by the `cat` tag of
//! its meta block: plain (`P`, fire-and-forget), query (`Q`, carries an
//! `rsvp` address awaiting a response) and response (`R`, carries an `irt`
//! id correlating it to the originating query).
//!
//! Payloads are restricted to JSON-safe data (`serde_json::Value`), which
//! keeps every message structurally deep-clonable and stops actors from
//! leaking references to their internals through a message.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// JSON-safe message payload. Cloning is a structural deep copy.
pub type Payload = serde_json::Value;

/// Opaque actor identifier. Unique within a system; systems administered
/// independently may collide, which the router detects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Create a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ActorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Message envelope identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of one messaging system attached to the router.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(String);

impl SystemId {
    pub fn generate() -> Self {
        Self(format!("system-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SystemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SystemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Meta block of a message, tagged by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cat")]
pub enum MessageMeta {
    /// Fire-and-forget.
    #[serde(rename = "P")]
    Plain { id: MessageId, to: ActorId },

    /// Request expecting a response at the `rsvp` address.
    #[serde(rename = "Q")]
    Query {
        id: MessageId,
        to: ActorId,
        rsvp: ActorId,
    },

    /// Response correlated to a query via `irt` ("in reply to").
    #[serde(rename = "R")]
    Response {
        id: MessageId,
        to: ActorId,
        irt: MessageId,
    },
}

impl MessageMeta {
    pub fn id(&self) -> &MessageId {
        match self {
            MessageMeta::Plain { id, .. }
            | MessageMeta::Query { id, .. }
            | MessageMeta::Response { id, .. } => id,
        }
    }

    /// Destination actor id, uniform across all variants.
    pub fn to(&self) -> &ActorId {
        match self {
            MessageMeta::Plain { to, .. }
            | MessageMeta::Query { to, .. }
            | MessageMeta::Response { to, .. } => to,
        }
    }

    /// Reply address, present on queries only.
    pub fn rsvp(&self) -> Option<&ActorId> {
        match self {
            MessageMeta::Query { rsvp, .. } => Some(rsvp),
            _ => None,
        }
    }

    /// Correlation id, present on responses only.
    pub fn irt(&self) -> Option<&MessageId> {
        match self {
            MessageMeta::Response { irt, .. } => Some(irt),
            _ => None,
        }
    }
}

/// Immutable message envelope.
///
/// Handed to the runtime by value or cloned on every hand-off, so no two
/// parties ever share a payload by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub message_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,

    /// Error marker, only meaningful on responses.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,

    pub meta: MessageMeta,
}

impl Message {
    /// Build a plain fire-and-forget message with a fresh id.
    pub fn plain(to: impl Into<ActorId>, message_type: impl Into<String>, payload: Option<Payload>) -> Self {
        Self {
            message_type: message_type.into(),
            payload,
            error: false,
            meta: MessageMeta::Plain {
                id: MessageId::generate(),
                to: to.into(),
            },
        }
    }

    /// Build a query message with a fresh id.
    pub fn query(
        to: impl Into<ActorId>,
        message_type: impl Into<String>,
        payload: Option<Payload>,
        rsvp: impl Into<ActorId>,
    ) -> Self {
        Self::query_with_id(MessageId::generate(), to, message_type, payload, rsvp)
    }

    /// Build a query message under a caller-chosen correlation id. The query
    /// module uses this so it can match the eventual response.
    pub fn query_with_id(
        id: MessageId,
        to: impl Into<ActorId>,
        message_type: impl Into<String>,
        payload: Option<Payload>,
        rsvp: impl Into<ActorId>,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            payload,
            error: false,
            meta: MessageMeta::Query {
                id,
                to: to.into(),
                rsvp: rsvp.into(),
            },
        }
    }

    /// Build the response to a query: addressed to the query's `rsvp`,
    /// correlated through `irt` = the query's id.
    pub fn response_to(
        query: &Message,
        message_type: impl Into<String>,
        payload: Option<Payload>,
    ) -> crate::Result<Self> {
        Self::build_response(query, message_type, payload, false)
    }

    /// Like [`Message::response_to`], with the error marker set.
    pub fn error_response_to(
        query: &Message,
        message_type: impl Into<String>,
        payload: Option<Payload>,
    ) -> crate::Result<Self> {
        Self::build_response(query, message_type, payload, true)
    }

    fn build_response(
        query: &Message,
        message_type: impl Into<String>,
        payload: Option<Payload>,
        error: bool,
    ) -> crate::Result<Self> {
        let (id, rsvp) = match &query.meta {
            MessageMeta::Query { id, rsvp, .. } => (id.clone(), rsvp.clone()),
            _ => return Err(crate::FabricError::NotAQuery),
        };
        Ok(Self {
            message_type: message_type.into(),
            payload,
            error,
            meta: MessageMeta::Response {
                id: MessageId::generate(),
                to: rsvp,
                irt: id,
            },
        })
    }

    /// Deep copy re-addressed to a new recipient under a fresh id. The rest
    /// of the meta block (category, rsvp/irt) is preserved.
    pub fn forwarded_copy(&self, to: impl Into<ActorId>) -> Self {
        let mut copy = self.clone();
        let to = to.into();
        copy.meta = match copy.meta {
            MessageMeta::Plain { .. } => MessageMeta::Plain {
                id: MessageId::generate(),
                to,
            },
            MessageMeta::Query { rsvp, .. } => MessageMeta::Query {
                id: MessageId::generate(),
                to,
                rsvp,
            },
            MessageMeta::Response { irt, .. } => MessageMeta::Response {
                id: MessageId::generate(),
                to,
                irt,
            },
        };
        copy
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.meta, MessageMeta::Plain { .. })
    }

    pub fn is_query(&self) -> bool {
        matches!(self.meta, MessageMeta::Query { .. })
    }

    pub fn is_response(&self) -> bool {
        matches!(self.meta, MessageMeta::Response { .. })
    }

    pub fn to(&self) -> &ActorId {
        self.meta.to()
    }
}
