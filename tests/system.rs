//! End-to-end tests of a single actor system: dispatch, clone isolation,
//! per-actor ordering, and the query protocol.

use actor_fabric::{
    actor_fn, ActorSystem, FabricError, Message, QueryArgs, SpawnSystemArgs,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn system_quicktest() {
    let expected_log: Arc<Mutex<Vec<Message>>> = Arc::new(Mutex::new(Vec::new()));
    let unexpected_log: Arc<Mutex<Vec<Message>>> = Arc::new(Mutex::new(Vec::new()));
    let event_log: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

    let system = ActorSystem::with_id("QUICKTEST");

    let expected_ref = Arc::clone(&expected_log);
    let unexpected_ref = Arc::clone(&unexpected_log);
    let events_ref = Arc::clone(&event_log);
    system.spawn(SpawnSystemArgs::new(
        "TEST_ACTOR",
        actor_fn(move |ctx| {
            let expected = Arc::clone(&expected_ref);
            let unexpected = Arc::clone(&unexpected_ref);
            let events = Arc::clone(&events_ref);
            async move {
                match ctx.message.message_type.as_str() {
                    "TEST_MUTATION" => {
                        events.lock().push(4);
                        expected.lock().push(ctx.message.clone());
                        // scribbling on the received copy must stay local
                        let mut scribble = ctx.message.clone();
                        scribble.payload = Some(json!({ "string": "mutated" }));
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        events.lock().push(5);
                        Ok(None)
                    }
                    "TEST_QUERY" => {
                        events.lock().push(6);
                        expected.lock().push(ctx.message.clone());
                        let response = Message::response_to(
                            &ctx.message,
                            "TEST_RESPONSE",
                            Some(json!({ "string": "test response" })),
                        )?;
                        ctx.dispatch(&response);
                        Ok(None)
                    }
                    _ => {
                        unexpected.lock().push(ctx.message.clone());
                        Ok(None)
                    }
                }
            }
        }),
    ));

    event_log.lock().push(1);
    let mutation = Message::plain(
        "TEST_ACTOR",
        "TEST_MUTATION",
        Some(json!({ "string": "not mutated" })),
    );
    system.dispatch(&mutation);
    event_log.lock().push(2);

    let response_future = system.query(
        QueryArgs::new("TEST_ACTOR", "TEST_QUERY")
            .with_payload(json!({ "string": "test query" })),
    );
    event_log.lock().push(3);

    let response = response_future.await.unwrap();
    event_log.lock().push(7);

    assert_eq!(response.message_type, "TEST_RESPONSE");
    assert_eq!(response.payload, Some(json!({ "string": "test response" })));

    // the actor saw both messages, in dispatch order, unmutated
    let seen = expected_log.lock().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].message_type, "TEST_MUTATION");
    assert_eq!(seen[0].payload, Some(json!({ "string": "not mutated" })));
    assert_eq!(seen[1].message_type, "TEST_QUERY");
    assert_eq!(seen[1].payload, Some(json!({ "string": "test query" })));

    // the caller's copy was never touched by the handler
    assert_eq!(mutation.payload, Some(json!({ "string": "not mutated" })));

    assert!(unexpected_log.lock().is_empty());
    assert_eq!(*event_log.lock(), vec![1, 2, 3, 4, 5, 6, 7]);
}

#[tokio::test]
async fn query_times_out_when_the_responder_is_too_slow() {
    let system = ActorSystem::new();

    let answered: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let answered_ref = Arc::clone(&answered);
    system.spawn(SpawnSystemArgs::new(
        "A",
        actor_fn(move |ctx| {
            let answered = Arc::clone(&answered_ref);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let response = Message::response_to(&ctx.message, "LATE", None)?;
                ctx.dispatch(&response);
                answered.lock().push(ctx.message.message_type.clone());
                Ok(None)
            }
        }),
    ));

    let result = system
        .query(QueryArgs::new("A", "T").with_timeout(Duration::from_millis(5)))
        .await;
    assert!(matches!(result, Err(FabricError::QueryTimeout(_))));

    // the eventual response is delivered to no one and harms nothing
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*answered.lock(), vec!["T"]);

    // the system still answers fresh queries afterwards
    system.spawn(SpawnSystemArgs::new(
        "B",
        actor_fn(|ctx| async move {
            let response = Message::response_to(&ctx.message, "PROMPT", None)?;
            ctx.dispatch(&response);
            Ok(None)
        }),
    ));
    let response = system.query(QueryArgs::new("B", "T")).await.unwrap();
    assert_eq!(response.message_type, "PROMPT");
}

#[tokio::test]
async fn mismatched_responses_reject_the_query() {
    let system = ActorSystem::new();

    // answers with a response correlated to nothing
    system.spawn(SpawnSystemArgs::new(
        "confused",
        actor_fn(|ctx| async move {
            let rsvp = ctx.message.meta.rsvp().cloned().expect("query expected");
            let response = Message {
                message_type: "WRONG".to_string(),
                payload: None,
                error: false,
                meta: actor_fabric::MessageMeta::Response {
                    id: actor_fabric::MessageId::generate(),
                    to: rsvp,
                    irt: "not the right correlation id".into(),
                },
            };
            ctx.dispatch(&response);
            Ok(None)
        }),
    ));

    let result = system.query(QueryArgs::new("confused", "T")).await;
    assert!(matches!(result, Err(FabricError::UnexpectedQueryResponse)));
}

#[tokio::test]
async fn non_response_messages_to_the_reply_actor_reject_the_query() {
    let system = ActorSystem::new();

    system.spawn(SpawnSystemArgs::new(
        "rude",
        actor_fn(|ctx| async move {
            let rsvp = ctx.message.meta.rsvp().cloned().expect("query expected");
            // a plain message instead of a response
            ctx.dispatch(&Message::plain(rsvp, "SMALL_TALK", None));
            Ok(None)
        }),
    ));

    let result = system.query(QueryArgs::new("rude", "T")).await;
    assert!(matches!(result, Err(FabricError::UnexpectedQueryResponse)));
}

#[tokio::test]
async fn queries_against_a_busy_actor_complete_in_dispatch_order() {
    let system = ActorSystem::new();

    let handled: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let handled_ref = Arc::clone(&handled);
    system.spawn(SpawnSystemArgs::new(
        "busy",
        actor_fn(move |ctx| {
            let handled = Arc::clone(&handled_ref);
            async move {
                match ctx.message.message_type.as_str() {
                    "PLAIN" => {
                        handled.lock().push("PLAIN".to_string());
                        Ok(None)
                    }
                    "SLOW_QUERY" => {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        handled.lock().push("SLOW_QUERY".to_string());
                        let response = Message::response_to(&ctx.message, "SLOW_DONE", None)?;
                        ctx.dispatch(&response);
                        Ok(None)
                    }
                    "FAST_QUERY" => {
                        handled.lock().push("FAST_QUERY".to_string());
                        let response = Message::response_to(&ctx.message, "FAST_DONE", None)?;
                        ctx.dispatch(&response);
                        Ok(None)
                    }
                    other => anyhow::bail!("unexpected message type {other}"),
                }
            }
        }),
    ));

    system.dispatch(&Message::plain("busy", "PLAIN", None));

    let completions: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let slow_completions = Arc::clone(&completions);
    let fast_completions = Arc::clone(&completions);

    let slow = system.query(QueryArgs::new("busy", "SLOW_QUERY"));
    let fast = system.query(QueryArgs::new("busy", "FAST_QUERY"));

    let (slow_result, fast_result) = tokio::join!(
        async move {
            let result = slow.await;
            slow_completions.lock().push("SLOW_DONE".to_string());
            result
        },
        async move {
            let result = fast.await;
            fast_completions.lock().push("FAST_DONE".to_string());
            result
        }
    );

    assert_eq!(slow_result.unwrap().message_type, "SLOW_DONE");
    assert_eq!(fast_result.unwrap().message_type, "FAST_DONE");

    // strict per-actor FIFO: the plain message fully processed first, then
    // each query in dispatch order, regardless of handler duration
    assert_eq!(*handled.lock(), vec!["PLAIN", "SLOW_QUERY", "FAST_QUERY"]);
    // end-to-end completion ordering matches dispatch order too
    assert_eq!(*completions.lock(), vec!["SLOW_DONE", "FAST_DONE"]);
}

#[tokio::test]
async fn disconnected_actors_become_unreachable() {
    let system = ActorSystem::new();

    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let log_ref = Arc::clone(&log);
    let actor = system.spawn(SpawnSystemArgs::new(
        "transient",
        actor_fn(move |ctx| {
            let log = Arc::clone(&log_ref);
            async move {
                log.lock().push(ctx.message.message_type.clone());
                Ok(None)
            }
        }),
    ));

    system.dispatch(&Message::plain("transient", "BEFORE", None));
    tokio::time::sleep(Duration::from_millis(50)).await;

    system.disconnect_actor(actor.id()).unwrap();
    system.dispatch(&Message::plain("transient", "AFTER", None));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(*log.lock(), vec!["BEFORE"]);
    assert!(matches!(
        system.disconnect_actor(actor.id()),
        Err(FabricError::ActorNotFound(_))
    ));
}
