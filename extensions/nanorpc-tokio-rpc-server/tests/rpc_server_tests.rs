use futures::future::join_all;
use nanorpc::channel::request_channel;
use nanorpc::queue::{MemoryQueue, QueueTransport};
use nanorpc_rpc_client::{RpcClient, RpcServiceCallerInterface};
use nanorpc_rpc_service::{RpcError, RpcErrorCode, Violation, decode_arguments};
use nanorpc_tokio_rpc_server::{ConcurrencyGate, DispatchMode, RpcServer};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const POLL_TIMEOUT: Duration = Duration::from_millis(50);

async fn connected_pair(queue: &MemoryQueue) -> (RpcServer<MemoryQueue>, RpcClient<MemoryQueue>) {
    let server = RpcServer::new("calc", queue.duplicate()).with_poll_timeout(POLL_TIMEOUT);
    server.connect().await.unwrap();

    let client = RpcClient::new(queue.duplicate());
    client.connect().await.unwrap();

    (server, client)
}

fn add(arguments: Vec<Value>) -> Result<f64, RpcError> {
    let (a, b): (f64, f64) = decode_arguments(arguments)?;
    Ok(a + b)
}

/// Registers `step(label, delay_ms)`, which logs when it starts and when it
/// finishes.
fn register_step(server: &RpcServer<MemoryQueue>, log: Arc<Mutex<Vec<String>>>) {
    register_step_as(server, "step", log);
}

fn register_step_as(server: &RpcServer<MemoryQueue>, method: &str, log: Arc<Mutex<Vec<String>>>) {
    server
        .on(method, move |arguments: Vec<Value>| {
            let log = log.clone();
            async move {
                let (label, delay): (String, u64) = decode_arguments(arguments)?;
                log.lock().unwrap().push(format!("start {label}"));
                tokio::time::sleep(Duration::from_millis(delay)).await;
                log.lock().unwrap().push(format!("end {label}"));
                Ok::<_, RpcError>(label)
            }
        })
        .unwrap();
}

#[tokio::test]
async fn test_registration_chains_and_rejects_duplicates() {
    let queue = MemoryQueue::new();
    let (server, _client) = connected_pair(&queue).await;

    server
        .on_sync("add", add)
        .unwrap()
        .on_sync("neg", |arguments| {
            let (x,): (f64,) = decode_arguments(arguments)?;
            Ok::<_, RpcError>(-x)
        })
        .unwrap();

    let err = server
        .on_sync("add", |_| Ok::<_, RpcError>(0.0))
        .err()
        .unwrap();
    assert!(err.is(RpcErrorCode::DuplicateMethod));
    assert_eq!(err.message, "add method already registered");
}

#[tokio::test]
async fn test_roundtrip_sync_and_async_handlers() {
    let queue = MemoryQueue::new();
    let (server, client) = connected_pair(&queue).await;

    server.on_sync("add", add).unwrap();
    server
        .on("mult", |arguments: Vec<Value>| async move {
            let (a, b): (f64, f64) = decode_arguments(arguments)?;
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, RpcError>(a * b)
        })
        .unwrap();

    let handle = server.run(DispatchMode::Concurrent).await.unwrap();

    let (sum, product) = tokio::join!(
        client.call::<_, f64>("calc", "add", (2.0, 3.0)),
        client.call::<_, f64>("calc", "mult", (4.0, 2.5)),
    );
    assert_eq!(sum.unwrap(), 5.0);
    assert_eq!(product.unwrap(), 10.0);

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_missing_method_gets_a_reply() {
    let queue = MemoryQueue::new();
    let (server, client) = connected_pair(&queue).await;
    let handle = server.run(DispatchMode::Concurrent).await.unwrap();

    let err = client.apply("calc", "nope", vec![]).await.unwrap_err();
    assert!(err.is(RpcErrorCode::MethodNotFound));
    assert_eq!(err.message, "Call calc:nope Missing Method");

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_queued_mode_serializes_calls() {
    let queue = MemoryQueue::new();
    let (server, client) = connected_pair(&queue).await;
    let log = Arc::new(Mutex::new(Vec::new()));
    register_step(&server, log.clone());

    let handle = server.run(DispatchMode::Queued).await.unwrap();

    let slow = tokio::spawn({
        let client = client.clone();
        async move { client.call::<_, String>("calc", "step", ("a", 100)).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    let fast = client.call::<_, String>("calc", "step", ("b", 0)).await;

    assert_eq!(slow.await.unwrap().unwrap(), "a");
    assert_eq!(fast.unwrap(), "b");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start a", "end a", "start b", "end b"]
    );

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_queued_mode_serializes_across_methods() {
    let queue = MemoryQueue::new();
    let (server, client) = connected_pair(&queue).await;
    let log = Arc::new(Mutex::new(Vec::new()));
    register_step_as(&server, "step_a", log.clone());
    register_step_as(&server, "step_b", log.clone());

    let handle = server.run(DispatchMode::Queued).await.unwrap();

    let slow = tokio::spawn({
        let client = client.clone();
        async move { client.call::<_, String>("calc", "step_a", ("a", 100)).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    let fast = client.call::<_, String>("calc", "step_b", ("b", 0)).await;

    assert_eq!(slow.await.unwrap().unwrap(), "a");
    assert_eq!(fast.unwrap(), "b");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start a", "end a", "start b", "end b"]
    );

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_mode_overlaps_calls() {
    let queue = MemoryQueue::new();
    let (server, client) = connected_pair(&queue).await;
    let log = Arc::new(Mutex::new(Vec::new()));
    register_step(&server, log.clone());

    let handle = server.run(DispatchMode::Concurrent).await.unwrap();

    let slow = tokio::spawn({
        let client = client.clone();
        async move { client.call::<_, String>("calc", "step", ("a", 150)).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    let fast = client.call::<_, String>("calc", "step", ("b", 0)).await;

    // The fast call is answered while the slow one is still running.
    assert_eq!(fast.unwrap(), "b");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start a", "start b", "end b"]
    );

    assert_eq!(slow.await.unwrap().unwrap(), "a");
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_queued_mode_survives_failing_handlers() {
    let queue = MemoryQueue::new();
    let (server, client) = connected_pair(&queue).await;

    server
        .on_sync("fail", |_| Err::<Value, _>("boom"))
        .unwrap()
        .on_sync("panic", |_| -> Result<Value, RpcError> { panic!("kaboom") })
        .unwrap()
        .on_sync("add", add)
        .unwrap();

    let handle = server.run(DispatchMode::Queued).await.unwrap();

    let err = client.apply("calc", "fail", vec![]).await.unwrap_err();
    assert!(err.is(RpcErrorCode::CallError));
    assert_eq!(err.message, "Call calc:fail boom");

    let err = client.apply("calc", "panic", vec![]).await.unwrap_err();
    assert!(err.is(RpcErrorCode::CallError));
    assert!(err.message.contains("kaboom"));

    // The gate was released both times.
    let sum: f64 = client.call("calc", "add", (1.0, 1.0)).await.unwrap();
    assert_eq!(sum, 2.0);

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_malformed_payloads_are_discarded() {
    let queue = MemoryQueue::new();
    let (server, client) = connected_pair(&queue).await;
    server.on_sync("add", add).unwrap();

    let request = request_channel("calc");
    let raw = client.transport();
    raw.push(&request, "not json".to_string()).await.unwrap();
    raw.push(&request, r#"{"id":"x","method":7}"#.to_string())
        .await
        .unwrap();
    raw.push(&request, r#"{"id":"y","status":0,"result":1}"#.to_string())
        .await
        .unwrap();

    let handle = server.run(DispatchMode::Concurrent).await.unwrap();

    let sum: f64 = client.call("calc", "add", (20.0, 22.0)).await.unwrap();
    assert_eq!(sum, 42.0);
    assert_eq!(queue.list_len(&request), 0);

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_invalid_calls_are_discarded_without_reply() {
    let queue = MemoryQueue::new();
    let (server, client) = connected_pair(&queue).await;
    let invoked = Arc::new(AtomicUsize::new(0));

    server
        .on_sync("add", {
            let invoked = invoked.clone();
            move |arguments| {
                invoked.fetch_add(1, Ordering::SeqCst);
                add(arguments)
            }
        })
        .unwrap();
    server.validators().insert("add", |call: &Value| {
        match call["arguments"].as_array().map(Vec::len) {
            Some(2) => Ok(()),
            _ => Err(vec![Violation::new(
                "minItems",
                "/arguments",
                "must have 2 items",
            )]),
        }
    });

    let handle = server.run(DispatchMode::Concurrent).await.unwrap();
    let client = client.with_timeout(Duration::from_millis(200));

    let err = client
        .apply("calc", "add", vec![json!(1)])
        .await
        .unwrap_err();
    assert!(err.is(RpcErrorCode::Timeout));
    assert_eq!(invoked.load(Ordering::SeqCst), 0);

    let sum: f64 = client.call("calc", "add", (1.0, 2.0)).await.unwrap();
    assert_eq!(sum, 3.0);
    assert_eq!(invoked.load(Ordering::SeqCst), 1);

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_servers_sharing_a_name_split_the_work() {
    let queue = MemoryQueue::new();
    let invoked = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    for _ in 0..3 {
        let server = RpcServer::new("calc", queue.duplicate()).with_poll_timeout(POLL_TIMEOUT);
        server.connect().await.unwrap();
        server
            .on_sync("add", {
                let invoked = invoked.clone();
                move |arguments| {
                    invoked.fetch_add(1, Ordering::SeqCst);
                    add(arguments)
                }
            })
            .unwrap();
        handles.push(server.run(DispatchMode::Concurrent).await.unwrap());
    }

    let client = RpcClient::new(queue.duplicate());
    client.connect().await.unwrap();

    let calls = (0..20).map(|i| {
        let client = client.clone();
        async move { client.call::<_, f64>("calc", "add", (i as f64, 1.0)).await }
    });
    let results = join_all(calls).await;

    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), i as f64 + 1.0);
    }
    assert_eq!(invoked.load(Ordering::SeqCst), 20);

    for handle in handles {
        handle.stop().await.unwrap();
    }
}

#[tokio::test]
async fn test_stop_halts_polling_and_closes_connection() {
    let queue = MemoryQueue::new();
    let (server, client) = connected_pair(&queue).await;
    server.on_sync("add", add).unwrap();

    let handle = server.run(DispatchMode::Concurrent).await.unwrap();
    assert!(handle.is_running());
    handle.stop().await.unwrap();

    let client = client.with_timeout(Duration::from_millis(150));
    let err = client.apply("calc", "add", vec![json!(1), json!(2)]).await.unwrap_err();
    assert!(err.is(RpcErrorCode::Timeout));

    // The call is still waiting on the request list for the next server.
    assert_eq!(queue.list_len(&request_channel("calc")), 1);
}

#[tokio::test]
async fn test_shared_transport_is_left_open() {
    let queue = MemoryQueue::new();
    let shared = Arc::new(queue.duplicate());
    shared.connect().await.unwrap();

    let server = RpcServer::with_shared_transport("calc", shared.clone())
        .with_poll_timeout(POLL_TIMEOUT);
    server.connect().await.unwrap();

    let handle = server.run(DispatchMode::Queued).await.unwrap();
    handle.stop().await.unwrap();
    server.close().await.unwrap();

    assert!(shared.is_ready());
}

#[test]
fn test_gate_modes() {
    assert_eq!(DispatchMode::default(), DispatchMode::Concurrent);
    assert_eq!(
        ConcurrencyGate::new(DispatchMode::Queued).mode(),
        DispatchMode::Queued
    );
    assert_eq!(
        ConcurrencyGate::new(DispatchMode::Concurrent).mode(),
        DispatchMode::Concurrent
    );
}
