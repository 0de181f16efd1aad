//! Socket-level tests: liveness, body limits and the shutdown drain.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use gatehouse_core::{FnHandler, Response, ResponseExt, Role, RoleSet, ShutdownSignal};
use gatehouse_middleware::{CollectingSink, Pipeline, RouteTable};
use gatehouse_server::{DrainOutcome, Server, ServerConfig, ServerError};
use gatehouse_token::{TokenCodec, TokenKind};
use http::header::AUTHORIZATION;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

const KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";

struct Running {
    addr: SocketAddr,
    shutdown: ShutdownSignal,
    entered: Arc<Notify>,
    token: String,
    records: CollectingSink,
    handle: JoinHandle<Result<DrainOutcome, ServerError>>,
}

async fn start(config: ServerConfig, slow_for: Duration) -> Running {
    let codec = TokenCodec::new(&KEY).unwrap();
    let token = codec
        .issue("ops@example.com", Role::Admin, TokenKind::Access, Duration::from_secs(60))
        .unwrap()
        .into_string();

    let entered = Arc::new(Notify::new());
    let slow_entered = Arc::clone(&entered);

    let routes = RouteTable::new()
        .route(
            Method::GET,
            "/ping",
            RoleSet::ANY,
            FnHandler::new(|_ctx, _identity, _req| async {
                Response::json(StatusCode::OK, &serde_json::json!({"pong": true}))
            }),
        )
        .route(
            Method::POST,
            "/echo",
            RoleSet::ANY,
            FnHandler::new(|_ctx, _identity, request: gatehouse_core::Request| async move {
                Ok::<_, gatehouse_core::ApiError>(Response::json_bytes(
                    StatusCode::OK,
                    request.into_body(),
                ))
            }),
        )
        .route(
            Method::GET,
            "/slow",
            RoleSet::ANY,
            FnHandler::new(move |_ctx, _identity, _req| {
                let entered = Arc::clone(&slow_entered);
                async move {
                    entered.notify_one();
                    tokio::time::sleep(slow_for).await;
                    Response::json(StatusCode::OK, &serde_json::json!({"done": true}))
                }
            }),
        );

    let shutdown = ShutdownSignal::new();
    let records = CollectingSink::new();
    let pipeline = Pipeline::builder(Arc::new(codec))
        .routes(routes)
        .shutdown(shutdown.clone())
        .record_sink(Arc::new(records.clone()))
        .build();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new(config, pipeline);
    let handle = tokio::spawn(server.serve(listener, shutdown.clone()));

    Running {
        addr,
        shutdown,
        entered,
        token,
        records,
        handle,
    }
}

async fn send(
    addr: SocketAddr,
    request: http::Request<Full<Bytes>>,
) -> Result<(StatusCode, http::HeaderMap, Bytes), hyper::Error> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
    tokio::spawn(conn);

    let response = sender.send_request(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await?.to_bytes();
    Ok((status, headers, body))
}

fn get(path: &str, token: Option<&str>) -> http::Request<Full<Bytes>> {
    let mut builder = http::Request::builder().method(Method::GET).uri(path);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Full::new(Bytes::new())).unwrap()
}

fn json(body: &Bytes) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health_needs_no_credential() {
    let server = start(ServerConfig::default(), Duration::ZERO).await;

    let (status, headers, body) = send(server.addr, get("/health", None)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"status": "ok"}));
    assert!(headers.contains_key("x-request-id"));

    let record = server.records.last().unwrap();
    assert_eq!(server.records.len(), 1);
    assert_eq!(record.path, "/health");
    assert_eq!(record.status, StatusCode::OK);

    server.shutdown.trigger();
    assert_eq!(server.handle.await.unwrap().unwrap(), DrainOutcome::Clean);
}

#[tokio::test]
async fn test_request_reaches_pipeline() {
    let server = start(ServerConfig::default(), Duration::ZERO).await;

    let (status, headers, body) = send(server.addr, get("/ping", Some(&server.token)))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"pong": true}));
    assert!(headers.contains_key("x-request-id"));

    let (status, _, body) = send(server.addr, get("/ping", None)).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json(&body), serde_json::json!({"error": "unauthorized"}));

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_oversize_body_is_bad_request() {
    let config = ServerConfig::builder().max_body_bytes(16).build();
    let server = start(config, Duration::ZERO).await;

    let small = http::Request::builder()
        .method(Method::POST)
        .uri("/echo")
        .header(AUTHORIZATION, format!("Bearer {}", server.token))
        .body(Full::new(Bytes::from_static(br#"{"a":1}"#)))
        .unwrap();
    let (status, _, body) = send(server.addr, small).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"a": 1}));

    let large = http::Request::builder()
        .method(Method::POST)
        .uri("/echo")
        .header(AUTHORIZATION, format!("Bearer {}", server.token))
        .body(Full::new(Bytes::from(vec![b'x'; 64])))
        .unwrap();
    let (status, _, body) = send(server.addr, large).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json(&body),
        serde_json::json!({"error": "request body too large"})
    );

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_oversize_body_without_credential_is_unauthorized() {
    let config = ServerConfig::builder().max_body_bytes(16).build();
    let server = start(config, Duration::ZERO).await;

    let large = http::Request::builder()
        .method(Method::POST)
        .uri("/echo")
        .body(Full::new(Bytes::from(vec![b'x'; 64])))
        .unwrap();
    let (status, _, body) = send(server.addr, large).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json(&body), serde_json::json!({"error": "unauthorized"}));
    assert_eq!(server.records.len(), 1);

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_in_flight_request_finishes_during_drain() {
    let config = ServerConfig::builder()
        .shutdown_timeout(Duration::from_secs(5))
        .build();
    let server = start(config, Duration::from_millis(200)).await;

    let addr = server.addr;
    let token = server.token.clone();
    let client = tokio::spawn(async move { send(addr, get("/slow", Some(&token))).await });

    server.entered.notified().await;
    server.shutdown.trigger();

    let (status, _, body) = client.await.unwrap().unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"done": true}));

    assert_eq!(server.handle.await.unwrap().unwrap(), DrainOutcome::Clean);
}

#[tokio::test]
async fn test_drain_overrun_aborts_connections() {
    let config = ServerConfig::builder()
        .shutdown_timeout(Duration::from_millis(100))
        .build();
    let server = start(config, Duration::from_secs(30)).await;

    let addr = server.addr;
    let token = server.token.clone();
    let client = tokio::spawn(async move { send(addr, get("/slow", Some(&token))).await });

    server.entered.notified().await;
    server.shutdown.trigger();

    let outcome = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("drain is bounded")
        .unwrap()
        .unwrap();
    assert_eq!(outcome, DrainOutcome::Forced { aborted: 1 });

    // The aborted connection is closed without a response.
    assert!(client.await.unwrap().is_err());
}

#[tokio::test]
async fn test_no_new_connections_after_shutdown() {
    let server = start(ServerConfig::default(), Duration::ZERO).await;
    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();

    assert!(TcpStream::connect(server.addr).await.is_err());
}

#[tokio::test]
async fn test_bind_errors() {
    let codec = TokenCodec::new(&KEY).unwrap();
    let pipeline = Pipeline::builder(Arc::new(codec)).build();
    let config = ServerConfig::builder().http_addr("not-an-address").build();
    let err = Server::new(config, pipeline)
        .run_with_shutdown(ShutdownSignal::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::InvalidAddress { .. }));

    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap();
    let codec = TokenCodec::new(&KEY).unwrap();
    let pipeline = Pipeline::builder(Arc::new(codec)).build();
    let config = ServerConfig::builder().http_addr(addr.to_string()).build();
    let err = Server::new(config, pipeline)
        .run_with_shutdown(ShutdownSignal::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::Bind { .. }));
}
