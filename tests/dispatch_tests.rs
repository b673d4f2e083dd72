//! End-to-end dispatch tests over a real socket.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http_dispatcher::http::ServerState;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use http_dispatcher::{Handler, HandlerError, HttpServer, Request, Response};

mod common;

#[tokio::test]
async fn registered_route_is_invoked_once_per_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let server = HttpServer::new(common::test_config());
    server.register(
        "GET",
        "/search",
        Handler::new("text/plain", move |req: Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok::<_, HandlerError>(format!(
                    "{}|q={}|x={}",
                    req.url(),
                    req.query("q").unwrap_or(""),
                    req.query("x").unwrap_or("")
                ))
            }
        }),
    );
    let (server, addr) = common::start(server).await;

    let res = common::client()
        .get(format!("http://{}/search?q=a&q=b&x=1", addr))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), "/search|q=a|x=1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_route_is_404() {
    let server = HttpServer::new(common::test_config());
    server.register(
        "GET",
        "/known",
        Handler::new("text/plain", |_req| async { Ok::<_, HandlerError>("known") }),
    );
    let (server, addr) = common::start(server).await;
    let client = common::client();

    for (method, path) in [(reqwest::Method::POST, "/known"), (reqwest::Method::GET, "/unknown?x=1")] {
        let res = client
            .request(method, format!("http://{}{}", addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404);
        assert_eq!(res.headers()["content-type"], "text/plain");
        assert_eq!(res.text().await.unwrap(), "not found");
    }

    server.shutdown().await;
}

#[tokio::test]
async fn structured_response_round_trip() {
    let server = HttpServer::new(common::test_config());
    server.register(
        "POST",
        "/items",
        Handler::new("application/json", |req: Request| async move {
            assert_eq!(req.content_type(), Some("application/json"));
            Ok::<_, HandlerError>(
                Response::builder()
                    .status(201)
                    .body("ok")
                    .header("Location", "/items/1")
                    .build(),
            )
        }),
    );
    let (server, addr) = common::start(server).await;

    let res = common::client()
        .post(format!("http://{}/items", addr))
        .header("Content-Type", "application/json")
        .body(r#"{"name":"widget"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 201);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["content-length"], "2");
    assert_eq!(res.headers()["location"], "/items/1");
    assert_eq!(res.text().await.unwrap(), "ok");

    server.shutdown().await;
}

#[tokio::test]
async fn empty_result_is_204() {
    let server = HttpServer::new(common::test_config());
    server.register(
        "DELETE",
        "/items/1",
        Handler::new("application/json", |_req| async { Ok::<_, HandlerError>(()) }),
    );
    let (server, addr) = common::start(server).await;

    let res = common::client()
        .delete(format!("http://{}/items/1", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 204);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.text().await.unwrap().is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn failing_handler_is_500_with_message() {
    let server = HttpServer::new(common::test_config());
    server.register(
        "GET",
        "/fail",
        Handler::new("text/plain", |_req| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err::<(), _>(HandlerError::new("boom"))
        }),
    );
    let (server, addr) = common::start(server).await;

    let res = common::client()
        .get(format!("http://{}/fail", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "boom");

    server.shutdown().await;
}

#[tokio::test]
async fn chunked_body_over_cap_is_413() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut config = common::test_config();
    config.listener.max_body_size = 8;
    let server = HttpServer::new(config);
    server.register(
        "POST",
        "/echo",
        Handler::new("text/plain", move |req: Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, HandlerError>(req.body().to_string()) }
        }),
    );
    let (server, addr) = common::start(server).await;

    // No Content-Length, so only the aggregation cap can catch the overflow.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(
            b"POST /echo HTTP/1.1\r\nHost: localhost\r\nTransfer-Encoding: chunked\r\n\
              Connection: close\r\n\r\n10\r\n0123456789abcdef\r\n0\r\n\r\n",
        )
        .await
        .unwrap();

    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("no response before timeout")
        .unwrap();
    let raw = String::from_utf8_lossy(&raw);

    assert!(raw.starts_with("HTTP/1.1 413"), "{}", raw);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    server.shutdown().await;
}

#[tokio::test]
async fn late_registration_replaces_handler() {
    let server = HttpServer::new(common::test_config());
    server.register(
        "GET",
        "/v",
        Handler::new("text/plain", |_req| async { Ok::<_, HandlerError>("one") }),
    );
    let (server, addr) = common::start(server).await;
    server.register(
        "GET",
        "/v",
        Handler::new("text/plain", |_req| async { Ok::<_, HandlerError>("two") }),
    );

    let res = common::client()
        .get(format!("http://{}/v", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "two");

    server.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_accepting() {
    let (server, addr) = common::start(HttpServer::new(common::test_config())).await;
    assert_eq!(server.state(), ServerState::Listening);

    server.shutdown().await;
    assert_eq!(server.state(), ServerState::Stopped);

    let result = common::client()
        .get(format!("http://{}/", addr))
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(result.is_err(), "listener should be closed after shutdown");
}
