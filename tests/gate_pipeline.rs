//! End-to-end tests: client → gate server → mock ModSecurity / mock upstream.

use axum::http::StatusCode;

use modsec_gate::config::GateServerConfig;

mod common;

fn config(modsecurity: std::net::SocketAddr, upstream: std::net::SocketAddr) -> GateServerConfig {
    let mut config = GateServerConfig::default();
    config.modsecurity.modsecurity_url = format!("http://{}", modsecurity);
    config.modsecurity.max_body_size = 1024;
    config.upstream.url = format!("http://{}", upstream);
    config
}

#[tokio::test]
async fn test_allowed_request_is_mirrored_and_forwarded() {
    let (waf_addr, waf_seen) = common::start_mock(200, vec![], "").await;
    let (app_addr, app_seen) = common::start_mock(201, vec![("x-app", "1")], "created").await;
    let (gate_addr, shutdown) = common::start_gate(config(waf_addr, app_addr)).await;

    let res = common::client()
        .post(format!("http://{}/orders?id=9", gate_addr))
        .header("x-tenant", "acme")
        .body("item=book&qty=2")
        .send()
        .await
        .expect("Gate unreachable");

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["x-app"], "1");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "created");

    let waf = waf_seen.lock().unwrap().clone();
    assert_eq!(waf.len(), 1);
    assert_eq!(waf[0].method, "POST");
    assert_eq!(waf[0].path_and_query, "/orders?id=9");
    assert_eq!(waf[0].header("x-tenant"), Some("acme"));
    assert_eq!(&waf[0].body[..], b"item=book&qty=2");

    let app = app_seen.lock().unwrap().clone();
    assert_eq!(app.len(), 1);
    assert_eq!(app[0].path_and_query, "/orders?id=9");
    assert_eq!(&app[0].body[..], b"item=book&qty=2");
    assert_eq!(app[0].header("x-request-id"), waf[0].header("x-request-id"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_blocked_request_relays_verdict() {
    let (waf_addr, _) = common::start_mock(403, vec![("x-modsec-rule", "941100")], "blocked").await;
    let (app_addr, app_seen) = common::start_mock(200, vec![], "upstream").await;
    let (gate_addr, shutdown) = common::start_gate(config(waf_addr, app_addr)).await;

    let res = common::client()
        .post(format!("http://{}/search", gate_addr))
        .body("q=<script>alert(1)</script>")
        .send()
        .await
        .expect("Gate unreachable");

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.headers()["x-modsec-rule"], "941100");
    assert_eq!(res.text().await.unwrap(), "blocked");
    assert!(app_seen.lock().unwrap().is_empty(), "Upstream must not be called");

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_gets_413() {
    let (waf_addr, waf_seen) = common::start_mock(200, vec![], "").await;
    let (app_addr, app_seen) = common::start_mock(200, vec![], "upstream").await;
    let (gate_addr, shutdown) = common::start_gate(config(waf_addr, app_addr)).await;

    let res = common::client()
        .post(format!("http://{}/upload", gate_addr))
        .body(vec![b'z'; 2000])
        .send()
        .await
        .expect("Gate unreachable");

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(res.bytes().await.unwrap().is_empty());
    assert!(waf_seen.lock().unwrap().is_empty());
    assert!(app_seen.lock().unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_waf_server_error_relayed_unless_ignored() {
    let (waf_addr, _) = common::start_mock(500, vec![], "waf failure").await;
    let (app_addr, app_seen) = common::start_mock(200, vec![], "upstream").await;

    let (gate_addr, shutdown) = common::start_gate(config(waf_addr, app_addr)).await;
    let res = common::client()
        .get(format!("http://{}/", gate_addr))
        .send()
        .await
        .expect("Gate unreachable");
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), "waf failure");
    assert!(app_seen.lock().unwrap().is_empty());
    shutdown.trigger();

    let mut ignoring = config(waf_addr, app_addr);
    ignoring.modsecurity.ignore_500_error = true;
    let (gate_addr, shutdown) = common::start_gate(ignoring).await;
    let res = common::client()
        .get(format!("http://{}/", gate_addr))
        .send()
        .await
        .expect("Gate unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "upstream");
    assert_eq!(app_seen.lock().unwrap().len(), 1);
    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_waf_fails_open_or_closed() {
    let waf_addr = common::unreachable_addr();
    let (app_addr, app_seen) = common::start_mock(200, vec![], "upstream").await;

    let (gate_addr, shutdown) = common::start_gate(config(waf_addr, app_addr)).await;
    let res = common::client()
        .post(format!("http://{}/pay", gate_addr))
        .body("amount=10")
        .send()
        .await
        .expect("Gate unreachable");
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(res.bytes().await.unwrap().is_empty());
    assert!(app_seen.lock().unwrap().is_empty());
    shutdown.trigger();

    let mut open = config(waf_addr, app_addr);
    open.modsecurity.interrupt_on_error = false;
    let (gate_addr, shutdown) = common::start_gate(open).await;
    let res = common::client()
        .post(format!("http://{}/pay", gate_addr))
        .body("amount=10")
        .send()
        .await
        .expect("Gate unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    let app = app_seen.lock().unwrap().clone();
    assert_eq!(app.len(), 1);
    assert_eq!(&app[0].body[..], b"amount=10");
    shutdown.trigger();
}

#[tokio::test]
async fn test_websocket_upgrade_skips_waf() {
    let (waf_addr, waf_seen) = common::start_mock(403, vec![], "blocked").await;
    let (app_addr, app_seen) = common::start_mock(200, vec![], "upstream").await;
    let (gate_addr, shutdown) = common::start_gate(config(waf_addr, app_addr)).await;

    let res = common::client()
        .get(format!("http://{}/socket", gate_addr))
        .header("upgrade", "websocket")
        .send()
        .await
        .expect("Gate unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert!(waf_seen.lock().unwrap().is_empty());
    assert_eq!(app_seen.lock().unwrap().len(), 1);

    shutdown.trigger();
}
