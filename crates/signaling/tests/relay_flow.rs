//! End-to-end tests over real WebSocket connections.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use tandem_signaling::{SignalingConfig, SignalingServer};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server(config: SignalingConfig) -> SocketAddr {
    let server = SignalingServer::bind(config).await.expect("bind server");
    let addr = server.local_addr();
    tokio::spawn(server.run());
    addr
}

fn ephemeral() -> SignalingConfig {
    SignalingConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    }
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}"))
        .await
        .expect("connect");
    ws
}

async fn send(ws: &mut Client, value: Value) {
    ws.send(Message::Text(value.to_string()))
        .await
        .expect("send frame");
}

async fn recv(ws: &mut Client) -> Value {
    loop {
        let message = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for an event")
            .expect("stream ended")
            .expect("read frame");
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("valid JSON event");
        }
    }
}

async fn assert_silent(ws: &mut Client) {
    match timeout(Duration::from_millis(300), ws.next()).await {
        Err(_) => {}
        Ok(frame) => panic!("expected silence, got {frame:?}"),
    }
}

#[tokio::test]
async fn match_relay_and_disconnect_flow() {
    let addr = start_server(ephemeral()).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    send(&mut a, json!({"type": "join-queue"})).await;
    send(&mut b, json!({"type": "join-queue"})).await;

    let created_a = recv(&mut a).await;
    let created_b = recv(&mut b).await;
    assert_eq!(created_a["type"], "session-created");
    assert_eq!(created_b["type"], "session-created");
    let session_id = created_a["sessionId"].clone();
    assert_eq!(session_id, created_b["sessionId"]);

    send(
        &mut a,
        json!({"type": "signal-offer", "sessionId": session_id, "offer": "X"}),
    )
    .await;
    let offer = recv(&mut b).await;
    assert_eq!(offer["type"], "signal-offer");
    assert_eq!(offer["offer"], "X");
    assert!(offer["from"].is_string(), "forwarded events carry the sender");

    send(
        &mut b,
        json!({"type": "signal-answer", "sessionId": session_id, "answer": {"sdp": "v=0"}}),
    )
    .await;
    let answer = recv(&mut a).await;
    assert_eq!(answer["type"], "signal-answer");
    assert_eq!(answer["answer"], json!({"sdp": "v=0"}));

    drop(a);
    let gone = recv(&mut b).await;
    assert_eq!(gone["type"], "peer-disconnected");

    // The torn-down session no longer routes anywhere.
    send(
        &mut b,
        json!({"type": "signal-candidate", "sessionId": session_id, "candidate": "c"}),
    )
    .await;
    assert_silent(&mut b).await;
}

#[tokio::test]
async fn lone_join_waits_silently() {
    let addr = start_server(ephemeral()).await;
    let mut c = connect(addr).await;

    send(&mut c, json!({"type": "join-queue"})).await;
    assert_silent(&mut c).await;
}

#[tokio::test]
async fn leave_queue_withdraws_from_matching() {
    let addr = start_server(ephemeral()).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    let mut c = connect(addr).await;

    send(&mut a, json!({"type": "join-queue"})).await;
    send(&mut a, json!({"type": "leave-queue"})).await;
    // Leaving twice is harmless.
    send(&mut a, json!({"type": "leave-queue"})).await;
    // Drain a's frames before anyone else joins so the withdrawal lands
    // first.
    assert_silent(&mut a).await;

    send(&mut b, json!({"type": "join-queue"})).await;
    assert_silent(&mut b).await;

    send(&mut c, json!({"type": "join-queue"})).await;
    let created_b = recv(&mut b).await;
    let created_c = recv(&mut c).await;
    assert_eq!(created_b["type"], "session-created");
    assert_eq!(created_b["sessionId"], created_c["sessionId"]);
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn malformed_frames_are_dropped_without_killing_the_connection() {
    let addr = start_server(ephemeral()).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    send(&mut a, json!({"type": "no-such-event"})).await;
    a.send(Message::Text("not json at all".to_string()))
        .await
        .expect("send frame");

    // The connection survives and can still be matched.
    send(&mut a, json!({"type": "join-queue"})).await;
    send(&mut b, json!({"type": "join-queue"})).await;
    assert_eq!(recv(&mut a).await["type"], "session-created");
    assert_eq!(recv(&mut b).await["type"], "session-created");
}

#[tokio::test]
async fn cross_origin_handshakes_are_rejected() {
    let config = SignalingConfig {
        allowed_origins: vec!["https://app.example".to_string()],
        ..ephemeral()
    };
    let addr = start_server(config).await;

    let mut request = format!("ws://{addr}")
        .into_client_request()
        .expect("client request");
    request
        .headers_mut()
        .insert("Origin", "https://evil.example".parse().expect("header"));
    match connect_async(request).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 403),
        other => panic!("expected a 403 handshake rejection, got {other:?}"),
    }

    let mut request = format!("ws://{addr}")
        .into_client_request()
        .expect("client request");
    request
        .headers_mut()
        .insert("Origin", "https://app.example".parse().expect("header"));
    connect_async(request)
        .await
        .expect("allowed origin connects");
}
