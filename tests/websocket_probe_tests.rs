mod common;

use common::{MockWsServer, ServerBehavior};
use mtdprobe::cli::output::ws_event_line;
use mtdprobe::core::probe::websocket::{probe, OutboundFrame};
use mtdprobe::domain::command::{default_ws_script, WsCommand};
use mtdprobe::{PinGrid, ProbeError};
use std::time::Duration;

fn default_frames() -> Vec<OutboundFrame> {
    default_ws_script().into_iter().map(OutboundFrame::from).collect()
}

#[tokio::test]
async fn test_probe_returns_the_reply_frame() {
    let server = MockWsServer::spawn(2, ServerBehavior::Reply("ok from daemon".to_string())).await;

    let exchange = probe(&server.url, &default_frames(), |_| {}).await.unwrap();

    assert_eq!(exchange.received, "ok from daemon");
    assert_eq!(exchange.url, server.url);
    assert_eq!(exchange.sent.len(), 2);
    server.finish().await;
}

#[tokio::test]
async fn test_frames_arrive_get_then_set() {
    let server = MockWsServer::spawn(2, ServerBehavior::Reply("{}".to_string())).await;

    probe(&server.url, &default_frames(), |_| {}).await.unwrap();

    let log = server.finish().await;
    assert_eq!(
        log.frames,
        vec![
            r#"{"cmd": "get"}"#.to_string(),
            r#"{"cmd": "set", "ch": 2, "val": true}"#.to_string(),
        ]
    );
}

#[tokio::test]
async fn test_events_follow_the_script() {
    let server = MockWsServer::spawn(2, ServerBehavior::Reply("done".to_string())).await;

    let mut lines = Vec::new();
    probe(&server.url, &default_frames(), |event| lines.push(ws_event_line(&event)))
        .await
        .unwrap();

    assert_eq!(
        lines,
        vec!["Connected to server", "Sent: get", "Sent: set", "Received: done"]
    );
    server.finish().await;
}

#[tokio::test]
async fn test_connection_is_closed_after_success() {
    let server = MockWsServer::spawn(2, ServerBehavior::Reply("bye".to_string())).await;

    probe(&server.url, &default_frames(), |_| {}).await.unwrap();

    let log = server.finish().await;
    assert!(log.saw_close_frame);
    assert!(log.closed);
}

#[tokio::test]
async fn test_silent_server_keeps_probe_suspended() {
    let server = MockWsServer::spawn(2, ServerBehavior::Silent).await;
    let frames = default_frames();

    let outcome = tokio::time::timeout(
        Duration::from_millis(300),
        probe(&server.url, &frames, |_| {}),
    )
    .await;
    assert!(outcome.is_err(), "probe must still be waiting for a reply");

    // Abandoning the probe drops the socket.
    let log = server.finish().await;
    assert_eq!(log.frames.len(), 2);
    assert!(log.closed);
}

#[tokio::test]
async fn test_peer_closing_before_reply_is_a_protocol_error() {
    let server = MockWsServer::spawn(2, ServerBehavior::Close).await;

    let result = probe(&server.url, &default_frames(), |_| {}).await;

    assert!(matches!(result, Err(ProbeError::Protocol(_))));
    assert!(server.finish().await.closed);
}

#[tokio::test]
async fn test_state_reply_decodes_as_pin_grid() {
    let mut grid = PinGrid::default();
    grid.set(2, true).unwrap();
    let server = MockWsServer::spawn(1, ServerBehavior::Reply(grid.to_json().unwrap())).await;

    let frames = vec![OutboundFrame::from(WsCommand::Set { ch: 2, val: true })];
    let exchange = probe(&server.url, &frames, |_| {}).await.unwrap();

    let decoded = PinGrid::from_json(&exchange.received).unwrap();
    assert!(decoded.get(2).unwrap());
    assert_eq!(decoded.count_on(), 1);
    server.finish().await;
}
