#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// How the mock daemon behaves once it has read the expected frames.
#[derive(Debug, Clone)]
pub enum ServerBehavior {
    /// Send one text frame back
    Reply(String),
    /// Never answer
    Silent,
    /// Close the connection without answering
    Close,
}

/// What the mock daemon observed on its single connection.
#[derive(Debug, Default)]
pub struct ServerLog {
    pub frames: Vec<String>,
    /// The client sent a Close frame
    pub saw_close_frame: bool,
    /// The connection is gone, by Close frame or by socket shutdown
    pub closed: bool,
}

pub struct MockWsServer {
    pub url: String,
    handle: JoinHandle<ServerLog>,
}

impl MockWsServer {
    /// Accept one connection, read `expected_frames` text frames, then act
    /// according to `behavior` and wait for the client to go away.
    pub async fn spawn(expected_frames: usize, behavior: ServerBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            let mut log = ServerLog::default();

            while log.frames.len() < expected_frames {
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => log.frames.push(text),
                    Some(Ok(Message::Close(_))) => {
                        log.saw_close_frame = true;
                        log.closed = true;
                        return log;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => {
                        log.closed = true;
                        return log;
                    }
                }
            }

            match behavior {
                ServerBehavior::Reply(text) => ws.send(Message::Text(text)).await.unwrap(),
                ServerBehavior::Silent => {}
                ServerBehavior::Close => {
                    let _ = ws.close(None).await;
                }
            }

            loop {
                match ws.next().await {
                    Some(Ok(Message::Close(_))) => {
                        log.saw_close_frame = true;
                        log.closed = true;
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => {
                        log.closed = true;
                        break;
                    }
                }
            }
            log
        });

        Self {
            url: format!("ws://{}", addr),
            handle,
        }
    }

    /// Wait for the server task to finish and return its log.
    pub async fn finish(self) -> ServerLog {
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("mock server did not observe the connection closing")
            .expect("mock server task panicked")
    }
}
