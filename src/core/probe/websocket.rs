use crate::domain::command::WsCommand;
use crate::domain::error::ProbeResult;
use crate::infrastructure::websocket::WsClient;
use serde::Serialize;
use tracing::info;

/// One outbound text frame with the label shown in progress output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundFrame {
    pub label: String,
    pub text: String,
}

impl OutboundFrame {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    /// Wrap a raw frame, labelled by its `cmd` if it parses as a known command.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let label = serde_json::from_str::<WsCommand>(&text)
            .map(|command| command.label())
            .unwrap_or("frame");
        Self::new(label, text)
    }
}

impl From<WsCommand> for OutboundFrame {
    fn from(command: WsCommand) -> Self {
        Self::new(command.label(), command.to_frame())
    }
}

/// Progress notifications emitted while the probe runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsEvent<'a> {
    Connected { url: &'a str },
    Sent { frame: &'a OutboundFrame },
    Received { text: &'a str },
}

/// Outcome of a websocket probe.
#[derive(Debug, Clone, Serialize)]
pub struct WsExchange {
    pub url: String,
    pub sent: Vec<OutboundFrame>,
    pub received: String,
}

/// Connect, send every frame in order, await exactly one reply, close.
///
/// The reply wait has no timeout. The connection is closed on both the
/// success and the error path; dropping the future drops the socket.
pub async fn probe<F>(url: &str, frames: &[OutboundFrame], mut on_event: F) -> ProbeResult<WsExchange>
where
    F: FnMut(WsEvent<'_>),
{
    let mut client = WsClient::connect(url).await?;
    on_event(WsEvent::Connected { url });

    let result = run(&mut client, frames, &mut on_event).await;
    client.close().await;

    let received = result?;
    Ok(WsExchange {
        url: url.to_string(),
        sent: frames.to_vec(),
        received,
    })
}

async fn run<F>(client: &mut WsClient, frames: &[OutboundFrame], on_event: &mut F) -> ProbeResult<String>
where
    F: FnMut(WsEvent<'_>),
{
    for frame in frames {
        client.send_text(&frame.text).await?;
        on_event(WsEvent::Sent { frame });
    }

    info!("Waiting for a reply from {}", client.url());
    let received = client.recv_text().await?;
    on_event(WsEvent::Received { text: &received });
    Ok(received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::default_ws_script;

    #[test]
    fn test_frames_from_commands_keep_labels() {
        let frames: Vec<OutboundFrame> = default_ws_script().into_iter().map(OutboundFrame::from).collect();
        assert_eq!(frames[0].label, "get");
        assert_eq!(frames[1].label, "set");
        assert_eq!(frames[1].text, WsCommand::Set { ch: 2, val: true }.to_frame());
    }

    #[test]
    fn test_raw_frames_are_labelled_by_command() {
        assert_eq!(OutboundFrame::from_text(r#"{"cmd": "get"}"#).label, "get");
        assert_eq!(OutboundFrame::from_text("hello").label, "frame");
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut events = 0;
        let result = probe(&format!("ws://{}", addr), &[], |_| events += 1).await;
        assert!(result.is_err());
        assert_eq!(events, 0);
    }
}
