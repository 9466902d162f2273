//! A line-oriented console transport.
//!
//! Every input line becomes one [`InboundEvent`]:
//!
//! - `#channel some text` is a public message in `#channel`
//! - anything else is a direct message from the configured user
//!
//! Replies are written as `[conversation] text`, one per line.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, trace};

use relay_core::{InboundEvent, ReplyContext, Transport, TransportError, TransportResult};

/// Writes replies to an [`AsyncWrite`], one line per send.
pub struct ConsoleTransport<W> {
    writer: Mutex<W>,
}

impl ConsoleTransport<tokio::io::Stdout> {
    /// A transport writing to stdout.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsoleTransport<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> Transport for ConsoleTransport<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&self, text: &str, ctx: &ReplyContext) -> TransportResult<()> {
        let line = format!("[{}] {}\n", ctx.conversation_id, text);
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Parses one console line, or `None` for a blank line.
pub fn parse_line(line: &str, user: &str) -> Option<InboundEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix('#') {
        let (channel, text) = rest.split_once(' ').unwrap_or((rest, ""));
        return Some(InboundEvent::public(text, user, format!("#{channel}")));
    }

    Some(InboundEvent::direct(line, user))
}

/// Reads lines from `reader` until EOF and forwards them as events.
///
/// Returns the number of events forwarded. Stops early if the receiver is
/// dropped.
pub async fn read_events<R>(
    reader: R,
    user: &str,
    events: mpsc::Sender<InboundEvent>,
) -> TransportResult<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await? {
        let Some(event) = parse_line(&line, user) else {
            continue;
        };
        trace!(conversation = %event.conversation_id, "Console line read");
        if events.send(event).await.is_err() {
            return Err(TransportError::Closed {
                reason: "event receiver dropped".to_string(),
            });
        }
        forwarded += 1;
    }

    debug!(forwarded, "Console input closed");
    Ok(forwarded)
}
