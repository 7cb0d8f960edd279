//! Per-connection session.
//!
//! ## 責務
//!
//! - 1 つの接続を所有し、読み込みループと書き込みループを駆動する
//! - `SessionHandle` を `Participant` として Hub に登録する
//! - どちらかのループが終了したら、もう一方を止めて Hub から離脱する
//!
//! ## 設計ノート
//!
//! Hub が保持するのは `SessionHandle`（送信キューの送信側）だけで、接続そのものは
//! セッションのタスクが所有します。送信キューの受信側は書き込みタスクだけが持つため、
//! 書き込みは常に 1 つずつ、`deliver` された順に行われます。

use std::sync::Arc;

use tokio::{
    io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf},
    sync::mpsc,
    task::{JoinError, JoinHandle},
};

use crate::{
    domain::{
        Broadcaster, ConnectionError, Message, Participant, ParticipantId, ParticipantIdFactory,
    },
    infrastructure::{FramedConnection, FramedReader, FramedWriter},
};

/// The hub-facing side of a session.
///
/// Delivering only enqueues the message; the session's write loop sends it.
pub struct SessionHandle {
    id: ParticipantId,
    peer: String,
    outbound: mpsc::UnboundedSender<Message>,
}

impl Participant for SessionHandle {
    fn id(&self) -> ParticipantId {
        self.id
    }

    fn deliver(&self, message: &Message) {
        if self.outbound.send(message.clone()).is_err() {
            tracing::debug!(
                "Session '{}' ({}) is closing, dropping message",
                self.id,
                self.peer
            );
        }
    }
}

/// One connected peer.
pub struct Session<R, W> {
    id: ParticipantId,
    peer: String,
    reader: FramedReader<R>,
    writer: FramedWriter<W>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl<S> Session<ReadHalf<S>, WriteHalf<S>>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Create a session over an accepted connection.
    pub fn from_connection(
        connection: FramedConnection<S>,
        peer: impl Into<String>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        let (reader, writer) = connection.into_split();
        Self::new(reader, writer, peer, broadcaster)
    }
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Create a session from the two halves of a connection.
    ///
    /// `peer` is the label prefixed to every line this session relays.
    pub fn new(
        reader: FramedReader<R>,
        writer: FramedWriter<W>,
        peer: impl Into<String>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            id: ParticipantIdFactory::generate(),
            peer: peer.into(),
            reader,
            writer,
            broadcaster,
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Spawn the session on the runtime.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Join the hub, run both loops until one ends, then leave the hub.
    pub async fn run(self) {
        let Self {
            id,
            peer,
            reader,
            writer,
            broadcaster,
        } = self;

        let (outbound, queue) = mpsc::unbounded_channel();
        let handle = Arc::new(SessionHandle {
            id,
            peer: peer.clone(),
            outbound,
        });
        broadcaster.join(handle).await;
        tracing::info!("Session '{}' ({}) joined", id, peer);

        let mut read_task = tokio::spawn(read_loop(
            peer.clone(),
            reader,
            Arc::clone(&broadcaster),
        ));
        let mut write_task = tokio::spawn(write_loop(writer, queue));

        // If any one of the tasks completes, abort the other
        tokio::select! {
            result = &mut read_task => {
                write_task.abort();
                log_read_end(&id, &peer, result);
            }
            result = &mut write_task => {
                read_task.abort();
                log_write_end(&id, &peer, result);
            }
        }

        broadcaster.leave(&id).await;
        tracing::info!("Session '{}' ({}) closed", id, peer);
    }
}

/// Relay every inbound line to the hub until the connection fails.
async fn read_loop<R>(
    peer: String,
    mut reader: FramedReader<R>,
    broadcaster: Arc<dyn Broadcaster>,
) -> ConnectionError
where
    R: AsyncRead + Unpin,
{
    loop {
        let text = match reader.read_message().await {
            Ok(text) => text,
            Err(e) => return e,
        };
        tracing::debug!("Received from {}: {}", peer, text);

        match Message::from_peer(&peer, &text) {
            Ok(message) => broadcaster.deliver(message).await,
            Err(e) => tracing::warn!("Dropping line from {}: {}", peer, e),
        }
    }
}

/// Write queued messages one at a time, in order.
///
/// Returns `Ok` once every handle to the queue is gone.
async fn write_loop<W>(
    mut writer: FramedWriter<W>,
    mut queue: mpsc::UnboundedReceiver<Message>,
) -> Result<(), ConnectionError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = queue.recv().await {
        writer.write_message(message.as_str()).await?;
    }
    Ok(())
}

fn log_read_end(id: &ParticipantId, peer: &str, result: Result<ConnectionError, JoinError>) {
    match result {
        Ok(ConnectionError::Closed) => {
            tracing::info!("Session '{}' ({}) disconnected", id, peer)
        }
        Ok(e) => tracing::warn!("Session '{}' ({}) read failed: {}", id, peer, e),
        Err(e) => tracing::error!("Session '{}' ({}) read task failed: {}", id, peer, e),
    }
}

fn log_write_end(
    id: &ParticipantId,
    peer: &str,
    result: Result<Result<(), ConnectionError>, JoinError>,
) {
    match result {
        Ok(Ok(())) => tracing::debug!("Session '{}' ({}) outbound queue closed", id, peer),
        Ok(Err(e)) => tracing::warn!("Session '{}' ({}) write failed: {}", id, peer, e),
        Err(e) => tracing::error!("Session '{}' ({}) write task failed: {}", id, peer, e),
    }
}
