//! Client session management.

use hiroba_server::infrastructure::FramedConnection;
use hiroba_shared::time::SystemClock;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    sync::mpsc,
};

use super::{error::ClientError, formatter::MessageFormatter, ui::redisplay_prompt};

/// Connect to `addr` and run one session.
///
/// Returns `Ok` when the user ends input, and an error when the connection
/// is lost.
pub async fn run_client_session(
    addr: &str,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to chat server!");
    print!("{}", MessageFormatter::format_connected(addr));
    redisplay_prompt();

    let clock = SystemClock;
    run_session(FramedConnection::new(stream), input, move |line| {
        print!("{}", MessageFormatter::format_incoming(line, &clock));
        redisplay_prompt();
    })
    .await
}

/// Send input lines and hand every received line to `on_line` until either
/// side ends.
pub(crate) async fn run_session<S, F>(
    connection: FramedConnection<S>,
    input: &mut mpsc::UnboundedReceiver<String>,
    mut on_line: F,
) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    F: FnMut(&str) + Send + 'static,
{
    let (mut reader, mut writer) = connection.into_split();

    // Spawn a task to handle incoming messages
    let mut read_task = tokio::spawn(async move {
        loop {
            match reader.read_message().await {
                Ok(line) => on_line(&line),
                Err(e) => return e,
            }
        }
    });

    let result = loop {
        tokio::select! {
            read_result = &mut read_task => {
                let reason = match read_result {
                    Ok(e) => e.to_string(),
                    Err(e) => e.to_string(),
                };
                tracing::warn!("Server connection ended: {}", reason);
                break Err(ClientError::ConnectionError(reason));
            }
            line = input.recv() => match line {
                Some(line) => {
                    if let Err(e) = writer.write_message(&line).await {
                        tracing::warn!("Failed to send message: {}", e);
                        break Err(ClientError::ConnectionError(e.to_string()));
                    }
                }
                None => {
                    // Input ended, close our side so the server sees EOF
                    writer.shutdown().await.ok();
                    break Ok(());
                }
            },
        }
    };

    read_task.abort();
    result
}
