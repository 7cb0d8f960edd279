//! Client execution logic with reconnection support.

use std::time::Duration;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{mpsc, oneshot};

use super::{error::ClientError, session::run_client_session, ui::PROMPT};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the chat client with reconnection logic
pub async fn run_client(addr: String) -> Result<(), ClientError> {
    let mut input = spawn_line_reader().await?;
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            addr,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&addr, &mut input).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                // If connection ended normally (user exit), don't reconnect
                break;
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if !should_reconnect(&e, reconnect_count) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}

/// Whether to retry after `failures` consecutive failed sessions.
///
/// Input failures are fatal; connection failures are retried up to
/// [`MAX_RECONNECT_ATTEMPTS`] times.
fn should_reconnect(error: &ClientError, failures: u32) -> bool {
    match error {
        ClientError::InputError(_) => false,
        ClientError::ConnectionError(_) => failures < MAX_RECONNECT_ATTEMPTS,
    }
}

/// Start the blocking readline thread.
///
/// The returned channel yields one entry per non-empty input line and closes
/// on Ctrl+C, Ctrl+D or a terminal error.
async fn spawn_line_reader() -> Result<mpsc::UnboundedReceiver<String>, ClientError> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    let (ready_tx, ready_rx) = oneshot::channel::<Result<(), ClientError>>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => {
                let _ = ready_tx.send(Ok(()));
                rl
            }
            Err(e) => {
                let _ = ready_tx.send(Err(ClientError::InputError(e.to_string())));
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    match ready_rx.await {
        Ok(Ok(())) => Ok(input_rx),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ClientError::InputError(
            "readline thread exited during startup".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnects_on_connection_error_within_limit() {
        // テスト項目: 接続エラーは上限回数に達するまで再接続の対象になる
        // given (前提条件):
        let error = ClientError::ConnectionError("Connection lost".to_string());

        // when (操作):
        let retries: Vec<bool> = (1..=MAX_RECONNECT_ATTEMPTS)
            .map(|failures| should_reconnect(&error, failures))
            .collect();

        // then (期待する結果): 5 回目の失敗で諦める
        assert_eq!(retries, vec![true, true, true, true, false]);
    }

    #[test]
    fn test_input_error_is_never_retried() {
        // テスト項目: 入力の初期化エラーは回数に関係なく再接続しない
        // given (前提条件):
        let error = ClientError::InputError("no terminal".to_string());

        // when (操作):
        let result = should_reconnect(&error, 0);

        // then (期待する結果):
        assert!(!result);
    }
}
