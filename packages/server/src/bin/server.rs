//! Line-based TCP chat server with broadcast and history replay.
//!
//! Every line a client sends is relayed to every connected client, prefixed
//! with the sender's address. The last messages are replayed to newcomers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000
//! ```

use clap::Parser;

use hiroba_server::{
    domain::DEFAULT_HISTORY_CAPACITY,
    ui::{DEFAULT_HOST, DEFAULT_PORT, Server, ServerConfig},
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Line-based TCP chat server with broadcast support", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Number of recent messages replayed to newly joined clients
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            history_capacity: args.history_capacity,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());

    let server = match Server::bind(&config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    };
    server.run().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_server_config_default() {
        // テスト項目: 引数なしで起動した場合の設定が ServerConfig::default() と一致する
        // given (前提条件):
        let args = Args::parse_from(["hiroba-server"]);

        // when (操作):
        let config = ServerConfig::from(args);

        // then (期待する結果):
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_cli_overrides() {
        // テスト項目: 短いオプションと長いオプションで設定を上書きできる
        // given (前提条件):
        let args = Args::parse_from([
            "hiroba-server",
            "-H",
            "0.0.0.0",
            "-p",
            "3000",
            "--history-capacity",
            "5",
        ]);

        // when (操作):
        let config = ServerConfig::from(args);

        // then (期待する結果):
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.history_capacity, 5);
    }
}
