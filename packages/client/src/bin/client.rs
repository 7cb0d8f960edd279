//! Interactive chat client for the line-based TCP chat server.
//!
//! Sends every line typed at the prompt and prints every line the server
//! broadcasts. Automatically reconnects on disconnection (max 5 attempts with
//! 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client
//! cargo run --bin hiroba-client -- --host 127.0.0.1 --port 1234
//! ```

use clap::Parser;

use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "Interactive client for the Hiroba chat server", long_about = None)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short = 'p', long, default_value = "1234")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    // Run the client
    if let Err(e) = hiroba_client::run_client(addr).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
