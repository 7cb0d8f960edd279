//! Server execution logic.

use std::{future::Future, io, net::SocketAddr, sync::Arc};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};

use crate::{
    domain::Broadcaster,
    infrastructure::{BroadcastHub, FramedConnection},
};

use super::{ServerConfig, ServerError, session::Session, signal::shutdown_signal};

/// TCP chat server
///
/// Owns the listening socket and the process-wide hub.
///
/// # Example
///
/// ```ignore
/// let server = Server::bind(&ServerConfig::default()).await?;
/// server.run().await;
/// ```
pub struct Server {
    listener: TcpListener,
    hub: Arc<BroadcastHub>,
}

impl Server {
    /// Bind the listening socket and create the hub.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let bind_addr = config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        Ok(Self {
            listener,
            hub: Arc::new(BroadcastHub::with_capacity(config.history_capacity)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::LocalAddr)
    }

    /// The hub shared by every session of this server.
    pub fn hub(&self) -> Arc<BroadcastHub> {
        Arc::clone(&self.hub)
    }

    /// Run the accept loop until Ctrl+C or SIGTERM.
    pub async fn run(self) {
        self.run_until(shutdown_signal()).await
    }

    /// Run the accept loop until `shutdown` resolves.
    ///
    /// A failed accept is logged and the loop continues.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let Server { listener, hub } = self;
        let broadcaster: Arc<dyn Broadcaster> = hub;

        match listener.local_addr() {
            Ok(addr) => tracing::info!("Chat server listening on {}", addr),
            Err(e) => tracing::warn!("Chat server listening on unknown address: {}", e),
        }
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let listener = &listener;
        let accept = move || async move {
            let (stream, peer) = listener.accept().await?;
            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!("Failed to set TCP_NODELAY for {}: {}", peer, e);
            }
            Ok::<_, io::Error>((stream, peer))
        };
        accept_loop(accept, shutdown, broadcaster).await;

        tracing::info!("Server shutdown complete");
    }
}

/// Accept connections from `accept` and start a session for each, until
/// `shutdown` resolves.
///
/// A failed accept is logged and the loop continues.
async fn accept_loop<A, Fut, S, F>(
    mut accept: A,
    shutdown: F,
    broadcaster: Arc<dyn Broadcaster>,
)
where
    A: FnMut() -> Fut,
    Fut: Future<Output = io::Result<(S, SocketAddr)>>,
    S: AsyncRead + AsyncWrite + Send + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = accept() => match accepted {
                Ok((stream, peer)) => spawn_session(stream, peer, &broadcaster),
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            },
        }
    }
}

fn spawn_session<S>(stream: S, peer: SocketAddr, broadcaster: &Arc<dyn Broadcaster>)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    tracing::info!("Accepted connection from {}", peer);

    Session::from_connection(
        FramedConnection::new(stream),
        peer.to_string(),
        Arc::clone(broadcaster),
    )
    .start();
}
