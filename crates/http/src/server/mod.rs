//! Listener lifecycle: bind, accept, dispatch, drain, close.

mod response_writer;
pub use response_writer::ResponseWriter;

use std::sync::Arc;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, trace, warn};

use crate::connection::ServerConnection;
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, ServeError};

/// Accepts connections and serves one exchange per connection.
///
/// Each accepted connection runs as its own task; the only state shared
/// across them is the shutdown token and the tracker of in-flight tasks,
/// so the server is cheap to clone and [`close`](Self::close) can be
/// called from anywhere.
#[derive(Debug, Clone)]
pub struct Server {
    shutdown: CancellationToken,
    connections: TaskTracker,
}

impl Server {
    pub fn new() -> Self {
        Self { shutdown: CancellationToken::new(), connections: TaskTracker::new() }
    }

    /// Binds `address` and serves until [`close`](Self::close) is called.
    pub async fn listen_and_serve<A, H>(&self, address: A, handler: Arc<H>) -> Result<(), ServeError>
    where
        A: ToSocketAddrs,
        H: Handler + ?Sized + 'static,
    {
        let listener = TcpListener::bind(address).await?;
        self.serve(listener, handler).await;
        Ok(())
    }

    /// Serves an already-bound listener until [`close`](Self::close) is
    /// called. Useful when the caller needs the bound address first.
    pub async fn serve<H>(&self, listener: TcpListener, handler: Arc<H>)
    where
        H: Handler + ?Sized + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "start listening");
        }

        loop {
            let accepted = select! {
                _ = self.shutdown.cancelled() => break,
                accepted = listener.accept() => accepted,
            };

            let (stream, remote_addr) = match accepted {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let handler = Arc::clone(&handler);
            self.connections.spawn(async move {
                let (reader, writer) = stream.into_split();
                match ServerConnection::new(reader, writer).process(handler.as_ref()).await {
                    Ok(()) => trace!(%remote_addr, "connection finished"),
                    Err(HttpError::Parse { source: ParseError::EmptyMessage }) => {
                        trace!(%remote_addr, "peer closed without sending a request");
                    }
                    Err(e) => warn!(%remote_addr, cause = %e, "connection failed"),
                }
            });
        }

        info!("stopped accepting");
    }

    /// Stops accepting new connections and waits for in-flight exchanges
    /// to finish. Blocked accept loops return promptly; running connection
    /// tasks are drained, not aborted.
    pub async fn close(&self) {
        self.shutdown.cancel();
        self.connections.close();
        self.connections.wait().await;
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}
