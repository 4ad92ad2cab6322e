//! Local HTTP control surface for a running observer.

mod router;
mod state;

use std::net::SocketAddr;

use document_adapter::NodeId;
use sweeper_scheduler::ObserverHandle;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::SweeperError;

pub use router::build_router;
pub use state::ServeState;

/// Serves the control routes on `127.0.0.1:port` until `shutdown` fires.
pub async fn serve(
    observer: ObserverHandle<NodeId>,
    port: u16,
    shutdown: CancellationToken,
) -> Result<(), SweeperError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await.map_err(SweeperError::Server)?;
    let local = listener.local_addr().map_err(SweeperError::Server)?;
    info!(%local, "control server listening");

    let app = build_router().with_state(ServeState::new(observer));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(SweeperError::Server)
}
