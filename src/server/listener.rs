use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket};
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;

/// Pending connections the kernel queues before `accept`.
const BACKLOG: u32 = 5;

pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg.listen_addr().parse()?;

    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(BACKLOG)?;
    info!("Listening on {}", addr);

    serve(listener, cfg).await
}

/// Accepts connections forever, one task per connection.
pub async fn serve(listener: TcpListener, cfg: Arc<Config>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let config = Arc::clone(&cfg);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer, config);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}
