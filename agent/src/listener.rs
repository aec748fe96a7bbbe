//! Per-port UDP listeners. One socket per started device, materializing
//! the actor lazily on first datagram via the pool's single-flight
//! `get_or_create_device`, the way `BridgeRunner` owns a collection of
//! spawned tasks and joins them at shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use devsim_core::LazyDevicePool;

use crate::codec;

const MAX_DATAGRAM_SIZE: usize = 2048;

/// Bind one UDP socket per port in `ports` and spawn a task answering
/// requests against `pool`. Returns the spawned tasks; abort them to
/// stop listening.
pub async fn spawn_listeners(
    bind_host: &str,
    ports: impl IntoIterator<Item = u16>,
    pool: LazyDevicePool,
) -> anyhow::Result<Vec<JoinHandle<()>>> {
    let mut handles = Vec::new();
    for port in ports {
        let addr: SocketAddr = format!("{bind_host}:{port}").parse()?;
        let socket = UdpSocket::bind(addr).await?;
        let pool = pool.clone();
        handles.push(tokio::spawn(listen_one(Arc::new(socket), port, pool)));
    }
    Ok(handles)
}

async fn listen_one(socket: Arc<UdpSocket>, port: u16, pool: LazyDevicePool) {
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(port, error = %e, "failed to receive datagram");
                continue;
            }
        };

        let decoded = match codec::decode_request(&buf[..len]) {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(port, peer = %peer, error = %e, "dropped malformed request");
                continue;
            }
        };

        let handle = match pool.get_or_create_device(port).await {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(port, error = %e, "failed to materialize device for request");
                continue;
            }
        };

        let response = match handle.handle_request(decoded.request).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(port, error = %e, "device actor failed to answer request");
                continue;
            }
        };

        let reply = match codec::encode_response(
            decoded.version,
            &decoded.community,
            decoded.request_id,
            &response,
        ) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(port, error = %e, "failed to encode response");
                continue;
            }
        };

        if let Err(e) = socket.send_to(&reply, peer).await {
            tracing::warn!(port, peer = %peer, error = %e, "failed to send response");
        }
    }
}
