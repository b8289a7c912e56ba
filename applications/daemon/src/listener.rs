//! UDP control listener
//!
//! Receives one command per datagram and dispatches them strictly in
//! arrival order. Replies are never sent.

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use std::net::SocketAddr;
use std::ops::ControlFlow;
use tokio::net::UdpSocket;
use tracing::{error, info, warn};

/// Largest accepted datagram; longer payloads are truncated
pub const MAX_MESSAGE_LEN: usize = 1024;

pub struct ControlListener {
    socket: UdpSocket,
    dispatcher: Dispatcher,
}

impl ControlListener {
    pub async fn bind(addr: SocketAddr, dispatcher: Dispatcher) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!("Listening for commands on udp://{}", socket.local_addr()?);
        Ok(Self { socket, dispatcher })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Serve until `q` arrives or the process is asked to stop
    pub async fn run(self) -> Result<()> {
        tokio::select! {
            result = self.serve() => result,
            _ = shutdown_signal() => {
                info!("Shutdown signal received");
                Ok(())
            }
        }
    }

    /// Receive loop without signal handling
    pub async fn serve(&self) -> Result<()> {
        let mut buf = [0u8; MAX_MESSAGE_LEN];

        loop {
            let (len, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    // ICMP errors from earlier sends surface here on some platforms
                    warn!("Receive failed: {}", e);
                    continue;
                }
            };

            let message = match std::str::from_utf8(&buf[..len]) {
                Ok(message) => message.to_owned(),
                Err(_) => {
                    warn!("Dropping non-UTF-8 message from {}", peer);
                    continue;
                }
            };

            let dispatcher = self.dispatcher.clone();
            let flow = tokio::task::spawn_blocking(move || dispatcher.dispatch(&message)).await;

            match flow {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => return Ok(()),
                Err(e) => error!("Command handler failed: {}", e),
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
