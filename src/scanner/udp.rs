//! UDP probe.
//!
//! UDP is connectionless, so the probe sends an empty datagram and waits for
//! anything to come back from the target.
//!
//! # Detection
//!
//! 1. **Datagram from the target**: port is open
//! 2. **Silence until the timeout**: indeterminate, the port may be open and
//!    quiet or filtered
//! 3. **Socket error**: closed, with the error as cause
//!
//! The socket is left unconnected, so ICMP port-unreachable replies are not
//! surfaced by the kernel and a silent port reads as indeterminate rather
//! than closed.

use crate::error::ProbeError;
use crate::scanner::resolve::resolve;
use crate::scanner::traits::{ProbeRequest, ProbeResult, Prober, Protocol, UDP_SILENCE_NOTE};
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Instant;
use tokio::net::UdpSocket;
use tokio::time::timeout;

const RECV_BUFFER: usize = 1024;

/// UDP datagram prober.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpProber;

impl UdpProber {
    pub fn new() -> Self {
        Self
    }

    async fn bind_for(target: SocketAddr) -> std::io::Result<UdpSocket> {
        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        UdpSocket::bind(local).await
    }

    /// Wait for a datagram from `target`, skipping stray ones from other peers.
    async fn await_reply(socket: &UdpSocket, target: SocketAddr) -> std::io::Result<()> {
        let mut buf = [0u8; RECV_BUFFER];
        loop {
            let (_, from) = socket.recv_from(&mut buf).await?;
            // Compare address and port only; V6 flow info and scope may differ.
            if from.ip() == target.ip() && from.port() == target.port() {
                return Ok(());
            }
        }
    }
}

#[async_trait]
impl Prober for UdpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        let target = match resolve(&request.host, request.port.as_u16(), request.timeout).await {
            Ok(addr) => addr,
            Err(e) => return ProbeResult::closed(request, &e, None),
        };

        let socket = match Self::bind_for(target).await {
            Ok(socket) => socket,
            Err(e) => return ProbeResult::closed(request, &ProbeError::from_io(e), None),
        };

        let start = Instant::now();
        if let Err(e) = socket.send_to(&[], target).await {
            return ProbeResult::closed(request, &ProbeError::from_io(e), Some(start.elapsed()));
        }

        // An overflowing limit means no deadline rather than a panic.
        match timeout(request.timeout, Self::await_reply(&socket, target)).await {
            Ok(Ok(())) => {
                tracing::debug!(%target, "udp response received");
                ProbeResult::open(request, start.elapsed())
            }
            Ok(Err(e)) => {
                ProbeResult::closed(request, &ProbeError::from_io(e), Some(start.elapsed()))
            }
            Err(_) => ProbeResult::indeterminate(request, UDP_SILENCE_NOTE, start.elapsed()),
        }
    }
}
