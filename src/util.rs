//! Socket setup.

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Bind the agent's UDP socket.
///
/// IPv6 sockets are IPv6-only, so `[::]` never receives IPv4-mapped
/// traffic. The address may be reused right after a restart.
pub(crate) async fn bind_udp_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;

    tracing::trace!(target: "tiny_snmp::agent", { snmp.local_addr = %addr }, "UDP socket bound");
    UdpSocket::from_std(socket.into())
}
