// listener.rs — TCP accept loop
//
// Grounded on the teacher's `net_tcp.rs::net_ip_socket` (socket2-backed
// listener: low-delay ToS, `SO_REUSEADDR`, blocking accept) and
// `configure_tcp_stream` (per-connection `TCP_NODELAY` + keepalive). The
// original opens one listener per `NetSrc`; here we open one per
// configured port and accept forever instead of polling non-blocking.

use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, TcpKeepalive, Type};

const TCP_KEEPALIVE_SECS: u64 = 60;

/// Binds and listens on `port` across all interfaces.
pub fn bind(port: u16) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    let addr: std::net::SocketAddrV4 = format!("0.0.0.0:{port}").parse().unwrap();
    socket.bind(&addr.into())?;
    socket.listen(128)?;
    Ok(socket.into())
}

/// Applies the same per-connection socket options the teacher sets for
/// every accepted stream: no Nagle delay, keepalive probing so a dead
/// peer is noticed without waiting on application-level traffic.
pub fn configure_stream(stream: &TcpStream) -> std::io::Result<()> {
    stream.set_nodelay(true)?;
    let socket = Socket::from(stream.try_clone()?);
    let keepalive = TcpKeepalive::new().with_time(Duration::from_secs(TCP_KEEPALIVE_SECS));
    #[cfg(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "windows",
    ))]
    let keepalive = keepalive.with_interval(Duration::from_secs(TCP_KEEPALIVE_SECS));
    socket.set_tcp_keepalive(&keepalive)?;
    // `socket` owns a dup'd fd from `try_clone`; dropping it here closes
    // only that duplicate, not the caller's `stream`.
    Ok(())
}
