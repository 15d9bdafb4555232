//! Blocking UDP transport to the mixer.

use std::io;
use std::net::UdpSocket;
use std::time::Duration;

/// Largest datagram we expect from the mixer; full meter dumps are the
/// biggest traffic by far.
const MAX_DATAGRAM: usize = 16 * 1024;

/// Datagram transport the session drives. Implemented by [`UdpTransport`]
/// in production and by scripted fakes in the session tests.
pub trait Transport {
    fn send(&self, buf: &[u8]) -> io::Result<()>;

    /// Blocks for at most `timeout` waiting for one whole datagram.
    fn receive(&self, timeout: Duration) -> io::Result<Vec<u8>>;
}

pub struct UdpTransport {
    socket: UdpSocket,
    target: String,
}

impl UdpTransport {
    /// Binds an ephemeral local port and connects it to the mixer, so
    /// plain `send`/`recv` can be used afterwards.
    pub fn connect(target: &str) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(target)?;
        Ok(UdpTransport {
            socket,
            target: target.to_string(),
        })
    }
}

impl Transport for UdpTransport {
    fn send(&self, buf: &[u8]) -> io::Result<()> {
        let sent = self.socket.send(buf)?;
        if sent != buf.len() {
            return Err(io::Error::other("short datagram send"));
        }
        if crate::is_debug_enabled() {
            println!("[osc] sent {} bytes to {}", sent, self.target);
        }
        Ok(())
    }

    fn receive(&self, timeout: Duration) -> io::Result<Vec<u8>> {
        // A zero read timeout means "block forever" to the OS; keep the
        // wait bounded instead.
        let timeout = timeout.max(Duration::from_millis(1));
        self.socket.set_read_timeout(Some(timeout))?;

        let mut buf = [0u8; MAX_DATAGRAM];
        let len = self.socket.recv(&mut buf)?;
        if crate::is_debug_enabled() {
            println!("[osc] received {} bytes from {}", len, self.target);
        }
        Ok(buf[..len].to_vec())
    }
}
