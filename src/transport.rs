//! [`Transport`] trait to support sending/receiving datagrams over different socket implementations.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

/// UDP port the controller listens on for discovery requests and commands.
pub const DEVICE_PORT: u16 = 4626;

/// Local UDP port discovery replies are sent back to.
pub const LISTEN_PORT: u16 = 4882;

/// [`Transport`]s are used to communicate with the controller by exchanging broadcast datagrams.
///
/// The implementor owns the socket for the lifetime of the client or session
/// using it, and releases it when dropped.
pub trait Transport {
	/// Send a single datagram to the broadcast target.
	fn send(&mut self, data: &[u8]) -> io::Result<()>;

	/// Wait up to `timeout` for a single inbound datagram.
	///
	/// Returns `Ok(None)` when the timeout expires without a datagram arriving.
	fn recv_timeout(&mut self, buffer: &mut [u8], timeout: Duration) -> io::Result<Option<(usize, SocketAddr)>>;

	/// Block for the given duration.
	///
	/// Used to pace consecutive discovery requests.
	fn pause(&mut self, duration: Duration);
}

/// Broadcast UDP transport over a [`UdpSocket`].
pub struct UdpTransport {
	socket: UdpSocket,
	target: SocketAddr,
}

impl UdpTransport {
	/// Bind a broadcast-enabled socket on the given local port.
	///
	/// Pass `0` as the listen port for an ephemeral bind, which is all a
	/// command session needs. Discovery must bind [`LISTEN_PORT`], since that
	/// is where the device sends its replies.
	pub fn bind(listen_port: u16, device_port: u16) -> io::Result<Self> {
		let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, listen_port))?;
		socket.set_broadcast(true)?;
		Ok(Self {
			socket,
			target: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, device_port)),
		})
	}

	/// The broadcast address datagrams are sent to.
	pub fn target(&self) -> SocketAddr {
		self.target
	}
}

impl Transport for UdpTransport {
	fn send(&mut self, data: &[u8]) -> io::Result<()> {
		self.socket.send_to(data, self.target)?;
		Ok(())
	}

	fn recv_timeout(&mut self, buffer: &mut [u8], timeout: Duration) -> io::Result<Option<(usize, SocketAddr)>> {
		// A zero read timeout means "block forever" to the kernel,
		// so treat it as already expired.
		if timeout.is_zero() {
			return Ok(None);
		}
		self.socket.set_read_timeout(Some(timeout))?;
		match self.socket.recv_from(buffer) {
			Ok((len, source)) => Ok(Some((len, source))),
			Err(e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut => Ok(None),
			Err(e) => Err(e),
		}
	}

	fn pause(&mut self, duration: Duration) {
		std::thread::sleep(duration);
	}
}
