use h806sb::Transport;
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

/// In-memory transport: records outbound datagrams and pauses, and replays a
/// scripted queue of inbound datagrams. An empty queue acts as an immediate
/// receive timeout, so discovery tests never wait on the clock.
#[derive(Default)]
pub struct MockTransport {
	pub sent: Vec<Vec<u8>>,
	pub paused: Vec<Duration>,
	pub inbound: VecDeque<(Vec<u8>, SocketAddr)>,
	pub fail_sends: bool,
}

impl MockTransport {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_reply(&mut self, data: &[u8], source: SocketAddr) {
		self.inbound.push_back((data.to_vec(), source));
	}
}

impl Transport for MockTransport {
	fn send(&mut self, data: &[u8]) -> io::Result<()> {
		if self.fail_sends {
			return Err(io::ErrorKind::PermissionDenied.into());
		}
		self.sent.push(data.to_vec());
		Ok(())
	}

	fn recv_timeout(&mut self, buffer: &mut [u8], _timeout: Duration) -> io::Result<Option<(usize, SocketAddr)>> {
		match self.inbound.pop_front() {
			Some((data, source)) => {
				buffer[..data.len()].copy_from_slice(&data);
				Ok(Some((data.len(), source)))
			},
			None => Ok(None),
		}
	}

	fn pause(&mut self, duration: Duration) {
		self.paused.push(duration);
	}
}

pub fn device_addr() -> SocketAddr {
	"192.168.1.30:4626".parse().unwrap()
}
