//! Command session: hold the packet template and emit command packets.

use crate::discovery::DeviceIdentity;
use crate::error::{CommandError, DeviceNotDiscovered};
use crate::packet::CommandPacket;
use crate::transport::{Transport, UdpTransport, DEVICE_PORT};

/// Session for issuing commands to a discovered controller.
///
/// The session owns one packet template. Each set operation patches a single
/// field of the template, bumps the sequence counter and broadcasts the
/// result; the template is only replaced once the send succeeded.
///
/// Commands are fire-and-forget: the controller never replies on this path,
/// so the only failure signals are local ones. A session is not meant to be
/// shared; callers serialize access themselves.
pub struct CommandSession<T = UdpTransport> {
	transport: T,
	template: CommandPacket,
}

impl CommandSession<UdpTransport> {
	/// Bind an ephemeral broadcast-enabled socket for this session.
	pub fn open() -> std::io::Result<Self> {
		Ok(Self::new(UdpTransport::bind(0, DEVICE_PORT)?))
	}
}

impl<T: Transport> CommandSession<T> {
	/// Create a session over an existing transport, with a blank template.
	///
	/// All set operations fail with [`DeviceNotDiscovered`] until
	/// [`Self::adopt_identity`] has been called.
	pub fn new(transport: T) -> Self {
		Self {
			transport,
			template: CommandPacket::new(),
		}
	}

	/// Create a session seeded with the serial number of a discovered device.
	pub fn with_identity(transport: T, identity: &DeviceIdentity) -> Self {
		let mut session = Self::new(transport);
		session.adopt_identity(identity);
		session
	}

	/// Copy the serial number of a discovered device into the packet template.
	pub fn adopt_identity(&mut self, identity: &DeviceIdentity) {
		self.template = self.template.with_serial(identity.serial);
	}

	/// The current packet template.
	pub fn template(&self) -> &CommandPacket {
		&self.template
	}

	/// Get a reference to the underlying transport.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Consume the session to get ownership of the transport.
	pub fn into_transport(self) -> T {
		self.transport
	}

	/// Set the brightness, clamped to 0-31.
	///
	/// Returns the value actually written to the wire.
	pub fn set_brightness(&mut self, value: u8) -> Result<u8, CommandError> {
		let packet = self.send(self.template.with_brightness(value))?;
		Ok(packet.brightness())
	}

	/// Set the playback speed, clamped to 1-100.
	///
	/// Returns the value actually written to the wire.
	pub fn set_speed(&mut self, value: u8) -> Result<u8, CommandError> {
		let packet = self.send(self.template.with_speed(value))?;
		Ok(packet.speed())
	}

	/// Enable or disable single-file playback, clamped to 0-1.
	///
	/// Returns the value actually written to the wire.
	pub fn set_single_file(&mut self, value: u8) -> Result<u8, CommandError> {
		let packet = self.send(self.template.with_single_file(value))?;
		Ok(packet.single_file())
	}

	/// Bump the counter, broadcast the packet and commit it as the new template.
	fn send(&mut self, packet: CommandPacket) -> Result<CommandPacket, CommandError> {
		DeviceNotDiscovered::check(&packet)?;
		let packet = packet.bump_counter();
		log::trace!("sending command: {:02X?}", packet.as_bytes());
		self.transport.send(packet.as_bytes())?;
		self.template = packet;
		Ok(packet)
	}
}
