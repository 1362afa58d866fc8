//! Error types for discovery and command transmission.
//!
//! Note that a discovery run that ends without a matching reply is not an
//! error: it is reported as [`DiscoveryOutcome::NoMatch`][crate::DiscoveryOutcome::NoMatch].

use crate::packet::CommandPacket;

/// An error that can occur during device discovery.
#[derive(Debug)]
pub enum DiscoverError {
	/// The socket failed to send or receive.
	Io(std::io::Error),
	/// A device replied, but the reply could not be understood.
	InvalidReply(InvalidReply),
}

/// The discovery reply could not be parsed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InvalidReply {
	InvalidDeviceNameFormat(InvalidDeviceNameFormat),
	InvalidSerialFormat(InvalidSerialFormat),
}

/// The device name in a discovery reply lacks the expected `prefix_hex` structure.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidDeviceNameFormat {
	/// The name as received.
	pub name: String,
}

/// The hex suffix of a device name does not decode to a 4-byte serial number.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidSerialFormat {
	/// The name as received.
	pub name: String,
	/// The suffix that failed to decode.
	pub hex: String,
}

/// An error that can occur when issuing a command.
#[derive(Debug)]
pub enum CommandError {
	/// The command was blocked because no device has been discovered yet.
	DeviceNotDiscovered(DeviceNotDiscovered),
	/// The socket failed to send.
	Io(std::io::Error),
}

/// A command was attempted before a successful discovery populated the serial fields.
///
/// Transmitting such a packet would be a malformed command, so the send is
/// blocked locally instead.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeviceNotDiscovered;

impl DeviceNotDiscovered {
	/// Check that the serial region of a packet has been populated.
	pub fn check(packet: &CommandPacket) -> Result<(), Self> {
		if packet.has_serial() {
			Ok(())
		} else {
			Err(Self)
		}
	}
}

impl std::error::Error for DiscoverError {}
impl std::error::Error for InvalidReply {}
impl std::error::Error for InvalidDeviceNameFormat {}
impl std::error::Error for InvalidSerialFormat {}
impl std::error::Error for CommandError {}
impl std::error::Error for DeviceNotDiscovered {}

impl From<std::io::Error> for DiscoverError {
	fn from(other: std::io::Error) -> Self {
		Self::Io(other)
	}
}

impl From<InvalidReply> for DiscoverError {
	fn from(other: InvalidReply) -> Self {
		Self::InvalidReply(other)
	}
}

impl From<InvalidDeviceNameFormat> for DiscoverError {
	fn from(other: InvalidDeviceNameFormat) -> Self {
		Self::InvalidReply(other.into())
	}
}

impl From<InvalidSerialFormat> for DiscoverError {
	fn from(other: InvalidSerialFormat) -> Self {
		Self::InvalidReply(other.into())
	}
}

impl From<InvalidDeviceNameFormat> for InvalidReply {
	fn from(other: InvalidDeviceNameFormat) -> Self {
		Self::InvalidDeviceNameFormat(other)
	}
}

impl From<InvalidSerialFormat> for InvalidReply {
	fn from(other: InvalidSerialFormat) -> Self {
		Self::InvalidSerialFormat(other)
	}
}

impl From<std::io::Error> for CommandError {
	fn from(other: std::io::Error) -> Self {
		Self::Io(other)
	}
}

impl From<DeviceNotDiscovered> for CommandError {
	fn from(other: DeviceNotDiscovered) -> Self {
		Self::DeviceNotDiscovered(other)
	}
}

impl std::fmt::Display for DiscoverError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Io(e) => write!(f, "discovery I/O failed: {}", e),
			Self::InvalidReply(e) => write!(f, "{}", e),
		}
	}
}

impl std::fmt::Display for InvalidReply {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::InvalidDeviceNameFormat(e) => write!(f, "{}", e),
			Self::InvalidSerialFormat(e) => write!(f, "{}", e),
		}
	}
}

impl std::fmt::Display for InvalidDeviceNameFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "invalid device name format, expected \"HCX_XXXXXXXX\", got {:?}", self.name)
	}
}

impl std::fmt::Display for InvalidSerialFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"invalid serial number {:?} in device name {:?}, expected 8 hex digits",
			self.hex, self.name
		)
	}
}

impl std::fmt::Display for CommandError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::DeviceNotDiscovered(e) => write!(f, "{}", e),
			Self::Io(e) => write!(f, "failed to send command packet: {}", e),
		}
	}
}

impl std::fmt::Display for DeviceNotDiscovered {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "no device discovered yet, run discovery before sending commands")
	}
}
