//! Client for H806SB LED strip controllers on the local network.
//!
//! The controller speaks a small, unauthenticated UDP broadcast protocol.
//! This crate implements the two halves of it:
//!
//! * **Discovery**: a two-request broadcast handshake that locates the device
//!   and extracts its name and 4-byte serial number
//!   ([`DiscoveryClient::discover`]).
//! * **Commands**: fixed 16-byte fire-and-forget packets that set brightness,
//!   playback speed and single-file playback, each carrying a wrapping
//!   sequence counter and the discovered serial number ([`CommandSession`]).
//!
//! Commands are blocked with [`DeviceNotDiscovered`] until a discovered
//! identity has been adopted, because the device ignores packets without its
//! serial number.
//!
//! ```no_run
//! use std::time::Duration;
//! use h806sb::{CommandSession, DiscoveryClient, DiscoveryOutcome};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut discovery = DiscoveryClient::open()?;
//! let mut session = CommandSession::open()?;
//! match discovery.discover(Duration::from_secs(3))? {
//!     DiscoveryOutcome::Identified(identity) => session.adopt_identity(&identity),
//!     DiscoveryOutcome::Matched(address) => println!("unnamed device at {}", address),
//!     DiscoveryOutcome::NoMatch => println!("no device found"),
//! }
//! session.set_brightness(20)?;
//! # Ok(())
//! # }
//! ```

pub mod packet;

mod discovery;
mod error;
mod session;
mod transport;

pub use discovery::{
	DeviceIdentity, DiscoveryClient, DiscoveryOutcome, DISCOVERY_REQUEST_EXTENDED, DISCOVERY_REQUEST_LEGACY,
	REPLY_ACK, REPLY_NAME_PREFIX, REQUEST_SPACING,
};
pub use error::{
	CommandError, DeviceNotDiscovered, DiscoverError, InvalidDeviceNameFormat, InvalidReply, InvalidSerialFormat,
};
pub use packet::{CommandPacket, COMMAND_MARKER, PACKET_LEN};
pub use session::CommandSession;
pub use transport::{Transport, UdpTransport, DEVICE_PORT, LISTEN_PORT};
