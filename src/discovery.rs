//! Discovery handshake: locate the controller on the LAN and extract its identity.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use crate::error::{DiscoverError, InvalidDeviceNameFormat, InvalidReply, InvalidSerialFormat};
use crate::transport::{Transport, UdpTransport, DEVICE_PORT, LISTEN_PORT};

/// First discovery request (legacy protocol generation).
pub const DISCOVERY_REQUEST_LEGACY: [u8; 8] = [0xAB, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];

/// Second discovery request, sent [`REQUEST_SPACING`] after the first.
#[rustfmt::skip]
pub const DISCOVERY_REQUEST_EXTENDED: [u8; 12] = [
	0xFB, 0xC1, 0x01, 0x13, 0x00, 0x01, 0x00, 0xAE, 0x00, 0x00, 0x00, 0x00,
];

/// Legacy reply: the device acknowledges the handshake without identifying itself.
pub const REPLY_ACK: [u8; 2] = [0xFB, 0xC0];

/// Prefix of the extended reply, followed by a null-terminated ASCII device name.
pub const REPLY_NAME_PREFIX: [u8; 2] = [0xAB, 0x02];

/// Pause between the two discovery requests.
///
/// The device is presumed to process the first request before the second
/// arrives. Sending them back to back is untested against real hardware.
pub const REQUEST_SPACING: Duration = Duration::from_millis(50);

/// Identity of a discovered controller.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeviceIdentity {
	/// Source address of the discovery reply.
	pub address: IpAddr,

	/// Device name from the reply, normally of the form `HCX_XXXXXXXX`.
	pub name: String,

	/// Serial number decoded from the hex suffix of the name.
	pub serial: [u8; 4],
}

/// Outcome of a single discovery handshake.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DiscoveryOutcome {
	/// A device replied with its name and serial number.
	Identified(DeviceIdentity),

	/// A device acknowledged the handshake without identifying itself.
	///
	/// Older firmware replies this way. The device address is known but
	/// commands remain blocked, since they embed the serial number.
	Matched(IpAddr),

	/// The deadline expired without a matching reply.
	///
	/// A common outcome on a LAN scan, not an error. Run discovery again to retry.
	NoMatch,
}

/// Client for the discovery handshake.
///
/// One call to [`Self::discover`] performs one two-request handshake.
/// There are no automatic retries; callers retry by calling again.
pub struct DiscoveryClient<T = UdpTransport> {
	transport: T,
}

impl DiscoveryClient<UdpTransport> {
	/// Bind the fixed discovery listen port with broadcast enabled.
	pub fn open() -> std::io::Result<Self> {
		Ok(Self::new(UdpTransport::bind(LISTEN_PORT, DEVICE_PORT)?))
	}
}

impl<T: Transport> DiscoveryClient<T> {
	/// Create a discovery client over an existing transport.
	pub fn new(transport: T) -> Self {
		Self { transport }
	}

	/// Get a reference to the underlying transport.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Consume the client to get ownership of the transport.
	pub fn into_transport(self) -> T {
		self.transport
	}

	/// Broadcast the two-request handshake and wait for a matching reply.
	///
	/// The timeout is an absolute budget for the whole receive loop: stray
	/// datagrams are skipped without resetting it, and expiry yields
	/// [`DiscoveryOutcome::NoMatch`] rather than an error.
	pub fn discover(&mut self, timeout: Duration) -> Result<DiscoveryOutcome, DiscoverError> {
		log::trace!("sending discovery request: {:02X?}", DISCOVERY_REQUEST_LEGACY);
		self.transport.send(&DISCOVERY_REQUEST_LEGACY)?;
		self.transport.pause(REQUEST_SPACING);
		log::trace!("sending discovery request: {:02X?}", DISCOVERY_REQUEST_EXTENDED);
		self.transport.send(&DISCOVERY_REQUEST_EXTENDED)?;

		let deadline = Instant::now() + timeout;
		let mut buffer = [0; 256];
		loop {
			let remaining = deadline.saturating_duration_since(Instant::now());
			let (len, source) = match self.transport.recv_timeout(&mut buffer, remaining)? {
				Some(datagram) => datagram,
				None => {
					log::debug!("discovery deadline expired without a matching reply");
					return Ok(DiscoveryOutcome::NoMatch);
				},
			};
			match parse_reply(&buffer[..len], source.ip())? {
				Some(outcome) => return Ok(outcome),
				None => {
					// Stray broadcast traffic is expected on a LAN.
					log::debug!("ignoring unrelated datagram from {}", source);
					log::trace!("ignored datagram: {:02X?}", &buffer[..len]);
				},
			}
		}
	}
}

/// Match one inbound datagram against the two known reply formats.
///
/// Returns `Ok(None)` for unrelated traffic, which the receive loop skips.
fn parse_reply(data: &[u8], source: IpAddr) -> Result<Option<DiscoveryOutcome>, InvalidReply> {
	if data == REPLY_ACK {
		return Ok(Some(DiscoveryOutcome::Matched(source)));
	}
	if data.len() < REPLY_NAME_PREFIX.len() || data[..2] != REPLY_NAME_PREFIX {
		return Ok(None);
	}
	let name = extract_name(&data[2..]);
	let serial = parse_serial(&name)?;
	Ok(Some(DiscoveryOutcome::Identified(DeviceIdentity {
		address: source,
		name,
		serial,
	})))
}

/// Extract the ASCII name up to the first null terminator (or end of buffer).
fn extract_name(data: &[u8]) -> String {
	let len = data.iter().position(|&byte| byte == 0).unwrap_or(data.len());
	String::from_utf8_lossy(&data[..len]).into_owned()
}

/// Decode the serial number from the hex suffix of a device name.
///
/// The name must have at least two `_`-separated parts; everything after the
/// first `_` is the hex-encoded serial.
fn parse_serial(name: &str) -> Result<[u8; 4], InvalidReply> {
	let mut parts = name.splitn(2, '_');
	let _prefix = parts.next();
	let hex = match parts.next() {
		Some(hex) => hex,
		None => return Err(InvalidDeviceNameFormat { name: name.to_owned() }.into()),
	};
	match decode_serial(hex) {
		Some(serial) => Ok(serial),
		None => Err(InvalidSerialFormat {
			name: name.to_owned(),
			hex: hex.to_owned(),
		}
		.into()),
	}
}

/// Decode exactly eight hex digits into the 4-byte serial number.
fn decode_serial(hex: &str) -> Option<[u8; 4]> {
	let digits = hex.as_bytes();
	if digits.len() != 8 {
		return None;
	}
	let mut serial = [0; 4];
	for (i, pair) in digits.chunks_exact(2).enumerate() {
		serial[i] = hex_value(pair[0])? << 4 | hex_value(pair[1])?;
	}
	Some(serial)
}

fn hex_value(digit: u8) -> Option<u8> {
	match digit {
		b'0'..=b'9' => Some(digit - b'0'),
		b'a'..=b'f' => Some(digit - b'a' + 10),
		b'A'..=b'F' => Some(digit - b'A' + 10),
		_ => None,
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::{assert, let_assert};

	fn source() -> IpAddr {
		"192.168.1.30".parse().unwrap()
	}

	#[test]
	fn ack_reply_matches_without_identity() {
		let_assert!(Ok(Some(DiscoveryOutcome::Matched(address))) = parse_reply(&[0xFB, 0xC0], source()));
		assert!(address == source());
	}

	#[test]
	fn ack_reply_must_be_exactly_two_bytes() {
		assert!(let Ok(None) = parse_reply(&[0xFB, 0xC0, 0x00], source()));
		assert!(let Ok(None) = parse_reply(&[0xFB], source()));
	}

	#[test]
	fn named_reply_is_identified() {
		let mut reply = vec![0xAB, 0x02];
		reply.extend_from_slice(b"HCX_51390C00\0");
		let_assert!(Ok(Some(DiscoveryOutcome::Identified(identity))) = parse_reply(&reply, source()));
		assert!(identity.name == "HCX_51390C00");
		assert!(identity.serial == [0x51, 0x39, 0x0C, 0x00]);
		assert!(identity.address == source());
	}

	#[test]
	fn name_without_terminator_runs_to_end_of_buffer() {
		let mut reply = vec![0xAB, 0x02];
		reply.extend_from_slice(b"HCX_51390c00");
		let_assert!(Ok(Some(DiscoveryOutcome::Identified(identity))) = parse_reply(&reply, source()));
		assert!(identity.serial == [0x51, 0x39, 0x0C, 0x00]);
	}

	#[test]
	fn name_without_separator_is_a_format_error() {
		let mut reply = vec![0xAB, 0x02];
		reply.extend_from_slice(b"HCX\0");
		let_assert!(Err(InvalidReply::InvalidDeviceNameFormat(e)) = parse_reply(&reply, source()));
		assert!(e.name == "HCX");
	}

	#[test]
	fn bad_hex_serial_is_a_serial_error() {
		let mut reply = vec![0xAB, 0x02];
		reply.extend_from_slice(b"HCX_ZZ\0");
		let_assert!(Err(InvalidReply::InvalidSerialFormat(e)) = parse_reply(&reply, source()));
		assert!(e.hex == "ZZ");
	}

	#[test]
	fn short_hex_serial_is_a_serial_error() {
		let mut reply = vec![0xAB, 0x02];
		reply.extend_from_slice(b"HCX_5139\0");
		assert!(let Err(InvalidReply::InvalidSerialFormat(_)) = parse_reply(&reply, source()));
	}

	#[test]
	fn unrelated_datagrams_are_ignored() {
		assert!(let Ok(None) = parse_reply(&[], source()));
		assert!(let Ok(None) = parse_reply(&[0x01, 0x02, 0x03], source()));
		assert!(let Ok(None) = parse_reply(&DISCOVERY_REQUEST_LEGACY, source()));
	}

	#[test]
	fn hex_decoding_accepts_both_cases() {
		assert!(decode_serial("51390C00") == Some([0x51, 0x39, 0x0C, 0x00]));
		assert!(decode_serial("51390c00") == Some([0x51, 0x39, 0x0C, 0x00]));
		assert!(decode_serial("deadbeef") == Some([0xDE, 0xAD, 0xBE, 0xEF]));
		assert!(decode_serial("5139 C00") == None);
		assert!(decode_serial("51390C000") == None);
	}
}
