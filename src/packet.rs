//! Command packet layout and template manipulation.

/// Byte offsets of the fields within a command packet.
#[rustfmt::skip]
pub mod offset {
	pub const MARKER_A    : usize = 0;
	pub const MARKER_B    : usize = 1;
	pub const COUNTER     : usize = 2;
	pub const SPEED       : usize = 3;
	pub const BRIGHTNESS  : usize = 4;
	pub const SINGLE_FILE : usize = 5;
	pub const SERIAL      : usize = 12;
}

/// Size of a command packet on the wire.
pub const PACKET_LEN: usize = 16;

/// The two marker bytes every command packet starts with.
pub const COMMAND_MARKER: [u8; 2] = [0xFB, 0xC1];

/// Blank template: counter zero, serial region zeroed, remaining bytes as
/// observed in captured traffic.
#[rustfmt::skip]
const TEMPLATE: [u8; PACKET_LEN] = [
	0xFB, 0xC1, 0x00, 0x13, 0x00, 0x01, 0x00, 0xAE,
	0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// A 16-byte command packet for the H806SB controller.
///
/// A packet is a plain value. The `with_*` functions return a patched copy
/// rather than mutating in place, so a session can hold on to its current
/// template and only commit the new value once the packet was actually sent.
///
/// Out-of-range field values are clamped, not rejected: malformed input must
/// never put an out-of-range byte on the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CommandPacket {
	data: [u8; PACKET_LEN],
}

impl CommandPacket {
	/// Create a blank packet with a zeroed serial region.
	///
	/// Until the serial number is set with [`Self::with_serial`],
	/// the packet reports `false` from [`Self::has_serial`].
	pub fn new() -> Self {
		Self { data: TEMPLATE }
	}

	/// The raw bytes of the packet.
	pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
		&self.data
	}

	/// The command sequence counter.
	pub fn counter(&self) -> u8 {
		self.data[offset::COUNTER]
	}

	/// The playback speed byte.
	pub fn speed(&self) -> u8 {
		self.data[offset::SPEED]
	}

	/// The brightness byte.
	pub fn brightness(&self) -> u8 {
		self.data[offset::BRIGHTNESS]
	}

	/// The single-file-playback flag byte.
	pub fn single_file(&self) -> u8 {
		self.data[offset::SINGLE_FILE]
	}

	/// Check if the serial region of the packet has been populated.
	///
	/// An all-zero tail (offsets 10-15) means no device has been discovered
	/// yet, and the packet must not be transmitted.
	pub fn has_serial(&self) -> bool {
		self.data[10..].iter().any(|&byte| byte != 0)
	}

	/// Copy of the packet with the brightness set, clamped to 0-31.
	pub fn with_brightness(mut self, value: u8) -> Self {
		self.data[offset::BRIGHTNESS] = value.min(31);
		self
	}

	/// Copy of the packet with the playback speed set, clamped to 1-100.
	pub fn with_speed(mut self, value: u8) -> Self {
		self.data[offset::SPEED] = value.clamp(1, 100);
		self
	}

	/// Copy of the packet with the single-file-playback flag set, clamped to 0-1.
	pub fn with_single_file(mut self, value: u8) -> Self {
		self.data[offset::SINGLE_FILE] = value.min(1);
		self
	}

	/// Copy of the packet with the device serial number written to offsets 12-15.
	///
	/// The bytes are stored in reverse order relative to the discovery reply:
	/// offset 15 gets `serial[0]` and offset 12 gets `serial[3]`.
	/// That is how the device expects them, not a bug.
	pub fn with_serial(mut self, serial: [u8; 4]) -> Self {
		for (i, &byte) in serial.iter().enumerate() {
			self.data[offset::SERIAL + 3 - i] = byte;
		}
		self
	}

	/// Copy of the packet with the sequence counter incremented, wrapping at 256.
	pub fn bump_counter(mut self) -> Self {
		self.data[offset::COUNTER] = self.data[offset::COUNTER].wrapping_add(1);
		self
	}
}

impl Default for CommandPacket {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn blank_packet_has_no_serial() {
		let packet = CommandPacket::new();
		assert!(packet.has_serial() == false);
		assert!(packet.as_bytes()[offset::MARKER_A] == 0xFB);
		assert!(packet.as_bytes()[offset::MARKER_B] == 0xC1);
		assert!(packet.as_bytes()[7] == 0xAE);
		assert!(packet.counter() == 0);
	}

	#[test]
	fn brightness_is_clamped() {
		for value in 0..=u8::MAX {
			let packet = CommandPacket::new().with_brightness(value);
			assert!(packet.brightness() == value.clamp(0, 31));
		}
	}

	#[test]
	fn speed_is_clamped() {
		for value in 0..=u8::MAX {
			let packet = CommandPacket::new().with_speed(value);
			assert!(packet.speed() == value.clamp(1, 100));
		}
	}

	#[test]
	fn single_file_is_clamped() {
		for value in 0..=u8::MAX {
			let packet = CommandPacket::new().with_single_file(value);
			assert!(packet.single_file() == value.clamp(0, 1));
		}
	}

	#[test]
	fn patches_leave_other_fields_alone() {
		let packet = CommandPacket::new().with_brightness(20);
		assert!(packet.speed() == CommandPacket::new().speed());
		assert!(packet.single_file() == CommandPacket::new().single_file());
		assert!(packet.counter() == 0);
	}

	#[test]
	fn serial_is_stored_reversed() {
		let packet = CommandPacket::new().with_serial([0x51, 0x39, 0x0C, 0x00]);
		assert!(packet.as_bytes()[offset::SERIAL..] == [0x00, 0x0C, 0x39, 0x51]);
		assert!(packet.has_serial());
	}

	#[test]
	fn counter_wraps_at_256() {
		let mut packet = CommandPacket::new();
		for _ in 0..300 {
			packet = packet.bump_counter();
		}
		assert!(packet.counter() == (300 % 256) as u8);
	}
}
