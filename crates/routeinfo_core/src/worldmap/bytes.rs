//! Bounded big-endian cursors over fixed-size byte buffers.
//!
//! Every multi-byte field in the archive and route payload is big-endian, so
//! byte order is not a parameter here.

use crate::worldmap::{Result, RouteError};

/// Simple bounded cursor over an immutable byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Move to an absolute offset. Seeking to the end is allowed.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		if pos > self.bytes.len() {
			return Err(RouteError::OutOfBounds {
				at: pos,
				need: 0,
				rem: 0,
			});
		}
		self.pos = pos;
		Ok(())
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(RouteError::OutOfBounds {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read all remaining bytes.
	pub fn read_rest(&mut self) -> &'a [u8] {
		let start = self.pos.min(self.bytes.len());
		self.pos = self.bytes.len();
		&self.bytes[start..]
	}

	/// Read a four-byte code.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		Ok(self.read_array()?)
	}

	/// Read a fixed-size byte array.
	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a big-endian `u16`.
	pub fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_be_bytes(self.read_array()?))
	}

	/// Read a big-endian `u32`.
	pub fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_be_bytes(self.read_array()?))
	}

	/// Read a zero-terminated byte string without the terminator.
	pub fn read_cstring_bytes(&mut self) -> Result<&'a [u8]> {
		let start = self.pos;
		let rem = self.bytes.get(self.pos..).unwrap_or(&[]);
		let Some(rel_end) = rem.iter().position(|byte| *byte == 0) else {
			return Err(RouteError::OutOfBounds {
				at: self.pos,
				need: rem.len() + 1,
				rem: rem.len(),
			});
		};

		let end = start + rel_end;
		self.pos = end + 1;
		Ok(&self.bytes[start..end])
	}
}

/// Bounded writer over a pre-sized mutable byte slice.
///
/// The writer never grows its buffer; callers compute the encoded size first.
pub struct Writer<'a> {
	bytes: &'a mut [u8],
	pos: usize,
}

impl<'a> Writer<'a> {
	/// Create a writer at position 0.
	pub fn new(bytes: &'a mut [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining writable bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Move to an absolute offset. Seeking to the end is allowed.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		if pos > self.bytes.len() {
			return Err(RouteError::OutOfBounds {
				at: pos,
				need: 0,
				rem: 0,
			});
		}
		self.pos = pos;
		Ok(())
	}

	/// Advance to the next multiple of `boundary` without writing.
	pub fn skip_to_alignment(&mut self, boundary: usize) -> Result<()> {
		self.seek(align_up(self.pos, boundary))
	}

	/// Write raw bytes and advance.
	pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
		self.write_bytes_at(self.pos, data)?;
		self.pos += data.len();
		Ok(())
	}

	/// Write one byte.
	pub fn write_u8(&mut self, value: u8) -> Result<()> {
		self.write_bytes(&[value])
	}

	/// Write a big-endian `u16`.
	pub fn write_u16(&mut self, value: u16) -> Result<()> {
		self.write_bytes(&value.to_be_bytes())
	}

	/// Write a big-endian `u32`.
	pub fn write_u32(&mut self, value: u32) -> Result<()> {
		self.write_bytes(&value.to_be_bytes())
	}

	/// Write a big-endian `u32` at an absolute offset without moving.
	pub fn write_u32_at(&mut self, at: usize, value: u32) -> Result<()> {
		self.write_bytes_at(at, &value.to_be_bytes())
	}

	fn write_bytes_at(&mut self, at: usize, data: &[u8]) -> Result<()> {
		let rem = self.bytes.len().saturating_sub(at);
		if data.len() > rem {
			return Err(RouteError::OutOfBounds { at, need: data.len(), rem });
		}
		self.bytes[at..at + data.len()].copy_from_slice(data);
		Ok(())
	}
}

/// Round `value` up to a multiple of `boundary`.
pub(crate) fn align_up(value: usize, boundary: usize) -> usize {
	match value % boundary {
		0 => value,
		rem => value + (boundary - rem),
	}
}
