//! RFC 4648 Base32 with the standard `A-Z2-7` alphabet.
//!
//! Decoding is lenient about case and `=` padding but strict about everything
//! else. A trailing group of fewer than eight bits is dropped, which is the
//! standard truncation behaviour: `"MY"` carries ten bits and decodes to one
//! byte.

use data_encoding::BASE32_NOPAD;

use crate::error::TotpError;

pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

fn value_of(c: char) -> Option<u8> {
	match c.to_ascii_uppercase() {
		c @ 'A'..='Z' => Some(c as u8 - b'A'),
		c @ '2'..='7' => Some(c as u8 - b'2' + 26),
		_ => None,
	}
}

/// Decode a Base32 secret into raw bytes.
///
/// `position` in the returned error is the character index in `input`.
pub fn decode(input: &str) -> Result<Vec<u8>, TotpError> {
	let mut out = Vec::with_capacity(input.len() * 5 / 8);
	let mut buffer: u32 = 0;
	let mut bits: u32 = 0;

	for (position, character) in input.chars().enumerate() {
		if character == '=' {
			continue;
		}
		let value = value_of(character).ok_or(TotpError::InvalidSecret { position, character })?;
		buffer = (buffer << 5) | u32::from(value);
		bits += 5;
		if bits >= 8 {
			bits -= 8;
			out.push((buffer >> bits) as u8);
			buffer &= (1 << bits) - 1;
		}
	}

	Ok(out)
}

/// Encode bytes as unpadded uppercase Base32.
pub fn encode(bytes: &[u8]) -> String {
	BASE32_NOPAD.encode(bytes)
}
