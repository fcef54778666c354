//! Decode/encode round-trip checks used by tests and the `verify` command.

use crate::worldmap::{LoadOptions, Result, RouteModel, RouteTable};

/// Outcome of re-encoding an unedited buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTripReport {
	/// Length of the input buffer.
	pub original_len: usize,
	/// Length of the re-encoded buffer.
	pub reencoded_len: usize,
	/// First offset where the buffers differ, including a length mismatch.
	pub first_mismatch: Option<usize>,
}

impl RoundTripReport {
	fn compare(original: &[u8], reencoded: &[u8]) -> Self {
		Self {
			original_len: original.len(),
			reencoded_len: reencoded.len(),
			first_mismatch: first_mismatch(original, reencoded),
		}
	}

	/// Return `true` when the re-encoded buffer equals the input.
	pub fn is_identical(&self) -> bool {
		self.first_mismatch.is_none()
	}
}

/// Load an archive with default options, re-encode it, and compare.
pub fn verify(original: &[u8]) -> Result<RoundTripReport> {
	verify_with(original, &LoadOptions::default())
}

/// Load an archive, re-encode it without edits, and compare.
pub fn verify_with(original: &[u8], options: &LoadOptions) -> Result<RoundTripReport> {
	let model = RouteModel::from_bytes_with(original, options)?;
	let reencoded = model.to_bytes()?;
	Ok(RoundTripReport::compare(original, &reencoded))
}

/// Decode a bare route payload, re-encode it, and compare.
pub fn verify_table(payload: &[u8]) -> Result<RoundTripReport> {
	let reencoded = RouteTable::decode(payload)?.encode()?;
	Ok(RoundTripReport::compare(payload, &reencoded))
}

/// First offset where `left` and `right` differ. A strict prefix differs at
/// the shorter length.
pub fn first_mismatch(left: &[u8], right: &[u8]) -> Option<usize> {
	left.iter()
		.zip(right)
		.position(|(a, b)| a != b)
		.or_else(|| (left.len() != right.len()).then(|| left.len().min(right.len())))
}

#[cfg(test)]
mod tests {
	use routeinfo_testkit::{archive_with_payload, sample_archive, sample_payload};

	use crate::worldmap::{first_mismatch, verify, verify_table};

	#[test]
	fn sample_archive_round_trips() {
		let report = verify(&sample_archive()).expect("sample verifies");
		assert!(report.is_identical(), "report: {report:?}");
		assert_eq!(report.original_len, report.reencoded_len);
	}

	#[test]
	fn sample_payload_round_trips() {
		let report = verify_table(&sample_payload()).expect("payload verifies");
		assert!(report.is_identical());
	}

	#[test]
	fn non_canonical_padding_is_reported() {
		let mut original = sample_archive();
		original.extend_from_slice(&[0; 0x20]);

		let report = verify(&original).expect("padded archive still decodes");
		assert_eq!(report.first_mismatch, Some(original.len() - 0x20));
		assert_eq!(report.reencoded_len, original.len() - 0x20);
	}

	#[test]
	fn trailing_payload_bytes_survive() {
		let mut payload = sample_payload();
		payload.extend_from_slice(b"pad!");
		let report = verify(&archive_with_payload(&payload)).expect("archive verifies");
		assert!(report.is_identical());
	}

	#[test]
	fn mismatch_offsets() {
		assert_eq!(first_mismatch(b"abc", b"abc"), None);
		assert_eq!(first_mismatch(b"abc", b"abd"), Some(2));
		assert_eq!(first_mismatch(b"ab", b"abc"), Some(2));
		assert_eq!(first_mismatch(b"", b"x"), Some(0));
	}
}
