//! Checks that quantization leaves every weight it was not asked to touch bit-for-bit identical.

use std::collections::{BTreeMap, BTreeSet};

use onnx_proto::{GraphProto, Message};
use sha2::{Digest, Sha256};

use crate::{
	error::{Error, ErrorCode, Result},
	model::Model
};

/// SHA-256 fingerprints of the initializers of a graph, keyed by initializer name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightDigests {
	digests: BTreeMap<String, [u8; 32]>
}

impl WeightDigests {
	pub fn of_graph(graph: &GraphProto) -> Self {
		let digests = graph
			.initializer
			.iter()
			.map(|tensor| {
				let mut digest = [0u8; 32];
				digest.copy_from_slice(&Sha256::digest(tensor.encode_to_vec()));
				(tensor.name.clone(), digest)
			})
			.collect();
		Self { digests }
	}

	pub fn of_model(model: &Model) -> Result<Self> {
		Ok(Self::of_graph(model.graph()?))
	}

	pub fn get(&self, name: &str) -> Option<&[u8; 32]> {
		self.digests.get(name)
	}

	pub fn len(&self) -> usize {
		self.digests.len()
	}

	pub fn is_empty(&self) -> bool {
		self.digests.is_empty()
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.digests.keys().map(String::as_str)
	}
}

/// Result of a successful [`verify_untouched`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditReport {
	/// Number of initializers found unchanged.
	pub verified: usize
}

/// Verifies that every initializer in `before`, except those named in `quantized`, appears unchanged in `after`.
///
/// Fails with [`ErrorCode::InvalidGraph`] naming the first weight that went missing or changed.
pub fn verify_untouched(before: &WeightDigests, after: &WeightDigests, quantized: &BTreeSet<String>) -> Result<AuditReport> {
	let mut verified = 0;
	for (name, digest) in &before.digests {
		if quantized.contains(name) {
			continue;
		}
		match after.get(name) {
			Some(other) if other == digest => verified += 1,
			Some(_) => return Err(Error::new_with_code(ErrorCode::InvalidGraph, format!("weight '{name}' was modified but not quantized"))),
			None => return Err(Error::new_with_code(ErrorCode::InvalidGraph, format!("weight '{name}' was removed but not quantized")))
		}
	}
	crate::debug!(verified, "Unquantized weights are unchanged");
	Ok(AuditReport { verified })
}
