use std::{
	collections::{BTreeMap, BTreeSet},
	fmt
};

/// Why a node of a targeted operator type was left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
	/// No input of the node is a float32 initializer.
	NoFloatWeight,
	/// The weight's data lives in an external file.
	ExternalWeight,
	/// The weight is also declared as a graph input, so callers may override it at inference time.
	OverridableWeight,
	/// The weight has no elements.
	EmptyWeight,
	/// The node is in an operator domain other than the default ONNX domain.
	NonDefaultDomain,
	/// The node is not in the configured allow-list.
	NotSelected,
	/// The node is in the configured deny-list.
	Excluded,
	/// No quantizer exists for the node's operator type.
	NoQuantizer
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			SkipReason::NoFloatWeight => "no float32 initializer input",
			SkipReason::ExternalWeight => "weight is stored externally",
			SkipReason::OverridableWeight => "weight is also a graph input",
			SkipReason::EmptyWeight => "weight is empty",
			SkipReason::NonDefaultDomain => "operator is not in the default ONNX domain",
			SkipReason::NotSelected => "node not selected for quantization",
			SkipReason::Excluded => "node excluded from quantization",
			SkipReason::NoQuantizer => "operator type has no dynamic quantizer"
		})
	}
}

/// A node of a targeted operator type that was left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNode {
	pub name: String,
	pub op_type: String,
	pub reason: SkipReason
}

/// Summary of one quantization pass over a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantizationReport {
	/// Number of rewritten nodes, per operator type.
	pub quantized_nodes: BTreeMap<String, usize>,
	/// Names of the original float initializers that were quantized.
	pub quantized_weights: BTreeSet<String>,
	/// Float initializers dropped because nothing referenced them after rewriting.
	pub removed_initializers: BTreeSet<String>,
	pub skipped: Vec<SkippedNode>,
	/// Encoded size of all initializers before quantization, in bytes.
	pub initializer_bytes_before: usize,
	/// Encoded size of all initializers after quantization, in bytes.
	pub initializer_bytes_after: usize,
	/// The previous default-domain opset, if it had to be raised.
	pub opset_upgraded_from: Option<i64>
}

impl QuantizationReport {
	#[must_use]
	pub fn total_quantized_nodes(&self) -> usize {
		self.quantized_nodes.values().sum()
	}
}

impl fmt::Display for QuantizationReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "quantized {} node(s)", self.total_quantized_nodes())?;
		if !self.quantized_nodes.is_empty() {
			let per_op: Vec<String> = self.quantized_nodes.iter().map(|(op, n)| format!("{op}: {n}")).collect();
			write!(f, " ({})", per_op.join(", "))?;
		}
		write!(
			f,
			", {} weight(s), initializers {} -> {} bytes",
			self.quantized_weights.len(),
			self.initializer_bytes_before,
			self.initializer_bytes_after
		)?;
		if !self.skipped.is_empty() {
			write!(f, ", {} node(s) skipped", self.skipped.len())?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{QuantizationReport, SkipReason, SkippedNode};

	#[test]
	fn test_summary_line() {
		let mut report = QuantizationReport {
			initializer_bytes_before: 4000,
			initializer_bytes_after: 1100,
			..QuantizationReport::default()
		};
		report.quantized_nodes.insert("MatMul".to_string(), 2);
		report.quantized_nodes.insert("Add".to_string(), 1);
		report.quantized_weights.insert("w".to_string());
		report.skipped.push(SkippedNode {
			name: "add_1".to_string(),
			op_type: "Add".to_string(),
			reason: SkipReason::NoFloatWeight
		});

		assert_eq!(report.total_quantized_nodes(), 3);
		assert_eq!(report.to_string(), "quantized 3 node(s) (Add: 1, MatMul: 2), 1 weight(s), initializers 4000 -> 1100 bytes, 1 node(s) skipped");
	}
}
