use std::{
	collections::{BTreeSet, HashSet},
	mem,
	path::Path
};

use onnx_proto::{Message, NodeProto, ONNX_DOMAIN, is_onnx_domain};

use super::{
	MIN_OPSET, QuantType, QuantizationReport, SkipReason, SkippedNode,
	operator::{Rewrite, SUPPORTED_OP_TYPES, operator_for},
	rewrite::{RewriteContext, WeightConfig, remove_unused_initializers}
};
use crate::{error::Result, model::Model};

/// Configures and applies dynamic quantization.
///
/// ```no_run
/// # use ort_quantize::quantization::{DynamicQuantizer, QuantType};
/// # fn main() -> ort_quantize::Result<()> {
/// let report = DynamicQuantizer::new()
/// 	.with_weight_type(QuantType::QUInt8)
/// 	.with_op_types(["MatMul", "Add"])
/// 	.commit_from_file("test_assets/groundingdino.onnx", "test_assets/groundingdino_int8.onnx")?;
/// println!("{report}");
/// # 	Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DynamicQuantizer {
	weight_type: QuantType,
	op_types: BTreeSet<String>,
	per_channel: bool,
	reduce_range: bool,
	symmetric: Option<bool>,
	nodes_to_quantize: HashSet<String>,
	nodes_to_exclude: HashSet<String>
}

impl Default for DynamicQuantizer {
	fn default() -> Self {
		Self {
			weight_type: QuantType::default(),
			op_types: SUPPORTED_OP_TYPES.iter().map(|op| op.to_string()).collect(),
			per_channel: false,
			reduce_range: false,
			symmetric: None,
			nodes_to_quantize: HashSet::new(),
			nodes_to_exclude: HashSet::new()
		}
	}
}

impl DynamicQuantizer {
	/// Creates a quantizer targeting every supported operator type with [`QuantType::QInt8`] weights.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the integer type weights are stored as.
	#[must_use]
	pub fn with_weight_type(mut self, weight_type: QuantType) -> Self {
		self.weight_type = weight_type;
		self
	}

	/// Restricts quantization to nodes of the given operator types. Types without a quantizer are reported as skipped.
	#[must_use]
	pub fn with_op_types<S: Into<String>>(mut self, op_types: impl IntoIterator<Item = S>) -> Self {
		self.op_types = op_types.into_iter().map(Into::into).collect();
		self
	}

	/// Enable/disable per-channel quantization of 2-D `MatMul` weights, with one scale per output column. By default,
	/// this is disabled.
	#[must_use]
	pub fn with_per_channel(mut self, per_channel: bool) -> Self {
		self.per_channel = per_channel;
		self
	}

	/// Enable/disable quantizing weights to 7 bits instead of 8. By default, this is disabled.
	///
	/// Some CPUs without VNNI instructions accumulate 8-bit products in 16 bits, which can saturate with full-range
	/// weights.
	#[must_use]
	pub fn with_reduce_range(mut self, reduce_range: bool) -> Self {
		self.reduce_range = reduce_range;
		self
	}

	/// Overrides whether weights are quantized symmetrically around zero. `None` selects the default for the weight
	/// type: symmetric for [`QuantType::QInt8`], asymmetric for [`QuantType::QUInt8`].
	#[must_use]
	pub fn with_symmetric_weights(mut self, symmetric: Option<bool>) -> Self {
		self.symmetric = symmetric;
		self
	}

	/// Only quantize the named nodes. An empty list, the default, selects every node.
	#[must_use]
	pub fn with_nodes_to_quantize<S: Into<String>>(mut self, nodes: impl IntoIterator<Item = S>) -> Self {
		self.nodes_to_quantize = nodes.into_iter().map(Into::into).collect();
		self
	}

	/// Never quantize the named nodes.
	#[must_use]
	pub fn with_nodes_to_exclude<S: Into<String>>(mut self, nodes: impl IntoIterator<Item = S>) -> Self {
		self.nodes_to_exclude = nodes.into_iter().map(Into::into).collect();
		self
	}

	pub fn weight_type(&self) -> QuantType {
		self.weight_type
	}

	fn weight_config(&self) -> WeightConfig {
		WeightConfig {
			quant_type: self.weight_type,
			per_channel: self.per_channel,
			reduce_range: self.reduce_range,
			symmetric: self.symmetric.unwrap_or_else(|| self.weight_type.default_symmetric())
		}
	}

	/// Decides whether `node` is a candidate. `None` means the node is not targeted at all and is not reported.
	fn select(&self, node: &NodeProto) -> Option<Result<(), SkipReason>> {
		if !self.op_types.contains(&node.op_type) {
			return None;
		}
		Some(if !is_onnx_domain(&node.domain) {
			Err(SkipReason::NonDefaultDomain)
		} else if self.nodes_to_exclude.contains(&node.name) {
			Err(SkipReason::Excluded)
		} else if !self.nodes_to_quantize.is_empty() && !self.nodes_to_quantize.contains(&node.name) {
			Err(SkipReason::NotSelected)
		} else {
			Ok(())
		})
	}

	/// Quantizes `model` in place.
	pub fn quantize(&self, model: &mut Model) -> Result<QuantizationReport> {
		let mut report = QuantizationReport::default();

		match model.opset_version(ONNX_DOMAIN) {
			Some(version) if version >= MIN_OPSET => {}
			version => {
				crate::warn!("Raising the default ONNX opset from {version:?} to {MIN_OPSET}; the model may need re-validation");
				model.set_opset_version(ONNX_DOMAIN, MIN_OPSET);
				report.opset_upgraded_from = version;
			}
		}

		let graph = model.graph_mut()?;
		report.initializer_bytes_before = graph.initializer.iter().map(Message::encoded_len).sum();

		let nodes = mem::take(&mut graph.node);
		let mut ctx = RewriteContext::new(graph, &nodes, self.weight_config());
		let mut rewritten = Vec::with_capacity(nodes.len());
		for node in &nodes {
			let verdict = match self.select(node) {
				None => {
					rewritten.push(node.clone());
					continue;
				}
				Some(Err(reason)) => Rewrite::Keep(reason),
				Some(Ok(())) => match operator_for(&node.op_type) {
					Some(operator) => operator.quantize(node, &mut ctx)?,
					None => Rewrite::Keep(SkipReason::NoQuantizer)
				}
			};

			match verdict {
				Rewrite::Keep(reason) => {
					crate::debug!(node = %node.name, op_type = %node.op_type, %reason, "Skipping node");
					report.skipped.push(SkippedNode {
						name: node.name.clone(),
						op_type: node.op_type.clone(),
						reason
					});
					rewritten.push(node.clone());
				}
				Rewrite::Replace(replacement) => {
					crate::trace!(node = %node.name, op_type = %node.op_type, "Quantized node");
					*report.quantized_nodes.entry(node.op_type.clone()).or_default() += 1;
					rewritten.extend(replacement);
				}
			}
		}
		let output = ctx.finish();

		graph.node = rewritten;
		graph.initializer.extend(output.initializers);
		report.removed_initializers = remove_unused_initializers(graph, &output.quantized_weights);
		report.quantized_weights = output.quantized_weights;
		report.initializer_bytes_after = graph.initializer.iter().map(Message::encoded_len).sum();

		let proto = model.proto_mut();
		proto.producer_name = env!("CARGO_PKG_NAME").to_owned();
		proto.producer_version = env!("CARGO_PKG_VERSION").to_owned();

		crate::info!("{report}");
		Ok(report)
	}

	/// Reads the model at `input`, quantizes it and writes the result to `output`.
	pub fn commit_from_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<QuantizationReport> {
		let mut model = Model::from_file(input)?;
		let report = self.quantize(&mut model)?;
		model.save(output)?;
		Ok(report)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use onnx_proto::{
		ONNX_DOMAIN,
		helper::{make_f32_tensor, make_graph, make_graph_attribute, make_model, make_node, make_opset, make_tensor_value_info},
		tensor_proto::DataType,
		tensor_shape_proto::dimension
	};

	use super::DynamicQuantizer;
	use crate::{
		error::ErrorCode,
		model::Model,
		quantization::{MIN_OPSET, QuantType, SkipReason}
	};

	fn model(opset: i64) -> Model {
		let dims = || -> [Option<dimension::Value>; 2] { [Some("batch".into()), Some(2.into())] };
		let graph = make_graph(
			"g",
			vec![
				make_node("MatMul", ONNX_DOMAIN, "mm0", ["x", "w"], ["h0"]),
				make_node("MatMul", ONNX_DOMAIN, "mm1", ["x", "w"], ["h1"]),
				make_node("Add", ONNX_DOMAIN, "add0", ["h0", "h1"], ["s"]),
				make_node("Add", ONNX_DOMAIN, "add1", ["s", "b"], ["y"]),
				make_node("Mul", ONNX_DOMAIN, "mul0", ["y", "m"], ["z"]),
			],
			vec![make_tensor_value_info("x", DataType::Float, dims())],
			vec![make_tensor_value_info("z", DataType::Float, dims())],
			vec![
				make_f32_tensor("w", [2, 2], &[0.5, -1.0, 0.25, 2.0]),
				make_f32_tensor("b", [2], &[0.1, 0.2]),
				make_f32_tensor("m", [2], &[3.0, 4.0]),
			]
		);
		Model::from(make_model(graph, [make_opset(ONNX_DOMAIN, opset)]))
	}

	#[test]
	fn test_quantize_rewrites_targeted_nodes() -> crate::Result<()> {
		let mut model = model(13);
		let report = DynamicQuantizer::new().with_weight_type(QuantType::QUInt8).quantize(&mut model)?;

		assert_eq!(report.quantized_nodes.get("MatMul"), Some(&2));
		assert_eq!(report.quantized_nodes.get("Add"), Some(&1));
		assert_eq!(report.skipped.len(), 1);
		assert_eq!(report.skipped[0].name, "add0");
		assert_eq!(report.skipped[0].reason, SkipReason::NoFloatWeight);
		assert_eq!(report.removed_initializers, ["b", "w"].into_iter().map(String::from).collect::<BTreeSet<_>>());
		assert_eq!(report.opset_upgraded_from, None);

		let graph = model.graph()?;
		let count = |op: &str| graph.node.iter().filter(|n| n.op_type == op).count();
		// one shared activation quantization and one shared weight
		assert_eq!(count("DynamicQuantizeLinear"), 1);
		assert_eq!(count("MatMulInteger"), 2);
		assert_eq!(count("DequantizeLinear"), 1);
		assert_eq!(count("MatMul"), 0);
		assert!(graph.initializer.iter().any(|t| t.name == "m"));
		assert!(graph.initializer.iter().any(|t| t.name == "w_quantized" && t.data_type == DataType::Uint8 as i32));
		assert_eq!(model.proto().producer_name, "ort-quantize");
		Ok(())
	}

	#[test]
	fn test_node_filters() -> crate::Result<()> {
		let mut model = model(13);
		let report = DynamicQuantizer::new()
			.with_op_types(["MatMul", "Mul"])
			.with_nodes_to_exclude(["mm1"])
			.quantize(&mut model)?;

		assert_eq!(report.total_quantized_nodes(), 1);
		let reasons: Vec<_> = report.skipped.iter().map(|s| (s.name.as_str(), s.reason)).collect();
		assert_eq!(reasons, [("mm1", SkipReason::Excluded), ("mul0", SkipReason::NoQuantizer)]);
		// `w` is still read by the excluded node
		assert!(report.removed_initializers.is_empty());

		let mut model = self::model(13);
		let report = DynamicQuantizer::new().with_nodes_to_quantize(["add1"]).quantize(&mut model)?;
		assert_eq!(report.quantized_nodes.keys().collect::<Vec<_>>(), ["Add"]);
		assert_eq!(report.skipped.iter().filter(|s| s.reason == SkipReason::NotSelected).count(), 3);
		Ok(())
	}

	#[test]
	fn test_old_opset_is_raised() -> crate::Result<()> {
		let mut model = model(9);
		let report = DynamicQuantizer::new().quantize(&mut model)?;
		assert_eq!(report.opset_upgraded_from, Some(9));
		assert_eq!(model.opset_version(ONNX_DOMAIN), Some(MIN_OPSET));
		Ok(())
	}

	#[test]
	fn test_subgraphs_are_left_alone() -> crate::Result<()> {
		let dims = || -> [Option<dimension::Value>; 2] { [Some("batch".into()), Some(2.into())] };
		let then_branch = make_graph(
			"then",
			vec![make_node("MatMul", ONNX_DOMAIN, "inner_mm", ["x", "w"], ["t"])],
			vec![],
			vec![make_tensor_value_info("t", DataType::Float, dims())],
			vec![]
		);
		let else_branch = make_graph(
			"else",
			vec![make_node("Identity", ONNX_DOMAIN, "inner_id", ["x"], ["e"])],
			vec![],
			vec![make_tensor_value_info("e", DataType::Float, dims())],
			vec![]
		);
		let mut branch = make_node("If", ONNX_DOMAIN, "if0", ["cond"], ["branch"]);
		branch.attribute = vec![make_graph_attribute("then_branch", then_branch.clone()), make_graph_attribute("else_branch", else_branch)];
		let graph = make_graph(
			"g",
			vec![make_node("MatMul", ONNX_DOMAIN, "mm0", ["x", "w"], ["h"]), branch],
			vec![make_tensor_value_info("x", DataType::Float, dims()), make_tensor_value_info("cond", DataType::Bool, [Some(1.into())])],
			vec![make_tensor_value_info("h", DataType::Float, dims()), make_tensor_value_info("branch", DataType::Float, dims())],
			vec![make_f32_tensor("w", [2, 2], &[0.5, -1.0, 0.25, 2.0])]
		);
		let mut model = Model::from(make_model(graph, [make_opset(ONNX_DOMAIN, 13)]));

		let report = DynamicQuantizer::new().quantize(&mut model)?;
		assert_eq!(report.quantized_nodes.get("MatMul"), Some(&1));
		assert!(report.removed_initializers.is_empty());

		let graph = model.graph()?;
		let if_node = graph.node.iter().find(|n| n.name == "if0").expect("If node");
		let then_attr = if_node.attribute.iter().find(|a| a.name == "then_branch").expect("then branch");
		assert_eq!(then_attr.g.as_ref(), Some(&then_branch));
		// the inner `MatMul` still reads the float weight
		assert!(graph.initializer.iter().any(|t| t.name == "w" && t.data_type == DataType::Float as i32));
		assert!(graph.initializer.iter().any(|t| t.name == "w_quantized"));
		Ok(())
	}

	#[test]
	fn test_oversized_weight_is_an_error() {
		let mut model = model(13);
		let graph = model.graph_mut().expect("graph");
		let weight = graph.initializer.iter_mut().find(|t| t.name == "w").expect("weight");
		weight.dims = vec![1 << 62];
		weight.raw_data.truncate(4);

		let err = DynamicQuantizer::new().quantize(&mut model).expect_err("oversized weight");
		assert_eq!(err.code(), ErrorCode::InvalidGraph);
	}
}
