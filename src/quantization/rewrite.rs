use std::collections::{BTreeSet, HashMap, HashSet};

use onnx_proto::{
	GraphProto, NodeProto, ONNX_DOMAIN, TensorProto,
	helper::make_node,
	tensor_proto::{DataLocation, DataType}
};

use super::{QuantType, SkipReason, weight::quantize_weight};
use crate::{
	error::Result,
	tensor::{element_count, float_data}
};

/// How weights are converted; fixed for one pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WeightConfig {
	pub quant_type: QuantType,
	pub per_channel: bool,
	pub reduce_range: bool,
	pub symmetric: bool
}

/// Names of the three outputs of a quantized tensor: data, scale and zero point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuantizedNames {
	pub quantized: String,
	pub scale: String,
	pub zero_point: String
}

/// Hands out tensor and node names that do not collide with any name already in the model.
#[derive(Debug, Default)]
pub(crate) struct NameAllocator {
	taken: HashSet<String>
}

impl NameAllocator {
	pub fn for_graph(graph: &GraphProto) -> Self {
		let mut names = Self::default();
		names.collect(graph);
		names
	}

	fn collect(&mut self, graph: &GraphProto) {
		let value_infos = graph.input.iter().chain(&graph.output).chain(&graph.value_info);
		self.taken.extend(value_infos.map(|v| v.name.clone()));
		self.taken.extend(graph.initializer.iter().map(|t| t.name.clone()));
		self.collect_nodes(&graph.node);
	}

	fn collect_nodes(&mut self, nodes: &[NodeProto]) {
		for node in nodes {
			self.taken.insert(node.name.clone());
			self.taken.extend(node.input.iter().cloned());
			self.taken.extend(node.output.iter().cloned());
			for subgraph in node.attribute.iter().flat_map(|a| a.g.iter().chain(&a.graphs)) {
				self.collect(subgraph);
			}
		}
	}

	/// Returns `base` if it is unused, otherwise `base_1`, `base_2`, ... and reserves the result.
	pub fn fresh(&mut self, base: impl Into<String>) -> String {
		let base = base.into();
		let mut name = base.clone();
		let mut suffix = 0usize;
		while self.taken.contains(&name) {
			suffix += 1;
			name = format!("{base}_{suffix}");
		}
		self.taken.insert(name.clone());
		name
	}
}

/// State shared by all operator quantizers during one pass over a graph.
///
/// The graph's nodes are moved out before the context is built; the rewritten node list and everything collected here
/// are put back once the pass is over.
pub(crate) struct RewriteContext<'g> {
	pub config: WeightConfig,
	initializers: HashMap<&'g str, &'g TensorProto>,
	graph_inputs: HashSet<&'g str>,
	names: NameAllocator,
	activations: HashMap<String, QuantizedNames>,
	weights: HashMap<(String, Option<usize>), QuantizedNames>,
	dequantized: HashMap<String, String>,
	new_initializers: Vec<TensorProto>,
	quantized_weights: BTreeSet<String>
}

/// What a pass produced besides the rewritten nodes.
pub(crate) struct RewriteOutput {
	pub initializers: Vec<TensorProto>,
	pub quantized_weights: BTreeSet<String>
}

impl<'g> RewriteContext<'g> {
	/// `graph` must not contain any nodes; `nodes` are the nodes taken out of it.
	pub fn new(graph: &'g GraphProto, nodes: &[NodeProto], config: WeightConfig) -> Self {
		let mut names = NameAllocator::for_graph(graph);
		names.collect_nodes(nodes);

		Self {
			config,
			initializers: graph.initializer.iter().map(|t| (t.name.as_str(), t)).collect(),
			graph_inputs: graph.input.iter().map(|i| i.name.as_str()).collect(),
			names,
			activations: HashMap::new(),
			weights: HashMap::new(),
			dequantized: HashMap::new(),
			new_initializers: Vec::new(),
			quantized_weights: BTreeSet::new()
		}
	}

	pub fn fresh_name(&mut self, base: impl Into<String>) -> String {
		self.names.fresh(base)
	}

	/// Looks up `name` as a weight that may be quantized: an inline, non-empty `FLOAT` initializer that is not also a
	/// graph input.
	pub fn float_weight(&self, name: &str) -> Result<&'g TensorProto, SkipReason> {
		let tensor = self.initializers.get(name).copied().ok_or(SkipReason::NoFloatWeight)?;
		if tensor.data_type != DataType::Float as i32 {
			return Err(SkipReason::NoFloatWeight);
		}
		if tensor.data_location == DataLocation::External as i32 {
			return Err(SkipReason::ExternalWeight);
		}
		if self.graph_inputs.contains(name) {
			return Err(SkipReason::OverridableWeight);
		}
		match element_count(&tensor.dims) {
			Ok(0) => Err(SkipReason::EmptyWeight),
			_ => Ok(tensor)
		}
	}

	/// Emits a `DynamicQuantizeLinear` for the activation `name` into `nodes`, unless one was already emitted earlier in
	/// the pass.
	pub fn quantize_activation(&mut self, name: &str, nodes: &mut Vec<NodeProto>) -> QuantizedNames {
		if let Some(names) = self.activations.get(name) {
			return names.clone();
		}

		let names = QuantizedNames {
			quantized: self.fresh_name(format!("{name}_quantized")),
			scale: self.fresh_name(format!("{name}_scale")),
			zero_point: self.fresh_name(format!("{name}_zero_point"))
		};
		let node_name = self.fresh_name(format!("{name}_QuantizeLinear"));
		nodes.push(make_node("DynamicQuantizeLinear", ONNX_DOMAIN, node_name, [name], [
			names.quantized.as_str(),
			names.scale.as_str(),
			names.zero_point.as_str()
		]));
		crate::trace!(activation = name, "Quantizing activation at inference time");

		self.activations.insert(name.to_owned(), names.clone());
		names
	}

	/// Quantizes the initializer `tensor`, per channel along `axis` if given, and adds the results as new initializers.
	/// Each weight is only quantized once per granularity.
	pub fn quantize_weight(&mut self, tensor: &TensorProto, axis: Option<usize>) -> Result<QuantizedNames> {
		let key = (tensor.name.clone(), axis);
		if let Some(names) = self.weights.get(&key) {
			return Ok(names.clone());
		}

		let values = float_data(tensor)?;
		let config = self.config;
		let weight = quantize_weight(&values, &tensor.dims, config.quant_type, config.reduce_range, config.symmetric, axis)?;

		let names = QuantizedNames {
			quantized: self.fresh_name(format!("{}_quantized", tensor.name)),
			scale: self.fresh_name(format!("{}_scale", tensor.name)),
			zero_point: self.fresh_name(format!("{}_zero_point", tensor.name))
		};
		self.new_initializers.push(weight.data_tensor(names.quantized.as_str()));
		self.new_initializers.push(weight.scale_tensor(names.scale.as_str()));
		self.new_initializers.push(weight.zero_point_tensor(names.zero_point.as_str()));
		crate::debug!(weight = %tensor.name, dims = ?tensor.dims, per_channel = axis.is_some(), ty = %config.quant_type, "Quantized weight");

		self.quantized_weights.insert(tensor.name.clone());
		self.weights.insert(key, names.clone());
		Ok(names)
	}

	/// Quantizes `tensor` per tensor and emits a `DequantizeLinear` restoring it to float, returning the name of the
	/// restored tensor. The `DequantizeLinear` is shared by all consumers of the weight.
	pub fn dequantized_weight(&mut self, tensor: &TensorProto, nodes: &mut Vec<NodeProto>) -> Result<String> {
		if let Some(name) = self.dequantized.get(&tensor.name) {
			return Ok(name.clone());
		}

		let quantized = self.quantize_weight(tensor, None)?;
		let output = self.fresh_name(format!("{}_dequantized", tensor.name));
		let node_name = self.fresh_name(format!("{}_DequantizeLinear", tensor.name));
		nodes.push(make_node("DequantizeLinear", ONNX_DOMAIN, node_name, [quantized.quantized, quantized.scale, quantized.zero_point], [
			output.as_str()
		]));

		self.dequantized.insert(tensor.name.clone(), output.clone());
		Ok(output)
	}

	pub fn finish(self) -> RewriteOutput {
		RewriteOutput {
			initializers: self.new_initializers,
			quantized_weights: self.quantized_weights
		}
	}
}

/// Removes those of `candidates` that nothing in `graph` refers to anymore, along with graph inputs and value infos of
/// the same name. Returns the names of the removed initializers.
pub(crate) fn remove_unused_initializers(graph: &mut GraphProto, candidates: &BTreeSet<String>) -> BTreeSet<String> {
	let mut referenced = HashSet::new();
	collect_references(graph, &mut referenced);
	referenced.extend(graph.output.iter().map(|o| o.name.clone()));

	let removed: BTreeSet<String> = candidates.iter().filter(|name| !referenced.contains(*name)).cloned().collect();
	if removed.is_empty() {
		return removed;
	}

	graph.initializer.retain(|t| !removed.contains(&t.name));
	graph.input.retain(|i| !removed.contains(&i.name));
	graph.value_info.retain(|v| !removed.contains(&v.name));
	removed
}

fn collect_references(graph: &GraphProto, referenced: &mut HashSet<String>) {
	for node in &graph.node {
		referenced.extend(node.input.iter().filter(|i| !i.is_empty()).cloned());
		for subgraph in node.attribute.iter().flat_map(|a| a.g.iter().chain(&a.graphs)) {
			collect_references(subgraph, referenced);
		}
	}
}
