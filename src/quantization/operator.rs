use onnx_proto::{
	NodeProto, ONNX_DOMAIN,
	helper::{make_int_attribute, make_node},
	tensor_proto::DataType
};

use super::{SkipReason, rewrite::RewriteContext};
use crate::error::{Error, ErrorCode, Result};

/// Outcome of quantizing a single node.
#[derive(Debug)]
pub(crate) enum Rewrite {
	/// The node stays as it is.
	Keep(SkipReason),
	/// The node is replaced by these nodes, in order.
	Replace(Vec<NodeProto>)
}

/// Rewrites nodes of one operator type into their dynamically quantized form.
pub(crate) trait QuantizeOperator {
	fn quantize(&self, node: &NodeProto, ctx: &mut RewriteContext<'_>) -> Result<Rewrite>;
}

/// Operator types a quantizer exists for.
pub const SUPPORTED_OP_TYPES: [&str; 2] = ["MatMul", "Add"];

pub(crate) fn operator_for(op_type: &str) -> Option<&'static dyn QuantizeOperator> {
	match op_type {
		"MatMul" => Some(&MatMulInteger),
		"Add" => Some(&DequantizedAdd),
		_ => None
	}
}

fn check_arity(node: &NodeProto, inputs: usize, outputs: usize) -> Result<()> {
	if node.input.len() != inputs || node.output.len() != outputs {
		return Err(Error::new_with_code(
			ErrorCode::InvalidGraph,
			format!(
				"{} node '{}' has {} input(s) and {} output(s), expected {inputs} and {outputs}",
				node.op_type,
				node.name,
				node.input.len(),
				node.output.len()
			)
		));
	}
	Ok(())
}

/// The base for names derived from `node`: its name, or its first output if it has none.
fn node_base_name(node: &NodeProto) -> &str {
	if node.name.is_empty() { &node.output[0] } else { &node.name }
}

/// `MatMul(A, W)` with a constant `W` becomes
/// `Mul(Cast(MatMulInteger(DynamicQuantizeLinear(A), W_q)), A_scale * W_scale)`.
struct MatMulInteger;

impl QuantizeOperator for MatMulInteger {
	fn quantize(&self, node: &NodeProto, ctx: &mut RewriteContext<'_>) -> Result<Rewrite> {
		check_arity(node, 2, 1)?;
		let weight = match ctx.float_weight(&node.input[1]) {
			Ok(weight) => weight,
			Err(reason) => return Ok(Rewrite::Keep(reason))
		};

		let axis = (ctx.config.per_channel && weight.dims.len() == 2).then_some(1);
		let mut nodes = Vec::with_capacity(5);
		let activation = ctx.quantize_activation(&node.input[0], &mut nodes);
		let weight = ctx.quantize_weight(weight, axis)?;

		let base = node_base_name(node);
		let output = &node.output[0];
		let integer_output = ctx.fresh_name(format!("{output}_output_quantized"));
		let integer_name = ctx.fresh_name(format!("{base}_quant"));
		nodes.push(make_node(
			"MatMulInteger",
			ONNX_DOMAIN,
			integer_name.as_str(),
			[&activation.quantized, &weight.quantized, &activation.zero_point, &weight.zero_point].map(String::as_str),
			[integer_output.as_str()]
		));

		let cast_output = ctx.fresh_name(format!("{integer_output}_cast_output"));
		let mut cast = make_node("Cast", ONNX_DOMAIN, ctx.fresh_name(format!("{integer_name}_cast")), [integer_output], [cast_output.as_str()]);
		cast.attribute.push(make_int_attribute("to", DataType::Float as i64));
		nodes.push(cast);

		let scales = ctx.fresh_name(format!("{integer_name}_scales_mul:0"));
		nodes.push(make_node("Mul", ONNX_DOMAIN, ctx.fresh_name(format!("{integer_name}_scales_mul")), [activation.scale, weight.scale], [
			scales.as_str()
		]));
		nodes.push(make_node(
			"Mul",
			ONNX_DOMAIN,
			ctx.fresh_name(format!("{integer_name}_output_scale_mul")),
			[cast_output, scales],
			[output.as_str()]
		));

		Ok(Rewrite::Replace(nodes))
	}
}

/// `Add(X, W)` with a constant `W` on either side keeps the `Add` and stores `W` as 8-bit integers, restored to float
/// by a `DequantizeLinear`.
struct DequantizedAdd;

impl QuantizeOperator for DequantizedAdd {
	fn quantize(&self, node: &NodeProto, ctx: &mut RewriteContext<'_>) -> Result<Rewrite> {
		check_arity(node, 2, 1)?;
		let (index, weight) = match ctx.float_weight(&node.input[1]) {
			Ok(weight) => (1, weight),
			Err(second) => match ctx.float_weight(&node.input[0]) {
				Ok(weight) => (0, weight),
				// report why the right-hand operand, the usual place for a bias, was rejected
				Err(_) => return Ok(Rewrite::Keep(second))
			}
		};

		let mut nodes = Vec::with_capacity(2);
		let dequantized = ctx.dequantized_weight(weight, &mut nodes)?;
		let mut add = node.clone();
		add.input[index] = dequantized;
		nodes.push(add);
		Ok(Rewrite::Replace(nodes))
	}
}

#[cfg(test)]
mod tests {
	use onnx_proto::{
		GraphProto, NodeProto, ONNX_DOMAIN,
		helper::{make_f32_tensor, make_graph, make_node, make_tensor_value_info},
		tensor_proto::DataType
	};

	use super::{Rewrite, operator_for};
	use crate::{
		error::ErrorCode,
		quantization::{
			QuantType, SkipReason,
			rewrite::{RewriteContext, WeightConfig}
		}
	};

	const CONFIG: WeightConfig = WeightConfig {
		quant_type: QuantType::QUInt8,
		per_channel: false,
		reduce_range: false,
		symmetric: false
	};

	fn graph() -> GraphProto {
		make_graph(
			"g",
			vec![],
			vec![make_tensor_value_info("x", DataType::Float, [Some("batch".into()), Some(2.into())])],
			vec![make_tensor_value_info("y", DataType::Float, [Some("batch".into()), Some(3.into())])],
			vec![make_f32_tensor("w", [2, 3], &[0.1, -0.2, 0.3, 0.4, -0.5, 0.6]), make_f32_tensor("b", [3], &[1.0, 2.0, 3.0])]
		)
	}

	fn rewrite(node: &NodeProto, graph: &GraphProto, config: WeightConfig) -> crate::Result<Rewrite> {
		let mut ctx = RewriteContext::new(graph, std::slice::from_ref(node), config);
		operator_for(&node.op_type).expect("quantizer").quantize(node, &mut ctx)
	}

	#[test]
	fn test_matmul_becomes_matmul_integer() -> crate::Result<()> {
		let graph = graph();
		let node = make_node("MatMul", ONNX_DOMAIN, "proj", ["x", "w"], ["y"]);
		let Rewrite::Replace(nodes) = rewrite(&node, &graph, CONFIG)? else {
			panic!("expected a rewrite");
		};

		let ops: Vec<_> = nodes.iter().map(|n| n.op_type.as_str()).collect();
		assert_eq!(ops, ["DynamicQuantizeLinear", "MatMulInteger", "Cast", "Mul", "Mul"]);
		assert_eq!(nodes[1].name, "proj_quant");
		assert_eq!(nodes[1].input, ["x_quantized", "w_quantized", "x_zero_point", "w_zero_point"]);
		assert_eq!(nodes[2].attribute[0].i, Some(DataType::Float as i64));
		assert_eq!(nodes[3].input, ["x_scale", "w_scale"]);
		assert_eq!(nodes[4].input, ["y_output_quantized_cast_output", "proj_quant_scales_mul:0"]);
		assert_eq!(nodes[4].output, ["y"]);
		Ok(())
	}

	#[test]
	fn test_matmul_with_activation_weight_is_kept() -> crate::Result<()> {
		let graph = graph();
		let node = make_node("MatMul", ONNX_DOMAIN, "", ["x", "x"], ["y"]);
		assert!(matches!(rewrite(&node, &graph, CONFIG)?, Rewrite::Keep(SkipReason::NoFloatWeight)));
		Ok(())
	}

	#[test]
	fn test_add_dequantizes_constant_operand() -> crate::Result<()> {
		let graph = graph();
		for (inputs, index) in [(["x", "b"], 1), (["b", "x"], 0)] {
			let node = make_node("Add", ONNX_DOMAIN, "bias", inputs, ["y"]);
			let Rewrite::Replace(nodes) = rewrite(&node, &graph, CONFIG)? else {
				panic!("expected a rewrite");
			};
			assert_eq!(nodes.len(), 2);
			assert_eq!(nodes[0].op_type, "DequantizeLinear");
			assert_eq!(nodes[0].input, ["b_quantized", "b_scale", "b_zero_point"]);
			assert_eq!(nodes[1].op_type, "Add");
			assert_eq!(nodes[1].input[index], "b_dequantized");
			assert_eq!(nodes[1].input[1 - index], "x");
		}
		Ok(())
	}

	#[test]
	fn test_bad_arity_is_an_error() {
		let graph = graph();
		let node = make_node("Add", ONNX_DOMAIN, "bias", ["x"], ["y"]);
		assert_eq!(rewrite(&node, &graph, CONFIG).map_err(|e| e.code()).err(), Some(ErrorCode::InvalidGraph));
	}
}
