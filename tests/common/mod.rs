#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ort_quantize::proto::{
	Message, ModelProto, ONNX_DOMAIN,
	helper::{make_f32_tensor, make_graph, make_model, make_node, make_opset, make_tensor_value_info},
	tensor_proto::DataType
};

pub const WEIGHT: [f32; 12] = [0.5, -0.25, 1.0, -0.75, 0.1, 0.3, 0.2, 0.9, -0.6, -0.4, 0.05, 0.7];
pub const BIAS: [f32; 3] = [0.1, -0.2, 0.3];
pub const MULTIPLIER: [f32; 3] = [1.5, -0.5, 2.0];

/// Sample activations for a batch of 2.
pub const X: [f32; 8] = [0.3, -1.2, 0.8, 0.5, -0.7, 0.25, 1.1, -0.4];
pub const GAIN: f32 = 2.0;

/// A small float model exercising every case the quantizer distinguishes:
///
/// ```text
/// x[batch, 4] -> MatMul(W) -> Add(B) -> Mul(M) -> Mul(gain) -> y[batch, 3]
///                                   \-> Relu -> features[batch, 3]
/// ```
///
/// `W` and `B` are quantized; `M` feeds a `Mul` and must come out untouched. `gain` is a second graph input.
pub fn fixture_model() -> ModelProto {
	let graph = make_graph(
		"fixture",
		vec![
			make_node("MatMul", ONNX_DOMAIN, "matmul0", ["x", "W"], ["h"]),
			make_node("Add", ONNX_DOMAIN, "add0", ["h", "B"], ["logits"]),
			make_node("Mul", ONNX_DOMAIN, "mul0", ["logits", "M"], ["scaled"]),
			make_node("Mul", ONNX_DOMAIN, "mul1", ["scaled", "gain"], ["y"]),
			make_node("Relu", ONNX_DOMAIN, "relu0", ["logits"], ["features"]),
		],
		vec![
			make_tensor_value_info("x", DataType::Float, [Some("batch".into()), Some(4.into())]),
			make_tensor_value_info("gain", DataType::Float, [Some(1.into())]),
		],
		vec![
			make_tensor_value_info("y", DataType::Float, [Some("batch".into()), Some(3.into())]),
			make_tensor_value_info("features", DataType::Float, [Some("batch".into()), Some(3.into())]),
		],
		vec![make_f32_tensor("W", [4, 3], &WEIGHT), make_f32_tensor("B", [3], &BIAS), make_f32_tensor("M", [3], &MULTIPLIER)]
	);
	make_model(graph, [make_opset(ONNX_DOMAIN, 13)])
}

/// Writes [`fixture_model`] to `dir/fixture.onnx`.
pub fn write_fixture(dir: &Path) -> std::io::Result<PathBuf> {
	let path = dir.join("fixture.onnx");
	std::fs::write(&path, fixture_model().encode_to_vec())?;
	Ok(path)
}
