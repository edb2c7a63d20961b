use glassbench::{Bench, pretend_used};
use ort_quantize::{
	Model,
	proto::{
		ONNX_DOMAIN,
		helper::{make_f32_tensor, make_graph, make_model, make_node, make_opset, make_tensor_value_info},
		tensor_proto::DataType
	},
	quantization::{DynamicQuantizer, QuantType, quantize_weight}
};

const HIDDEN: usize = 768;
const LAYERS: usize = 4;

fn weights(len: usize, seed: usize) -> Vec<f32> {
	(0..len).map(|i| (((i * 31 + seed * 17) % 1009) as f32 / 1009.0 - 0.5) * 0.2).collect()
}

/// A stack of `MatMul` + `Add` layers shaped like the projections of a transformer encoder.
fn encoder_model() -> Model {
	let mut nodes = Vec::new();
	let mut initializers = Vec::new();
	let mut activation = "x".to_string();
	for layer in 0..LAYERS {
		let (w, b, h, y) = (format!("w{layer}"), format!("b{layer}"), format!("h{layer}"), format!("y{layer}"));
		nodes.push(make_node("MatMul", ONNX_DOMAIN, format!("matmul{layer}"), [activation.as_str(), w.as_str()], [h.as_str()]));
		nodes.push(make_node("Add", ONNX_DOMAIN, format!("add{layer}"), [h.as_str(), b.as_str()], [y.as_str()]));
		initializers.push(make_f32_tensor(w, [HIDDEN as i64, HIDDEN as i64], &weights(HIDDEN * HIDDEN, layer)));
		initializers.push(make_f32_tensor(b, [HIDDEN as i64], &weights(HIDDEN, layer + LAYERS)));
		activation = y;
	}
	let graph = make_graph(
		"encoder",
		nodes,
		vec![make_tensor_value_info("x", DataType::Float, [Some("batch".into()), Some((HIDDEN as i64).into())])],
		vec![make_tensor_value_info(activation, DataType::Float, [Some("batch".into()), Some((HIDDEN as i64).into())])],
		initializers
	);
	Model::from(make_model(graph, [make_opset(ONNX_DOMAIN, 13)]))
}

fn bench_quantize(bench: &mut Bench) {
	let data = weights(HIDDEN * HIDDEN, 0);
	let dims = [HIDDEN as i64, HIDDEN as i64];
	bench.task("Weight, per tensor", |task| {
		task.iter(|| {
			pretend_used(quantize_weight(&data, &dims, QuantType::QUInt8, false, false, None).unwrap());
		})
	});
	bench.task("Weight, per channel", |task| {
		task.iter(|| {
			pretend_used(quantize_weight(&data, &dims, QuantType::QInt8, false, true, Some(1)).unwrap());
		})
	});

	let model = encoder_model();
	let quantizer = DynamicQuantizer::new().with_weight_type(QuantType::QUInt8);
	bench.task("Graph rewrite", |task| {
		task.iter(|| {
			let mut model = model.clone();
			pretend_used(quantizer.quantize(&mut model).unwrap());
		})
	});
}

glassbench::glassbench!("Dynamic quantization", bench_quantize,);
