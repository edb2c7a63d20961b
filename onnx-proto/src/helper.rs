//! Constructors for common messages, modeled on the `onnx.helper` module of the reference ONNX tooling.

use crate::{
	AttributeProto, GraphProto, IR_VERSION, ModelProto, NodeProto, OperatorSetIdProto, TensorProto, TensorShapeProto, TypeProto, ValueInfoProto,
	attribute_proto::AttributeType,
	tensor_proto::DataType,
	tensor_shape_proto::{Dimension, dimension},
	type_proto
};

/// Creates a node in the given operator domain.
pub fn make_node<I, O>(op_type: &str, domain: &str, name: impl Into<String>, inputs: I, outputs: O) -> NodeProto
where
	I: IntoIterator,
	I::Item: Into<String>,
	O: IntoIterator,
	O::Item: Into<String>
{
	NodeProto {
		input: inputs.into_iter().map(Into::into).collect(),
		output: outputs.into_iter().map(Into::into).collect(),
		name: name.into(),
		op_type: op_type.to_owned(),
		domain: domain.to_owned(),
		..NodeProto::default()
	}
}

pub fn make_int_attribute(name: &str, value: i64) -> AttributeProto {
	AttributeProto {
		name: name.to_owned(),
		r#type: AttributeType::Int as i32,
		i: Some(value),
		..AttributeProto::default()
	}
}

pub fn make_float_attribute(name: &str, value: f32) -> AttributeProto {
	AttributeProto {
		name: name.to_owned(),
		r#type: AttributeType::Float as i32,
		f: Some(value),
		..AttributeProto::default()
	}
}

pub fn make_ints_attribute(name: &str, values: impl IntoIterator<Item = i64>) -> AttributeProto {
	AttributeProto {
		name: name.to_owned(),
		r#type: AttributeType::Ints as i32,
		ints: values.into_iter().collect(),
		..AttributeProto::default()
	}
}

pub fn make_graph_attribute(name: &str, graph: GraphProto) -> AttributeProto {
	AttributeProto {
		name: name.to_owned(),
		r#type: AttributeType::Graph as i32,
		g: Some(graph),
		..AttributeProto::default()
	}
}

/// Creates a tensor whose elements are stored little-endian in `raw_data`.
pub fn make_raw_tensor(name: impl Into<String>, data_type: DataType, dims: impl IntoIterator<Item = i64>, raw_data: Vec<u8>) -> TensorProto {
	TensorProto {
		name: name.into(),
		data_type: data_type as i32,
		dims: dims.into_iter().collect(),
		raw_data,
		..TensorProto::default()
	}
}

/// Creates a `FLOAT` tensor stored in `raw_data`.
pub fn make_f32_tensor(name: impl Into<String>, dims: impl IntoIterator<Item = i64>, values: &[f32]) -> TensorProto {
	let raw = values.iter().flat_map(|v| v.to_le_bytes()).collect();
	make_raw_tensor(name, DataType::Float, dims, raw)
}

/// Creates a `UINT8` tensor stored in `raw_data`.
pub fn make_u8_tensor(name: impl Into<String>, dims: impl IntoIterator<Item = i64>, values: &[u8]) -> TensorProto {
	make_raw_tensor(name, DataType::Uint8, dims, values.to_vec())
}

/// Creates an `INT8` tensor stored in `raw_data`.
pub fn make_i8_tensor(name: impl Into<String>, dims: impl IntoIterator<Item = i64>, values: &[i8]) -> TensorProto {
	let raw = values.iter().map(|v| v.to_le_bytes()[0]).collect();
	make_raw_tensor(name, DataType::Int8, dims, raw)
}

/// Creates an `INT64` tensor stored in the typed `int64_data` field.
pub fn make_i64_tensor(name: impl Into<String>, dims: impl IntoIterator<Item = i64>, values: &[i64]) -> TensorProto {
	TensorProto {
		name: name.into(),
		data_type: DataType::Int64 as i32,
		dims: dims.into_iter().collect(),
		int64_data: values.to_vec(),
		..TensorProto::default()
	}
}

/// Creates a tensor type with a known rank. Each dimension is a fixed size, a symbolic name, or `None` for an unknown
/// dimension.
pub fn make_tensor_type(elem_type: DataType, shape: impl IntoIterator<Item = Option<dimension::Value>>) -> TypeProto {
	TypeProto {
		denotation: String::new(),
		value: Some(type_proto::Value::TensorType(type_proto::Tensor {
			elem_type: elem_type as i32,
			shape: Some(TensorShapeProto {
				dim: shape
					.into_iter()
					.map(|value| Dimension {
						denotation: String::new(),
						value
					})
					.collect()
			})
		}))
	}
}

/// Creates the value info of a tensor with a known rank; see [`make_tensor_type`].
pub fn make_tensor_value_info(name: impl Into<String>, elem_type: DataType, shape: impl IntoIterator<Item = Option<dimension::Value>>) -> ValueInfoProto {
	ValueInfoProto {
		name: name.into(),
		r#type: Some(make_tensor_type(elem_type, shape)),
		..ValueInfoProto::default()
	}
}

pub fn make_graph(
	name: impl Into<String>,
	nodes: Vec<NodeProto>,
	inputs: Vec<ValueInfoProto>,
	outputs: Vec<ValueInfoProto>,
	initializers: Vec<TensorProto>
) -> GraphProto {
	GraphProto {
		node: nodes,
		name: name.into(),
		initializer: initializers,
		input: inputs,
		output: outputs,
		..GraphProto::default()
	}
}

pub fn make_opset(domain: &str, version: i64) -> OperatorSetIdProto {
	OperatorSetIdProto { domain: domain.to_owned(), version }
}

/// Wraps a graph in a model importing the given operator sets, at the current [`IR_VERSION`].
pub fn make_model(graph: GraphProto, opsets: impl IntoIterator<Item = OperatorSetIdProto>) -> ModelProto {
	ModelProto {
		ir_version: IR_VERSION,
		opset_import: opsets.into_iter().collect(),
		graph: Some(graph),
		..ModelProto::default()
	}
}

#[cfg(test)]
mod tests {
	use prost::Message;

	use super::*;
	use crate::ONNX_DOMAIN;

	#[test]
	fn test_model_roundtrip_keeps_symbolic_dims() {
		let graph = make_graph(
			"g",
			vec![make_node("Relu", ONNX_DOMAIN, "relu", ["x"], ["y"])],
			vec![make_tensor_value_info("x", DataType::Float, [Some("batch".into()), Some(3.into()), None])],
			vec![make_tensor_value_info("y", DataType::Float, [Some("batch".into()), Some(3.into()), None])],
			vec![]
		);
		let model = make_model(graph, [make_opset(ONNX_DOMAIN, 13)]);

		let bytes = model.encode_to_vec();
		let decoded = ModelProto::decode(bytes.as_slice()).expect("decode");
		assert_eq!(decoded, model);

		let Some(type_proto::Value::TensorType(tensor)) = decoded.graph.as_ref().and_then(|g| g.input[0].r#type.as_ref()).and_then(|t| t.value.clone()) else {
			panic!("expected a tensor type");
		};
		let dims: Vec<_> = tensor.shape.expect("shape").dim.into_iter().map(|d| d.value).collect();
		assert_eq!(dims, vec![Some(dimension::Value::DimParam("batch".to_string())), Some(dimension::Value::DimValue(3)), None]);
	}

	#[test]
	fn test_zero_int_attribute_survives_encoding() {
		let attr = make_int_attribute("axis", 0);
		let decoded = AttributeProto::decode(attr.encode_to_vec().as_slice()).expect("decode");
		assert_eq!(decoded.i, Some(0));
		assert_eq!(decoded.r#type(), AttributeType::Int);
	}

	#[test]
	fn test_i8_tensor_is_twos_complement() {
		let tensor = make_i8_tensor("w", [3], &[-1, 0, 127]);
		assert_eq!(tensor.raw_data, vec![0xff, 0x00, 0x7f]);
		assert_eq!(tensor.data_type, DataType::Int8 as i32);
	}
}
