/// A named attribute of a node or function.
///
/// Exactly one value field should be set, matching [`AttributeProto::r#type`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct AttributeProto {
	#[prost(string, tag = "1")]
	pub name: String,
	/// Refers to an attribute of the enclosing function, if non-empty.
	#[prost(string, tag = "21")]
	pub ref_attr_name: String,
	#[prost(string, tag = "13")]
	pub doc_string: String,
	#[prost(enumeration = "attribute_proto::AttributeType", tag = "20")]
	pub r#type: i32,
	#[prost(float, optional, tag = "2")]
	pub f: Option<f32>,
	#[prost(int64, optional, tag = "3")]
	pub i: Option<i64>,
	#[prost(bytes = "vec", optional, tag = "4")]
	pub s: Option<Vec<u8>>,
	#[prost(message, optional, tag = "5")]
	pub t: Option<TensorProto>,
	#[prost(message, optional, tag = "6")]
	pub g: Option<GraphProto>,
	#[prost(message, optional, tag = "22")]
	pub sparse_tensor: Option<SparseTensorProto>,
	#[prost(message, optional, tag = "14")]
	pub tp: Option<TypeProto>,
	#[prost(float, repeated, packed = "false", tag = "7")]
	pub floats: Vec<f32>,
	#[prost(int64, repeated, packed = "false", tag = "8")]
	pub ints: Vec<i64>,
	#[prost(bytes = "vec", repeated, tag = "9")]
	pub strings: Vec<Vec<u8>>,
	#[prost(message, repeated, tag = "10")]
	pub tensors: Vec<TensorProto>,
	#[prost(message, repeated, tag = "11")]
	pub graphs: Vec<GraphProto>,
	#[prost(message, repeated, tag = "23")]
	pub sparse_tensors: Vec<SparseTensorProto>,
	#[prost(message, repeated, tag = "15")]
	pub type_protos: Vec<TypeProto>
}

pub mod attribute_proto {
	#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
	#[repr(i32)]
	pub enum AttributeType {
		Undefined = 0,
		Float = 1,
		Int = 2,
		String = 3,
		Tensor = 4,
		Graph = 5,
		SparseTensor = 11,
		TypeProto = 13,
		Floats = 6,
		Ints = 7,
		Strings = 8,
		Tensors = 9,
		Graphs = 10,
		SparseTensors = 12,
		TypeProtos = 14
	}
}

/// Name and type of a graph input, output or intermediate value.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ValueInfoProto {
	#[prost(string, tag = "1")]
	pub name: String,
	#[prost(message, optional, tag = "2")]
	pub r#type: Option<TypeProto>,
	#[prost(string, tag = "3")]
	pub doc_string: String,
	#[prost(message, repeated, tag = "4")]
	pub metadata_props: Vec<StringStringEntryProto>
}

/// A single operator invocation in a graph.
#[derive(Clone, PartialEq, prost::Message)]
pub struct NodeProto {
	#[prost(string, repeated, tag = "1")]
	pub input: Vec<String>,
	#[prost(string, repeated, tag = "2")]
	pub output: Vec<String>,
	#[prost(string, tag = "3")]
	pub name: String,
	#[prost(string, tag = "4")]
	pub op_type: String,
	#[prost(string, tag = "7")]
	pub domain: String,
	#[prost(string, tag = "8")]
	pub overload: String,
	#[prost(message, repeated, tag = "5")]
	pub attribute: Vec<AttributeProto>,
	#[prost(string, tag = "6")]
	pub doc_string: String,
	#[prost(message, repeated, tag = "9")]
	pub metadata_props: Vec<StringStringEntryProto>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TrainingInfoProto {
	#[prost(message, optional, tag = "1")]
	pub initialization: Option<GraphProto>,
	#[prost(message, optional, tag = "2")]
	pub algorithm: Option<GraphProto>,
	#[prost(message, repeated, tag = "3")]
	pub initialization_binding: Vec<StringStringEntryProto>,
	#[prost(message, repeated, tag = "4")]
	pub update_binding: Vec<StringStringEntryProto>
}

/// The top-level container of an `.onnx` file.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ModelProto {
	#[prost(int64, tag = "1")]
	pub ir_version: i64,
	#[prost(message, repeated, tag = "8")]
	pub opset_import: Vec<OperatorSetIdProto>,
	#[prost(string, tag = "2")]
	pub producer_name: String,
	#[prost(string, tag = "3")]
	pub producer_version: String,
	#[prost(string, tag = "4")]
	pub domain: String,
	#[prost(int64, tag = "5")]
	pub model_version: i64,
	#[prost(string, tag = "6")]
	pub doc_string: String,
	#[prost(message, optional, tag = "7")]
	pub graph: Option<GraphProto>,
	#[prost(message, repeated, tag = "14")]
	pub metadata_props: Vec<StringStringEntryProto>,
	#[prost(message, repeated, tag = "20")]
	pub training_info: Vec<TrainingInfoProto>,
	#[prost(message, repeated, tag = "25")]
	pub functions: Vec<FunctionProto>
}

#[derive(Clone, PartialEq, Eq, Hash, prost::Message)]
pub struct StringStringEntryProto {
	#[prost(string, tag = "1")]
	pub key: String,
	#[prost(string, tag = "2")]
	pub value: String
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TensorAnnotation {
	#[prost(string, tag = "1")]
	pub tensor_name: String,
	#[prost(message, repeated, tag = "2")]
	pub quant_parameter_tensor_names: Vec<StringStringEntryProto>
}

/// A computation graph: nodes in topological order plus the graph's initializers and declared inputs/outputs.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GraphProto {
	#[prost(message, repeated, tag = "1")]
	pub node: Vec<NodeProto>,
	#[prost(string, tag = "2")]
	pub name: String,
	#[prost(message, repeated, tag = "5")]
	pub initializer: Vec<TensorProto>,
	#[prost(message, repeated, tag = "15")]
	pub sparse_initializer: Vec<SparseTensorProto>,
	#[prost(string, tag = "10")]
	pub doc_string: String,
	#[prost(message, repeated, tag = "11")]
	pub input: Vec<ValueInfoProto>,
	#[prost(message, repeated, tag = "12")]
	pub output: Vec<ValueInfoProto>,
	#[prost(message, repeated, tag = "13")]
	pub value_info: Vec<ValueInfoProto>,
	#[prost(message, repeated, tag = "14")]
	pub quantization_annotation: Vec<TensorAnnotation>,
	#[prost(message, repeated, tag = "16")]
	pub metadata_props: Vec<StringStringEntryProto>
}

/// A serialized tensor value.
///
/// Element data lives in exactly one of the typed `*_data` fields or in `raw_data` (little-endian), unless
/// `data_location` is [`tensor_proto::DataLocation::External`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct TensorProto {
	#[prost(int64, repeated, packed = "false", tag = "1")]
	pub dims: Vec<i64>,
	#[prost(int32, tag = "2")]
	pub data_type: i32,
	#[prost(message, optional, tag = "3")]
	pub segment: Option<tensor_proto::Segment>,
	#[prost(float, repeated, tag = "4")]
	pub float_data: Vec<f32>,
	#[prost(int32, repeated, tag = "5")]
	pub int32_data: Vec<i32>,
	#[prost(bytes = "vec", repeated, tag = "6")]
	pub string_data: Vec<Vec<u8>>,
	#[prost(int64, repeated, tag = "7")]
	pub int64_data: Vec<i64>,
	#[prost(string, tag = "8")]
	pub name: String,
	#[prost(string, tag = "12")]
	pub doc_string: String,
	#[prost(bytes = "vec", tag = "9")]
	pub raw_data: Vec<u8>,
	#[prost(message, repeated, tag = "13")]
	pub external_data: Vec<StringStringEntryProto>,
	#[prost(enumeration = "tensor_proto::DataLocation", tag = "14")]
	pub data_location: i32,
	#[prost(double, repeated, tag = "10")]
	pub double_data: Vec<f64>,
	#[prost(uint64, repeated, tag = "11")]
	pub uint64_data: Vec<u64>,
	#[prost(message, repeated, tag = "16")]
	pub metadata_props: Vec<StringStringEntryProto>
}

pub mod tensor_proto {
	#[derive(Clone, Copy, PartialEq, Eq, Hash, prost::Message)]
	pub struct Segment {
		#[prost(int64, tag = "1")]
		pub begin: i64,
		#[prost(int64, tag = "2")]
		pub end: i64
	}

	#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
	#[repr(i32)]
	pub enum DataType {
		Undefined = 0,
		Float = 1,
		Uint8 = 2,
		Int8 = 3,
		Uint16 = 4,
		Int16 = 5,
		Int32 = 6,
		Int64 = 7,
		String = 8,
		Bool = 9,
		Float16 = 10,
		Double = 11,
		Uint32 = 12,
		Uint64 = 13,
		Complex64 = 14,
		Complex128 = 15,
		Bfloat16 = 16,
		Float8e4m3fn = 17,
		Float8e4m3fnuz = 18,
		Float8e5m2 = 19,
		Float8e5m2fnuz = 20,
		Uint4 = 21,
		Int4 = 22,
		Float4e2m1 = 23
	}

	#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
	#[repr(i32)]
	pub enum DataLocation {
		Default = 0,
		External = 1
	}
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SparseTensorProto {
	#[prost(message, optional, tag = "1")]
	pub values: Option<TensorProto>,
	#[prost(message, optional, tag = "2")]
	pub indices: Option<TensorProto>,
	#[prost(int64, repeated, packed = "false", tag = "3")]
	pub dims: Vec<i64>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TensorShapeProto {
	#[prost(message, repeated, tag = "1")]
	pub dim: Vec<tensor_shape_proto::Dimension>
}

pub mod tensor_shape_proto {
	#[derive(Clone, PartialEq, Eq, Hash, prost::Message)]
	pub struct Dimension {
		#[prost(string, tag = "3")]
		pub denotation: String,
		#[prost(oneof = "dimension::Value", tags = "1, 2")]
		pub value: Option<dimension::Value>
	}

	pub mod dimension {
		/// Either a fixed size or a symbolic name. An unset value is an unknown dimension.
		#[derive(Clone, PartialEq, Eq, Hash, prost::Oneof)]
		pub enum Value {
			#[prost(int64, tag = "1")]
			DimValue(i64),
			#[prost(string, tag = "2")]
			DimParam(String)
		}

		impl From<i64> for Value {
			fn from(value: i64) -> Self {
				Value::DimValue(value)
			}
		}

		impl From<&str> for Value {
			fn from(value: &str) -> Self {
				Value::DimParam(value.to_owned())
			}
		}

		impl From<String> for Value {
			fn from(value: String) -> Self {
				Value::DimParam(value)
			}
		}
	}
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TypeProto {
	#[prost(string, tag = "6")]
	pub denotation: String,
	#[prost(oneof = "type_proto::Value", tags = "1, 4, 5, 9, 8, 7")]
	pub value: Option<type_proto::Value>
}

pub mod type_proto {
	#[derive(Clone, PartialEq, prost::Message)]
	pub struct Tensor {
		#[prost(int32, tag = "1")]
		pub elem_type: i32,
		#[prost(message, optional, tag = "2")]
		pub shape: Option<super::TensorShapeProto>
	}

	#[derive(Clone, PartialEq, prost::Message)]
	pub struct Sequence {
		#[prost(message, optional, boxed, tag = "1")]
		pub elem_type: Option<Box<super::TypeProto>>
	}

	#[derive(Clone, PartialEq, prost::Message)]
	pub struct Map {
		#[prost(int32, tag = "1")]
		pub key_type: i32,
		#[prost(message, optional, boxed, tag = "2")]
		pub value_type: Option<Box<super::TypeProto>>
	}

	#[derive(Clone, PartialEq, prost::Message)]
	pub struct Optional {
		#[prost(message, optional, boxed, tag = "1")]
		pub elem_type: Option<Box<super::TypeProto>>
	}

	#[derive(Clone, PartialEq, prost::Message)]
	pub struct SparseTensor {
		#[prost(int32, tag = "1")]
		pub elem_type: i32,
		#[prost(message, optional, tag = "2")]
		pub shape: Option<super::TensorShapeProto>
	}

	#[derive(Clone, PartialEq, prost::Message)]
	pub struct Opaque {
		#[prost(string, tag = "1")]
		pub domain: String,
		#[prost(string, tag = "2")]
		pub name: String
	}

	#[derive(Clone, PartialEq, prost::Oneof)]
	pub enum Value {
		#[prost(message, tag = "1")]
		TensorType(Tensor),
		#[prost(message, tag = "4")]
		SequenceType(Sequence),
		#[prost(message, tag = "5")]
		MapType(Map),
		#[prost(message, tag = "9")]
		OptionalType(Optional),
		#[prost(message, tag = "8")]
		SparseTensorType(SparseTensor),
		#[prost(message, tag = "7")]
		OpaqueType(Opaque)
	}
}

#[derive(Clone, PartialEq, Eq, Hash, prost::Message)]
pub struct OperatorSetIdProto {
	#[prost(string, tag = "1")]
	pub domain: String,
	#[prost(int64, tag = "2")]
	pub version: i64
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum OperatorStatus {
	Experimental = 0,
	Stable = 1
}

/// A model-local function, callable from nodes by `(domain, name, overload)`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct FunctionProto {
	#[prost(string, tag = "1")]
	pub name: String,
	#[prost(string, repeated, tag = "4")]
	pub input: Vec<String>,
	#[prost(string, repeated, tag = "5")]
	pub output: Vec<String>,
	#[prost(string, repeated, tag = "6")]
	pub attribute: Vec<String>,
	#[prost(message, repeated, tag = "11")]
	pub attribute_proto: Vec<AttributeProto>,
	#[prost(message, repeated, tag = "7")]
	pub node: Vec<NodeProto>,
	#[prost(string, tag = "8")]
	pub doc_string: String,
	#[prost(message, repeated, tag = "9")]
	pub opset_import: Vec<OperatorSetIdProto>,
	#[prost(string, tag = "10")]
	pub domain: String,
	#[prost(string, tag = "13")]
	pub overload: String,
	#[prost(message, repeated, tag = "12")]
	pub value_info: Vec<ValueInfoProto>,
	#[prost(message, repeated, tag = "14")]
	pub metadata_props: Vec<StringStringEntryProto>
}
