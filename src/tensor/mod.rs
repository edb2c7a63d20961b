//! Tensor metadata: element types, shapes, and the descriptors of graph inputs/outputs.

use std::fmt;

use onnx_proto::{
	ValueInfoProto,
	tensor_proto::DataType,
	tensor_shape_proto::{self, dimension},
	type_proto
};
use smallvec::SmallVec;

mod data;

pub use self::data::{element_count, float_data};

/// Enum mapping the ONNX tensor element data types.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ElementType {
	/// 32-bit floating point number, equivalent to Rust's `f32`.
	Float32,
	/// Unsigned 8-bit integer, equivalent to Rust's `u8`.
	Uint8,
	/// Signed 8-bit integer, equivalent to Rust's `i8`.
	Int8,
	/// Unsigned 16-bit integer, equivalent to Rust's `u16`.
	Uint16,
	/// Signed 16-bit integer, equivalent to Rust's `i16`.
	Int16,
	/// Signed 32-bit integer, equivalent to Rust's `i32`.
	Int32,
	/// Signed 64-bit integer, equivalent to Rust's `i64`.
	Int64,
	/// String, equivalent to Rust's `String`.
	String,
	/// Boolean, equivalent to Rust's `bool`.
	Bool,
	/// 16-bit floating point number.
	Float16,
	/// 64-bit floating point number, equivalent to Rust's `f64`. Also known as `double`.
	Float64,
	/// Unsigned 32-bit integer, equivalent to Rust's `u32`.
	Uint32,
	/// Unsigned 64-bit integer, equivalent to Rust's `u64`.
	Uint64,
	Complex64,
	Complex128,
	/// Brain 16-bit floating point number.
	Bfloat16,
	Float8E4M3FN,
	Float8E4M3FNUZ,
	Float8E5M2,
	Float8E5M2FNUZ,
	Uint4,
	Int4,
	Float4E2M1
}

impl ElementType {
	/// Maps a raw `TensorProto.DataType` value, returning `None` for `UNDEFINED` and unknown values.
	#[must_use]
	pub fn from_onnx(data_type: i32) -> Option<Self> {
		DataType::try_from(data_type).ok().and_then(|ty| Self::try_from(ty).ok())
	}
}

impl From<ElementType> for DataType {
	fn from(val: ElementType) -> Self {
		match val {
			ElementType::Float32 => DataType::Float,
			ElementType::Uint8 => DataType::Uint8,
			ElementType::Int8 => DataType::Int8,
			ElementType::Uint16 => DataType::Uint16,
			ElementType::Int16 => DataType::Int16,
			ElementType::Int32 => DataType::Int32,
			ElementType::Int64 => DataType::Int64,
			ElementType::String => DataType::String,
			ElementType::Bool => DataType::Bool,
			ElementType::Float16 => DataType::Float16,
			ElementType::Float64 => DataType::Double,
			ElementType::Uint32 => DataType::Uint32,
			ElementType::Uint64 => DataType::Uint64,
			ElementType::Complex64 => DataType::Complex64,
			ElementType::Complex128 => DataType::Complex128,
			ElementType::Bfloat16 => DataType::Bfloat16,
			ElementType::Float8E4M3FN => DataType::Float8e4m3fn,
			ElementType::Float8E4M3FNUZ => DataType::Float8e4m3fnuz,
			ElementType::Float8E5M2 => DataType::Float8e5m2,
			ElementType::Float8E5M2FNUZ => DataType::Float8e5m2fnuz,
			ElementType::Uint4 => DataType::Uint4,
			ElementType::Int4 => DataType::Int4,
			ElementType::Float4E2M1 => DataType::Float4e2m1
		}
	}
}

impl TryFrom<DataType> for ElementType {
	type Error = DataType;

	fn try_from(val: DataType) -> Result<Self, Self::Error> {
		Ok(match val {
			DataType::Float => ElementType::Float32,
			DataType::Uint8 => ElementType::Uint8,
			DataType::Int8 => ElementType::Int8,
			DataType::Uint16 => ElementType::Uint16,
			DataType::Int16 => ElementType::Int16,
			DataType::Int32 => ElementType::Int32,
			DataType::Int64 => ElementType::Int64,
			DataType::String => ElementType::String,
			DataType::Bool => ElementType::Bool,
			DataType::Float16 => ElementType::Float16,
			DataType::Double => ElementType::Float64,
			DataType::Uint32 => ElementType::Uint32,
			DataType::Uint64 => ElementType::Uint64,
			DataType::Complex64 => ElementType::Complex64,
			DataType::Complex128 => ElementType::Complex128,
			DataType::Bfloat16 => ElementType::Bfloat16,
			DataType::Float8e4m3fn => ElementType::Float8E4M3FN,
			DataType::Float8e4m3fnuz => ElementType::Float8E4M3FNUZ,
			DataType::Float8e5m2 => ElementType::Float8E5M2,
			DataType::Float8e5m2fnuz => ElementType::Float8E5M2FNUZ,
			DataType::Uint4 => ElementType::Uint4,
			DataType::Int4 => ElementType::Int4,
			DataType::Float4e2m1 => ElementType::Float4E2M1,
			DataType::Undefined => return Err(val)
		})
	}
}

impl fmt::Display for ElementType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ElementType::Float32 => "f32",
			ElementType::Uint8 => "u8",
			ElementType::Int8 => "i8",
			ElementType::Uint16 => "u16",
			ElementType::Int16 => "i16",
			ElementType::Int32 => "i32",
			ElementType::Int64 => "i64",
			ElementType::String => "String",
			ElementType::Bool => "bool",
			ElementType::Float16 => "f16",
			ElementType::Float64 => "f64",
			ElementType::Uint32 => "u32",
			ElementType::Uint64 => "u64",
			ElementType::Complex64 => "c64",
			ElementType::Complex128 => "c128",
			ElementType::Bfloat16 => "bf16",
			ElementType::Float8E4M3FN => "f8e4m3fn",
			ElementType::Float8E4M3FNUZ => "f8e4m3fnuz",
			ElementType::Float8E5M2 => "f8e5m2",
			ElementType::Float8E5M2FNUZ => "f8e5m2fnuz",
			ElementType::Uint4 => "u4",
			ElementType::Int4 => "i4",
			ElementType::Float4E2M1 => "f4e2m1"
		})
	}
}

/// One entry of a declared tensor shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dimension {
	/// A size fixed when the model was authored.
	Fixed(i64),
	/// A dynamic dimension with a name, e.g. `batch_size`. Dimensions sharing a name must agree at inference time.
	Symbolic(String),
	/// A dynamic dimension without a name.
	Unknown
}

impl From<&tensor_shape_proto::Dimension> for Dimension {
	fn from(dim: &tensor_shape_proto::Dimension) -> Self {
		match &dim.value {
			Some(dimension::Value::DimValue(value)) => Dimension::Fixed(*value),
			Some(dimension::Value::DimParam(param)) if !param.is_empty() => Dimension::Symbolic(param.clone()),
			_ => Dimension::Unknown
		}
	}
}

impl fmt::Display for Dimension {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Dimension::Fixed(size) => write!(f, "{size}"),
			Dimension::Symbolic(name) => f.write_str(name),
			Dimension::Unknown => f.write_str("dyn")
		}
	}
}

/// The declared shape of a tensor, in axis order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape {
	dims: SmallVec<Dimension, 4>
}

impl Shape {
	pub fn new(dims: impl IntoIterator<Item = Dimension>) -> Self {
		Self { dims: dims.into_iter().collect() }
	}

	#[inline]
	#[must_use]
	pub fn rank(&self) -> usize {
		self.dims.len()
	}

	/// Returns the concrete sizes of this shape, or `None` if any dimension is dynamic.
	#[must_use]
	pub fn fixed_sizes(&self) -> Option<Vec<i64>> {
		self.dims
			.iter()
			.map(|d| match d {
				Dimension::Fixed(size) => Some(*size),
				_ => None
			})
			.collect()
	}
}

impl core::ops::Deref for Shape {
	type Target = [Dimension];

	fn deref(&self) -> &Self::Target {
		&self.dims
	}
}

impl FromIterator<Dimension> for Shape {
	fn from_iter<T: IntoIterator<Item = Dimension>>(iter: T) -> Self {
		Self::new(iter)
	}
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[")?;
		for (i, dim) in self.dims.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{dim}")?;
		}
		f.write_str("]")
	}
}

/// Metadata describing a named input or output of a model's graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorDescriptor {
	/// Name of the input/output.
	pub name: String,
	/// Element type, if the value is a tensor with a known element type.
	pub element_type: Option<ElementType>,
	/// Declared shape, if the value is a tensor with a known rank.
	pub shape: Option<Shape>
}

impl TensorDescriptor {
	pub fn new(name: impl Into<String>, element_type: Option<ElementType>, shape: Option<Shape>) -> Self {
		Self {
			name: name.into(),
			element_type,
			shape
		}
	}
}

impl From<&ValueInfoProto> for TensorDescriptor {
	fn from(info: &ValueInfoProto) -> Self {
		let tensor = match info.r#type.as_ref().and_then(|t| t.value.as_ref()) {
			Some(type_proto::Value::TensorType(tensor)) => Some((tensor.elem_type, tensor.shape.as_ref())),
			Some(type_proto::Value::SparseTensorType(tensor)) => Some((tensor.elem_type, tensor.shape.as_ref())),
			_ => None
		};
		match tensor {
			Some((elem_type, shape)) => TensorDescriptor {
				name: info.name.clone(),
				element_type: ElementType::from_onnx(elem_type),
				shape: shape.map(|s| s.dim.iter().map(Dimension::from).collect())
			},
			None => TensorDescriptor::new(info.name.clone(), None, None)
		}
	}
}
