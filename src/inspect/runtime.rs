use std::path::Path;

use ort::{
	session::Session,
	tensor::TensorElementType,
	value::ValueType
};

use super::ModelInfo;
use crate::{
	error::Result,
	tensor::{Dimension, ElementType, Shape, TensorDescriptor}
};

impl ModelInfo {
	/// Reads the inputs and outputs of an existing ONNX Runtime session.
	pub fn from_session(session: &Session) -> Self {
		Self {
			inputs: session.inputs.iter().map(|input| descriptor(&input.name, &input.input_type)).collect(),
			outputs: session.outputs.iter().map(|output| descriptor(&output.name, &output.output_type)).collect()
		}
	}
}

fn descriptor(name: &str, value_type: &ValueType) -> TensorDescriptor {
	match value_type {
		ValueType::Tensor { ty, shape, dimension_symbols } => {
			let dims = shape.iter().enumerate().map(|(i, &size)| {
				if size >= 0 {
					Dimension::Fixed(size)
				} else {
					match dimension_symbols.get(i) {
						Some(symbol) if !symbol.is_empty() => Dimension::Symbolic(symbol.to_string()),
						_ => Dimension::Unknown
					}
				}
			});
			TensorDescriptor::new(name, element_type(*ty), Some(Shape::new(dims)))
		}
		other => {
			crate::debug!(name, value_type = %other, "Input or output is not a tensor");
			TensorDescriptor::new(name, None, None)
		}
	}
}

fn element_type(ty: TensorElementType) -> Option<ElementType> {
	ElementType::from_onnx(ort::sys::ONNXTensorElementDataType::from(ty) as i32)
}

/// Builds an ONNX Runtime session from the model at `path`, failing if ONNX Runtime cannot load it.
pub fn verify_loadable(path: impl AsRef<Path>) -> Result<ModelInfo> {
	let path = path.as_ref();
	let session = Session::builder()?.commit_from_file(path)?;
	crate::info!(path = %path.display(), inputs = session.inputs.len(), outputs = session.outputs.len(), "ONNX Runtime loaded the model");
	Ok(ModelInfo::from_session(&session))
}
