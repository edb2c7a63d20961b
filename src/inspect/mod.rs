//! Listing the declared inputs and outputs of a model.

use std::{io::Write, path::Path};

use crate::{error::Result, model::Model, tensor::TensorDescriptor};

#[cfg(feature = "runtime")]
mod runtime;

#[cfg(feature = "runtime")]
pub use self::runtime::verify_loadable;

/// The declared inputs and outputs of a model, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
	pub inputs: Vec<TensorDescriptor>,
	pub outputs: Vec<TensorDescriptor>
}

impl ModelInfo {
	pub fn from_model(model: &Model) -> Result<Self> {
		Ok(Self {
			inputs: model.inputs()?,
			outputs: model.outputs()?
		})
	}

	/// Loads the model at `path` through ONNX Runtime and reads its inputs and outputs from the session.
	///
	/// Errors raised by ONNX Runtime while loading are returned as-is, with [`ErrorCode::Runtime`].
	///
	/// [`ErrorCode::Runtime`]: crate::ErrorCode::Runtime
	#[cfg(feature = "runtime")]
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let session = ort::session::Session::builder()?.commit_from_file(path.as_ref())?;
		Ok(Self::from_session(&session))
	}

	/// Without the `runtime` feature, models are read with the protobuf decoder; see [`ModelInfo::load_offline`].
	#[cfg(not(feature = "runtime"))]
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		Self::load_offline(path)
	}

	/// Reads the inputs and outputs straight from the model's protobuf, without ONNX Runtime.
	pub fn load_offline(path: impl AsRef<Path>) -> Result<Self> {
		Self::from_model(&Model::from_file(path)?)
	}

	/// Writes the input names and output names, one bracketed list per line:
	///
	/// ```text
	/// Inputs: [img, input_ids]
	/// Outputs: [logits, boxes]
	/// ```
	pub fn write_names(&self, out: &mut impl Write) -> Result<()> {
		writeln!(out, "Inputs: [{}]", join_names(&self.inputs))?;
		writeln!(out, "Outputs: [{}]", join_names(&self.outputs))?;
		Ok(())
	}

	/// Writes one line per input pairing its name with its declared shape:
	///
	/// ```text
	/// Name: img, Shape: [batch, 3, 800, 1200]
	/// ```
	///
	/// Inputs without a known rank are printed with an empty shape.
	pub fn write_shapes(&self, out: &mut impl Write) -> Result<()> {
		for input in &self.inputs {
			match &input.shape {
				Some(shape) => writeln!(out, "Name: {}, Shape: {shape}", input.name)?,
				None => writeln!(out, "Name: {}, Shape: []", input.name)?
			}
		}
		Ok(())
	}
}

fn join_names(descriptors: &[TensorDescriptor]) -> String {
	descriptors.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", ")
}
