//! Owned, decoded ONNX models.

use std::{collections::HashSet, fs, path::Path};

use onnx_proto::{GraphProto, Message, ModelProto, OperatorSetIdProto, is_onnx_domain};

use crate::{
	error::{Error, ErrorCode, Result},
	tensor::TensorDescriptor
};

/// An ONNX model decoded from its protobuf representation.
///
/// ```no_run
/// # use ort_quantize::model::Model;
/// # fn main() -> ort_quantize::Result<()> {
/// let model = Model::from_file("test_assets/groundingdino.onnx")?;
/// for input in model.inputs()? {
/// 	println!("{}", input.name);
/// }
/// # 	Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
	proto: ModelProto
}

impl Model {
	/// Reads and decodes the model at `path`.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let bytes = fs::read(path)?;
		crate::debug!(path = %path.display(), len = bytes.len(), "Read model file");
		Self::from_bytes(&bytes)
	}

	/// Decodes a model from serialized protobuf bytes.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let proto = ModelProto::decode(bytes)?;
		Ok(Self { proto })
	}

	/// Serializes the model to protobuf bytes.
	#[must_use]
	pub fn to_bytes(&self) -> Vec<u8> {
		self.proto.encode_to_vec()
	}

	/// Serializes the model and writes it to `path`, replacing any existing file.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		let bytes = self.to_bytes();
		fs::write(path, &bytes)?;
		crate::debug!(path = %path.display(), len = bytes.len(), "Wrote model file");
		Ok(())
	}

	pub fn proto(&self) -> &ModelProto {
		&self.proto
	}

	pub fn proto_mut(&mut self) -> &mut ModelProto {
		&mut self.proto
	}

	pub fn into_proto(self) -> ModelProto {
		self.proto
	}

	/// Returns the model's main graph.
	pub fn graph(&self) -> Result<&GraphProto> {
		self.proto.graph.as_ref().ok_or_else(missing_graph)
	}

	pub fn graph_mut(&mut self) -> Result<&mut GraphProto> {
		self.proto.graph.as_mut().ok_or_else(missing_graph)
	}

	/// Returns the imported version of the operator set `domain`. The default ONNX domain may be given as either `""`
	/// or `"ai.onnx"`.
	#[must_use]
	pub fn opset_version(&self, domain: &str) -> Option<i64> {
		self.find_opset(domain).map(|opset| opset.version)
	}

	/// Sets the imported version of the operator set `domain`, adding an import if there is none.
	pub fn set_opset_version(&mut self, domain: &str, version: i64) {
		match self.proto.opset_import.iter_mut().find(|opset| same_domain(&opset.domain, domain)) {
			Some(opset) => opset.version = version,
			None => self.proto.opset_import.push(OperatorSetIdProto { domain: domain.to_owned(), version })
		}
	}

	fn find_opset(&self, domain: &str) -> Option<&OperatorSetIdProto> {
		self.proto.opset_import.iter().find(|opset| same_domain(&opset.domain, domain))
	}

	/// Returns descriptors of the graph's inputs, in declaration order.
	///
	/// Models from before IR version 4 list initializers among the graph inputs; those are not inputs a caller has to
	/// feed and are skipped.
	pub fn inputs(&self) -> Result<Vec<TensorDescriptor>> {
		let graph = self.graph()?;
		let initializers: HashSet<&str> = graph.initializer.iter().map(|t| t.name.as_str()).collect();
		Ok(graph
			.input
			.iter()
			.filter(|input| !initializers.contains(input.name.as_str()))
			.map(TensorDescriptor::from)
			.collect())
	}

	/// Returns descriptors of the graph's outputs, in declaration order.
	pub fn outputs(&self) -> Result<Vec<TensorDescriptor>> {
		Ok(self.graph()?.output.iter().map(TensorDescriptor::from).collect())
	}
}

impl From<ModelProto> for Model {
	fn from(proto: ModelProto) -> Self {
		Self { proto }
	}
}

fn same_domain(a: &str, b: &str) -> bool {
	a == b || (is_onnx_domain(a) && is_onnx_domain(b))
}

fn missing_graph() -> Error {
	Error::new_with_code(ErrorCode::InvalidGraph, "model does not contain a graph")
}
