//! The quantization workflow run by the `quantize` binary.

use std::{io::Write, path::Path};

use crate::{
	audit::{WeightDigests, verify_untouched},
	error::Result,
	model::Model,
	quantization::{DynamicQuantizer, QuantType, QuantizationReport}
};

/// The float model read when no input path is given.
pub const DEFAULT_MODEL_PATH: &str = "test_assets/groundingdino.onnx";
/// Where the quantized model is written when no output path is given.
pub const DEFAULT_QUANTIZED_MODEL_PATH: &str = "test_assets/groundingdino_int8.onnx";

/// How [`quantize_existing_model`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantizeOutcome {
	/// The quantized model was written.
	Quantized(QuantizationReport),
	/// The input model does not exist; nothing was written.
	MissingInput
}

/// The quantizer used by default: `MatMul` and `Add` with [`QuantType::QUInt8`] weights.
pub fn default_quantizer() -> DynamicQuantizer {
	DynamicQuantizer::new().with_op_types(["MatMul", "Add"]).with_weight_type(QuantType::QUInt8)
}

/// Quantizes the model at `input` with `quantizer` and writes the result to `output`, reporting progress on `out`.
///
/// A missing input is reported on `out` and returns [`QuantizeOutcome::MissingInput`] rather than an error. Every
/// initializer that was not quantized is checked to be unchanged before the output is written.
pub fn quantize_existing_model(input: impl AsRef<Path>, output: impl AsRef<Path>, quantizer: &DynamicQuantizer, out: &mut impl Write) -> Result<QuantizeOutcome> {
	let (input, output) = (input.as_ref(), output.as_ref());
	if !input.exists() {
		writeln!(out, "Error: Could not find baseline model at {}", input.display())?;
		return Ok(QuantizeOutcome::MissingInput);
	}

	writeln!(out, "Applying ONNX Dynamic INT8 Quantization to {}...", input.display())?;
	let mut model = Model::from_file(input)?;
	let before = WeightDigests::of_model(&model)?;
	let report = quantizer.quantize(&mut model)?;
	let audit = verify_untouched(&before, &WeightDigests::of_model(&model)?, &report.quantized_weights)?;
	crate::debug!(verified = audit.verified, quantized = report.quantized_weights.len(), "Weight audit passed");

	model.save(output)?;
	writeln!(out, "Quantized INT8 model successfully saved to {}", output.display())?;
	Ok(QuantizeOutcome::Quantized(report))
}
