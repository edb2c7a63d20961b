use std::{io, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser};
use ort_quantize::{
	driver::{self, DEFAULT_MODEL_PATH, DEFAULT_QUANTIZED_MODEL_PATH, QuantizeOutcome},
	quantization::QuantType
};

mod common;

/// Applies dynamic INT8 quantization to the `MatMul` and `Add` nodes of an ONNX model.
#[derive(Parser)]
#[command(name = "quantize", version)]
struct Args {
	/// The float model to quantize.
	#[arg(default_value = DEFAULT_MODEL_PATH)]
	input: PathBuf,
	/// Where to write the quantized model.
	#[arg(default_value = DEFAULT_QUANTIZED_MODEL_PATH)]
	output: PathBuf,

	/// Integer type of quantized weights (`quint8` or `qint8`).
	#[arg(long, default_value = "quint8")]
	weight_type: QuantType,
	/// Operator types to quantize.
	#[arg(long, value_delimiter = ',', default_values = ["MatMul", "Add"])]
	op_types: Vec<String>,
	/// Quantize 2-D `MatMul` weights with one scale per output column.
	#[arg(long)]
	per_channel: bool,
	/// Quantize weights to 7 bits.
	#[arg(long)]
	reduce_range: bool,
	/// Names of nodes to leave in floating point.
	#[arg(long, value_name = "NODE", num_args = 1..)]
	exclude: Vec<String>,
	/// Skip loading the quantized model with ONNX Runtime after writing it.
	#[arg(long)]
	no_verify: bool,

	/// Increase log verbosity; may be repeated.
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8
}

fn main() -> ort_quantize::Result<ExitCode> {
	let args = Args::parse();
	common::init_logging(args.verbose);

	let quantizer = driver::default_quantizer()
		.with_weight_type(args.weight_type)
		.with_op_types(args.op_types)
		.with_per_channel(args.per_channel)
		.with_reduce_range(args.reduce_range)
		.with_nodes_to_exclude(args.exclude);

	let outcome = driver::quantize_existing_model(&args.input, &args.output, &quantizer, &mut io::stdout().lock())?;
	if outcome == QuantizeOutcome::MissingInput {
		return Ok(ExitCode::FAILURE);
	}

	if !args.no_verify {
		#[cfg(feature = "runtime")]
		ort_quantize::inspect::verify_loadable(&args.output)?;
	}
	Ok(ExitCode::SUCCESS)
}
