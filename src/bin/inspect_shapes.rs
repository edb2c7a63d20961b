use std::{io, path::PathBuf};

use clap::{ArgAction, Parser};
use ort_quantize::{driver::DEFAULT_MODEL_PATH, inspect::ModelInfo};

mod common;

/// Prints the name and declared shape of every input of an ONNX model.
#[derive(Parser)]
#[command(name = "inspect-shapes", version)]
struct Args {
	#[arg(default_value = DEFAULT_MODEL_PATH)]
	model: PathBuf,
	/// Read the model with the protobuf decoder instead of ONNX Runtime.
	#[arg(long)]
	offline: bool,
	/// Increase log verbosity; may be repeated.
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8
}

fn main() -> ort_quantize::Result<()> {
	let args = Args::parse();
	common::init_logging(args.verbose);

	let info = if args.offline { ModelInfo::load_offline(&args.model)? } else { ModelInfo::load(&args.model)? };
	info.write_shapes(&mut io::stdout().lock())
}
