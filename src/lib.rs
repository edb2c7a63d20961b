#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::tabs_in_doc_comments)]
#![warn(clippy::unwrap_used)]

//! `ort-quantize` applies post-training dynamic INT8 quantization to [ONNX](https://onnx.ai/) models and inspects
//! their declared inputs and outputs, using [ONNX Runtime](https://onnxruntime.ai/) through `ort` to load them.
//!
//! ```no_run
//! use ort_quantize::{driver, inspect::ModelInfo};
//!
//! # fn main() -> ort_quantize::Result<()> {
//! let quantizer = driver::default_quantizer();
//! driver::quantize_existing_model(driver::DEFAULT_MODEL_PATH, driver::DEFAULT_QUANTIZED_MODEL_PATH, &quantizer, &mut std::io::stdout())?;
//!
//! let info = ModelInfo::load(driver::DEFAULT_QUANTIZED_MODEL_PATH)?;
//! info.write_shapes(&mut std::io::stdout())?;
//! # 	Ok(())
//! # }
//! ```

pub mod audit;
pub mod driver;
pub mod error;
pub mod inspect;
pub mod logging;
pub mod model;
pub mod quantization;
pub mod tensor;

pub use onnx_proto as proto;

pub(crate) use self::logging::{debug, info, trace, warning as warn};
pub use self::{
	error::{Error, ErrorCode, Result},
	model::Model
};
