//! Protobuf message definitions for the [ONNX](https://onnx.ai/) model format.
//!
//! Messages mirror `onnx.proto` at IR version 10. Every field of the upstream schema is declared so that models
//! decoded and re-encoded by this crate keep data they do not otherwise touch.
//!
//! The upstream schema uses proto2. Repeated scalar fields that proto2 does not pack are declared with
//! `packed = "false"`, and attribute values are optional so an explicit zero survives re-encoding.

#![allow(clippy::doc_markdown, clippy::large_enum_variant)]

pub mod helper;
mod onnx;

pub use prost::{self, Message};

pub use self::onnx::*;

/// The IR version written by [`helper::make_model`].
pub const IR_VERSION: i64 = 10;

/// The name of the default ONNX operator domain. `ai.onnx` is an accepted alias.
pub const ONNX_DOMAIN: &str = "";
/// The alias of [`ONNX_DOMAIN`].
pub const ONNX_DOMAIN_ALIAS: &str = "ai.onnx";

/// Returns `true` if `domain` names the default ONNX operator set.
#[inline]
#[must_use]
pub fn is_onnx_domain(domain: &str) -> bool {
	domain == ONNX_DOMAIN || domain == ONNX_DOMAIN_ALIAS
}
