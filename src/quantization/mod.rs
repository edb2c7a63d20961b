//! Post-training dynamic quantization.
//!
//! Weights of the targeted operators are converted to 8-bit integers ahead of time; activations feeding `MatMul` are
//! quantized at inference time by `DynamicQuantizeLinear`. See [`DynamicQuantizer`] for the entry point.

use std::{fmt, str::FromStr};

use onnx_proto::tensor_proto::DataType;

use crate::error::{Error, ErrorCode};

mod builder;
mod operator;
mod report;
mod rewrite;
mod weight;

pub use self::{
	builder::DynamicQuantizer,
	operator::SUPPORTED_OP_TYPES,
	report::{QuantizationReport, SkipReason, SkippedNode},
	weight::{QuantizedWeight, quantize_weight}
};

/// The lowest default-domain opset that provides `DynamicQuantizeLinear`.
pub const MIN_OPSET: i64 = 11;

/// Integer type that quantized weights are stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuantType {
	/// Signed 8-bit integers.
	#[default]
	QInt8,
	/// Unsigned 8-bit integers.
	QUInt8
}

impl QuantType {
	/// The ONNX element type of tensors quantized to this type.
	#[must_use]
	pub fn data_type(&self) -> DataType {
		match self {
			QuantType::QInt8 => DataType::Int8,
			QuantType::QUInt8 => DataType::Uint8
		}
	}

	/// Whether weights of this type are quantized symmetrically unless configured otherwise.
	#[must_use]
	pub fn default_symmetric(&self) -> bool {
		matches!(self, QuantType::QInt8)
	}

	/// The inclusive range `(qmin, qmax)` quantized values are clamped to.
	///
	/// `reduce_range` restricts values to 7 bits, which avoids saturation in the 16-bit intermediate sums some CPUs use
	/// for 8-bit multiply-accumulate.
	#[must_use]
	pub fn range(&self, reduce_range: bool, symmetric: bool) -> (i32, i32) {
		match (self, reduce_range, symmetric) {
			(QuantType::QUInt8, false, _) => (0, 255),
			(QuantType::QUInt8, true, _) => (0, 127),
			(QuantType::QInt8, false, true) => (-127, 127),
			(QuantType::QInt8, false, false) => (-128, 127),
			(QuantType::QInt8, true, _) => (-64, 64)
		}
	}

	/// Packs a clamped quantized value into the byte stored in `raw_data`.
	#[inline]
	pub(crate) fn to_byte(self, q: i32) -> u8 {
		match self {
			QuantType::QUInt8 => q as u8,
			QuantType::QInt8 => (q as i8) as u8
		}
	}
}

impl fmt::Display for QuantType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			QuantType::QInt8 => "QInt8",
			QuantType::QUInt8 => "QUInt8"
		})
	}
}

impl FromStr for QuantType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"qint8" | "int8" | "i8" => Ok(QuantType::QInt8),
			"quint8" | "uint8" | "u8" => Ok(QuantType::QUInt8),
			_ => Err(Error::new_with_code(ErrorCode::GenericFailure, format!("unknown quantization type '{s}' (expected `qint8` or `quint8`)")))
		}
	}
}

/// Scale and zero point mapping a real range onto a quantized range: `x ≈ (q - zero_point) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizationParams {
	pub scale: f32,
	pub zero_point: i32
}

impl QuantizationParams {
	/// Computes parameters covering `[rmin, rmax]`, widened to include zero so that zero is exactly representable.
	#[must_use]
	pub fn from_range(rmin: f32, rmax: f32, qmin: i32, qmax: i32, symmetric: bool) -> Self {
		let (mut rmin, mut rmax) = (rmin.min(0.0), rmax.max(0.0));
		if symmetric {
			let absmax = rmin.abs().max(rmax.abs());
			rmin = -absmax;
			rmax = absmax;
		}

		let scale = (rmax - rmin) / (qmax - qmin) as f32;
		// also catches NaN
		if !(scale >= f32::MIN_POSITIVE) {
			return Self { scale: 1.0, zero_point: 0 };
		}

		let zero_point = if symmetric {
			((qmin + qmax) as f32 / 2.0).round_ties_even()
		} else {
			(qmin as f32 - rmin / scale).round_ties_even()
		};
		Self {
			scale,
			zero_point: (zero_point as i32).clamp(qmin, qmax)
		}
	}

	/// Quantizes one value, rounding half to even and clamping to `[qmin, qmax]`.
	#[inline]
	#[must_use]
	pub fn quantize(&self, x: f32, qmin: i32, qmax: i32) -> i32 {
		((x / self.scale).round_ties_even() as i32).saturating_add(self.zero_point).clamp(qmin, qmax)
	}

	/// Maps a quantized value back to the real domain.
	#[inline]
	#[must_use]
	pub fn dequantize(&self, q: i32) -> f32 {
		(q - self.zero_point) as f32 * self.scale
	}
}

#[cfg(test)]
mod tests {
	use super::{QuantType, QuantizationParams};

	#[test]
	fn test_ranges() {
		assert_eq!(QuantType::QUInt8.range(false, false), (0, 255));
		assert_eq!(QuantType::QUInt8.range(true, false), (0, 127));
		assert_eq!(QuantType::QInt8.range(false, false), (-128, 127));
		assert_eq!(QuantType::QInt8.range(false, true), (-127, 127));
		assert_eq!(QuantType::QInt8.range(true, true), (-64, 64));
	}

	#[test]
	fn test_asymmetric_uint8_params() {
		let (qmin, qmax) = QuantType::QUInt8.range(false, false);
		let params = QuantizationParams::from_range(-0.5, 1.5, qmin, qmax, false);
		assert!((params.scale - 2.0 / 255.0).abs() < 1e-7);
		assert_eq!(params.zero_point, 64);
		assert_eq!(params.quantize(-0.5, qmin, qmax), 0);
		assert_eq!(params.quantize(0.0, qmin, qmax), 64);
		assert_eq!(params.quantize(1.5, qmin, qmax), 255);
		assert_eq!(params.quantize(100.0, qmin, qmax), 255);
	}

	#[test]
	fn test_range_widens_to_include_zero() {
		let (qmin, qmax) = QuantType::QUInt8.range(false, false);
		let params = QuantizationParams::from_range(2.0, 4.0, qmin, qmax, false);
		assert_eq!(params.zero_point, 0);
		assert_eq!(params.quantize(0.0, qmin, qmax), 0);
		assert!((params.dequantize(params.quantize(4.0, qmin, qmax)) - 4.0).abs() < 1e-6);
	}

	#[test]
	fn test_symmetric_int8_params() {
		let (qmin, qmax) = QuantType::QInt8.range(false, true);
		let params = QuantizationParams::from_range(-1.0, 0.25, qmin, qmax, true);
		assert_eq!(params.zero_point, 0);
		assert_eq!(params.quantize(-1.0, qmin, qmax), -127);
		assert_eq!(params.quantize(1.0, qmin, qmax), 127);
		assert_eq!(QuantType::QInt8.to_byte(-127), 0x81);
	}

	#[test]
	fn test_reduce_range_uint8() {
		let (qmin, qmax) = QuantType::QUInt8.range(true, false);
		let params = QuantizationParams::from_range(-0.5, 1.5, qmin, qmax, false);
		assert_eq!(params.zero_point, 32);
		assert_eq!(params.quantize(-0.5, qmin, qmax), 0);
		assert_eq!(params.quantize(1.5, qmin, qmax), 127);
	}

	#[test]
	fn test_constant_zero_weights_use_unit_scale() {
		let (qmin, qmax) = QuantType::QUInt8.range(false, false);
		let params = QuantizationParams::from_range(0.0, 0.0, qmin, qmax, false);
		assert_eq!(params, QuantizationParams { scale: 1.0, zero_point: 0 });

		let (qmin, qmax) = QuantType::QInt8.range(false, false);
		assert_eq!(QuantizationParams::from_range(0.0, 0.0, qmin, qmax, false).zero_point, 0);
		let (qmin, qmax) = QuantType::QUInt8.range(false, true);
		assert_eq!(QuantizationParams::from_range(0.0, 0.0, qmin, qmax, true).zero_point, 0);
	}

	#[test]
	fn test_parse_quant_type() -> crate::Result<()> {
		assert_eq!("QUInt8".parse::<QuantType>()?, QuantType::QUInt8);
		assert_eq!("int8".parse::<QuantType>()?, QuantType::QInt8);
		assert!("fp8".parse::<QuantType>().is_err());
		Ok(())
	}
}
