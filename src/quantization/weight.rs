use ndarray::{ArrayViewD, Axis, IxDyn};
use onnx_proto::{
	TensorProto,
	helper::{make_f32_tensor, make_raw_tensor}
};

use super::{QuantType, QuantizationParams};
use crate::error::{Error, ErrorCode, Result};

/// A float tensor converted to 8-bit integers, with the parameters needed to dequantize it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedWeight {
	pub quant_type: QuantType,
	pub dims: Vec<i64>,
	/// Quantized elements in row-major order, one byte each (two's complement for [`QuantType::QInt8`]).
	pub data: Vec<u8>,
	/// One entry per channel along `axis`, or a single entry for per-tensor quantization.
	pub params: Vec<QuantizationParams>,
	/// The channel axis, or `None` for per-tensor quantization.
	pub axis: Option<usize>
}

impl QuantizedWeight {
	/// The quantized tensor, named `name`.
	pub fn data_tensor(&self, name: impl Into<String>) -> TensorProto {
		make_raw_tensor(name, self.quant_type.data_type(), self.dims.iter().copied(), self.data.clone())
	}

	/// The `FLOAT` scale tensor: a scalar for per-tensor quantization, otherwise 1-D with one entry per channel.
	pub fn scale_tensor(&self, name: impl Into<String>) -> TensorProto {
		let scales: Vec<f32> = self.params.iter().map(|p| p.scale).collect();
		make_f32_tensor(name, self.param_dims(), &scales)
	}

	/// The zero-point tensor, with the same element type as the quantized data and the same shape as the scale.
	pub fn zero_point_tensor(&self, name: impl Into<String>) -> TensorProto {
		let zero_points = self.params.iter().map(|p| self.quant_type.to_byte(p.zero_point)).collect();
		make_raw_tensor(name, self.quant_type.data_type(), self.param_dims(), zero_points)
	}

	fn param_dims(&self) -> Vec<i64> {
		match self.axis {
			Some(_) => vec![self.params.len() as i64],
			None => vec![]
		}
	}
}

/// Quantizes a float tensor of shape `dims`.
///
/// With `axis`, every slice along that axis gets its own scale and zero point; otherwise one pair covers the whole
/// tensor.
pub fn quantize_weight(
	values: &[f32],
	dims: &[i64],
	quant_type: QuantType,
	reduce_range: bool,
	symmetric: bool,
	axis: Option<usize>
) -> Result<QuantizedWeight> {
	let (qmin, qmax) = quant_type.range(reduce_range, symmetric);
	let shape = dims
		.iter()
		.map(|&d| usize::try_from(d))
		.collect::<Result<Vec<usize>, _>>()
		.map_err(|_| Error::new_with_code(ErrorCode::InvalidGraph, format!("invalid weight dimensions {dims:?}")))?;
	let view = ArrayViewD::from_shape(IxDyn(&shape), values).map_err(|e| Error::wrap_with_code(ErrorCode::InvalidGraph, e))?;

	let (data, params) = match axis {
		None => {
			let (rmin, rmax) = min_max(view.iter());
			let params = QuantizationParams::from_range(rmin, rmax, qmin, qmax, symmetric);
			let data = view.iter().map(|&x| quant_type.to_byte(params.quantize(x, qmin, qmax))).collect();
			(data, vec![params])
		}
		Some(axis) => {
			if axis >= view.ndim() {
				return Err(Error::new_with_code(ErrorCode::InvalidGraph, format!("channel axis {axis} out of range for weight of rank {}", view.ndim())));
			}
			let params: Vec<QuantizationParams> = view
				.axis_iter(Axis(axis))
				.map(|channel| {
					let (rmin, rmax) = min_max(channel.iter());
					QuantizationParams::from_range(rmin, rmax, qmin, qmax, symmetric)
				})
				.collect();
			let data = view
				.indexed_iter()
				.map(|(index, &x)| quant_type.to_byte(params[index[axis]].quantize(x, qmin, qmax)))
				.collect();
			(data, params)
		}
	};

	Ok(QuantizedWeight {
		quant_type,
		dims: dims.to_vec(),
		data,
		params,
		axis
	})
}

fn min_max<'a>(values: impl Iterator<Item = &'a f32>) -> (f32, f32) {
	values.fold((0.0f32, 0.0f32), |(lo, hi), &x| (lo.min(x), hi.max(x)))
}

#[cfg(test)]
mod tests {
	use super::quantize_weight;
	use crate::{
		quantization::QuantType,
		tensor::float_data
	};

	#[test]
	fn test_per_tensor_uint8() -> crate::Result<()> {
		let weight = quantize_weight(&[-0.5, 0.0, 1.5, 0.75], &[2, 2], QuantType::QUInt8, false, false, None)?;
		assert_eq!(weight.params.len(), 1);
		assert_eq!(weight.params[0].zero_point, 64);
		assert_eq!(weight.data[..3], [0, 64, 255]);

		let scale = weight.scale_tensor("w_scale");
		assert!(scale.dims.is_empty());
		assert_eq!(float_data(&scale)?.len(), 1);
		assert_eq!(weight.zero_point_tensor("w_zero_point").raw_data, vec![64]);
		assert_eq!(weight.data_tensor("w_quantized").dims, vec![2, 2]);
		Ok(())
	}

	#[test]
	fn test_per_channel_uses_column_ranges() -> crate::Result<()> {
		// [[1, -2], [3, 4]], channels along axis 1 are [1, 3] and [-2, 4]
		let weight = quantize_weight(&[1.0, -2.0, 3.0, 4.0], &[2, 2], QuantType::QUInt8, false, false, Some(1))?;
		assert_eq!(weight.params.len(), 2);
		assert_eq!(weight.params[0].zero_point, 0);
		assert_eq!(weight.params[1].zero_point, 85);
		assert_eq!(weight.data, vec![85, 0, 255, 255]);

		let scale = weight.scale_tensor("w_scale");
		assert_eq!(scale.dims, vec![2]);
		assert_eq!(weight.zero_point_tensor("w_zero_point").raw_data, vec![0, 85]);
		Ok(())
	}

	#[test]
	fn test_symmetric_int8_bytes() -> crate::Result<()> {
		let weight = quantize_weight(&[-1.0, 0.0, 1.0], &[3], QuantType::QInt8, false, true, None)?;
		assert_eq!(weight.params[0].zero_point, 0);
		assert_eq!(weight.data, vec![0x81, 0x00, 0x7f]);
		Ok(())
	}

	#[test]
	fn test_shape_mismatch_is_an_error() {
		assert!(quantize_weight(&[1.0, 2.0, 3.0], &[2, 2], QuantType::QUInt8, false, false, None).is_err());
		assert!(quantize_weight(&[1.0, 2.0], &[2], QuantType::QUInt8, false, false, Some(1)).is_err());
	}
}
