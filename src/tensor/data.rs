use std::borrow::Cow;

use onnx_proto::{
	TensorProto,
	tensor_proto::{DataLocation, DataType}
};

use super::ElementType;
use crate::error::{Error, ErrorCode, Result};

/// Returns the number of elements described by `dims`. An empty `dims` describes a scalar.
pub fn element_count(dims: &[i64]) -> Result<usize> {
	dims.iter().try_fold(1usize, |acc, &d| {
		usize::try_from(d)
			.ok()
			.and_then(|d| acc.checked_mul(d))
			.ok_or_else(|| Error::new_with_code(ErrorCode::InvalidGraph, format!("invalid tensor dimensions {dims:?}")))
	})
}

/// Reads the elements of a `FLOAT` tensor, from either `float_data` or little-endian `raw_data`.
///
/// Fails for tensors of any other type, tensors stored externally, and tensors whose data does not match their
/// dimensions.
pub fn float_data(tensor: &TensorProto) -> Result<Cow<'_, [f32]>> {
	if tensor.data_type != DataType::Float as i32 {
		let ty = ElementType::from_onnx(tensor.data_type).map_or_else(|| tensor.data_type.to_string(), |t| t.to_string());
		return Err(Error::new_with_code(ErrorCode::NotImplemented, format!("tensor '{}' has element type {ty}, expected f32", tensor.name)));
	}
	if tensor.data_location == DataLocation::External as i32 {
		return Err(Error::new_with_code(ErrorCode::NotImplemented, format!("tensor '{}' stores its data externally", tensor.name)));
	}

	let expected = element_count(&tensor.dims)?;
	let data = if !tensor.raw_data.is_empty() {
		let width = core::mem::size_of::<f32>();
		let expected_bytes = expected
			.checked_mul(width)
			.ok_or_else(|| Error::new_with_code(ErrorCode::InvalidGraph, format!("tensor '{}' is too large ({:?})", tensor.name, tensor.dims)))?;
		if tensor.raw_data.len() != expected_bytes {
			return Err(Error::new_with_code(
				ErrorCode::InvalidGraph,
				format!("tensor '{}' has {} bytes of raw data, expected {expected_bytes}", tensor.name, tensor.raw_data.len())
			));
		}
		Cow::Owned(
			tensor
				.raw_data
				.chunks_exact(width)
				.map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
				.collect()
		)
	} else {
		if tensor.float_data.len() != expected {
			return Err(Error::new_with_code(
				ErrorCode::InvalidGraph,
				format!("tensor '{}' has {} elements, expected {expected}", tensor.name, tensor.float_data.len())
			));
		}
		Cow::Borrowed(tensor.float_data.as_slice())
	};
	Ok(data)
}
