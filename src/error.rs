use std::{error::Error as StdError, fmt, io};

/// Type alias for the `Result` type returned by `ort-quantize` functions.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
	GenericFailure,
	/// A file that was expected to exist does not.
	NoSuchFile,
	/// Any other I/O failure while reading or writing a model.
	Io,
	/// The bytes of a model are not a valid ONNX protobuf.
	InvalidProtobuf,
	/// The model decoded, but its graph is malformed (missing graph, inconsistent tensor sizes, ...).
	InvalidGraph,
	/// The model uses a construct this crate cannot process.
	NotImplemented,
	/// ONNX Runtime rejected the model or failed while inspecting it.
	Runtime
}

struct ErrorInternal {
	code: ErrorCode,
	message: String,
	cause: Option<Box<dyn StdError + Send + Sync + 'static>>
}

/// An error returned by any `ort-quantize` API.
pub struct Error {
	inner: Box<ErrorInternal>
}

impl Error {
	/// Creates a custom [`Error`] with the given message.
	pub fn new(msg: impl Into<String>) -> Self {
		Self::new_internal(ErrorCode::GenericFailure, msg, None)
	}

	/// Creates a custom [`Error`] with the given [`ErrorCode`] and message.
	pub fn new_with_code(code: ErrorCode, msg: impl Into<String>) -> Self {
		Self::new_internal(code, msg, None)
	}

	pub(crate) fn wrap_with_code<T: StdError + Send + Sync + 'static>(code: ErrorCode, err: T) -> Self {
		Self::new_internal(code, err.to_string(), Some(Box::new(err)))
	}

	fn new_internal(code: ErrorCode, message: impl Into<String>, cause: Option<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
		Self {
			inner: Box::new(ErrorInternal {
				code,
				message: message.into(),
				cause
			})
		}
	}

	pub fn code(&self) -> ErrorCode {
		self.inner.code
	}

	pub fn message(&self) -> &str {
		self.inner.message.as_str()
	}
}

impl fmt::Debug for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Error")
			.field("code", &self.inner.code)
			.field("message", &self.message())
			.finish()
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.inner.message)
	}
}

impl StdError for Error {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.inner.cause.as_ref().map(|x| &**x as &dyn StdError)
	}
}

impl From<io::Error> for Error {
	fn from(err: io::Error) -> Self {
		let code = if err.kind() == io::ErrorKind::NotFound { ErrorCode::NoSuchFile } else { ErrorCode::Io };
		Error::wrap_with_code(code, err)
	}
}

impl From<prost::DecodeError> for Error {
	fn from(err: prost::DecodeError) -> Self {
		Error::new_internal(ErrorCode::InvalidProtobuf, format!("failed to decode ONNX model: {err}"), Some(Box::new(err)))
	}
}

#[cfg(feature = "runtime")]
impl From<ort::Error> for Error {
	fn from(err: ort::Error) -> Self {
		Error::wrap_with_code(ErrorCode::Runtime, err)
	}
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for Error {
	fn from(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
		Error::new_internal(ErrorCode::GenericFailure, err.to_string(), Some(err))
	}
}
