/// Verbosity of the command-line tools.
///
/// Each `-v` flag raises the level by one step from [`LogLevel::Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
	Verbose,
	Debug,
	Info,
	Warning
}

impl LogLevel {
	/// Returns the level selected by `count` repetitions of `-v`.
	#[must_use]
	pub fn from_verbosity(count: u8) -> Self {
		match count {
			0 => LogLevel::Warning,
			1 => LogLevel::Info,
			2 => LogLevel::Debug,
			_ => LogLevel::Verbose
		}
	}

	/// The `tracing` filter directive for this level, e.g. `"info"`.
	#[must_use]
	pub fn as_directive(&self) -> &'static str {
		match self {
			LogLevel::Verbose => "trace",
			LogLevel::Debug => "debug",
			LogLevel::Info => "info",
			LogLevel::Warning => "warn"
		}
	}
}

macro_rules! trace {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		tracing::trace!($($arg)+);
	}}
}
macro_rules! debug {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		tracing::debug!($($arg)+);
	}}
}
macro_rules! info {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		tracing::info!($($arg)+);
	}}
}
macro_rules! warning {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		tracing::warn!($($arg)+);
	}}
}
pub(crate) use debug;
pub(crate) use info;
pub(crate) use trace;
pub(crate) use warning;

#[cfg(test)]
mod tests {
	use super::LogLevel;

	#[test]
	fn test_verbosity_steps() {
		assert_eq!(LogLevel::from_verbosity(0), LogLevel::Warning);
		assert_eq!(LogLevel::from_verbosity(1).as_directive(), "info");
		assert_eq!(LogLevel::from_verbosity(9), LogLevel::Verbose);
		assert!(LogLevel::Verbose < LogLevel::Warning);
	}
}
