use ort_quantize::logging::LogLevel;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `tracing` subscriber writing to stderr. `RUST_LOG` takes precedence over `-v` flags.
pub fn init_logging(verbose: u8) {
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| LogLevel::from_verbosity(verbose).as_directive().into()))
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}
