use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init(default_level: &str) -> anyhow::Result<()> {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(default_level))?;

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.try_init()
		.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}
