/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default `info` level, same convention the engine's own `tracing`
/// call sites assume.
pub fn init(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
