use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays parseable. `POMOCAL_LOG` takes the
/// usual `RUST_LOG` directive syntax; default is `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env("POMOCAL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
