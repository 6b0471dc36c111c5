//! tracing-subscriber setup; diagnostics are written to stderr.

use tracing_subscriber::EnvFilter;

pub fn init(debug: bool) {
    let default_level = if debug {
        "rautoclock=debug"
    } else {
        "rautoclock=info"
    };

    // RUST_LOG wins when it is set and valid
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
