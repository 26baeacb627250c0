use std::sync::Once;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter, Registry,
};

static INIT: Once = Once::new();

/// Installs a global subscriber filtered by `RUST_LOG` (default `info`) plus
/// the `color-eyre` report handler. Safe to call from every test.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let output_layer = tracing_subscriber::fmt::layer()
            .with_line_number(true)
            .with_file(true)
            .with_test_writer();

        let _ = Registry::default()
            .with(filter)
            .with(output_layer)
            .with(ErrorLayer::default())
            .try_init();
        let _ = color_eyre::install();
    });
}
