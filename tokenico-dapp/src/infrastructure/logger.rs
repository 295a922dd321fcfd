use std::sync::Once;

use env_logger::Env;

static INIT: Once = Once::new();

/// Install the process-wide logger. `RUST_LOG` wins over `level`; later calls are no-ops.
pub fn init_logger(level: &str) {
    INIT.call_once(|| {
        let result = env_logger::Builder::from_env(Env::default().default_filter_or(level))
            .format_timestamp_millis()
            .try_init();
        if result.is_err() {
            // a host application already installed its own logger
            log::debug!("logger already initialized");
        }
    });
}
