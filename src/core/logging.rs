//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// rktiles::core::logging::init();
/// log::info!("Tiles renderer started");
/// ```
pub fn init() {
    // try_init: hosts embedding the renderer may have installed a logger already
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
