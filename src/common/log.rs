//! Logging utilities
//!
//! Thin wrapper over `env_logger` so library consumers and tests share one
//! initialization path.

/// Initialize the logging system
///
/// # Parameters
///
/// * `level` - default log level, overridable through `RUST_LOG`
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    env_logger::Builder::from_env(env)
        .is_test(cfg!(test))
        .try_init()
        .ok();
}
