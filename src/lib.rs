pub mod api;
pub mod core;
pub mod frame_extractor;

#[cfg(test)]
mod test_support;

/// Route `log` output to stderr, `RUST_LOG` overriding the `info` default.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
