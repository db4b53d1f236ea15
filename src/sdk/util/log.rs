use env_logger::{Builder, Env};

/// Sets up `env_logger`. `RUST_LOG` wins when set; otherwise the crate logs
/// at `info`, or at `debug` for decode and classification details when
/// `verbose` is on.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "info,directions_core=debug"
    } else {
        "info"
    };
    Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
