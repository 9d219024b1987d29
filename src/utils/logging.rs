// Logger setup for binaries; the library itself only emits through `log`

use env_logger::Builder;

/// Install `env_logger` filtered by `level`
///
/// `level` takes the same directives as `RUST_LOG`, e.g. `info` or
/// `vouchrs_u2f=debug`.
///
/// # Errors
///
/// Returns an error if a global logger is already installed.
pub fn init_logging(level: &str) -> Result<(), log::SetLoggerError> {
    Builder::new().parse_filters(level).try_init()
}
