use std::io::Write;

/// Install the process logger.
///
/// Lines look like `2024-01-01 12:00:00 - INFO - message`. `RUST_LOG` still
/// applies on top of `level`. Calling this more than once is harmless.
pub fn init_logging(level: log::LevelFilter) {
    let result = env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .parse_default_env()
        .try_init();
    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}
