use std::path::Path;

use crate::shared::error::{AppError, AppResult};

/// Install the global logger: stderr plus an append-only log file when the
/// file can be opened.
pub fn init(log_path: &Path, level: log::LevelFilter) -> AppResult<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match fern::log_file(log_path) {
        Ok(file) => dispatch = dispatch.chain(file),
        Err(e) => eprintln!("Warning: could not open log file {}: {}", log_path.display(), e),
    }

    dispatch
        .apply()
        .map_err(|e| AppError::Unknown(format!("Logger already initialised: {}", e)))
}
