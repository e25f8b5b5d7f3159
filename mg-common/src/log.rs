// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use slog::{Drain, Logger};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Bunyan formatted logger writing to `filename`.
pub fn init_file_logger<P: AsRef<Path>>(
    filename: P,
) -> std::io::Result<Logger> {
    Ok(build_logger(File::create(filename)?))
}

/// Human readable logger on stderr for interactive tools, filtered through
/// `RUST_LOG`. Stdout is left alone for command output.
pub fn init_term_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_envlogger::new(drain).fuse();
    let drain = slog_async::Async::new(drain)
        .chan_size(0x2000)
        .build()
        .fuse();
    slog::Logger::root(drain, slog::o!())
}

pub fn build_logger<W: Write + Send + 'static>(w: W) -> Logger {
    let drain = slog_bunyan::new(w).build().fuse();
    let drain = slog_async::Async::new(drain)
        .chan_size(0x8000)
        .build()
        .fuse();
    slog::Logger::root(drain, slog::o!())
}

/// A logger that drops everything, for tests and library defaults.
pub fn discard_logger() -> Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_file_logger() {
        let dir = std::env::temp_dir().join(format!(
            "mg-common-log-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.log");
        let log = init_file_logger(&path).unwrap();
        slog::info!(log, "hello"; "unit" => "test");
        drop(log);
        assert!(path.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        assert!(init_file_logger("/nonexistent/dir/test.log").is_err());
    }
}
