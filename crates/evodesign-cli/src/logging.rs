use crate::error::{CliError, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    EnvFilter,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Crate whose events the verbosity flags control. Everything else stays at `warn`.
const DESIGN_TARGET: &str = "evodesign";

fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn default_directives(level: LevelFilter) -> String {
    let floor = level.min(LevelFilter::WARN);
    format!("{floor},{DESIGN_TARGET}={level}").to_lowercase()
}

/// Appends to an existing log so consecutive runs share one file.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(CliError::Io)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(CliError::Io)
}

/// Installs the global subscriber. A set `RUST_LOG` replaces the verbosity-derived directives.
///
/// The optional file layer also records when each design cycle span closes, with its duration.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let directives = default_directives(level_for(verbosity, quiet));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry().with(filter).with(stderr_layer);

    match log_file {
        Some(path) => {
            let file_layer = fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE);
            subscriber.with(file_layer).init();
        }
        None => subscriber.init(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tracing::{info, info_span};

    #[test]
    fn verbosity_raises_only_the_design_crate() {
        assert_eq!(default_directives(level_for(0, false)), "warn,evodesign=warn");
        assert_eq!(default_directives(level_for(2, false)), "warn,evodesign=debug");
        assert_eq!(default_directives(level_for(9, false)), "warn,evodesign=trace");
        assert_eq!(default_directives(level_for(2, true)), "error,evodesign=error");
    }

    #[test]
    fn log_file_is_appended_under_new_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("design.log");

        writeln!(open_log_file(&path).unwrap(), "first run").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second run").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "first run\nsecond run\n"
        );
    }

    #[test]
    #[serial]
    fn file_layer_records_cycle_span_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("design.log");

        let file_layer = fmt::layer()
            .with_writer(open_log_file(&path).unwrap())
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE);
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            let _cycle = info_span!("design_cycle", cycle = 4).entered();
            info!(constraint = "A1-6/0 B1-2/2/B6-6", "Encoded mutability mask.");
        });

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("design_cycle{cycle=4}"));
        assert!(content.contains("Encoded mutability mask."));
        assert!(content.contains("close"));
    }

    #[test]
    #[serial]
    fn unusable_log_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = setup_logging(0, false, Some(dir.path().to_path_buf()));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
