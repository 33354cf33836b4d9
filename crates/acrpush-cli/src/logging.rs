use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;

use acrpush_core::LogLevel;
use anyhow::Context;
use tracing_subscriber::EnvFilter;

pub enum Target {
    Stderr,
    /// Appended to; the terminal belongs to the wizard.
    File(PathBuf),
}

pub fn interactive_log_path() -> PathBuf {
    std::env::temp_dir().join("acr-push.log")
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
pub fn init(level: LogLevel, target: Target) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match target {
        Target::Stderr => builder
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init(),
        Target::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}
