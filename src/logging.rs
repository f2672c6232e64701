use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV_VAR: &str = "COTES_LOG";
pub const LOG_FILE_NAME: &str = "cotes.log";

/// Filter directive: `COTES_LOG`, else the configured filter, else `info`.
pub fn filter_directive(from_env: Option<String>, configured: &str) -> String {
    from_env
        .filter(|v| !v.trim().is_empty())
        .or_else(|| Some(configured.to_string()).filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "info".to_string())
}

/// Route tracing output to `<data_dir>/cotes.log`. The terminal belongs to
/// the UI, so nothing is written to stdout or stderr.
pub fn init(data_dir: &Path, configured_filter: &str) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let path = data_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let directive = filter_directive(std::env::var(LOG_ENV_VAR).ok(), configured_filter);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_precedence() {
        assert_eq!(filter_directive(Some("debug".into()), "warn"), "debug");
        assert_eq!(filter_directive(None, "warn"), "warn");
        assert_eq!(filter_directive(Some(" ".into()), ""), "info");
    }
}
