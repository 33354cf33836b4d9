use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::WorkflowError;

/// Resolved run configuration.
///
/// The binary fills this from flags, `ACR_PUSH_*` variables and `.env`
/// (in that order of precedence). Empty values are already folded into
/// `None` by the time a `Settings` exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Registry name
    pub acr_name: Option<String>,
    /// Resource group holding the registry
    pub acr_resource_group: Option<String>,
    /// Subscription id or name to activate before listing registries
    pub subscription: Option<String>,
    /// Tenant the session must belong to
    pub tenant_id: Option<String>,
    /// Repository within the registry
    pub repo_name: Option<String>,
    /// Image tag to build
    pub tag: Option<String>,
    pub dockerfile_path: Option<PathBuf>,
    pub build_context: Option<PathBuf>,
    /// Do not tag or push the `latest` alias
    pub skip_latest: bool,
    /// Platform passed to the build engine, e.g. `linux/amd64`
    pub platform: Option<String>,
    pub log_level: LogLevel,
}

impl Settings {
    /// Check that every CI-required field is present.
    ///
    /// All missing names are reported together in a single error.
    pub fn require_ci_fields(&self) -> crate::Result<()> {
        let missing: Vec<&'static str> = self
            .ci_fields()
            .into_iter()
            .filter_map(|(name, present)| (!present).then_some(name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::MissingCiFields(missing))
        }
    }

    /// Fields CI mode cannot run without, in reporting order.
    fn ci_fields(&self) -> [(&'static str, bool); 6] {
        fn text(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.trim().is_empty())
        }
        fn path(v: &Option<PathBuf>) -> bool {
            v.as_deref().is_some_and(|p| !p.as_os_str().is_empty())
        }

        [
            ("acr_name", text(&self.acr_name)),
            ("acr_resource_group", text(&self.acr_resource_group)),
            ("repo_name", text(&self.repo_name)),
            ("tag", text(&self.tag)),
            ("dockerfile_path", path(&self.dockerfile_path)),
            ("build_context", path(&self.build_context)),
        ]
    }
}

/// Log verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    ///
    /// tracing has no level above `error`, so `Critical` shares it.
    pub fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid log level {0:?}: expected one of DEBUG, INFO, WARNING, ERROR, CRITICAL")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(ParseLogLevelError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" Warning ".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("CRITICAL".parse::<LogLevel>().unwrap(), LogLevel::Critical);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn critical_maps_to_error_filter() {
        assert_eq!(LogLevel::Critical.filter_directive(), "error");
        assert_eq!(LogLevel::Warning.filter_directive(), "warn");
        assert_eq!(LogLevel::default().filter_directive(), "info");
    }
}
