//! Configuration schema definitions.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use relay_framework::DispatchMode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Root configuration structure.
///
/// Besides the sections below, every other top-level table is kept verbatim
/// as a service section and can be read with [`RelayConfig::section`]:
///
/// ```toml
/// [dispatch]
/// mode = "first"
///
/// [weather]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RelayConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Per-service sections, keyed by table name.
    #[serde(flatten)]
    pub services: BTreeMap<String, serde_json::Value>,
}

impl RelayConfig {
    /// Deserializes the service section `name`.
    ///
    /// A missing section deserializes from an empty table, so a section type
    /// whose fields all have defaults never fails here.
    pub fn section<T: DeserializeOwned>(&self, name: &str) -> ConfigResult<T> {
        let value = self
            .services
            .get(name)
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
        serde_json::from_value(value).map_err(|e| ConfigError::Section {
            section: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Returns `true` if a section named `name` is present.
    pub fn has_section(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Whether every matching filter fires or only the first.
    #[serde(default)]
    pub mode: DispatchMode,

    /// Upper bound on concurrently running handlers; `0` is unbounded.
    #[serde(default)]
    pub max_concurrent_handlers: usize,

    /// Wrap the transport so writes to one conversation never overlap.
    #[serde(default = "default_serialize_sends")]
    pub serialize_sends: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::default(),
            max_concurrent_handlers: 0,
            serialize_sends: default_serialize_sends(),
        }
    }
}

fn default_serialize_sends() -> bool {
    true
}

// =============================================================================
// HTTP
// =============================================================================

/// Settings for the outbound HTTP client used by fetch and publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("relay/", env!("CARGO_PKG_VERSION")).to_string()
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Debugging detail.
    Debug,
    /// Normal operation.
    #[default]
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures.
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line, abbreviated.
    #[default]
    Compact,
    /// Single-line, full.
    Full,
    /// Multi-line, human oriented.
    Pretty,
    /// Newline-delimited JSON (requires the `json-log` feature).
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// A file, see [`LoggingConfig::file_path`].
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    /// Span creation.
    #[serde(default)]
    pub new: bool,
    /// Span entry.
    #[serde(default)]
    pub enter: bool,
    /// Span exit.
    #[serde(default)]
    pub exit: bool,
    /// Span close.
    #[serde(default)]
    pub close: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Span lifecycle events.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-target levels, e.g. `relay_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Log file, used with [`LogOutput::File`].
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default)]
        key: Option<String>,
        #[serde(default = "default_limit")]
        limit: usize,
    }

    fn default_limit() -> usize {
        600
    }

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.dispatch.mode, DispatchMode::All);
        assert_eq!(config.dispatch.max_concurrent_handlers, 0);
        assert!(config.dispatch.serialize_sends);
        assert_eq!(config.http.timeout_secs, 10);
        assert!(config.http.user_agent.starts_with("relay/"));
        assert!(config.services.is_empty());
    }

    #[test]
    fn test_unknown_tables_become_sections() {
        let config: RelayConfig = serde_json::from_value(serde_json::json!({
            "dispatch": { "mode": "first" },
            "sample": { "key": "abc", "limit": 3 }
        }))
        .unwrap();

        assert_eq!(config.dispatch.mode, DispatchMode::First);
        assert!(config.has_section("sample"));
        assert!(!config.has_section("dispatch"));

        let sample: Sample = config.section("sample").unwrap();
        assert_eq!(
            sample,
            Sample {
                key: Some("abc".into()),
                limit: 3
            }
        );
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let config = RelayConfig::default();
        let sample: Sample = config.section("sample").unwrap();
        assert_eq!(sample.key, None);
        assert_eq!(sample.limit, 600);
    }

    #[test]
    fn test_malformed_section() {
        let config: RelayConfig = serde_json::from_value(serde_json::json!({
            "sample": { "limit": "many" }
        }))
        .unwrap();
        let err = config.section::<Sample>("sample").unwrap_err();
        assert!(matches!(err, ConfigError::Section { section, .. } if section == "sample"));
    }
}
