//! Logging infrastructure for the editor
//!
//! Structured logging using the `tracing` crate. Store, file manager,
//! preview and dispatcher all emit spans and events; this module installs
//! the subscriber that turns them into output.
//!
//! # Usage
//!
//! ```rust,no_run
//! use diagrampad::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).unwrap();
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `DIAGRAMPAD_LOG_LEVEL`: Set log level (trace|debug|info|warn|error|off)
//! - `DIAGRAMPAD_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Alternative way to set log level (tracing-subscriber standard)
//!
//! Output goes to stderr so it never interleaves with command output.
//!
//! # Filtering Logs
//!
//! ```bash
//! # Only store activity at debug level
//! RUST_LOG="diagrampad::plugins::file_store=debug" diagrampad list
//!
//! # Everything at info, the preview bridge at trace
//! RUST_LOG="info,diagrampad::editor::preview=trace" diagrampad shell
//! ```

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfig;

pub const LOG_LEVEL_ENV: &str = "DIAGRAMPAD_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "DIAGRAMPAD_LOG_FORMAT";

const DEFAULT_LEVEL: &str = "warn";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Level directive and format once arguments, environment and defaults
/// have been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Arguments win, then `DIAGRAMPAD_LOG_*`, then `RUST_LOG` for the level
    pub fn resolve(
        level: Option<&str>,
        format: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let level = level
            .map(str::to_string)
            .or_else(|| env(LOG_LEVEL_ENV))
            .or_else(|| env("RUST_LOG"))
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        let format = match format.map(str::to_string).or_else(|| env(LOG_FORMAT_ENV)) {
            Some(name) => {
                LogFormat::from_str(&name).map_err(|e| format!("Invalid log format: {}", e))?
            }
            None => LogFormat::default(),
        };

        Ok(Self { level, format })
    }
}

/// Initialize the tracing subscriber with the given log level and format
///
/// * `level` - trace|debug|info|warn|error|off, or any `EnvFilter`
///   directive. If None, uses `DIAGRAMPAD_LOG_LEVEL` or `RUST_LOG`, or
///   defaults to `warn`. An unparsable directive falls back to `warn`.
/// * `format` - compact|pretty|json. If None, uses `DIAGRAMPAD_LOG_FORMAT`,
///   or defaults to `compact`.
///
/// Returns an error for an unknown format or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        // Browser console only; level and format are not configurable there
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(WASMLayerConfig::default());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let settings = LogSettings::resolve(level, format, |key| std::env::var(key).ok())?;
        let filter = EnvFilter::try_new(&settings.level)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

        Registry::default()
            .with(filter)
            .with(stderr_layer(settings.format))
            .try_init()?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
type Filtered = Layered<EnvFilter, Registry>;

/// Formatting layer writing to stderr
#[cfg(not(target_arch = "wasm32"))]
fn stderr_layer(format: LogFormat) -> Box<dyn Layer<Filtered> + Send + Sync> {
    let layer = fmt::layer().with_writer(std::io::stderr);
    match format {
        LogFormat::Compact => layer.compact().with_target(false).boxed(),
        LogFormat::Pretty => layer
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::ACTIVE)
            .boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    }
}
