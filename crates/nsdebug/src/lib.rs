//! # nsdebug
//!
//! Namespace-scoped debug logging for terminal programs.
//!
//! ## Features
//!
//! - **Namespaced loggers**: `http`, `http:req`, `http:req:res` derived from one another
//! - **Runtime enable patterns**: `DEBUG="http:*,-http:noisy"` style glob rules
//! - **Format verbs**: `%O`, `%o`, `%B` and caller-registered formatters
//! - **Terminal aware**: colorized output wraps to the terminal width and
//!   compacts repeated namespaces
//! - **Level thresholds**: ERROR, WARN, INFO, DEBUG, ALL
//!
//! ## Quick Start
//!
//! ```rust
//! use nsdebug::{args, DebugConfig, MemorySink, Registry};
//!
//! # fn main() -> nsdebug::Result<()> {
//! let sink = MemorySink::new();
//! let registry = Registry::builder(DebugConfig::default())
//!     .colors(false)
//!     .sink(sink.clone())
//!     .build()?;
//! registry.enable("http*")?;
//!
//! let http = registry.create("http");
//! http.info("listening on %s", args![8080]);
//! http.ns("req").debug("headers %o", args![serde_json::json!({ "host": "localhost" })]);
//!
//! assert!(sink.contents().contains("listening on 8080"));
//! # Ok(())
//! # }
//! ```

pub mod arg;
pub mod color;
pub mod config;
pub mod filters;
pub mod format;
pub mod formatters;
pub mod humanize;
pub mod inspect;
pub mod logger;
pub mod registry;
pub mod render;
pub mod sink;


pub use arg::Arg;
pub use color::ColorSupport;
pub use config::{DebugConfig, LogLevel};
pub use filters::{CompiledPattern, PatternSet};
pub use formatters::{Formatter, FormatterRegistry, RenderContext};
pub use logger::Logger;
pub use registry::{Registry, RegistryBuilder};
pub use sink::{MemorySink, Sink, StderrSink, WriterSink};

use once_cell::sync::OnceCell;

/// Result type for nsdebug operations
pub type Result<T> = std::result::Result<T, Error>;

/// nsdebug-specific errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid namespace pattern '{token}': {message}")]
    Pattern { token: String, message: String },
}

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Initialize the process-wide registry from the `DEBUG*` environment.
///
/// Subsequent calls return the already initialized registry. An unknown
/// `DEBUG_LOG_LEVEL` is reported here rather than silently defaulted.
pub fn init() -> Result<Registry> {
    GLOBAL
        .get_or_try_init(|| {
            let mut config = DebugConfig::default();
            config.load_env_overrides()?;
            Registry::builder(config).build()
        })
        .cloned()
}

/// Create a logger on the process-wide registry.
pub fn create(namespace: &str) -> Result<Logger> {
    Ok(init()?.create(namespace))
}

/// Replace the process-wide enable spec.
pub fn enable(namespaces: &str) -> Result<()> {
    init()?.enable(namespaces)
}

/// Clear the process-wide enable spec, returning the spec that was active.
pub fn disable() -> Result<String> {
    Ok(init()?.disable())
}

/// Whether `namespace` is enabled on the process-wide registry.
pub fn enabled(namespace: &str) -> Result<bool> {
    Ok(init()?.is_enabled(namespace))
}
