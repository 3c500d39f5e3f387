//! Namespaced logger handles

use crate::arg::Arg;
use crate::color::select_color;
use crate::config::LogLevel;
use crate::registry::Registry;
use crate::render::LogRecord;
use chrono::Utc;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Per-instance state shared by all clones of a [`Logger`]
pub(crate) struct Instance {
    namespace: String,
    color: u8,
    level: LogLevel,
    colors: bool,
    utc: bool,
    inline_json: bool,
    enabled: AtomicBool,
    last_emit: Mutex<Option<Instant>>,
}

impl Instance {
    pub(crate) fn new(namespace: &str, registry: &Registry) -> Self {
        let config = registry.config();
        Self {
            namespace: namespace.to_string(),
            color: select_color(namespace, registry.palette()),
            level: config.log_level,
            colors: registry.colors(),
            utc: config.utc,
            inline_json: config.inline_json,
            enabled: AtomicBool::new(false),
            last_emit: Mutex::new(None),
        }
    }

    pub(crate) fn namespace(&self) -> &str {
        &self.namespace
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Milliseconds since the previous accepted call, 0 on the first.
    fn tick(&self) -> u64 {
        let now = Instant::now();
        let mut last = self.last_emit.lock();
        let elapsed = last.map_or(0, |previous| now.duration_since(previous).as_millis() as u64);
        *last = Some(now);
        elapsed
    }
}

/// A namespace-bound logger
///
/// Clones share timing and enablement state.
#[derive(Clone)]
pub struct Logger {
    instance: Arc<Instance>,
    registry: Registry,
}

impl Logger {
    pub(crate) fn new(instance: Arc<Instance>, registry: Registry) -> Self {
        Self { instance, registry }
    }

    pub fn namespace(&self) -> &str {
        &self.instance.namespace
    }

    /// Palette color of the namespace label
    pub fn color(&self) -> u8 {
        self.instance.color
    }

    pub fn level(&self) -> LogLevel {
        self.instance.level
    }

    /// Whether the current enable spec lets this namespace through
    pub fn is_enabled(&self) -> bool {
        self.instance.enabled.load(Ordering::Acquire)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Derive `<namespace><delimiter><suffix>` on the same registry.
    pub fn child(&self, suffix: &str, delimiter: &str) -> Logger {
        let namespace = format!("{}{}{}", self.instance.namespace, delimiter, suffix);
        self.registry.create(&namespace)
    }

    /// Derive `<namespace>:<suffix>`.
    pub fn ns(&self, suffix: &str) -> Logger {
        self.child(suffix, ":")
    }

    /// Unregister this logger. Returns `false` if it was already removed.
    pub fn remove(&self) -> bool {
        self.registry.remove(&self.instance)
    }

    pub fn error(&self, format: impl Into<Arg>, args: Vec<Arg>) {
        self.emit(LogLevel::Error, format.into(), args);
    }

    pub fn warn(&self, format: impl Into<Arg>, args: Vec<Arg>) {
        self.emit(LogLevel::Warn, format.into(), args);
    }

    pub fn info(&self, format: impl Into<Arg>, args: Vec<Arg>) {
        self.emit(LogLevel::Info, format.into(), args);
    }

    /// Same as [`Logger::info`]
    pub fn log(&self, format: impl Into<Arg>, args: Vec<Arg>) {
        self.emit(LogLevel::Info, format.into(), args);
    }

    pub fn debug(&self, format: impl Into<Arg>, args: Vec<Arg>) {
        self.emit(LogLevel::Debug, format.into(), args);
    }

    fn emit(&self, level: LogLevel, format: Arg, args: Vec<Arg>) {
        if !self.instance.level.allows(level) || !self.is_enabled() {
            return;
        }

        let instance = &self.instance;
        let record = LogRecord {
            level,
            namespace: instance.namespace.clone(),
            color: instance.color,
            elapsed_ms: instance.tick(),
            timestamp: Utc::now(),
            colors: instance.colors,
            utc: instance.utc,
            inline_json: instance.inline_json,
            format,
            args,
        };
        self.registry.render(record);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("namespace", &self.instance.namespace)
            .field("color", &self.instance.color)
            .field("level", &self.instance.level)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
