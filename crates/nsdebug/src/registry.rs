//! Shared logger registry
//!
//! A [`Registry`] owns everything loggers share: the live instances, the
//! compiled enable patterns, the last printed namespace, the formatter table
//! and the output sink. Cloning a registry yields another handle to the same
//! state.

use crate::color::ColorSupport;
use crate::config::DebugConfig;
use crate::filters::PatternSet;
use crate::formatters::{Formatter, FormatterRegistry};
use crate::logger::{Instance, Logger};
use crate::render::{LineRenderer, LogRecord};
use crate::sink::{Sink, StderrSink};
use crate::Result;
use crossterm::tty::IsTty;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;

/// Handle to shared logger state
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Shared>,
}

struct Shared {
    config: DebugConfig,
    colors: bool,
    palette: &'static [u8],
    state: Mutex<State>,
    formatters: RwLock<Arc<FormatterRegistry>>,
}

/// Shared mutable state. One lock keeps the enabled flags, the compaction
/// state and the sink writes of a call consistent.
struct State {
    instances: Vec<Arc<Instance>>,
    patterns: PatternSet,
    last_printed: String,
    sink: Box<dyn Sink>,
}

/// Builder for [`Registry`]
pub struct RegistryBuilder {
    config: DebugConfig,
    colors: Option<bool>,
    color_support: Option<ColorSupport>,
    sink: Option<Box<dyn Sink>>,
    formatters: FormatterRegistry,
}

impl RegistryBuilder {
    /// Force colorized rendering on or off, overriding the configuration
    pub fn colors(mut self, colors: bool) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Use a fixed color depth instead of probing the terminal
    pub fn color_support(mut self, support: ColorSupport) -> Self {
        self.color_support = Some(support);
        self
    }

    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn formatters(mut self, formatters: FormatterRegistry) -> Self {
        self.formatters = formatters;
        self
    }

    /// Validate the configuration and compile its enable spec.
    pub fn build(self) -> Result<Registry> {
        self.config.validate()?;

        let patterns = PatternSet::compile(self.config.namespaces.as_deref().unwrap_or(""))?;
        let support = self.color_support.unwrap_or_else(ColorSupport::detect);
        let colors = self
            .colors
            .or(self.config.colors)
            .unwrap_or_else(|| std::io::stderr().is_tty());

        tracing::debug!(
            nsdebug.event = "registry_built",
            colors,
            color_level = support.level(),
            log_level = %self.config.log_level,
            "Debug registry initialized"
        );

        Ok(Registry {
            inner: Arc::new(Shared {
                config: self.config,
                colors,
                palette: support.palette(),
                state: Mutex::new(State {
                    instances: Vec::new(),
                    patterns,
                    last_printed: String::new(),
                    sink: self.sink.unwrap_or_else(|| Box::new(StderrSink)),
                }),
                formatters: RwLock::new(Arc::new(self.formatters)),
            }),
        })
    }
}

impl Registry {
    pub fn builder(config: DebugConfig) -> RegistryBuilder {
        RegistryBuilder {
            config,
            colors: None,
            color_support: None,
            sink: None,
            formatters: FormatterRegistry::new(),
        }
    }

    pub fn config(&self) -> &DebugConfig {
        &self.inner.config
    }

    /// Whether loggers of this registry render colorized lines
    pub fn colors(&self) -> bool {
        self.inner.colors
    }

    pub fn palette(&self) -> &'static [u8] {
        self.inner.palette
    }

    /// Create and register a logger for `namespace`.
    pub fn create(&self, namespace: &str) -> Logger {
        let instance = Arc::new(Instance::new(namespace, self));

        let mut state = self.inner.state.lock();
        instance.set_enabled(state.patterns.is_enabled(namespace));
        state.instances.push(Arc::clone(&instance));
        drop(state);

        Logger::new(instance, self.clone())
    }

    /// Unregister `instance`. Returns `false` if it was already removed.
    pub(crate) fn remove(&self, instance: &Arc<Instance>) -> bool {
        let mut state = self.inner.state.lock();
        let Some(index) = state
            .instances
            .iter()
            .position(|live| Arc::ptr_eq(live, instance))
        else {
            return false;
        };

        state.instances.remove(index);
        tracing::trace!(
            nsdebug.event = "instance_removed",
            namespace = instance.namespace(),
            "Logger removed from registry"
        );
        true
    }

    /// Replace the enable spec and re-evaluate every live logger.
    ///
    /// A spec that fails to compile leaves the current patterns in place.
    pub fn enable(&self, namespaces: &str) -> Result<()> {
        let patterns = PatternSet::compile(namespaces)?;

        let mut state = self.inner.state.lock();
        state.patterns = patterns;
        Self::refresh(&mut state);

        tracing::debug!(
            nsdebug.event = "patterns_compiled",
            names = state.patterns.names().len(),
            skips = state.patterns.skips().len(),
            instances = state.instances.len(),
            "Enable spec applied"
        );
        Ok(())
    }

    /// Clear the enable spec, returning a spec that restores it when passed
    /// back to [`Registry::enable`].
    pub fn disable(&self) -> String {
        let mut state = self.inner.state.lock();
        let previous = state.patterns.to_spec();
        state.patterns = PatternSet::default();
        Self::refresh(&mut state);

        tracing::debug!(
            nsdebug.event = "patterns_cleared",
            previous = %previous,
            "Enable spec cleared"
        );
        previous
    }

    /// Evaluate the current patterns against `namespace`.
    pub fn is_enabled(&self, namespace: &str) -> bool {
        self.inner.state.lock().patterns.is_enabled(namespace)
    }

    /// The active enable spec
    pub fn spec(&self) -> String {
        self.inner.state.lock().patterns.to_spec()
    }

    /// Namespaces of the live loggers, in creation order
    pub fn namespaces(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .instances
            .iter()
            .map(|instance| instance.namespace().to_string())
            .collect()
    }

    /// Register or override the formatter for `verb`.
    pub fn register_formatter<F>(&self, verb: char, formatter: F)
    where
        F: Formatter + 'static,
    {
        let mut formatters = self.inner.formatters.write();
        let replaced = Arc::make_mut(&mut formatters)
            .register(verb, formatter)
            .is_some();
        drop(formatters);

        tracing::debug!(
            nsdebug.event = "formatter_registered",
            verb = %verb,
            replaced,
            "Format verb registered"
        );
    }

    /// Render an accepted record. Sink failures never reach the caller.
    ///
    /// Formatters run before the state lock is taken, so they may log,
    /// create loggers or register formatters themselves. Only the
    /// compaction decision and the sink writes happen under the lock.
    pub(crate) fn render(&self, record: LogRecord) {
        let config = &self.inner.config;
        let formatters = Arc::clone(&*self.inner.formatters.read());
        let columns = if record.colors {
            self.inner.state.lock().sink.columns()
        } else {
            None
        };

        let renderer = LineRenderer {
            formatters: &formatters,
            name_width: config.name_width,
            hide_date: config.hide_date,
            depth: config.depth,
        };
        let line = renderer.compose(record, columns);

        let mut state = self.inner.state.lock();
        let State {
            last_printed, sink, ..
        } = &mut *state;

        if let Err(e) = line.write_to(last_printed, sink.as_mut()) {
            tracing::trace!(
                nsdebug.event = "sink_error",
                error = %e,
                "Failed to write log line"
            );
        }
    }

    fn refresh(state: &mut State) {
        for instance in &state.instances {
            instance.set_enabled(state.patterns.is_enabled(instance.namespace()));
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.inner.config)
            .field("colors", &self.inner.colors)
            .field("spec", &self.spec())
            .finish()
    }
}
