//! Line rendering
//!
//! Colorized lines look like
//!
//! ```text
//! [ INFO]  http:req    request body {  +3ms
//!                        id: 7 }
//! ```
//!
//! and wrap to the terminal width. Plain lines carry a date column instead
//! of the elapsed-time badge and are never truncated.

use crate::arg::Arg;
use crate::color::level_color;
use crate::config::LogLevel;
use crate::format::{expand_verbs, substitute};
use crate::formatters::{FormatterRegistry, RenderContext};
use crate::humanize::{format_date, HumanDuration};
use crate::inspect::visible_len;
use crate::sink::Sink;
use chrono::{DateTime, Utc};
use crossterm::style::{Color, Stylize};
use std::io;

const SEPARATOR: &str = "  ";
const ELLIPSIS: char = '…';
/// `[LEVEL]`
const LABEL_WIDTH: usize = 7;

/// One accepted log call
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub namespace: String,
    pub color: u8,
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub colors: bool,
    pub utc: bool,
    pub inline_json: bool,
    pub format: Arg,
    pub args: Vec<Arg>,
}

/// Renders records to a sink
pub struct LineRenderer<'a> {
    pub formatters: &'a FormatterRegistry,
    pub name_width: usize,
    pub hide_date: bool,
    pub depth: Option<usize>,
}

/// A rendered line whose namespace column is decided at write time
#[derive(Debug, Clone)]
pub struct ComposedLine {
    namespace: String,
    head: String,
    name: Option<NameField>,
    body: String,
    badge: String,
}

#[derive(Debug, Clone)]
struct NameField {
    full: String,
    blank: String,
}

impl ComposedLine {
    /// Write the line, compacting the namespace column when `last_printed`
    /// names the same namespace. `last_printed` is updated once the prefix
    /// is out.
    pub fn write_to(&self, last_printed: &mut String, sink: &mut dyn Sink) -> io::Result<()> {
        sink.write_str(&self.head)?;
        if let Some(name) = &self.name {
            let field = if *last_printed == self.namespace {
                &name.blank
            } else {
                &name.full
            };
            sink.write_str(field)?;
        }
        last_printed.clone_from(&self.namespace);

        sink.write_str(&self.body)?;
        sink.write_str(SEPARATOR)?;
        sink.write_str(&self.badge)?;
        sink.write_str("\n")
    }
}

impl<'a> LineRenderer<'a> {
    pub fn new(formatters: &'a FormatterRegistry) -> Self {
        Self {
            formatters,
            name_width: 10,
            hide_date: false,
            depth: Some(2),
        }
    }

    /// Compose and write `record` in one go.
    pub fn render(
        &self,
        record: LogRecord,
        last_printed: &mut String,
        sink: &mut dyn Sink,
    ) -> io::Result<()> {
        let columns = sink.columns();
        self.compose(record, columns).write_to(last_printed, sink)
    }

    /// Run the formatters and lay out everything except the namespace
    /// column. `columns` is the terminal width, if known.
    pub fn compose(&self, record: LogRecord, columns: Option<usize>) -> ComposedLine {
        let label = format!("{:>5}", record.level.as_str());

        let (head, name, prefix_width, badge, line_width) = if record.colors {
            let color = Color::AnsiValue(record.color);
            let label = label.with(Color::AnsiValue(level_color(record.level)));
            let head = format!("[{}]{}", label, SEPARATOR);

            let field = |text: String| format!("{}{}", text.with(color).bold(), SEPARATOR);
            let name = NameField {
                full: field(pad_end(
                    &truncate_name(&record.namespace, self.name_width),
                    self.name_width,
                )),
                blank: field(" ".repeat(self.name_width)),
            };
            let prefix_width = LABEL_WIDTH + self.name_width + SEPARATOR.len() * 2;

            let badge = format!("+{}", HumanDuration(record.elapsed_ms));
            let badge_width = SEPARATOR.len() + badge.chars().count();
            let badge = badge.with(color).to_string();

            let line_width = columns
                .map(|columns| columns.saturating_sub(prefix_width + badge_width))
                .unwrap_or(usize::MAX);

            (head, Some(name), prefix_width, badge, line_width)
        } else {
            let date = if self.hide_date {
                String::new()
            } else {
                format_date(record.timestamp, record.utc)
            };
            let head = format!(
                "[{}]{sep}{}{sep}{}{sep}",
                label,
                date,
                record.namespace,
                sep = SEPARATOR
            );
            let prefix_width = head.chars().count();
            (head, None, prefix_width, String::new(), usize::MAX)
        };

        let padding = " ".repeat(prefix_width);
        let ctx = RenderContext {
            colors: record.colors,
            depth: self.depth,
        };
        let default_verb = if record.inline_json { 'o' } else { 'O' };
        let body = self.body(
            record.format,
            record.args,
            default_verb,
            &ctx,
            line_width,
            &padding,
        );

        ComposedLine {
            namespace: record.namespace,
            head,
            name,
            body,
            badge,
        }
    }

    fn body(
        &self,
        format: Arg,
        mut args: Vec<Arg>,
        default_verb: char,
        ctx: &RenderContext,
        line_width: usize,
        padding: &str,
    ) -> String {
        let format = match format {
            Arg::Text(format) => {
                let expanded = expand_verbs(&format, &mut args, self.formatters, ctx);
                fit_lines(&expanded, line_width, padding)
            }
            value => {
                args.insert(0, value);
                String::new()
            }
        };

        if let Some(formatter) = self.formatters.get(default_verb) {
            for arg in args.iter_mut().filter(|arg| arg.is_object()) {
                let rendered = formatter.format(arg, "", ctx);
                *arg = Arg::Text(fit_lines(&rendered, line_width, padding));
            }
        }

        substitute(&format, args, ctx)
    }
}

/// Keep `width - 1` leading characters and an ellipsis when `name` is too wide.
pub fn truncate_name(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let mut short: String = name.chars().take(width.saturating_sub(1)).collect();
        short.push(ELLIPSIS);
        short
    } else {
        name.to_string()
    }
}

fn pad_end(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

/// Truncate every line at or beyond `width` visible characters to
/// `width - 2` plus `" …"`, and indent continuation lines by `padding`.
pub fn fit_lines(text: &str, width: usize, padding: &str) -> String {
    text.split('\n')
        .map(|line| {
            if visible_len(line) >= width {
                let mut cut = truncate_visible(line, width.saturating_sub(2));
                cut.push(' ');
                cut.push(ELLIPSIS);
                cut
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&format!("\n{}", padding))
}

/// First `keep` visible characters of `line`, with ANSI sequences kept
/// intact and styling reset if any was cut off.
fn truncate_visible(line: &str, keep: usize) -> String {
    let mut out = String::new();
    let mut kept = 0;
    let mut styled = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            out.push(c);
            for next in chars.by_ref() {
                out.push(next);
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            styled = true;
            continue;
        }

        if kept == keep {
            break;
        }
        out.push(c);
        kept += 1;
    }

    if styled {
        out.push_str("\x1b[0m");
    }
    out
}
