//! Format verb formatters
//!
//! A formatter renders the argument consumed by a `%<param><verb>` token.
//! `o`, `O` and `B` are built in; any verb letter can be registered or
//! overridden at runtime.

use crate::arg::Arg;
use crate::humanize::HumanBytes;
use crate::inspect::{inspect, InspectOptions};
use crossterm::style::{style, Stylize};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const ELLIPSIS: &str = "…";

/// Raw bytes ever shown in a `%B` hex dump, whatever the limit
const BUFFER_HEX_BYTES: usize = 8;
const DEFAULT_BUFFER_LIMIT: usize = 16;
const DEFAULT_BUFFER_WIDTH: usize = 2;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());

/// What a formatter knows about the call it renders for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub colors: bool,
    pub depth: Option<usize>,
}

impl RenderContext {
    pub fn inspect_options(&self) -> InspectOptions {
        InspectOptions {
            colors: self.colors,
            depth: self.depth,
        }
    }
}

/// Renders one verb argument
pub trait Formatter: Send + Sync {
    /// `param` is the text between `%` and the verb letter, e.g. `"10.2"` for `%10.2B`.
    fn format(&self, value: &Arg, param: &str, ctx: &RenderContext) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&Arg, &str, &RenderContext) -> String + Send + Sync,
{
    fn format(&self, value: &Arg, param: &str, ctx: &RenderContext) -> String {
        self(value, param, ctx)
    }
}

/// `%o`: inspection collapsed onto one line
pub struct InlineFormatter;

impl Formatter for InlineFormatter {
    fn format(&self, value: &Arg, _param: &str, ctx: &RenderContext) -> String {
        let rendered = inspect(value, ctx.inspect_options());
        LINE_BREAKS.replace_all(&rendered, " ").into_owned()
    }
}

/// `%O`: multi-line inspection
pub struct MultilineFormatter;

impl Formatter for MultilineFormatter {
    fn format(&self, value: &Arg, _param: &str, ctx: &RenderContext) -> String {
        inspect(value, ctx.inspect_options())
    }
}

/// `%B`: byte sequence preview, param `<limit>.<width>`
///
/// ```text
/// [Buf 68 65 6c 6c 6f 20 77 6f (11 B) 'hello world']
/// ```
///
/// The hex part never shows more than 8 bytes, while the text preview shows
/// up to `limit` bytes.
pub struct BufferFormatter;

impl BufferFormatter {
    fn parse_param(param: &str) -> (usize, usize) {
        let mut parts = param.split('.');
        let mut next = |default: usize| {
            parts
                .next()
                .filter(|p| !p.is_empty())
                .and_then(|p| p.parse().ok())
                .unwrap_or(default)
        };
        let limit = next(DEFAULT_BUFFER_LIMIT);
        let width = next(DEFAULT_BUFFER_WIDTH).max(1);
        (limit, width)
    }
}

impl Formatter for BufferFormatter {
    fn format(&self, value: &Arg, param: &str, ctx: &RenderContext) -> String {
        let Arg::Bytes(bytes) = value else {
            return inspect(value, ctx.inspect_options());
        };

        if bytes.is_empty() {
            return "[Buf (0 B)]".to_string();
        }

        let (limit, width) = Self::parse_param(param);
        let over_limit = if bytes.len() > limit { ELLIPSIS } else { "" };
        let partial = &bytes[..bytes.len().min(limit)];

        let mut text = format!("'{}{}'", String::from_utf8_lossy(partial), over_limit);
        if ctx.colors {
            text = text.yellow().to_string();
        }

        let hex = hex::encode(&partial[..partial.len().min(BUFFER_HEX_BYTES)]);
        let groups = hex
            .as_bytes()
            .chunks(width)
            .map(|chunk| {
                let group = String::from_utf8_lossy(chunk);
                if ctx.colors {
                    style(&group).green().to_string()
                } else {
                    group.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let overflow = if ctx.colors && !over_limit.is_empty() {
            over_limit.green().to_string()
        } else {
            over_limit.to_string()
        };

        format!(
            "[Buf {}{} ({}) {}]",
            groups,
            overflow,
            HumanBytes(bytes.len() as u64),
            text
        )
    }
}

/// Verb letter to formatter mapping
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<char, Arc<dyn Formatter>>,
}

impl FormatterRegistry {
    /// Registry holding the `o`, `O` and `B` formatters
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register('o', InlineFormatter);
        registry.register('O', MultilineFormatter);
        registry.register('B', BufferFormatter);
        registry
    }

    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// Register `formatter` for `verb`, replacing any previous one.
    pub fn register<F>(&mut self, verb: char, formatter: F) -> Option<Arc<dyn Formatter>>
    where
        F: Formatter + 'static,
    {
        self.formatters.insert(verb, Arc::new(formatter))
    }

    pub fn get(&self, verb: char) -> Option<Arc<dyn Formatter>> {
        self.formatters.get(&verb).cloned()
    }

    pub fn contains(&self, verb: char) -> bool {
        self.formatters.contains_key(&verb)
    }

    /// Registered verb letters, sorted
    pub fn verbs(&self) -> Vec<char> {
        let mut verbs: Vec<char> = self.formatters.keys().copied().collect();
        verbs.sort_unstable();
        verbs
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("verbs", &self.verbs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::strip_ansi;
    use serde_json::json;

    const PLAIN: RenderContext = RenderContext {
        colors: false,
        depth: Some(2),
    };

    fn buffer(bytes: &[u8], param: &str) -> String {
        BufferFormatter.format(&Arg::from(bytes), param, &PLAIN)
    }

    #[test]
    fn test_buffer_within_limit() {
        assert_eq!(
            buffer(b"hello world", ""),
            "[Buf 68 65 6c 6c 6f 20 77 6f (11 B) 'hello world']"
        );
    }

    #[test]
    fn test_buffer_over_limit() {
        assert_eq!(
            buffer(b"abcdefghijklmnopqrst", "5"),
            "[Buf 61 62 63 64 65… (20 B) 'abcde…']"
        );
    }

    #[test]
    fn test_buffer_hex_capped_at_eight_bytes() {
        let out = buffer(b"0123456789abcdef", "12.4");
        assert_eq!(out, "[Buf 3031 3233 3435 3637… (16 B) '0123456789ab…']");
    }

    #[test]
    fn test_buffer_empty_and_fallback() {
        assert_eq!(buffer(b"", ""), "[Buf (0 B)]");
        assert_eq!(buffer(b"", "3.4"), "[Buf (0 B)]");

        let fallback = BufferFormatter.format(&Arg::from(json!(null)), "", &PLAIN);
        assert_eq!(fallback, "null");
        let fallback = BufferFormatter.format(&Arg::from("text"), "", &PLAIN);
        assert_eq!(fallback, "'text'");
    }

    #[test]
    fn test_buffer_colors_keep_layout() {
        let colored = BufferFormatter.format(
            &Arg::from(b"hello\n\n".as_slice()),
            "10.2",
            &RenderContext {
                colors: true,
                depth: None,
            },
        );
        assert_eq!(strip_ansi(&colored), "[Buf 68 65 6c 6c 6f 0a 0a (7 B) 'hello\n\n']");
    }

    #[test]
    fn test_inline_collapses_lines() {
        let value = Arg::from(json!({
            "message": "a fairly long message that needs some room",
            "recipient": "someone with a long identifier",
        }));

        let inline = InlineFormatter.format(&value, "", &PLAIN);
        assert!(!inline.contains('\n'));
        assert!(inline.starts_with("{ message:"));

        let multi = MultilineFormatter.format(&value, "", &PLAIN);
        assert_eq!(multi.lines().count(), 4);
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = FormatterRegistry::new();
        assert_eq!(registry.verbs(), vec!['B', 'O', 'o']);

        let previous = registry.register('O', |_: &Arg, _: &str, _: &RenderContext| {
            "custom".to_string()
        });
        assert!(previous.is_some());
        assert!(registry.register('h', |v: &Arg, _: &str, _: &RenderContext| {
            format!("<{}>", v.as_text().unwrap_or_default())
        })
        .is_none());

        let formatter = registry.get('O').unwrap();
        assert_eq!(formatter.format(&Arg::from(1), "", &PLAIN), "custom");
        assert!(registry.contains('h'));
        assert!(registry.get('x').is_none());
    }
}
