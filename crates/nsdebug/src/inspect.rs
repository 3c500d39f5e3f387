//! Deep inspection of argument values

use crate::arg::Arg;
use crossterm::style::{style, Stylize};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Width under which an object or array stays on one line
const BREAK_LENGTH: usize = 72;

/// Bytes shown by a `<Buffer ...>` preview
const MAX_BUFFER_BYTES: usize = 50;

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Inspection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectOptions {
    pub colors: bool,
    /// Nesting depth before containers collapse to `[Object]`; `None` is unlimited
    pub depth: Option<usize>,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            colors: false,
            depth: Some(2),
        }
    }
}

/// Remove ANSI styling
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Printable width of `text`, ignoring ANSI styling
pub fn visible_len(text: &str) -> usize {
    if text.contains('\x1b') {
        strip_ansi(text).chars().count()
    } else {
        text.chars().count()
    }
}

/// Render any argument for humans.
pub fn inspect(arg: &Arg, options: InspectOptions) -> String {
    match arg {
        Arg::Text(text) => quote(text, options.colors),
        Arg::Bytes(bytes) => inspect_bytes(bytes),
        Arg::Value(value) => Inspector { options }.value(value, 0),
    }
}

/// `<Buffer 68 65 6c>` preview of raw bytes
pub fn inspect_bytes(bytes: &[u8]) -> String {
    let shown = &bytes[..bytes.len().min(MAX_BUFFER_BYTES)];
    let mut out = String::from("<Buffer");
    for byte in shown {
        out.push(' ');
        out.push_str(&hex::encode([*byte]));
    }

    let remaining = bytes.len() - shown.len();
    if remaining > 0 {
        out.push_str(&format!(
            " ... {} more byte{}",
            remaining,
            if remaining > 1 { "s" } else { "" }
        ));
    }
    out.push('>');
    out
}

fn quote(text: &str, colors: bool) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n");
    let quoted = format!("'{}'", escaped);
    if colors {
        quoted.green().to_string()
    } else {
        quoted
    }
}

struct Inspector {
    options: InspectOptions,
}

impl Inspector {
    fn value(&self, value: &Value, level: usize) -> String {
        let colors = self.options.colors;
        match value {
            Value::Null => paint_bold("null", colors),
            Value::Bool(flag) => paint_yellow(&flag.to_string(), colors),
            Value::Number(number) => paint_yellow(&number.to_string(), colors),
            Value::String(text) => quote(text, colors),
            Value::Array(items) => {
                if self.too_deep(level) {
                    return paint_cyan("[Array]", colors);
                }
                let entries = items
                    .iter()
                    .map(|item| self.value(item, level + 1))
                    .collect::<Vec<_>>();
                wrap_entries("[", "]", entries)
            }
            Value::Object(map) => {
                if self.too_deep(level) {
                    return paint_cyan("[Object]", colors);
                }
                wrap_entries("{", "}", self.entries(map, level))
            }
        }
    }

    fn entries(&self, map: &Map<String, Value>, level: usize) -> Vec<String> {
        map.iter()
            .map(|(key, value)| {
                let key = if IDENTIFIER.is_match(key) {
                    key.clone()
                } else {
                    quote(key, self.options.colors)
                };
                format!("{}: {}", key, self.value(value, level + 1))
            })
            .collect()
    }

    fn too_deep(&self, level: usize) -> bool {
        self.options.depth.is_some_and(|depth| level > depth)
    }
}

fn wrap_entries(open: &str, close: &str, entries: Vec<String>) -> String {
    if entries.is_empty() {
        return format!("{}{}", open, close);
    }

    let single_line = entries.iter().all(|entry| !entry.contains('\n'))
        && open.len() + entries.iter().map(|e| visible_len(e) + 2).sum::<usize>() <= BREAK_LENGTH;

    if single_line {
        return format!("{} {} {}", open, entries.join(", "), close);
    }

    let body = entries
        .iter()
        .map(|entry| format!("  {}", entry.replace('\n', "\n  ")))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{}\n{}\n{}", open, body, close)
}

fn paint_yellow(text: &str, colors: bool) -> String {
    if colors {
        style(text).yellow().to_string()
    } else {
        text.to_string()
    }
}

fn paint_cyan(text: &str, colors: bool) -> String {
    if colors {
        style(text).cyan().to_string()
    } else {
        text.to_string()
    }
}

fn paint_bold(text: &str, colors: bool) -> String {
    if colors {
        style(text).bold().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain(value: Value) -> String {
        inspect(&Arg::Value(value), InspectOptions::default())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(plain(json!(null)), "null");
        assert_eq!(plain(json!(true)), "true");
        assert_eq!(plain(json!(42)), "42");
        assert_eq!(plain(json!("it's")), "'it\\'s'");
        assert_eq!(inspect(&Arg::from("hi"), InspectOptions::default()), "'hi'");
    }

    #[test]
    fn test_short_containers_stay_on_one_line() {
        assert_eq!(plain(json!({})), "{}");
        assert_eq!(plain(json!([])), "[]");
        assert_eq!(plain(json!([1, 2, 3])), "[ 1, 2, 3 ]");
        assert_eq!(
            plain(json!({ "id": "PAGE_ID", "x-user": 1 })),
            "{ id: 'PAGE_ID', 'x-user': 1 }"
        );
    }

    #[test]
    fn test_long_containers_break_lines() {
        let out = plain(json!({
            "message": "a fairly long message that needs some room",
            "recipient": "someone with a long identifier",
        }));

        assert_eq!(
            out,
            concat!(
                "{\n",
                "  message: 'a fairly long message that needs some room',\n",
                "  recipient: 'someone with a long identifier'\n",
                "}"
            )
        );
    }

    #[test]
    fn test_depth_limit() {
        let value = json!({ "a": { "b": { "c": { "d": 1 } } } });
        assert_eq!(plain(value.clone()), "{ a: { b: { c: [Object] } } }");

        let unlimited = inspect(
            &Arg::Value(value),
            InspectOptions {
                colors: false,
                depth: None,
            },
        );
        assert_eq!(unlimited, "{ a: { b: { c: { d: 1 } } } }");
    }

    #[test]
    fn test_colors_do_not_change_visible_text() {
        let value = json!({ "name": "Steve", "seq": 73, "ok": null });
        let colored = inspect(
            &Arg::Value(value.clone()),
            InspectOptions {
                colors: true,
                depth: Some(2),
            },
        );

        assert_eq!(strip_ansi(&colored), plain(value));
    }

    #[test]
    fn test_bytes() {
        assert_eq!(inspect_bytes(b"hi"), "<Buffer 68 69>");
        assert_eq!(inspect_bytes(&[]), "<Buffer>");

        let long = vec![0u8; 52];
        assert!(inspect_bytes(&long).ends_with("00 ... 2 more bytes>"));
    }
}
