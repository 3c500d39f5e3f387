//! printf-style format strings
//!
//! Formatting happens in two passes. [`expand_verbs`] replaces every verb
//! that has a registered formatter and removes the argument it consumed.
//! [`substitute`] then handles the conventional `%s`, `%d`, `%i`, `%f`, `%j`,
//! `%c` and `%%` verbs and appends whatever arguments are left.

use crate::arg::Arg;
use crate::formatters::{FormatterRegistry, RenderContext};
use crate::inspect::inspect;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// `%`, an optional run of parameter characters, then the verb letter.
static VERB: Lazy<Regex> = Lazy::new(|| Regex::new(r"%[0-9a-zA-Z.$]*([a-zA-Z%])").unwrap());

/// Replace registered verbs in `format`, consuming their arguments from `args`.
///
/// Every verb occupies one argument position. A verb without a registered
/// formatter, or without an argument left at its position, stays in the
/// output as written and its argument stays in `args`.
pub fn expand_verbs(
    format: &str,
    args: &mut Vec<Arg>,
    formatters: &FormatterRegistry,
    ctx: &RenderContext,
) -> String {
    let mut out = String::with_capacity(format.len());
    let mut last = 0;
    let mut position = 0;

    for caps in VERB.captures_iter(format) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        out.push_str(&format[last..token.start()]);
        last = token.end();

        let text = token.as_str();
        if text == "%%" {
            out.push_str(text);
            continue;
        }

        let verb = caps[1].chars().next().unwrap_or('%');
        let param = &text[1..text.len() - verb.len_utf8()];

        match formatters.get(verb) {
            Some(formatter) if position < args.len() => {
                let value = args.remove(position);
                out.push_str(&formatter.format(&value, param, ctx));
            }
            _ => {
                out.push_str(text);
                position += 1;
            }
        }
    }

    out.push_str(&format[last..]);
    out
}

/// Conventional substitution of the verbs left after [`expand_verbs`].
///
/// With no arguments the format string is returned untouched, `%%` included.
pub fn substitute(format: &str, args: Vec<Arg>, ctx: &RenderContext) -> String {
    if args.is_empty() {
        return format.to_string();
    }

    let mut args = args.into_iter().peekable();
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(verb @ ('s' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' | 'c'))
                if args.peek().is_some() =>
            {
                chars.next();
                if let Some(value) = args.next() {
                    out.push_str(&substitute_one(verb, &value, ctx));
                }
            }
            _ => out.push('%'),
        }
    }

    for value in args {
        if !out.is_empty() {
            out.push(' ');
        }
        match value {
            Arg::Text(text) => out.push_str(&text),
            other => out.push_str(&inspect(&other, ctx.inspect_options())),
        }
    }

    out
}

fn substitute_one(verb: char, value: &Arg, ctx: &RenderContext) -> String {
    match verb {
        's' => match value {
            Arg::Text(text) => text.clone(),
            Arg::Value(Value::String(text)) => text.clone(),
            Arg::Value(Value::Number(n)) => n.to_string(),
            Arg::Value(Value::Bool(b)) => b.to_string(),
            other => inspect(other, ctx.inspect_options()),
        },
        'd' => value.as_number().map_or_else(|| "NaN".to_string(), format_number),
        'i' => value
            .as_number()
            .map_or_else(|| "NaN".to_string(), |n| format_number(n.trunc())),
        'f' => value
            .as_number()
            .map_or_else(|| "NaN".to_string(), |n| n.to_string()),
        'j' => to_json(value),
        'c' => String::new(),
        _ => inspect(value, ctx.inspect_options()),
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn to_json(value: &Arg) -> String {
    let json = match value {
        Arg::Text(text) => Value::String(text.clone()),
        Arg::Value(value) => value.clone(),
        Arg::Bytes(bytes) => serde_json::json!({ "type": "Buffer", "data": bytes }),
    };
    json.to_string()
}
