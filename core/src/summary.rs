//! Help summary rendering.

use crate::{OptionDef, Registry, RegistryEntry, Value};

/// Renders the declared options and help lines as help text.
///
/// Help lines are copied verbatim. Each run of options between help lines
/// becomes a two-column table, left column padded to the widest entry of
/// that run.
///
/// # Examples
///
/// ```
/// use optspec_core::{decl, render_summary, OptionFlags, Registry};
///
/// let mut registry = Registry::new();
/// registry.declare(decl!["General options:"]).unwrap();
/// registry.declare(decl!["o", "output", "[FILE]", "Write here", OptionFlags::REQUIRE_VALUE]).unwrap();
/// registry.declare(decl!["color", "Use colors", OptionFlags::ALLOW_FALSE]).unwrap();
///
/// assert_eq!(
///     render_summary(&registry),
///     "General options:\n  -o, --output <FILE>  Write here\n      --[no-]color     Use colors\n"
/// );
/// ```
pub fn render_summary(registry: &Registry) -> String {
    let mut out = String::new();
    let mut rows: Vec<(String, String)> = Vec::new();

    for entry in registry.entries() {
        match entry {
            RegistryEntry::Option(id) => {
                if let Some(def) = registry.get(*id) {
                    rows.push((format_left(def), format_help(def)));
                }
            }
            RegistryEntry::HelpLine(line) => {
                flush_rows(&mut out, &mut rows);
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
    }
    flush_rows(&mut out, &mut rows);
    out
}

fn flush_rows(out: &mut String, rows: &mut Vec<(String, String)>) {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, help) in rows.drain(..) {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

fn format_left(def: &OptionDef) -> String {
    let long = def.name.as_deref().map(|name| {
        if def.allows_false() {
            format!("--[no-]{name}")
        } else {
            format!("--{name}")
        }
    });
    let mut out = match (def.initial, long) {
        (Some(initial), Some(long)) => format!("-{initial}, {long}"),
        (Some(initial), None) => format!("-{initial}"),
        (None, Some(long)) => format!("    {long}"),
        (None, None) => String::new(),
    };

    if !def.forbids_value() {
        match (def.value_label.as_deref(), def.requires_value()) {
            (Some(label), true) => out.push_str(&format!(" <{label}>")),
            (Some(label), false) => out.push_str(&format!(" [{label}]")),
            (None, true) => out.push_str(" <VALUE>"),
            (None, false) => {}
        }
    }
    out
}

fn format_help(def: &OptionDef) -> String {
    let mut out = def.description.as_deref().unwrap_or_default().trim().to_string();
    let mut push = |part: &str| {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    };

    if def.is_required() {
        push("(required)");
    }
    let default = match &def.default {
        Value::Text(text) => Some(text.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::List(items) if !items.is_empty() => Some(items.join(", ")),
        Value::List(_) | Value::Unset => None,
    };
    if let Some(default) = default {
        push(&format!("[default: {default}]"));
    }
    out
}
