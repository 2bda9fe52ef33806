//! Text views of values for results, prompts and listings.

use crate::error::EvaluationError;
use serde_json::Value;

const CLIP_WIDTH: usize = 30;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Compact one-line JSON.
pub fn view(value: &Value) -> String {
    value.to_string()
}

/// Short description for prompts and nesting listings.
///
/// Scalars are shown as-is when they fit; containers and long text fall back
/// to a summary such as `{...3 keys}` or `[...2 items]`.
pub fn view_clip(value: &Value) -> String {
    let full = view(value);
    if full.chars().count() <= CLIP_WIDTH {
        return full;
    }
    match value {
        Value::Object(map) => format!("{{...{} keys}}", map.len()),
        Value::Array(items) => format!("[...{} items]", items.len()),
        _ => {
            let head: String = full.chars().take(CLIP_WIDTH - 3).collect();
            format!("{head}...")
        }
    }
}

/// The `=> value` line printed after an evaluation.
pub fn render_result(value: &Value, color: bool) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| view(value));
    if color {
        format!("=> {}", colorize(value, &pretty))
    } else {
        format!("=> {pretty}")
    }
}

/// Multi-line pretty form, used by `cat`.
pub fn render_pretty(value: &Value, color: bool) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| view(value));
    if color { colorize(value, &pretty) } else { pretty }
}

/// Wrap `text` in the color of the value's JSON type.
fn colorize(value: &Value, text: &str) -> String {
    let code = match value {
        Value::Null => "\x1b[1;30m",
        Value::Bool(_) => "\x1b[36m",
        Value::Number(_) => "\x1b[34m",
        Value::String(_) => "\x1b[32m",
        Value::Array(_) | Value::Object(_) => "\x1b[33m",
    };
    format!("{code}{text}{RESET}")
}

/// One-line diagnostic for a failed command or evaluation.
///
/// Evaluation errors already carry their kind (`NameError: ...`); anything
/// else is prefixed with `Error:` and shows its context chain.
pub fn render_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<EvaluationError>() {
        Some(eval) => eval.to_string(),
        None => format!("Error: {err:#}"),
    }
}

/// Bold heading when color is on.
pub fn heading(text: &str, color: bool) -> String {
    if color {
        format!("{BOLD}{text}{RESET}")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clip_keeps_short_values() {
        assert_eq!(view_clip(&json!(5)), "5");
        assert_eq!(view_clip(&json!({"a": 1})), "{\"a\":1}");
    }

    #[test]
    fn clip_summarises_long_values() {
        let obj = json!({"alpha": 1, "beta": 2, "gamma": 3, "delta": 4});
        assert_eq!(view_clip(&obj), "{...4 keys}");
        let arr = json!(["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc"]);
        assert_eq!(view_clip(&arr), "[...3 items]");
        let long = json!("x".repeat(50));
        let clipped = view_clip(&long);
        assert!(clipped.ends_with("..."));
        assert_eq!(clipped.chars().count(), CLIP_WIDTH);
    }

    #[test]
    fn result_without_color() {
        assert_eq!(render_result(&json!(3), false), "=> 3");
        assert_eq!(render_result(&json!([1]), false), "=> [\n  1\n]");
    }

    #[test]
    fn result_with_color_is_wrapped() {
        let s = render_result(&json!("hi"), true);
        assert!(s.starts_with("=> \x1b[32m"));
        assert!(s.ends_with(RESET));
    }

    #[test]
    fn errors_keep_their_kind() {
        let eval = anyhow::Error::new(EvaluationError::Name("foo".into()));
        assert_eq!(
            render_error(&eval),
            "NameError: undefined local variable or key `foo`"
        );
        let other = anyhow::anyhow!("boom").context("ls");
        assert_eq!(render_error(&other), "Error: ls: boom");
    }

    #[test]
    fn heading_respects_color() {
        assert_eq!(heading("Status:", false), "Status:");
        assert_eq!(heading("Status:", true), "\x1b[1mStatus:\x1b[0m");
    }
}
