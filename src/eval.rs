//! Expression evaluation against a session receiver.
//!
//! The engine only sees the [`Evaluator`] trait. [`JsonEvaluator`] is the
//! implementation the shell ships with: it navigates JSON documents.
//!
//! Accepted source:
//! - nothing at all, which is `null`
//! - any JSON literal
//! - `self`, `_` (the last result), a local variable, or a key of the receiver
//! - paths built from those: `a.b`, `a.0`, `a[1]`, `a[-1]`, `a["key with spaces"]`
//! - `name = <expression>`, which stores a local and yields the value

use crate::error::EvaluationError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Evaluates source text in the scope of a receiver.
pub trait Evaluator {
    fn evaluate(&mut self, receiver: &Value, source: &str) -> Result<Value, EvaluationError>;

    /// Bind a local variable, e.g. `_` after every successful evaluation.
    fn set_local(&mut self, name: &str, value: Value);

    /// Local variables, sorted by name.
    fn locals(&self) -> Vec<(String, Value)>;
}

/// Evaluator for JSON receivers with session-wide locals.
#[derive(Debug, Default)]
pub struct JsonEvaluator {
    locals: BTreeMap<String, Value>,
}

impl JsonEvaluator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Evaluator for JsonEvaluator {
    fn evaluate(&mut self, receiver: &Value, source: &str) -> Result<Value, EvaluationError> {
        let source = source.trim();
        if source.is_empty() {
            return Ok(Value::Null);
        }
        check_balanced(source)?;

        if let Some((name, expr)) = split_assignment(source) {
            let value = self.evaluate(receiver, expr)?;
            self.locals.insert(name.to_string(), value.clone());
            return Ok(value);
        }

        if let Ok(literal) = serde_json::from_str::<Value>(source) {
            return Ok(literal);
        }

        PathWalker::new(source, receiver, &self.locals).walk()
    }

    fn set_local(&mut self, name: &str, value: Value) {
        self.locals.insert(name.to_string(), value);
    }

    fn locals(&self) -> Vec<(String, Value)> {
        self.locals
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Split `name = expr` into its parts. `==` is not an assignment.
fn split_assignment(source: &str) -> Option<(&str, &str)> {
    let (name, expr) = source.split_once('=')?;
    let name = name.trim_end();
    let mut chars = name.chars();
    let valid_name = chars.next().is_some_and(is_ident_start)
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if !valid_name || expr.starts_with('=') || expr.trim().is_empty() {
        return None;
    }
    Some((name, expr))
}

/// Report unterminated strings and open brackets as incomplete input.
fn check_balanced(source: &str) -> Result<(), EvaluationError> {
    let mut open = Vec::new();
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => loop {
                match chars.next() {
                    None => return Err(EvaluationError::Incomplete),
                    Some('\\') => {
                        chars.next();
                    }
                    Some('"') => break,
                    Some(_) => {}
                }
            },
            '[' => open.push(']'),
            '{' => open.push('}'),
            ']' | '}' => {
                if open.pop() != Some(c) {
                    return Err(EvaluationError::Syntax(format!("unexpected `{c}`")));
                }
            }
            _ => {}
        }
    }
    if open.is_empty() {
        Ok(())
    } else {
        Err(EvaluationError::Incomplete)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-' | '?' | '!')
}

struct PathWalker<'a> {
    input: Vec<char>,
    pos: usize,
    receiver: &'a Value,
    locals: &'a BTreeMap<String, Value>,
}

impl<'a> PathWalker<'a> {
    fn new(source: &str, receiver: &'a Value, locals: &'a BTreeMap<String, Value>) -> Self {
        Self {
            input: source.chars().collect(),
            pos: 0,
            receiver,
            locals,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_blanks(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> EvaluationError {
        match self.peek() {
            Some(c) => EvaluationError::Syntax(format!("unexpected `{c}`")),
            None => EvaluationError::Incomplete,
        }
    }

    fn ident(&mut self) -> Result<String, EvaluationError> {
        match self.peek() {
            Some(c) if is_ident_start(c) || c.is_ascii_digit() => {}
            _ => return Err(self.unexpected()),
        }
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        Ok(self.input[start..self.pos].iter().collect())
    }

    fn walk(mut self) -> Result<Value, EvaluationError> {
        if !self.peek().is_some_and(is_ident_start) {
            return Err(self.unexpected());
        }
        let root = self.ident()?;
        let mut current = self.resolve_root(&root)?;

        loop {
            self.skip_blanks();
            match self.bump() {
                None => return Ok(current),
                Some('.') => {
                    self.skip_blanks();
                    let key = self.ident()?;
                    current = member(&current, &key)?;
                }
                Some('[') => {
                    self.skip_blanks();
                    let selector = self.bracket_selector()?;
                    current = match selector {
                        Selector::Key(key) => member(&current, &key)?,
                        Selector::Index(i) => element(&current, i)?,
                    };
                }
                Some(c) => return Err(EvaluationError::Syntax(format!("unexpected `{c}`"))),
            }
        }
    }

    fn resolve_root(&self, name: &str) -> Result<Value, EvaluationError> {
        match name {
            "self" => Ok(self.receiver.clone()),
            "_" => Ok(self.locals.get("_").cloned().unwrap_or(Value::Null)),
            _ => self
                .locals
                .get(name)
                .or_else(|| self.receiver.as_object().and_then(|o| o.get(name)))
                .cloned()
                .ok_or_else(|| EvaluationError::Name(name.to_string())),
        }
    }

    fn bracket_selector(&mut self) -> Result<Selector, EvaluationError> {
        let start = self.pos;
        if self.peek() == Some('"') {
            self.bump();
            loop {
                match self.bump() {
                    None => return Err(EvaluationError::Incomplete),
                    Some('\\') => {
                        self.bump();
                    }
                    Some('"') => break,
                    Some(_) => {}
                }
            }
            let literal: String = self.input[start..self.pos].iter().collect();
            let key: String = serde_json::from_str(&literal)
                .map_err(|e| EvaluationError::Syntax(e.to_string()))?;
            self.close_bracket()?;
            return Ok(Selector::Key(key));
        }

        while self.peek().is_some_and(|c| c != ']') {
            self.pos += 1;
        }
        let raw: String = self.input[start..self.pos].iter().collect();
        self.close_bracket()?;
        raw.trim()
            .parse::<i64>()
            .map(Selector::Index)
            .map_err(|_| EvaluationError::Syntax(format!("invalid index `{}`", raw.trim())))
    }

    fn close_bracket(&mut self) -> Result<(), EvaluationError> {
        self.skip_blanks();
        match self.bump() {
            Some(']') => Ok(()),
            Some(c) => Err(EvaluationError::Syntax(format!("expected `]`, found `{c}`"))),
            None => Err(EvaluationError::Incomplete),
        }
    }
}

enum Selector {
    Key(String),
    Index(i64),
}

fn member(value: &Value, key: &str) -> Result<Value, EvaluationError> {
    match value {
        Value::Object(map) => map
            .get(key)
            .cloned()
            .ok_or_else(|| EvaluationError::Index(format!("no key `{key}`"))),
        Value::Array(_) => match key.parse::<i64>() {
            Ok(i) => element(value, i),
            Err(_) => Err(EvaluationError::Type(format!(
                "cannot read `{key}` of an array"
            ))),
        },
        other => Err(EvaluationError::Type(format!(
            "cannot read `{key}` of {}",
            type_name(other)
        ))),
    }
}

fn element(value: &Value, index: i64) -> Result<Value, EvaluationError> {
    let Value::Array(items) = value else {
        return Err(EvaluationError::Type(format!(
            "cannot index {}",
            type_name(value)
        )));
    };
    let len = items.len() as i64;
    let pos = if index < 0 { len + index } else { index };
    usize::try_from(pos)
        .ok()
        .and_then(|p| items.get(p))
        .cloned()
        .ok_or_else(|| EvaluationError::Index(format!("index {index} out of range for length {len}")))
}

/// Short JSON type name used in diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "name": "root",
            "users": [
                {"id": 1, "tags": ["a", "b"]},
                {"id": 2, "tags": []}
            ],
            "odd key": {"x": true}
        })
    }

    fn eval(src: &str) -> Result<Value, EvaluationError> {
        JsonEvaluator::new().evaluate(&doc(), src)
    }

    #[test]
    fn empty_source_is_null() {
        assert_eq!(eval(""), Ok(Value::Null));
        assert_eq!(eval("   "), Ok(Value::Null));
    }

    #[test]
    fn literals() {
        assert_eq!(eval("42"), Ok(json!(42)));
        assert_eq!(eval("\"all done\""), Ok(json!("all done")));
        assert_eq!(eval("[1, {\"a\": null}]"), Ok(json!([1, {"a": null}])));
        assert_eq!(eval("true"), Ok(json!(true)));
    }

    #[test]
    fn paths() {
        assert_eq!(eval("self.name"), Ok(json!("root")));
        assert_eq!(eval("name"), Ok(json!("root")));
        assert_eq!(eval("users[1].id"), Ok(json!(2)));
        assert_eq!(eval("users.0.tags[-1]"), Ok(json!("b")));
        assert_eq!(eval("self[\"odd key\"].x"), Ok(json!(true)));
        assert_eq!(eval("users [ 0 ] . id"), Ok(json!(1)));
    }

    #[test]
    fn lookup_failures() {
        assert_eq!(eval("frobnicate"), Err(EvaluationError::Name("frobnicate".into())));
        assert!(matches!(eval("users[5]"), Err(EvaluationError::Index(_))));
        assert!(matches!(eval("name.first"), Err(EvaluationError::Type(_))));
        assert!(matches!(eval("users.x"), Err(EvaluationError::Type(_))));
        assert!(matches!(eval("self.nope"), Err(EvaluationError::Index(_))));
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(eval("users]"), Err(EvaluationError::Syntax(_))));
        assert!(matches!(eval("users[x]"), Err(EvaluationError::Syntax(_))));
        assert!(matches!(eval("1 +"), Err(EvaluationError::Syntax(_))));
        assert!(matches!(eval("users..id"), Err(EvaluationError::Syntax(_))));
    }

    #[test]
    fn incomplete_input() {
        assert_eq!(eval("[1, 2"), Err(EvaluationError::Incomplete));
        assert_eq!(eval("{\"a\":"), Err(EvaluationError::Incomplete));
        assert_eq!(eval("\"open"), Err(EvaluationError::Incomplete));
        assert_eq!(eval("users."), Err(EvaluationError::Incomplete));
    }

    #[test]
    fn multi_line_literal() {
        assert_eq!(eval("[1,\n2\n]"), Ok(json!([1, 2])));
    }

    #[test]
    fn assignment_and_locals() {
        let mut ev = JsonEvaluator::new();
        let root = doc();
        assert_eq!(ev.evaluate(&root, "x = users[0].id"), Ok(json!(1)));
        assert_eq!(ev.evaluate(&root, "x"), Ok(json!(1)));
        ev.set_local("_", json!("last"));
        assert_eq!(ev.evaluate(&root, "_"), Ok(json!("last")));
        let names: Vec<String> = ev.locals().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["_", "x"]);
    }

    #[test]
    fn locals_shadow_receiver_keys() {
        let mut ev = JsonEvaluator::new();
        let root = doc();
        ev.set_local("name", json!("local"));
        assert_eq!(ev.evaluate(&root, "name"), Ok(json!("local")));
        assert_eq!(ev.evaluate(&root, "self.name"), Ok(json!("root")));
    }

    #[test]
    fn underscore_defaults_to_null() {
        assert_eq!(eval("_"), Ok(Value::Null));
    }
}
