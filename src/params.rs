/// Parameter type coercion and escaping for bound values.
///
/// The type -> handler table is passed in at construction; `Default` gives
/// the standard one.
use std::collections::HashMap;

use crate::core::{CompatError, Value};

/// Declared type of a bound parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParamType {
    Bool,
    Int,
    Null,
    #[default]
    Str,
    Lob,
}

/// Coercion applied to a value of a given `ParamType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamHandler {
    Boolean,
    Integer,
    Null,
    String,
}

const ESCAPES: [(char, &str); 6] = [
    ('\\', "\\\\"),
    ('\0', "\\0"),
    ('\n', "\\n"),
    ('\r', "\\r"),
    ('\'', "''"),
    ('\x1a', "\\Z"),
];

#[derive(Debug, Clone)]
pub struct ParamProcessor {
    handlers: HashMap<ParamType, ParamHandler>,
}

impl Default for ParamProcessor {
    fn default() -> Self {
        Self::new(HashMap::from([
            (ParamType::Bool, ParamHandler::Boolean),
            (ParamType::Int, ParamHandler::Integer),
            (ParamType::Null, ParamHandler::Null),
            (ParamType::Str, ParamHandler::String),
            (ParamType::Lob, ParamHandler::String),
        ]))
    }
}

impl ParamProcessor {
    #[must_use]
    pub const fn new(handlers: HashMap<ParamType, ParamHandler>) -> Self {
        Self { handlers }
    }

    fn handler(&self, param_type: ParamType) -> Result<ParamHandler, CompatError> {
        self.handlers
            .get(&param_type)
            .copied()
            .ok_or_else(|| CompatError::UnsupportedParamType(format!("{param_type:?}")))
    }

    /// Coerces `value` to the declared type.
    pub fn process(&self, value: &Value, param_type: ParamType) -> Result<Value, CompatError> {
        Ok(match self.handler(param_type)? {
            ParamHandler::Boolean => Value::Boolean(to_bool(value)),
            ParamHandler::Integer => Value::Integer(to_int(value)),
            ParamHandler::Null => Value::Null,
            ParamHandler::String => Value::Text(to_string(value)),
        })
    }

    /// Like `process`, but `Str` values are also escaped for inlining into
    /// a single-quoted SQL literal.
    pub fn process_escaped(&self, value: &Value, param_type: ParamType) -> Result<Value, CompatError> {
        if param_type != ParamType::Str {
            return self.process(value, param_type);
        }
        match self.handler(param_type)? {
            ParamHandler::String => Ok(Value::Text(escape(&to_string(value)))),
            _ => self.process(value, param_type),
        }
    }

    /// Escaped and wrapped in single quotes.
    pub fn quote(&self, value: &str) -> Result<String, CompatError> {
        let escaped = self.process_escaped(&Value::from(value), ParamType::Str)?;
        Ok(format!("'{escaped}'"))
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match ESCAPES.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => escaped.push_str(to),
            None => escaped.push(c),
        }
    }
    escaped
}

fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Real(r) => *r != 0.0,
        Value::Text(s) => !(s.is_empty() || s == "0"),
        Value::Timestamp(_) => true,
    }
}

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Boolean(b) => i64::from(*b),
        Value::Integer(i) => *i,
        Value::Real(r) => r.trunc() as i64,
        Value::Text(s) => leading_int(s),
        Value::Timestamp(ts) => ts.and_utc().timestamp(),
    }
}

/// Integer prefix of `text` (`"42abc"` -> 42); 0 when there is none.
fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let sign_len = usize::from(text.starts_with(['-', '+']));
    let digits = text[sign_len..]
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    text[..sign_len + digits].parse().unwrap_or(0)
}

fn to_string(value: &Value) -> String {
    match value {
        Value::Null | Value::Boolean(false) => String::new(),
        Value::Boolean(true) => "1".to_string(),
        other => other.to_string(),
    }
}
