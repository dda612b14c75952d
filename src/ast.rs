/// A single `name: value` or `name { ... }` entry of a text-format message.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unescaped contents of one or more adjacent quoted literals.
    Str(String),
    /// Bare word: enum values, `true`, `false`, `inf`.
    Ident(String),
    /// Numeric literal kept verbatim (`42`, `-1.5e3`, `0x1f`).
    Number(String),
    Message(Vec<Field>),
    List(Vec<Value>),
}

impl Field {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Ident(_) => "identifier",
            Value::Number(_) => "number",
            Value::Message(_) => "message",
            Value::List(_) => "list",
        }
    }
}
