use crate::ast::{Field, Value};
use crate::flag::{FlagPermission, FlagState, ParsedFlagRecord};
use crate::parse::parse_textproto;

/// Top-level repeated field of an aconfig `parsed_flags` document.
pub const PARSED_FLAG_FIELD: &str = "parsed_flag";

/// Parses an `aconfig_flags.textproto` document into flag records, in
/// document order. Unknown fields are skipped at every level.
pub fn parse_flags(content: &str) -> Result<Vec<ParsedFlagRecord>, String> {
    let fields = parse_textproto(content)?;
    let mut records = Vec::new();
    for field in fields.iter().filter(|f| f.name == PARSED_FLAG_FIELD) {
        match &field.value {
            Value::Message(body) => records.push(record_from_message(body)?),
            Value::List(items) => {
                for item in items {
                    let Value::Message(body) = item else {
                        return Err(format!(
                            "{} entries must be messages, found {}",
                            PARSED_FLAG_FIELD,
                            item.kind()
                        ));
                    };
                    records.push(record_from_message(body)?);
                }
            }
            other => {
                return Err(format!(
                    "{} must be a message, found {}",
                    PARSED_FLAG_FIELD,
                    other.kind()
                ))
            }
        }
    }
    Ok(records)
}

// Missing fields take their proto2 defaults: empty strings, and the first
// declared enum value (ENABLED, READ_ONLY).
fn record_from_message(body: &[Field]) -> Result<ParsedFlagRecord, String> {
    let mut namespace = None;
    let mut package = None;
    let mut name = None;
    let mut state = None;
    let mut permission = None;

    for field in body {
        match field.name.as_str() {
            "namespace" => set_once(&mut namespace, field, string_value(field)?)?,
            "package" => set_once(&mut package, field, string_value(field)?)?,
            "name" => set_once(&mut name, field, string_value(field)?)?,
            "state" => {
                let raw = enum_value(field)?;
                let parsed = FlagState::from_textproto(raw)
                    .ok_or_else(|| format!("unknown flag state `{}`", raw))?;
                set_once(&mut state, field, parsed)?
            }
            "permission" => {
                let raw = enum_value(field)?;
                let parsed = FlagPermission::from_textproto(raw)
                    .ok_or_else(|| format!("unknown flag permission `{}`", raw))?;
                set_once(&mut permission, field, parsed)?
            }
            _ => {}
        }
    }

    Ok(ParsedFlagRecord {
        namespace: namespace.unwrap_or_default(),
        package: package.unwrap_or_default(),
        name: name.unwrap_or_default(),
        state: state.unwrap_or(FlagState::Enabled),
        permission: permission.unwrap_or(FlagPermission::ReadOnly),
    })
}

fn set_once<T>(slot: &mut Option<T>, field: &Field, value: T) -> Result<(), String> {
    if slot.is_some() {
        return Err(format!("field `{}` is set more than once", field.name));
    }
    *slot = Some(value);
    Ok(())
}

fn string_value(field: &Field) -> Result<String, String> {
    match &field.value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(format!(
            "field `{}` must be a string, found {}",
            field.name,
            other.kind()
        )),
    }
}

fn enum_value(field: &Field) -> Result<&str, String> {
    match &field.value {
        Value::Ident(v) | Value::Number(v) => Ok(v.as_str()),
        other => Err(format!(
            "field `{}` must be an enum value, found {}",
            field.name,
            other.kind()
        )),
    }
}
