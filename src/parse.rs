use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, tag, take_while},
    character::complete::{alpha1, alphanumeric1, anychar, char, multispace1, not_line_ending, satisfy},
    combinator::{map, map_res, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::{many0, many0_count, many1, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use crate::ast::{Field, Value};

// Parses and throws away: # comment EOL
fn parse_comment(i: &str) -> IResult<&str, ()> {
    value((), pair(char('#'), not_line_ending))(i)
}

/// Skips any run of whitespace and comments.
fn sp(i: &str) -> IResult<&str, ()> {
    value((), many0_count(alt((value((), multispace1), parse_comment))))(i)
}

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace and comments, returning the output of `inner`.
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(sp, inner, sp)
}

fn identifier(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(i)
}

/// Plain field names plus `[extension.name]` / `[type.googleapis.com/Any]` forms.
fn field_name(i: &str) -> IResult<&str, &str> {
    alt((
        identifier,
        recognize(delimited(char('['), is_not("]"), char(']'))),
    ))(i)
}

fn quoted(i: &str) -> IResult<&str, String> {
    let double = delimited(
        char('"'),
        opt(escaped(is_not("\"\\\n"), '\\', anychar)),
        char('"'),
    );
    let single = delimited(
        char('\''),
        opt(escaped(is_not("'\\\n"), '\\', anychar)),
        char('\''),
    );
    map_res(alt((double, single)), |raw: Option<&str>| {
        unescape(raw.unwrap_or(""))
    })(i)
}

/// Adjacent literals concatenate: `"abc" 'def'` is `"abcdef"`.
fn parse_string(i: &str) -> IResult<&str, Value> {
    map(many1(terminated(quoted, sp)), |parts| Value::Str(parts.concat()))(i)
}

fn parse_number(i: &str) -> IResult<&str, Value> {
    let digits = recognize(pair(
        satisfy(|c| c.is_ascii_digit() || c == '.'),
        take_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-')),
    ));
    map(
        recognize(pair(opt(char('-')), alt((digits, identifier)))),
        |n: &str| Value::Number(n.to_string()),
    )(i)
}

/// Messages and lists may nest this deep; anything deeper is rejected
/// before it can exhaust the stack.
pub const MAX_NESTING: usize = 100;

fn check_nesting(i: &str, depth: usize) -> Result<(), nom::Err<Error<&str>>> {
    if depth >= MAX_NESTING {
        return Err(nom::Err::Failure(Error::new(i, ErrorKind::TooLarge)));
    }
    Ok(())
}

// `depth` counts the messages and lists enclosing the value being parsed.
fn parse_list(i: &str, depth: usize) -> IResult<&str, Value> {
    let (i, _) = ws(char('['))(i)?;
    check_nesting(i, depth)?;
    map(
        terminated(
            separated_list0(
                ws(char(',')),
                terminated(|i| parse_value(i, depth + 1), sp),
            ),
            char(']'),
        ),
        Value::List,
    )(i)
}

fn message_body(i: &str, depth: usize) -> IResult<&str, Vec<Field>> {
    let (i, open) = ws(alt((char('{'), char('<'))))(i)?;
    check_nesting(i, depth)?;
    let close = if open == '{' { '}' } else { '>' };
    terminated(many0(|i| parse_field(i, depth + 1)), char(close))(i)
}

fn parse_value(i: &str, depth: usize) -> IResult<&str, Value> {
    alt((
        map(|i| message_body(i, depth), Value::Message),
        |i| parse_list(i, depth),
        parse_string,
        map(identifier, |s: &str| Value::Ident(s.to_string())),
        parse_number,
    ))(i)
}

/// One field, including the whitespace and optional `,`/`;` after it.
fn parse_field(i: &str, depth: usize) -> IResult<&str, Field> {
    let (i, name) = terminated(field_name, sp)(i)?;
    let (i, value) = alt((
        preceded(ws(char(':')), |i| parse_value(i, depth)),
        map(|i| message_body(i, depth), Value::Message),
    ))(i)?;
    let (i, _) = pair(sp, opt(terminated(alt((char(','), char(';'))), sp)))(i)?;
    Ok((i, Field::new(name, value)))
}

fn parse_document(i: &str) -> IResult<&str, Vec<Field>> {
    preceded(sp, many0(|i| parse_field(i, 0)))(i)
}

fn line_of(content: &str, rest: &str) -> usize {
    let offset = content.len() - rest.len();
    content[..offset].matches('\n').count() + 1
}

/// Parses a whole text-format document, rejecting anything left unconsumed.
pub fn parse_textproto(content: &str) -> Result<Vec<Field>, String> {
    let (remainder, fields) = parse_document(content).map_err(|e| match e {
        nom::Err::Failure(err) if err.code == ErrorKind::TooLarge => format!(
            "nesting deeper than {} levels at line {}",
            MAX_NESTING,
            line_of(content, err.input)
        ),
        other => format!("{}", other),
    })?;
    if !remainder.is_empty() {
        return Err(format!(
            "unexpected content at line {}: {}",
            line_of(content, remainder),
            remainder.lines().next().unwrap_or("").trim()
        ));
    }
    Ok(fields)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out: Vec<u8> = Vec::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let esc = chars.next().ok_or("dangling escape")?;
        match esc {
            'n' => out.push(b'\n'),
            't' => out.push(b'\t'),
            'r' => out.push(b'\r'),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'v' => out.push(0x0b),
            '\\' | '\'' | '"' | '?' => out.push(esc as u8),
            '0'..='7' => {
                let mut code = esc as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                let byte = u8::try_from(code).map_err(|_| format!("octal escape out of range: {code:o}"))?;
                out.push(byte);
            }
            'x' => {
                let code = take_hex(&mut chars, 2);
                if code.1 == 0 {
                    return Err("`\\x` escape without hex digits".into());
                }
                out.push(code.0 as u8);
            }
            'u' | 'U' => {
                let width = if esc == 'u' { 4 } else { 8 };
                let (code, read) = take_hex(&mut chars, width);
                if read != width {
                    return Err(format!("`\\{esc}` escape needs {width} hex digits"));
                }
                let ch = char::from_u32(code).ok_or(format!("invalid code point U+{code:X}"))?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            other => return Err(format!("invalid escape `\\{other}`")),
        }
    }
    String::from_utf8(out).map_err(|_| "string literal is not valid UTF-8".to_string())
}

/// Reads up to `max` hex digits, returning the value and how many were read.
fn take_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, max: usize) -> (u32, usize) {
    let mut code = 0u32;
    let mut read = 0;
    while read < max {
        match chars.peek().and_then(|c| c.to_digit(16)) {
            Some(d) => {
                code = code * 16 + d;
                chars.next();
                read += 1;
            }
            None => break,
        }
    }
    (code, read)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_fields() {
        let (i, fields) = parse_document("name: \"flag\" state: ENABLED count: -3").unwrap();
        assert_eq!(i, "");
        assert_eq!(
            fields,
            vec![
                Field::new("name", Value::Str("flag".into())),
                Field::new("state", Value::Ident("ENABLED".into())),
                Field::new("count", Value::Number("-3".into())),
            ]
        );
    }

    #[test]
    fn test_parse_nested_message_forms() {
        let content = r#"
outer {
  inner: { a: 1 }
  other < b: 'x' >
}
"#;
        let fields = parse_textproto(content).unwrap();
        assert_eq!(fields.len(), 1);
        let Value::Message(outer) = &fields[0].value else {
            panic!("expected message, got {:?}", fields[0].value);
        };
        assert_eq!(outer[0].name, "inner");
        assert_eq!(
            outer[0].value,
            Value::Message(vec![Field::new("a", Value::Number("1".into()))])
        );
        assert_eq!(
            outer[1].value,
            Value::Message(vec![Field::new("b", Value::Str("x".into()))])
        );
    }

    #[test]
    fn test_comments_and_separators() {
        let content = "# leading comment\na: 1, # trailing\nb: 2;\n";
        let fields = parse_textproto(content).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1], Field::new("b", Value::Number("2".into())));
    }

    #[test]
    fn test_string_concatenation_and_escapes() {
        let (_, v) = parse_string(r#""ab" 'c\'d' "\n\t\x41\101é""#).unwrap();
        assert_eq!(v, Value::Str("abc'd\n\tAAé".into()));

        let (_, v) = parse_string(r#""""#).unwrap();
        assert_eq!(v, Value::Str(String::new()));
    }

    #[test]
    fn test_invalid_escape_is_rejected() {
        assert!(parse_textproto(r#"a: "\q""#).is_err());
    }

    #[test]
    fn test_lists_and_extension_names() {
        let content = r#"tags: ["a", "b"] [com.example.ext] { x: 1.5e-3 } nums: [1, -inf]"#;
        let fields = parse_textproto(content).unwrap();
        assert_eq!(
            fields[0].value,
            Value::List(vec![Value::Str("a".into()), Value::Str("b".into())])
        );
        assert_eq!(fields[1].name, "[com.example.ext]");
        assert_eq!(
            fields[1].value,
            Value::Message(vec![Field::new("x", Value::Number("1.5e-3".into()))])
        );
        assert_eq!(
            fields[2].value,
            Value::List(vec![
                Value::Number("1".into()),
                Value::Number("-inf".into())
            ])
        );
    }

    #[test]
    fn test_unterminated_message_reports_line() {
        let err = parse_textproto("a: 1\nouter {\n  b: 2\n").unwrap_err();
        assert!(err.contains("line 2"), "{err}");
    }

    #[test]
    fn test_missing_value_is_rejected() {
        assert!(parse_textproto("a:").is_err());
        assert!(parse_textproto("a b").is_err());
    }

    #[test]
    fn test_nesting_up_to_limit_is_accepted() {
        let content = format!("{}{}", "a {".repeat(MAX_NESTING), "}".repeat(MAX_NESTING));
        assert_eq!(parse_textproto(&content).unwrap().len(), 1);

        let content = format!("a: {}{}", "[".repeat(MAX_NESTING), "]".repeat(MAX_NESTING));
        assert_eq!(parse_textproto(&content).unwrap().len(), 1);
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let depth = MAX_NESTING + 1;
        let content = format!("{}{}", "a {".repeat(depth), "}".repeat(depth));
        let err = parse_textproto(&content).unwrap_err();
        assert!(err.contains("nesting deeper than 100 levels"), "{err}");

        let content = format!("a: {}{}", "[".repeat(depth), "]".repeat(depth));
        assert!(parse_textproto(&content).is_err());
    }

    #[test]
    fn test_very_deep_nesting_does_not_overflow() {
        let depth = 100_000;
        let content = format!("{}{}", "a <".repeat(depth), ">".repeat(depth));
        assert!(parse_textproto(&content).is_err());

        let content = format!("a: {}", "{ b: ".repeat(depth));
        assert!(parse_textproto(&content).is_err());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse_textproto("  # nothing here\n").unwrap(), vec![]);
    }
}
