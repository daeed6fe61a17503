//! Accessor-path evaluation over JSON values
//!
//! `json-extract` pipes a JSON document through an accessor expression rooted
//! at `o`, e.g. `o.items[0].name` or `o.results.length`. The grammar is the
//! set of shapes workflow steps actually write: member access, numeric
//! indexing, quoted-key indexing, and a terminal `length`.
//!
//! The contract is deliberately forgiving: any parse or lookup failure yields
//! no output rather than an error, so shell pipelines can treat "nothing
//! printed" as "value absent".

use serde_json::Value;

/// One step of an accessor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Accessor {
    /// `.name` or `["name"]`
    Key(String),
    /// `[3]`
    Index(usize),
    /// `.length`: array/string element count or object member count
    Length,
}

/// Parse an expression like `o.items[0]["the key"].length` into accessors.
/// Returns `None` on any deviation from the grammar.
fn parse_expression(expr: &str) -> Option<Vec<Accessor>> {
    let expr = expr.trim();
    let rest = expr.strip_prefix('o')?;

    let mut accessors = Vec::new();
    let mut chars = rest.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_alphanumeric() || n == '_' || n == '$' {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return None;
                }
                if name == "length" {
                    accessors.push(Accessor::Length);
                } else {
                    accessors.push(Accessor::Key(name));
                }
            }
            '[' => {
                let quote = match chars.peek() {
                    Some('"') => {
                        chars.next();
                        Some('"')
                    }
                    Some('\'') => {
                        chars.next();
                        Some('\'')
                    }
                    _ => None,
                };
                let mut token = String::new();
                match quote {
                    Some(q) => {
                        loop {
                            let n = chars.next()?;
                            if n == q {
                                break;
                            }
                            token.push(n);
                        }
                        if chars.next() != Some(']') {
                            return None;
                        }
                        accessors.push(Accessor::Key(token));
                    }
                    None => {
                        while let Some(&n) = chars.peek() {
                            if n == ']' {
                                break;
                            }
                            token.push(n);
                            chars.next();
                        }
                        if chars.next() != Some(']') {
                            return None;
                        }
                        let index: usize = token.trim().parse().ok()?;
                        accessors.push(Accessor::Index(index));
                    }
                }
            }
            _ => return None,
        }
    }

    Some(accessors)
}

/// Walk the accessor chain over a value. `None` means "no result".
fn walk(value: &Value, accessors: &[Accessor]) -> Option<Value> {
    let mut current = value.clone();

    for accessor in accessors {
        current = match accessor {
            Accessor::Key(k) => current.get(k.as_str())?.clone(),
            Accessor::Index(i) => current.get(i)?.clone(),
            Accessor::Length => {
                let len = match &current {
                    Value::Array(a) => a.len(),
                    Value::String(s) => s.chars().count(),
                    Value::Object(o) => o.len(),
                    _ => return None,
                };
                Value::from(len)
            }
        };
    }

    Some(current)
}

/// Evaluate an accessor expression against a JSON document.
///
/// Returns the rendered result, or `None` when the document does not parse,
/// the expression is malformed, or the result is null/empty. Scalars render
/// raw; arrays and objects render as compact JSON.
pub fn extract(json_input: &str, expression: &str) -> Option<String> {
    let value: Value = serde_json::from_str(json_input).ok()?;
    let accessors = parse_expression(expression)?;
    let result = walk(&value, &accessors)?;

    let rendered = match result {
        Value::Null => return None,
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        composite => composite.to_string(),
    };

    if rendered.is_empty() {
        None
    } else {
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const DOC: &str = r#"{
        "query": "shoes",
        "count": 3,
        "ok": true,
        "empty": "",
        "nothing": null,
        "items": [{"name": "first"}, {"name": "second"}],
        "odd keys": {"a b": 1}
    }"#;

    #[rstest]
    #[case("o.query", Some("shoes"))]
    #[case("o.count", Some("3"))]
    #[case("o.ok", Some("true"))]
    #[case("o.items[1].name", Some("second"))]
    #[case("o.items.length", Some("2"))]
    #[case("o.query.length", Some("5"))]
    #[case("o[\"odd keys\"][\"a b\"]", Some("1"))]
    #[case("o['odd keys']['a b']", Some("1"))]
    fn test_extract_values(#[case] expr: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract(DOC, expr).as_deref(), expected);
    }

    #[rstest]
    #[case("o.missing")]
    #[case("o.items[9]")]
    #[case("o.empty")]
    #[case("o.nothing")]
    #[case("o.count.length")]
    fn test_absent_results_are_silent(#[case] expr: &str) {
        assert_eq!(extract(DOC, expr), None);
    }

    #[rstest]
    #[case("items[0]")] // not rooted at o
    #[case("o..name")]
    #[case("o.items[abc]")]
    #[case("o.items[0")]
    #[case("o.items[\"unterminated]")]
    #[case("o + 1")]
    fn test_malformed_expressions_are_silent(#[case] expr: &str) {
        assert_eq!(extract(DOC, expr), None);
    }

    #[test]
    fn test_bare_root_returns_whole_document() {
        let out = extract(r#"{"a":1}"#, "o").unwrap();
        assert_eq!(out, r#"{"a":1}"#);
    }

    #[test]
    fn test_composite_result_renders_compact_json() {
        let out = extract(DOC, "o.items[0]").unwrap();
        assert_eq!(out, r#"{"name":"first"}"#);
    }

    #[test]
    fn test_invalid_json_is_silent() {
        assert_eq!(extract("{broken", "o.query"), None);
    }

    #[test]
    fn test_object_length_counts_members() {
        assert_eq!(extract(DOC, "o['odd keys'].length").as_deref(), Some("1"));
    }
}
