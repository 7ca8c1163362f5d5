// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `${dotted.path}` substitution over a JSON environment.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\s*\}").unwrap());

/// Replaces every placeholder that resolves in `env`.
///
/// Strings are inserted raw, numbers and booleans in their display form,
/// arrays and objects as compact JSON. Missing paths and `null` leave the
/// placeholder untouched.
pub fn render(template: &str, env: &Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            match lookup(env, &caps[1]) {
                Some(value) => value_text(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Walks `path` through nested objects. Numeric segments index arrays.
pub fn lookup<'a>(env: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = env;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!current.is_null()).then_some(current)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn substitutes_nested_paths() {
        let env = json!({"user": {"mbti": "ENFP", "cycle_index": 28}});
        assert_eq!(
            render("${user.mbti} / ${ user.cycle_index }", &env),
            "ENFP / 28"
        );
    }

    #[test]
    fn unresolved_placeholders_stay_literal() {
        let env = json!({"user": {"mbti": "ENFP", "gender": null}});
        assert_eq!(
            render("${partner.mbti} ${user.gender} ${user.mbti.x}", &env),
            "${partner.mbti} ${user.gender} ${user.mbti.x}"
        );
    }

    #[test]
    fn arrays_and_objects() {
        let env = json!({"list": ["a", "b"], "obj": {"k": 1}});
        assert_eq!(render("${list.1}", &env), "b");
        assert_eq!(render("${list}", &env), r#"["a","b"]"#);
        assert_eq!(render("${obj}", &env), r#"{"k":1}"#);
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let text = "料金は$5です {user}";
        assert_eq!(render(text, &json!({})), text);
    }

    #[test]
    fn substituted_values_are_not_rendered_again() {
        let env = json!({"a": "${b}", "b": "x"});
        assert_eq!(render("${a}", &env), "${b}");
    }
}
