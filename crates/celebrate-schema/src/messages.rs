//! Violation rendering.

use celebrate_core::envelope::html_escape;
use celebrate_core::Violation;
use jsonschema::error::ValidationErrorKind;

/// Converts a JSON Schema error into a violation.
///
/// The path is the instance path, with the missing property appended for
/// `required` failures. The kind is the failing keyword.
pub fn violation(error: &jsonschema::ValidationError<'_>) -> Violation {
    let mut path = pointer_segments(&error.instance_path.to_string());
    if let ValidationErrorKind::Required { property } = &error.kind {
        match property.as_str() {
            Some(name) => path.push(name.to_string()),
            None => path.push(property.to_string()),
        }
    }

    let kind = keyword(&error.schema_path.to_string());
    let message = render(&path, &kind, &error.to_string());
    Violation::new(path, message, kind)
}

/// Builds a violation for an undeclared property.
pub fn not_allowed(path: Vec<String>) -> Violation {
    let label = path.last().cloned().unwrap_or_default();
    Violation::new(path, format!("\"{label}\" is not allowed"), "additionalProperties")
}

/// HTML-escapes the message of every violation.
pub fn escape_all(violations: &mut [Violation]) {
    for violation in violations {
        violation.message = html_escape(&violation.message);
    }
}

fn render(path: &[String], kind: &str, detail: &str) -> String {
    if path.is_empty() || kind == "required" {
        detail.to_string()
    } else {
        format!("\"{}\" {}", path.join("."), detail)
    }
}

/// Splits a JSON pointer into unescaped reference tokens.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Returns the last keyword of a schema path (`/properties/a/pattern` → `pattern`).
fn keyword(schema_path: &str) -> String {
    schema_path
        .rsplit('/')
        .find(|token| !token.is_empty() && token.parse::<usize>().is_err())
        .unwrap_or("schema")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointer_segments() {
        assert!(pointer_segments("").is_empty());
        assert_eq!(pointer_segments("/address/zip"), vec!["address", "zip"]);
        assert_eq!(pointer_segments("/a~1b/c~0d"), vec!["a/b", "c~d"]);
    }

    #[test]
    fn test_keyword() {
        assert_eq!(keyword("/properties/accept/pattern"), "pattern");
        assert_eq!(keyword("/items/0"), "items");
        assert_eq!(keyword(""), "schema");
    }

    #[test]
    fn test_required_violation() {
        let validator = jsonschema::validator_for(&json!({ "required": ["first"] })).unwrap();
        let value = json!({});
        let error = validator.iter_errors(&value).next().unwrap();

        let v = violation(&error);
        assert_eq!(v.path, vec!["first"]);
        assert_eq!(v.kind, "required");
        assert!(v.message.contains("first"));
    }

    #[test]
    fn test_pattern_violation_is_labelled() {
        let schema = json!({ "properties": { "accept": { "type": "string", "pattern": "xml" } } });
        let validator = jsonschema::validator_for(&schema).unwrap();
        let value = json!({ "accept": "application/json" });
        let error = validator.iter_errors(&value).next().unwrap();

        let v = violation(&error);
        assert_eq!(v.dotted_path(), "accept");
        assert_eq!(v.kind, "pattern");
        assert!(v.message.starts_with("\"accept\" "));
    }

    #[test]
    fn test_escape_all() {
        let mut violations = vec![not_allowed(vec!["<b>".to_string()])];
        escape_all(&mut violations);
        assert_eq!(violations[0].message, "&quot;&lt;b&gt;&quot; is not allowed");
    }
}
