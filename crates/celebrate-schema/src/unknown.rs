//! Undeclared properties.
//!
//! An object schema declares its keys through `properties` and
//! `patternProperties`. Anything else is unknown and is either stripped
//! (`strip_unknown`) or reported (`allow_unknown` off).
//!
//! Objects whose schema declares neither keyword are left alone, as are
//! schemas that already constrain `additionalProperties`.
//!
//! `patternProperties` keys are regular expressions, compiled once per schema
//! into [`PropertyPatterns`].

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Compiled `patternProperties` keys of a schema, nested schemas included.
#[derive(Debug, Clone, Default)]
pub struct PropertyPatterns {
    compiled: HashMap<String, Regex>,
}

impl PropertyPatterns {
    /// Compiles every `patternProperties` key found in `schema`.
    pub fn compile(schema: &Value) -> Result<Self, regex::Error> {
        let mut compiled = HashMap::new();
        gather(schema, &mut compiled)?;
        Ok(Self { compiled })
    }

    /// Returns true if `key` matches the compiled `pattern`.
    pub fn is_match(&self, pattern: &str, key: &str) -> bool {
        self.compiled.get(pattern).is_some_and(|regex| regex.is_match(key))
    }
}

fn gather(schema: &Value, out: &mut HashMap<String, Regex>) -> Result<(), regex::Error> {
    match schema {
        Value::Object(map) => {
            if let Some(Value::Object(patterns)) = map.get("patternProperties") {
                for pattern in patterns.keys() {
                    if !out.contains_key(pattern) {
                        out.insert(pattern.clone(), Regex::new(pattern)?);
                    }
                }
            }
            map.values().try_for_each(|child| gather(child, out))
        }
        Value::Array(items) => items.iter().try_for_each(|child| gather(child, out)),
        _ => Ok(()),
    }
}

/// Removes unknown properties in place. Returns true if anything was removed.
pub fn strip_unknown(schema: &Value, patterns: &PropertyPatterns, value: &mut Value) -> bool {
    let (Value::Object(schema), Value::Object(map)) = (schema, value) else {
        return false;
    };

    let mut changed = false;
    if let Some(declared) = Declared::of(schema, patterns) {
        let before = map.len();
        map.retain(|key, _| declared.allows(key));
        changed = map.len() != before;
    }
    for (key, child) in map.iter_mut() {
        if let Some(child_schema) = property_schema(schema, key) {
            changed |= strip_unknown(child_schema, patterns, child);
        }
    }
    changed
}

/// Returns the paths of unknown properties, in document order.
pub fn unknown_paths(schema: &Value, patterns: &PropertyPatterns, value: &Value) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    collect(schema, patterns, value, &mut Vec::new(), &mut paths);
    paths
}

fn collect(
    schema: &Value,
    patterns: &PropertyPatterns,
    value: &Value,
    prefix: &mut Vec<String>,
    out: &mut Vec<Vec<String>>,
) {
    let (Value::Object(schema), Value::Object(map)) = (schema, value) else {
        return;
    };

    let declared = Declared::of(schema, patterns);
    for (key, child) in map {
        prefix.push(key.clone());
        match &declared {
            Some(declared) if !declared.allows(key) => out.push(prefix.clone()),
            _ => {
                if let Some(child_schema) = property_schema(schema, key) {
                    collect(child_schema, patterns, child, prefix, out);
                }
            }
        }
        prefix.pop();
    }
}

fn property_schema<'a>(schema: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .and_then(|properties| properties.get(key))
}

/// The keys an object schema declares.
struct Declared<'a> {
    properties: Option<&'a Map<String, Value>>,
    patterns: Vec<&'a str>,
    compiled: &'a PropertyPatterns,
}

impl<'a> Declared<'a> {
    fn of(schema: &'a Map<String, Value>, compiled: &'a PropertyPatterns) -> Option<Self> {
        if schema.contains_key("additionalProperties") {
            return None;
        }
        let properties = schema.get("properties").and_then(Value::as_object);
        let patterns: Vec<&str> = schema
            .get("patternProperties")
            .and_then(Value::as_object)
            .map(|p| p.keys().map(String::as_str).collect())
            .unwrap_or_default();
        if properties.is_none() && patterns.is_empty() {
            return None;
        }
        Some(Self {
            properties,
            patterns,
            compiled,
        })
    }

    fn allows(&self, key: &str) -> bool {
        self.properties.is_some_and(|p| p.contains_key(key))
            || self.patterns.iter().any(|pattern| self.compiled.is_match(pattern, key))
    }
}
