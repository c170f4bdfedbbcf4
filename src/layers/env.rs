//! Environment-derived config overrides (`CODEGEN_*`).

use crate::types::ConfigMap;
use serde_json::Value;

pub const ENV_PREFIX: &str = "CODEGEN_";

/// Turn a prefix-stripped variable name into a camel-style config key.
///
/// `MY_COOL-OPTION` becomes `myCoolOption`.
pub fn env_key(name: &str) -> String {
    let lowered = name.to_lowercase();

    let mut spaced = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for c in lowered.chars() {
        if c == '-' || c == '_' {
            if !in_separator {
                spaced.push(' ');
            }
            in_separator = true;
        } else {
            spaced.push(c);
            in_separator = false;
        }
    }

    let words: String = spaced
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    let mut key = String::with_capacity(words.len());
    let mut chars = words.chars();
    while let Some(c) = chars.next() {
        if c == ' ' {
            if let Some(next) = chars.next() {
                key.extend(next.to_uppercase());
            }
        } else {
            key.push(c);
        }
    }
    key.retain(|c| !c.is_whitespace());
    key
}

/// `"true"` and `"false"` become booleans, anything else stays a string
pub fn env_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

/// Collect overrides from the given variables; only names carrying the prefix count
pub fn env_overrides<I>(vars: I) -> ConfigMap
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            name.strip_prefix(ENV_PREFIX)
                .map(|rest| (env_key(rest), env_value(&value)))
        })
        .collect()
}
