//! # Calculated Fields
//!
//! Derives subsection-scoped values from live answers. Each target field
//! carries an ordered condition list; the first condition whose options are
//! empty (wildcard) or include the current answer wins, and later conditions
//! are never evaluated. Targets with no matching condition are omitted.

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::CalculatedCondition;

/// Resolve every target field of one subsection against a payload.
pub(crate) fn resolve(
    fields: &IndexMap<String, Vec<CalculatedCondition>>,
    payload: &serde_json::Map<String, Value>,
) -> IndexMap<String, Value> {
    let mut resolved = IndexMap::new();
    for (target, conditions) in fields {
        for condition in conditions {
            if matches(condition, payload) {
                resolved.insert(target.clone(), condition.value.clone());
                break;
            }
        }
    }
    resolved
}

/// A wildcard (empty options) always matches. Otherwise the payload value
/// for `condition.id` must be one of the listed option ids; array answers
/// are matched by their first element.
fn matches(condition: &CalculatedCondition, payload: &serde_json::Map<String, Value>) -> bool {
    if condition.options.is_empty() {
        return true;
    }
    let Some(answer) = payload.get(&condition.id) else {
        return false;
    };
    let effective = match answer {
        Value::Array(entries) => entries.first(),
        other => Some(other),
    };
    match effective {
        Some(Value::String(id)) => condition.options.iter().any(|option| option == id),
        _ => false,
    }
}
