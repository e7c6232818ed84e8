//! Field-level diffs between two serialized records

use serde_json::Value;

/// Bookkeeping fields left out of summaries
const IGNORED_FIELDS: &[&str] = &["updated_at"];

/// Summarize what changed between two JSON records
///
/// Nested objects and equal-length arrays are walked so a milestone change
/// reads as `milestones[4].status: "in_progress" -> "complete"` rather than
/// as a whole-array replacement. Returns `None` when nothing changed.
pub fn diff_summary(before: &Value, after: &Value) -> Option<String> {
    let mut changes = Vec::new();
    walk(before, after, "", &mut changes);

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn walk(before: &Value, after: &Value, path: &str, changes: &mut Vec<String>) {
    if before == after {
        return;
    }

    match (before, after) {
        (Value::Object(b), Value::Object(a)) => {
            for (key, before_val) in b {
                if path.is_empty() && IGNORED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                let child = join(path, key);
                match a.get(key) {
                    Some(after_val) => walk(before_val, after_val, &child, changes),
                    None => changes.push(format!("{}: {} -> (removed)", child, render(before_val))),
                }
            }
            for (key, after_val) in a {
                if !b.contains_key(key) {
                    changes.push(format!("{}: (added) -> {}", join(path, key), render(after_val)));
                }
            }
        }
        (Value::Array(b), Value::Array(a)) if b.len() == a.len() => {
            for (i, (before_val, after_val)) in b.iter().zip(a).enumerate() {
                walk(before_val, after_val, &format!("{}[{}]", path, i), changes);
            }
        }
        _ => {
            let label = if path.is_empty() { "value" } else { path };
            changes.push(format!("{}: {} -> {}", label, render(before), render(after)));
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}
