use anyhow::{Context, Result, bail};
use serde_json::Value;

/// Parse the raw sidebar file text. Anything other than a top-level JSON
/// object is a fatal "invalid sidebar file" condition; per-node anomalies
/// are handled later, tolerantly, by the tree builder.
pub fn parse_sidebar_document(text: &str) -> Result<Value> {
    let document: Value =
        serde_json::from_str(text).context("invalid sidebar file: not valid JSON")?;
    if !document.is_object() {
        bail!("invalid sidebar file: top-level value is not a JSON object");
    }
    Ok(document)
}

/// Find the first array stored under `key` anywhere in the structure. The
/// sidebar schema is not strictly versioned, so container and item lists are
/// located by probing rather than by fixed paths.
pub fn find_list_for_key<'a>(value: &'a Value, key: &str) -> Option<&'a [Value]> {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get(key) {
                return Some(items);
            }
            map.values().find_map(|child| find_list_for_key(child, key))
        }
        Value::Array(items) => items.iter().find_map(|child| find_list_for_key(child, key)),
        _ => None,
    }
}

pub fn extract_containers(document: &Value) -> &[Value] {
    let root = document.get("root").unwrap_or(document);
    if let Some(containers) = root
        .get("sidebar")
        .and_then(|sidebar| sidebar.get("containers"))
        .and_then(Value::as_array)
    {
        return containers;
    }
    find_list_for_key(root, "containers").unwrap_or(&[])
}

/// Pick the containers to export from, keeping each one's original index.
/// Arc keeps the user's sidebar in the second container (the first holds
/// pinned top apps), so that one is preferred when it carries an item list.
pub fn select_containers(containers: &[Value], all_containers: bool) -> Vec<(usize, &Value)> {
    if containers.is_empty() {
        return Vec::new();
    }
    if all_containers {
        return containers.iter().enumerate().collect();
    }
    if containers.len() > 1
        && containers[1].is_object()
        && find_list_for_key(&containers[1], "items").is_some_and(|items| !items.is_empty())
    {
        return vec![(1, &containers[1])];
    }
    for (index, container) in containers.iter().enumerate() {
        if find_list_for_key(container, "items").is_some_and(|items| !items.is_empty()) {
            return vec![(index, container)];
        }
    }
    vec![(0, &containers[0])]
}
