use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::sidebar::{extract_containers, find_list_for_key, select_containers};
use crate::tree::{Folder, ItemIndex, Node, build_node, build_nodes, is_item_container};

pub const DEFAULT_SPACE_TITLE: &str = "Untitled Space";

const PINNED_KEYS: [&str; 4] = ["isPinned", "pinned", "isPinnedSpace", "is_pinned"];
const SPACE_ROOT_KEYS: [&str; 14] = [
    "itemContainerId",
    "itemContainerID",
    "itemContainerIds",
    "itemContainerIDs",
    "rootItemContainerId",
    "rootItemContainerID",
    "rootItemId",
    "rootItemID",
    "rootItemIds",
    "rootItemIDs",
    "rootId",
    "rootID",
    "rootIds",
    "rootIDs",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub include_unpinned: bool,
    pub all_containers: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExportStats {
    pub containers_total: usize,
    pub containers_selected: usize,
    pub spaces_detected: usize,
    pub spaces_included: usize,
    pub folders: usize,
    pub tabs: usize,
}

#[derive(Debug, Default)]
pub struct ExportReport {
    pub nodes: Vec<Node>,
    pub stats: ExportStats,
    pub diagnostics: Vec<String>,
}

/// Transform a parsed sidebar document into an ordered bookmark forest.
/// Never fails: per-node anomalies become diagnostics, and an input with
/// nothing exportable yields an empty report (the serializer still renders
/// a minimal valid document for it).
pub fn export_sidebar(document: &Value, options: &ExportOptions) -> ExportReport {
    let containers = extract_containers(document);
    let selected = select_containers(containers, options.all_containers);
    let wrap_per_container = options.all_containers && selected.len() > 1;

    let mut diagnostics = Vec::new();
    let mut nodes = Vec::new();
    let mut spaces_detected = 0;
    let mut spaces_included = 0;

    for &(container_index, container) in &selected {
        if !container.is_object() {
            diagnostics.push(format!(
                "container {} is not an object; skipped",
                container_index + 1
            ));
            continue;
        }
        let export = export_container(container, options.include_unpinned, &mut diagnostics);
        spaces_detected += export.spaces_detected;
        spaces_included += export.spaces_included;
        if export.nodes.is_empty() {
            continue;
        }
        if wrap_per_container || !export.from_spaces {
            nodes.push(Node::Folder(Folder {
                title: container_fallback_title(container_index),
                children: export.nodes,
            }));
        } else {
            nodes.extend(export.nodes);
        }
    }

    if nodes.is_empty() {
        diagnostics.push("no exportable items found in the sidebar data".to_string());
    }

    let (folders, tabs) = count_nodes(&nodes);
    ExportReport {
        nodes,
        stats: ExportStats {
            containers_total: containers.len(),
            containers_selected: selected.len(),
            spaces_detected,
            spaces_included,
            folders,
            tabs,
        },
        diagnostics,
    }
}

struct ContainerExport {
    nodes: Vec<Node>,
    spaces_detected: usize,
    spaces_included: usize,
    /// False when the nodes are bare root items that still need the
    /// container fallback folder around them.
    from_spaces: bool,
}

fn export_container(
    container: &Value,
    include_unpinned: bool,
    diagnostics: &mut Vec<String>,
) -> ContainerExport {
    let items = find_list_for_key(container, "items").unwrap_or(&[]);
    let index = ItemIndex::from_items(items);
    let root_ids = index.root_ids();

    let spaces = find_list_for_key(container, "spaces").unwrap_or(&[]);
    let spaces_detected = spaces.len();
    let mut spaces_included = 0;

    let mut space_nodes = Vec::new();
    let mut claimed = HashSet::new();
    for space in spaces {
        if !space.is_object() {
            diagnostics.push("space entry is not an object; skipped".to_string());
            continue;
        }
        let space_roots = space_root_ids(space, &index);
        // Excluded spaces still claim their roots so their subtrees do not
        // leak back in as ownerless top-level items.
        claimed.extend(space_roots.iter().cloned());

        let title = space_title(space);
        if space_is_pinned(space) == Some(false) && !include_unpinned {
            diagnostics.push(format!("space {title} is unpinned; excluded"));
            continue;
        }

        let mut folder = Folder::new(title);
        for root_id in &space_roots {
            append_space_root(&mut folder, &index, root_id, diagnostics);
        }
        space_nodes.push(Node::Folder(folder));
        spaces_included += 1;
    }

    let remaining = root_ids
        .into_iter()
        .filter(|id| !claimed.contains(id))
        .collect::<Vec<_>>();
    let remaining_nodes = build_nodes(&index, &remaining, diagnostics);

    if space_nodes.is_empty() {
        ContainerExport {
            nodes: remaining_nodes,
            spaces_detected,
            spaces_included,
            from_spaces: false,
        }
    } else {
        let mut nodes = space_nodes;
        nodes.extend(remaining_nodes);
        ContainerExport {
            nodes,
            spaces_detected,
            spaces_included,
            from_spaces: true,
        }
    }
}

/// A space root that is a structural item container contributes its children
/// directly; the container itself never shows up as a folder. Any other root
/// kind is built as a node of its own.
fn append_space_root(
    folder: &mut Folder,
    index: &ItemIndex,
    root_id: &str,
    diagnostics: &mut Vec<String>,
) {
    if index.get(root_id).is_some_and(is_item_container) {
        for child_id in index.children_of(root_id) {
            let mut visiting = HashSet::from([root_id.to_string()]);
            if let Some(node) = build_node(index, child_id, &mut visiting, diagnostics) {
                folder.children.push(node);
            }
        }
    } else {
        let mut visiting = HashSet::new();
        if let Some(node) = build_node(index, root_id, &mut visiting, diagnostics) {
            folder.children.push(node);
        }
    }
}

fn space_title(space: &Value) -> String {
    for key in ["title", "name"] {
        if let Some(title) = space.get(key).and_then(Value::as_str) {
            let trimmed = title.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    DEFAULT_SPACE_TITLE.to_string()
}

/// The pinned flag has moved between schema versions; check the known key
/// spellings on the space itself and under its data object. `None` means the
/// instance does not say, which counts as pinned.
pub fn space_is_pinned(space: &Value) -> Option<bool> {
    for scope in [Some(space), space.get("data")].into_iter().flatten() {
        for key in PINNED_KEYS {
            if let Some(value) = scope.get(key).and_then(Value::as_bool) {
                return Some(value);
            }
        }
    }
    None
}

/// Collect the item ids a space claims as its roots: the known direct keys
/// first, then a recursive sweep for any key that smells like a root or item
/// container reference. Only ids present in the index survive, ordered by
/// their position in the source item list.
pub fn space_root_ids(space: &Value, index: &ItemIndex) -> Vec<String> {
    let mut candidates = Vec::new();
    for scope in [Some(space), space.get("data")].into_iter().flatten() {
        if let Some(map) = scope.as_object() {
            for key in SPACE_ROOT_KEYS {
                collect_id_value(map.get(key), &mut candidates);
            }
        }
    }
    gather_ids_by_key(space, &mut candidates);

    let mut seen = HashSet::new();
    let mut valid = candidates
        .into_iter()
        .filter(|id| index.contains(id) && seen.insert(id.clone()))
        .collect::<Vec<_>>();
    valid.sort_by_key(|id| index.order_of(id));
    valid
}

fn gather_ids_by_key(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if root_key_matches(key) {
                    collect_id_value(Some(child), out);
                }
                if child.is_object() || child.is_array() {
                    gather_ids_by_key(child, out);
                }
            }
        }
        Value::Array(items) => {
            for child in items {
                gather_ids_by_key(child, out);
            }
        }
        _ => {}
    }
}

fn root_key_matches(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("itemcontainer")
        || matches!(key.as_str(), "rootid" | "rootids" | "rootitemid" | "rootitemids")
}

fn collect_id_value(value: Option<&Value>, out: &mut Vec<String>) {
    match value {
        Some(Value::String(id)) => out.push(id.clone()),
        Some(Value::Array(ids)) => out.extend(
            ids.iter()
                .filter_map(Value::as_str)
                .map(str::to_string),
        ),
        _ => {}
    }
}

fn container_fallback_title(container_index: usize) -> String {
    format!("Arc Export (Container {})", container_index + 1)
}

pub fn count_nodes(nodes: &[Node]) -> (usize, usize) {
    let mut folders = 0;
    let mut tabs = 0;
    for node in nodes {
        match node {
            Node::Folder(folder) => {
                folders += 1;
                let (child_folders, child_tabs) = count_nodes(&folder.children);
                folders += child_folders;
                tabs += child_tabs;
            }
            Node::Bookmark(_) => tabs += 1,
        }
    }
    (folders, tabs)
}
