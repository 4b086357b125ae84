use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

pub const DEFAULT_FOLDER_TITLE: &str = "Untitled Folder";

const FOLDER_DATA_KEYS: [&str; 3] = ["list", "tabGroup", "itemContainer"];
const PARENT_KEYS: [&str; 3] = ["parentID", "parentId", "parent_id"];
const TAB_URL_KEYS: [&str; 3] = ["savedURL", "url", "URL"];
const TAB_TITLE_KEYS: [&str; 2] = ["savedTitle", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Folder(Folder),
    Bookmark(Bookmark),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Folder {
    pub title: String,
    pub children: Vec<Node>,
}

impl Folder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: Option<String>,
    pub data: Map<String, Value>,
    pub order: usize,
}

/// Item records indexed by id, with parent/child relationships resolved.
/// Source order is preserved everywhere: it carries the user's sidebar
/// arrangement and must survive into the output untouched.
#[derive(Debug, Default)]
pub struct ItemIndex {
    records: HashMap<String, ItemRecord>,
    order: Vec<String>,
    children: HashMap<String, Vec<String>>,
}

impl ItemIndex {
    pub fn from_items(items: &[Value]) -> Self {
        let mut records = HashMap::new();
        let mut order = Vec::new();
        for (position, item) in items.iter().enumerate() {
            let Some(object) = item.as_object() else {
                continue;
            };
            let Some(id) = object
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
            else {
                continue;
            };
            let parent_id = PARENT_KEYS
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|parent| !parent.is_empty())
                .map(str::to_string);
            let title = object
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string);
            let data = object
                .get("data")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let record = ItemRecord {
                id: id.to_string(),
                parent_id,
                title,
                data,
                order: position,
            };
            if records.insert(id.to_string(), record).is_none() {
                order.push(id.to_string());
            }
        }

        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for id in &order {
            if let Some(parent) = records[id].parent_id.as_deref()
                && records.contains_key(parent)
            {
                children.entry(parent.to_string()).or_default().push(id.clone());
            }
        }

        Self {
            records,
            order,
            children,
        }
    }

    pub fn get(&self, id: &str) -> Option<&ItemRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn order_of(&self, id: &str) -> Option<usize> {
        self.records.get(id).map(|record| record.order)
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map_or(&[], Vec::as_slice)
    }

    /// Ids of items with no parent, or a parent that never appears in the
    /// item list, in source order.
    pub fn root_ids(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| {
                self.records[*id]
                    .parent_id
                    .as_deref()
                    .is_none_or(|parent| !self.records.contains_key(parent))
            })
            .cloned()
            .collect()
    }
}

pub fn is_folder_like(record: &ItemRecord) -> bool {
    FOLDER_DATA_KEYS
        .iter()
        .any(|key| record.data.contains_key(*key))
}

/// Structural container nodes hold a space's items but carry no meaning of
/// their own; the export layer splices their children in directly.
pub fn is_item_container(record: &ItemRecord) -> bool {
    record.data.contains_key("itemContainer")
}

pub fn node_title(record: &ItemRecord, default: &str) -> String {
    let candidates = [
        record.title.as_deref(),
        record.data.get("title").and_then(Value::as_str),
        record.data.get("name").and_then(Value::as_str),
    ];
    for candidate in candidates.into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    default.to_string()
}

fn bookmark_from_tab(record: &ItemRecord, tab: &Map<String, Value>) -> Option<Bookmark> {
    let url = TAB_URL_KEYS
        .iter()
        .find_map(|key| tab.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|url| !url.is_empty())?;
    let title = TAB_TITLE_KEYS
        .iter()
        .find_map(|key| tab.get(*key).and_then(Value::as_str))
        .or(record.title.as_deref())
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(url);
    Some(Bookmark {
        title: title.to_string(),
        url: url.to_string(),
    })
}

/// Build the node rooted at `id` by recursive descent. The explicit
/// `visiting` set truncates parent cycles instead of recursing forever;
/// every anomaly is recorded as a diagnostic and the offending node is
/// dropped rather than failing the whole export.
pub fn build_node(
    index: &ItemIndex,
    id: &str,
    visiting: &mut HashSet<String>,
    diagnostics: &mut Vec<String>,
) -> Option<Node> {
    if visiting.contains(id) {
        diagnostics.push(format!("cycle detected at item {id}; subtree truncated"));
        return None;
    }
    let Some(record) = index.get(id) else {
        diagnostics.push(format!("reference to unknown item {id}; skipped"));
        return None;
    };

    if let Some(tab) = record.data.get("tab").and_then(Value::as_object) {
        return match bookmark_from_tab(record, tab) {
            Some(bookmark) => Some(Node::Bookmark(bookmark)),
            None => {
                diagnostics.push(format!("tab {id} has no usable URL; skipped"));
                None
            }
        };
    }

    let child_ids = index.children_of(id);
    if !is_folder_like(record) && child_ids.is_empty() {
        diagnostics.push(format!("item {id} has an unrecognized kind; skipped"));
        return None;
    }

    visiting.insert(id.to_string());
    let mut folder = Folder::new(node_title(record, DEFAULT_FOLDER_TITLE));
    for child_id in child_ids {
        if let Some(child) = build_node(index, child_id, visiting, diagnostics) {
            folder.children.push(child);
        }
    }
    visiting.remove(id);
    Some(Node::Folder(folder))
}

/// Build one node per root id, each with a fresh visiting path.
pub fn build_nodes(index: &ItemIndex, ids: &[String], diagnostics: &mut Vec<String>) -> Vec<Node> {
    let mut nodes = Vec::new();
    for id in ids {
        let mut visiting = HashSet::new();
        if let Some(node) = build_node(index, id, &mut visiting, diagnostics) {
            nodes.push(node);
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::{Value, json};

    use super::{
        DEFAULT_FOLDER_TITLE, Bookmark, ItemIndex, Node, build_node, build_nodes, is_folder_like,
        is_item_container, node_title,
    };

    fn items(values: Value) -> Vec<Value> {
        values.as_array().expect("items array").clone()
    }

    fn build(index: &ItemIndex, id: &str) -> (Option<Node>, Vec<String>) {
        let mut diagnostics = Vec::new();
        let node = build_node(index, id, &mut HashSet::new(), &mut diagnostics);
        (node, diagnostics)
    }

    #[test]
    fn index_preserves_source_order_for_children() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "root", "data": {"list": {}}},
            {"id": "c", "parentID": "root", "data": {"tab": {"savedURL": "https://c.example"}}},
            {"id": "a", "parentID": "root", "data": {"tab": {"savedURL": "https://a.example"}}},
            {"id": "b", "parentID": "root", "data": {"tab": {"savedURL": "https://b.example"}}},
        ])));
        assert_eq!(index.children_of("root"), ["c", "a", "b"]);

        let (node, diagnostics) = build(&index, "root");
        assert!(diagnostics.is_empty());
        let Some(Node::Folder(folder)) = node else {
            panic!("expected folder");
        };
        let urls = folder
            .children
            .iter()
            .map(|child| match child {
                Node::Bookmark(bookmark) => bookmark.url.as_str(),
                Node::Folder(_) => panic!("expected bookmark"),
            })
            .collect::<Vec<_>>();
        assert_eq!(urls, ["https://c.example", "https://a.example", "https://b.example"]);
    }

    #[test]
    fn roots_are_items_without_known_parents() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "orphan", "parentID": "nowhere", "data": {"list": {}}},
            {"id": "root", "data": {"list": {}}},
            {"id": "child", "parentID": "root", "data": {"list": {}}},
        ])));
        assert_eq!(index.root_ids(), ["orphan", "root"]);
    }

    #[test]
    fn tab_without_title_uses_url_as_display_text() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "t", "data": {"tab": {"savedURL": "https://example.com"}}},
        ])));
        let (node, _) = build(&index, "t");
        assert_eq!(
            node,
            Some(Node::Bookmark(Bookmark {
                title: "https://example.com".to_string(),
                url: "https://example.com".to_string(),
            }))
        );
    }

    #[test]
    fn tab_without_url_is_skipped_with_diagnostic() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "t", "title": "No URL", "data": {"tab": {"savedTitle": "No URL"}}},
        ])));
        let (node, diagnostics) = build(&index, "t");
        assert_eq!(node, None);
        assert!(diagnostics[0].contains("no usable URL"));
    }

    #[test]
    fn tab_title_falls_back_to_item_title() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "t", "title": "Outer", "data": {"tab": {"url": "https://example.com"}}},
        ])));
        let (node, _) = build(&index, "t");
        let Some(Node::Bookmark(bookmark)) = node else {
            panic!("expected bookmark");
        };
        assert_eq!(bookmark.title, "Outer");
    }

    #[test]
    fn parent_cycle_is_truncated_without_looping() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "a", "parentID": "b", "data": {"list": {}}},
            {"id": "b", "parentID": "a", "data": {"list": {}}},
        ])));
        let mut diagnostics = Vec::new();
        let nodes = build_nodes(&index, &["a".to_string()], &mut diagnostics);
        // a's child is b, whose child chain leads back to a and is cut there.
        assert_eq!(nodes.len(), 1);
        assert!(diagnostics.iter().any(|line| line.contains("cycle detected")));
        let Node::Folder(a) = &nodes[0] else {
            panic!("expected folder");
        };
        assert_eq!(a.children.len(), 1);
        let Node::Folder(b) = &a.children[0] else {
            panic!("expected folder");
        };
        assert!(b.children.is_empty());
    }

    #[test]
    fn unknown_child_reference_is_skipped() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "root", "data": {"list": {}}},
        ])));
        let mut diagnostics = Vec::new();
        let nodes = build_nodes(&index, &["root".to_string(), "ghost".to_string()], &mut diagnostics);
        assert_eq!(nodes.len(), 1);
        assert!(diagnostics[0].contains("unknown item ghost"));
    }

    #[test]
    fn empty_folder_is_still_emitted() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "empty", "title": "Empty", "data": {"list": {}}},
        ])));
        let (node, diagnostics) = build(&index, "empty");
        assert_eq!(node, Some(Node::Folder(super::Folder::new("Empty"))));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn unrecognized_leaf_is_skipped_with_diagnostic() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "widget", "data": {"easel": {}}},
        ])));
        let (node, diagnostics) = build(&index, "widget");
        assert_eq!(node, None);
        assert!(diagnostics[0].contains("unrecognized kind"));
    }

    #[test]
    fn unrecognized_node_with_children_becomes_a_folder() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "mystery", "title": "Mystery", "data": {"custom": {}}},
            {"id": "t", "parentID": "mystery", "data": {"tab": {"savedURL": "https://example.com"}}},
        ])));
        let (node, diagnostics) = build(&index, "mystery");
        assert!(diagnostics.is_empty());
        let Some(Node::Folder(folder)) = node else {
            panic!("expected folder");
        };
        assert_eq!(folder.title, "Mystery");
        assert_eq!(folder.children.len(), 1);
    }

    #[test]
    fn node_title_prefers_first_non_blank_candidate() {
        let index = ItemIndex::from_items(&items(json!([
            {"id": "x", "title": "  ", "data": {"list": {}, "name": "From Data"}},
        ])));
        let record = index.get("x").expect("record");
        assert_eq!(node_title(record, DEFAULT_FOLDER_TITLE), "From Data");
        assert!(is_folder_like(record));
        assert!(!is_item_container(record));
    }
}
