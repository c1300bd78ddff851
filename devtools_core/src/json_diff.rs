//! Structural diff of two JSON documents.
//!
//! The result is a tree that mirrors the inputs: objects are compared key by
//! key (left-hand order first, then keys only present on the right) and arrays
//! index by index. Leaves that differ in value or in JSON type are `updated`.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::convert::json_utils::parse_json;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DiffKey {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Removed,
    Updated,
    Unchanged,
    /// A container whose own identity holds but some descendant differs.
    Children,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffNode {
    pub key: Option<DiffKey>,
    pub status: DiffStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DiffNode>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonDiffOptions {
    /// Drop `unchanged` nodes from the tree (the root always stays).
    pub only_differences: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub updated: usize,
}

pub fn diff_json(left: &str, right: &str, options: JsonDiffOptions) -> Result<DiffNode> {
    log::debug!("diffing {} and {} byte documents", left.len(), right.len());
    let left = parse_json(left)?;
    let right = parse_json(right)?;
    Ok(diff_values(&left, &right, options))
}

pub fn diff_values(left: &Value, right: &Value, options: JsonDiffOptions) -> DiffNode {
    let mut root = compare(None, Some(left), Some(right));
    if options.only_differences {
        prune_unchanged(&mut root);
    }
    root
}

fn compare(key: Option<DiffKey>, left: Option<&Value>, right: Option<&Value>) -> DiffNode {
    match (left, right) {
        (Some(old), None) => leaf(key, DiffStatus::Removed, Some(old), None),
        (None, Some(new)) => leaf(key, DiffStatus::Added, None, Some(new)),
        (None, None) => leaf(key, DiffStatus::Unchanged, None, None),
        (Some(Value::Object(old)), Some(Value::Object(new))) => {
            let mut children: Vec<DiffNode> = old
                .iter()
                .map(|(k, v)| compare(Some(DiffKey::Key(k.clone())), Some(v), new.get(k)))
                .collect();
            children.extend(
                new.iter()
                    .filter(|(k, _)| !old.contains_key(*k))
                    .map(|(k, v)| compare(Some(DiffKey::Key(k.clone())), None, Some(v))),
            );
            container(key, left, right, children)
        }
        (Some(Value::Array(old)), Some(Value::Array(new))) => {
            let children = (0..old.len().max(new.len()))
                .map(|idx| compare(Some(DiffKey::Index(idx)), old.get(idx), new.get(idx)))
                .collect();
            container(key, left, right, children)
        }
        (Some(old), Some(new)) if same_scalar(old, new) => {
            leaf(key, DiffStatus::Unchanged, Some(old), Some(new))
        }
        (Some(old), Some(new)) => leaf(key, DiffStatus::Updated, Some(old), Some(new)),
    }
}

/// `1` and `1.0` are the same JSON number.
fn same_scalar(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            a.as_f64() == b.as_f64()
        }
        _ => old == new,
    }
}

fn leaf(
    key: Option<DiffKey>,
    status: DiffStatus,
    old: Option<&Value>,
    new: Option<&Value>,
) -> DiffNode {
    DiffNode {
        key,
        status,
        old_value: old.cloned(),
        new_value: new.cloned(),
        children: Vec::new(),
    }
}

fn container(
    key: Option<DiffKey>,
    old: Option<&Value>,
    new: Option<&Value>,
    children: Vec<DiffNode>,
) -> DiffNode {
    if children.iter().all(|child| child.status == DiffStatus::Unchanged) {
        return leaf(key, DiffStatus::Unchanged, old, new);
    }
    DiffNode {
        key,
        status: DiffStatus::Children,
        old_value: None,
        new_value: None,
        children,
    }
}

fn prune_unchanged(node: &mut DiffNode) {
    node.children
        .retain(|child| child.status != DiffStatus::Unchanged);
    for child in &mut node.children {
        prune_unchanged(child);
    }
}

pub fn has_differences(node: &DiffNode) -> bool {
    node.status != DiffStatus::Unchanged
}

/// Counts changed leaves across the whole tree.
pub fn summarize(node: &DiffNode) -> DiffSummary {
    let mut summary = DiffSummary::default();
    tally(node, &mut summary);
    summary
}

fn tally(node: &DiffNode, summary: &mut DiffSummary) {
    match node.status {
        DiffStatus::Added => summary.added += 1,
        DiffStatus::Removed => summary.removed += 1,
        DiffStatus::Updated => summary.updated += 1,
        DiffStatus::Unchanged => {}
        DiffStatus::Children => node.children.iter().for_each(|child| tally(child, summary)),
    }
}
