//! Tree model for captured document snapshots.
//!
//! A [`TreeNode`] is one element (or text leaf) of a rendered page. Nodes are
//! built once, either programmatically or by parsing the nested snapshot
//! format produced by the capture service, and are read-only afterwards.
//!
//! # Snapshot format
//!
//! ```text
//! { "nodeName": "DIV", "attributes": {"id": "a"}, "nodeValue": "text",
//!   "children": [ ... ], "shadowRoot": { ... } }
//! ```
//!
//! Shadow roots are flattened: the shadow subtree becomes the children of a
//! synthetic `shadow-root` node appended after the element's regular children.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::result::{PlrError, PlrResult};

/// Tag used when a snapshot node has no name
pub const UNKNOWN_TAG: &str = "unknown";

/// Tag of the synthetic node that carries a flattened shadow subtree
pub const SHADOW_ROOT_TAG: &str = "shadow-root";

/// Node name of text children, which are dropped during parsing
pub const TEXT_NODE_NAME: &str = "#text";

/// One element of a document tree.
///
/// Equality compares `tag`, `attributes` and `text` only. Children are not
/// part of a node's identity, so a node whose subtree changed is still "the
/// same" node.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<TreeNode>,
    text: String,
}

impl TreeNode {
    /// Create a leaf node. The tag is lower-cased; an empty tag becomes `unknown`.
    #[must_use]
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self {
            tag: normalize_tag(tag.as_ref()),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Placeholder produced for a missing snapshot
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(UNKNOWN_TAG)
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the inline text payload
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a child
    #[must_use]
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Normalized element name
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// All attributes, ordered by key
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Single attribute value
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Ordered children
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Inline text payload (empty if none)
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Value of the `id` attribute
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Non-empty `id`, the only kind a locator can address
    #[must_use]
    pub fn locator_id(&self) -> Option<&str> {
        self.id().filter(|id| !id.is_empty())
    }

    /// Whitespace-separated tokens of the `class` attribute
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.attribute("class")
            .map(|raw| raw.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether `token` is one of this node's class tokens
    #[must_use]
    pub fn has_class(&self, token: &str) -> bool {
        self.attribute("class")
            .is_some_and(|raw| raw.split_whitespace().any(|c| c == token))
    }

    /// Key under which this element's locator is tracked: the id, else `.`
    /// followed by the raw class attribute. Empty values do not count.
    #[must_use]
    pub fn locator_key(&self) -> Option<String> {
        if let Some(id) = self.locator_id() {
            return Some(id.to_string());
        }
        self.attribute("class")
            .filter(|class| !class.is_empty())
            .map(|class| format!(".{class}"))
    }

    /// Pre-order traversal of this node and its descendants
    #[must_use]
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Number of nodes in this subtree, including `self`
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Parse a snapshot from a JSON string
    pub fn from_json_str(json: &str) -> PlrResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_snapshot(&value)
    }

    /// Parse a snapshot value.
    ///
    /// A missing or empty value (`null`, `{}`, `""`, `false`, ...) yields a
    /// single `unknown` placeholder. Any other non-object root or child fails
    /// with [`PlrError::InvalidTreeInput`].
    pub fn from_snapshot(snapshot: &Value) -> PlrResult<Self> {
        if is_falsy(snapshot) {
            return Ok(Self::placeholder());
        }
        Self::parse_value(snapshot, "")
    }

    fn parse_value(value: &Value, path: &str) -> PlrResult<Self> {
        let Value::Object(map) = value else {
            return Err(PlrError::invalid_tree(
                if path.is_empty() { "/" } else { path },
                format!("expected a node object, found {}", value_kind(value)),
            ));
        };

        let tag = map
            .get("nodeName")
            .and_then(scalar_to_string)
            .unwrap_or_default();
        let attributes = match map.get("attributes") {
            Some(Value::Object(attrs)) => attrs
                .iter()
                .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
                .collect(),
            _ => BTreeMap::new(),
        };
        let text = map
            .get("nodeValue")
            .and_then(scalar_to_string)
            .unwrap_or_default();

        let mut node = Self {
            tag: normalize_tag(&tag),
            attributes,
            children: Vec::new(),
            text,
        };

        if let Some(Value::Array(children)) = map.get("children") {
            for (index, child) in children.iter().enumerate() {
                if is_falsy(child) {
                    continue;
                }
                // Text content comes from the element's own nodeValue.
                if child.get("nodeName").and_then(Value::as_str) == Some(TEXT_NODE_NAME) {
                    continue;
                }
                let child_path = format!("{path}/children/{index}");
                node.children.push(Self::parse_value(child, &child_path)?);
            }
        }

        if let Some(shadow) = map.get("shadowRoot").filter(|v| !is_falsy(v)) {
            let shadow = Self::parse_value(shadow, &format!("{path}/shadowRoot"))?;
            node.children
                .push(Self::new(SHADOW_ROOT_TAG).with_children(shadow.children));
        }

        Ok(node)
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.attributes == other.attributes && self.text == other.text
    }
}

impl Eq for TreeNode {}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        if let Some(id) = self.locator_id() {
            write!(f, "#{id}")?;
        }
        for class in self.classes() {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TreeNode {
    type Item = &'a TreeNode;
    type IntoIter = PreOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over a subtree
#[derive(Debug, Clone)]
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        UNKNOWN_TAG.to_string()
    } else {
        tag.to_lowercase()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
