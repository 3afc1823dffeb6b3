use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::feed::FeedItemId;

/// An element subtree as reported by the host document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DomNode {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<DomNode>,
}

/// Which elements count as feed items and where their identifier lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSelector {
    pub item_tag: String,
    pub id_attribute: String,
}

impl Default for FeedSelector {
    fn default() -> Self {
        Self {
            item_tag: "article".to_string(),
            id_attribute: "data-id".to_string(),
        }
    }
}

impl DomNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    /// Shorthand for a feed item element under the default selector.
    pub fn feed_item(id: &str) -> Self {
        let selector = FeedSelector::default();
        Self::new(&selector.item_tag).with_attribute(&selector.id_attribute, id)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Returns the node's identifier if the node itself is a feed item.
    pub fn feed_item_id(&self, selector: &FeedSelector) -> Option<FeedItemId> {
        if !self.tag.eq_ignore_ascii_case(&selector.item_tag) {
            return None;
        }
        self.attribute(&selector.id_attribute)
            .and_then(FeedItemId::new)
    }

    /// Pre-order traversal of the subtree, root included.
    pub fn descendants(&self) -> Vec<&DomNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Every feed item in the subtree, root included, deduplicated in document order.
    pub fn collect_feed_items(&self, selector: &FeedSelector) -> Vec<FeedItemId> {
        collect_feed_items(std::slice::from_ref(self), selector)
    }

    /// Whether any node in the subtree carries `class`.
    pub fn contains_class(&self, class: &str) -> bool {
        self.descendants().iter().any(|n| n.has_class(class))
    }
}

/// Feed items across several subtrees, deduplicated in document order.
pub fn collect_feed_items(roots: &[DomNode], selector: &FeedSelector) -> Vec<FeedItemId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for root in roots {
        for node in root.descendants() {
            if let Some(id) = node.feed_item_id(selector) {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}
