//! Core data structures for the project tree

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A node in the project hierarchy.
///
/// Children are held behind `Arc` so that an edit rebuilds only the chain of
/// parents above the changed node; every untouched subtree is shared between
/// the old and the new root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    #[serde(default)]
    pub children: Vec<Arc<TreeNode>>,
    /// Set by external collaborators; the core never writes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_stale: Option<bool>,
}

impl TreeNode {
    /// A leaf node with no stale marker.
    pub fn new(id: impl Into<String>) -> Self {
        TreeNode {
            id: id.into(),
            children: Vec::new(),
            is_stale: None,
        }
    }

    pub fn with_children(id: impl Into<String>, children: Vec<TreeNode>) -> Self {
        TreeNode {
            id: id.into(),
            children: children.into_iter().map(Arc::new).collect(),
            is_stale: None,
        }
    }

    /// Absent markers read as stale.
    pub fn is_stale(&self) -> bool {
        self.is_stale.unwrap_or(true)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first search for a node by id.
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Total number of nodes, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Ids in depth-first pre-order.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node.id.as_str());
            stack.extend(node.children.iter().rev().map(|c| c.as_ref()));
        }
        out
    }

    /// Check that every id is unique and no id recurs below itself.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut ancestors = Vec::new();
        validate_node(self, &mut ancestors, &mut seen)
    }
}

fn validate_node<'a>(
    node: &'a TreeNode,
    ancestors: &mut Vec<&'a str>,
    seen: &mut HashSet<&'a str>,
) -> Result<()> {
    if ancestors.contains(&node.id.as_str()) {
        return Err(CoreError::CycleDetected(node.id.clone()));
    }
    if !seen.insert(node.id.as_str()) {
        return Err(CoreError::DuplicateId(node.id.clone()));
    }
    ancestors.push(node.id.as_str());
    for child in &node.children {
        validate_node(child, ancestors, seen)?;
    }
    ancestors.pop();
    Ok(())
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(node: &TreeNode, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let marker = if node.is_stale() { " (stale)" } else { "" };
            writeln!(f, "{}{}{}", "  ".repeat(depth), node.id, marker)?;
            for child in &node.children {
                write_node(child, depth + 1, f)?;
            }
            Ok(())
        }
        write_node(self, 0, f)
    }
}

/// One entry in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
}

/// A snapshot of one directory while browsing for a project location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub current: String,
    /// `None` at the filesystem root.
    pub parent: Option<String>,
    #[serde(default)]
    pub directories: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// ── Graph document (node/edge editor) ───────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// The node/edge document edited alongside the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl GraphDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: GraphNode) {
        self.nodes.push(node);
    }

    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }
}
