//! Unresolved-reference records
//!
//! A [`ResolutionReport`] mirrors the shape of the resolved document:
//! each node carries the references beneath it that could not be
//! resolved. In permissive modes the report is returned as data; in
//! strict mode it is flattened into an aggregate error.

use std::fmt;

use indexmap::IndexMap;

/// A single reference that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    /// The reference text, as written between `${` and `}`.
    pub reference: String,
}

/// A child entry inside a [`ResolutionReport`].
#[derive(Debug, Clone, PartialEq)]
pub enum UnresolvedNode {
    /// A reference string that failed to resolve at this spot.
    Leaf(UnresolvedRef),
    /// A nested subtree that contains unresolved references.
    Branch(ResolutionReport),
}

/// Per-node record of the unresolved references beneath a document node.
///
/// Created fresh for every resolution pass and discarded once the
/// driver has inspected it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionReport {
    path: String,
    children: IndexMap<String, UnresolvedNode>,
}

impl ResolutionReport {
    /// Creates an empty report for the node at the given path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            children: IndexMap::new(),
        }
    }

    /// Returns the document path this report describes.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Records a reference that failed to resolve at this node.
    pub fn push_leaf(&mut self, reference: impl Into<String>) {
        let reference = reference.into();
        self.children.insert(
            reference.clone(),
            UnresolvedNode::Leaf(UnresolvedRef { reference }),
        );
    }

    /// Folds a child report in under the given key or index.
    ///
    /// Clean children are dropped so the report only keeps the dirty
    /// spine of the tree.
    pub fn push_child(&mut self, key: impl Into<String>, child: Self) {
        if !child.is_clean() {
            self.children.insert(key.into(), UnresolvedNode::Branch(child));
        }
    }

    /// Returns true when nothing beneath this node is unresolved.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the direct children of this report.
    #[must_use]
    pub const fn children(&self) -> &IndexMap<String, UnresolvedNode> {
        &self.children
    }

    /// Flattens the report into the list of unresolved reference
    /// strings, in document order, without duplicates.
    #[must_use]
    pub fn unresolved_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths(&self, paths: &mut Vec<String>) {
        for node in self.children.values() {
            match node {
                UnresolvedNode::Leaf(leaf) => {
                    if !paths.contains(&leaf.reference) {
                        paths.push(leaf.reference.clone());
                    }
                }
                UnresolvedNode::Branch(child) => child.collect_paths(paths),
            }
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for (key, node) in &self.children {
            match node {
                UnresolvedNode::Leaf(leaf) => {
                    writeln!(f, "{}{} → <unset>", "  ".repeat(indent), leaf.reference)?;
                }
                UnresolvedNode::Branch(child) => {
                    let label = if child.path.is_empty() { key } else { &child.path };
                    writeln!(f, "{}{label}:", "  ".repeat(indent))?;
                    child.render(f, indent + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}
