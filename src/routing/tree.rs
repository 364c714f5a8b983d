//! Per-method tree table.
//!
//! A router holds one radix tree per HTTP method. The method set is small
//! (typically under ten), so a linear scan over a vector beats hashing.

use crate::routing::node::Node;

/// The radix tree serving one HTTP method.
#[derive(Debug)]
pub struct MethodTree<H> {
    pub method: String,
    pub root: Node<H>,
}

/// Ordered list of method trees, in first-registration order.
#[derive(Debug)]
pub struct MethodTrees<H> {
    trees: Vec<MethodTree<H>>,
}

impl<H> Default for MethodTrees<H> {
    fn default() -> Self {
        Self {
            trees: Vec::with_capacity(9),
        }
    }
}

impl<H> MethodTrees<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root for `method`, if any route was ever registered under it.
    pub fn get(&self, method: &str) -> Option<&Node<H>> {
        self.trees
            .iter()
            .find(|t| t.method == method)
            .map(|t| &t.root)
    }

    pub fn get_mut(&mut self, method: &str) -> Option<&mut Node<H>> {
        self.trees
            .iter_mut()
            .find(|t| t.method == method)
            .map(|t| &mut t.root)
    }

    /// Adds the tree for a method seen for the first time.
    pub fn append(&mut self, method: &str, root: Node<H>) {
        self.trees.push(MethodTree {
            method: method.to_string(),
            root,
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MethodTree<H>> {
        self.trees.iter()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl<'a, H> IntoIterator for &'a MethodTrees<H> {
    type Item = &'a MethodTree<H>;
    type IntoIter = std::slice::Iter<'a, MethodTree<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.trees.iter()
    }
}
