//! Radix tree node.
//!
//! # Responsibilities
//! - Insert route patterns, splitting labels where prefixes diverge
//! - Reject ambiguous static/wildcard overlaps at registration time
//! - Match request paths, backtracking between sibling branches
//! - Recover case-insensitive matches and prune deleted routes
//!
//! # Design Decisions
//! - Each node exclusively owns its children (no parent pointers)
//! - Labels are raw bytes; static children are indexed by their first byte
//! - Registration is atomic: a read-only conflict pass runs before any mutation
//! - Lookup never allocates unless a parameter value is percent-decoded

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::routing::error::RouteError;
use crate::routing::params::Params;
use crate::routing::path::{count_params, longest_common_prefix, toggle_trailing_slash, unescape};

/// Ordered, shared chain of handlers attached to a route.
///
/// Clones share identity; [`HandlersChain::same_chain`] compares identity,
/// not contents.
pub struct HandlersChain<H>(Arc<[H]>);

impl<H> HandlersChain<H> {
    pub fn new(handlers: Vec<H>) -> Self {
        Self(handlers.into())
    }

    /// The last handler in the chain, i.e. the main one.
    pub fn last(&self) -> Option<&H> {
        self.0.last()
    }

    /// True when both values are clones of the same registered chain.
    pub fn same_chain(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<H> Clone for HandlersChain<H> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<H> Deref for HandlersChain<H> {
    type Target = [H];

    fn deref(&self) -> &[H] {
        &self.0
    }
}

impl<H> From<Vec<H>> for HandlersChain<H> {
    fn from(handlers: Vec<H>) -> Self {
        Self::new(handlers)
    }
}

impl<H: fmt::Debug> fmt::Debug for HandlersChain<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Matching semantics of a node's own label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeType {
    #[default]
    Static,
    Root,
    Param,
    CatchAll,
}

/// Result of [`Node::get_value`].
///
/// `tsr` (trailing slash recommendation) is only ever set when `handlers` is
/// `None`.
#[derive(Debug)]
pub struct Value<'k, 'v, H> {
    pub handlers: Option<&'k HandlersChain<H>>,
    pub params: Params<'k, 'v>,
    pub tsr: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Static(usize),
    Param,
    CatchAll,
}

/// A single radix tree node.
///
/// The has-wildcard-child and terminal flags of the classic layout are the
/// `param_child`/`wild_child` and `handlers` slots being occupied.
#[derive(Debug)]
pub struct Node<H> {
    path: Vec<u8>,
    indices: Vec<u8>,
    children: Vec<Node<H>>,
    param_child: Option<Box<Node<H>>>,
    wild_child: Option<Box<Node<H>>>,
    handlers: Option<HandlersChain<H>>,
    priority: u32,
    n_type: NodeType,
    max_params: usize,
}

impl<H> Default for Node<H> {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            indices: Vec::new(),
            children: Vec::new(),
            param_child: None,
            wild_child: None,
            handlers: None,
            priority: 0,
            n_type: NodeType::Static,
            max_params: 0,
        }
    }
}

impl<H> Node<H> {
    /// Creates an empty tree root.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_type(&self) -> NodeType {
        self.n_type
    }

    /// Number of routes registered beneath (and at) this node.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Upper bound on the parameter count of any route in this subtree.
    pub fn max_params(&self) -> usize {
        self.max_params
    }

    /// True for a root that holds no routes.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.is_vacant()
    }

    fn is_vacant(&self) -> bool {
        self.handlers.is_none()
            && self.children.is_empty()
            && self.param_child.is_none()
            && self.wild_child.is_none()
    }

    fn wildcard_name(&self) -> &str {
        std::str::from_utf8(self.path.get(1..).unwrap_or_default()).unwrap_or_default()
    }

    fn static_child(&self, c: u8) -> Option<&Node<H>> {
        self.indices
            .iter()
            .position(|&b| b == c)
            .map(|i| &self.children[i])
    }

    fn child(&self, step: Step) -> Option<&Node<H>> {
        match step {
            Step::Static(i) => self.children.get(i),
            Step::Param => self.param_child.as_deref(),
            Step::CatchAll => self.wild_child.as_deref(),
        }
    }

    fn child_mut(&mut self, step: Step) -> Option<&mut Node<H>> {
        match step {
            Step::Static(i) => self.children.get_mut(i),
            Step::Param => self.param_child.as_deref_mut(),
            Step::CatchAll => self.wild_child.as_deref_mut(),
        }
    }

    fn descend_mut(&mut self, steps: &[Step]) -> Option<&mut Node<H>> {
        steps
            .iter()
            .try_fold(self, |node, &step| node.child_mut(step))
    }

    // ---------------------------------------------------------------------
    // Insertion
    // ---------------------------------------------------------------------

    /// Registers `handlers` under the route pattern `path`.
    ///
    /// Re-registering an existing pattern replaces its chain. On error the
    /// tree is unchanged.
    pub fn add_route(&mut self, path: &str, handlers: HandlersChain<H>) -> Result<(), RouteError> {
        validate_pattern(path)?;
        if handlers.is_empty() {
            return Err(RouteError::EmptyHandlers(path.to_string()));
        }
        self.check_conflicts(path)?;

        let is_new = self.get_handlers(path).is_none();

        if self.is_empty() {
            self.insert_child(path.as_bytes(), handlers);
            self.n_type = NodeType::Root;
        } else {
            self.insert(path.as_bytes(), handlers);
        }

        if is_new {
            self.increment_priorities(path.as_bytes());
        }
        Ok(())
    }

    /// Read-only dry run of [`Node::insert`] that reports the first conflict.
    fn check_conflicts(&self, full_path: &str) -> Result<(), RouteError> {
        if self.is_empty() {
            return Ok(());
        }

        let full = full_path.as_bytes();
        let mut node = self;
        let mut consumed = 0;

        loop {
            let path = &full[consumed..];
            let i = longest_common_prefix(path, &node.path);

            if i < node.path.len() {
                // The node would split and keep its old suffix as sole static child.
                return match path.get(i).copied() {
                    Some(b':' | b'*') => Err(conflict(full_path, consumed + i, &full[..consumed], &node.path)),
                    _ => Ok(()),
                };
            }

            consumed += i;
            let prefix = &full[..consumed];
            let Some(&c) = full.get(consumed) else {
                return Ok(());
            };

            match c {
                b':' => {
                    if let Some(existing) = node.children.first().or(node.wild_child.as_deref()) {
                        return Err(conflict(full_path, consumed, prefix, &existing.path));
                    }
                    match node.param_child.as_deref() {
                        Some(param) if wildcard_at(full, consumed) == param.path.as_slice() => {
                            node = param;
                        }
                        Some(param) => return Err(conflict(full_path, consumed, prefix, &param.path)),
                        None => return Ok(()),
                    }
                }
                b'*' => {
                    if let Some(existing) = node.children.first().or(node.param_child.as_deref()) {
                        return Err(conflict(full_path, consumed, prefix, &existing.path));
                    }
                    return match node.wild_child.as_deref() {
                        Some(wild) if wildcard_at(full, consumed) != wild.path.as_slice() => {
                            Err(conflict(full_path, consumed, prefix, &wild.path))
                        }
                        _ => Ok(()),
                    };
                }
                c => {
                    if let Some(existing) = node.param_child.as_deref().or(node.wild_child.as_deref()) {
                        return Err(conflict(full_path, consumed, prefix, &existing.path));
                    }
                    match node.static_child(c) {
                        Some(child) => node = child,
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    /// Inserts a conflict-free pattern into a non-empty tree.
    fn insert(&mut self, full: &[u8], handlers: HandlersChain<H>) {
        let mut node = self;
        let mut path = full;

        loop {
            let i = longest_common_prefix(path, &node.path);
            if i < node.path.len() {
                node.split_at(i);
            }
            node.max_params = node.max_params.max(count_params(path));

            path = &path[i..];
            let Some(&c) = path.first() else {
                node.handlers = Some(handlers);
                return;
            };

            match c {
                b':' => {
                    if node.param_child.is_none() {
                        let mut child = Node::new();
                        child.insert_child(path, handlers);
                        node.param_child = Some(Box::new(child));
                        return;
                    }
                    node = match node.param_child.as_deref_mut() {
                        Some(child) => child,
                        None => return,
                    };
                }
                b'*' => {
                    if node.wild_child.is_none() {
                        let mut child = Node::new();
                        child.insert_child(path, handlers);
                        node.wild_child = Some(Box::new(child));
                        return;
                    }
                    node = match node.wild_child.as_deref_mut() {
                        Some(child) => child,
                        None => return,
                    };
                }
                c => match node.indices.iter().position(|&b| b == c) {
                    Some(pos) => node = &mut node.children[pos],
                    None => {
                        let mut child = Node::new();
                        child.insert_child(path, handlers);
                        node.indices.push(c);
                        node.children.push(child);
                        return;
                    }
                },
            }
        }
    }

    /// Builds the chain of fresh nodes for `path` below an empty node.
    fn insert_child(&mut self, mut path: &[u8], handlers: HandlersChain<H>) {
        let mut node = self;

        loop {
            node.max_params = count_params(path);

            let end = match path.first() {
                Some(&b':') => {
                    node.n_type = NodeType::Param;
                    wildcard_at(path, 0).len()
                }
                Some(&b'*') => {
                    node.n_type = NodeType::CatchAll;
                    wildcard_at(path, 0).len()
                }
                _ => path
                    .iter()
                    .position(|&b| b == b':' || b == b'*')
                    .unwrap_or(path.len()),
            };

            node.path = path[..end].to_vec();
            path = &path[end..];

            let Some(&c) = path.first() else {
                node.handlers = Some(handlers);
                return;
            };

            let slot = match c {
                b':' => &mut node.param_child,
                b'*' => &mut node.wild_child,
                c => {
                    node.indices.push(c);
                    node.children.push(Node::new());
                    let last = node.children.len() - 1;
                    node = &mut node.children[last];
                    continue;
                }
            };
            node = &mut **slot.insert(Box::new(Node::new()));
        }
    }

    /// Shrinks this node's label to `path[..i]`, moving the rest into a new child.
    fn split_at(&mut self, i: usize) {
        let child = Node {
            path: self.path.split_off(i),
            indices: std::mem::take(&mut self.indices),
            children: std::mem::take(&mut self.children),
            param_child: self.param_child.take(),
            wild_child: self.wild_child.take(),
            handlers: self.handlers.take(),
            priority: self.priority,
            n_type: NodeType::Static,
            max_params: self.max_params,
        };
        self.indices = vec![child.path[0]];
        self.children = vec![child];
    }

    /// Bumps the route count along `path` and keeps busier static children first.
    fn increment_priorities(&mut self, full: &[u8]) {
        self.priority += 1;
        let mut node = self;
        let mut path = full;

        loop {
            path = match path.strip_prefix(node.path.as_slice()) {
                Some(rest) => rest,
                None => return,
            };
            let Some(&c) = path.first() else {
                return;
            };

            match c {
                b':' | b'*' => {
                    let next = if c == b':' {
                        node.param_child.as_deref_mut()
                    } else {
                        node.wild_child.as_deref_mut()
                    };
                    let Some(next) = next else {
                        return;
                    };
                    next.priority += 1;
                    node = next;
                }
                c => {
                    let Some(pos) = node.indices.iter().position(|&b| b == c) else {
                        return;
                    };
                    node.children[pos].priority += 1;
                    let pos = node.reorder_child(pos);
                    node = &mut node.children[pos];
                }
            }
        }
    }

    /// Moves the static child at `pos` ahead of siblings with lower priority.
    fn reorder_child(&mut self, pos: usize) -> usize {
        let priority = self.children[pos].priority;
        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < priority {
            new_pos -= 1;
        }
        if new_pos != pos {
            self.children[new_pos..=pos].rotate_right(1);
            self.indices[new_pos..=pos].rotate_right(1);
        }
        new_pos
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    /// Returns the handler chain registered for the request `path`.
    ///
    /// Parameter values are written into `params` (cleared first) and handed
    /// back in the result. When nothing matches but the path with a trailing
    /// slash added or removed would, `tsr` is set.
    pub fn get_value<'k, 'v>(
        &'k self,
        path: &'v str,
        mut params: Params<'k, 'v>,
        unescape: bool,
    ) -> Value<'k, 'v, H> {
        params.reset(self.max_params);
        let mut tsr = false;
        let handlers = self.lookup(path, 0, &mut params, unescape, &mut tsr);
        Value {
            tsr: handlers.is_none() && tsr,
            handlers,
            params,
        }
    }

    fn lookup<'k, 'v>(
        &'k self,
        path: &'v str,
        pos: usize,
        params: &mut Params<'k, 'v>,
        unescape_values: bool,
        tsr: &mut bool,
    ) -> Option<&'k HandlersChain<H>> {
        let remaining = path.as_bytes().get(pos..)?;
        let mark = params.len();

        let pos = match self.n_type {
            NodeType::Static | NodeType::Root => {
                if !remaining.starts_with(&self.path) {
                    // `/foo` requested, only `/foo/` registered
                    if remaining.len() + 1 == self.path.len()
                        && self.path.ends_with(b"/")
                        && self.path.starts_with(remaining)
                        && (self.handlers.is_some() || self.wild_child.is_some())
                    {
                        *tsr = true;
                    }
                    return None;
                }
                pos + self.path.len()
            }
            NodeType::Param => {
                let end = remaining
                    .iter()
                    .position(|&b| b == b'/')
                    .unwrap_or(remaining.len());
                if end == 0 {
                    return None;
                }
                let raw = path.get(pos..pos + end)?;
                params.push(self.wildcard_name(), decode(raw, unescape_values));
                pos + end
            }
            NodeType::CatchAll => {
                let handlers = self.handlers.as_ref()?;
                let raw = path.get(pos..)?;
                params.push(self.wildcard_name(), decode(raw, unescape_values));
                return Some(handlers);
            }
        };

        let remaining = &path.as_bytes()[pos..];

        if remaining.is_empty() {
            if let Some(handlers) = &self.handlers {
                return Some(handlers);
            }
            // `/files/` against `/files/*filepath`
            if let Some(wild) = &self.wild_child {
                if let Some(handlers) = wild.lookup(path, pos, params, unescape_values, tsr) {
                    return Some(handlers);
                }
            }
            if let Some(child) = self.static_child(b'/') {
                if child.path == b"/" && (child.handlers.is_some() || child.wild_child.is_some()) {
                    *tsr = true;
                }
            }
            if self.n_type == NodeType::Root && path == "/" && !self.children.is_empty() {
                *tsr = true;
            }
            params.truncate(mark);
            return None;
        }

        // A static hit is tried first; a miss deeper down falls back to the
        // wildcard branches of this node.
        if let Some(child) = self.static_child(remaining[0]) {
            if let Some(handlers) = child.lookup(path, pos, params, unescape_values, tsr) {
                return Some(handlers);
            }
        }
        if let Some(child) = &self.param_child {
            if let Some(handlers) = child.lookup(path, pos, params, unescape_values, tsr) {
                return Some(handlers);
            }
        }
        if let Some(child) = &self.wild_child {
            if let Some(handlers) = child.lookup(path, pos, params, unescape_values, tsr) {
                return Some(handlers);
            }
        }

        // `/foo/` requested, only `/foo` registered
        if remaining == b"/" && self.handlers.is_some() {
            *tsr = true;
        }
        params.truncate(mark);
        None
    }

    // ---------------------------------------------------------------------
    // Case-insensitive recovery
    // ---------------------------------------------------------------------

    /// Finds the registered spelling of `path`, folding ASCII case on static
    /// segments only. Parameter values are copied verbatim.
    ///
    /// Non-ASCII letters must match byte for byte: `/π` does not recover a
    /// route registered as `/Π`, unlike routers that fold whole Unicode
    /// characters.
    ///
    /// With `fix_trailing_slash`, a failed search is retried once with a
    /// trailing slash added or removed.
    pub fn find_case_insensitive_path(&self, path: &str, fix_trailing_slash: bool) -> Option<String> {
        let mut out = Vec::with_capacity(path.len() + 1);
        if self.find_ci(path.as_bytes(), &mut out) {
            return String::from_utf8(out).ok();
        }
        if fix_trailing_slash {
            let toggled = toggle_trailing_slash(path);
            out.clear();
            if self.find_ci(toggled.as_bytes(), &mut out) {
                return String::from_utf8(out).ok();
            }
        }
        None
    }

    fn find_ci(&self, path: &[u8], out: &mut Vec<u8>) -> bool {
        let mark = out.len();

        let rest = match self.n_type {
            NodeType::Static | NodeType::Root => {
                match path.get(..self.path.len()) {
                    Some(head) if head.eq_ignore_ascii_case(&self.path) => {}
                    _ => return false,
                }
                out.extend_from_slice(&self.path);
                &path[self.path.len()..]
            }
            NodeType::Param => {
                let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
                if end == 0 {
                    return false;
                }
                out.extend_from_slice(&path[..end]);
                &path[end..]
            }
            NodeType::CatchAll => {
                if self.handlers.is_none() {
                    return false;
                }
                out.extend_from_slice(path);
                return true;
            }
        };

        if rest.is_empty() {
            if self.handlers.is_some() {
                return true;
            }
            if let Some(wild) = &self.wild_child {
                if wild.find_ci(rest, out) {
                    return true;
                }
            }
            out.truncate(mark);
            return false;
        }

        // Upper- and lower-case spellings may live in different static children.
        for child in &self.children {
            if child.path[0].eq_ignore_ascii_case(&rest[0]) && child.find_ci(rest, out) {
                return true;
            }
        }
        for child in [&self.param_child, &self.wild_child].into_iter().flatten() {
            if child.find_ci(rest, out) {
                return true;
            }
        }

        out.truncate(mark);
        false
    }

    // ---------------------------------------------------------------------
    // Exact pattern lookup and deletion
    // ---------------------------------------------------------------------

    /// Walks the literal route pattern (wildcards included) to its node.
    fn locate(&self, path: &[u8]) -> Option<Vec<Step>> {
        let mut steps = Vec::new();
        let mut node = self;
        let mut path = path;

        loop {
            path = path.strip_prefix(node.path.as_slice())?;
            let Some(&c) = path.first() else {
                return Some(steps);
            };
            let step = match c {
                b':' => Step::Param,
                b'*' => Step::CatchAll,
                c => Step::Static(node.indices.iter().position(|&b| b == c)?),
            };
            node = node.child(step)?;
            steps.push(step);
        }
    }

    /// Chain registered under exactly this pattern; no wildcard matching.
    pub fn get_handlers(&self, path: &str) -> Option<&HandlersChain<H>> {
        let steps = self.locate(path.as_bytes())?;
        steps
            .iter()
            .try_fold(self, |node, &step| node.child(step))?
            .handlers
            .as_ref()
    }

    /// Removes the route `path` if its chain is `handlers` (by identity).
    ///
    /// Nodes left without handlers or children are pruned bottom-up, and a
    /// surviving node with a single static child is merged with it.
    pub fn del_route(&mut self, path: &str, handlers: &HandlersChain<H>) -> bool {
        let Some(steps) = self.locate(path.as_bytes()) else {
            return false;
        };
        let Some(target) = self.descend_mut(&steps) else {
            return false;
        };
        if !target.handlers.as_ref().is_some_and(|h| h.same_chain(handlers)) {
            return false;
        }
        target.handlers = None;

        let mut node = &mut *self;
        node.priority = node.priority.saturating_sub(1);
        for &step in &steps {
            let Some(child) = node.child_mut(step) else {
                break;
            };
            child.priority = child.priority.saturating_sub(1);
            node = child;
        }

        self.prune(&steps);
        true
    }

    fn prune(&mut self, steps: &[Step]) {
        let mut depth = steps.len();
        while depth > 0 {
            let Some(parent) = self.descend_mut(&steps[..depth - 1]) else {
                return;
            };
            let step = steps[depth - 1];
            if !parent.child(step).is_some_and(Node::is_vacant) {
                break;
            }
            parent.remove_child(step);
            depth -= 1;
        }

        if let Some(node) = self.descend_mut(&steps[..depth]) {
            node.merge_single_child();
        }
        if self.is_vacant() {
            *self = Node::new();
        }
    }

    fn remove_child(&mut self, step: Step) {
        match step {
            Step::Static(i) => {
                self.children.remove(i);
                self.indices.remove(i);
            }
            Step::Param => self.param_child = None,
            Step::CatchAll => self.wild_child = None,
        }
    }

    fn merge_single_child(&mut self) {
        if !matches!(self.n_type, NodeType::Static | NodeType::Root)
            || self.handlers.is_some()
            || self.param_child.is_some()
            || self.wild_child.is_some()
            || self.children.len() != 1
        {
            return;
        }
        let Some(child) = self.children.pop() else {
            return;
        };
        if child.n_type != NodeType::Static {
            self.children.push(child);
            return;
        }

        self.path.extend_from_slice(&child.path);
        self.indices = child.indices;
        self.children = child.children;
        self.param_child = child.param_child;
        self.wild_child = child.wild_child;
        self.handlers = child.handlers;
        self.priority = child.priority;
        self.max_params = child.max_params;
    }

    // ---------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------

    /// Every registered pattern with its chain, depth-first in tree order.
    pub fn routes(&self) -> Vec<(String, &HandlersChain<H>)> {
        let mut routes = Vec::new();
        let mut prefix = Vec::new();
        self.collect_routes(&mut prefix, &mut routes);
        routes
    }

    fn collect_routes<'a>(&'a self, prefix: &mut Vec<u8>, routes: &mut Vec<(String, &'a HandlersChain<H>)>) {
        let mark = prefix.len();
        prefix.extend_from_slice(&self.path);
        if let Some(handlers) = &self.handlers {
            routes.push((String::from_utf8_lossy(prefix).into_owned(), handlers));
        }
        for child in &self.children {
            child.collect_routes(prefix, routes);
        }
        for child in [&self.param_child, &self.wild_child].into_iter().flatten() {
            child.collect_routes(prefix, routes);
        }
        prefix.truncate(mark);
    }
}

fn decode(raw: &str, unescape_values: bool) -> Cow<'_, str> {
    if unescape_values {
        unescape(raw)
    } else {
        Cow::Borrowed(raw)
    }
}

/// The wildcard (`:name` / `*name`) starting at `start`, up to the next `/`.
fn wildcard_at(path: &[u8], start: usize) -> &[u8] {
    let tail = &path[start..];
    let end = tail
        .iter()
        .skip(1)
        .position(|&b| b == b'/')
        .map_or(tail.len(), |p| p + 1);
    &tail[..end]
}

fn conflict(path: &str, at: usize, prefix: &[u8], existing: &[u8]) -> RouteError {
    let segment_end = path.as_bytes()[at..]
        .iter()
        .position(|&b| b == b'/')
        .map_or(path.len(), |p| at + p);
    let mut existing_path = prefix.to_vec();
    existing_path.extend_from_slice(existing);

    RouteError::WildcardConflict {
        segment: String::from_utf8_lossy(&path.as_bytes()[at..segment_end]).into_owned(),
        path: path.to_string(),
        existing: String::from_utf8_lossy(&existing_path).into_owned(),
    }
}

/// Syntactic checks that need no tree: placement and naming of wildcards.
fn validate_pattern(path: &str) -> Result<(), RouteError> {
    if !path.starts_with('/') {
        return Err(RouteError::InvalidPath(path.to_string()));
    }

    let bytes = path.as_bytes();
    let mut names: Vec<&[u8]> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c != b':' && c != b'*' {
            i += 1;
            continue;
        }

        let wildcard = wildcard_at(bytes, i);
        let name = &wildcard[1..];
        if name.iter().any(|&b| b == b':' || b == b'*') {
            return Err(RouteError::MultipleWildcardsInSegment {
                segment: String::from_utf8_lossy(wildcard).into_owned(),
                path: path.to_string(),
            });
        }
        if name.is_empty() {
            return Err(RouteError::EmptyWildcardName(path.to_string()));
        }
        if names.contains(&name) {
            return Err(RouteError::DuplicateParamName {
                name: String::from_utf8_lossy(name).into_owned(),
                path: path.to_string(),
            });
        }
        names.push(name);

        let end = i + wildcard.len();
        if c == b'*' {
            if end != bytes.len() {
                return Err(RouteError::CatchAllNotLast(path.to_string()));
            }
            if bytes[i - 1] != b'/' {
                return Err(RouteError::CatchAllWithoutSlash(path.to_string()));
            }
        }
        i = end;
    }
    Ok(())
}
