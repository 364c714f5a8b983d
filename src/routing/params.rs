//! Extracted path parameters.

use std::borrow::Cow;

/// A single URL parameter, consisting of a key and a value.
///
/// Keys borrow from the routing tree, values from the request path (or are
/// owned when percent-decoding changed them).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param<'k, 'v> {
    pub key: &'k str,
    pub value: Cow<'v, str>,
}

/// Ordered parameter list, filled root-to-leaf.
///
/// The order matches the order of the wildcards in the registered pattern.
/// A lookup clears the buffer it is given and keeps its capacity. Values
/// borrow the request path, so a worker that pools one buffer across
/// requests passes it through [`Params::recycle`] before the next lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params<'k, 'v> {
    inner: Vec<Param<'k, 'v>>,
}

impl<'k, 'v> Params<'k, 'v> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes the buffer, typically with the router's `max_params`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
        }
    }

    /// Value of the first parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_ref())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param<'k, 'v>> {
        self.inner.iter()
    }

    /// Owned `(key, value)` pairs, for handing parameters past the borrow.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.inner
            .iter()
            .map(|p| (p.key.to_string(), p.value.to_string()))
            .collect()
    }

    /// Empties the buffer and detaches it from the previous request path and
    /// router, reusing the allocation for the next lookup.
    pub fn recycle<'a, 'b>(mut self) -> Params<'a, 'b> {
        self.inner.clear();
        Params {
            inner: self.inner.into_iter().filter_map(|_| None).collect(),
        }
    }

    pub(crate) fn push(&mut self, key: &'k str, value: Cow<'v, str>) {
        self.inner.push(Param { key, value });
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.inner.truncate(len);
    }

    pub(crate) fn reset(&mut self, capacity: usize) {
        self.inner.clear();
        self.inner.reserve(capacity);
    }
}

impl<'a, 'k, 'v> IntoIterator for &'a Params<'k, 'v> {
    type Item = &'a Param<'k, 'v>;
    type IntoIter = std::slice::Iter<'a, Param<'k, 'v>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
