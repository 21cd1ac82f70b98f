//! Ordered sinks that matched adders write capability instances into.

use smallvec::SmallVec;

type ValueFilter<V> = Box<dyn Fn(&V) -> bool + Send + Sync>;

/// An ordered collection an engine hands to each matched adder so it can
/// contribute zero or more capability instances.
///
/// The registry itself never builds one of these; they appear at the engine
/// boundary, after resolution, when the winning adder is actually invoked.
/// An optional filter lets a search request only a subset of instances (say,
/// only tanks that accept a particular fluid) without every adder having to
/// know about the restriction. Searches overwhelmingly produce zero, one, or
/// two entries, so storage is inline for small counts.
pub struct AttributeList<V> {
    values: SmallVec<[V; 2]>,
    filter: Option<ValueFilter<V>>,
}

impl<V> AttributeList<V> {
    /// Creates an unfiltered list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: SmallVec::new(),
            filter: None,
        }
    }

    /// Creates a list that only accepts values the filter approves.
    #[must_use]
    pub fn with_filter(filter: impl Fn(&V) -> bool + Send + Sync + 'static) -> Self {
        Self {
            values: SmallVec::new(),
            filter: Some(Box::new(filter)),
        }
    }

    /// Offers a value to the list. Returns whether it was kept.
    pub fn add(&mut self, value: V) -> bool {
        if let Some(filter) = &self.filter {
            if !filter(&value) {
                return false;
            }
        }
        self.values.push(value);
        true
    }

    /// The first collected value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&V> {
        self.values.first()
    }

    /// The value at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    /// Number of collected values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the collected values in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, V> {
        self.values.iter()
    }

    /// Consumes the list, returning the collected values.
    #[must_use]
    pub fn into_vec(self) -> Vec<V> {
        self.values.into_vec()
    }
}

impl<V> Default for AttributeList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> IntoIterator for &'a AttributeList<V> {
    type Item = &'a V;
    type IntoIter = core::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
