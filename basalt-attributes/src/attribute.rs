//! The shareable front over an [`AdderMap`].

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use basalt_hierarchy::{ClassHierarchy, ClassId};
use parking_lot::RwLock;

use crate::adder_map::{AdderMap, Resolved};
use crate::error::RegistrationError;
use crate::source::AttributeSourceType;

/// One attribute type's registry, safe to share across threads.
///
/// Wraps the single-threaded [`AdderMap`] engine in a read-write lock:
/// queries take the read path while the caches can answer and retake the
/// lock in write mode only when bucket resolution (and cache population) is
/// needed; registrations always take the write path. Suitable for `static`
/// use behind `LazyLock`, the way an engine holds one registry per attribute
/// for the life of the process.
pub struct Attribute<K, A> {
    name: String,
    map: RwLock<AdderMap<K, A>>,
}

impl<K, A> Attribute<K, A>
where
    K: Clone + Eq + Hash + Debug,
    A: Clone + Debug,
{
    /// Creates a registry named `name` for queries bounded by `base_class`.
    ///
    /// `absent_adder` is returned (wrapped in [`Resolved`]) whenever no
    /// registration matches a query.
    pub fn new(
        name: impl Into<String>,
        base_class: ClassId,
        hierarchy: Arc<dyn ClassHierarchy + Send + Sync>,
        absent_adder: A,
    ) -> Self {
        let name = name.into();
        Self {
            map: RwLock::new(AdderMap::new(name.clone(), base_class, hierarchy, absent_adder)),
            name,
        }
    }

    /// Replaces the projector used to render keys in overwrite warnings.
    #[must_use]
    pub fn with_key_display(
        self,
        display: impl Fn(&K) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            map: RwLock::new(self.map.into_inner().with_key_display(display)),
            name: self.name,
        }
    }

    /// Adjusts the priority-bucket spacing; see
    /// [`AdderMap::with_priority_config`].
    #[must_use]
    pub fn with_priority_config(self, offset: i32, multiplier: i32) -> Self {
        Self {
            map: RwLock::new(self.map.into_inner().with_priority_config(offset, multiplier)),
            name: self.name,
        }
    }

    /// The attribute's diagnostic name, readable without taking the lock.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers an adder for exactly `key`; see
    /// [`AdderMap::register_exact`].
    pub fn register_exact(&self, source: AttributeSourceType, key: K, adder: A) {
        self.map.write().register_exact(source, key, adder);
    }

    /// Registers a specific predicate; see
    /// [`AdderMap::register_specific_predicate`].
    pub fn register_specific_predicate(
        &self,
        source: AttributeSourceType,
        predicate: impl Fn(&K) -> bool + Send + Sync + 'static,
        adder: A,
    ) {
        self.map
            .write()
            .register_specific_predicate(source, predicate, adder);
    }

    /// Registers a general predicate; see
    /// [`AdderMap::register_general_predicate`].
    pub fn register_general_predicate(
        &self,
        source: AttributeSourceType,
        predicate: impl Fn(&K) -> bool + Send + Sync + 'static,
        adder: A,
    ) {
        self.map
            .write()
            .register_general_predicate(source, predicate, adder);
    }

    /// Registers an adder against a class; see
    /// [`AdderMap::register_class`].
    pub fn register_class(
        &self,
        source: AttributeSourceType,
        class: ClassId,
        match_subclasses: bool,
        adder: A,
    ) -> Result<(), RegistrationError> {
        self.map
            .write()
            .register_class(source, class, match_subclasses, adder)
    }

    /// Resolves the winning adder for a `(key, class)` query.
    ///
    /// Cache hits are answered under the read lock; a miss retakes the lock
    /// in write mode to run bucket resolution and populate the caches. A
    /// registration may slip in between the two lock acquisitions, in which
    /// case the write-path resolution simply observes the newer state.
    pub fn resolve(&self, key: &K, class: ClassId) -> Resolved<A> {
        if let Some(hit) = self.map.read().cached(key, class) {
            return hit;
        }
        self.map.write().resolve(key, class)
    }

    /// Like [`resolve`](Self::resolve), but maps the absent sentinel to
    /// `None`.
    pub fn get(&self, key: &K, class: ClassId) -> Option<A> {
        let entry = self.resolve(key, class);
        if entry.is_absent() {
            None
        } else {
            Some(entry.into_adder())
        }
    }
}
