//! The per-attribute registration store and resolution engine.

use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use basalt_hierarchy::{ClassHierarchy, ClassId};
use rustc_hash::FxHashMap;

use crate::error::RegistrationError;
use crate::source::AttributeSourceType;

/// Priority recorded for a cached "no match" result.
///
/// Real registrations resolve to `8 * (offset + multiplier * ordinal) + kind`
/// with `kind` in `0..=4`; this sentinel sits far above anything a sane
/// priority configuration produces. Lower numeric priority wins.
pub const ABSENT_PRIORITY: i32 = 1 << 16;

type KeyPredicate<K> = Box<dyn Fn(&K) -> bool + Send + Sync>;
type KeyDisplay<K> = Box<dyn Fn(&K) -> String + Send + Sync>;

/// The outcome of one resolution: the winning adder and its priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<A> {
    adder: A,
    priority: i32,
}

impl<A> Resolved<A> {
    const fn new(adder: A, priority: i32) -> Self {
        Self { adder, priority }
    }

    /// The winning adder. For an absent result this is the designated
    /// sentinel the registry was constructed with.
    #[must_use]
    pub fn adder(&self) -> &A {
        &self.adder
    }

    /// Consumes the resolution, returning the adder.
    #[must_use]
    pub fn into_adder(self) -> A {
        self.adder
    }

    /// The priority the winner matched at; [`ABSENT_PRIORITY`] when nothing
    /// matched.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether this is the "no registration matched" sentinel.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.priority == ABSENT_PRIORITY
    }
}

/// Whether a bucket-level match came from an instance rule or a class rule.
/// Decides which resolution cache the result lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    Instance,
    Class,
}

struct PredicateEntry<K, A> {
    predicate: KeyPredicate<K>,
    adder: A,
}

/// One source type's complete set of registration kinds.
///
/// Created lazily the first time something registers under its source type,
/// capturing the base priority in force at that moment.
struct PriorityBucket<K, A> {
    base_priority: i32,
    exact: FxHashMap<K, A>,
    specific_predicates: Vec<PredicateEntry<K, A>>,
    exact_classes: FxHashMap<ClassId, A>,
    inherit_classes: FxHashMap<ClassId, A>,
    general_predicates: Vec<PredicateEntry<K, A>>,
}

impl<K: Clone + Eq + Hash, A: Clone> PriorityBucket<K, A> {
    fn new(base_priority: i32) -> Self {
        Self {
            base_priority,
            exact: FxHashMap::default(),
            specific_predicates: Vec::new(),
            exact_classes: FxHashMap::default(),
            inherit_classes: FxHashMap::default(),
            general_predicates: Vec::new(),
        }
    }

    /// Tries the five kinds in precedence order; first match wins.
    fn get(
        &self,
        key: &K,
        class: ClassId,
        hierarchy: &dyn ClassHierarchy,
    ) -> Option<(Resolved<A>, MatchKind)> {
        if let Some(adder) = self.exact.get(key) {
            return Some((
                Resolved::new(adder.clone(), self.base_priority),
                MatchKind::Instance,
            ));
        }
        for entry in &self.specific_predicates {
            if (entry.predicate)(key) {
                return Some((
                    Resolved::new(entry.adder.clone(), self.base_priority + 1),
                    MatchKind::Instance,
                ));
            }
        }
        if let Some(adder) = self.exact_classes.get(&class) {
            return Some((
                Resolved::new(adder.clone(), self.base_priority + 2),
                MatchKind::Class,
            ));
        }
        for &ancestor in hierarchy.ancestors(class) {
            if let Some(adder) = self.inherit_classes.get(&ancestor) {
                return Some((
                    Resolved::new(adder.clone(), self.base_priority + 3),
                    MatchKind::Class,
                ));
            }
        }
        for entry in &self.general_predicates {
            if (entry.predicate)(key) {
                return Some((
                    Resolved::new(entry.adder.clone(), self.base_priority + 4),
                    MatchKind::Instance,
                ));
            }
        }
        None
    }
}

/// All registrations for one attribute, plus the resolution caches.
///
/// This is the single-threaded engine: registration *and* query take
/// `&mut self`, since queries populate the caches. Wrap it in
/// [`Attribute`](crate::Attribute) when the registry has to be shared.
///
/// Key type `K` identifies the things adders are registered against (a block
/// id, an item id, ...); `A` is the opaque adder value, stored and returned
/// but never invoked. Cache invalidation is deliberately coarse: predicate
/// and class registrations clear both caches outright, because a predicate
/// match is data-dependent and cannot be attributed to specific cached keys.
/// Registrations are rare next to queries, so the re-resolution is cheap.
pub struct AdderMap<K, A> {
    name: String,
    base_class: ClassId,
    hierarchy: Arc<dyn ClassHierarchy + Send + Sync>,
    absent: Resolved<A>,
    key_display: KeyDisplay<K>,
    offset: i32,
    multiplier: i32,
    buckets: [Option<PriorityBucket<K, A>>; 2],
    resolved: FxHashMap<K, Resolved<A>>,
    class_resolved: FxHashMap<ClassId, Resolved<A>>,
}

impl<K, A> AdderMap<K, A>
where
    K: Clone + Eq + Hash + Debug,
    A: Clone + Debug,
{
    /// Creates an empty registry.
    ///
    /// `base_class` is the upper bound of every class this attribute will be
    /// queried with; registering it (or any of its ancestors) as a class
    /// mapping is rejected. `absent_adder` is the sentinel returned when no
    /// registration matches; it is never matched against, only returned.
    pub fn new(
        name: impl Into<String>,
        base_class: ClassId,
        hierarchy: Arc<dyn ClassHierarchy + Send + Sync>,
        absent_adder: A,
    ) -> Self {
        Self {
            name: name.into(),
            base_class,
            hierarchy,
            absent: Resolved::new(absent_adder, ABSENT_PRIORITY),
            key_display: Box::new(|key| format!("{key:?}")),
            offset: 0,
            multiplier: 1,
            buckets: [None, None],
            resolved: FxHashMap::default(),
            class_resolved: FxHashMap::default(),
        }
    }

    /// Replaces the projector used to render keys in overwrite warnings.
    #[must_use]
    pub fn with_key_display(
        mut self,
        display: impl Fn(&K) -> String + Send + Sync + 'static,
    ) -> Self {
        self.key_display = Box::new(display);
        self
    }

    /// Adjusts the priority-bucket spacing.
    ///
    /// A bucket captures `8 * (offset + multiplier * ordinal)` when it is
    /// first created, so configure spacing before registering into the
    /// affected source types. The default (`0`, `1`) gives the
    /// [`Instance`](AttributeSourceType::Instance) bucket priorities 0..=4
    /// and the [`CompatWrapper`](AttributeSourceType::CompatWrapper) bucket
    /// 8..=12.
    #[must_use]
    pub const fn with_priority_config(mut self, offset: i32, multiplier: i32) -> Self {
        self.offset = offset;
        self.multiplier = multiplier;
        self
    }

    /// The attribute's diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared base class queries are bounded by.
    #[must_use]
    pub const fn base_class(&self) -> ClassId {
        self.base_class
    }

    /// Registers an adder for exactly `key`.
    ///
    /// Only the key's own cache entry is evicted: an exact-instance mapping
    /// cannot be reached through class lookup, so class-cached results for
    /// other keys stay valid. Overwriting an existing mapping warns and
    /// proceeds.
    pub fn register_exact(&mut self, source: AttributeSourceType, key: K, adder: A) {
        self.resolved.remove(&key);

        let display = (self.key_display)(&key);
        let bucket = Self::bucket_mut(&mut self.buckets, self.offset, self.multiplier, source);
        match bucket.exact.entry(key) {
            Entry::Occupied(mut slot) => {
                let old = slot.insert(adder);
                log::warn!(
                    "Replaced the attribute {} value for {display} with {:?} (was {old:?})",
                    self.name,
                    slot.get(),
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(adder);
            }
        }
    }

    /// Registers a specific predicate, checked after exact-instance mappings
    /// but before any class mapping.
    ///
    /// Predicates run in insertion order; the first to return true wins its
    /// list. Both caches are cleared, since a new predicate can change the
    /// outcome for any previously cached key.
    pub fn register_specific_predicate(
        &mut self,
        source: AttributeSourceType,
        predicate: impl Fn(&K) -> bool + Send + Sync + 'static,
        adder: A,
    ) {
        self.clear_resolved();
        let bucket = Self::bucket_mut(&mut self.buckets, self.offset, self.multiplier, source);
        bucket.specific_predicates.push(PredicateEntry {
            predicate: Box::new(predicate),
            adder,
        });
    }

    /// Registers a general predicate, the lowest-precedence kind, checked
    /// after every class mapping.
    ///
    /// Same ordering and invalidation rules as
    /// [`register_specific_predicate`](Self::register_specific_predicate).
    pub fn register_general_predicate(
        &mut self,
        source: AttributeSourceType,
        predicate: impl Fn(&K) -> bool + Send + Sync + 'static,
        adder: A,
    ) {
        self.clear_resolved();
        let bucket = Self::bucket_mut(&mut self.buckets, self.offset, self.multiplier, source);
        bucket.general_predicates.push(PredicateEntry {
            predicate: Box::new(predicate),
            adder,
        });
    }

    /// Registers an adder against a class: exactly that class when
    /// `match_subclasses` is false, or the first matching ancestor in
    /// hierarchy order when true.
    ///
    /// Validation runs before any mutation, so an `Err` leaves the registry
    /// untouched. Overwriting an existing mapping for the same class warns
    /// and proceeds.
    pub fn register_class(
        &mut self,
        source: AttributeSourceType,
        class: ClassId,
        match_subclasses: bool,
        adder: A,
    ) -> Result<(), RegistrationError> {
        if !match_subclasses {
            let kind = self.hierarchy.kind(class);
            if !kind.is_instantiable() {
                return Err(RegistrationError::NeverInstantiated {
                    class: self.hierarchy.name(class).to_owned(),
                    kind,
                });
            }
        }
        if self.hierarchy.is_ancestor(class, self.base_class) {
            return Err(RegistrationError::ShadowsBaseClass {
                class: self.hierarchy.name(class).to_owned(),
                base: self.hierarchy.name(self.base_class).to_owned(),
            });
        }

        self.clear_resolved();
        let display = self.hierarchy.name(class).to_owned();
        let bucket = Self::bucket_mut(&mut self.buckets, self.offset, self.multiplier, source);
        let map = if match_subclasses {
            &mut bucket.inherit_classes
        } else {
            &mut bucket.exact_classes
        };
        match map.entry(class) {
            Entry::Occupied(mut slot) => {
                let old = slot.insert(adder);
                log::warn!(
                    "Replaced the attribute {} value for {display} with {:?} (was {old:?})",
                    self.name,
                    slot.get(),
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(adder);
            }
        }
        Ok(())
    }

    /// Looks a query up in the resolution caches without touching the
    /// buckets. `None` means the caches cannot answer and a full
    /// [`resolve`](Self::resolve) is needed.
    #[must_use]
    pub fn cached(&self, key: &K, class: ClassId) -> Option<Resolved<A>> {
        if let Some(entry) = self.resolved.get(key) {
            // An exact-instance hit at priority 0 is the best possible
            // outcome; nothing in the class cache can beat it.
            if entry.priority == 0 {
                return Some(entry.clone());
            }
        }
        match (self.resolved.get(key), self.class_resolved.get(&class)) {
            (Some(instance), Some(class_based)) => {
                // Strictly lower priority wins; the instance entry keeps
                // ties.
                if class_based.priority < instance.priority {
                    Some(class_based.clone())
                } else {
                    Some(instance.clone())
                }
            }
            (Some(instance), None) => Some(instance.clone()),
            (None, Some(class_based)) => Some(class_based.clone()),
            (None, None) => None,
        }
    }

    /// Resolves the winning adder for a `(key, class)` query.
    ///
    /// Consults the caches first; on a miss, tries each source type's bucket
    /// in precedence order and caches the outcome — in the class cache when
    /// the match came from a class rule, otherwise in the instance cache.
    /// A query nothing matches caches and returns the absent sentinel.
    pub fn resolve(&mut self, key: &K, class: ClassId) -> Resolved<A> {
        if let Some(hit) = self.cached(key, class) {
            return hit;
        }

        let mut matched = None;
        for source in AttributeSourceType::ALL {
            if let Some(bucket) = &self.buckets[source.index()] {
                matched = bucket.get(key, class, self.hierarchy.as_ref());
                if matched.is_some() {
                    break;
                }
            }
        }

        match matched {
            Some((entry, MatchKind::Class)) => {
                self.class_resolved.insert(class, entry.clone());
                entry
            }
            Some((entry, MatchKind::Instance)) => {
                self.resolved.insert(key.clone(), entry.clone());
                entry
            }
            None => {
                self.resolved.insert(key.clone(), self.absent.clone());
                self.absent.clone()
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but maps the absent sentinel to
    /// `None`.
    pub fn get(&mut self, key: &K, class: ClassId) -> Option<A> {
        let entry = self.resolve(key, class);
        if entry.is_absent() {
            None
        } else {
            Some(entry.into_adder())
        }
    }

    fn bucket_mut(
        buckets: &mut [Option<PriorityBucket<K, A>>; 2],
        offset: i32,
        multiplier: i32,
        source: AttributeSourceType,
    ) -> &mut PriorityBucket<K, A> {
        buckets[source.index()]
            .get_or_insert_with(|| PriorityBucket::new(8 * (offset + multiplier * source.ordinal())))
    }

    fn clear_resolved(&mut self) {
        self.resolved.clear();
        self.class_resolved.clear();
    }
}
