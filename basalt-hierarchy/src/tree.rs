//! The process-scoped class registry.

use rustc_hash::FxHashMap;

use crate::{ClassHierarchy, ClassId, ClassKind};

struct ClassEntry {
    name: &'static str,
    kind: ClassKind,
    /// Computed once at registration, never invalidated.
    ancestors: Vec<ClassId>,
}

/// Registry of classes and their permanently memoized ancestor lists.
///
/// Built during engine bootstrap, before any attribute queries run: supers
/// must be registered before the classes that extend or implement them, and
/// moving the finished tree into an `Arc` freezes it (registration requires
/// `&mut self`). Issued [`ClassId`]s stay valid for the life of the tree.
///
/// Names are for diagnostics and lookup only; identity is the id. Registering
/// a second class under an already-used name warns and rebinds the name index
/// to the newer id.
pub struct ClassTree {
    classes: Vec<ClassEntry>,
    by_name: FxHashMap<&'static str, ClassId>,
}

impl ClassTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    /// Registers a class and returns its id.
    ///
    /// `extends` is the superclass (at most one, as in the host platform's
    /// object model) and `implements` lists the directly implemented
    /// interfaces in declaration order. Both must already be registered.
    ///
    /// The ancestor list is computed here: the class itself, its direct
    /// interfaces, each interface's own ancestor list, then everything the
    /// superclass considers, de-duplicated keeping the first occurrence.
    ///
    /// # Panics
    ///
    /// Panics on malformed bootstrap input: an interface with a superclass,
    /// extending an interface, or implementing a non-interface.
    pub fn register(
        &mut self,
        name: &'static str,
        kind: ClassKind,
        extends: Option<ClassId>,
        implements: &[ClassId],
    ) -> ClassId {
        if kind == ClassKind::Interface && extends.is_some() {
            panic!("interface {name} cannot extend a class; list super-interfaces in `implements`");
        }
        if let Some(superclass) = extends {
            assert!(
                self.kind(superclass) != ClassKind::Interface,
                "{name} cannot extend the interface {}",
                self.name(superclass)
            );
        }
        for &iface in implements {
            assert!(
                self.kind(iface) == ClassKind::Interface,
                "{name} cannot implement {}, which is a {}",
                self.name(iface),
                self.kind(iface)
            );
        }

        let id = ClassId(u32::try_from(self.classes.len()).expect("class count exceeds u32"));
        let ancestors = self.compute_ancestors(id, extends, implements);
        self.classes.push(ClassEntry {
            name,
            kind,
            ancestors,
        });

        if let Some(previous) = self.by_name.insert(name, id) {
            log::warn!("Rebound class name {name} from {previous:?} to {id:?}");
        }
        id
    }

    /// Registers an interface; `extends` lists its super-interfaces.
    ///
    /// # Panics
    ///
    /// Panics if any of `extends` is not an interface.
    pub fn register_interface(&mut self, name: &'static str, extends: &[ClassId]) -> ClassId {
        self.register(name, ClassKind::Interface, None, extends)
    }

    /// Looks a class up by name, for diagnostics and tests.
    #[must_use]
    pub fn class_named(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no classes have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn entry(&self, class: ClassId) -> &ClassEntry {
        &self.classes[class.0 as usize]
    }

    fn compute_ancestors(
        &self,
        id: ClassId,
        extends: Option<ClassId>,
        implements: &[ClassId],
    ) -> Vec<ClassId> {
        // Lists are short; a Vec with a contains check keeps the first
        // occurrence the way a LinkedHashSet would.
        let mut out = vec![id];
        let mut push = |out: &mut Vec<ClassId>, candidate: ClassId| {
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        };
        for &iface in implements {
            push(&mut out, iface);
        }
        for &iface in implements {
            for &ancestor in &self.entry(iface).ancestors {
                push(&mut out, ancestor);
            }
        }
        if let Some(superclass) = extends {
            for &ancestor in &self.entry(superclass).ancestors {
                push(&mut out, ancestor);
            }
        }
        out
    }
}

impl Default for ClassTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassHierarchy for ClassTree {
    fn ancestors(&self, class: ClassId) -> &[ClassId] {
        &self.entry(class).ancestors
    }

    fn kind(&self, class: ClassId) -> ClassKind {
        self.entry(class).kind
    }

    fn name(&self, class: ClassId) -> &str {
        self.entry(class).name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_is_first_ancestor() {
        let mut tree = ClassTree::new();
        let object = tree.register("Object", ClassKind::Concrete, None, &[]);
        assert_eq!(tree.ancestors(object), &[object]);
        assert!(tree.is_ancestor(object, object));
    }

    #[test]
    fn interfaces_come_before_the_superclass() {
        let mut tree = ClassTree::new();
        let drainable = tree.register_interface("Drainable", &[]);
        let base = tree.register("Base", ClassKind::Abstract, None, &[]);
        let tank = tree.register("Tank", ClassKind::Concrete, Some(base), &[drainable]);

        assert_eq!(tree.ancestors(tank), &[tank, drainable, base]);
    }

    #[test]
    fn diamond_hierarchy_deduplicates_keeping_first_occurrence() {
        let mut tree = ClassTree::new();
        let storage = tree.register_interface("Storage", &[]);
        let fluid_storage = tree.register_interface("FluidStorage", &[storage]);
        let base = tree.register("Base", ClassKind::Abstract, None, &[storage]);
        let tank = tree.register("Tank", ClassKind::Concrete, Some(base), &[fluid_storage]);

        // FluidStorage's transitive Storage wins over Base's copy of it.
        assert_eq!(tree.ancestors(tank), &[tank, fluid_storage, storage, base]);
    }

    #[test]
    fn ancestor_lists_are_stable_across_calls() {
        let mut tree = ClassTree::new();
        let base = tree.register("Base", ClassKind::Abstract, None, &[]);
        let leaf = tree.register("Leaf", ClassKind::Concrete, Some(base), &[]);

        let first: Vec<ClassId> = tree.ancestors(leaf).to_vec();
        let second: Vec<ClassId> = tree.ancestors(leaf).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn lookup_by_name() {
        let mut tree = ClassTree::new();
        let base = tree.register("Base", ClassKind::Concrete, None, &[]);
        assert_eq!(tree.class_named("Base"), Some(base));
        assert_eq!(tree.class_named("Missing"), None);
    }

    #[test]
    fn duplicate_name_rebinds_to_newest_id() {
        let mut tree = ClassTree::new();
        let first = tree.register("Clash", ClassKind::Concrete, None, &[]);
        let second = tree.register("Clash", ClassKind::Concrete, None, &[]);
        assert_ne!(first, second);
        assert_eq!(tree.class_named("Clash"), Some(second));
        // Both ids stay valid regardless of the name rebind.
        assert_eq!(tree.ancestors(first), &[first]);
    }

    #[test]
    #[should_panic(expected = "cannot extend the interface")]
    fn extending_an_interface_panics() {
        let mut tree = ClassTree::new();
        let iface = tree.register_interface("Iface", &[]);
        tree.register("Bad", ClassKind::Concrete, Some(iface), &[]);
    }

    #[test]
    #[should_panic(expected = "cannot implement")]
    fn implementing_a_concrete_class_panics() {
        let mut tree = ClassTree::new();
        let concrete = tree.register("Concrete", ClassKind::Concrete, None, &[]);
        tree.register("Bad", ClassKind::Concrete, None, &[concrete]);
    }

    #[test]
    #[should_panic(expected = "cannot extend a class")]
    fn interface_with_superclass_panics() {
        let mut tree = ClassTree::new();
        let base = tree.register("Base", ClassKind::Concrete, None, &[]);
        tree.register("Bad", ClassKind::Interface, Some(base), &[]);
    }

    #[test]
    fn is_ancestor_walks_the_whole_chain() {
        let mut tree = ClassTree::new();
        let entity = tree.register("Entity", ClassKind::Abstract, None, &[]);
        let animal = tree.register("Animal", ClassKind::Abstract, Some(entity), &[]);
        let dog = tree.register("Dog", ClassKind::Concrete, Some(animal), &[]);

        assert!(tree.is_ancestor(entity, dog));
        assert!(tree.is_ancestor(animal, dog));
        assert!(!tree.is_ancestor(dog, animal));
    }
}
