//! Class-hierarchy oracle for the basalt attribute system.
//!
//! The attribute engine matches registrations against a runtime class and its
//! ancestors, but the engine itself knows nothing about the host platform's
//! object model. This crate owns that vocabulary: [`ClassId`] handles issued
//! by a [`ClassTree`], the [`ClassKind`] of each registered class, and the
//! [`ClassHierarchy`] trait the engine consumes.
//!
//! Ancestor lists are computed once at class registration and never
//! invalidated: class relationships never change at runtime and classes never
//! unload for the lifetime of the process. Sharing a finished tree behind an
//! `Arc` freezes it, since registration requires `&mut`.

use std::fmt;

mod tree;

pub use tree::ClassTree;

/// Identifies a class registered in a [`ClassTree`].
///
/// Ids are dense, issued in registration order, and only meaningful to the
/// tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// What kind of class a [`ClassId`] refers to.
///
/// Only [`Concrete`](ClassKind::Concrete) classes can be instantiated, which
/// matters to exact-class attribute registrations: an exact mapping against
/// an abstract class or interface could never match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// A class that can be instantiated.
    Concrete,
    /// A class that can only be instantiated through a subclass.
    Abstract,
    /// An interface; implemented, never instantiated.
    Interface,
}

impl ClassKind {
    /// Whether objects of exactly this class can exist at runtime.
    #[inline]
    #[must_use]
    pub const fn is_instantiable(self) -> bool {
        matches!(self, Self::Concrete)
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Concrete => "concrete class",
            Self::Abstract => "abstract class",
            Self::Interface => "interface",
        })
    }
}

/// The seam between the attribute engine and the host's object model.
///
/// Implementations must be total and deterministic over the ids they issued:
/// the same id always yields the same ancestor list, kind, and name. The
/// engine calls [`ancestors`](Self::ancestors) on every inheriting-class
/// lookup, so implementations are expected to memoize it permanently (the
/// provided [`ClassTree`] computes each list eagerly at registration).
pub trait ClassHierarchy {
    /// The ancestor list of `class`, in match order: the class itself first,
    /// then interfaces before the superclass at each level of the chain,
    /// de-duplicated keeping the first occurrence.
    fn ancestors(&self, class: ClassId) -> &[ClassId];

    /// The kind of `class`.
    fn kind(&self, class: ClassId) -> ClassKind;

    /// The diagnostic name of `class`.
    fn name(&self, class: ClassId) -> &str;

    /// Whether `ancestor` appears in the ancestor list of `class`.
    ///
    /// Every class is an ancestor of itself.
    fn is_ancestor(&self, ancestor: ClassId, class: ClassId) -> bool {
        self.ancestors(class).contains(&ancestor)
    }
}
