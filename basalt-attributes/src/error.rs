//! Configuration errors raised by class-based registration.

use basalt_hierarchy::ClassKind;
use thiserror::Error;

/// A class registration that could never behave usefully.
///
/// Both variants are raised eagerly, before any mutation, so a failed
/// registration leaves the registry exactly as it was. Queries never produce
/// errors; an unmatched query yields the absent sentinel instead.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// `match_subclasses` was false for a class that can never be
    /// instantiated, so the mapping could never match anything.
    #[error(
        "{class} is an {kind} and match_subclasses is false - \
         the mapping would never match, as an {kind} cannot be constructed"
    )]
    NeverInstantiated {
        /// Name of the rejected class.
        class: String,
        /// Why it cannot be instantiated.
        kind: ClassKind,
    },

    /// The class is an ancestor of (or equal to) the attribute's declared
    /// base class, so the mapping would absorb every query.
    #[error(
        "{class} is a superclass or superinterface of the base {base} - \
         it would override every other registration"
    )]
    ShadowsBaseClass {
        /// Name of the rejected class.
        class: String,
        /// Name of the attribute's declared base class.
        base: String,
    },
}
