//! Provenance tags for attribute registrations.

/// Where an attribute registration came from.
///
/// Every source type owns its own complete set of registration kinds (its
/// "priority bucket"), and source types are consulted in [`ALL`](Self::ALL)
/// order at query time: a match from the content's own definition always
/// outranks one from a compatibility shim, under the default priority
/// configuration.
///
/// This enumeration is deliberately closed. Buckets are stored in an array
/// indexed by [`index`](Self::index), so adding a variant without growing
/// that array fails to compile rather than failing at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSourceType {
    /// Registered directly by the content's own definition.
    Instance,
    /// Registered by a third-party compatibility shim.
    CompatWrapper,
}

impl AttributeSourceType {
    /// All source types, in query-precedence order.
    pub const ALL: [Self; 2] = [Self::Instance, Self::CompatWrapper];

    /// Numeric rank used in priority computation; lower outranks higher.
    #[inline]
    #[must_use]
    pub const fn ordinal(self) -> i32 {
        self as i32
    }

    /// Bucket-array index for this source type.
    #[inline]
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_query_order() {
        assert_eq!(AttributeSourceType::Instance.ordinal(), 0);
        assert_eq!(AttributeSourceType::CompatWrapper.ordinal(), 1);
        assert_eq!(
            AttributeSourceType::ALL,
            [
                AttributeSourceType::Instance,
                AttributeSourceType::CompatWrapper
            ]
        );
    }
}
