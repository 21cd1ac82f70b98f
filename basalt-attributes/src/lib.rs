//! Attribute registration and priority resolution for voxel-engine plugins.
//!
//! Game objects (blocks, items, block entities, entities) advertise
//! "attributes" — capability interfaces like item inventories or fluid tanks
//! — without the engine knowing about them ahead of time. Each attribute
//! type owns one registry that accepts five kinds of registration
//! (exact-instance, specific-predicate, exact-class, inheriting-class,
//! general-predicate), each tagged with an [`AttributeSourceType`]
//! provenance, and deterministically resolves the single highest-priority
//! match for any `(key, class)` query. Resolutions are memoized per key and
//! per class, with memoization invalidated when new registrations arrive.
//!
//! [`AdderMap`] is the single-threaded engine; [`Attribute`] wraps it in a
//! read-write lock for shared use. Class identity and ancestor order come
//! from the `basalt-hierarchy` crate.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use basalt_attributes::{AdderMap, AttributeSourceType};
//! use basalt_hierarchy::{ClassKind, ClassTree};
//!
//! let mut tree = ClassTree::new();
//! let block = tree.register("Block", ClassKind::Abstract, None, &[]);
//! let chest = tree.register("ChestBlock", ClassKind::Concrete, Some(block), &[]);
//!
//! let mut inventories: AdderMap<u32, &str> =
//!     AdderMap::new("item_inventory", block, Arc::new(tree), "no_inventory");
//! inventories.register_exact(AttributeSourceType::Instance, 54, "chest_inventory");
//!
//! assert_eq!(inventories.get(&54, chest), Some("chest_inventory"));
//! assert_eq!(inventories.get(&1, chest), None);
//! ```

mod adder_map;
mod attribute;
mod attribute_list;
mod error;
mod source;

pub use adder_map::{ABSENT_PRIORITY, AdderMap, Resolved};
pub use attribute::Attribute;
pub use attribute_list::AttributeList;
pub use error::RegistrationError;
pub use source::AttributeSourceType;
