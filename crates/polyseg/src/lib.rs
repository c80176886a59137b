//! A family of type-segregated polymorphic containers: sequence containers
//! that hold heterogeneous elements sharing a common interface while
//! physically grouping each concrete element type contiguously in its own
//! internal segment, in the spirit of boost::poly_collection.
//!
//! [`collection::Collection`] is the entry point. It is generic over a
//! [`model::Model`], which fixes what "the common interface" means: a
//! shared base trait object ([`model::base::BaseModel`]), an ad hoc
//! structural capability ([`model::any::AnyModel`]), a callable signature
//! ([`model::function::FunctionModel`]), or a closed, enumerated set of
//! unrelated types ([`model::variant::VariantModel2`]..[`VariantModel6`]).
//! A concrete element type opts into a model by implementing
//! [`model::ElementOf`] for it.
//!
//! Traversal comes in two flavours: [`iter::CollectionIterator`] walks
//! every segment through the model's view type, while
//! [`iter::LocalIterator`] (reached via
//! [`collection::Collection::local_iter`]) walks one already-identified
//! segment as its concrete element type directly, with no model
//! indirection at all — the cache-friendly path this crate exists for.

pub mod capability;
pub mod cell;
pub mod collection;
pub mod error;
pub mod iter;
pub mod model;
pub mod reference_variant;
pub mod segment;
pub mod type_tag;

pub use cell::Cell;
pub use collection::{Collection, CollectionPos, SegmentHeader};
pub use error::{PolyCollectionError, Result};
pub use model::{ElementOf, Model};
pub use type_tag::TypeTag;
