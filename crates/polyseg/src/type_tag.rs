//! Process-stable identity for a concrete element type.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A process-stable identifier for a concrete type `T`, usable as a hash map
/// key. Two `TypeTag`s compare equal iff they were built from the same `T`.
///
/// Carries `type_name::<T>()` purely for diagnostics (error messages, log
/// lines, `Debug`); it plays no role in equality or hashing.
#[derive(Copy, Clone)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Build the tag for `T`.
    pub fn of<T: 'static + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Build a tag from a `TypeId` recovered dynamically (through a trait
    /// object's own vtable, e.g. `mopa::Any::get_type_id`) rather than from
    /// a statically-known `T`. There is no way to recover `type_name::<T>`
    /// from a `TypeId` alone, so the name is a fixed placeholder; it never
    /// participates in equality or hashing anyway.
    pub(crate) fn from_dynamic(id: TypeId) -> Self {
        Self {
            id,
            name: "<dynamically recovered type>",
        }
    }

    /// `std::any::type_name::<T>()` captured at construction, for messages.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeTag").field(&self.name).finish()
    }
}
