//! Error types returned by fallible collection and segment operations.

use thiserror::Error;

/// The four runtime error kinds a [`crate::collection::Collection`] (or a
/// segment backend used directly) can surface.
///
/// Static misuse (storing a type the active model rejects) is caught by
/// trait bounds at the call site and never reaches this enum.
#[derive(Debug, Error)]
pub enum PolyCollectionError {
    /// An operation needed a segment for a type that has never been
    /// registered (directly or by prior insertion) and cannot be
    /// auto-created from the static type of the argument.
    #[error("type `{type_name}` is not registered in this collection")]
    UnregisteredType {
        /// `std::any::type_name` of the offending concrete type.
        type_name: &'static str,
    },

    /// A segment copy was attempted for a concrete type that is not
    /// copy-constructible.
    #[error("type `{type_name}` is not copy-constructible")]
    NotCopyConstructible {
        /// `std::any::type_name` of the offending concrete type.
        type_name: &'static str,
    },

    /// An equality comparison was attempted for a concrete type that is
    /// not equality-comparable.
    #[error("type `{type_name}` is not equality-comparable")]
    NotEqualityComparable {
        /// `std::any::type_name` of the offending concrete type.
        type_name: &'static str,
    },

    /// A reference-variant accessor (`get::<T>`) targeted an alternative
    /// that is not the one currently held.
    #[error("bad variant access: expected `{expected}`, found `{found}`")]
    BadVariantAccess {
        /// Name of the alternative the caller asked for.
        expected: &'static str,
        /// Name of the alternative actually held.
        found: &'static str,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PolyCollectionError>;
