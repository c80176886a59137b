//! The model abstraction (spec.md §4.6, component C6).
//!
//! A `Model` fixes, once, every decision the collection engine and the
//! segment backends need but must not hard-code: what a "view" looks like,
//! how a concrete type's identity and address are recovered from one, and
//! whether a type can ever be the dynamic type of something else.
//!
//! The collection and segment code in this crate is written only against
//! this trait — see `crate::collection` and `crate::segment` — exactly as
//! spec.md §4.6 asks ("no model-specific conditionals").

pub mod any;
pub mod base;
pub mod function;
pub mod variant;

use crate::type_tag::TypeTag;

/// A raw, erased handle to one element's storage, as produced by a model's
/// [`Model::erase`]. Internally this is always a fat-or-thin pointer into a
/// segment's storage; it carries no lifetime of its own; safe references
/// with the proper lifetime are produced only by [`Model::view`] /
/// [`Model::view_mut`], which the iterator types call with the lifetime of
/// the borrow they hold on the owning collection.
pub trait Model: 'static {
    /// Process-stable identity for a concrete type under this model.
    type Id: Copy + Eq + std::hash::Hash + std::fmt::Debug + 'static;

    /// Raw erased handle into one element's storage. `Copy` because it is a
    /// pointer-sized (or pointer-pair-sized) value with no drop glue.
    type TargetPtr: Copy + 'static;

    /// The polymorphic view produced by immutable traversal.
    type View<'a>;

    /// The polymorphic view produced by mutable traversal.
    type ViewMut<'a>;

    /// The identity a concrete, statically-known type `T` would have.
    fn type_id<T: 'static>() -> Self::Id;

    /// True when `T` can never be the dynamic type of a value whose
    /// declared type differs from `T` — i.e. there is no further runtime
    /// polymorphism to discover through `T`. Terminal types skip dynamic
    /// type lookup entirely on insert.
    fn is_terminal<T: 'static>() -> bool;

    /// Recover the dynamic type id of the element behind `ptr`.
    ///
    /// # Safety
    /// `ptr` must be a handle produced by [`Model::erase`] for a still-live
    /// element.
    unsafe fn dynamic_id(ptr: Self::TargetPtr) -> Self::Id;

    /// Recover the address of the most-derived object behind `ptr` (for
    /// base-class models with multiple inheritance this may differ from
    /// the cell's own address; every other model returns `ptr`'s address
    /// unchanged).
    ///
    /// # Safety
    /// Same precondition as [`Model::dynamic_id`].
    unsafe fn subaddress(ptr: Self::TargetPtr) -> *mut u8;

    /// Produce the immutable view for `ptr`, borrowed for `'a`.
    ///
    /// # Safety
    /// Same precondition as [`Model::dynamic_id`]; the caller must hold a
    /// shared borrow on the owning storage for at least `'a`.
    unsafe fn view<'a>(ptr: Self::TargetPtr) -> Self::View<'a>;

    /// Produce the mutable view for `ptr`, borrowed for `'a`.
    ///
    /// # Safety
    /// Same precondition as [`Model::dynamic_id`]; the caller must hold a
    /// unique borrow on the owning storage for at least `'a`.
    unsafe fn view_mut<'a>(ptr: Self::TargetPtr) -> Self::ViewMut<'a>;

    /// Construct the segment backend this model wants for a freshly-seen
    /// concrete type `T` (spec.md §4.6's "backend factory"). Pushing the
    /// packed-vs-split choice in here, rather than into
    /// `crate::collection::Collection`, is what keeps the collection engine
    /// free of model-specific conditionals: it just calls this and stores
    /// whatever comes back behind [`crate::segment::SegmentBackend`].
    ///
    /// Defaults to a packed segment, the right choice whenever a view's
    /// address is a constant, cheap offset from its cell's — true of every
    /// built-in model's erasure in this crate, since Rust trait-object
    /// coercion never adjusts the data pointer the way C++ multiple
    /// inheritance can.
    fn make_backend<T: ElementOf<Self>>() -> Box<dyn crate::segment::SegmentBackend<Self>>
    where
        Self: Sized,
    {
        Box::new(crate::segment::packed::PackedSegment::<Self, T>::new())
    }
}

/// Proof that a concrete type `T` can live under model `M`, and the one
/// piece of per-`T` knowledge a model cannot get from `T: 'static` alone:
/// how to turn a bare `*mut T` into `M`'s raw handle.
///
/// This is deliberately *not* a method on [`Model`]: `Model::erase` would
/// need a bound like "`T` implements the model's base trait", and that
/// bound's shape is different for every model (a base trait for
/// [`base::BaseModel`], a capability trait for [`any::AnyModel`], `FnMut`
/// for [`function::FunctionModel`], membership in a fixed type list for
/// [`variant::VariantModel`]) — not expressible as one trait-generic bound.
/// Pushing it onto a per-model, per-`T` impl instead lets every model share
/// the same segment and collection code (spec.md §4.6's "no model-specific
/// conditionals" requirement) while still giving each one its own notion of
/// "what can be stored here".
pub trait ElementOf<M: Model>: 'static {
    /// Erase `ptr` into `M`'s raw handle. Implementations are one-liners —
    /// typically an unsizing cast or a tagged-pointer construction — since
    /// the real work is proving, at the type level, that `Self` belongs to
    /// `M` in the first place.
    fn erase(ptr: *mut Self) -> M::TargetPtr;
}

/// Convenience used by models and the collection engine alike: the tag for
/// `T` reused as `Model::Id` when a model's `Id` type is exactly [`TypeTag`]
/// (true of every built-in model).
pub fn tag_of<T: 'static>() -> TypeTag {
    TypeTag::of::<T>()
}
