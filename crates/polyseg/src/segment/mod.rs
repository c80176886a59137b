//! The segment backend contract (spec.md §4.3, component C3) and its two
//! implementations: [`packed`] (C4) and [`split`] (C5).

pub mod facade;
pub mod packed;
pub mod split;

use crate::error::Result;
use crate::model::{ElementOf, Model};
use crate::type_tag::TypeTag;

/// A forward cursor into one segment's storage.
///
/// Every mutating [`SegmentBackend`] operation returns one so callers can
/// refresh cached end-iterators after a reallocation without a second
/// virtual call (spec.md §4.3).
#[derive(Copy, Clone)]
pub struct SegmentRange {
    /// Address of the first live cell this range starts at (or `end` if
    /// the segment is empty at this point).
    pub pos: *mut u8,
    /// Address one past the last live cell.
    pub end: *mut u8,
}

/// Erase a pointer to a concretely-typed payload into `M`'s raw handle.
/// A free function (rather than a closure) so it can be named as a plain
/// `unsafe fn` pointer value — segments capture one of these once, at
/// construction, and hand it to every [`SegmentRange`]-derived iterator.
///
/// # Safety
/// `ptr` must point at a live `T`.
pub(crate) unsafe fn erase_ptr<M: Model, T: ElementOf<M>>(ptr: *mut u8) -> M::TargetPtr {
    T::erase(ptr as *mut T)
}

/// The "eraser" a [`split::SplitSegment`] hands to its iterators: unlike
/// [`erase_ptr`], `ptr` here already points *into the precomputed index*,
/// so the erased handle just needs reading back out, not recomputing.
pub(crate) unsafe fn read_erased<M: Model>(ptr: *mut u8) -> M::TargetPtr {
    *(ptr as *mut M::TargetPtr)
}

/// Uniform virtual contract for a per-concrete-type storage.
///
/// Position parameters are raw pointers into the segment's own storage
/// ("position pointer" in spec.md's terms); a `BaseIterator` caller goes
/// through [`crate::segment::facade::Segment::range`] to get one, a
/// `LocalIterator<C>` caller already has the exact address.
pub trait SegmentBackend<M: Model> {
    /// Number of live elements.
    fn len(&self) -> usize;
    /// `len() == 0`.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Number of elements storable before the next growth.
    fn capacity(&self) -> usize;
    /// Upper bound on how large this segment could ever grow.
    fn max_size(&self) -> usize;

    /// Identity of the concrete type this segment stores.
    fn type_tag(&self) -> TypeTag;

    /// Byte distance between consecutive cells.
    fn stride(&self) -> usize;
    /// The eraser fixed for this segment's concrete type; see
    /// [`erase_ptr`].
    fn eraser(&self) -> unsafe fn(*mut u8) -> M::TargetPtr;

    /// The current `[begin, end)` range.
    fn range(&self) -> SegmentRange;

    fn reserve(&mut self, additional: usize) -> SegmentRange;
    fn shrink_to_fit(&mut self) -> SegmentRange;
    fn clear(&mut self) -> SegmentRange;

    /// # Safety
    /// `ctor` must fully initialize the payload at the address it is
    /// given using `arg`; `arg` must be the pointer `ctor` expects and
    /// need only stay valid across this one call.
    unsafe fn emplace_back(
        &mut self,
        ctor: unsafe fn(*mut u8, *const ()),
        arg: *const (),
    ) -> SegmentRange;

    /// # Safety
    /// Same as [`SegmentBackend::emplace_back`]; `pos` must be a cell
    /// boundary previously returned by this backend (or its end sentinel).
    unsafe fn emplace_at(
        &mut self,
        pos: *mut u8,
        ctor: unsafe fn(*mut u8, *const ()),
        arg: *const (),
    ) -> SegmentRange;

    /// # Safety
    /// `src` must point at a live, fully-initialized payload of this
    /// segment's concrete type.
    unsafe fn push_back_copy(&mut self, src: *const u8) -> Result<SegmentRange>;
    /// # Safety
    /// `src` must point at a live payload of this segment's concrete
    /// type; it is logically moved out of and must not be used again.
    unsafe fn push_back_move(&mut self, src: *mut u8) -> SegmentRange;
    /// # Safety
    /// Same as [`SegmentBackend::push_back_copy`], plus the `pos`
    /// precondition of [`SegmentBackend::emplace_at`].
    unsafe fn insert_copy(&mut self, pos: *mut u8, src: *const u8) -> Result<SegmentRange>;
    /// # Safety
    /// Same as [`SegmentBackend::push_back_move`], plus the `pos`
    /// precondition of [`SegmentBackend::emplace_at`].
    unsafe fn insert_move(&mut self, pos: *mut u8, src: *mut u8) -> SegmentRange;

    /// # Safety
    /// `pos` must be a live element boundary previously returned by this
    /// backend.
    unsafe fn erase_one(&mut self, pos: *mut u8) -> SegmentRange;
    /// # Safety
    /// `first`/`last` must bound a (possibly empty) run of live elements.
    unsafe fn erase_range(&mut self, first: *mut u8, last: *mut u8) -> SegmentRange;
    /// # Safety
    /// `first` must be a live element boundary; erases through the end.
    unsafe fn erase_till_end(&mut self, first: *mut u8) -> SegmentRange;
    /// # Safety
    /// `last` must be a live element boundary; erases from the start.
    unsafe fn erase_from_begin(&mut self, last: *mut u8) -> SegmentRange;

    /// A new backend with the same contents.
    fn copy(&self) -> Result<Box<dyn SegmentBackend<M>>>;
    /// A new, empty backend of the same concrete type.
    fn empty_copy(&self) -> Box<dyn SegmentBackend<M>>;
    /// Element-wise equality against another backend known to hold the
    /// same concrete type (the collection engine never compares backends
    /// for different types).
    fn equal(&self, other: &dyn SegmentBackend<M>) -> Result<bool>;

    /// Downcasting hook for `copy`/`equal`, which need to recover the
    /// concrete backend type behind `dyn SegmentBackend<M>`.
    fn as_any(&self) -> &dyn std::any::Any;
    /// Mutable counterpart of [`SegmentBackend::as_any`], used by
    /// `crate::collection::Collection::local_iter_mut`.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
