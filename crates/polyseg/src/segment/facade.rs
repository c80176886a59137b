//! The segment facade (spec.md §4.7, component C7): an owning,
//! value-semantic wrapper around `Box<dyn SegmentBackend<M>>`.
//!
//! The collection engine (`crate::collection`) only ever talks to a
//! [`Segment`], never to a bare `Box<dyn SegmentBackend<M>>` — this is where
//! the fallible, runtime-checked clone/equality the cell and backend layers
//! expose gets surfaced as ordinary methods with `Result` returns, the same
//! "decided at the call site, not the type system" posture as
//! [`crate::cell::Cell::try_clone`].

use crate::error::Result;
use crate::model::Model;
use crate::segment::{SegmentBackend, SegmentRange};
use crate::type_tag::TypeTag;

/// One concrete type's storage, type-erased behind [`SegmentBackend`] but
/// exposed here with value semantics.
pub struct Segment<M: Model> {
    backend: Box<dyn SegmentBackend<M>>,
}

impl<M: Model> Segment<M> {
    pub(crate) fn new(backend: Box<dyn SegmentBackend<M>>) -> Self {
        Segment { backend }
    }

    pub fn type_tag(&self) -> TypeTag {
        self.backend.type_tag()
    }

    pub fn len(&self) -> usize {
        self.backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.backend.capacity()
    }

    pub fn max_size(&self) -> usize {
        self.backend.max_size()
    }

    pub fn stride(&self) -> usize {
        self.backend.stride()
    }

    pub fn eraser(&self) -> unsafe fn(*mut u8) -> M::TargetPtr {
        self.backend.eraser()
    }

    pub fn range(&self) -> SegmentRange {
        self.backend.range()
    }

    pub fn reserve(&mut self, additional: usize) -> SegmentRange {
        self.backend.reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) -> SegmentRange {
        self.backend.shrink_to_fit()
    }

    pub fn clear(&mut self) -> SegmentRange {
        self.backend.clear()
    }

    /// # Safety
    /// Same as [`SegmentBackend::emplace_back`].
    pub unsafe fn emplace_back(
        &mut self,
        ctor: unsafe fn(*mut u8, *const ()),
        arg: *const (),
    ) -> SegmentRange {
        self.backend.emplace_back(ctor, arg)
    }

    /// # Safety
    /// Same as [`SegmentBackend::emplace_at`].
    pub unsafe fn emplace_at(
        &mut self,
        pos: *mut u8,
        ctor: unsafe fn(*mut u8, *const ()),
        arg: *const (),
    ) -> SegmentRange {
        self.backend.emplace_at(pos, ctor, arg)
    }

    /// # Safety
    /// Same as [`SegmentBackend::push_back_copy`].
    pub unsafe fn push_back_copy(&mut self, src: *const u8) -> Result<SegmentRange> {
        self.backend.push_back_copy(src)
    }

    /// # Safety
    /// Same as [`SegmentBackend::push_back_move`].
    pub unsafe fn push_back_move(&mut self, src: *mut u8) -> SegmentRange {
        self.backend.push_back_move(src)
    }

    /// # Safety
    /// Same as [`SegmentBackend::insert_copy`].
    pub unsafe fn insert_copy(&mut self, pos: *mut u8, src: *const u8) -> Result<SegmentRange> {
        self.backend.insert_copy(pos, src)
    }

    /// # Safety
    /// Same as [`SegmentBackend::insert_move`].
    pub unsafe fn insert_move(&mut self, pos: *mut u8, src: *mut u8) -> SegmentRange {
        self.backend.insert_move(pos, src)
    }

    /// # Safety
    /// Same as [`SegmentBackend::erase_one`].
    pub unsafe fn erase_one(&mut self, pos: *mut u8) -> SegmentRange {
        self.backend.erase_one(pos)
    }

    /// # Safety
    /// Same as [`SegmentBackend::erase_range`].
    pub unsafe fn erase_range(&mut self, first: *mut u8, last: *mut u8) -> SegmentRange {
        self.backend.erase_range(first, last)
    }

    /// # Safety
    /// Same as [`SegmentBackend::erase_till_end`].
    pub unsafe fn erase_till_end(&mut self, first: *mut u8) -> SegmentRange {
        self.backend.erase_till_end(first)
    }

    /// # Safety
    /// Same as [`SegmentBackend::erase_from_begin`].
    pub unsafe fn erase_from_begin(&mut self, last: *mut u8) -> SegmentRange {
        self.backend.erase_from_begin(last)
    }

    /// Clone this segment's contents into a fresh, independent segment.
    ///
    /// Fails with [`crate::error::PolyCollectionError::NotCopyConstructible`]
    /// if the concrete type behind this segment isn't `Clone` — found out
    /// here, at the call site, rather than ruled out at compile time.
    pub fn try_clone(&self) -> Result<Self> {
        self.backend.copy().map(Segment::new)
    }

    /// A new, empty segment of the same concrete type.
    pub fn empty_like(&self) -> Self {
        Segment::new(self.backend.empty_copy())
    }

    /// Element-wise equality against another segment of the *same* concrete
    /// type (the collection engine never compares segments across types).
    ///
    /// Fails with
    /// [`crate::error::PolyCollectionError::NotEqualityComparable`] if the
    /// concrete type isn't `PartialEq`.
    pub fn try_eq(&self, other: &Self) -> Result<bool> {
        self.backend.equal(other.backend.as_ref())
    }

    /// Downcasting hook for [`crate::collection::Collection::local_iter`],
    /// which needs the concrete backend type behind this segment to hand
    /// out concretely-typed local iteration.
    pub(crate) fn as_any(&self) -> &dyn std::any::Any {
        self.backend.as_any()
    }

    pub(crate) fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self.backend.as_any_mut()
    }
}
