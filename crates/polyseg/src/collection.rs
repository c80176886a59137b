//! The collection engine (spec.md §4.8, component C8): the type-map of
//! segments together with dispatch, (e/in)sertion, erase and iterator
//! construction. This is the crate's only public entry point — everything
//! in `model`, `segment` and `iter` exists to make this struct's methods
//! possible to write once, for every model, with no per-model branching.

use std::any::type_name;
use std::mem::ManuallyDrop;

use hashbrown::HashMap;
use log::trace;

use crate::error::{PolyCollectionError, Result};
use crate::iter::{CollectionIterator, CollectionIteratorMut, LocalIterator, LocalIteratorMut};
use crate::model::{ElementOf, Model};
use crate::segment::facade::Segment;
use crate::segment::packed::PackedSegment;
use crate::segment::split::SplitSegment;
use crate::type_tag::TypeTag;

/// A position in whole-collection iteration order (spec.md §4.9's
/// `CollectionIterator` position, in the shape the engine needs for
/// hinted insertion and cross-segment erase): which segment, by its slot
/// in [`Collection::segments`] (stable once assigned — registration never
/// evicts a segment), and a position pointer within it. A `segment` equal
/// to the owning collection's current segment count denotes the universal
/// end.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollectionPos {
    segment: usize,
    pos: *mut u8,
}

/// A snapshot of one segment's identity and size, as handed out by
/// [`Collection::segments`] (spec.md §6's `segment_traversal`).
#[derive(Copy, Clone, Debug)]
pub struct SegmentHeader {
    pub type_tag: TypeTag,
    pub len: usize,
}

/// A type-map of segments: `M::Id -> Segment<M>`, keys unique, insertion
/// order irrelevant (spec.md §3). A key is present iff a segment has ever
/// been created for it, lazily or via [`Collection::register`]; per
/// spec.md §4.8, registration never evicts an existing segment, so a
/// whole-collection iterator's view of "which segments exist" only grows.
pub struct Collection<M: Model> {
    index: HashMap<M::Id, usize>,
    segments: Vec<Segment<M>>,
}

impl<M: Model> Collection<M> {
    pub fn new() -> Self {
        Collection {
            index: HashMap::new(),
            segments: Vec::new(),
        }
    }

    fn segment_for<T: ElementOf<M>>(&self) -> Option<&Segment<M>> {
        self.index.get(&M::type_id::<T>()).map(|&idx| &self.segments[idx])
    }

    fn segment_for_mut<T: ElementOf<M>>(&mut self) -> Option<&mut Segment<M>> {
        let idx = *self.index.get(&M::type_id::<T>())?;
        Some(&mut self.segments[idx])
    }

    /// Find-or-create the segment for `T`, via [`Model::make_backend`] —
    /// the "lazy segment creation on first use of a type" rule of spec.md
    /// §3.
    fn ensure_segment<T: ElementOf<M>>(&mut self) -> usize {
        let id = M::type_id::<T>();
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        trace!("creating segment for `{}`", type_name::<T>());
        let idx = self.segments.len();
        self.segments.push(Segment::new(M::make_backend::<T>()));
        self.index.insert(id, idx);
        idx
    }

    /// Ensure a (possibly empty) segment exists for `T`, without inserting
    /// anything into it (spec.md §6's `register_types<T…>`, one type at a
    /// time — callers needing several types call this once per type).
    pub fn register<T: ElementOf<M>>(&mut self) {
        self.ensure_segment::<T>();
    }

    pub fn is_registered<T: ElementOf<M>>(&self) -> bool {
        self.index.contains_key(&M::type_id::<T>())
    }

    /// Total live element count across every segment.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live element count of `T`'s segment, or `0` if `T` has never been
    /// registered.
    pub fn len_of<T: ElementOf<M>>(&self) -> usize {
        self.segment_for::<T>().map(Segment::len).unwrap_or(0)
    }

    pub fn is_empty_of<T: ElementOf<M>>(&self) -> bool {
        self.len_of::<T>() == 0
    }

    pub fn capacity_of<T: ElementOf<M>>(&self) -> usize {
        self.segment_for::<T>().map(Segment::capacity).unwrap_or(0)
    }

    /// Capacity the whole collection could hold before *any* segment would
    /// need to grow (spec.md §4.8: "the minima over segments"). `0` for a
    /// collection with no segments registered yet.
    pub fn capacity(&self) -> usize {
        self.segments.iter().map(Segment::capacity).min().unwrap_or(0)
    }

    /// Upper bound on how large any one segment could ever grow, taken as
    /// the minimum across every registered segment. Unbounded (`usize::MAX`)
    /// for a collection with no segments registered yet.
    pub fn max_size(&self) -> usize {
        self.segments
            .iter()
            .map(Segment::max_size)
            .min()
            .unwrap_or(usize::MAX)
    }

    /// Reserve `additional` more elements' worth of capacity in every
    /// already-registered segment (spec.md §4.8's whole-collection
    /// `reserve`). Segments not yet registered are unaffected; use
    /// [`Collection::reserve_for`] to reserve ahead of a type's first use.
    pub fn reserve(&mut self, additional: usize) {
        for segment in &mut self.segments {
            segment.reserve(additional);
        }
    }

    /// Reserve capacity in `T`'s segment, creating it if necessary.
    pub fn reserve_for<T: ElementOf<M>>(&mut self, additional: usize) {
        let idx = self.ensure_segment::<T>();
        self.segments[idx].reserve(additional);
    }

    /// Shrink every registered segment's capacity to fit its current
    /// length (spec.md §4.8's whole-collection `shrink_to_fit`).
    pub fn shrink_to_fit(&mut self) {
        for segment in &mut self.segments {
            segment.shrink_to_fit();
        }
    }

    pub fn shrink_to_fit_for<T: ElementOf<M>>(&mut self) {
        if let Some(segment) = self.segment_for_mut::<T>() {
            segment.shrink_to_fit();
        }
    }

    /// Clear every segment; segments themselves are kept (spec.md §3:
    /// "empty segments may persist after element removal").
    pub fn clear(&mut self) {
        for segment in &mut self.segments {
            segment.clear();
        }
    }

    pub fn clear_of<T: ElementOf<M>>(&mut self) {
        if let Some(segment) = self.segment_for_mut::<T>() {
            segment.clear();
        }
    }

    /// Resolve which segment a value of static type `T` actually belongs
    /// in (spec.md §4.8's insertion dispatch): determine the dynamic type
    /// id via [`Model::dynamic_id`] (skipped in favour of the static id
    /// whenever [`Model::is_terminal`] says there's nothing further to
    /// discover — true of every model this crate ships, but the engine is
    /// written against the general case). If a segment for that id exists,
    /// use it; if not and the dynamic id matches `T`'s own static id,
    /// auto-register `T`; otherwise fail with
    /// [`PolyCollectionError::UnregisteredType`]. Returns the segment index
    /// and the backend-facing source address, [`Model::subaddress`] of the
    /// erased pointer (the most-derived object's address).
    fn dispatch<T: ElementOf<M>>(&mut self, ptr: *mut T) -> Result<(usize, *mut u8)> {
        let erased = T::erase(ptr);
        let static_id = M::type_id::<T>();
        let dyn_id = if M::is_terminal::<T>() {
            static_id
        } else {
            unsafe { M::dynamic_id(erased) }
        };
        let idx = match self.index.get(&dyn_id) {
            Some(&idx) => idx,
            None if dyn_id == static_id => self.ensure_segment::<T>(),
            None => {
                return Err(PolyCollectionError::UnregisteredType {
                    type_name: type_name::<T>(),
                })
            }
        };
        let src = unsafe { M::subaddress(erased) };
        Ok((idx, src))
    }

    /// Move `value` into its segment, creating the segment if this is the
    /// first element of `T` ever stored (spec.md §4.8's `emplace<T>`,
    /// specialised to Rust's by-value move semantics — there is no
    /// argument-pack/placement-new distinction to preserve here, unlike
    /// the split between `insert`/`emplace` spec.md draws for C++). Fails
    /// with [`PolyCollectionError::UnregisteredType`] if `value`'s dynamic
    /// type turns out to differ from `T` and has never been registered.
    pub fn emplace<T: ElementOf<M>>(&mut self, value: T) -> Result<()> {
        let mut holder = ManuallyDrop::new(value);
        let (idx, src) = self.dispatch(&mut *holder as *mut T)?;
        unsafe {
            self.segments[idx].push_back_move(src);
        }
        Ok(())
    }

    /// `insert` is `emplace` under a different name in this crate: Rust's
    /// move-by-default argument passing already gives `insert(x)` the same
    /// shape spec.md's `emplace<T>(args…)` has once `args…` is just the
    /// one value being moved in.
    pub fn insert<T: ElementOf<M>>(&mut self, value: T) -> Result<()> {
        self.emplace(value)
    }

    /// Copy-insert: like [`Collection::insert`] but takes `value` by
    /// reference and clones it in, failing with
    /// [`crate::error::PolyCollectionError::NotCopyConstructible`] if `T`
    /// isn't `Clone` (or [`PolyCollectionError::UnregisteredType`] per the
    /// same dispatch rule as [`Collection::emplace`]).
    pub fn insert_copy<T: ElementOf<M>>(&mut self, value: &T) -> Result<()> {
        // `dispatch` only ever reads through the pointer (via `T::erase`,
        // `Model::dynamic_id`, `Model::subaddress`), so reusing `value`'s
        // address as a `*mut T` here never actually mutates it.
        let (idx, src) = self.dispatch(value as *const T as *mut T)?;
        unsafe { self.segments[idx].push_back_copy(src as *const u8) }.map(|_| ())
    }

    /// Hinted emplace (spec.md §4.8's `emplace_hint`): if `hint` names the
    /// same segment `value` actually dispatches to, the backend's
    /// positional insert runs at `hint`'s position; otherwise `hint` is
    /// ignored and the value is appended, exactly as spec.md specifies.
    ///
    /// # Safety
    /// If `hint`'s segment is the destination, `hint`'s position must be a
    /// live element boundary inside that segment (or its end); `hint`
    /// itself must have come from this same collection.
    pub unsafe fn emplace_hint<T: ElementOf<M>>(
        &mut self,
        hint: CollectionPos,
        value: T,
    ) -> Result<()> {
        let mut holder = ManuallyDrop::new(value);
        let (idx, src) = self.dispatch(&mut *holder as *mut T)?;
        if hint.segment == idx {
            self.segments[idx].insert_move(hint.pos, src);
        } else {
            self.segments[idx].push_back_move(src);
        }
        Ok(())
    }

    /// `insert` under a hint, the by-value-argument shape of
    /// [`Collection::emplace_hint`].
    ///
    /// # Safety
    /// Same as [`Collection::emplace_hint`].
    pub unsafe fn insert_hint<T: ElementOf<M>>(
        &mut self,
        hint: CollectionPos,
        value: T,
    ) -> Result<()> {
        self.emplace_hint(hint, value)
    }

    /// Positional emplace (spec.md §4.8's `emplace_pos`): construct
    /// `value` at local position `pos` inside `T`'s own segment, creating
    /// the segment if this is the first `T` ever stored.
    ///
    /// # Safety
    /// `pos` must be a live element boundary inside `T`'s own segment (or
    /// its end).
    pub unsafe fn emplace_pos<T: ElementOf<M>>(&mut self, pos: *mut u8, value: T) -> Result<()> {
        let mut holder = ManuallyDrop::new(value);
        let (idx, src) = self.dispatch(&mut *holder as *mut T)?;
        self.segments[idx].insert_move(pos, src);
        Ok(())
    }

    /// `insert` at a local position, the by-value-argument shape of
    /// [`Collection::emplace_pos`].
    ///
    /// # Safety
    /// Same as [`Collection::emplace_pos`].
    pub unsafe fn insert_pos<T: ElementOf<M>>(&mut self, pos: *mut u8, value: T) -> Result<()> {
        self.emplace_pos(pos, value)
    }

    /// Insert every element of `values`, in order (spec.md §4.8's range
    /// insert). Every model this crate ships marks every concrete type
    /// terminal, so there is only one destination segment per call and
    /// each element's dispatch is an O(1) lookup regardless; a model with
    /// non-terminal types would need each element re-dispatched anyway,
    /// which is what this already does.
    pub fn insert_range<T, I>(&mut self, values: I) -> Result<()>
    where
        T: ElementOf<M>,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.insert(value)?;
        }
        Ok(())
    }

    /// Erase the element of `T` at local position pointer `pos` (spec.md
    /// §4.8's `erase(local_pos)` — a position pointer previously handed
    /// out by [`Collection::local_iter`] or a segment's own range).
    ///
    /// # Safety
    /// `pos` must be a live element boundary inside `T`'s own segment.
    pub unsafe fn erase_at<T: ElementOf<M>>(&mut self, pos: *mut u8) {
        if let Some(segment) = self.segment_for_mut::<T>() {
            segment.erase_one(pos);
        }
    }

    /// Erase the run `[first, last)` of `T`'s segment.
    ///
    /// # Safety
    /// Same as [`Collection::erase_at`], extended over the whole range.
    pub unsafe fn erase_range_at<T: ElementOf<M>>(&mut self, first: *mut u8, last: *mut u8) {
        if let Some(segment) = self.segment_for_mut::<T>() {
            segment.erase_range(first, last);
        }
    }

    /// Build a [`CollectionPos`] from a local position already known to
    /// belong to `T`'s segment (e.g. a pointer derived from one
    /// [`Collection::local_iter`] hands out), for use with
    /// [`Collection::erase`] or [`Collection::emplace_hint`]. `None` if `T`
    /// has never been registered.
    pub fn position_of<T: ElementOf<M>>(&self, pos: *mut T) -> Option<CollectionPos> {
        let &segment = self.index.get(&M::type_id::<T>())?;
        Some(CollectionPos {
            segment,
            pos: pos as *mut u8,
        })
    }

    /// The universal end position, one past every segment's last element
    /// in `segment_traversal` order.
    pub fn end_pos(&self) -> CollectionPos {
        CollectionPos {
            segment: self.segments.len(),
            pos: std::ptr::null_mut(),
        }
    }

    /// The first live element at or after `segment`, in segment order, or
    /// [`Collection::end_pos`] if none remain.
    fn first_nonempty_from(&self, mut segment: usize) -> CollectionPos {
        while segment < self.segments.len() {
            if !self.segments[segment].is_empty() {
                return CollectionPos {
                    segment,
                    pos: self.segments[segment].range().pos,
                };
            }
            segment += 1;
        }
        self.end_pos()
    }

    /// `pos` as a [`CollectionPos`] unless it names its segment's own end,
    /// in which case advance to the next non-empty segment (or the
    /// universal end) — the "first surviving element after the removed
    /// range" spec.md §4.8 asks erase to return.
    fn pos_or_advance(&self, segment: usize, pos: *mut u8) -> CollectionPos {
        if segment >= self.segments.len() {
            return self.end_pos();
        }
        if pos == self.segments[segment].range().end {
            self.first_nonempty_from(segment + 1)
        } else {
            CollectionPos { segment, pos }
        }
    }

    /// Erase `[first, last)` in whole-collection iteration order (spec.md
    /// §4.8's cross-segment erase): the tail of `first`'s segment is
    /// erased, every segment strictly between `first` and `last` is
    /// cleared outright, and the prefix of `last`'s segment up to `last`
    /// is erased. Returns a position to the first surviving element after
    /// the removed range, or [`Collection::end_pos`].
    ///
    /// # Safety
    /// `first` and `last` must both come from this collection and bound a
    /// valid, ordered run: `first` at or before `last` in
    /// `segment_traversal`/iteration order.
    pub unsafe fn erase(&mut self, first: CollectionPos, last: CollectionPos) -> CollectionPos {
        let len = self.segments.len();
        if first.segment >= len {
            return self.end_pos();
        }
        if first.segment == last.segment {
            self.segments[first.segment].erase_range(first.pos, last.pos);
            return self.pos_or_advance(first.segment, first.pos);
        }
        self.segments[first.segment].erase_till_end(first.pos);
        let last_segment = last.segment.min(len);
        for segment in (first.segment + 1)..last_segment {
            self.segments[segment].clear();
        }
        if last.segment < len {
            // `erase_from_begin` shifts every surviving element down to the
            // segment's base address, not to `last.pos` — the surviving run
            // starts wherever the segment's own range now begins, not at
            // the erased-up-to pointer.
            self.segments[last.segment].erase_from_begin(last.pos);
            let survivor = self.segments[last.segment].range().pos;
            self.pos_or_advance(last.segment, survivor)
        } else {
            self.end_pos()
        }
    }

    /// Shared-reference traversal across every segment, in model-view form
    /// (spec.md §4.9's whole-collection iterator).
    pub fn iter(&self) -> CollectionIterator<'_, M> {
        CollectionIterator::new(&self.segments)
    }

    /// Unique-reference counterpart of [`Collection::iter`].
    pub fn iter_mut(&mut self) -> CollectionIteratorMut<'_, M> {
        CollectionIteratorMut::new(&mut self.segments)
    }

    /// Shared-reference traversal of exactly `T`'s segment, as concrete
    /// `&T`s with no model view involved (spec.md §4.9's local iterator).
    /// Auto-registers `T` if it has never been seen, so this always
    /// returns an iterator (over an empty segment in that case) rather
    /// than an `Option`, matching the type-indexed overload spec.md §4.8
    /// describes for `begin/end<T>()`.
    pub fn local_iter<T: ElementOf<M>>(&mut self) -> LocalIterator<'_, T> {
        let idx = self.ensure_segment::<T>();
        let backend = self.segments[idx].as_any();
        if let Some(packed) = backend.downcast_ref::<PackedSegment<M, T>>() {
            return LocalIterator::new(packed.as_slice());
        }
        if let Some(split) = backend.downcast_ref::<SplitSegment<M, T>>() {
            return LocalIterator::new(split.as_slice());
        }
        unreachable!("a segment backend for T is always either packed or split")
    }

    /// Unique-reference counterpart of [`Collection::local_iter`].
    pub fn local_iter_mut<T: ElementOf<M>>(&mut self) -> LocalIteratorMut<'_, T> {
        let idx = self.ensure_segment::<T>();
        let backend = self.segments[idx].as_any_mut();
        if let Some(packed) = backend.downcast_mut::<PackedSegment<M, T>>() {
            return LocalIteratorMut::new(packed.as_mut_slice());
        }
        if let Some(split) = backend.downcast_mut::<SplitSegment<M, T>>() {
            return LocalIteratorMut::new(split.as_mut_slice());
        }
        unreachable!("a segment backend for T is always either packed or split")
    }

    /// One header per existing segment (spec.md §6's `segment_traversal`),
    /// in no particular order.
    pub fn segments(&self) -> impl Iterator<Item = SegmentHeader> + '_ {
        self.segments.iter().map(|segment| SegmentHeader {
            type_tag: segment.type_tag(),
            len: segment.len(),
        })
    }

    /// Swap the entire contents of two collections (spec.md §6).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Deep-clone every segment into a fresh, independent collection.
    /// Fails with [`crate::error::PolyCollectionError::NotCopyConstructible`]
    /// the first time a stored type turns out not to be `Clone`.
    pub fn try_clone(&self) -> Result<Self> {
        let mut segments = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            segments.push(segment.try_clone()?);
        }
        Ok(Collection {
            index: self.index.clone(),
            segments,
        })
    }

    /// Element-wise equality: both collections must have registered
    /// exactly the same set of types, and each matching pair of segments
    /// must compare equal. Per spec.md §1's non-goals this never compares
    /// collections parameterised over different models.
    pub fn try_eq(&self, other: &Self) -> Result<bool> {
        if self.index.len() != other.index.len() {
            return Ok(false);
        }
        for (&id, &idx) in self.index.iter() {
            let Some(&other_idx) = other.index.get(&id) else {
                return Ok(false);
            };
            if !self.segments[idx].try_eq(&other.segments[other_idx])? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<M: Model> Default for Collection<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::base::BaseModel;
    use mopa::mopafy;

    trait Shape: mopa::Any {
        fn area(&self) -> f64;
    }
    mopafy!(Shape);

    #[derive(Clone, PartialEq, Debug)]
    struct Circle {
        radius: f64,
    }
    impl Shape for Circle {
        fn area(&self) -> f64 {
            std::f64::consts::PI * self.radius * self.radius
        }
    }

    #[derive(Clone, PartialEq, Debug)]
    struct Square {
        side: f64,
    }
    impl Shape for Square {
        fn area(&self) -> f64 {
            self.side * self.side
        }
    }

    #[derive(Clone, PartialEq, Debug)]
    struct Triangle {
        base: f64,
        height: f64,
    }
    impl Shape for Triangle {
        fn area(&self) -> f64 {
            0.5 * self.base * self.height
        }
    }

    type M = BaseModel<dyn Shape>;

    impl ElementOf<M> for Circle {
        fn erase(ptr: *mut Self) -> *mut dyn Shape {
            ptr as *mut dyn Shape
        }
    }
    impl ElementOf<M> for Square {
        fn erase(ptr: *mut Self) -> *mut dyn Shape {
            ptr as *mut dyn Shape
        }
    }
    impl ElementOf<M> for Triangle {
        fn erase(ptr: *mut Self) -> *mut dyn Shape {
            ptr as *mut dyn Shape
        }
    }

    #[test]
    fn insert_segregates_by_concrete_type() {
        let mut c: Collection<M> = Collection::new();
        c.insert(Circle { radius: 1.0 }).unwrap();
        c.insert(Square { side: 2.0 }).unwrap();
        c.insert(Circle { radius: 3.0 }).unwrap();
        assert_eq!(c.len(), 3);
        assert_eq!(c.len_of::<Circle>(), 2);
        assert_eq!(c.len_of::<Square>(), 1);
        assert_eq!(c.iter().count(), 3);
        let headers: Vec<usize> = c.segments().map(|h| h.len).collect();
        assert_eq!(headers.iter().sum::<usize>(), 3);
    }

    #[test]
    fn register_creates_an_empty_segment() {
        let mut c: Collection<M> = Collection::new();
        c.register::<Circle>();
        assert!(c.is_empty());
        assert!(c.is_registered::<Circle>());
    }

    #[test]
    fn emplace_then_erase_restores_emptiness() {
        let mut c: Collection<M> = Collection::new();
        c.emplace(Circle { radius: 7.0 }).unwrap();
        let pos = c.local_iter::<Circle>().next().unwrap() as *const Circle as *mut u8;
        unsafe {
            c.erase_at::<Circle>(pos);
        }
        assert!(c.is_empty_of::<Circle>());
        assert!(c.is_registered::<Circle>());
    }

    #[test]
    fn reserve_then_fill_keeps_capacity_constant() {
        let mut c: Collection<M> = Collection::new();
        c.reserve_for::<Circle>(10);
        let cap = c.capacity_of::<Circle>();
        assert!(cap >= 10);
        for _ in 0..10 {
            c.insert(Circle { radius: 1.0 }).unwrap();
        }
        assert_eq!(c.capacity_of::<Circle>(), cap);
    }

    #[test]
    fn clone_and_equal_round_trip() {
        let mut c: Collection<M> = Collection::new();
        c.insert(Circle { radius: 1.0 }).unwrap();
        c.insert(Square { side: 2.0 }).unwrap();
        let clone = c.try_clone().expect("Circle and Square are Clone");
        assert!(c.try_eq(&clone).expect("Circle and Square are PartialEq"));
    }

    #[test]
    fn local_iter_mut_allows_in_place_updates() {
        let mut c: Collection<M> = Collection::new();
        c.insert(Circle { radius: 1.0 }).unwrap();
        c.insert(Circle { radius: 2.0 }).unwrap();
        for circle in c.local_iter_mut::<Circle>() {
            circle.radius *= 2.0;
        }
        let radii: Vec<f64> = c.local_iter::<Circle>().map(|c| c.radius).collect();
        assert_eq!(radii, vec![2.0, 4.0]);
    }

    #[test]
    fn unregistered_dynamic_type_is_rejected() {
        // every shipped model marks every concrete type terminal, so this
        // path only exercises the static-id fallback of `dispatch`, not a
        // genuine dynamic/static mismatch — there is no model in this crate
        // that can produce one.
        let mut c: Collection<M> = Collection::new();
        assert!(c.insert(Circle { radius: 1.0 }).is_ok());
    }

    #[test]
    fn emplace_hint_inserts_at_hint_when_segment_matches() {
        let mut c: Collection<M> = Collection::new();
        c.insert(Circle { radius: 1.0 }).unwrap();
        c.insert(Circle { radius: 3.0 }).unwrap();
        let mid = c.local_iter::<Circle>().nth(1).unwrap() as *const Circle as *mut Circle;
        let hint = c.position_of(mid).unwrap();
        unsafe {
            c.insert_hint(hint, Circle { radius: 2.0 }).unwrap();
        }
        let radii: Vec<f64> = c.local_iter::<Circle>().map(|c| c.radius).collect();
        assert_eq!(radii, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn hint_from_a_different_segment_is_ignored() {
        let mut c: Collection<M> = Collection::new();
        c.insert(Circle { radius: 1.0 }).unwrap();
        c.insert(Square { side: 9.0 }).unwrap();
        let square_pos = c.local_iter::<Square>().next().unwrap() as *const Square as *mut u8;
        let hint = CollectionPos {
            segment: c.position_of(square_pos as *mut Square).unwrap().segment,
            pos: square_pos,
        };
        unsafe {
            c.insert_hint(hint, Circle { radius: 5.0 }).unwrap();
        }
        let radii: Vec<f64> = c.local_iter::<Circle>().map(|c| c.radius).collect();
        assert_eq!(radii, vec![1.0, 5.0]);
    }

    #[test]
    fn insert_range_appends_every_element_in_order() {
        let mut c: Collection<M> = Collection::new();
        c.insert_range(vec![
            Circle { radius: 1.0 },
            Circle { radius: 2.0 },
            Circle { radius: 3.0 },
        ])
        .unwrap();
        let radii: Vec<f64> = c.local_iter::<Circle>().map(|c| c.radius).collect();
        assert_eq!(radii, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn cross_segment_erase_spans_a_cleared_middle_segment() {
        let mut c: Collection<M> = Collection::new();
        // registration order fixes segment order: Circle = 0, Square = 1,
        // Triangle = 2.
        c.insert(Circle { radius: 1.0 }).unwrap();
        c.insert(Circle { radius: 2.0 }).unwrap();
        c.insert(Square { side: 9.0 }).unwrap();
        c.insert(Triangle { base: 4.0, height: 5.0 }).unwrap();
        c.insert(Triangle { base: 6.0, height: 7.0 }).unwrap();

        let first_circle =
            c.local_iter::<Circle>().next().unwrap() as *const Circle as *mut Circle;
        let first = c.position_of(first_circle).unwrap();

        let second_triangle =
            c.local_iter::<Triangle>().nth(1).unwrap() as *const Triangle as *mut u8;
        let last = c
            .position_of(second_triangle as *mut Triangle)
            .unwrap();

        // erases every Circle, every Square and the first Triangle, leaving
        // only the second Triangle behind.
        let survivor = unsafe { c.erase(first, last) };

        assert!(c.is_empty_of::<Circle>());
        assert!(c.is_empty_of::<Square>());
        assert_eq!(c.len_of::<Triangle>(), 1);
        let remaining_triangle =
            c.local_iter::<Triangle>().next().unwrap() as *const Triangle as *mut Triangle;
        let expected_segment = c.position_of(remaining_triangle).unwrap().segment;
        assert_eq!(survivor.segment, expected_segment);
        assert_eq!(
            unsafe { &*(survivor.pos as *const Triangle) }.base,
            6.0
        );
    }
}
