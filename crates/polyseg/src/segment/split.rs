//! The split segment (spec.md §4.5, component C5): a contiguous
//! `Vec<Cell<T>>` alongside a parallel `Vec<M::TargetPtr>` holding each live
//! element's *already erased* handle.
//!
//! [`packed::PackedSegment`](super::packed::PackedSegment) recomputes a
//! view's address from a cell's address on every dereference via a constant
//! offset — fine when that's cheap, wrong when a model's erasure is more
//! than a reinterpretation (a `base_model` over a trait with several
//! unrelated vtable slots pays a real adjustment to recover each base
//! subobject's address). A split segment instead pays that cost once, after
//! any operation that could have moved an element, by rebuilding the whole
//! index; iteration then walks the index array directly and never calls
//! the model's erasure function at all.
//!
//! Any store mutation that can change a live element's address — growth
//! past capacity, or the in-place shift `insert`/`erase` does to make or
//! close a gap — invalidates every index entry from that point on, so this
//! segment conservatively rebuilds the *entire* index after every mutation
//! rather than trying to track which entries still happen to be valid.

use std::any::type_name;
use std::marker::PhantomData;
use std::mem;

use log::trace;

use crate::capability;
use crate::cell::Cell;
use crate::error::{PolyCollectionError, Result};
use crate::model::{ElementOf, Model};
use crate::segment::{erase_ptr, read_erased, SegmentBackend, SegmentRange};
use crate::type_tag::TypeTag;

pub struct SplitSegment<M: Model, T: 'static> {
    store: Vec<Cell<T>>,
    index: Vec<M::TargetPtr>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model, T: ElementOf<M>> SplitSegment<M, T> {
    pub fn new() -> Self {
        let mut segment = SplitSegment {
            store: Vec::new(),
            index: Vec::new(),
            _model: PhantomData,
        };
        segment.rebuild_index();
        segment
    }

    fn index_base(&self) -> *mut u8 {
        self.index.as_ptr() as *mut u8
    }

    fn index_of(&self, pos: *mut u8) -> usize {
        let base = self.index_base() as usize;
        let addr = pos as usize;
        (addr - base) / mem::size_of::<M::TargetPtr>()
    }

    fn range_from_index(&self) -> SegmentRange {
        let len = self.store.len();
        SegmentRange {
            pos: self.index_base(),
            end: unsafe { self.index_base().add(len * mem::size_of::<M::TargetPtr>()) },
        }
    }

    /// Re-derive every index entry from the current address of its element,
    /// plus the trailing sentinel entry past `store`'s last live element
    /// (`index.len() == store.len() + 1`, never dereferenced — it exists
    /// only so `index.len()` and positional arithmetic stay in lockstep
    /// with an off-the-end position, the same shape `Vec::as_ptr().add(len)`
    /// gives for free on the store side). Called after any mutation that
    /// could have moved a live element.
    fn rebuild_index(&mut self) {
        self.index.clear();
        self.index.reserve(self.store.len() + 1);
        for cell in self.store.iter_mut() {
            let ptr = cell.get_mut() as *mut T as *mut u8;
            self.index.push(unsafe { erase_ptr::<M, T>(ptr) });
        }
        // Sentinel: never read as a real handle, only ever compared by
        // address via `index.len()`, so any bit pattern is fine.
        self.index.push(unsafe { mem::zeroed() });
    }

    unsafe fn make_room(&mut self, idx: usize) -> *mut u8 {
        self.store.reserve(1);
        let len = self.store.len();
        let base = self.store.as_mut_ptr();
        if idx < len {
            std::ptr::copy(base.add(idx), base.add(idx + 1), len - idx);
        }
        base.add(idx) as *mut u8
    }

    /// Direct access to this segment's storage as concretely-typed cells,
    /// for [`crate::iter::local::LocalIterator`] — which already knows the
    /// concrete `T` and has no use for the model-erased, index-cached view.
    pub(crate) fn as_slice(&self) -> &[Cell<T>] {
        &self.store
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Cell<T>] {
        &mut self.store
    }
}

impl<M: Model, T: ElementOf<M>> Default for SplitSegment<M, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model, T: ElementOf<M>> SegmentBackend<M> for SplitSegment<M, T> {
    fn len(&self) -> usize {
        self.store.len()
    }

    fn capacity(&self) -> usize {
        self.store.capacity()
    }

    fn max_size(&self) -> usize {
        (isize::MAX as usize) / mem::size_of::<Cell<T>>().max(1)
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn stride(&self) -> usize {
        mem::size_of::<M::TargetPtr>()
    }

    fn eraser(&self) -> unsafe fn(*mut u8) -> M::TargetPtr {
        read_erased::<M>
    }

    fn range(&self) -> SegmentRange {
        self.range_from_index()
    }

    fn reserve(&mut self, additional: usize) -> SegmentRange {
        let before = self.store.capacity();
        self.store.reserve(additional);
        if self.store.capacity() != before {
            trace!(
                "split segment<{}> grew capacity {} -> {}, rebuilding index",
                type_name::<T>(),
                before,
                self.store.capacity()
            );
            self.rebuild_index();
        }
        self.range_from_index()
    }

    fn shrink_to_fit(&mut self) -> SegmentRange {
        self.store.shrink_to_fit();
        self.rebuild_index();
        self.range_from_index()
    }

    fn clear(&mut self) -> SegmentRange {
        self.store.clear();
        self.rebuild_index();
        self.range_from_index()
    }

    unsafe fn emplace_back(
        &mut self,
        ctor: unsafe fn(*mut u8, *const ()),
        arg: *const (),
    ) -> SegmentRange {
        self.store.reserve(1);
        let idx = self.store.len();
        let dest = self.store.as_mut_ptr().add(idx) as *mut u8;
        ctor(dest, arg);
        self.store.set_len(idx + 1);
        self.rebuild_index();
        self.range_from_index()
    }

    unsafe fn emplace_at(
        &mut self,
        pos: *mut u8,
        ctor: unsafe fn(*mut u8, *const ()),
        arg: *const (),
    ) -> SegmentRange {
        let idx = self.index_of(pos);
        let len = self.store.len();
        let dest = self.make_room(idx);
        ctor(dest, arg);
        self.store.set_len(len + 1);
        self.rebuild_index();
        self.range_from_index()
    }

    unsafe fn push_back_copy(&mut self, src: *const u8) -> Result<SegmentRange> {
        let value_ref: &T = &*(src as *const T);
        match capability::try_clone(value_ref) {
            Some(value) => {
                self.store.push(Cell::new(value));
                self.rebuild_index();
                Ok(self.range_from_index())
            }
            None => Err(PolyCollectionError::NotCopyConstructible {
                type_name: type_name::<T>(),
            }),
        }
    }

    unsafe fn push_back_move(&mut self, src: *mut u8) -> SegmentRange {
        let value = std::ptr::read(src as *mut T);
        self.store.push(Cell::new(value));
        self.rebuild_index();
        self.range_from_index()
    }

    unsafe fn insert_copy(&mut self, pos: *mut u8, src: *const u8) -> Result<SegmentRange> {
        let value_ref: &T = &*(src as *const T);
        let idx = self.index_of(pos);
        match capability::try_clone(value_ref) {
            Some(value) => {
                let len = self.store.len();
                let dest = self.make_room(idx) as *mut T;
                std::ptr::write(dest, value);
                self.store.set_len(len + 1);
                self.rebuild_index();
                Ok(self.range_from_index())
            }
            None => Err(PolyCollectionError::NotCopyConstructible {
                type_name: type_name::<T>(),
            }),
        }
    }

    unsafe fn insert_move(&mut self, pos: *mut u8, src: *mut u8) -> SegmentRange {
        let idx = self.index_of(pos);
        let len = self.store.len();
        let dest = self.make_room(idx) as *mut T;
        std::ptr::copy_nonoverlapping(src as *mut T, dest, 1);
        self.store.set_len(len + 1);
        self.rebuild_index();
        self.range_from_index()
    }

    unsafe fn erase_one(&mut self, pos: *mut u8) -> SegmentRange {
        let idx = self.index_of(pos);
        let len = self.store.len();
        let base = self.store.as_mut_ptr();
        std::ptr::drop_in_place(base.add(idx));
        if idx + 1 < len {
            std::ptr::copy(base.add(idx + 1), base.add(idx), len - idx - 1);
        }
        self.store.set_len(len - 1);
        self.rebuild_index();
        self.range_from_index()
    }

    unsafe fn erase_range(&mut self, first: *mut u8, last: *mut u8) -> SegmentRange {
        let begin = self.index_of(first);
        let finish = self.index_of(last);
        let len = self.store.len();
        let base = self.store.as_mut_ptr();
        for i in begin..finish {
            std::ptr::drop_in_place(base.add(i));
        }
        if finish < len {
            std::ptr::copy(base.add(finish), base.add(begin), len - finish);
        }
        self.store.set_len(len - (finish - begin));
        self.rebuild_index();
        self.range_from_index()
    }

    unsafe fn erase_till_end(&mut self, first: *mut u8) -> SegmentRange {
        let idx = self.index_of(first);
        let len = self.store.len();
        let base = self.store.as_mut_ptr();
        for i in idx..len {
            std::ptr::drop_in_place(base.add(i));
        }
        self.store.set_len(idx);
        self.rebuild_index();
        self.range_from_index()
    }

    unsafe fn erase_from_begin(&mut self, last: *mut u8) -> SegmentRange {
        let finish = self.index_of(last);
        let len = self.store.len();
        let base = self.store.as_mut_ptr();
        for i in 0..finish {
            std::ptr::drop_in_place(base.add(i));
        }
        std::ptr::copy(base.add(finish), base, len - finish);
        self.store.set_len(len - finish);
        self.rebuild_index();
        self.range_from_index()
    }

    fn copy(&self) -> Result<Box<dyn SegmentBackend<M>>> {
        if !capability::is_clone::<T>() {
            return Err(PolyCollectionError::NotCopyConstructible {
                type_name: type_name::<T>(),
            });
        }
        let mut new_store = Vec::with_capacity(self.store.len());
        for cell in &self.store {
            new_store.push(cell.try_clone()?);
        }
        let mut new_segment = SplitSegment::<M, T> {
            store: new_store,
            index: Vec::new(),
            _model: PhantomData,
        };
        new_segment.rebuild_index();
        Ok(Box::new(new_segment))
    }

    fn empty_copy(&self) -> Box<dyn SegmentBackend<M>> {
        Box::new(SplitSegment::<M, T>::new())
    }

    fn equal(&self, other: &dyn SegmentBackend<M>) -> Result<bool> {
        if !capability::is_eq::<T>() {
            return Err(PolyCollectionError::NotEqualityComparable {
                type_name: type_name::<T>(),
            });
        }
        let other = other
            .as_any()
            .downcast_ref::<SplitSegment<M, T>>()
            .expect("segments are only ever compared within the same type key");
        if self.store.len() != other.store.len() {
            return Ok(false);
        }
        for (a, b) in self.store.iter().zip(other.store.iter()) {
            if !a.try_eq(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::base::BaseModel;
    use mopa::mopafy;
    use proptest::prelude::*;

    trait Shape: mopa::Any {
        fn area(&self) -> f64;
    }
    mopafy!(Shape);
    impl Shape for f64 {
        fn area(&self) -> f64 {
            *self
        }
    }

    type M = BaseModel<dyn Shape>;

    impl ElementOf<M> for f64 {
        fn erase(ptr: *mut f64) -> *mut dyn Shape {
            ptr as *mut dyn Shape
        }
    }

    unsafe fn ctor_f64(dest: *mut u8, arg: *const ()) {
        let value = std::ptr::read(arg as *const f64);
        std::ptr::write(dest as *mut f64, value);
    }

    #[test]
    fn index_carries_one_trailing_sentinel_past_the_store() {
        let mut seg = SplitSegment::<M, f64>::new();
        assert_eq!(seg.index.len(), seg.store.len() + 1);
        unsafe {
            let arg = 1.5f64;
            seg.emplace_back(ctor_f64, &arg as *const f64 as *const ());
        }
        assert_eq!(seg.len(), 1);
        assert_eq!(seg.index.len(), seg.store.len() + 1);
    }

    #[test]
    fn growth_rebuilds_every_index_entry() {
        let mut seg = SplitSegment::<M, f64>::new();
        for i in 0..64 {
            unsafe {
                let arg = i as f64;
                seg.emplace_back(ctor_f64, &arg as *const f64 as *const ());
            }
        }
        assert_eq!(seg.index.len(), seg.store.len() + 1);
        for (i, ptr) in seg.index[..seg.store.len()].iter().enumerate() {
            let view = unsafe { BaseModel::<dyn Shape>::view(*ptr) };
            assert_eq!(view.area(), i as f64);
        }
    }

    #[test]
    fn erase_one_shifts_and_rebuilds() {
        let mut seg = SplitSegment::<M, f64>::new();
        for i in 0..3 {
            unsafe {
                let arg = i as f64;
                seg.emplace_back(ctor_f64, &arg as *const f64 as *const ());
            }
        }
        let middle = unsafe { seg.index_base().add(mem::size_of::<*mut dyn Shape>()) };
        unsafe {
            seg.erase_one(middle);
        }
        assert_eq!(seg.len(), 2);
        assert_eq!(seg.index.len(), seg.store.len() + 1);
        let views: Vec<f64> = seg.index[..seg.store.len()]
            .iter()
            .map(|ptr| unsafe { BaseModel::<dyn Shape>::view(*ptr).area() })
            .collect();
        assert_eq!(views, vec![0.0, 2.0]);
    }

    proptest! {
        #[test]
        fn index_len_is_always_store_len_plus_one(ops in prop::collection::vec(0u8..3, 0..40)) {
            let mut seg = SplitSegment::<M, f64>::new();
            let mut next = 0.0f64;
            for op in ops {
                match op {
                    0 => unsafe {
                        seg.emplace_back(ctor_f64, &next as *const f64 as *const ());
                        next += 1.0;
                    },
                    1 => {
                        if seg.store.len() > 0 {
                            let pos = seg.index_base();
                            unsafe { seg.erase_one(pos); }
                        }
                    }
                    _ => {
                        seg.shrink_to_fit();
                    }
                }
                prop_assert_eq!(seg.index.len(), seg.store.len() + 1);
                for (i, ptr) in seg.index[..seg.store.len()].iter().enumerate() {
                    let expected = *seg.store[i].get();
                    let actual = unsafe { BaseModel::<dyn Shape>::view(*ptr).area() };
                    prop_assert_eq!(actual, expected);
                }
            }
        }
    }
}
