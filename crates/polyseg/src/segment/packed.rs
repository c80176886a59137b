//! The packed segment (spec.md §4.4, component C4): a single contiguous
//! `Vec<Cell<T>>`. Used whenever the view can be reached from a cell by a
//! constant pointer reinterpretation — the typical base-class case.

use std::any::type_name;
use std::marker::PhantomData;
use std::mem;

use log::trace;

use crate::capability;
use crate::cell::Cell;
use crate::error::{PolyCollectionError, Result};
use crate::model::{ElementOf, Model};
use crate::segment::{erase_ptr, SegmentBackend, SegmentRange};
use crate::type_tag::TypeTag;

/// A contiguous run of `Cell<T>`, iterated with stride `size_of::<Cell<T>>()`.
pub struct PackedSegment<M: Model, T: 'static> {
    store: Vec<Cell<T>>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model, T: 'static> PackedSegment<M, T> {
    pub fn new() -> Self {
        PackedSegment {
            store: Vec::new(),
            _model: PhantomData,
        }
    }

    fn base(&self) -> *mut u8 {
        self.store.as_ptr() as *mut u8
    }

    fn index_of(&self, pos: *mut u8) -> usize {
        let base = self.base() as usize;
        let addr = pos as usize;
        (addr - base) / mem::size_of::<Cell<T>>()
    }

    /// Reserve one slot and shift `[idx, len)` right by one cell, leaving
    /// an uninitialized hole at `idx` ready for placement-construction.
    unsafe fn make_room(&mut self, idx: usize) -> *mut u8 {
        self.store.reserve(1);
        let len = self.store.len();
        let base = self.store.as_mut_ptr();
        if idx < len {
            std::ptr::copy(base.add(idx), base.add(idx + 1), len - idx);
        }
        base.add(idx) as *mut u8
    }

    fn push_value(&mut self, value: T) {
        self.store.push(Cell::new(value));
    }

    /// Direct access to this segment's storage as concretely-typed cells,
    /// for [`crate::iter::local::LocalIterator`] — which already knows the
    /// concrete `T` and has no use for the model-erased view.
    pub(crate) fn as_slice(&self) -> &[Cell<T>] {
        &self.store
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Cell<T>] {
        &mut self.store
    }
}

impl<M: Model, T: 'static> Default for PackedSegment<M, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model, T: ElementOf<M>> SegmentBackend<M> for PackedSegment<M, T> {
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
        mem::size_of::<Cell<T>>()
    }

    fn eraser(&self) -> unsafe fn(*mut u8) -> M::TargetPtr {
        erase_ptr::<M, T>
    }

    fn range(&self) -> SegmentRange {
        let len = self.store.len();
        let base = self.store.as_ptr() as *mut u8;
        SegmentRange {
            pos: base,
            end: unsafe { base.add(len * mem::size_of::<Cell<T>>()) },
        }
    }

    fn reserve(&mut self, additional: usize) -> SegmentRange {
        let before = self.store.capacity();
        self.store.reserve(additional);
        if self.store.capacity() != before {
            trace!(
                "packed segment<{}> grew capacity {} -> {}",
                type_name::<T>(),
                before,
                self.store.capacity()
            );
        }
        self.range()
    }

    fn shrink_to_fit(&mut self) -> SegmentRange {
        self.store.shrink_to_fit();
        self.range()
    }

    fn clear(&mut self) -> SegmentRange {
        self.store.clear();
        self.range()
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
        self.range()
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
        self.range()
    }

    unsafe fn push_back_copy(&mut self, src: *const u8) -> Result<SegmentRange> {
        let value_ref: &T = &*(src as *const T);
        match capability::try_clone(value_ref) {
            Some(value) => {
                self.push_value(value);
                Ok(self.range())
            }
            None => Err(PolyCollectionError::NotCopyConstructible {
                type_name: type_name::<T>(),
            }),
        }
    }

    unsafe fn push_back_move(&mut self, src: *mut u8) -> SegmentRange {
        let value = std::ptr::read(src as *mut T);
        self.push_value(value);
        self.range()
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
                Ok(self.range())
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
        self.range()
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
        self.range()
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
        self.range()
    }

    unsafe fn erase_till_end(&mut self, first: *mut u8) -> SegmentRange {
        let len = self.store.len();
        let end = self.store.as_mut_ptr().add(len) as *mut u8;
        self.erase_range(first, end)
    }

    unsafe fn erase_from_begin(&mut self, last: *mut u8) -> SegmentRange {
        let begin = self.store.as_mut_ptr() as *mut u8;
        self.erase_range(begin, last)
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
        Ok(Box::new(PackedSegment::<M, T> {
            store: new_store,
            _model: PhantomData,
        }))
    }

    fn empty_copy(&self) -> Box<dyn SegmentBackend<M>> {
        Box::new(PackedSegment::<M, T>::new())
    }

    fn equal(&self, other: &dyn SegmentBackend<M>) -> Result<bool> {
        if !capability::is_eq::<T>() {
            return Err(PolyCollectionError::NotEqualityComparable {
                type_name: type_name::<T>(),
            });
        }
        let other = other
            .as_any()
            .downcast_ref::<PackedSegment<M, T>>()
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
    fn emplace_back_and_erase_round_trip() {
        let mut seg = PackedSegment::<M, f64>::new();
        unsafe {
            let arg = 3.5f64;
            seg.emplace_back(ctor_f64, &arg as *const f64 as *const ());
        }
        assert_eq!(seg.len(), 1);
        let pos = seg.range().pos;
        unsafe {
            seg.erase_one(pos);
        }
        assert_eq!(seg.len(), 0);
    }

    #[test]
    fn reserve_does_not_shrink_capacity() {
        let mut seg = PackedSegment::<M, f64>::new();
        seg.reserve(10);
        let cap = seg.capacity();
        assert!(cap >= 10);
        seg.reserve(1);
        assert_eq!(seg.capacity(), cap);
    }

    #[test]
    fn copy_and_equal_round_trip() {
        let mut seg = PackedSegment::<M, f64>::new();
        seg.push_value(1.0);
        seg.push_value(2.0);
        let copy = seg.copy().expect("f64 is Clone");
        assert!(seg.equal(copy.as_ref()).expect("f64 is PartialEq"));
    }
}
