//! The collection iterator (spec.md §4.9, component C9's cross-segment
//! half): chains a [`ConstBaseIterator`]/[`BaseIterator`] per segment, one
//! after another, so traversal crosses segment boundaries transparently.
//! Per spec.md's non-goals this never guarantees any particular order
//! *across* segments — only that elements within one segment come out in
//! storage order.

use crate::iter::stride::{BaseIterator, ConstBaseIterator};
use crate::model::Model;
use crate::segment::facade::Segment;

/// Shared-reference traversal across every segment of a collection.
pub struct CollectionIterator<'a, M: Model> {
    segments: std::slice::Iter<'a, Segment<M>>,
    current: Option<ConstBaseIterator<'a, M>>,
}

impl<'a, M: Model> CollectionIterator<'a, M> {
    pub(crate) fn new(segments: &'a [Segment<M>]) -> Self {
        CollectionIterator {
            segments: segments.iter(),
            current: None,
        }
    }

    fn advance_segment(&mut self) -> bool {
        match self.segments.next() {
            Some(segment) => {
                let range = segment.range();
                self.current = Some(unsafe {
                    ConstBaseIterator::new(range, segment.stride(), segment.eraser())
                });
                true
            }
            None => false,
        }
    }
}

impl<'a, M: Model> Iterator for CollectionIterator<'a, M> {
    type Item = M::View<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(iter) = self.current.as_mut() {
                if let Some(item) = iter.next() {
                    return Some(item);
                }
            }
            if !self.advance_segment() {
                return None;
            }
        }
    }
}

/// Unique-reference traversal across every segment of a collection.
pub struct CollectionIteratorMut<'a, M: Model> {
    segments: std::slice::IterMut<'a, Segment<M>>,
    current: Option<BaseIterator<'a, M>>,
}

impl<'a, M: Model> CollectionIteratorMut<'a, M> {
    pub(crate) fn new(segments: &'a mut [Segment<M>]) -> Self {
        CollectionIteratorMut {
            segments: segments.iter_mut(),
            current: None,
        }
    }

    fn advance_segment(&mut self) -> bool {
        match self.segments.next() {
            Some(segment) => {
                let range = segment.range();
                self.current = Some(unsafe {
                    BaseIterator::new(range, segment.stride(), segment.eraser())
                });
                true
            }
            None => false,
        }
    }
}

impl<'a, M: Model> Iterator for CollectionIteratorMut<'a, M> {
    type Item = M::ViewMut<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(iter) = self.current.as_mut() {
                if let Some(item) = iter.next() {
                    return Some(item);
                }
            }
            if !self.advance_segment() {
                return None;
            }
        }
    }
}
