//! Base-class polymorphism (spec.md §4.6's first built-in model): elements
//! are stored by concrete type and traversed through a shared trait object
//! `dyn B`, exactly as boost::poly_collection's `base_collection` traverses
//! through a shared base class.
//!
//! Grounded on the teacher's `Gc<T>`/`GcCell` downcasting pattern in
//! `heap/cell.rs`, which recovers a concrete type behind a trait object via
//! `mopa`'s vtable-based `Any`. `BaseModel` asks exactly one thing of `B`:
//! that it extend `mopa::Any` (via the `mopafy!` macro), which is what lets
//! [`Model::dynamic_id`] recover a concrete type's identity from nothing but
//! a `&dyn B`.

use std::any::TypeId;
use std::marker::PhantomData;

use crate::model::Model;
use crate::type_tag::TypeTag;

/// Traverse a family of concrete types through their shared base trait `B`.
///
/// `B` is always used as an unsized trait object type (`dyn Shape`, say),
/// never as a bound on some other generic — see [`crate::model::ElementOf`]
/// for why that split exists and how concrete element types opt in.
pub struct BaseModel<B: ?Sized + 'static>(PhantomData<fn() -> *mut B>);

impl<B: ?Sized + mopa::Any + 'static> Model for BaseModel<B> {
    type Id = TypeTag;
    type TargetPtr = *mut B;
    type View<'a> = &'a B;
    type ViewMut<'a> = &'a mut B;

    fn type_id<T: 'static>() -> Self::Id {
        TypeTag::of::<T>()
    }

    fn is_terminal<T: 'static>() -> bool {
        // Rust has no struct inheritance: a concrete T stored in a base
        // collection can never itself be the static type through which a
        // still-more-derived type is reached. Every element is terminal.
        true
    }

    unsafe fn dynamic_id(ptr: Self::TargetPtr) -> Self::Id {
        TypeTag::from_dynamic((*ptr).get_type_id())
    }

    unsafe fn subaddress(ptr: Self::TargetPtr) -> *mut u8 {
        (ptr as *mut ()) as *mut u8
    }

    unsafe fn view<'a>(ptr: Self::TargetPtr) -> Self::View<'a> {
        &*ptr
    }

    unsafe fn view_mut<'a>(ptr: Self::TargetPtr) -> Self::ViewMut<'a> {
        &mut *ptr
    }
}

impl<B: ?Sized + mopa::Any + 'static> BaseModel<B> {
    /// `TypeId` of the concrete type behind `ptr`, without the `TypeTag`
    /// wrapping — occasionally convenient for callers that already have a
    /// `TypeId` to compare against (e.g. `std::any::TypeId::of::<T>()`).
    pub unsafe fn dynamic_type_id(ptr: *mut B) -> TypeId {
        (*ptr).get_type_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementOf;
    use mopa::mopafy;

    trait Shape: mopa::Any {
        fn area(&self) -> f64;
    }
    mopafy!(Shape);

    struct Circle {
        r: f64,
    }
    impl Shape for Circle {
        fn area(&self) -> f64 {
            std::f64::consts::PI * self.r * self.r
        }
    }

    impl ElementOf<BaseModel<dyn Shape>> for Circle {
        fn erase(ptr: *mut Circle) -> *mut dyn Shape {
            ptr as *mut dyn Shape
        }
    }

    #[test]
    fn view_recovers_the_shared_interface() {
        let mut circle = Circle { r: 2.0 };
        let erased = Circle::erase(&mut circle as *mut Circle);
        let view = unsafe { BaseModel::<dyn Shape>::view(erased) };
        assert!((view.area() - std::f64::consts::PI * 4.0).abs() < 1e-9);
    }

    #[test]
    fn dynamic_id_matches_static_type_id() {
        let mut circle = Circle { r: 1.0 };
        let erased = Circle::erase(&mut circle as *mut Circle);
        let dyn_id = unsafe { BaseModel::<dyn Shape>::dynamic_id(erased) };
        assert_eq!(dyn_id, BaseModel::<dyn Shape>::type_id::<Circle>());
    }

    #[test]
    fn every_concrete_type_is_terminal() {
        assert!(BaseModel::<dyn Shape>::is_terminal::<Circle>());
    }
}
