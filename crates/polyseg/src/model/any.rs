//! Duck-typed polymorphism (spec.md §4.6's second built-in model): elements
//! are traversed through a `Concept` trait object that the element types
//! need not be related to by inheritance — only by implementing the same
//! interface, exactly as boost::poly_collection's `any_collection` traverses
//! unrelated types through a sol::any/`boost::any`-like erased interface.
//!
//! Structurally identical to [`crate::model::base::BaseModel`] — the only
//! real difference the collection engine cares about is which
//! [`crate::segment::SegmentBackend`] it is paired with (`any_model`
//! collections back their segments with
//! [`crate::segment::split::SplitSegment`], since a concept-typed element
//! set commonly holds non-trivially-relocatable, non-POD payloads where the
//! stable-address guarantee of a split segment matters more than a packed
//! one's density).

use std::any::TypeId;
use std::marker::PhantomData;

use crate::model::Model;
use crate::type_tag::TypeTag;

/// Traverse a family of unrelated concrete types through a shared
/// duck-typed interface `Concept`.
pub struct AnyModel<Concept: ?Sized + 'static>(PhantomData<fn() -> *mut Concept>);

impl<Concept: ?Sized + mopa::Any + 'static> Model for AnyModel<Concept> {
    type Id = TypeTag;
    type TargetPtr = *mut Concept;
    type View<'a> = &'a Concept;
    type ViewMut<'a> = &'a mut Concept;

    fn type_id<T: 'static>() -> Self::Id {
        TypeTag::of::<T>()
    }

    fn is_terminal<T: 'static>() -> bool {
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

    fn make_backend<T: crate::model::ElementOf<Self>>(
    ) -> Box<dyn crate::segment::SegmentBackend<Self>> {
        Box::new(crate::segment::split::SplitSegment::<Self, T>::new())
    }
}

impl<Concept: ?Sized + mopa::Any + 'static> AnyModel<Concept> {
    pub unsafe fn dynamic_type_id(ptr: *mut Concept) -> TypeId {
        (*ptr).get_type_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementOf;
    use mopa::mopafy;

    trait Quacks: mopa::Any {
        fn quack(&self) -> &'static str;
    }
    mopafy!(Quacks);

    struct Duck;
    impl Quacks for Duck {
        fn quack(&self) -> &'static str {
            "quack"
        }
    }

    struct Person;
    impl Quacks for Person {
        fn quack(&self) -> &'static str {
            "I'm quacking"
        }
    }

    impl ElementOf<AnyModel<dyn Quacks>> for Duck {
        fn erase(ptr: *mut Duck) -> *mut dyn Quacks {
            ptr as *mut dyn Quacks
        }
    }
    impl ElementOf<AnyModel<dyn Quacks>> for Person {
        fn erase(ptr: *mut Person) -> *mut dyn Quacks {
            ptr as *mut dyn Quacks
        }
    }

    #[test]
    fn unrelated_types_share_one_interface() {
        let mut duck = Duck;
        let mut person = Person;
        let duck_ptr = Duck::erase(&mut duck as *mut Duck);
        let person_ptr = Person::erase(&mut person as *mut Person);
        unsafe {
            assert_eq!(AnyModel::<dyn Quacks>::view(duck_ptr).quack(), "quack");
            assert_eq!(
                AnyModel::<dyn Quacks>::view(person_ptr).quack(),
                "I'm quacking"
            );
        }
    }

    #[test]
    fn dynamic_ids_differ_across_unrelated_types() {
        let mut duck = Duck;
        let mut person = Person;
        let duck_ptr = Duck::erase(&mut duck as *mut Duck);
        let person_ptr = Person::erase(&mut person as *mut Person);
        unsafe {
            assert_ne!(
                AnyModel::<dyn Quacks>::dynamic_id(duck_ptr),
                AnyModel::<dyn Quacks>::dynamic_id(person_ptr)
            );
        }
    }
}
