//! Callable polymorphism (spec.md §4.6's third built-in model): elements are
//! closures and function items sharing one call signature, traversed through
//! a `dyn FnMut(Arg) -> Ret` trait object — this crate's analogue of
//! boost::poly_collection's `function_collection<Signature>`.
//!
//! Every concrete closure type is, by construction, terminal: nothing in
//! Rust lets a second closure type be "the dynamic type" of a value whose
//! static type is some other closure type, so [`Model::dynamic_id`] is
//! never reached on the insertion path the collection engine takes for this
//! model (see the [`Model::is_terminal`] contract) and is left unreachable.

use std::marker::PhantomData;

use crate::model::{ElementOf, Model};
use crate::type_tag::TypeTag;

/// Traverse a family of closures and function items sharing the call shape
/// `FnMut(Arg) -> Ret`.
pub struct FunctionModel<Arg, Ret>(PhantomData<fn(Arg) -> Ret>);

impl<Arg: 'static, Ret: 'static> Model for FunctionModel<Arg, Ret> {
    type Id = TypeTag;
    type TargetPtr = *mut dyn FnMut(Arg) -> Ret;
    type View<'a> = &'a dyn FnMut(Arg) -> Ret;
    type ViewMut<'a> = &'a mut dyn FnMut(Arg) -> Ret;

    fn type_id<T: 'static>() -> Self::Id {
        TypeTag::of::<T>()
    }

    fn is_terminal<T: 'static>() -> bool {
        true
    }

    unsafe fn dynamic_id(_ptr: Self::TargetPtr) -> Self::Id {
        unreachable!(
            "every element under a function model is terminal; the \
             collection engine never needs a dynamic type lookup for one"
        )
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

/// Every `FnMut(Arg) -> Ret` closure or function item is automatically an
/// element of its matching [`FunctionModel`] — unlike [`crate::model::base`]
/// or [`crate::model::any`], no per-type opt-in is needed, since the call
/// signature itself is the only interface a function model asks for.
impl<Arg: 'static, Ret: 'static, F: FnMut(Arg) -> Ret + 'static> ElementOf<FunctionModel<Arg, Ret>>
    for F
{
    fn erase(ptr: *mut F) -> *mut dyn FnMut(Arg) -> Ret {
        ptr as *mut dyn FnMut(Arg) -> Ret
    }
}
