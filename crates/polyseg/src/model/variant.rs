//! Closed-set polymorphism (spec.md §4.6's fourth built-in model): elements
//! belong to one of a fixed, enumerated list of unrelated types, traversed
//! through a [`crate::reference_variant::ReferenceVariant2`]-family sum type
//! instead of a shared trait object — this crate's analogue of
//! boost::poly_collection's variant-based collection variant.
//!
//! One [`Model`] impl per arity, generated by [`define_variant_model`], each
//! paired with the [`crate::reference_variant`] enum of the same arity.
//! Supported arities are 2 through 6, matching the reference-variant helper
//! (see that module for why 6 and not C++'s unbounded variadic arity).
//!
//! Variant type arguments must be pairwise distinct: `VariantModel2<A, A>`
//! would need two [`crate::model::ElementOf`] impls for `A` against the same
//! model (one per position), which is an overlapping-impl compile error.
//! This mirrors `std::variant<A, A>` being similarly degenerate in C++.

use std::marker::PhantomData;

use crate::model::{ElementOf, Model};
use crate::reference_variant::{
    ReferenceVariant2, ReferenceVariant2Mut, ReferenceVariant3, ReferenceVariant3Mut,
    ReferenceVariant4, ReferenceVariant4Mut, ReferenceVariant5, ReferenceVariant5Mut,
    ReferenceVariant6, ReferenceVariant6Mut,
};
use crate::type_tag::TypeTag;

/// Erased handle for any [`VariantModel2`]..[`VariantModel6`]: which
/// alternative (by position) plus the address of its payload.
#[derive(Copy, Clone)]
pub struct VariantPtr {
    index: usize,
    addr: *mut u8,
}

macro_rules! define_variant_model {
    ($model:ident, $view:ident, $view_mut:ident, [$( $idx:literal => $var:ident : $ty:ident ),+ $(,)?]) => {
        /// Traverses elements belonging to one of a fixed list of types.
        pub struct $model<$($ty: 'static),+>(PhantomData<fn($($ty),+)>);

        impl<$($ty: 'static),+> Model for $model<$($ty),+> {
            type Id = TypeTag;
            type TargetPtr = VariantPtr;
            type View<'a> = $view<'a, $($ty),+>;
            type ViewMut<'a> = $view_mut<'a, $($ty),+>;

            fn type_id<T: 'static>() -> Self::Id {
                TypeTag::of::<T>()
            }

            fn is_terminal<T: 'static>() -> bool {
                true
            }

            unsafe fn dynamic_id(ptr: Self::TargetPtr) -> Self::Id {
                match ptr.index {
                    $( $idx => TypeTag::of::<$ty>(), )+
                    other => unreachable!("variant index {other} out of range"),
                }
            }

            unsafe fn subaddress(ptr: Self::TargetPtr) -> *mut u8 {
                ptr.addr
            }

            unsafe fn view<'a>(ptr: Self::TargetPtr) -> Self::View<'a> {
                match ptr.index {
                    $( $idx => $view::$var(&*(ptr.addr as *mut $ty)), )+
                    other => unreachable!("variant index {other} out of range"),
                }
            }

            unsafe fn view_mut<'a>(ptr: Self::TargetPtr) -> Self::ViewMut<'a> {
                match ptr.index {
                    $( $idx => $view_mut::$var(&mut *(ptr.addr as *mut $ty)), )+
                    other => unreachable!("variant index {other} out of range"),
                }
            }

            fn make_backend<T: ElementOf<Self>>() -> Box<dyn crate::segment::SegmentBackend<Self>> {
                Box::new(crate::segment::split::SplitSegment::<Self, T>::new())
            }
        }
    };
}

define_variant_model!(VariantModel2, ReferenceVariant2, ReferenceVariant2Mut, [
    0 => V0: T1, 1 => V1: T2
]);
define_variant_model!(VariantModel3, ReferenceVariant3, ReferenceVariant3Mut, [
    0 => V0: T1, 1 => V1: T2, 2 => V2: T3
]);
define_variant_model!(VariantModel4, ReferenceVariant4, ReferenceVariant4Mut, [
    0 => V0: T1, 1 => V1: T2, 2 => V2: T3, 3 => V3: T4
]);
define_variant_model!(VariantModel5, ReferenceVariant5, ReferenceVariant5Mut, [
    0 => V0: T1, 1 => V1: T2, 2 => V2: T3, 3 => V3: T4, 4 => V4: T5
]);
define_variant_model!(VariantModel6, ReferenceVariant6, ReferenceVariant6Mut, [
    0 => V0: T1, 1 => V1: T2, 2 => V2: T3, 3 => V3: T4, 4 => V4: T5, 5 => V5: T6
]);

impl<T1: 'static, T2: 'static> ElementOf<VariantModel2<T1, T2>> for T1 {
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 0, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static> ElementOf<VariantModel2<T1, T2>> for T2 {
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 1, addr: ptr as *mut u8 }
    }
}

impl<T1: 'static, T2: 'static, T3: 'static> ElementOf<VariantModel3<T1, T2, T3>> for T1 {
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 0, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static> ElementOf<VariantModel3<T1, T2, T3>> for T2 {
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 1, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static> ElementOf<VariantModel3<T1, T2, T3>> for T3 {
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 2, addr: ptr as *mut u8 }
    }
}

impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static> ElementOf<VariantModel4<T1, T2, T3, T4>>
    for T1
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 0, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static> ElementOf<VariantModel4<T1, T2, T3, T4>>
    for T2
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 1, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static> ElementOf<VariantModel4<T1, T2, T3, T4>>
    for T3
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 2, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static> ElementOf<VariantModel4<T1, T2, T3, T4>>
    for T4
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 3, addr: ptr as *mut u8 }
    }
}

impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static>
    ElementOf<VariantModel5<T1, T2, T3, T4, T5>> for T1
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 0, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static>
    ElementOf<VariantModel5<T1, T2, T3, T4, T5>> for T2
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 1, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static>
    ElementOf<VariantModel5<T1, T2, T3, T4, T5>> for T3
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 2, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static>
    ElementOf<VariantModel5<T1, T2, T3, T4, T5>> for T4
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 3, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static>
    ElementOf<VariantModel5<T1, T2, T3, T4, T5>> for T5
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 4, addr: ptr as *mut u8 }
    }
}

impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static, T6: 'static>
    ElementOf<VariantModel6<T1, T2, T3, T4, T5, T6>> for T1
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 0, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static, T6: 'static>
    ElementOf<VariantModel6<T1, T2, T3, T4, T5, T6>> for T2
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 1, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static, T6: 'static>
    ElementOf<VariantModel6<T1, T2, T3, T4, T5, T6>> for T3
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 2, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static, T6: 'static>
    ElementOf<VariantModel6<T1, T2, T3, T4, T5, T6>> for T4
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 3, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static, T6: 'static>
    ElementOf<VariantModel6<T1, T2, T3, T4, T5, T6>> for T5
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 4, addr: ptr as *mut u8 }
    }
}
impl<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static, T6: 'static>
    ElementOf<VariantModel6<T1, T2, T3, T4, T5, T6>> for T6
{
    fn erase(ptr: *mut Self) -> VariantPtr {
        VariantPtr { index: 5, addr: ptr as *mut u8 }
    }
}
