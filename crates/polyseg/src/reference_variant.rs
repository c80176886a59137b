//! Reference-variant helper (spec.md §4.10, component C10): a sum type over
//! *references* into however many alternative payload types a
//! [`crate::model::variant::VariantModel`] was built with, plus the shared
//! and mutable views produced when traversing one.
//!
//! Generated per arity by [`define_reference_variant`] /
//! [`define_reference_variant_mut`] rather than written out by hand once per
//! arity: every arity needs the same four operations (`index`, `get`,
//! `holds_alternative`, structural equality), and a declarative macro keeps
//! them in lockstep instead of five near-identical hand-copied impls.
//!
//! Supported arities are 2 through 6. boost::poly_collection's own
//! `base_collection`/variant-style containers are not bounded this way (C++
//! variadic templates take any arity for free); Rust has no stable variadic
//! generics, so a macro has to enumerate arities explicitly, and 6 was
//! chosen as enough headroom for realistic use without six more copies of
//! boilerplate that nothing in this crate's test suite exercises past.

use std::any::{type_name, Any};

use crate::error::{PolyCollectionError, Result};

macro_rules! define_reference_variant {
    ($name:ident { $( $idx:literal => $var:ident : $ty:ident ),+ $(,)? }) => {
        /// A borrowed view of exactly one of this variant's alternatives.
        pub enum $name<'a, $($ty: 'static),+> {
            $(
                #[allow(missing_docs)]
                $var(&'a $ty)
            ),+
        }

        impl<'a, $($ty: 'static),+> $name<'a, $($ty),+> {
            /// Position (0-based) of the alternative actually held.
            pub fn index(&self) -> usize {
                match self {
                    $( $name::$var(_) => $idx ),+
                }
            }

            /// `type_name` of the alternative actually held, for
            /// [`PolyCollectionError::BadVariantAccess`]'s `found` field.
            fn held_type_name(&self) -> &'static str {
                match self {
                    $( $name::$var(_) => type_name::<$ty>() ),+
                }
            }

            /// Borrow the held alternative as `T`, or
            /// [`PolyCollectionError::BadVariantAccess`] if `T` is not the
            /// alternative actually held.
            pub fn get<T: 'static>(&self) -> Result<&'a T> {
                self.get_if::<T>().ok_or_else(|| PolyCollectionError::BadVariantAccess {
                    expected: type_name::<T>(),
                    found: self.held_type_name(),
                })
            }

            /// Borrow the held alternative as `T`, or `None` if `T` is not
            /// the alternative actually held.
            pub fn get_if<T: 'static>(&self) -> Option<&'a T> {
                match self {
                    $( $name::$var(v) => (*v as &dyn Any).downcast_ref::<T>() ),+
                }
            }

            /// Whether the held alternative is exactly `T`.
            pub fn holds_alternative<T: 'static>(&self) -> bool {
                self.get_if::<T>().is_some()
            }

            /// Dispatch to exactly one of `n` closures, chosen by the held
            /// alternative's position — the "call whichever branch applies"
            /// counterpart to matching on [`$name::get`] per type.
            pub fn visit<R>(&self, $($var: impl FnOnce(&'a $ty) -> R),+) -> R {
                match self {
                    $( $name::$var(v) => $var(*v) ),+
                }
            }
        }

        impl<'a, $($ty: PartialEq + 'static),+> PartialEq for $name<'a, $($ty),+> {
            fn eq(&self, other: &Self) -> bool {
                match (self, other) {
                    $( ($name::$var(a), $name::$var(b)) => a == b, )+
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}

macro_rules! define_reference_variant_mut {
    ($name:ident { $( $idx:literal => $var:ident : $ty:ident ),+ $(,)? }) => {
        /// A uniquely-borrowed view of exactly one of this variant's
        /// alternatives.
        pub enum $name<'a, $($ty: 'static),+> {
            $(
                #[allow(missing_docs)]
                $var(&'a mut $ty)
            ),+
        }

        impl<'a, $($ty: 'static),+> $name<'a, $($ty),+> {
            /// Position (0-based) of the alternative actually held.
            pub fn index(&self) -> usize {
                match self {
                    $( Self::$var(_) => $idx ),+
                }
            }

            /// `type_name` of the alternative actually held, for
            /// [`PolyCollectionError::BadVariantAccess`]'s `found` field.
            fn held_type_name(&self) -> &'static str {
                match self {
                    $( Self::$var(_) => type_name::<$ty>() ),+
                }
            }

            /// Mutably borrow the held alternative as `T`, or
            /// [`PolyCollectionError::BadVariantAccess`] if `T` is not the
            /// alternative actually held.
            pub fn get_mut<T: 'static>(&mut self) -> Result<&mut T> {
                let found = self.held_type_name();
                self.get_mut_if::<T>().ok_or(PolyCollectionError::BadVariantAccess {
                    expected: type_name::<T>(),
                    found,
                })
            }

            /// Mutably borrow the held alternative as `T`, or `None` if `T`
            /// is not the alternative actually held.
            pub fn get_mut_if<T: 'static>(&mut self) -> Option<&mut T> {
                match self {
                    $( Self::$var(v) => (*v as &mut dyn Any).downcast_mut::<T>() ),+
                }
            }

            /// Whether the held alternative is exactly `T`.
            pub fn holds_alternative<T: 'static>(&self) -> bool {
                match self {
                    $( Self::$var(v) => (*v as &dyn Any).is::<T>() ),+
                }
            }
        }
    };
}

define_reference_variant!(ReferenceVariant2 { 0 => V0: T1, 1 => V1: T2 });
define_reference_variant!(ReferenceVariant3 { 0 => V0: T1, 1 => V1: T2, 2 => V2: T3 });
define_reference_variant!(ReferenceVariant4 { 0 => V0: T1, 1 => V1: T2, 2 => V2: T3, 3 => V3: T4 });
define_reference_variant!(ReferenceVariant5 {
    0 => V0: T1, 1 => V1: T2, 2 => V2: T3, 3 => V3: T4, 4 => V4: T5
});
define_reference_variant!(ReferenceVariant6 {
    0 => V0: T1, 1 => V1: T2, 2 => V2: T3, 3 => V3: T4, 4 => V4: T5, 5 => V5: T6
});

define_reference_variant_mut!(ReferenceVariant2Mut { 0 => V0: T1, 1 => V1: T2 });
define_reference_variant_mut!(ReferenceVariant3Mut { 0 => V0: T1, 1 => V1: T2, 2 => V2: T3 });
define_reference_variant_mut!(ReferenceVariant4Mut {
    0 => V0: T1, 1 => V1: T2, 2 => V2: T3, 3 => V3: T4
});
define_reference_variant_mut!(ReferenceVariant5Mut {
    0 => V0: T1, 1 => V1: T2, 2 => V2: T3, 3 => V3: T4, 4 => V4: T5
});
define_reference_variant_mut!(ReferenceVariant6Mut {
    0 => V0: T1, 1 => V1: T2, 2 => V2: T3, 3 => V3: T4, 4 => V4: T5, 5 => V5: T6
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_get_agree() {
        let x = 7i32;
        let v: ReferenceVariant3<i32, &str, f64> = ReferenceVariant3::V0(&x);
        assert_eq!(v.index(), 0);
        assert_eq!(v.get::<i32>().unwrap(), &7);
        assert_eq!(v.get_if::<&str>(), None);
        assert!(v.holds_alternative::<i32>());
        assert!(!v.holds_alternative::<f64>());
    }

    #[test]
    fn get_on_the_wrong_alternative_is_a_bad_variant_access() {
        let x = 7i32;
        let v: ReferenceVariant3<i32, &str, f64> = ReferenceVariant3::V0(&x);
        let err = v.get::<f64>().unwrap_err();
        assert!(matches!(
            err,
            PolyCollectionError::BadVariantAccess { .. }
        ));
    }

    #[test]
    fn visit_dispatches_to_the_held_alternative() {
        let x = "hi";
        let v: ReferenceVariant2<i32, &str> = ReferenceVariant2::V1(&x);
        let result = v.visit(|_n: &i32| 0, |s: &&str| s.len());
        assert_eq!(result, 2);
    }

    #[test]
    fn equality_requires_same_alternative_and_value() {
        let a = 1i32;
        let b = 1i32;
        let c = 2i32;
        let v1: ReferenceVariant2<i32, i32> = ReferenceVariant2::V0(&a);
        let v2: ReferenceVariant2<i32, i32> = ReferenceVariant2::V0(&b);
        let v3: ReferenceVariant2<i32, i32> = ReferenceVariant2::V1(&c);
        assert!(v1 == v2);
        assert!(v1 != v3);
    }

    #[test]
    fn mut_variant_allows_in_place_mutation() {
        let mut x = 10i32;
        {
            let mut v: ReferenceVariant2Mut<i32, &str> = ReferenceVariant2Mut::V0(&mut x);
            assert_eq!(v.index(), 0);
            *v.get_mut_if::<i32>().unwrap() += 5;
        }
        assert_eq!(x, 15);
    }
}
