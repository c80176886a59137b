//! Runtime-checked capability probing.
//!
//! `value_holder::Cell<T>` must offer copy-construction and equality
//! whenever `T` happens to support them, and fail at runtime (not at
//! compile time) otherwise — that deferral from compile-time to run-time is
//! this crate's whole value proposition (see `spec.md` §4.1). Stable Rust
//! has no specialization, so capability is detected with the well-known
//! "autoref specialization" trick: two traits with the same method name, one
//! implemented on `&Probe<T>` (selected first, requires the capability) and
//! one implemented on `Probe<T>` (selected as the fallback via one extra
//! deref step), disambiguated purely by method-resolution autoref order.

use std::marker::PhantomData;

/// Zero-sized probe carrying only a `T` type parameter for trait dispatch.
pub struct Probe<T>(PhantomData<T>);

impl<T> Probe<T> {
    fn new() -> Self {
        Probe(PhantomData)
    }
}

trait ProbeClone<T> {
    fn probe_clone(&self, value: &T) -> Option<T>;
}

impl<T: Clone> ProbeClone<T> for &Probe<T> {
    fn probe_clone(&self, value: &T) -> Option<T> {
        Some(value.clone())
    }
}

trait ProbeCloneFallback<T> {
    fn probe_clone(&self, _value: &T) -> Option<T>;
}

impl<T> ProbeCloneFallback<T> for Probe<T> {
    fn probe_clone(&self, _value: &T) -> Option<T> {
        None
    }
}

/// Returns `Some(value.clone())` if `T: Clone`, `None` otherwise — decided
/// at the call site without a `T: Clone` bound on the caller.
pub fn try_clone<T>(value: &T) -> Option<T> {
    (&&Probe::<T>::new()).probe_clone(value)
}

trait ProbeEq<T> {
    fn probe_eq(&self, a: &T, b: &T) -> Option<bool>;
}

impl<T: PartialEq> ProbeEq<T> for &Probe<T> {
    fn probe_eq(&self, a: &T, b: &T) -> Option<bool> {
        Some(a == b)
    }
}

trait ProbeEqFallback<T> {
    fn probe_eq(&self, _a: &T, _b: &T) -> Option<bool>;
}

impl<T> ProbeEqFallback<T> for Probe<T> {
    fn probe_eq(&self, _a: &T, _b: &T) -> Option<bool> {
        None
    }
}

/// Returns `Some(a == b)` if `T: PartialEq`, `None` otherwise.
pub fn try_eq<T>(a: &T, b: &T) -> Option<bool> {
    (&&Probe::<T>::new()).probe_eq(a, b)
}

trait ProbeIsClone<T> {
    fn probe_is_clone(&self) -> bool;
}

impl<T: Clone> ProbeIsClone<T> for &Probe<T> {
    fn probe_is_clone(&self) -> bool {
        true
    }
}

trait ProbeIsCloneFallback<T> {
    fn probe_is_clone(&self) -> bool;
}

impl<T> ProbeIsCloneFallback<T> for Probe<T> {
    fn probe_is_clone(&self) -> bool {
        false
    }
}

/// Whether `T: Clone`, without needing a live `T` to probe — used by
/// segment-level `copy`/`empty_copy`, which must answer this for a type
/// that might not have a single instance in storage yet.
pub fn is_clone<T>() -> bool {
    (&&Probe::<T>::new()).probe_is_clone()
}

trait ProbeIsEq<T> {
    fn probe_is_eq(&self) -> bool;
}

impl<T: PartialEq> ProbeIsEq<T> for &Probe<T> {
    fn probe_is_eq(&self) -> bool {
        true
    }
}

trait ProbeIsEqFallback<T> {
    fn probe_is_eq(&self) -> bool;
}

impl<T> ProbeIsEqFallback<T> for Probe<T> {
    fn probe_is_eq(&self) -> bool {
        false
    }
}

/// Whether `T: PartialEq`, without needing a live `T` to probe.
pub fn is_eq<T>() -> bool {
    (&&Probe::<T>::new()).probe_is_eq()
}
