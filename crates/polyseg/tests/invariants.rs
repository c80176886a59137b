//! Property-based invariant checks (spec.md §8) run against `base_model`
//! over randomized insert/erase/reserve sequences.

use mopa::mopafy;
use proptest::prelude::*;

use polyseg::model::base::BaseModel;
use polyseg::{Collection, ElementOf};

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

type M = BaseModel<dyn Shape>;

impl ElementOf<M> for Circle {
    fn erase(ptr: *mut Circle) -> *mut dyn Shape {
        ptr as *mut dyn Shape
    }
}

proptest! {
    #[test]
    fn len_never_exceeds_capacity(n in 0usize..200) {
        let mut c: Collection<M> = Collection::new();
        for i in 0..n {
            c.insert(Circle { radius: i as f64 }).unwrap();
        }
        prop_assert!(c.len_of::<Circle>() <= c.capacity_of::<Circle>());
    }

    #[test]
    fn reserve_never_shrinks_capacity(a in 0usize..64, b in 0usize..64) {
        let mut c: Collection<M> = Collection::new();
        c.reserve_for::<Circle>(a);
        let cap_a = c.capacity_of::<Circle>();
        c.reserve_for::<Circle>(b);
        prop_assert!(c.capacity_of::<Circle>() >= cap_a);
    }

    #[test]
    fn erasing_a_prefix_decreases_len_by_exactly_its_count(n in 1usize..50, k in 0usize..50) {
        let k = k.min(n);
        let mut c: Collection<M> = Collection::new();
        for i in 0..n {
            c.insert(Circle { radius: i as f64 }).unwrap();
        }
        let before = c.len_of::<Circle>();
        let positions: Vec<*mut u8> = c
            .local_iter::<Circle>()
            .take(k)
            .map(|r| r as *const Circle as *mut u8)
            .collect();
        // Erase from the back of the collected prefix forward: erasing
        // index i only shifts elements after i, so earlier-collected
        // positions never move out from under us.
        for pos in positions.into_iter().rev() {
            unsafe {
                c.erase_at::<Circle>(pos);
            }
        }
        prop_assert_eq!(c.len_of::<Circle>(), before - k);
    }

    #[test]
    fn clear_empties_a_segment_without_unregistering_it(n in 0usize..30) {
        let mut c: Collection<M> = Collection::new();
        for i in 0..n {
            c.insert(Circle { radius: i as f64 }).unwrap();
        }
        c.clear_of::<Circle>();
        prop_assert!(c.is_empty_of::<Circle>());
        prop_assert!(c.is_registered::<Circle>());
    }

    #[test]
    fn whole_collection_erase_removes_exactly_the_requested_prefix(n in 1usize..50, k in 0usize..50) {
        let k = k.min(n);
        let mut c: Collection<M> = Collection::new();
        for i in 0..n {
            c.insert(Circle { radius: i as f64 }).unwrap();
        }
        let before = c.len_of::<Circle>();
        let first_ptr = c.local_iter::<Circle>().next().unwrap() as *const Circle as *mut Circle;
        let first = c.position_of(first_ptr).unwrap();
        let kth_ptr = c
            .local_iter::<Circle>()
            .nth(k)
            .map(|r| r as *const Circle as *mut Circle);
        let last = match kth_ptr {
            Some(ptr) => c.position_of(ptr).unwrap(),
            None => c.end_pos(),
        };
        unsafe {
            c.erase(first, last);
        }
        prop_assert_eq!(c.len_of::<Circle>(), before - k);
    }
}
