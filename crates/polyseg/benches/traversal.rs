//! Compares traversing a mixed-type `base_model` collection against an
//! equivalent `Vec<Box<dyn Shape>>`, the cache-locality claim spec.md §1
//! makes for segmented storage. No speedup ratio is pinned (open question
//! 9.a in DESIGN.md): growth factors and absolute timings are platform and
//! allocator dependent.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mopa::mopafy;

use polyseg::model::base::BaseModel;
use polyseg::{Collection, ElementOf};

trait Shape: mopa::Any {
    fn area(&self) -> f64;
}
mopafy!(Shape);

#[derive(Clone)]
struct Circle {
    radius: f64,
}
impl Shape for Circle {
    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

#[derive(Clone)]
struct Square {
    side: f64,
}
impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }
}

type M = BaseModel<dyn Shape>;

impl ElementOf<M> for Circle {
    fn erase(ptr: *mut Circle) -> *mut dyn Shape {
        ptr as *mut dyn Shape
    }
}
impl ElementOf<M> for Square {
    fn erase(ptr: *mut Square) -> *mut dyn Shape {
        ptr as *mut dyn Shape
    }
}

fn build_collection(n: usize) -> Collection<M> {
    let mut c = Collection::new();
    for i in 0..n {
        if i % 2 == 0 {
            c.insert(Circle { radius: i as f64 }).unwrap();
        } else {
            c.insert(Square { side: i as f64 }).unwrap();
        }
    }
    c
}

fn build_boxed(n: usize) -> Vec<Box<dyn Shape>> {
    let mut v: Vec<Box<dyn Shape>> = Vec::with_capacity(n);
    for i in 0..n {
        if i % 2 == 0 {
            v.push(Box::new(Circle { radius: i as f64 }));
        } else {
            v.push(Box::new(Square { side: i as f64 }));
        }
    }
    v
}

fn bench_traversal(c: &mut Criterion) {
    let n = 10_000;
    let segmented = build_collection(n);
    let boxed = build_boxed(n);

    let mut group = c.benchmark_group("traversal");
    group.bench_function("segmented_collection", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for shape in segmented.iter() {
                total += shape.area();
            }
            black_box(total)
        })
    });
    group.bench_function("vec_of_boxed_dyn", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for shape in boxed.iter() {
                total += shape.area();
            }
            black_box(total)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_traversal);
criterion_main!(benches);
