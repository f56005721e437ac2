//! Pairwise and self collision detection over the registered objects.
//!
//! Pairs are visited in registration order and cells in insertion order. The
//! first pair producing a result other than `CollisionResult::None` decides the
//! frame; later contacts in the same frame are not reported.

use log::debug;

use crate::cell::CellArena;
use crate::object::{CollisionResult, CollisionType, GameObject};

/// Indices into the object list. `first == second` marks a self check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub first: usize,
    pub second: usize,
}

impl CollisionPair {
    pub fn is_self(&self) -> bool {
        self.first == self.second
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub result: CollisionResult,
    pub pair: CollisionPair,
}

/// Every unordered pair with at least one participating side, plus a self pair
/// for each self-colliding object, emitted right before that object's other pairs.
pub fn collision_pairs(objects: &[GameObject]) -> Vec<CollisionPair> {
    let mut pairs = vec![];

    for (i, a) in objects.iter().enumerate() {
        if a.collision_type() == CollisionType::SelfCollide {
            pairs.push(CollisionPair { first: i, second: i });
        }

        for (j, b) in objects.iter().enumerate().skip(i + 1) {
            let participates = a.collision_type() != CollisionType::None
                || b.collision_type() != CollisionType::None;
            if participates {
                pairs.push(CollisionPair { first: i, second: j });
            }
        }
    }

    pairs
}

/// Does any detector cell of `obj` sit on one of its own non-detector cells?
pub fn check_self(obj: &GameObject, arena: &CellArena) -> CollisionResult {
    let detectors = obj.detector_cells_pos(arena);
    let hit = obj.cells()
        .iter()
        .filter(|pc| !arena.get(pc.cell).detector)
        .any(|pc| detectors.contains(&pc.pos()));

    if hit {
        return obj.collision_result(obj);
    }

    CollisionResult::None
}

/// Result of `a` touching `b`, judged from `a`'s side.
pub fn check_pair(a: &GameObject, b: &GameObject) -> CollisionResult {
    for ca in a.cells() {
        if b.cells().iter().any(|cb| cb.pos() == ca.pos()) {
            return a.collision_result(b);
        }
    }

    CollisionResult::None
}

pub fn detect(objects: &[GameObject], arena: &CellArena) -> Option<Collision> {
    for pair in collision_pairs(objects) {
        let result = if pair.is_self() {
            check_self(&objects[pair.first], arena)
        } else {
            check_pair(&objects[pair.first], &objects[pair.second])
        };

        if result != CollisionResult::None {
            debug!("Collision {:?} between objects {} and {}", result, pair.first, pair.second);
            return Some(Collision { result, pair });
        }
    }

    None
}
