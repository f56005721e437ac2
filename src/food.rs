use crate::cell::{glyphs, Cell, CellArena, PositionedCell};
use crate::object::{Attributes, CollisionResult, CollisionType, GameObject, ObjectKind};
use crate::Coords;

const FOOD_COLOR: u8 = 196;

impl GameObject {
    pub fn food(arena: &mut CellArena, pos: Coords) -> Self {
        let cell = arena.alloc(Cell::new(glyphs::FOOD).with_fg(FOOD_COLOR));

        GameObject::new(
            ObjectKind::Food,
            CollisionType::Trigger,
            Attributes::empty(),
            vec![PositionedCell::new(pos, cell)],
        )
    }
}

/// Food scores only when a snake reaches it. Unlike the border and the snake,
/// this keys on the other object's kind rather than its collision type.
pub(crate) fn collision_result(other: &GameObject) -> CollisionResult {
    match other.kind() {
        ObjectKind::Snake(_) => CollisionResult::Points,
        ObjectKind::Border | ObjectKind::Food => CollisionResult::None,
    }
}
