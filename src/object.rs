//! The game object model shared by the border, the snake and food.
//!
//! Variant behavior is dispatched with a `match` on `ObjectKind`; the variant
//! modules (`border`, `snake`, `food`) add their constructors and algorithms.

use bitflags::bitflags;

use crate::cell::{CellArena, PositionedCell};
use crate::snake::Snake;
use crate::{border, food, Coords};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attributes: u16 {
        const MOVABLE  = 1 << 0;
        const ANIMATED = 1 << 1;
    }
}

/// How an object takes part in collision checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Decorative, never checked.
    None,
    /// Ends the game on contact.
    Solid,
    /// Produces a scored event on contact.
    Trigger,
    /// Solid, and also checked against its own detector cells.
    SelfCollide,
}

/// Outcome of a detected contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionResult {
    None,
    Points,
    GameOver,
}

pub enum ObjectKind {
    Border,
    Snake(Snake),
    Food,
}

pub struct GameObject {
    kind: ObjectKind,
    attributes: Attributes,
    collision_type: CollisionType,
    pub(crate) cells: Vec<PositionedCell>,
    previous_positions: Vec<Coords>,
    new_positions: Vec<Coords>,
    pub(crate) animation_frame: usize,
}

impl GameObject {
    pub(crate) fn new(
        kind: ObjectKind,
        collision_type: CollisionType,
        attributes: Attributes,
        cells: Vec<PositionedCell>,
    ) -> Self {
        GameObject {
            kind,
            attributes,
            collision_type,
            cells,
            previous_positions: vec![],
            new_positions: vec![],
            animation_frame: 0,
        }
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn cells(&self) -> &[PositionedCell] {
        &self.cells
    }

    #[cfg(test)]
    pub fn attributes(&self) -> Attributes {
        self.attributes
    }

    pub fn is_movable(&self) -> bool {
        self.attributes.contains(Attributes::MOVABLE)
    }

    pub fn is_animated(&self) -> bool {
        self.attributes.contains(Attributes::ANIMATED)
    }

    pub fn collision_type(&self) -> CollisionType {
        self.collision_type
    }

    #[cfg(test)]
    pub fn as_snake(&self) -> Option<&Snake> {
        match &self.kind {
            ObjectKind::Snake(snake) => Some(snake),
            _ => None,
        }
    }

    pub fn as_snake_mut(&mut self) -> Option<&mut Snake> {
        match &mut self.kind {
            ObjectKind::Snake(snake) => Some(snake),
            _ => None,
        }
    }

    /// Moves the object one step and records the positions before and after,
    /// which is what `vacated_positions` diffs.
    pub fn perform_move(&mut self, arena: &mut CellArena) {
        if !self.is_movable() {
            return;
        }

        self.previous_positions = self.capture_positions();

        match &mut self.kind {
            ObjectKind::Snake(snake) => snake.move_step(&mut self.cells, arena),
            ObjectKind::Border | ObjectKind::Food => {}
        }

        self.new_positions = self.capture_positions();
    }

    /// Advances the animation. Only visual attributes change, never positions.
    pub fn perform_animate(&mut self, arena: &mut CellArena) {
        if !self.is_animated() {
            return;
        }

        self.animation_frame = self.animation_frame.wrapping_add(1);

        match &self.kind {
            ObjectKind::Border => border::animate(&self.cells, self.animation_frame, arena),
            ObjectKind::Snake(_) | ObjectKind::Food => {}
        }
    }

    /// Grows a snake by one cell. `is_blocked` reports positions held by other
    /// objects, which the tail must not be pushed onto. Returns `false` when the
    /// object is not a snake or the snake could not grow.
    pub fn grow(&mut self, arena: &mut CellArena, is_blocked: impl Fn(Coords) -> bool) -> bool {
        let grown = match &mut self.kind {
            ObjectKind::Snake(snake) => snake.grow(&mut self.cells, arena, is_blocked),
            _ => false,
        };

        if grown {
            // The new tail slot is no longer vacated.
            self.new_positions = self.capture_positions();
        }

        grown
    }

    /// Positions occupied before the last move and not occupied after it.
    pub fn vacated_positions(&self) -> Vec<Coords> {
        self.previous_positions
            .iter()
            .filter(|pos| !self.new_positions.contains(pos))
            .copied()
            .collect()
    }

    /// Outcome of this object touching `other`, from this object's point of view.
    pub fn collision_result(&self, other: &GameObject) -> CollisionResult {
        match &self.kind {
            ObjectKind::Border => border::collision_result(other),
            ObjectKind::Snake(_) => Snake::collision_result(other),
            ObjectKind::Food => food::collision_result(other),
        }
    }

    pub fn detector_cells_pos(&self, arena: &CellArena) -> Vec<Coords> {
        self.cells
            .iter()
            .filter(|pc| arena.get(pc.cell).detector)
            .map(PositionedCell::pos)
            .collect()
    }

    fn capture_positions(&self) -> Vec<Coords> {
        self.cells.iter().map(PositionedCell::pos).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn attribute_queries() {
        let mut arena = CellArena::new();
        let snake = GameObject::snake(&mut arena, (10, 5));
        let border = GameObject::border(&mut arena, 20, 10);
        let food = GameObject::food(&mut arena, (3, 3));

        assert!(snake.is_movable() && snake.is_animated());
        assert!(!border.is_movable() && border.is_animated());
        assert!(!food.is_movable() && !food.is_animated());
        assert_eq!(food.attributes(), Attributes::empty());
    }

    #[test]
    fn immovable_object_ignores_move() {
        let mut arena = CellArena::new();
        let mut border = GameObject::border(&mut arena, 6, 4);
        let before = border.cells().to_vec();

        border.perform_move(&mut arena);

        assert_eq!(border.cells(), &before[..]);
        assert!(border.vacated_positions().is_empty());
    }

    #[test]
    fn inanimate_object_keeps_frame() {
        let mut arena = CellArena::new();
        let mut food = GameObject::food(&mut arena, (1, 1));

        food.perform_animate(&mut arena);
        assert_eq!(food.animation_frame, 0);
    }

    #[test]
    fn animation_frame_advances_before_painting() {
        let mut arena = CellArena::new();
        let mut border = GameObject::border(&mut arena, 6, 4);
        let first = border.cells()[0].cell;
        let initial = arena.get(first).fg;

        border.perform_animate(&mut arena);

        assert_eq!(border.animation_frame, 1);
        assert_eq!(arena.get(first).fg, border::palette_color(1));
        assert_ne!(arena.get(first).fg, initial);
    }

    #[test]
    fn detector_cells_are_the_snake_head() {
        let mut arena = CellArena::new();
        let snake = GameObject::snake(&mut arena, (10, 5));

        assert_eq!(snake.detector_cells_pos(&arena), vec![(10, 5)]);
    }

    #[test]
    fn detector_flag_is_read_from_the_arena() {
        let mut arena = CellArena::new();
        let id = arena.alloc(Cell::new('x'));
        let obj = GameObject::new(
            ObjectKind::Food,
            CollisionType::Trigger,
            Attributes::empty(),
            vec![PositionedCell::new((2, 2), id)],
        );
        assert!(obj.detector_cells_pos(&arena).is_empty());

        arena.get_mut(id).detector = true;
        assert_eq!(obj.detector_cells_pos(&arena), vec![(2, 2)]);
    }
}
