use log::{debug, warn};

use crate::cell::{glyphs, Cell, CellArena, PositionedCell};
use crate::object::{Attributes, CollisionResult, CollisionType, GameObject, ObjectKind};
use crate::Coords;
use Direction::*;

pub const INITIAL_SNAKE_LENGTH: usize = 5;

const SNAKE_COLOR: u8 = 46;
const HEAD_COLOR: u8 = 118;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    fn diff(self) -> (i16, i16) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    /// Direction of a unit step from `from` to `to`, if they are adjacent on one axis.
    fn between(from: Coords, to: Coords) -> Option<Direction> {
        let dx = to.0 as i32 - from.0 as i32;
        let dy = to.1 as i32 - from.1 as i32;

        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Up),
            (0, 1) => Some(Down),
            (-1, 0) => Some(Left),
            (1, 0) => Some(Right),
            _ => None,
        }
    }
}

/// Snake-specific state. The cells themselves live on the owning `GameObject`,
/// head first and tail last.
#[derive(Debug)]
pub struct Snake {
    direction: Direction,
}

impl GameObject {
    /// A snake of `INITIAL_SNAKE_LENGTH` cells heading left, head at `start`
    /// and the rest trailing towards positive x.
    pub fn snake(arena: &mut CellArena, start: Coords) -> Self {
        let len = INITIAL_SNAKE_LENGTH;
        let cells = (0..len)
            .map(|i| {
                let cell = match i {
                    0 => Cell::new(head_char(Left)).with_fg(HEAD_COLOR).with_detector(),
                    i if i == len - 1 => Cell::new(tail_char(Left)).with_fg(SNAKE_COLOR),
                    _ => Cell::new(glyphs::SNAKE_BODY).with_fg(SNAKE_COLOR),
                };
                PositionedCell::new((start.0 + i as u16, start.1), arena.alloc(cell))
            })
            .collect();

        GameObject::new(
            ObjectKind::Snake(Snake::new(Left)),
            CollisionType::SelfCollide,
            Attributes::MOVABLE | Attributes::ANIMATED,
            cells,
        )
    }
}

impl Snake {
    pub(crate) fn new(direction: Direction) -> Self {
        Snake { direction }
    }

    pub fn set_direction(&mut self, new_direction: Direction) {
        match (&new_direction, &self.direction) {
            (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right) => {
                debug!("Ignoring reversal from {:?} to {:?}", self.direction, new_direction)
            },
            _ => self.direction = new_direction,
        };
    }

    #[cfg(test)]
    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn collision_result(other: &GameObject) -> CollisionResult {
        match other.collision_type() {
            CollisionType::None => CollisionResult::None,
            CollisionType::Trigger => CollisionResult::Points,
            CollisionType::Solid | CollisionType::SelfCollide => CollisionResult::GameOver,
        }
    }

    pub(crate) fn move_step(&self, cells: &mut [PositionedCell], arena: &mut CellArena) {
        if cells.is_empty() {
            return;
        }

        // Tail first, so every segment reads its predecessor before it is overwritten
        for i in (1..cells.len()).rev() {
            let ahead = cells[i - 1].pos();
            cells[i].set_pos(ahead);
        }

        let (dx, dy) = self.direction.diff();
        let head = cells[0].pos();
        cells[0].set_pos((head.0.saturating_add_signed(dx), head.1.saturating_add_signed(dy)));

        arena.get_mut(cells[0].cell).ch = head_char(self.direction);
        update_tail_glyph(cells, arena);
    }

    /// Adds one body cell in front of the tail and pushes the tail one cell further out.
    /// When that cell is blocked or off the board the tail stays put with the new body
    /// cell stacked under it, and the next move unfolds them.
    pub(crate) fn grow(
        &self,
        cells: &mut Vec<PositionedCell>,
        arena: &mut CellArena,
        is_blocked: impl Fn(Coords) -> bool,
    ) -> bool {
        if cells.len() < 2 {
            warn!("Snake too short to grow ({} cells), skipping", cells.len());
            return false;
        }

        let tail_idx = cells.len() - 1;
        let tail = cells[tail_idx].pos();
        let ahead = cells[tail_idx - 1].pos();
        let (dx, dy) = (tail.0 as i32 - ahead.0 as i32, tail.1 as i32 - ahead.1 as i32);

        let extended = match (
            tail.0.checked_add_signed(dx as i16),
            tail.1.checked_add_signed(dy as i16),
        ) {
            (Some(x), Some(y)) if !is_blocked((x, y)) => (x, y),
            _ => {
                debug!("Snake tail at {:?} has no room to extend, holding it in place", tail);
                tail
            }
        };

        let body = arena.alloc(Cell::new(glyphs::SNAKE_BODY).with_fg(SNAKE_COLOR));
        cells.insert(tail_idx, PositionedCell::new(tail, body));
        cells[tail_idx + 1].set_pos(extended);
        update_tail_glyph(cells, arena);

        debug!("Snake grew to {} cells", cells.len());
        true
    }
}

fn update_tail_glyph(cells: &[PositionedCell], arena: &mut CellArena) {
    if cells.len() < 2 {
        return;
    }

    let tail = cells[cells.len() - 1];
    let ahead = cells[cells.len() - 2];

    if let Some(dir) = Direction::between(tail.pos(), ahead.pos()) {
        arena.get_mut(tail.cell).ch = tail_char(dir);
    }
}

pub fn head_char(direction: Direction) -> char {
    match direction {
        Up => glyphs::SNAKE_HEAD_UP,
        Down => glyphs::SNAKE_HEAD_DOWN,
        Left => glyphs::SNAKE_HEAD_LEFT,
        Right => glyphs::SNAKE_HEAD_RIGHT,
    }
}

pub fn tail_char(direction: Direction) -> char {
    match direction {
        Up => glyphs::SNAKE_TAIL_UP,
        Down => glyphs::SNAKE_TAIL_DOWN,
        Left => glyphs::SNAKE_TAIL_LEFT,
        Right => glyphs::SNAKE_TAIL_RIGHT,
    }
}
