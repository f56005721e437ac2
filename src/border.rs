//! The animated frame around the playing field.

use crate::cell::{glyphs, Cell, CellArena, PositionedCell};
use crate::object::{Attributes, CollisionResult, CollisionType, GameObject, ObjectKind};
use crate::TermInt;

/// First and last index of the 256-color cube the border cycles through.
const PALETTE_START: u8 = 17;
const PALETTE_END: u8 = 231;

impl GameObject {
    /// A closed double-line frame on the outermost rows and columns, leaving a
    /// `(width - 2) x (height - 2)` interior.
    pub fn border(arena: &mut CellArena, width: TermInt, height: TermInt) -> Self {
        let (end_x, end_y) = (width.saturating_sub(1), height.saturating_sub(1));
        let mut cells = vec![];
        let mut place = |pos, ch| {
            let cell = Cell::new(ch).with_fg(palette_color(0));
            cells.push(PositionedCell::new(pos, arena.alloc(cell)));
        };

        for x in 1..end_x {
            place((x, 0), glyphs::HORIZ_DOUBLE_LINE);
            place((x, end_y), glyphs::HORIZ_DOUBLE_LINE);
        }

        for y in 1..end_y {
            place((0, y), glyphs::VERT_DOUBLE_LINE);
            place((end_x, y), glyphs::VERT_DOUBLE_LINE);
        }

        place((0, 0), glyphs::TOP_LEFT_DOUBLE_CORNER);
        place((end_x, 0), glyphs::TOP_RIGHT_DOUBLE_CORNER);
        place((0, end_y), glyphs::BOTTOM_LEFT_DOUBLE_CORNER);
        place((end_x, end_y), glyphs::BOTTOM_RIGHT_DOUBLE_CORNER);

        GameObject::new(ObjectKind::Border, CollisionType::Solid, Attributes::ANIMATED, cells)
    }
}

pub fn palette_color(frame: usize) -> u8 {
    let len = (PALETTE_END - PALETTE_START) as usize + 1;
    PALETTE_START + (frame % len) as u8
}

pub(crate) fn animate(cells: &[PositionedCell], frame: usize, arena: &mut CellArena) {
    let fg = palette_color(frame);

    for pc in cells {
        let cell = arena.get_mut(pc.cell);
        cell.fg = fg;
        cell.default_fg = false;
    }
}

pub(crate) fn collision_result(other: &GameObject) -> CollisionResult {
    match other.collision_type() {
        CollisionType::Solid | CollisionType::SelfCollide => CollisionResult::GameOver,
        CollisionType::None | CollisionType::Trigger => CollisionResult::None,
    }
}
