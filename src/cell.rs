//! Terminal cells and the arena that owns them.
//!
//! Game objects and the screen buffer never hold `Cell` values directly. They hold
//! `CellId` handles into a single `CellArena`, so a glyph or color change made by the
//! owning object is what the screen buffer renders on the next frame.

use crate::{Coords, TermInt};

pub mod glyphs {
    pub const SPACE: char = ' ';

    pub const HORIZ_DOUBLE_LINE: char = '\u{2550}'; // ═
    pub const VERT_DOUBLE_LINE: char = '\u{2551}'; // ║
    pub const TOP_LEFT_DOUBLE_CORNER: char = '\u{2554}'; // ╔
    pub const TOP_RIGHT_DOUBLE_CORNER: char = '\u{2557}'; // ╗
    pub const BOTTOM_LEFT_DOUBLE_CORNER: char = '\u{255A}'; // ╚
    pub const BOTTOM_RIGHT_DOUBLE_CORNER: char = '\u{255D}'; // ╝

    pub const SNAKE_BODY: char = '\u{25A3}'; // ▣
    pub const SNAKE_HEAD_UP: char = '\u{25B2}'; // ▲
    pub const SNAKE_HEAD_DOWN: char = '\u{25BC}'; // ▼
    pub const SNAKE_HEAD_LEFT: char = '\u{25C0}'; // ◀
    pub const SNAKE_HEAD_RIGHT: char = '\u{25B6}'; // ▶
    pub const SNAKE_TAIL_UP: char = '\u{25B3}'; // △
    pub const SNAKE_TAIL_DOWN: char = '\u{25BD}'; // ▽
    pub const SNAKE_TAIL_LEFT: char = '\u{25C1}'; // ◁
    pub const SNAKE_TAIL_RIGHT: char = '\u{25B7}'; // ▷

    pub const FOOD: char = '\u{25CE}'; // ◎
}

/// A single terminal glyph with its colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    /// 256-color palette index, ignored when `default_fg` is set.
    pub fg: u8,
    pub bg: u8,
    pub default_fg: bool,
    pub default_bg: bool,
    /// Marks the contact point used for self-collision probing.
    pub detector: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: glyphs::SPACE,
            fg: 0xFF,
            bg: 0xFF,
            default_fg: true,
            default_bg: true,
            detector: false,
        }
    }
}

impl Cell {
    pub fn new(ch: char) -> Self {
        Cell { ch, ..Cell::default() }
    }

    pub fn with_fg(mut self, fg: u8) -> Self {
        self.fg = fg;
        self.default_fg = false;
        self
    }

    pub fn with_detector(mut self) -> Self {
        self.detector = true;
        self
    }
}

/// Stable handle to a cell stored in a `CellArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(u32);

impl CellId {
    /// The shared sentinel stamped on every vacant screen position.
    pub const EMPTY: CellId = CellId(0);

    pub fn is_empty(self) -> bool {
        self == CellId::EMPTY
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

pub struct CellArena {
    cells: Vec<Cell>,
    free: Vec<CellId>,
}

impl CellArena {
    pub fn new() -> Self {
        CellArena { cells: vec![Cell::default()], free: vec![] }
    }

    pub fn alloc(&mut self, cell: Cell) -> CellId {
        match self.free.pop() {
            Some(id) => {
                self.cells[id.index()] = cell;
                id
            }
            None => {
                let id = CellId(self.cells.len() as u32);
                self.cells.push(cell);
                id
            }
        }
    }

    /// Returns a cell's slot to the arena. Releasing the sentinel is a no-op.
    pub fn release(&mut self, id: CellId) {
        if id.is_empty() {
            return;
        }

        self.cells[id.index()] = Cell::default();
        self.free.push(id);
    }

    pub fn get(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    pub fn get_mut(&mut self, id: CellId) -> &mut Cell {
        debug_assert!(!id.is_empty(), "the empty sentinel is shared and must not be mutated");
        &mut self.cells[id.index()]
    }

    /// Number of live cells, the sentinel excluded.
    #[cfg(test)]
    pub fn live(&self) -> usize {
        self.cells.len() - 1 - self.free.len()
    }
}

/// A cell bound to a board coordinate. Owned by exactly one game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedCell {
    pub x: TermInt,
    pub y: TermInt,
    pub cell: CellId,
}

impl PositionedCell {
    pub fn new((x, y): Coords, cell: CellId) -> Self {
        PositionedCell { x, y, cell }
    }

    pub fn pos(&self) -> Coords {
        (self.x, self.y)
    }

    pub fn set_pos(&mut self, (x, y): Coords) {
        self.x = x;
        self.y = y;
    }
}
