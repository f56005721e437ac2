//! The screen buffer: a grid of cell handles plus the objects stamped into it.
//!
//! Objects are stamped in registration order, so a later object wins where two
//! overlap. Vacant positions all hold `CellId::EMPTY`.

use std::collections::HashSet;

use log::{debug, trace};

use crate::cell::{Cell, CellArena, CellId};
use crate::object::GameObject;
use crate::{Coords, TermInt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u32);

pub struct ScreenBuffer {
    width: TermInt,
    height: TermInt,
    arena: CellArena,
    grid: Vec<CellId>,
    ids: Vec<ObjectId>,
    objects: Vec<GameObject>,
    next_id: u32,
    /// Positions that held a cell before the last update and are empty after it.
    stale: Vec<Coords>,
    /// Positions blanked by `remove_object` since the last update.
    removed: Vec<Coords>,
}

impl ScreenBuffer {
    pub fn new(width: TermInt, height: TermInt) -> Self {
        ScreenBuffer {
            width,
            height,
            arena: CellArena::new(),
            grid: vec![CellId::EMPTY; width as usize * height as usize],
            ids: vec![],
            objects: vec![],
            next_id: 0,
            stale: vec![],
            removed: vec![],
        }
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn arena(&self) -> &CellArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut CellArena {
        &mut self.arena
    }

    /// Registered objects, in registration order.
    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    pub fn add_object(&mut self, obj: GameObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        for pc in obj.cells() {
            self.set(pc.pos(), pc.cell);
        }

        trace!("Registered object {:?} with {} cells", id, obj.cells().len());
        self.ids.push(id);
        self.objects.push(obj);
        id
    }

    /// Unregisters an object, blanks the positions it was stamped on and frees its cells.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<GameObject> {
        let idx = self.index_of(id)?;
        self.ids.remove(idx);
        let obj = self.objects.remove(idx);

        for pc in obj.cells() {
            if self.cell_id(pc.pos()) == Some(pc.cell) {
                self.set(pc.pos(), CellId::EMPTY);
                self.removed.push(pc.pos());
            }
            self.arena.release(pc.cell);
        }

        debug!("Removed object {:?}", id);
        Some(obj)
    }

    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.index_of(id).map(|idx| &self.objects[idx])
    }

    /// Mutable access to an object together with the arena its cells live in.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<(&mut GameObject, &mut CellArena)> {
        let idx = self.index_of(id)?;
        Some((&mut self.objects[idx], &mut self.arena))
    }

    /// Moves then animates every registered object.
    pub fn step_objects(&mut self) {
        for obj in self.objects.iter_mut() {
            obj.perform_move(&mut self.arena);
            obj.perform_animate(&mut self.arena);
        }
    }

    /// Rebuilds the grid from scratch out of the current object cells. Only this
    /// frame's vacancies are kept for the next clear.
    pub fn update_objects(&mut self) {
        let mut before: Vec<Coords> = self.occupied_positions().collect();
        before.append(&mut self.removed);

        self.grid.fill(CellId::EMPTY);
        for i in 0..self.objects.len() {
            for j in 0..self.objects[i].cells().len() {
                let pc = self.objects[i].cells()[j];
                self.set(pc.pos(), pc.cell);
            }
        }

        self.stale = before.into_iter().filter(|&pos| self.is_position_empty(pos)).collect();
    }

    pub fn is_position_empty(&self, pos: Coords) -> bool {
        self.cell_id(pos).map_or(false, CellId::is_empty)
    }

    pub fn cell_id(&self, pos: Coords) -> Option<CellId> {
        self.index(pos).map(|idx| self.grid[idx])
    }

    #[cfg(test)]
    pub fn get(&self, pos: Coords) -> &Cell {
        self.arena.get(self.cell_id(pos).unwrap_or(CellId::EMPTY))
    }

    /// Snapshot of the grid handles, row-major.
    #[cfg(test)]
    pub fn grid(&self) -> &[CellId] {
        &self.grid
    }

    /// Non-empty positions with the cell to draw there.
    pub fn visible_cells(&self) -> impl Iterator<Item = (Coords, &Cell)> + '_ {
        self.grid
            .iter()
            .enumerate()
            .filter(|(_, id)| !id.is_empty())
            .map(move |(idx, id)| (self.coords(idx), self.arena.get(*id)))
    }

    /// Positions that need erasing on the next draw: everything movable objects
    /// vacated plus whatever removed objects left behind.
    pub fn positions_to_clear(&self) -> Vec<Coords> {
        let mut seen = HashSet::new();

        self.objects
            .iter()
            .filter(|obj| obj.is_movable())
            .flat_map(GameObject::vacated_positions)
            .chain(self.stale.iter().copied())
            .chain(self.removed.iter().copied())
            .filter(|&pos| self.is_position_empty(pos) && seen.insert(pos))
            .collect()
    }

    fn occupied_positions(&self) -> impl Iterator<Item = Coords> + '_ {
        self.visible_cells().map(|(pos, _)| pos)
    }

    fn set(&mut self, pos: Coords, id: CellId) {
        if let Some(idx) = self.index(pos) {
            self.grid[idx] = id;
        }
    }

    fn index(&self, (x, y): Coords) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.width as usize * y as usize + x as usize)
    }

    fn coords(&self, idx: usize) -> Coords {
        let width = self.width as usize;
        ((idx % width) as TermInt, (idx / width) as TermInt)
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.ids.iter().position(|&other| other == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::glyphs;

    fn board() -> (ScreenBuffer, ObjectId, ObjectId) {
        let mut buffer = ScreenBuffer::new(12, 10);
        let border = GameObject::border(buffer.arena_mut(), 12, 10);
        let border_id = buffer.add_object(border);
        let snake = GameObject::snake(buffer.arena_mut(), (6, 5));
        let snake_id = buffer.add_object(snake);
        (buffer, border_id, snake_id)
    }

    #[test]
    fn add_object_stamps_cells() {
        let (buffer, _, _) = board();

        assert!(!buffer.is_position_empty((0, 0)));
        assert!(!buffer.is_position_empty((6, 5)));
        assert!(buffer.is_position_empty((3, 3)));
        assert_eq!(buffer.get((6, 5)).ch, glyphs::SNAKE_HEAD_LEFT);
        assert_eq!(buffer.get((3, 3)), &Cell::default());
    }

    #[test]
    fn out_of_bounds_is_never_empty() {
        let (buffer, _, _) = board();

        assert!(!buffer.is_position_empty((12, 0)));
        assert!(!buffer.is_position_empty((0, 10)));
        assert_eq!(buffer.cell_id((40, 40)), None);
    }

    #[test]
    fn later_registration_wins_overlap() {
        let (mut buffer, _, _) = board();
        let food = GameObject::food(buffer.arena_mut(), (6, 5));
        buffer.add_object(food);

        buffer.update_objects();
        assert_eq!(buffer.get((6, 5)).ch, glyphs::FOOD);
    }

    #[test]
    fn remove_object_blanks_and_frees() {
        let (mut buffer, _, _) = board();
        let live = buffer.arena().live();
        let food = GameObject::food(buffer.arena_mut(), (2, 2));
        let food_id = buffer.add_object(food);

        assert!(!buffer.is_position_empty((2, 2)));
        assert!(buffer.remove_object(food_id).is_some());
        assert!(buffer.is_position_empty((2, 2)));
        assert!(buffer.object(food_id).is_none());
        assert!(buffer.remove_object(food_id).is_none());
        assert_eq!(buffer.arena().live(), live);
        assert_eq!(buffer.positions_to_clear(), vec![(2, 2)]);
    }

    #[test]
    fn update_is_idempotent() {
        let (mut buffer, _, _) = board();
        buffer.step_objects();

        buffer.update_objects();
        let first = buffer.grid().to_vec();
        buffer.update_objects();

        assert_eq!(buffer.grid(), &first[..]);
    }

    #[test]
    fn positions_to_clear_after_move() {
        let (mut buffer, _, _) = board();

        buffer.step_objects();
        buffer.update_objects();

        assert_eq!(buffer.positions_to_clear(), vec![(10, 5)]);
        assert!(buffer.is_position_empty((10, 5)));
        assert!(!buffer.is_position_empty((5, 5)));
    }

    #[test]
    fn positions_to_clear_holds_only_the_last_frame() {
        let mut buffer = ScreenBuffer::new(20, 10);
        let border = GameObject::border(buffer.arena_mut(), 20, 10);
        buffer.add_object(border);
        let snake = GameObject::snake(buffer.arena_mut(), (10, 5));
        buffer.add_object(snake);

        for tick in 0..4u16 {
            buffer.step_objects();
            buffer.update_objects();

            let cleared: HashSet<Coords> = buffer.positions_to_clear().into_iter().collect();
            assert_eq!(cleared, HashSet::from([(14 - tick, 5)]));
        }
    }

    #[test]
    fn removal_and_move_in_one_frame_clear_both() {
        let (mut buffer, _, _) = board();
        let food = GameObject::food(buffer.arena_mut(), (2, 2));
        let food_id = buffer.add_object(food);
        buffer.update_objects();
        assert!(buffer.positions_to_clear().is_empty());

        buffer.step_objects();
        buffer.remove_object(food_id);
        buffer.update_objects();

        let cleared: HashSet<Coords> = buffer.positions_to_clear().into_iter().collect();
        assert_eq!(cleared, HashSet::from([(10, 5), (2, 2)]));

        buffer.step_objects();
        buffer.update_objects();

        let cleared: HashSet<Coords> = buffer.positions_to_clear().into_iter().collect();
        assert_eq!(cleared, HashSet::from([(9, 5)]));
    }

    #[test]
    fn object_mut_reaches_arena() {
        let (mut buffer, _, snake_id) = board();

        buffer.step_objects();
        let (snake, arena) = buffer.object_mut(snake_id).unwrap();
        assert!(snake.grow(arena, |_| false));
        buffer.update_objects();

        assert_eq!(buffer.object(snake_id).map(|s| s.cells().len()), Some(6));
        assert_eq!(buffer.get((9, 5)).ch, glyphs::SNAKE_BODY);
        assert_eq!(buffer.get((10, 5)).ch, glyphs::SNAKE_TAIL_LEFT);
        assert!(buffer.positions_to_clear().is_empty());
    }

    #[test]
    fn visible_cells_cover_every_stamp() {
        let (buffer, _, _) = board();
        let total: usize = buffer.objects().iter().map(|o| o.cells().len()).sum();

        assert_eq!(buffer.visible_cells().count(), total);
        assert_eq!(buffer.ids().len(), 2);
    }
}
