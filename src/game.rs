use std::collections::HashSet;
use std::{thread::sleep, time::{Duration, Instant}};

use crate::{Coords, TermInt};
use crate::collision;
use crate::config::GameConfig;
use crate::input::Key;
use crate::object::{CollisionResult, GameObject};
use crate::screen::{ObjectId, ScreenBuffer};
use crate::signal::StopFlag;
use crate::snake::{Direction, INITIAL_SNAKE_LENGTH};
use crate::term::TermManager;

use anyhow::{bail, Result};
use log::{debug, info, trace};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

const GAME_OVER_WAIT: Duration = Duration::from_secs(10);

pub struct Game {
    config: GameConfig,
    buffer: ScreenBuffer,
    snake_id: ObjectId,
    food_id: Option<ObjectId>,
    pending_direction: Option<Direction>,
    stop: StopFlag,
    rng: StdRng,
    ticks: u64,
    paused: bool,
    game_over: bool,
    game_positions: Vec<Coords>,
}

impl Game {
    /// Sets up a `width` x `height` board with its border and a snake heading left
    /// from the center.
    pub fn new(
        width: TermInt,
        height: TermInt,
        config: GameConfig,
        stop: StopFlag,
    ) -> Result<Self> {
        let min_width = 2 * INITIAL_SNAKE_LENGTH as TermInt + 2;
        if width < min_width || height < 3 {
            bail!("Terminal too small: {}x{}, need at least {}x3", width, height, min_width);
        }

        let mut buffer = ScreenBuffer::new(width, height);
        let border = GameObject::border(buffer.arena_mut(), width, height);
        buffer.add_object(border);
        let snake = GameObject::snake(buffer.arena_mut(), (width / 2, height / 2));
        let snake_id = buffer.add_object(snake);

        let mut game_positions = vec![];
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                game_positions.push((x, y));
            }
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!("New game on a {}x{} board", width, height);
        Ok(Game {
            config,
            buffer,
            snake_id,
            food_id: None,
            pending_direction: None,
            stop,
            rng,
            ticks: 0,
            paused: false,
            game_over: false,
            game_positions,
        })
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    pub fn snake(&self) -> Option<&GameObject> {
        self.buffer.object(self.snake_id)
    }

    #[cfg(test)]
    pub fn snake_head(&self) -> Option<Coords> {
        self.snake().and_then(|s| s.cells().first()).map(|pc| pc.pos())
    }

    pub fn score(&self) -> usize {
        self.snake().map_or(0, |s| s.cells().len().saturating_sub(INITIAL_SNAKE_LENGTH))
    }

    #[cfg(test)]
    pub fn food_position(&self) -> Option<Coords> {
        let food = self.buffer.object(self.food_id?)?;
        food.cells().first().map(|pc| pc.pos())
    }

    #[cfg(test)]
    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// Remembers a steering request for the next tick. Later calls replace earlier ones.
    pub fn queue_direction(&mut self, direction: Direction) {
        self.pending_direction = Some(direction);
    }

    /// Steering and quit keys. Pause is handled by the caller, which owns the screen.
    pub fn handle_key(&mut self, key: Key) {
        if key.is_quit() {
            info!("Quit requested ({:?})", key);
            self.stop.request();
        } else if let Some(dir) = key.direction() {
            self.queue_direction(dir);
        }
    }

    /// Puts food at `pos` unless the position is taken or food already exists.
    pub fn place_food(&mut self, pos: Coords) -> bool {
        if self.food_id.is_some() || !self.buffer.is_position_empty(pos) {
            return false;
        }

        let food = GameObject::food(self.buffer.arena_mut(), pos);
        self.food_id = Some(self.buffer.add_object(food));
        debug!("Food placed at {:?}", pos);
        true
    }

    pub fn spawn_food(&mut self) -> Option<Coords> {
        let choices: Vec<Coords> = self.game_positions
            .iter()
            .filter(|&&pos| self.buffer.is_position_empty(pos))
            .copied()
            .collect();

        let pos = choices.choose(&mut self.rng).copied();
        match pos {
            Some(pos) if self.place_food(pos) => Some(pos),
            Some(_) => None,
            None => {
                info!("No free cell left for food");
                None
            }
        }
    }

    /// One simulation step: steer, move and animate, resolve the first collision,
    /// refresh the buffer, then spawn food when due.
    pub fn tick(&mut self) -> CollisionResult {
        if self.stop.is_requested() {
            return CollisionResult::None;
        }

        if let Some(dir) = self.pending_direction.take() {
            let snake = self.buffer
                .object_mut(self.snake_id)
                .and_then(|(obj, _)| obj.as_snake_mut());
            if let Some(snake) = snake {
                snake.set_direction(dir);
            }
        }

        self.buffer.step_objects();

        let result = match collision::detect(self.buffer.objects(), self.buffer.arena()) {
            Some(hit) => {
                let ids = self.buffer.ids();
                debug!(
                    "Tick {}: {:?} between {:?} and {:?}",
                    self.ticks, hit.result, ids[hit.pair.first], ids[hit.pair.second]
                );
                hit.result
            }
            None => CollisionResult::None,
        };
        self.apply(result);

        self.buffer.update_objects();

        let interval = self.config.food_interval_ticks;
        if self.food_id.is_none() && interval > 0 && self.ticks % interval == 0 {
            self.spawn_food();
        }

        trace!("Tick {} -> {:?}", self.ticks, result);
        self.ticks += 1;
        result
    }

    pub fn run(&mut self, term: &mut TermManager) -> Result<()> {
        let mut last_tick = Instant::now();
        self.draw(term)?;

        while !self.stop.is_requested() {
            loop {
                match term.read_key()? {
                    Key::None => break,
                    Key::Escape => self.toggle_pause(term)?,
                    key => self.handle_key(key),
                }
            }

            if !self.paused && last_tick.elapsed() >= self.config.tick_interval() {
                last_tick = Instant::now();
                self.tick();
                self.draw(term)?;
            }

            sleep(self.config.poll_interval());
        }

        if self.game_over {
            let score = format!("Score: {}", self.score());
            term.show_message(&["Game over!", score.as_str(), "", "Press any key to quit"])?;
            term.wait_key(GAME_OVER_WAIT)?;
        }

        info!("Game finished after {} ticks, score {}", self.ticks, self.score());
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn apply(&mut self, result: CollisionResult) {
        match result {
            CollisionResult::None => {},
            CollisionResult::Points => {
                if let Some(food_id) = self.food_id.take() {
                    self.buffer.remove_object(food_id);
                }
                // The tail may not be pushed onto the border or anything else
                let taken: HashSet<Coords> = self.buffer.ids()
                    .iter()
                    .zip(self.buffer.objects())
                    .filter(|&(&id, _)| id != self.snake_id)
                    .flat_map(|(_, obj)| obj.cells().iter().map(|pc| pc.pos()))
                    .collect();
                if let Some((snake, arena)) = self.buffer.object_mut(self.snake_id) {
                    snake.grow(arena, |pos| taken.contains(&pos));
                }
                info!("Food eaten, score {}", self.score());
            },
            CollisionResult::GameOver => {
                info!("Game over at tick {}", self.ticks);
                self.game_over = true;
                self.stop.request();
            },
        }
    }

    fn draw(&mut self, term: &mut TermManager) -> Result<()> {
        let status = format!("Score: {}  |  Arrows/WASD steer  Esc pause  q quit", self.score());
        let to_clear = self.buffer.positions_to_clear();
        term.render(&self.buffer, &to_clear, &status)
    }

    fn toggle_pause(&mut self, term: &mut TermManager) -> Result<()> {
        if !self.paused {
            term.show_message(&["Paused", "Press Esc to resume", "or q to quit"])?;
        } else {
            term.hide_message()?;
            self.draw(term)?;
        }

        self.paused = !self.paused;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> GameConfig {
        GameConfig { food_interval_ticks: 0, seed: Some(1), ..GameConfig::default() }
    }

    /// 10x8 interior, snake head at (6, 5).
    fn small_game() -> (Game, StopFlag) {
        let stop = StopFlag::new();
        let game = Game::new(12, 10, quiet_config(), stop.clone()).unwrap();
        (game, stop)
    }

    #[test]
    fn rejects_tiny_boards() {
        assert!(Game::new(8, 10, quiet_config(), StopFlag::new()).is_err());
        assert!(Game::new(20, 2, quiet_config(), StopFlag::new()).is_err());
    }

    #[test]
    fn straight_run_through_clear_interior() {
        let (mut game, stop) = small_game();
        assert_eq!(game.snake_head(), Some((6, 5)));

        for _ in 0..5 {
            assert_eq!(game.tick(), CollisionResult::None);
            assert_eq!(game.snake().map(|s| s.cells().len()), Some(INITIAL_SNAKE_LENGTH));
        }

        assert_eq!(game.snake_head(), Some((1, 5)));
        assert!(!stop.is_requested());
    }

    #[test_log::test]
    fn top_wall_ends_the_game_once() {
        let (mut game, stop) = small_game();
        game.queue_direction(Direction::Up);

        let results: Vec<_> = (0..10).map(|_| game.tick()).collect();

        assert_eq!(results[4], CollisionResult::GameOver);
        assert_eq!(results.iter().filter(|&&r| r == CollisionResult::GameOver).count(), 1);
        assert!(stop.is_requested());
        assert!(game.is_over());
        assert_eq!(game.snake_head(), Some((6, 0)));
    }

    #[test]
    fn eating_food_grows_and_removes_it() {
        let (mut game, _) = small_game();
        assert!(game.place_food((5, 5)));
        assert!(!game.place_food((3, 3)));

        assert_eq!(game.tick(), CollisionResult::Points);

        assert_eq!(game.food_position(), None);
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().map(|s| s.cells().len()), Some(INITIAL_SNAKE_LENGTH + 1));
        assert_eq!(game.buffer().get((5, 5)).ch, crate::cell::glyphs::SNAKE_HEAD_LEFT);
        assert!(!game.buffer().is_position_empty((10, 5)));
    }

    #[test]
    fn eating_beside_the_wall_keeps_the_tail_inside() {
        let (mut game, _) = small_game();
        let turns = [Some(Direction::Down), None, None, Some(Direction::Left), Some(Direction::Up)];
        for dir in turns.into_iter().chain([None, None]) {
            if let Some(dir) = dir {
                game.queue_direction(dir);
            }
            assert_eq!(game.tick(), CollisionResult::None);
        }
        assert_eq!(game.snake_head(), Some((5, 5)));

        // The tail sits on the bottom row heading away from the wall below it
        assert!(game.place_food((5, 4)));
        assert_eq!(game.tick(), CollisionResult::Points);

        let snake: Vec<Coords> = game.snake().unwrap().cells().iter().map(|pc| pc.pos()).collect();
        assert_eq!(snake, vec![(5, 4), (5, 5), (5, 6), (5, 7), (5, 8), (5, 8)]);
        assert_eq!(game.buffer().get((5, 9)).ch, crate::cell::glyphs::HORIZ_DOUBLE_LINE);

        assert_eq!(game.tick(), CollisionResult::None);
        let snake: Vec<Coords> = game.snake().unwrap().cells().iter().map(|pc| pc.pos()).collect();
        assert_eq!(snake, vec![(5, 3), (5, 4), (5, 5), (5, 6), (5, 7), (5, 8)]);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn food_is_not_placed_on_occupied_cells() {
        let (mut game, _) = small_game();

        assert!(!game.place_food((0, 0)));
        assert!(!game.place_food((7, 5)));
        assert_eq!(game.food_position(), None);
    }

    #[test]
    fn running_into_own_body_ends_the_game() {
        let (mut game, stop) = small_game();

        for dir in [Direction::Up, Direction::Right] {
            game.queue_direction(dir);
            assert_eq!(game.tick(), CollisionResult::None);
        }
        game.queue_direction(Direction::Down);

        assert_eq!(game.tick(), CollisionResult::GameOver);
        assert!(stop.is_requested());
    }

    #[test]
    fn latest_direction_wins() {
        let (mut game, _) = small_game();
        game.queue_direction(Direction::Up);
        game.queue_direction(Direction::Down);

        game.tick();
        assert_eq!(game.snake_head(), Some((6, 6)));
    }

    #[test]
    fn reversal_key_is_ignored() {
        let (mut game, _) = small_game();
        game.handle_key(Key::Right);

        game.tick();
        assert_eq!(game.snake_head(), Some((5, 5)));
    }

    #[test]
    fn food_spawns_on_cadence_in_a_free_cell() {
        let stop = StopFlag::new();
        let config = GameConfig { food_interval_ticks: 3, seed: Some(7), ..GameConfig::default() };
        let mut game = Game::new(12, 10, config, stop).unwrap();

        game.tick();
        let food = game.food_position().unwrap();
        assert!((1..11).contains(&food.0) && (1..9).contains(&food.1));
        assert!(!game.snake().unwrap().cells().iter().any(|pc| pc.pos() == food));
        assert_eq!(game.spawn_food(), None);
    }

    #[test]
    fn quit_key_stops_and_freezes_the_board() {
        let (mut game, stop) = small_game();
        game.handle_key(Key::Char('q'));
        assert!(stop.is_requested());

        assert_eq!(game.tick(), CollisionResult::None);
        assert_eq!(game.snake_head(), Some((6, 5)));
        assert!(!game.is_over());
    }

    #[test]
    fn external_stop_is_honored() {
        let (mut game, stop) = small_game();
        stop.request();

        game.tick();
        assert_eq!(game.snake_head(), Some((6, 5)));
    }
}
