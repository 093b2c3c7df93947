//! The game: spawning, input, gravity, locking and line clears, one tick at a time.

use crate::field::Field;
use crate::geom::Point2;
use crate::piece::Tetromino;
use crate::shape::{random_shape, random_type, Catalog};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Tick counts.
pub type Tick = u64;

/// Game rules that can be tuned at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Field width in tiles.
    pub width: usize,
    /// Field height in tiles.
    pub height: usize,
    /// Ticks between two gravity steps.
    pub sink_interval: Tick,
    /// Ticks after a move input before the next one is accepted.
    pub input_timeout: Tick,
    /// Ticks in one second of game time; a new piece spawns one second after a lock.
    pub ticks_per_second: Tick,
    /// Where new pieces appear.
    pub spawn_anchor: Point2<isize>,
    /// Where the next piece is shown.
    pub preview_anchor: Point2<isize>,
    /// Which shapes pieces are drawn from.
    pub catalog: Catalog,
    /// Soft drop schedules gravity this many ticks ahead (reduced catalog only).
    pub soft_drop_offset: Tick,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: Field::WIDTH,
            height: Field::HEIGHT,
            sink_interval: 30,
            input_timeout: 5,
            ticks_per_second: 60,
            spawn_anchor: Point2::new(4, 19),
            preview_anchor: Point2::new(15, 15),
            catalog: Catalog::Full,
            soft_drop_offset: 1,
        }
    }
}

/// Horizontal input direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum Horizontal {
    Left = -1,
    None = 0,
    Right = 1,
}

impl Horizontal {
    /// Returns the x offset of this direction.
    pub fn dx(&self) -> isize {
        *self as i8 as isize
    }
}

impl Default for Horizontal {
    fn default() -> Self {
        Horizontal::None
    }
}

impl From<i8> for Horizontal {
    fn from(this: i8) -> Self {
        match this {
            0 => Horizontal::None,
            x if x < 0 => Horizontal::Left,
            _ => Horizontal::Right,
        }
    }
}

/// Input for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Input {
    pub horizontal: Horizontal,
    pub soft_drop: bool,
    pub rotate: bool,
}

impl Input {
    pub fn new(horizontal: Horizontal, soft_drop: bool, rotate: bool) -> Input {
        Input {
            horizontal,
            soft_drop,
            rotate,
        }
    }

    /// Returns true if a movement direction is held.
    pub fn has_direction(&self) -> bool {
        self.soft_drop || self.horizontal != Horizontal::None
    }
}

/// A running game.
///
/// Everything that changes while playing lives here; the random source is injected so that spawn
/// sequences can be replayed.
#[derive(Debug, Clone)]
pub struct Game<R = StdRng> {
    config: GameConfig,
    rng: R,
    field: Field,
    /// The falling piece.
    current_piece: Option<Tetromino>,
    /// The preview piece (full catalog only).
    next_piece: Option<Tetromino>,
    tick: Tick,
    next_spawn_tick: Tick,
    next_sink_tick: Tick,
    next_move_tick: Tick,
    lines_cleared: usize,
    topped_out: bool,
}

impl<R: Rng> Game<R> {
    pub fn new(config: GameConfig, rng: R) -> Game<R> {
        let mut game = Game {
            field: Field::new(config.width, config.height),
            config,
            rng,
            current_piece: None,
            next_piece: None,
            tick: 0,
            next_spawn_tick: 0,
            next_sink_tick: 0,
            next_move_tick: 0,
            lines_cleared: 0,
            topped_out: false,
        };
        game.reset();
        game
    }

    /// Restarts the game with an empty field. The random source keeps its state.
    pub fn reset(&mut self) {
        self.field = Field::new(self.config.width, self.config.height);
        self.current_piece = None;
        self.next_piece = None;
        self.tick = 0;
        self.next_sink_tick = 0;
        self.next_move_tick = 0;
        self.lines_cleared = 0;
        self.topped_out = false;
        self.roll_next_piece();
        self.next_spawn_tick = self.tick + self.config.ticks_per_second;
    }

    /// Runs one tick with the given input, then advances the tick counter.
    pub fn tick(&mut self, input: &Input) {
        if !self.topped_out {
            self.spawn_if_needed();
            if input.rotate {
                self.rotate_current();
            }
            if input.has_direction() {
                self.move_current(input);
            }
            self.sink_current();
        }
        self.tick += 1;
    }

    /// Advances the tick counter without running the game, e.g. for frames a host dropped.
    pub fn skip_ticks(&mut self, ticks: Tick) {
        self.tick += ticks;
    }

    fn roll_piece(&mut self, pos: Point2<isize>) -> Tetromino {
        let shape = random_shape(&mut self.rng, self.config.catalog);
        let piece_type = random_type(&mut self.rng);
        Tetromino::new(pos, shape, piece_type)
    }

    fn roll_next_piece(&mut self) {
        if self.config.catalog.has_preview() {
            self.next_piece = Some(self.roll_piece(self.config.preview_anchor));
        }
    }

    fn spawn_if_needed(&mut self) {
        if self.current_piece.is_some() || self.tick < self.next_spawn_tick {
            return;
        }

        let spawn_anchor = self.config.spawn_anchor;
        let piece = match self.next_piece.take() {
            Some(next) => next.moved_to(spawn_anchor),
            None => self.roll_piece(spawn_anchor),
        };
        self.roll_next_piece();

        if piece.colliding(&self.field) {
            debug!("tick {}: no room to spawn {:?}, topped out", self.tick, piece);
            self.topped_out = true;
            return;
        }

        debug!("tick {}: spawned {:?}", self.tick, piece);
        self.current_piece = Some(piece);
        self.next_sink_tick = self.tick + self.config.sink_interval;
    }

    fn rotate_current(&mut self) {
        if let Some(piece) = self.current_piece {
            let rotated = piece.rotated();
            if rotated.colliding(&self.field) {
                trace!("tick {}: rotation blocked", self.tick);
            } else {
                self.current_piece = Some(rotated);
            }
        }
    }

    fn move_current(&mut self, input: &Input) {
        let piece = match self.current_piece {
            Some(piece) if self.tick >= self.next_move_tick => piece,
            _ => return,
        };

        if input.soft_drop {
            let target = match self.config.catalog {
                Catalog::Full => self.tick,
                Catalog::Reduced => self.tick + self.config.soft_drop_offset,
            };
            self.next_sink_tick = self.next_sink_tick.min(target);
        } else {
            let moved = piece.translated((input.horizontal.dx(), 0).into());
            if moved.colliding(&self.field) {
                trace!("tick {}: move {:?} blocked", self.tick, input.horizontal);
            } else {
                self.current_piece = Some(moved);
            }
        }
        self.next_move_tick = self.tick + self.config.input_timeout;
    }

    fn sink_current(&mut self) {
        let piece = match self.current_piece {
            Some(piece) if self.tick >= self.next_sink_tick => piece,
            _ => return,
        };

        let sunk = piece.translated((0, -1).into());
        if sunk.colliding(&self.field) {
            self.lock(piece);
        } else {
            self.current_piece = Some(sunk);
            self.next_sink_tick = self.tick + self.config.sink_interval;
        }
    }

    /// Writes the piece into the field and clears any rows it completed.
    fn lock(&mut self, piece: Tetromino) {
        debug!("tick {}: locking {:?}", self.tick, piece);

        let mut fits = true;
        for p in piece.positions() {
            fits &= self.field.set_cell(p.x, p.y, piece.piece_type());
        }

        self.clear_full_lines(&piece.rows_descending());
        self.current_piece = None;
        self.next_spawn_tick = self.tick + self.config.ticks_per_second;

        if !fits {
            debug!("tick {}: piece locked above the top row, topped out", self.tick);
            self.topped_out = true;
        }
    }

    /// Clears the full rows among `rows`, which must be sorted highest first so that clearing
    /// one does not shift a row that is still to be checked.
    fn clear_full_lines(&mut self, rows: &[isize]) {
        debug_assert!(rows.windows(2).all(|w| w[0] > w[1]));

        let mut cleared = 0;
        for &y in rows {
            if y < 0 {
                continue;
            }
            let y = y as usize;
            if self.field.is_line_full(y) {
                self.field.clear_line(y);
                cleared += 1;
            }
        }

        if cleared > 0 {
            debug!("tick {}: cleared {} line(s)", self.tick, cleared);
            self.lines_cleared += cleared;
        }
    }
}

impl<R> Game<R> {
    /// Returns the configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns the field.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the falling piece.
    pub fn current_piece(&self) -> Option<&Tetromino> {
        self.current_piece.as_ref()
    }

    /// Returns the preview piece.
    pub fn next_piece(&self) -> Option<&Tetromino> {
        self.next_piece.as_ref()
    }

    /// Returns the tick the next call to `tick` will run.
    pub fn tick_count(&self) -> Tick {
        self.tick
    }

    /// Returns the tick at which gravity next moves the falling piece.
    pub fn next_sink_tick(&self) -> Tick {
        self.next_sink_tick
    }

    /// Returns the tick at which the next piece spawns, if none is falling.
    pub fn next_spawn_tick(&self) -> Tick {
        self.next_spawn_tick
    }

    /// Returns the total number of cleared lines.
    pub fn lines_cleared(&self) -> usize {
        self.lines_cleared
    }

    /// Returns true if a piece could not be placed and the game is over.
    pub fn is_topped_out(&self) -> bool {
        self.topped_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Tile;
    use crate::shape::{PieceType, ShapeKind};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;

    const IDLE: Input = Input {
        horizontal: Horizontal::None,
        soft_drop: false,
        rotate: false,
    };

    fn game() -> Game<StepRng> {
        Game::new(GameConfig::default(), StepRng::new(0, 0))
    }

    /// Makes `kind` the falling piece at `(x, y)`, due to sink at `next_sink_tick`.
    fn place(game: &mut Game<StepRng>, kind: ShapeKind, x: isize, y: isize) {
        game.current_piece = Some(Tetromino::new(
            (x, y).into(),
            kind.shape(),
            PieceType::Orange,
        ));
        game.next_sink_tick = game.tick + game.config.sink_interval;
    }

    fn run<R: Rng>(game: &mut Game<R>, input: &Input, ticks: Tick) {
        for _ in 0..ticks {
            game.tick(input);
        }
    }

    #[test]
    fn first_piece_spawns_after_one_second() {
        let mut game = game();
        assert!(game.current_piece().is_none());
        assert!(game.next_piece().is_some());
        assert_eq!(game.next_piece().unwrap().pos(), Point2::new(15, 15));

        run(&mut game, &IDLE, 60);
        assert!(game.current_piece().is_none());

        game.tick(&IDLE);
        let piece = *game.current_piece().unwrap();
        assert_eq!(piece.pos(), Point2::new(4, 19));
        assert_eq!(piece.kind(), Some(ShapeKind::I));
        assert_eq!(game.next_sink_tick(), 60 + 30);
        assert!(game.next_piece().is_some());
    }

    #[test]
    fn spawned_piece_is_the_previewed_one() {
        let mut game = Game::new(GameConfig::default(), StdRng::seed_from_u64(3));
        let preview = *game.next_piece().unwrap();
        run(&mut game, &IDLE, 61);
        let current = *game.current_piece().unwrap();
        assert_eq!(current.shape(), preview.shape());
        assert_eq!(current.piece_type(), preview.piece_type());
    }

    #[test]
    fn gravity_moves_one_row_per_interval() {
        let mut game = game();
        place(&mut game, ShapeKind::T, 4, 10);

        run(&mut game, &IDLE, 30);
        assert_eq!(game.current_piece().unwrap().pos(), Point2::new(4, 10));
        game.tick(&IDLE);
        assert_eq!(game.current_piece().unwrap().pos(), Point2::new(4, 9));
        assert_eq!(game.next_sink_tick(), 30 + 30);
    }

    #[test]
    fn o_piece_locks_on_the_floor() {
        let mut game = game();
        place(&mut game, ShapeKind::O, 4, 19);

        let mut ticks = 0;
        while game.current_piece().is_some() {
            game.tick(&IDLE);
            ticks += 1;
            assert!(ticks < 10_000, "piece never locked");
        }

        let field = game.field();
        assert_eq!(field.filled_count(), 4);
        for &(x, y) in &[(4, 1), (5, 1), (4, 0), (5, 0)] {
            assert_eq!(field.get_tile(x, y), Some(Tile::Piece(PieceType::Orange)));
        }
        assert_eq!(game.lines_cleared(), 0);
        assert!(!game.is_topped_out());
        assert_eq!(game.next_spawn_tick(), game.tick_count() - 1 + 60);
    }

    #[test]
    fn completing_a_row_clears_it() {
        let mut game = game();
        for x in 0..10 {
            if x != 3 {
                game.field.set_cell(x, 5, PieceType::Gray);
            }
        }
        game.field.set_cell(3, 4, PieceType::Gray);
        game.field.set_cell(8, 6, PieceType::Green);

        // vertical I dropping into the gap at column 3, resting on (3, 4)
        let vertical_i = ShapeKind::I.shape().rotated();
        game.current_piece = Some(Tetromino::new((3, 7).into(), vertical_i, PieceType::Red));
        game.next_sink_tick = game.tick;

        game.tick(&IDLE);
        assert!(game.current_piece().is_none(), "piece should have locked");

        let field = game.field();
        assert_eq!(game.lines_cleared(), 1);
        assert!(!field.is_line_full(5));
        // the I occupied rows 5..=8; row 5 is gone, the rest moved down one
        for y in 5..8 {
            assert_eq!(field.get_tile(3, y), Some(Tile::Piece(PieceType::Red)));
        }
        assert_eq!(field.get_tile(3, 8), Some(Tile::Empty));
        assert_eq!(field.get_tile(8, 5), Some(Tile::Piece(PieceType::Green)));
        assert_eq!(field.get_tile(3, 4), Some(Tile::Piece(PieceType::Gray)));
        assert_eq!(field.filled_count(), 1 + 1 + 3);
    }

    #[test]
    fn clears_several_rows_from_one_lock() {
        let mut game = game();
        for y in 0..4 {
            for x in 1..10 {
                game.field.set_cell(x, y, PieceType::Gray);
            }
        }
        game.field.set_cell(5, 4, PieceType::White);

        let vertical_i = ShapeKind::I.shape().rotated();
        game.current_piece = Some(Tetromino::new((0, 2).into(), vertical_i, PieceType::Blue));
        game.next_sink_tick = game.tick;

        game.tick(&IDLE);

        assert_eq!(game.lines_cleared(), 4);
        assert_eq!(game.field().filled_count(), 1);
        assert_eq!(
            game.field().get_tile(5, 0),
            Some(Tile::Piece(PieceType::White))
        );
    }

    #[test]
    fn rotation_against_left_wall_is_rejected() {
        let mut game = game();
        // vertical I flush against the left wall; turning it back flat needs x = -2
        let vertical_i = ShapeKind::I.shape().rotated();
        game.current_piece = Some(Tetromino::new((0, 10).into(), vertical_i, PieceType::Blue));
        game.next_sink_tick = 1000;
        let before = *game.current_piece().unwrap();

        game.tick(&Input::new(Horizontal::None, false, true));

        assert_eq!(*game.current_piece().unwrap(), before);
    }

    #[test]
    fn rotation_in_open_space_commits() {
        let mut game = game();
        place(&mut game, ShapeKind::T, 4, 10);
        game.tick(&Input::new(Horizontal::None, false, true));
        let piece = game.current_piece().unwrap();
        assert_eq!(piece.pos(), Point2::new(4, 10));
        assert_eq!(piece.shape(), ShapeKind::T.shape().rotated());
    }

    #[test]
    fn horizontal_moves_are_throttled() {
        let mut game = game();
        place(&mut game, ShapeKind::O, 4, 10);
        let right = Input::new(Horizontal::Right, false, false);

        game.tick(&right);
        assert_eq!(game.current_piece().unwrap().pos().x, 5);
        run(&mut game, &right, 4);
        assert_eq!(game.current_piece().unwrap().pos().x, 5);
        game.tick(&right);
        assert_eq!(game.current_piece().unwrap().pos().x, 6);
    }

    #[test]
    fn blocked_moves_still_reset_the_throttle() {
        let mut game = game();
        place(&mut game, ShapeKind::O, 0, 10);
        game.tick(&Input::new(Horizontal::Left, false, false));
        assert_eq!(game.current_piece().unwrap().pos().x, 0);

        // the throttle blocks the right move even though the left one failed
        game.tick(&Input::new(Horizontal::Right, false, false));
        assert_eq!(game.current_piece().unwrap().pos().x, 0);
    }

    #[test]
    fn soft_drop_never_delays_gravity() {
        let drop = Input::new(Horizontal::None, true, false);
        for &catalog in &[Catalog::Full, Catalog::Reduced] {
            let config = GameConfig {
                catalog,
                soft_drop_offset: 3,
                ..GameConfig::default()
            };
            let mut game = Game::new(config, StepRng::new(0, 0));
            place(&mut game, ShapeKind::T, 4, 15);

            for tick in 0..80 {
                game.tick = tick;
                game.next_move_tick = 0;
                if tick % 20 == 0 {
                    game.next_sink_tick = tick / 2;
                }
                let before = game.next_sink_tick();
                game.move_current(&drop);
                assert!(game.next_sink_tick() <= before, "{:?} at tick {}", catalog, tick);
            }
        }
    }

    #[test]
    fn soft_drop_pulls_sink_to_now() {
        let mut game = game();
        place(&mut game, ShapeKind::T, 4, 15);

        game.tick(&Input::new(Horizontal::Right, true, false));
        // soft drop wins over the horizontal direction and sinks right away
        let piece = game.current_piece().unwrap();
        assert_eq!(piece.pos(), Point2::new(4, 14));
        assert_eq!(game.next_sink_tick(), 30);
    }

    #[test]
    fn reduced_mode_soft_drop_uses_offset() {
        let config = GameConfig {
            catalog: Catalog::Reduced,
            soft_drop_offset: 2,
            ..GameConfig::default()
        };
        let mut game = Game::new(config, StepRng::new(0, 0));
        assert!(game.next_piece().is_none());

        run(&mut game, &IDLE, 61);
        assert!(game.current_piece().is_some());
        assert!(game.next_piece().is_none());

        let tick = game.tick_count();
        game.tick(&Input::new(Horizontal::None, true, false));
        assert_eq!(game.next_sink_tick(), tick + 2);
    }

    #[test]
    fn spawning_into_the_stack_tops_out() {
        let mut game = game();
        for y in 0..20 {
            game.field.set_cell(4, y, PieceType::Gray);
        }
        run(&mut game, &IDLE, 61);
        assert!(game.current_piece().is_none());
        assert!(game.is_topped_out());

        let field = game.field().clone();
        run(&mut game, &Input::new(Horizontal::Left, true, true), 200);
        assert_eq!(game.field(), &field);
        assert!(game.current_piece().is_none());
        assert_eq!(game.tick_count(), 261);
    }

    #[test]
    fn locking_above_the_top_row_tops_out() {
        let mut game = game();
        for y in 0..19 {
            game.field.set_cell(3, y, PieceType::Gray);
        }
        // T at (4, 19) reaches into row 20 and lands on column 3
        place(&mut game, ShapeKind::T, 4, 19);
        game.next_sink_tick = game.tick;

        game.tick(&IDLE);

        assert!(game.current_piece().is_none());
        assert!(game.is_topped_out());
        assert_eq!(game.field().get_tile(3, 19), Some(Tile::Piece(PieceType::Orange)));
    }

    #[test]
    fn reset_restarts_the_game() {
        let mut game = game();
        place(&mut game, ShapeKind::O, 4, 1);
        game.next_sink_tick = game.tick;
        game.tick(&IDLE);
        assert_eq!(game.field().filled_count(), 4);

        game.reset();
        assert_eq!(game.tick_count(), 0);
        assert_eq!(game.field().filled_count(), 0);
        assert!(game.current_piece().is_none());
        assert!(game.next_piece().is_some());
        assert_eq!(game.next_spawn_tick(), 60);
        assert_eq!(game.lines_cleared(), 0);
    }

    #[test]
    fn skipped_ticks_count_toward_spawning() {
        let mut game = game();
        game.skip_ticks(60);
        assert!(game.current_piece().is_none());
        game.tick(&IDLE);
        assert!(game.current_piece().is_some());
    }

    #[test]
    fn same_seed_same_game() {
        let script = |tick: Tick| match tick % 7 {
            0 => Input::new(Horizontal::Left, false, false),
            3 => Input::new(Horizontal::None, false, true),
            5 => Input::new(Horizontal::Right, tick % 3 == 0, false),
            _ => IDLE,
        };

        let mut a = Game::new(GameConfig::default(), StdRng::seed_from_u64(42));
        let mut b = Game::new(GameConfig::default(), StdRng::seed_from_u64(42));
        for tick in 0..5_000 {
            a.tick(&script(tick));
            b.tick(&script(tick));
        }
        assert_eq!(a.field(), b.field());
        assert_eq!(a.current_piece(), b.current_piece());
        assert_eq!(a.lines_cleared(), b.lines_cleared());
    }

    #[test]
    fn config_and_input_from_json() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "sink_interval": 10, "catalog": "reduced" }"#).unwrap();
        assert_eq!(config.sink_interval, 10);
        assert_eq!(config.catalog, Catalog::Reduced);
        assert_eq!(config.width, 10);
        assert_eq!(config.spawn_anchor, Point2::new(4, 19));

        let input: Input = serde_json::from_str(r#"{ "horizontal": -1, "rotate": true }"#).unwrap();
        assert_eq!(input, Input::new(Horizontal::Left, false, true));
        assert_eq!(Horizontal::from(5), Horizontal::Right);
        assert_eq!(Horizontal::Left.dx(), -1);
    }
}
