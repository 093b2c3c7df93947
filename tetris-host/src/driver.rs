use crate::protocol::{FieldState, ScriptEntry};
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};
use tetris_core::{Game, Horizontal, Input, Tick};

/// Sleeps so that ticks happen at a fixed rate.
pub struct Pacer {
    interval: Duration,
    next_tick: Instant,
}

impl Pacer {
    pub fn new(ticks_per_second: Tick) -> Pacer {
        let nanos = 1_000_000_000 / ticks_per_second.max(1);
        Pacer {
            interval: Duration::from_nanos(nanos),
            next_tick: Instant::now(),
        }
    }

    /// Blocks until the next tick is due.
    ///
    /// A host that fell behind does not try to catch up; the returned count says how many frames
    /// were dropped.
    pub fn wait(&mut self) -> Tick {
        let now = Instant::now();
        let mut dropped = 0;
        if now < self.next_tick {
            thread::sleep(self.next_tick - now);
        } else {
            let behind = now - self.next_tick;
            dropped = (behind.as_nanos() / self.interval.as_nanos().max(1)) as Tick;
            self.next_tick = now;
        }
        self.next_tick += self.interval;
        dropped
    }
}

/// Feeds scripted input into a game, one tick at a time.
pub struct Driver<R, W> {
    game: Game<R>,
    script: Vec<ScriptEntry>,
    cursor: usize,
    snapshots: Option<W>,
    last_state: Option<FieldState>,
}

impl<R: rand::Rng, W: Write> Driver<R, W> {
    pub fn new(game: Game<R>, script: Vec<ScriptEntry>, snapshots: Option<W>) -> Self {
        Driver {
            game,
            script,
            cursor: 0,
            snapshots,
            last_state: None,
        }
    }

    pub fn game(&self) -> &Game<R> {
        &self.game
    }

    #[cfg(test)]
    pub fn into_snapshots(self) -> Option<W> {
        self.snapshots
    }

    /// Collects the scripted input for the current tick. Entries for several keys on the same
    /// tick are merged; entries for ticks that were skipped are dropped.
    fn input_for_tick(&mut self) -> Input {
        let tick = self.game.tick_count();
        let mut input = Input::default();
        while let Some(entry) = self.script.get(self.cursor) {
            if entry.tick > tick {
                break;
            }
            if entry.tick == tick {
                if entry.input.horizontal != Horizontal::None {
                    input.horizontal = entry.input.horizontal;
                }
                input.soft_drop |= entry.input.soft_drop;
                input.rotate |= entry.input.rotate;
            } else {
                debug!("dropping script entry for skipped tick {}", entry.tick);
            }
            self.cursor += 1;
        }
        input
    }

    /// Runs a single tick.
    pub fn step(&mut self) {
        let input = self.input_for_tick();
        let was_topped_out = self.game.is_topped_out();
        self.game.tick(&input);
        if self.game.is_topped_out() && !was_topped_out {
            info!(
                "topped out on tick {} with {} line(s) cleared",
                self.game.tick_count() - 1,
                self.game.lines_cleared()
            );
        }
        self.write_snapshot_if_dirty();
    }

    fn write_snapshot_if_dirty(&mut self) {
        let out = match &mut self.snapshots {
            Some(out) => out,
            None => return,
        };

        let state = FieldState::of(&self.game);
        let is_dirty = self.last_state.as_ref().map_or(true, |last| {
            last.tiles != state.tiles
                || last.current != state.current
                || last.next != state.next
                || last.topped_out != state.topped_out
        });
        if !is_dirty {
            return;
        }

        match serde_json::to_string(&state) {
            Ok(line) => {
                if let Err(err) = writeln!(out, "{}", line) {
                    error!("failed to write snapshot: {}", err);
                }
            }
            Err(err) => error!("failed to serialize snapshot: {}", err),
        }
        self.last_state = Some(state);
    }

    /// Runs `ticks` ticks, or until the game tops out.
    ///
    /// With a pacer, ticks happen in real time and dropped frames are skipped in the game too.
    pub fn run(&mut self, ticks: Tick, mut pacer: Option<Pacer>) {
        let end = self.game.tick_count() + ticks;
        while self.game.tick_count() < end && !self.game.is_topped_out() {
            if let Some(pacer) = &mut pacer {
                let dropped = pacer.wait().min(end - self.game.tick_count() - 1);
                if dropped > 0 {
                    warn!("host fell behind, skipping {} tick(s)", dropped);
                    self.game.skip_ticks(dropped);
                }
            }
            self.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_script;
    use rand::rngs::mock::StepRng;
    use tetris_core::{GameConfig, Point2};

    fn driver(script: &str) -> Driver<StepRng, Vec<u8>> {
        let game = Game::new(GameConfig::default(), StepRng::new(0, 0));
        Driver::new(game, parse_script(script).unwrap(), Some(Vec::new()))
    }

    #[test]
    fn scripted_moves_reach_the_game() {
        let mut driver = driver(
            r#"[
                { "tick": 61, "input": { "horizontal": -1 } },
                { "tick": 66, "input": { "horizontal": -1 } },
                { "tick": 70, "input": { "rotate": true } }
            ]"#,
        );
        driver.run(71, None);

        let piece = driver.game().current_piece().unwrap();
        assert_eq!(piece.pos(), Point2::new(2, 19));
        assert_ne!(piece.shape(), tetris_core::ShapeKind::I.shape());
    }

    #[test]
    fn inputs_on_the_same_tick_are_merged() {
        let mut driver = driver(
            r#"[
                { "tick": 3, "input": { "horizontal": 1 } },
                { "tick": 3, "input": { "rotate": true } },
                { "tick": 3, "input": { "soft_drop": true } }
            ]"#,
        );
        driver.game.skip_ticks(3);
        assert_eq!(
            driver.input_for_tick(),
            Input::new(Horizontal::Right, true, true)
        );
        assert_eq!(driver.cursor, 3);
    }

    #[test]
    fn skipped_entries_are_dropped() {
        let mut driver = driver(r#"[{ "tick": 1, "input": { "rotate": true } }, { "tick": 9 }]"#);
        driver.game.skip_ticks(5);
        assert_eq!(driver.input_for_tick(), Input::default());
        assert_eq!(driver.cursor, 1);
    }

    #[test]
    fn snapshots_are_written_on_change_only() {
        let mut driver = driver("[]");
        driver.run(62, None);
        let out = String::from_utf8(driver.into_snapshots().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        // the first tick, then the spawn on tick 60
        assert_eq!(lines.len(), 2);
        let spawned: FieldState = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(spawned.tick, 61);
        assert!(spawned.current.is_some());
    }

    #[test]
    fn run_stops_when_topped_out() {
        let config = GameConfig {
            height: 1,
            spawn_anchor: (4, 0).into(),
            ticks_per_second: 1,
            ..GameConfig::default()
        };
        let game = Game::new(config, StepRng::new(0, 0));
        let mut driver: Driver<_, Vec<u8>> = Driver::new(game, Vec::new(), None);
        driver.run(10_000, None);
        assert!(driver.game().is_topped_out());
        assert!(driver.game().tick_count() < 10_000);
    }
}
