use std::time::{Duration, Instant};

use log::{debug, error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::apple::sample_empty_cell;
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, GameConfig, GridSize, INITIAL_SNAKE_LENGTH};
use crate::grid::{Cell, GridError, GridModel, Position};
use crate::input::{Direction, GameInput};
use crate::snake::SnakeState;

/// Why a session ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameOverReason {
    /// The head left a bounded field.
    OutOfBounds,
    /// The head ran into the body.
    SelfCollision,
}

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EngineStatus {
    Running,
    Paused,
    GameOver(GameOverReason),
}

/// What a call to [`SimulationEngine::update`] or [`SimulationEngine::step`] did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// No tick was due, or the engine is not running.
    Idle,
    Moved,
    AteApple,
    GameOver(GameOverReason),
}

/// Read-only values shown by the HUD.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct HudSnapshot {
    pub score: usize,
    pub elapsed: Duration,
    pub paused: bool,
    pub game_over: Option<GameOverReason>,
}

impl HudSnapshot {
    /// Session time as `MM:SS`.
    #[must_use]
    pub fn clock_text(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// Fixed-tick snake simulation for one session at a time.
#[derive(Debug)]
pub struct SimulationEngine<C: Clock = SystemClock> {
    config: GameConfig,
    size: GridSize,
    wraps: bool,
    tick_interval: Duration,
    grid: GridModel,
    snake: SnakeState,
    apple_count: usize,
    status: EngineStatus,
    tick_count: u64,
    rng: StdRng,
    clock: C,
    last_tick: Instant,
    session_start: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
    elapsed: Duration,
}

impl<C: Clock> SimulationEngine<C> {
    /// Validates `config` and starts a running session.
    pub fn new(config: GameConfig, clock: C) -> Result<Self, ConfigError> {
        Self::with_rng(config, clock, StdRng::from_entropy())
    }

    /// Creates a deterministic engine for tests and reproducible runs.
    pub fn new_with_seed(config: GameConfig, clock: C, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, clock: C, rng: StdRng) -> Result<Self, ConfigError> {
        let size = config.validate()?;
        let grid = GridModel::new(size.width, size.height, INITIAL_SNAKE_LENGTH)?;
        let now = clock.now();

        info!(
            "new session: {}x{} grid, wall mode {}, {} apple(s), difficulty {}",
            size.width,
            size.height,
            config.wraps(),
            config.max_apples,
            config.difficulty.level(),
        );

        Ok(Self {
            config,
            size,
            wraps: config.wraps(),
            tick_interval: config.difficulty.tick_interval(),
            grid,
            snake: SnakeState::new(Direction::Right, INITIAL_SNAKE_LENGTH),
            apple_count: 0,
            status: EngineStatus::Running,
            tick_count: 0,
            rng,
            clock,
            last_tick: now,
            session_start: now,
            paused_at: None,
            paused_total: Duration::ZERO,
            elapsed: Duration::ZERO,
        })
    }

    /// Per-frame entry point: refreshes the session timer and runs a tick
    /// when the tick interval has elapsed.
    pub fn update(&mut self) -> TickOutcome {
        if self.status != EngineStatus::Running {
            return TickOutcome::Idle;
        }

        let now = self.clock.now();
        self.refresh_elapsed(now);
        if now.saturating_duration_since(self.last_tick) < self.tick_interval {
            return TickOutcome::Idle;
        }

        self.step()
    }

    /// Runs one tick immediately, ignoring the tick interval.
    pub fn step(&mut self) -> TickOutcome {
        if self.status != EngineStatus::Running {
            return TickOutcome::Idle;
        }

        let now = self.clock.now();
        self.last_tick = now;
        self.tick_count += 1;

        self.replenish_apples();
        let outcome = self.advance_snake();
        if outcome == TickOutcome::AteApple {
            self.replenish_apples();
        }

        self.refresh_elapsed(now);
        outcome
    }

    fn advance_snake(&mut self) -> TickOutcome {
        let direction = self.snake.commit_direction();
        let mut next = direction.step(self.grid.head());

        if !next.is_within_bounds(self.size) {
            if !self.wraps {
                return self.end_game(GameOverReason::OutOfBounds);
            }
            next = next.wrapped(self.size);
        }

        // Each arm below either pushes a new head or restores the tail, so
        // the body never drops under its starting length.
        let Some(tail) = self.grid.pop_tail() else {
            return TickOutcome::Idle;
        };

        match self.grid.cell_at(next.row, next.col) {
            Ok(Cell::Apple) => {
                self.grid.push_tail(tail);
                self.grid.push_head(next);
                self.snake.grow();
                self.apple_count -= 1;
                debug!(
                    "apple eaten at ({}, {}), length {}",
                    next.row,
                    next.col,
                    self.snake.len()
                );
                TickOutcome::AteApple
            }
            Ok(Cell::SnakeBody) => {
                self.grid.push_tail(tail);
                self.end_game(GameOverReason::SelfCollision)
            }
            Ok(Cell::Empty) => {
                self.grid.push_head(next);
                TickOutcome::Moved
            }
            Err(err) => {
                error!("head moved to an invalid cell: {err}");
                self.grid.push_tail(tail);
                self.end_game(GameOverReason::OutOfBounds)
            }
        }
    }

    fn end_game(&mut self, reason: GameOverReason) -> TickOutcome {
        info!(
            "game over after {} ticks: {reason:?}, score {}",
            self.tick_count,
            self.snake.score()
        );
        self.status = EngineStatus::GameOver(reason);
        TickOutcome::GameOver(reason)
    }

    /// Tops apples up to the configured count.
    fn replenish_apples(&mut self) {
        while self.apple_count < self.config.max_apples {
            let Some(position) = sample_empty_cell(&mut self.rng, &self.grid) else {
                debug!("no empty cell left for apples");
                break;
            };

            if self.place_apple(position).is_err() {
                break;
            }
            debug!("apple placed at ({}, {})", position.row, position.col);
        }
    }

    /// Places an apple and counts it toward the live apple total.
    pub fn place_apple(&mut self, position: Position) -> Result<(), GridError> {
        self.grid.place_apple(position)?;
        self.apple_count += 1;
        Ok(())
    }

    /// Queues a heading for the next tick. Reversals are dropped.
    ///
    /// Keys pressed while paused are kept and take effect after resuming.
    pub fn request_direction(&mut self, direction: Direction) {
        if matches!(self.status, EngineStatus::Running | EngineStatus::Paused) {
            self.snake.queue_direction(direction);
        }
    }

    /// Switches between running and paused. Has no effect after game over.
    pub fn toggle_pause(&mut self) {
        let now = self.clock.now();
        match self.status {
            EngineStatus::Running => {
                self.refresh_elapsed(now);
                self.paused_at = Some(now);
                self.status = EngineStatus::Paused;
                info!("paused at {}", self.hud().clock_text());
            }
            EngineStatus::Paused => {
                if let Some(paused_at) = self.paused_at.take() {
                    self.paused_total += now.saturating_duration_since(paused_at);
                }
                self.status = EngineStatus::Running;
                info!("resumed");
            }
            EngineStatus::GameOver(_) => {}
        }
    }

    /// Starts a fresh session after game over. Returns whether it restarted.
    pub fn restart(&mut self) -> bool {
        if !matches!(self.status, EngineStatus::GameOver(_)) {
            return false;
        }

        let Ok(grid) = GridModel::new(self.size.width, self.size.height, INITIAL_SNAKE_LENGTH)
        else {
            return false;
        };

        let now = self.clock.now();
        self.grid = grid;
        self.snake = SnakeState::new(Direction::Right, INITIAL_SNAKE_LENGTH);
        self.apple_count = 0;
        self.status = EngineStatus::Running;
        self.tick_count = 0;
        self.last_tick = now;
        self.session_start = now;
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
        self.elapsed = Duration::ZERO;
        info!("restarted");
        true
    }

    /// Applies one external input event. `Quit` is left to the caller.
    pub fn handle_input(&mut self, input: GameInput) {
        match input {
            GameInput::Direction(direction) => self.request_direction(direction),
            GameInput::Pause => self.toggle_pause(),
            GameInput::Confirm => match self.status {
                EngineStatus::GameOver(_) => {
                    self.restart();
                }
                EngineStatus::Paused => self.toggle_pause(),
                EngineStatus::Running => {}
            },
            GameInput::Quit => {}
        }
    }

    fn refresh_elapsed(&mut self, now: Instant) {
        self.elapsed = now
            .saturating_duration_since(self.session_start)
            .saturating_sub(self.paused_total);
    }

    #[must_use]
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.snake.score(),
            elapsed: self.elapsed,
            paused: self.status == EngineStatus::Paused,
            game_over: self.game_over_reason(),
        }
    }

    #[must_use]
    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        match self.status {
            EngineStatus::GameOver(reason) => Some(reason),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    #[must_use]
    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    #[must_use]
    pub fn snake(&self) -> &SnakeState {
        &self.snake
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Live apples on the field.
    #[must_use]
    pub fn apple_count(&self) -> usize {
        self.apple_count
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}
