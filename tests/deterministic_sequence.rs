use std::collections::HashSet;
use std::time::Duration;

use psnake::clock::ManualClock;
use psnake::config::{ConfigError, Difficulty, GameConfig};
use psnake::engine::{EngineStatus, GameOverReason, SimulationEngine, TickOutcome};
use psnake::grid::{Cell, Position};
use psnake::input::{Direction, GameInput};

fn scenario_config() -> GameConfig {
    GameConfig {
        width: 800,
        height: 600,
        wall_mode: true,
        max_apples: 1,
        difficulty: Difficulty::Easy,
    }
}

/// Body length matches the painted snake cells and no coordinate repeats.
fn assert_body_matches_cells(engine: &SimulationEngine<ManualClock>) {
    let grid = engine.grid();
    let snake_cells = grid
        .rows()
        .flatten()
        .filter(|cell| **cell == Cell::SnakeBody)
        .count();
    assert_eq!(snake_cells, grid.body_len());

    let distinct: HashSet<Position> = grid.body().copied().collect();
    assert_eq!(distinct.len(), grid.body_len());
    for position in grid.body() {
        assert_eq!(
            grid.cell_at(position.row, position.col),
            Ok(Cell::SnakeBody)
        );
    }
}

#[test]
fn first_tick_moves_head_one_cell_right() {
    let mut engine = SimulationEngine::new_with_seed(scenario_config(), ManualClock::new(), 42)
        .expect("scenario config should be valid");
    engine
        .place_apple(Position::new(0, 0))
        .expect("corner is empty");
    assert_eq!(engine.grid().head(), Position::new(18, 9));

    engine.clock().advance(Duration::from_millis(80));
    assert_eq!(engine.update(), TickOutcome::Moved);

    assert_eq!(engine.grid().head(), Position::new(18, 10));
    assert_eq!(engine.grid().body_len(), 10);
}

#[test]
fn eating_apple_ahead_grows_and_replaces_it_in_the_same_tick() {
    let mut engine = SimulationEngine::new_with_seed(scenario_config(), ManualClock::new(), 42)
        .expect("scenario config should be valid");
    engine
        .place_apple(Position::new(18, 10))
        .expect("cell ahead is empty");

    assert_eq!(engine.step(), TickOutcome::AteApple);

    assert_eq!(engine.snake().len(), 11);
    assert_eq!(engine.grid().body_len(), 11);
    assert_body_matches_cells(&engine);
    assert_eq!(engine.apple_count(), 1);

    let apples: Vec<Position> = engine.grid().apples().iter().copied().collect();
    assert_eq!(apples.len(), 1);
    assert_ne!(apples[0], Position::new(18, 10));
    assert_eq!(
        engine.grid().cell_at(apples[0].row, apples[0].col),
        Ok(Cell::Apple)
    );
}

#[test]
fn stepwise_turns_and_wall_collision_on_bounded_field() {
    let config = GameConfig {
        wall_mode: false,
        ..scenario_config()
    };
    let mut engine = SimulationEngine::new_with_seed(config, ManualClock::new(), 7)
        .expect("config should be valid");
    engine
        .place_apple(Position::new(36, 49))
        .expect("corner is empty");

    engine.handle_input(GameInput::Direction(Direction::Up));
    engine.handle_input(GameInput::Direction(Direction::Down));
    engine.step();
    assert_eq!(engine.grid().head(), Position::new(19, 9));

    engine.handle_input(GameInput::Direction(Direction::Left));
    for _ in 0..9 {
        assert_eq!(engine.step(), TickOutcome::Moved);
    }
    assert_eq!(engine.grid().head(), Position::new(19, 0));

    assert_eq!(
        engine.step(),
        TickOutcome::GameOver(GameOverReason::OutOfBounds)
    );
    assert_eq!(engine.hud().game_over, Some(GameOverReason::OutOfBounds));

    engine.clock().advance(Duration::from_secs(1));
    assert_eq!(engine.update(), TickOutcome::Idle);

    engine.handle_input(GameInput::Confirm);
    assert_eq!(engine.status(), EngineStatus::Running);
    assert_eq!(engine.grid().head(), Position::new(18, 9));
}

#[test]
fn snake_never_leaves_the_grid_in_wall_mode() {
    let mut engine = SimulationEngine::new_with_seed(scenario_config(), ManualClock::new(), 3)
        .expect("scenario config should be valid");
    let turns = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    for tick in 0..400 {
        if tick % 60 == 0 {
            engine.request_direction(turns[(tick / 60) % turns.len()]);
        }
        engine.step();
        assert_body_matches_cells(&engine);
        if engine.status() != EngineStatus::Running {
            break;
        }

        let head = engine.grid().head();
        assert!(head.is_within_bounds(engine.grid().size()));
        assert_eq!(engine.grid().body_len(), engine.snake().len());
        assert_eq!(engine.grid().apples().len(), engine.apple_count());
    }
}

#[test]
fn huge_window_is_refused_instead_of_allocated() {
    let config = GameConfig {
        width: 2_000_000,
        height: 2_000_000,
        ..scenario_config()
    };

    let result = SimulationEngine::new_with_seed(config, ManualClock::new(), 1);

    assert!(matches!(result, Err(ConfigError::GridTooLarge { .. })));
}
