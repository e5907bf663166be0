use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Block;

use crate::clock::Clock;
use crate::config::{Difficulty, GridSize};
use crate::engine::{EngineStatus, SimulationEngine};
use crate::grid::{Cell, GridModel};
use crate::ui::hud::{HudInfo, render_hud};
use crate::ui::menu::{render_game_over_menu, render_pause_menu};

const RED: Color = Color::Rgb(0xFF, 0x62, 0x62);
const GREEN: Color = Color::Rgb(0x8D, 0xB6, 0x00);
const BORDER: Color = Color::DarkGray;

/// Two terminal columns per cell keep cells roughly square.
const CELL_GLYPH: &str = "██";
const CELL_COLUMNS: u16 = 2;

/// Fill colors for the two visible entities.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Palette {
    pub snake: Color,
    pub apple: Color,
}

impl Palette {
    /// Red snake and green apples, swapped on the hardest level.
    #[must_use]
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        if difficulty == Difficulty::Hard {
            Self {
                snake: GREEN,
                apple: RED,
            }
        } else {
            Self {
                snake: RED,
                apple: GREEN,
            }
        }
    }
}

/// Renders the full game frame from the engine's read-only state.
pub fn render<C: Clock>(frame: &mut Frame<'_>, engine: &SimulationEngine<C>, info: &HudInfo) {
    let area = frame.area();
    let hud = engine.hud();
    let play_area = render_hud(frame, area, &hud, info);

    let field = field_rect(play_area, engine.grid().size());
    let block = Block::bordered().border_style(Style::new().fg(BORDER));
    let inner = block.inner(field);
    frame.render_widget(block, field);

    render_cells(
        frame,
        inner,
        engine.grid(),
        Palette::for_difficulty(engine.config().difficulty),
    );

    match engine.status() {
        EngineStatus::Paused => render_pause_menu(frame, field),
        EngineStatus::GameOver(_) => render_game_over_menu(frame, field, &hud),
        EngineStatus::Running => {}
    }
}

/// Bordered rect sized to the grid, centered horizontally and clipped to `area`.
fn field_rect(area: Rect, size: GridSize) -> Rect {
    let wanted_width = u16::try_from(size.width)
        .unwrap_or(u16::MAX)
        .saturating_mul(CELL_COLUMNS)
        .saturating_add(2);
    let wanted_height = u16::try_from(size.height)
        .unwrap_or(u16::MAX)
        .saturating_add(2);

    let width = wanted_width.min(area.width);
    let height = wanted_height.min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height,
    }
}

fn render_cells(frame: &mut Frame<'_>, inner: Rect, grid: &GridModel, palette: Palette) {
    let buffer = frame.buffer_mut();

    for (row, cells) in grid.rows().enumerate() {
        let Some(y) = cell_offset(inner.y, row, 1).filter(|y| *y < inner.bottom()) else {
            break;
        };

        for (col, cell) in cells.iter().enumerate() {
            let color = match cell {
                Cell::Empty => continue,
                Cell::SnakeBody => palette.snake,
                Cell::Apple => palette.apple,
            };

            let Some(x) = cell_offset(inner.x, col, CELL_COLUMNS)
                .filter(|x| x.saturating_add(CELL_COLUMNS) <= inner.right())
            else {
                break;
            };

            buffer.set_string(x, y, CELL_GLYPH, Style::new().fg(color));
        }
    }
}

fn cell_offset(origin: u16, index: usize, stride: u16) -> Option<u16> {
    let index = u16::try_from(index).ok()?;
    origin.checked_add(index.checked_mul(stride)?)
}
