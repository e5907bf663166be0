use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::engine::{GameOverReason, HudSnapshot};
use crate::ui::hud::score_text;

const GAME_OVER_TITLE: Color = Color::Rgb(255, 0, 0);
const POPUP_PADDING_X: u16 = 2;

/// Message shown for each way a session can end.
#[must_use]
pub fn game_over_message(reason: GameOverReason) -> &'static str {
    match reason {
        GameOverReason::SelfCollision => "You have touched the tail.",
        GameOverReason::OutOfBounds => "You have gone beyond the limits of the playing field.",
    }
}

/// Draws the pause notice centered over the field.
pub fn render_pause_menu(frame: &mut Frame<'_>, area: Rect) {
    let lines = [
        "PAUSE",
        "",
        "[Space]/[P]/[Enter] Resume",
        "[Esc]/[Q] Quit",
    ];
    let popup = centered_popup(area, &lines);
    frame.render_widget(Clear, popup);

    let text: Vec<Line<'_>> = lines.iter().map(|line| Line::from(*line)).collect();
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::bordered()),
        popup,
    );
}

/// Draws the game-over popup with cause, score and time.
pub fn render_game_over_menu(frame: &mut Frame<'_>, area: Rect, hud: &HudSnapshot) {
    let message = hud.game_over.map(game_over_message).unwrap_or_default();
    let score = score_text(hud);
    let time = format!("Time: {}", hud.clock_text());
    let lines = [
        "GAME OVER",
        message,
        "",
        score.as_str(),
        time.as_str(),
        "",
        "Press [Enter] to start a new game.",
        "[Esc]/[Q] Quit",
    ];

    let popup = centered_popup(area, &lines);
    frame.render_widget(Clear, popup);

    let mut text: Vec<Line<'_>> = lines.iter().map(|line| Line::from(*line)).collect();
    text[0] = Line::styled(
        lines[0],
        Style::default()
            .fg(GAME_OVER_TITLE)
            .add_modifier(Modifier::BOLD),
    );

    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::bordered()),
        popup,
    );
}

/// Returns a bordered popup rect fitted to `lines`, centered in `area`.
fn centered_popup(area: Rect, lines: &[&str]) -> Rect {
    let text_width = lines.iter().map(|line| line.width()).max().unwrap_or(0);
    let width = u16::try_from(text_width)
        .unwrap_or(u16::MAX)
        .saturating_add(2 * POPUP_PADDING_X + 2)
        .min(area.width);
    let height = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
