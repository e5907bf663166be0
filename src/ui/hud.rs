use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::engine::HudSnapshot;

const HUD_TEXT: Color = Color::Rgb(255, 255, 255);
const HUD_TEXT_DIMMED: Color = Color::Rgb(150, 150, 150);
const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Supplemental values displayed by the HUD row.
#[derive(Debug, Clone, Copy, Default)]
pub struct HudInfo {
    /// Frames per second, shown only when `--fps` is set.
    pub fps: Option<u32>,
}

/// Renders the one-line HUD and returns the remaining play area below it.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, hud: &HudSnapshot, info: &HudInfo) -> Rect {
    let [hud_area, play_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    let text_style = Style::default()
        .fg(hud_color(hud))
        .add_modifier(Modifier::BOLD);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(score_text(hud), text_style),
            Span::raw("   "),
            Span::styled(hud.clock_text(), text_style),
        ])),
        hud_area,
    );

    if let Some(fps) = info.fps {
        frame.render_widget(
            Paragraph::new(fps.to_string())
                .alignment(Alignment::Right)
                .style(Style::default().fg(HUD_TEXT_DIMMED)),
            hud_area,
        );
    }

    play_area
}

/// Score label as shown in the HUD and the game-over popup.
#[must_use]
pub fn score_text(hud: &HudSnapshot) -> String {
    format!("Point: {}", hud.score)
}

fn hud_color(hud: &HudSnapshot) -> Color {
    if hud.paused { HUD_TEXT_DIMMED } else { HUD_TEXT }
}

/// Counts rendered frames over one-second windows.
#[derive(Debug, Clone, Copy)]
pub struct FrameRate {
    window_start: Instant,
    frames: u32,
    last_rate: u32,
}

impl FrameRate {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            last_rate: 0,
        }
    }

    /// Records one frame and returns the rate of the last full window.
    pub fn tick(&mut self, now: Instant) -> u32 {
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= FPS_WINDOW {
            let rate = f64::from(self.frames) / elapsed.as_secs_f64();
            self.last_rate = rate.round() as u32;
            self.frames = 0;
            self.window_start = now;
        }

        self.last_rate
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{FrameRate, HUD_TEXT, HUD_TEXT_DIMMED, hud_color, score_text};
    use crate::engine::HudSnapshot;

    fn snapshot(paused: bool) -> HudSnapshot {
        HudSnapshot {
            score: 7,
            elapsed: Duration::from_secs(61),
            paused,
            game_over: None,
        }
    }

    #[test]
    fn score_text_shows_points() {
        assert_eq!(score_text(&snapshot(false)), "Point: 7");
    }

    #[test]
    fn hud_dims_while_paused() {
        assert_eq!(hud_color(&snapshot(false)), HUD_TEXT);
        assert_eq!(hud_color(&snapshot(true)), HUD_TEXT_DIMMED);
    }

    #[test]
    fn frame_rate_reports_previous_window() {
        let start = Instant::now();
        let mut rate = FrameRate::new(start);

        for frame in 1..120 {
            let now = start + Duration::from_millis(frame * 8);
            assert_eq!(rate.tick(now), 0);
        }

        assert_eq!(rate.tick(start + Duration::from_secs(1)), 120);
        assert_eq!(rate.tick(start + Duration::from_millis(1008)), 120);
    }
}
