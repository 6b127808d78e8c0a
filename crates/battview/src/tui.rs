//! Terminal frontend
//!
//! Draws a [`Surface`] with ratatui and maps key presses to controller
//! messages. Nothing here mutates state.

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::controller::Message;
use crate::state::DevicePreset;
use crate::surface::Surface;

const HELP_TEXT: &str =
    "[D] Demo  [←→] Level  [1-3] Preset  [R] Refresh  [X] Reset  [C] Controls  [Q] Quit";

/// Map a key press to a controller message
pub fn key_to_message(code: KeyCode) -> Option<Message> {
    let message = match code {
        KeyCode::Char('d') | KeyCode::Char('D') => Message::ToggleDemo,
        KeyCode::Left => Message::NudgeLevel(-1),
        KeyCode::Right => Message::NudgeLevel(1),
        KeyCode::PageDown => Message::NudgeLevel(-10),
        KeyCode::PageUp => Message::NudgeLevel(10),
        KeyCode::Home => Message::SetLevel(0),
        KeyCode::End => Message::SetLevel(100),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            Message::SelectPreset(*DevicePreset::all().get(index)?)
        }
        KeyCode::Char('l') => Message::SelectPreset(DevicePreset::Laptop),
        KeyCode::Char('t') => Message::SelectPreset(DevicePreset::Tablet),
        KeyCode::Char('p') => Message::SelectPreset(DevicePreset::Phone),
        KeyCode::Char('r') | KeyCode::Char('R') => Message::Refresh,
        KeyCode::Char('x') | KeyCode::Char('X') => Message::ResetDemo,
        KeyCode::Char('c') | KeyCode::Char('C') => Message::ToggleControls,
        KeyCode::Esc => Message::DismissNotice,
        KeyCode::Char('q') | KeyCode::Char('Q') => Message::Quit,
        _ => return None,
    };
    Some(message)
}

/// Draw the whole widget
pub fn draw(frame: &mut Frame, surface: &Surface, liquid_height: f64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Battery
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], surface);
    draw_body(frame, chunks[1], surface, liquid_height);
    draw_footer(frame, chunks[2], surface);
}

fn draw_header(frame: &mut Frame, area: Rect, surface: &Surface) {
    let bolt = &surface.battery.bolt;
    let bolt_style = if bolt.charging {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    };

    let title = Line::from(vec![
        Span::styled(
            "battview - Battery Status ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("⚡", bolt_style),
    ]);

    let header = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_body(frame: &mut Frame, area: Rect, surface: &Surface, liquid_height: f64) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(16), Constraint::Min(0)])
        .split(area);

    draw_graphic(frame, columns[0], surface, liquid_height);

    let demo_height = if surface.demo.visible { 6 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(demo_height),
        ])
        .split(columns[1]);

    let battery = &surface.battery;
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Level"))
        .gauge_style(Style::default().fg(level_color(surface)))
        .percent(u16::from(battery.fill_percent.min(100)))
        .label(battery.level_text.clone());
    frame.render_widget(gauge, rows[0]);

    draw_details(frame, rows[1], surface);

    if surface.demo.visible {
        draw_demo_panel(frame, rows[2], surface);
    }
}

/// Battery outline with the liquid filled from the bottom
fn draw_graphic(frame: &mut Frame, area: Rect, surface: &Surface, liquid_height: f64) {
    let battery = &surface.battery;
    let mut outline = Style::default().fg(Color::White);
    if battery.low_pulse {
        outline = outline.fg(Color::Red).add_modifier(Modifier::SLOW_BLINK);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(outline)
        .title("▬▬");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = usize::from(inner.height);
    let filled = filled_rows(battery.liquid_offset, liquid_height, rows);
    let width = usize::from(inner.width);
    let label_row = rows / 2;

    let lines: Vec<Line> = (0..rows)
        .map(|row| {
            let wet = row >= rows - filled;
            if row == label_row {
                let label = format!("{:^width$}", battery.svg_percent, width = width);
                Line::from(Span::styled(
                    label,
                    Style::default().add_modifier(Modifier::BOLD),
                ))
            } else if wet {
                Line::from(Span::styled(
                    "█".repeat(width),
                    Style::default().fg(level_color(surface)),
                ))
            } else {
                Line::from("")
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Rows of liquid for a graphic `rows` tall
fn filled_rows(offset: f64, height: f64, rows: usize) -> usize {
    if height <= 0.0 || rows == 0 {
        return 0;
    }
    let fraction = (1.0 - offset / height).clamp(0.0, 1.0);
    ((rows as f64) * fraction).round() as usize
}

fn draw_details(frame: &mut Frame, area: Rect, surface: &Surface) {
    let battery = &surface.battery;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let content = vec![
        Line::from(vec![
            Span::styled("Charging: ", bold),
            Span::raw(battery.charging_text.clone()),
        ]),
        Line::from(vec![
            Span::styled("Status:   ", bold),
            Span::raw(battery.status_text.clone()),
        ]),
        Line::from(vec![
            Span::styled("Health:   ", bold),
            Span::raw(battery.health_text.clone()),
        ]),
        Line::from(vec![
            Span::styled("Time:     ", bold),
            Span::raw(battery.time_text.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Battery API: ", bold),
            Span::raw(surface.support_text.clone()),
        ]),
        Line::from(vec![
            Span::styled("Device: ", bold),
            Span::raw(surface.device_text.clone()),
        ]),
    ];

    let paragraph =
        Paragraph::new(content).block(Block::default().borders(Borders::ALL).title("Details"));
    frame.render_widget(paragraph, area);
}

fn draw_demo_panel(frame: &mut Frame, area: Rect, surface: &Surface) {
    let demo = &surface.demo;
    let checkbox = if demo.checked { "[x]" } else { "[ ]" };

    let content = vec![
        Line::from(format!("{} Demo mode", checkbox)),
        Line::from(format!("Level:  {}", demo.range)),
        Line::from(format!("Preset: {}", demo.sim_device)),
    ];

    let paragraph =
        Paragraph::new(content).block(Block::default().borders(Borders::ALL).title("Demo"));
    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, surface: &Surface) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let help = Paragraph::new(HELP_TEXT)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    let (text, color) = match &surface.notice {
        Some(notice) => (notice.clone(), Color::Red),
        None => (surface.live_region.clone(), Color::Yellow),
    };
    let status = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, chunks[0]);
    frame.render_widget(status, chunks[1]);
}

fn level_color(surface: &Surface) -> Color {
    let battery = &surface.battery;
    if battery.bolt.charging {
        Color::Green
    } else if battery.low_pulse {
        Color::Red
    } else if battery.fill_percent <= 20 {
        Color::Yellow
    } else {
        Color::Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn rendered(surface: &Surface) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, surface, 168.0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_key_mapping() {
        assert!(matches!(key_to_message(KeyCode::Char('d')), Some(Message::ToggleDemo)));
        assert!(matches!(key_to_message(KeyCode::PageUp), Some(Message::NudgeLevel(10))));
        assert!(matches!(
            key_to_message(KeyCode::Char('2')),
            Some(Message::SelectPreset(DevicePreset::Tablet))
        ));
        assert!(matches!(
            key_to_message(KeyCode::Char('3')),
            Some(Message::SelectPreset(DevicePreset::Phone))
        ));
        assert!(key_to_message(KeyCode::Char('4')).is_none());
        assert!(matches!(key_to_message(KeyCode::Char('q')), Some(Message::Quit)));
        assert!(key_to_message(KeyCode::Char('z')).is_none());
    }

    #[test]
    fn test_filled_rows() {
        assert_eq!(filled_rows(0.0, 168.0, 10), 10);
        assert_eq!(filled_rows(168.0, 168.0, 10), 0);
        assert_eq!(filled_rows(84.0, 168.0, 10), 5);
        assert_eq!(filled_rows(10.0, 0.0, 10), 0);
    }

    #[test]
    fn test_draw_shows_readings() {
        let mut surface = Surface::default();
        surface.battery.level_text = "72%".into();
        surface.battery.svg_percent = "72%".into();
        surface.battery.status_text = "Charging".into();
        surface.support_text = "Supported".into();
        surface.live_region = "72% - Charging - 30m".into();

        let screen = rendered(&surface);
        assert!(screen.contains("72%"));
        assert!(screen.contains("Charging"));
        assert!(screen.contains("Supported"));
        assert!(!screen.contains("Demo mode"));
    }

    #[test]
    fn test_draw_notice_and_demo_panel() {
        let mut surface = Surface::default();
        surface.demo.visible = true;
        surface.demo.checked = true;
        surface.demo.sim_device = "phone".into();
        surface.notice = Some("Use demo".into());

        let screen = rendered(&surface);
        assert!(screen.contains("[x] Demo mode"));
        assert!(screen.contains("Preset: phone"));
        assert!(screen.contains("Use demo"));
    }
}
