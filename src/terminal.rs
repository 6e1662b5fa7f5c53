// SPDX-License-Identifier: GPL-3.0-only

//! Terminal-based overlay demo
//!
//! Draws the indicator bar and popup window with ratatui and feeds mouse
//! input to the overlay as touch events. Each terminal cell stands for a
//! block of `CELL_WIDTH` x `CELL_HEIGHT` overlay pixels.

use crate::config::HudConfig;
use crate::constants::keys;
use crate::hud::popup::ContentRow;
use crate::hud::{HeadUpDisplay, HudHandle, HudListener, PopupWindow};
use crate::preferences::PreferenceGroup;
use crate::scene::{Node, Orientation, Rect, TouchAction, TouchEvent, Visibility};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::channel::mpsc;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect as Area,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Overlay pixels per terminal column
const CELL_WIDTH: i32 = 8;
/// Overlay pixels per terminal row
const CELL_HEIGHT: i32 = 16;

/// Metrics that fit the overlay to a character grid
pub fn terminal_config() -> HudConfig {
    HudConfig {
        indicator_bar_right_margin: CELL_WIDTH as u32,
        indicator_icon_size: 6 * CELL_WIDTH as u32,
        popup_window_overlap: 2 * CELL_WIDTH,
        popup_row_height: CELL_HEIGHT as u32,
        popup_char_width: CELL_WIDTH as u32,
        popup_padding: CELL_HEIGHT as u32 / 2,
        ..HudConfig::default()
    }
}

/// Run the interactive overlay demo
pub fn run(
    config: HudConfig,
    preferences: PreferenceGroup,
) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, config, &preferences);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Listener events forwarded to the status bar
enum Notice {
    Visibility(Visibility),
    Setting(String, String),
}

struct ChannelListener {
    sender: mpsc::UnboundedSender<Notice>,
}

impl HudListener for ChannelListener {
    fn on_popup_window_visibility_changed(&mut self, visibility: Visibility) {
        let _ = self.sender.unbounded_send(Notice::Visibility(visibility));
    }

    fn on_setting_changed(&mut self, key: &str, value: &str) {
        let _ = self
            .sender
            .unbounded_send(Notice::Setting(key.to_string(), value.to_string()));
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: HudConfig,
    preferences: &PreferenceGroup,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut hud = HeadUpDisplay::new(config)?;
    hud.initialize(preferences);

    let (sender, mut notices) = mpsc::unbounded();
    hud.set_listener(ChannelListener { sender });
    let handle = hud.handle();

    let mut overlay_size = Area::default();
    let mut gps_signal = false;
    let mut flash_overridden = false;
    let mut status_message = build_status_message();

    loop {
        // Marshalled work from the timer thread and the GPS thread
        hud.process_pending();

        while let Ok(notice) = notices.try_recv() {
            status_message = match notice {
                Notice::Visibility(v) => format!("Popup {:?} | {}", v, build_status_message()),
                Notice::Setting(key, value) => format!("{} = {}", short_key(&key), value),
            };
        }

        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let hud_area = Area {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };
            if hud_area != overlay_size {
                overlay_size = hud_area;
                hud.on_layout(Rect::new(
                    0,
                    0,
                    hud_area.width as i32 * CELL_WIDTH,
                    hud_area.height as i32 * CELL_HEIGHT,
                ));
            }

            f.render_widget(HudWidget { hud: &hud }, hud_area);

            let status_area = Area {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            f.render_widget(
                StatusBar {
                    message: &status_message,
                },
                status_area,
            );
        })?;

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('r') => {
                        let orientation = hud.orientation().rotated();
                        hud.set_orientation(orientation);
                        status_message = format!("Orientation {}°", orientation.degrees());
                    }
                    KeyCode::Char('g') => {
                        gps_signal = !gps_signal;
                        toggle_gps_from_thread(handle.clone(), gps_signal);
                        status_message = format!("GPS signal: {}", gps_signal);
                    }
                    KeyCode::Char('o') => {
                        flash_overridden = !flash_overridden;
                        let result = if flash_overridden {
                            handle.override_settings(&[keys::KEY_FLASH_MODE, "off"])
                        } else {
                            handle.restore_settings(&[keys::KEY_FLASH_MODE])
                        };
                        status_message = match result {
                            Ok(()) => format!("Flash override: {}", flash_overridden),
                            Err(e) => format!("Error: {}", e),
                        };
                    }
                    _ => {}
                }
            }
            Event::Mouse(mouse) => {
                let action = match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => TouchAction::Down,
                    MouseEventKind::Drag(MouseButton::Left) => TouchAction::Move,
                    MouseEventKind::Up(MouseButton::Left) => TouchAction::Up,
                    _ => continue,
                };
                // Touch at the centre of the cell
                let x = (mouse.column as i32 * CELL_WIDTH + CELL_WIDTH / 2) as f32;
                let y = (mouse.row as i32 * CELL_HEIGHT + CELL_HEIGHT / 2) as f32;
                hud.dispatch_touch(&TouchEvent::new(action, x, y));
            }
            _ => {}
        }
    }

    Ok(())
}

/// Flip the GPS signal from a worker thread, as a location provider would
fn toggle_gps_from_thread(handle: HudHandle, has_signal: bool) {
    let spawned = thread::Builder::new()
        .name("gps-signal".to_string())
        .spawn(move || {
            if let Err(e) = handle.set_gps_has_signal(has_signal) {
                error!(error = %e, "Failed to queue GPS update");
            }
        });
    if let Err(e) = spawned {
        error!(error = %e, "Failed to spawn GPS thread");
    } else {
        info!(has_signal, "GPS signal toggled");
    }
}

fn build_status_message() -> String {
    "click: select | r: rotate | g: GPS | o: override flash | q: quit".to_string()
}

/// Preference key without the `pref_camera_` / `_key` decoration
fn short_key(key: &str) -> &str {
    let key = key.strip_prefix("pref_camera_").unwrap_or(key);
    key.strip_suffix("_key").unwrap_or(key)
}

/// Texture name as a short cell label
fn short_icon(icon: &str) -> &str {
    icon.strip_prefix("ic_viewfinder_").unwrap_or(icon)
}

/// Convert an overlay rectangle to terminal cells inside `area`
fn to_cells(rect: Rect, area: Area) -> Area {
    let left = (rect.left / CELL_WIDTH).max(0) as u16;
    let top = (rect.top / CELL_HEIGHT).max(0) as u16;
    let right = ((rect.right + CELL_WIDTH - 1) / CELL_WIDTH).max(0) as u16;
    let bottom = ((rect.bottom + CELL_HEIGHT - 1) / CELL_HEIGHT).max(0) as u16;
    Area {
        x: area.x + left,
        y: area.y + top,
        width: right.saturating_sub(left),
        height: bottom.saturating_sub(top),
    }
    .intersection(area)
}

fn fill(buf: &mut Buffer, area: Area, bg: Color) {
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(' ');
                cell.set_bg(bg);
            }
        }
    }
}

/// Widget that renders the overlay
struct HudWidget<'a> {
    hud: &'a HeadUpDisplay,
}

impl Widget for HudWidget<'_> {
    fn render(self, area: Area, buf: &mut Buffer) {
        let msg = "[ viewfinder ]";
        let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
        let y = area.y + area.height / 2;
        if y < area.y + area.height {
            buf.set_string(x, y, msg, Style::default().fg(Color::DarkGray));
        }

        if let Some(bar) = self.hud.indicator_bar() {
            let bar_area = to_cells(bar.bounds(), area);
            let bg = if bar.highlight().is_some() {
                Color::Blue
            } else {
                Color::DarkGray
            };
            fill(buf, bar_area, bg);

            for (i, indicator) in bar.indicators().iter().enumerate() {
                let slot = to_cells(indicator.bounds(), area);
                if slot.width == 0 || slot.height == 0 {
                    continue;
                }
                let mut style = Style::default().fg(Color::White).bg(bg);
                if bar.selected_index() == Some(i) {
                    style = style.add_modifier(Modifier::REVERSED);
                    fill(buf, slot, Color::White);
                }
                let label: String = short_icon(indicator.icon())
                    .chars()
                    .take(slot.width as usize)
                    .collect();
                buf.set_string(slot.x, slot.y + slot.height / 2, label, style);
            }
        }

        if let Some(popup) = self.hud.popup_window()
            && popup.is_visible()
        {
            render_popup(popup, self.hud.config(), area, buf);
        }
    }
}

/// Draw popup rows, rotated to match the popup's orientation
fn render_popup(popup: &PopupWindow, config: &HudConfig, area: Area, buf: &mut Buffer) {
    let bounds = popup.bounds();
    fill(buf, to_cells(bounds, area), Color::Black);

    let Some(content) = popup.content() else {
        return;
    };
    let row_height = config.px(config.popup_row_height);
    let char_width = config.px(config.popup_char_width);
    let padding = config.px(config.popup_padding);
    let (width, height) = (bounds.width(), bounds.height());

    for (index, row) in content.rows().into_iter().enumerate() {
        let (text, style) = match row {
            ContentRow::Title { section } => (
                content.sections[section].title.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            ContentRow::Option { section, option } => {
                let option = &content.sections[section].options[option];
                let marker = if option.selected { '●' } else { '○' };
                let fg = if option.enabled {
                    Color::White
                } else {
                    Color::DarkGray
                };
                (
                    format!("{} {}", marker, option.label),
                    Style::default().fg(fg).bg(Color::Black),
                )
            }
        };

        let content_y = padding + index as i32 * row_height + row_height / 2;
        for (i, ch) in text.chars().enumerate() {
            let content_x = padding + i as i32 * char_width + char_width / 2;
            let (local_x, local_y) = match popup.orientation() {
                Orientation::Deg0 => (content_x, content_y),
                Orientation::Deg90 => (width - content_y, content_x),
                Orientation::Deg180 => (width - content_x, height - content_y),
                Orientation::Deg270 => (content_y, height - content_x),
            };
            if local_x < 0 || local_y < 0 || local_x >= width || local_y >= height {
                continue;
            }
            let x = area.x as i32 + (bounds.left + local_x) / CELL_WIDTH;
            let y = area.y as i32 + (bounds.top + local_y) / CELL_HEIGHT;
            if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
                cell.set_char(ch);
                cell.set_style(style);
            }
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Area, buf: &mut Buffer) {
        // Fill background
        fill(buf, area, Color::DarkGray);

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_cells_rounds_outwards() {
        let area = Area::new(0, 0, 80, 24);
        assert_eq!(
            to_cells(Rect::new(4, 8, 20, 40), area),
            Area::new(0, 0, 3, 3)
        );
        // Clipped to the drawing area
        assert_eq!(
            to_cells(Rect::new(600, 0, 800, 480), area),
            Area::new(75, 0, 5, 24)
        );
    }

    #[test]
    fn test_short_names() {
        assert_eq!(short_key(keys::KEY_FLASH_MODE), "flashmode");
        assert_eq!(short_icon("ic_viewfinder_gps_on"), "gps_on");
        assert_eq!(short_icon("plain"), "plain");
    }

    #[test]
    fn test_terminal_config_is_valid() {
        let config = terminal_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.px(config.popup_row_height), CELL_HEIGHT);
    }

    #[test]
    fn test_render_selected_overlay() {
        let mut hud = HeadUpDisplay::new(terminal_config()).unwrap();
        hud.initialize(&PreferenceGroup::camera_defaults());
        hud.on_layout(Rect::new(0, 0, 80 * CELL_WIDTH, 23 * CELL_HEIGHT));
        let bar = hud.indicator_bar().unwrap().indicator(0).unwrap().bounds();
        let (x, y) = ((bar.left + 4) as f32, bar.center_y() as f32);
        hud.dispatch_touch(&TouchEvent::down(x, y));
        hud.dispatch_touch(&TouchEvent::up(x, y));

        let area = Area::new(0, 0, 80, 23);
        let mut buf = Buffer::empty(area);
        HudWidget { hud: &hud }.render(area, &mut buf);

        // First title sits half a padding plus half a row below the top edge
        let popup = to_cells(hud.popup_window().unwrap().bounds(), area);
        let title_row: String = (popup.x..popup.x + popup.width)
            .filter_map(|x| buf.cell((x, popup.y + 1)).map(|c| c.symbol().to_string()))
            .collect();
        assert!(title_row.contains("Focus mode"));
    }
}
