use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::export::export_json_file;
use crate::state::Snapshot;
use crate::tui::history::LatencyHistory;
use crate::tui::views::{HelpView, MainView, PortDetailView};

/// UI state
#[derive(Default)]
pub struct UiState {
    /// Currently selected row (0-indexed into the reachable list)
    pub selected: Option<usize>,
    /// Snapshot held on screen while the display is frozen
    pub frozen: Option<Snapshot>,
    /// Show help overlay
    pub show_help: bool,
    /// Show expanded port view
    pub show_port_detail: bool,
    /// Status message to display
    pub status_message: Option<(String, Instant)>,
    pub history: LatencyHistory,
}

impl UiState {
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    pub fn clear_old_status(&mut self) {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
            }
        }
    }

    pub fn is_paused(&self) -> bool {
        self.frozen.is_some()
    }

    pub fn toggle_pause(&mut self, current: &Snapshot) {
        if self.frozen.take().is_none() {
            self.frozen = Some(current.clone());
        }
    }

    pub fn select_prev(&mut self, rows: usize) {
        if rows > 0 {
            self.selected = Some(match self.selected {
                Some(i) if i > 0 => (i - 1).min(rows - 1),
                _ => rows - 1,
            });
        }
    }

    pub fn select_next(&mut self, rows: usize) {
        if rows > 0 {
            self.selected = Some(match self.selected {
                Some(i) if i + 1 < rows => i + 1,
                _ => 0,
            });
        }
    }
}

/// Run the TUI application
pub async fn run_tui(snapshots: watch::Receiver<Snapshot>, cancel: CancellationToken) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    // Restore the terminal however we leave
    scopeguard::defer! {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut ui_state = UiState::default();
    let tick_rate = Duration::from_millis(100);

    run_app(&mut terminal, snapshots, &mut ui_state, cancel, tick_rate).await
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut snapshots: watch::Receiver<Snapshot>,
    ui_state: &mut UiState,
    cancel: CancellationToken,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        // Check cancellation
        if cancel.is_cancelled() {
            break;
        }

        // Clear old status messages
        ui_state.clear_old_status();

        let current = snapshots.borrow_and_update().clone();
        ui_state.history.observe(&current);

        // Draw
        terminal.draw(|f| {
            let shown = ui_state.frozen.as_ref().unwrap_or(&current);
            draw_ui(f, shown, ui_state);
        })?;

        // Handle input with timeout
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Handle overlays first
                if ui_state.show_help {
                    ui_state.show_help = false;
                    continue;
                }

                if ui_state.show_port_detail {
                    if key.code == KeyCode::Esc {
                        ui_state.show_port_detail = false;
                    }
                    continue;
                }

                let rows = ui_state
                    .frozen
                    .as_ref()
                    .unwrap_or(&current)
                    .reachable
                    .len();

                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        cancel.cancel();
                        break;
                    }
                    KeyCode::Char('q') => {
                        cancel.cancel();
                        break;
                    }
                    KeyCode::Char('?') | KeyCode::Char('h') => {
                        ui_state.show_help = true;
                    }
                    KeyCode::Char('p') => {
                        ui_state.toggle_pause(&current);
                        ui_state.set_status(if ui_state.is_paused() {
                            "Display frozen (scan continues)"
                        } else {
                            "Resumed"
                        });
                    }
                    KeyCode::Char('e') => {
                        let shown = ui_state.frozen.as_ref().unwrap_or(&current);
                        match export_json_file(shown) {
                            Ok(filename) => {
                                ui_state.set_status(format!("Exported to {}", filename));
                            }
                            Err(e) => {
                                ui_state.set_status(format!("Export failed: {}", e));
                            }
                        }
                    }
                    KeyCode::Up | KeyCode::Char('k') => ui_state.select_prev(rows),
                    KeyCode::Down | KeyCode::Char('j') => ui_state.select_next(rows),
                    KeyCode::Enter => {
                        if ui_state.selected.is_some() {
                            ui_state.show_port_detail = true;
                        }
                    }
                    KeyCode::Esc => {
                        ui_state.selected = None;
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

fn draw_ui(f: &mut ratatui::Frame, snapshot: &Snapshot, ui_state: &UiState) {
    let area = f.area();

    // Layout: main view + status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    // Main view
    let main_view = MainView::new(
        snapshot,
        &ui_state.history,
        ui_state.selected,
        ui_state.is_paused(),
    );
    f.render_widget(main_view, chunks[0]);

    // Status bar
    let status_text = if let Some((ref msg, _)) = ui_state.status_message {
        msg.clone()
    } else {
        "q quit | p freeze | e export | ? help | \u{2191}\u{2193} select | \u{23ce} expand".to_string()
    };

    let status_bar = Paragraph::new(status_text).style(Style::default().fg(Color::DarkGray));
    f.render_widget(status_bar, chunks[1]);

    // Overlays
    if ui_state.show_help {
        f.render_widget(HelpView, area);
    }

    if ui_state.show_port_detail {
        if let Some(entry) = ui_state
            .selected
            .and_then(|i| snapshot.reachable.get(i).copied())
        {
            f.render_widget(PortDetailView::new(snapshot, entry, &ui_state.history), area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::{PortRange, Sample, ScanSession, Target};
    use ratatui::backend::TestBackend;
    use std::net::{IpAddr, Ipv4Addr};

    fn snapshot() -> Snapshot {
        let target = Target::new("example".into(), IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)));
        let mut session = ScanSession::new(target, PortRange::new(1, 1000), Config::default());
        session.counters.record_spawned();
        session.counters.record_spawned();
        session.record(80, Sample::Reachable(5));
        session.record(443, Sample::Reachable(2));
        session.snapshot()
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_selection_wraps() {
        let mut ui = UiState::default();
        ui.select_next(3);
        assert_eq!(ui.selected, Some(0));
        ui.select_prev(3);
        assert_eq!(ui.selected, Some(2));
        ui.select_next(3);
        assert_eq!(ui.selected, Some(0));

        // Selection past a shrunken list is pulled back in
        ui.selected = Some(5);
        ui.select_prev(2);
        assert_eq!(ui.selected, Some(1));

        let mut empty = UiState::default();
        empty.select_next(0);
        assert_eq!(empty.selected, None);
    }

    #[test]
    fn test_toggle_pause_freezes_snapshot() {
        let mut ui = UiState::default();
        let snap = snapshot();
        ui.toggle_pause(&snap);
        assert!(ui.is_paused());
        assert_eq!(ui.frozen.as_ref(), Some(&snap));
        ui.toggle_pause(&snap);
        assert!(!ui.is_paused());
    }

    #[test]
    fn test_draw_ui_lists_ports_by_latency() {
        let snap = snapshot();
        let mut ui = UiState::default();
        ui.history.observe(&snap);

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw_ui(f, &snap, &ui)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("192.0.2.1 (example)"));
        assert!(text.contains("1-1000 (1000 ports)"));

        let pos_443 = text.find("  443").unwrap();
        let pos_80 = text.find("   80").unwrap();
        assert!(pos_443 < pos_80);
    }

    #[test]
    fn test_draw_ui_detail_overlay() {
        let snap = snapshot();
        let mut ui = UiState::default();
        ui.history.observe(&snap);
        ui.selected = Some(1);
        ui.show_port_detail = true;

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw_ui(f, &snap, &ui)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Port 80 on 192.0.2.1"));
        assert!(text.contains("2 of 2"));
    }
}
