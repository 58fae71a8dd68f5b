use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::state::Snapshot;
use crate::tui::history::LatencyHistory;
use crate::tui::widgets::sparkline_string;

/// Width of the sparkline column
const SPARK_WIDTH: usize = 30;

/// Header with target and counters, then the ranked port list
pub struct MainView<'a> {
    snapshot: &'a Snapshot,
    history: &'a LatencyHistory,
    selected: Option<usize>,
    paused: bool,
}

impl<'a> MainView<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        history: &'a LatencyHistory,
        selected: Option<usize>,
        paused: bool,
    ) -> Self {
        Self {
            snapshot,
            history,
            selected,
            paused,
        }
    }

    fn header_lines(&self) -> Vec<Line<'static>> {
        let snapshot = self.snapshot;
        let target = &snapshot.target;
        let range = snapshot.range;
        let counters = snapshot.counters;
        let label = Style::default().fg(Color::Gray);

        let mut host = target.resolved.to_string();
        if let Some(ref hostname) = target.hostname {
            host = format!("{} ({})", host, hostname);
        } else if target.original != host {
            host = format!("{} ({})", host, target.original);
        }

        let elapsed = snapshot.elapsed().num_seconds().max(0);

        vec![
            Line::from(vec![
                Span::styled("  Target:  ", label),
                Span::raw(host),
            ]),
            Line::from(vec![
                Span::styled("  Range:   ", label),
                Span::raw(format!("{} ({} ports)", range, range.len())),
                Span::styled("    Elapsed: ", label),
                Span::raw(format!("{}s", elapsed)),
            ]),
            Line::from(vec![
                Span::styled("  Total: ", label),
                Span::raw(format!("{:<8}", counters.total)),
                Span::styled("Dead: ", label),
                Span::styled(format!("{:<8}", counters.dead), Style::default().fg(Color::Red)),
                Span::styled("Live: ", label),
                Span::styled(format!("{:<8}", counters.active), Style::default().fg(Color::Green)),
                Span::styled("Open: ", label),
                Span::styled(
                    snapshot.reachable.len().to_string(),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
        ]
    }
}

impl Widget for MainView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        let title = if self.paused {
            " portlive [paused] "
        } else {
            " portlive "
        };
        let header = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let header_inner = header.inner(chunks[0]);
        header.render(chunks[0], buf);
        Paragraph::new(self.header_lines()).render(header_inner, buf);

        let list = Block::default()
            .title(" Reachable ports ")
            .borders(Borders::ALL);
        let inner = list.inner(chunks[1]);
        list.render(chunks[1], buf);

        if inner.height < 2 {
            return;
        }

        let mut lines = vec![Line::from(Span::styled(
            format!("  {:>5}  {:>6}  {:>4}  {}", "Port", "Ms", "Rank", "History"),
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        ))];

        if self.snapshot.reachable.is_empty() {
            lines.push(Line::from(Span::styled(
                "  No reachable ports yet",
                Style::default().fg(Color::DarkGray),
            )));
            Paragraph::new(lines).render(inner, buf);
            return;
        }

        // Scroll so the selected row stays visible
        let rows = (inner.height - 1) as usize;
        let offset = match self.selected {
            Some(selected) if selected >= rows => selected + 1 - rows,
            _ => 0,
        };

        for (i, entry) in self
            .snapshot
            .reachable
            .iter()
            .enumerate()
            .skip(offset)
            .take(rows)
        {
            let spark = sparkline_string(&self.history.samples(entry.port), SPARK_WIDTH);
            let style = if self.selected == Some(i) {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };

            lines.push(Line::from(vec![
                Span::styled(format!("  {:>5}  ", entry.port), style.fg(Color::White)),
                Span::styled(format!("{:>6}  ", entry.latency_ms), style),
                Span::styled(format!("{:>4}  ", i + 1), style.fg(Color::Gray)),
                Span::styled(spark, style.fg(Color::Green)),
            ]));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
