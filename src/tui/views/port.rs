use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::state::{PortLatency, Snapshot};
use crate::tui::history::LatencyHistory;
use crate::tui::widgets::sparkline_string;

/// Expanded port detail view (modal overlay)
pub struct PortDetailView<'a> {
    snapshot: &'a Snapshot,
    entry: PortLatency,
    history: &'a LatencyHistory,
}

impl<'a> PortDetailView<'a> {
    pub fn new(snapshot: &'a Snapshot, entry: PortLatency, history: &'a LatencyHistory) -> Self {
        Self {
            snapshot,
            entry,
            history,
        }
    }
}

impl Widget for PortDetailView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Calculate centered popup area
        let popup_width = area.width.saturating_sub(10).min(72);
        let popup_height = area.height.saturating_sub(6).min(14);
        let popup_x = (area.width - popup_width) / 2 + area.x;
        let popup_y = (area.height - popup_height) / 2 + area.y;
        let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

        // Clear the popup area
        Clear.render(popup_area, buf);

        let port = self.entry.port;
        let title = format!(" Port {} on {} ", port, self.snapshot.target.resolved);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        let label = Style::default().fg(Color::Gray);
        let rank = self
            .snapshot
            .position(port)
            .map(|i| format!("{} of {}", i + 1, self.snapshot.reachable.len()))
            .unwrap_or_else(|| "-".to_string());

        let mut lines = vec![
            Line::from(vec![
                Span::styled("  Latest:    ", label),
                Span::raw(format!("{}ms", self.entry.latency_ms)),
            ]),
            Line::from(vec![Span::styled("  Rank:      ", label), Span::raw(rank)]),
            Line::from(""),
        ];

        let samples = self.history.samples(port);
        let sparkline = sparkline_string(&samples, inner.width.saturating_sub(15) as usize);
        if !sparkline.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("  Latency:   ", label),
                Span::styled(sparkline, Style::default().fg(Color::Green)),
            ]));
            lines.push(Line::from(""));
        }

        if let Some((min, avg, max)) = self.history.stats(port) {
            lines.push(Line::from(vec![
                Span::styled("  Min: ", label),
                Span::raw(format!("{}ms    ", min)),
                Span::styled("Avg: ", label),
                Span::raw(format!("{:.1}ms    ", avg)),
                Span::styled("Max: ", label),
                Span::raw(format!("{}ms", max)),
            ]));

            let gaps = self.history.gap_pct(port);
            lines.push(Line::from(vec![
                Span::styled("  Missing:   ", label),
                Span::styled(
                    format!("{:.1}% of {} refreshes", gaps, samples.len()),
                    if gaps > 10.0 {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default().fg(Color::Green)
                    },
                ),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            "  [Esc] back",
            Style::default().fg(Color::DarkGray),
        )]));

        Paragraph::new(lines).render(inner, buf);
    }
}
