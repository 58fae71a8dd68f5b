use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

const KEYS: [(&str, &str); 7] = [
    ("q", "quit"),
    ("p", "freeze / resume display"),
    ("e", "export snapshot to JSON"),
    ("j / \u{2193}", "select next port"),
    ("k / \u{2191}", "select previous port"),
    ("\u{23ce}", "port details"),
    ("Esc", "clear selection"),
];

/// Key binding overlay
pub struct HelpView;

impl Widget for HelpView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(4).min(44);
        let height = area.height.saturating_sub(2).min(KEYS.len() as u16 + 4);
        let popup = Rect::new(
            (area.width - width) / 2 + area.x,
            (area.height - height) / 2 + area.y,
            width,
            height,
        );

        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines: Vec<Line> = KEYS
            .iter()
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(format!("  {:<8}", key), Style::default().fg(Color::Yellow)),
                    Span::raw(*action),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  any key to close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}
