//! Widgets shared by the remotes.

use chrono::{DateTime, Datelike, NaiveDate};
use rat_federation::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};
use std::fmt;

/// A failed request, shown verbatim.
pub struct ErrorAlert<'a> {
    message: &'a str,
}

impl<'a> ErrorAlert<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Widget for ErrorAlert<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.message)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(" Error ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Red)),
            )
            .render(area, buf);
    }
}

#[derive(Default)]
pub struct LoadingSpinner;

impl Widget for LoadingSpinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::styled("⠿ Loading...", Style::default().add_modifier(Modifier::DIM)))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

/// Previous/next controls for a paged list. Previous is always disabled on page 1.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub disable_previous: bool,
    pub disable_next: bool,
    pub theme: Theme,
}

impl Pagination {
    pub fn new(page: u32, theme: Theme) -> Self {
        Self {
            page,
            disable_previous: false,
            disable_next: false,
            theme,
        }
    }

    pub fn disable_next(mut self, disable: bool) -> Self {
        self.disable_next = disable;
        self
    }

    pub fn previous_enabled(&self) -> bool {
        !self.disable_previous && self.page > 1
    }

    pub fn next_enabled(&self) -> bool {
        !self.disable_next
    }

    fn button(&self, label: &'static str, enabled: bool) -> Span<'static> {
        if enabled {
            Span::styled(label, Style::default().fg(self.theme.accent()).add_modifier(Modifier::BOLD))
        } else {
            Span::styled(label, Style::default().fg(Color::DarkGray))
        }
    }
}

impl Widget for Pagination {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            self.button("[p] Previous", self.previous_enabled()),
            Span::raw("  "),
            self.button("[n] Next", self.next_enabled()),
            Span::raw(format!("   You are viewing page {}", self.page)),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}

/// Vote count between up and down carets.
pub struct VotingWidget {
    votes: i64,
    highlighted: bool,
}

impl VotingWidget {
    pub fn new(votes: i64) -> Self {
        Self {
            votes,
            highlighted: false,
        }
    }

    pub fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }

    pub fn spans(&self) -> Vec<Span<'static>> {
        let style = if self.highlighted {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        vec![
            Span::styled("▲ ", style.fg(Color::Green)),
            Span::styled(format!("{:>3}", self.votes), style),
            Span::styled(" ▼", style.fg(Color::Red)),
        ]
    }
}

impl Widget for VotingWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(self.spans())).render(area, buf);
    }
}

/// Long date such as "January 1st, 2019", or "Invalid date".
pub struct FormattedDate<'a>(pub &'a str);

impl fmt::Display for FormattedDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match parse_date(self.0) {
            Some(date) => write!(
                f,
                "{} {}{}, {}",
                date.format("%B"),
                date.day(),
                ordinal_suffix(date.day()),
                date.year()
            ),
            None => f.write_str("Invalid date"),
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_date() {
        assert_eq!(FormattedDate("2019-01-01T04:00:00.000Z").to_string(), "January 1st, 2019");
        assert_eq!(FormattedDate("2021-03-22").to_string(), "March 22nd, 2021");
        assert_eq!(FormattedDate("2020-12-13T00:00:00Z").to_string(), "December 13th, 2020");
        assert_eq!(FormattedDate("not a date").to_string(), "Invalid date");
    }

    #[test]
    fn test_pagination_previous_disabled_on_first_page() {
        let first = Pagination::new(1, Theme::Light);
        assert!(!first.previous_enabled());
        assert!(first.next_enabled());

        let second = Pagination::new(2, Theme::Light).disable_next(true);
        assert!(second.previous_enabled());
        assert!(!second.next_enabled());
    }

    #[test]
    fn test_pagination_renders_page_number() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        Pagination::new(3, Theme::Dark).render(area, &mut buf);
        let text: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(text.contains("You are viewing page 3"));
    }

    #[test]
    fn test_voting_widget_shows_count() {
        let text: String = VotingWidget::new(12).spans().iter().map(|s| s.content.to_string()).collect();
        assert_eq!(text, "▲  12 ▼");
    }
}
