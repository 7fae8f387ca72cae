//! The host's navigation bar and its key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rat_federation::{Location, Theme};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// What a host-level key asks the shell to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Navigate(&'static str),
    ToggleTheme,
    Back,
    Forward,
    Quit,
}

/// (key, label, path)
const LINKS: [(&str, &str, &str); 3] = [
    ("F1", "Home", "/"),
    ("F2", "List of workshops", "/workshops"),
    ("F3", "Favorites", "/favorites"),
];

impl MenuCommand {
    /// Keys the shell handles before the mounted remote sees them.
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::F(1) => Some(Self::Navigate("/")),
            KeyCode::F(2) => Some(Self::Navigate("/workshops")),
            KeyCode::F(3) => Some(Self::Navigate("/favorites")),
            KeyCode::F(5) => Some(Self::ToggleTheme),
            KeyCode::F(10) => Some(Self::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Self::Quit),
            KeyCode::Left if alt => Some(Self::Back),
            KeyCode::Right if alt => Some(Self::Forward),
            _ => None,
        }
    }
}

fn is_active(path: &str, location: &Location) -> bool {
    match path {
        "/" => location.pathname == "/",
        _ => location.pathname == path || location.pathname.starts_with(&format!("{path}/")),
    }
}

/// Brand, links, theme toggle, and the address bar underneath.
pub struct MenuBar<'a> {
    pub location: &'a Location,
    pub theme: Theme,
}

impl Widget for MenuBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let mut spans = vec![Span::styled(
            " Workshops App ",
            Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD),
        )];
        for (key, label, path) in LINKS {
            let style = if is_active(path, self.location) {
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            spans.push(Span::styled(format!(" {key} "), Style::default().add_modifier(Modifier::DIM)));
            spans.push(Span::styled(label, style));
        }
        spans.push(Span::styled(" F5 ", Style::default().add_modifier(Modifier::DIM)));
        spans.push(Span::raw(format!("Change Theme ({})", theme.contrast())));

        let address = Line::from(vec![
            Span::styled(" ⟶ ", Style::default().add_modifier(Modifier::DIM)),
            Span::raw(self.location.href()),
        ]);

        Paragraph::new(vec![Line::from(spans), address])
            .style(theme.style())
            .block(Block::default().borders(Borders::BOTTOM))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_keys() {
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(MenuCommand::from_key(&plain(KeyCode::F(2))), Some(MenuCommand::Navigate("/workshops")));
        assert_eq!(MenuCommand::from_key(&plain(KeyCode::F(5))), Some(MenuCommand::ToggleTheme));
        assert_eq!(MenuCommand::from_key(&plain(KeyCode::Left)), None);
        assert_eq!(
            MenuCommand::from_key(&KeyEvent::new(KeyCode::Left, KeyModifiers::ALT)),
            Some(MenuCommand::Back)
        );
        assert_eq!(
            MenuCommand::from_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(MenuCommand::Quit)
        );
        assert_eq!(MenuCommand::from_key(&plain(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_active_link() {
        let at = |path: &str| Location::parse(path);
        assert!(is_active("/", &at("/")));
        assert!(!is_active("/", &at("/workshops")));
        assert!(is_active("/workshops", &at("/workshops/3/add")));
        assert!(!is_active("/workshops", &at("/workshopsx")));
    }
}
