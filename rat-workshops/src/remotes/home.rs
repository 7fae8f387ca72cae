use super::{HOME, follow_theme};
use rat_federation::{
    Component, Container, Context, Entity, MountHandle, MountOptions, RemoteApp, Result, Theme, ThemeChannel,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Landing page. Has no routes, so host navigation is not forwarded to it.
pub struct HomeRemote {
    theme: ThemeChannel,
}

impl HomeRemote {
    pub fn new(theme: ThemeChannel) -> Self {
        Self { theme }
    }
}

impl RemoteApp for HomeRemote {
    fn name(&self) -> &str {
        HOME
    }

    fn mount(&self, target: &Container, _options: MountOptions) -> Result<MountHandle> {
        let app = target.app()?;
        let (theme, theme_subscription) = follow_theme(&self.theme, &app);
        let handle = MountHandle::for_view(target, HOME, HomeView { theme })?;
        Ok(handle.hold(theme_subscription))
    }
}

pub struct HomeView {
    theme: Entity<Theme>,
}

impl Component for HomeView {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let theme = self.theme.snapshot();
        let block = Block::default().borders(Borders::ALL).style(theme.style());
        let inner = block.inner(cx.area);
        frame.render_widget(block, cx.area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        let heading = Paragraph::new(Line::styled(
            "Workshops App",
            Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(heading, chunks[0]);

        let body = vec![
            Line::from("Welcome to Workshops App"),
            Line::from(""),
            Line::from(
                "The app serves details of (fictitious) technical workshops happening in various cities. \
                 Every workshop has a broad topic (eg. JavaScript), and a workshop has many sessions \
                 (each session covers a sub-topic, eg. Closures in JavaScript).",
            ),
            Line::from(""),
            Line::from(
                "You can view a list of workshops, details of every workshop, view the list of sessions \
                 in a workshop, vote for sessions, and also add a new session for a workshop.",
            ),
        ];
        frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: true }), chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rat_federation::AppContext;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_home_follows_theme_until_unmount() {
        let (app, _rx) = AppContext::new();
        let container = Container::new("content");
        container.attach(&app);
        let channel = ThemeChannel::new(Theme::Light);

        let mut handle = HomeRemote::new(channel.clone())
            .mount(&container, MountOptions::new())
            .unwrap();
        assert_eq!(container.owner().as_deref(), Some(HOME));
        assert_eq!(channel.subscriber_count(), 1);

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        channel.publish(Theme::Dark);
        terminal
            .draw(|frame| {
                let area = frame.area();
                container.render(frame, area);
            })
            .unwrap();
        assert!(screen(&terminal).contains("Welcome to Workshops App"));
        assert_eq!(terminal.backend().buffer()[(0, 0)].bg, Theme::Dark.background());

        assert!(handle.unmount());
        assert_eq!(channel.subscriber_count(), 0);
        assert!(!container.is_occupied());
    }

    #[test]
    fn test_home_ignores_parent_navigation() {
        let (app, _rx) = AppContext::new();
        let container = Container::new("content");
        container.attach(&app);
        let handle = HomeRemote::new(ThemeChannel::default())
            .mount(&container, MountOptions::new())
            .unwrap();
        assert!(!handle.supports_parent_navigate());
        assert!(!handle.on_parent_navigate(&"/workshops".into()));
    }
}
