//! Root components: the host shell and the standalone wrapper for a single remote.

use crate::pages::MenuBar;
use crate::pages::menu::MenuCommand;
use crate::remotes::{FAVORITES, HOME, WORKSHOPS};
use crate::widgets::ErrorAlert;
use rat_federation::{
    Action, BrowserHistory, Component, Container, Context, Event, EventContext, Location, MountHandle, MountOptions,
    NavigationBridge, Origin, RemoteApp, RemoteRegistry, RouteTable, Subscription, ThemeChannel, route_table,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::Paragraph,
};
use std::sync::Arc;

pub fn host_routes() -> RouteTable<&'static str> {
    route_table! {
        "/" => HOME,
        "/workshops" => WORKSHOPS,
        "/workshops/*" => WORKSHOPS,
        "/favorites" => FAVORITES,
    }
}

/// What the content area currently shows.
enum Slot {
    Empty,
    Mounted(NavigationBridge),
    /// Mount failed; not retried until the route changes.
    Failed { remote: String, message: String },
    NotFound,
}

/// The host: owns the history, the content container and the remote bridge.
pub struct Shell {
    history: BrowserHistory,
    registry: Arc<RemoteRegistry>,
    theme: ThemeChannel,
    routes: RouteTable<&'static str>,
    container: Container,
    slot: Slot,
    content_area: Rect,
    theme_subscription: Option<Subscription>,
}

impl Shell {
    pub fn new(history: BrowserHistory, registry: Arc<RemoteRegistry>, theme: ThemeChannel) -> Self {
        Self {
            history,
            registry,
            theme,
            routes: host_routes(),
            container: Container::new("content"),
            slot: Slot::Empty,
            content_area: Rect::default(),
            theme_subscription: None,
        }
    }

    /// Remote the current slot belongs to.
    fn slot_remote(&self) -> Option<&str> {
        match &self.slot {
            Slot::Mounted(bridge) => Some(bridge.remote()),
            Slot::Failed { remote, .. } => Some(remote),
            Slot::Empty | Slot::NotFound => None,
        }
    }

    /// Mount whichever remote the host location resolves to, if it changed.
    fn sync_remote(&mut self) {
        let location = self.history.location();
        let target = self.routes.resolve(&location.pathname).map(|m| m.route);
        if target.is_some() && target == self.slot_remote() {
            return;
        }

        // Dropping the previous bridge unmounts its remote.
        self.slot = Slot::Empty;
        let Some(remote) = target else {
            tracing::info!(location = %location, "no remote for location");
            self.slot = Slot::NotFound;
            return;
        };

        let mounted = self
            .registry
            .load(remote)
            .and_then(|app| NavigationBridge::mount(&self.history, app.as_ref(), &self.container));
        self.slot = match mounted {
            Ok(bridge) => Slot::Mounted(bridge),
            Err(err) => {
                tracing::error!(remote, error = %err, "failed to show remote");
                Slot::Failed {
                    remote: remote.to_string(),
                    message: err.to_string(),
                }
            }
        };
    }

    fn run_command(&mut self, command: MenuCommand) -> Option<Action> {
        match command {
            MenuCommand::Navigate(path) => {
                self.history.push(path, Origin::Host);
            }
            MenuCommand::ToggleTheme => {
                let theme = self.theme.toggle();
                tracing::info!(%theme, "theme toggled");
            }
            MenuCommand::Back => {
                self.history.back();
            }
            MenuCommand::Forward => {
                self.history.forward();
            }
            MenuCommand::Quit => return Some(Action::Quit),
        }
        None
    }
}

impl Component for Shell {
    fn on_init(&mut self, cx: &mut Context<Self>) {
        self.container.attach(&cx.app);
        let app = cx.app.clone();
        self.theme_subscription = Some(self.theme.subscribe(move |_| app.refresh()));
        self.sync_remote();
    }

    fn on_shutdown(&mut self, _cx: &mut Context<Self>) {
        self.slot = Slot::Empty;
        self.theme_subscription = None;
        self.container.detach();
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let theme = self.theme.current();
        let location = self.history.location();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(cx.area);
        self.content_area = chunks[1];

        frame.render_widget(MenuBar { location: &location, theme }, chunks[0]);

        match &self.slot {
            Slot::Mounted(_) => {
                self.container.render(frame, chunks[1]);
            }
            Slot::Failed { message, .. } => {
                frame.render_widget(ErrorAlert::new(message), chunks[1]);
            }
            Slot::NotFound | Slot::Empty => {
                let not_found = Paragraph::new(vec![
                    Line::styled("Page not found", Style::default().add_modifier(Modifier::BOLD)),
                    Line::from(format!("There is nothing at {}", location.pathname)),
                ])
                .style(theme.style());
                frame.render_widget(not_found, chunks[1]);
            }
        }

        let footer = " Alt+← back | Alt+→ forward | F10 quit ";
        frame.render_widget(
            Paragraph::new(footer).style(theme.style().add_modifier(Modifier::DIM)),
            chunks[2],
        );
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        let command = match &event {
            Event::Key(key) => MenuCommand::from_key(key),
            _ => None,
        };
        let action = match command {
            Some(command) => self.run_command(command),
            None => match self.container.handle_event(event, self.content_area) {
                Some(Action::Navigate(to)) => {
                    self.history.push(to, Origin::Host);
                    None
                }
                Some(Action::Back) => {
                    self.history.back();
                    None
                }
                other => other,
            },
        };
        self.sync_remote();
        action
    }
}

/// Runs one remote on its own history, without the host shell.
pub struct StandaloneShell {
    remote: Arc<dyn RemoteApp>,
    history: BrowserHistory,
    container: Container,
    handle: Option<MountHandle>,
    error: Option<String>,
    content_area: Rect,
}

impl StandaloneShell {
    pub fn new(remote: Arc<dyn RemoteApp>, initial: Location) -> Self {
        Self {
            remote,
            history: BrowserHistory::new(initial),
            container: Container::new("standalone"),
            handle: None,
            error: None,
            content_area: Rect::default(),
        }
    }
}

impl Component for StandaloneShell {
    fn on_init(&mut self, cx: &mut Context<Self>) {
        self.container.attach(&cx.app);
        let options = MountOptions::new().default_history(self.history.clone());
        match self.remote.mount(&self.container, options) {
            Ok(handle) => self.handle = Some(handle),
            Err(err) => {
                tracing::error!(remote = self.remote.name(), error = %err, "standalone mount failed");
                self.error = Some(err.to_string());
            }
        }
    }

    fn on_shutdown(&mut self, _cx: &mut Context<Self>) {
        self.handle = None;
        self.container.detach();
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(cx.area);
        self.content_area = chunks[1];

        let title = format!(" {} (standalone) ⟶ {}  | F10 quit ", self.remote.name(), self.history.location());
        frame.render_widget(
            Paragraph::new(title).style(Style::default().add_modifier(Modifier::REVERSED)),
            chunks[0],
        );
        match &self.error {
            Some(message) => frame.render_widget(ErrorAlert::new(message), chunks[1]),
            None => {
                self.container.render(frame, chunks[1]);
            }
        }
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        if let Event::Key(key) = &event {
            match MenuCommand::from_key(key) {
                Some(MenuCommand::Quit) => return Some(Action::Quit),
                Some(MenuCommand::Back) => {
                    self.history.back();
                    return None;
                }
                Some(MenuCommand::Forward) => {
                    self.history.forward();
                    return None;
                }
                _ => {}
            }
        }
        match self.container.handle_event(event, self.content_area) {
            Some(Action::Navigate(to)) => {
                self.history.push(to, Origin::Host);
                None
            }
            Some(Action::Back) => {
                self.history.back();
                None
            }
            other => other,
        }
    }
}
