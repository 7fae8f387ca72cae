//! The workshops remote: list, details with sessions, and the add-session form.

use super::{Services, WORKSHOPS, follow_theme};
use crate::pages::{AddSessionPage, WorkshopDetailsPage, WorkshopsListPage};
use crossterm::event::KeyCode;
use rat_federation::{
    Action, Component, Container, Context, Entity, Event, EventContext, Location, MountHandle, MountOptions,
    RemoteApp, RemoteRouter, Result, RouteTable, Theme, route_table,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkshopRoute {
    List,
    Details,
    AddSession,
}

pub fn routes() -> RouteTable<WorkshopRoute> {
    route_table! {
        "/workshops" => WorkshopRoute::List,
        "/workshops/:id" => WorkshopRoute::Details,
        "/workshops/:id/add" => WorkshopRoute::AddSession,
    }
}

pub fn details_location(id: u64) -> Location {
    Location::parse(&format!("/workshops/{id}"))
}

/// Handles every page of this remote shares.
#[derive(Clone)]
pub struct WorkshopsEnv {
    pub router: RemoteRouter<WorkshopRoute>,
    pub services: Services,
    pub theme: Entity<Theme>,
}

impl WorkshopsEnv {
    /// The `:id` of the current route, if it is numeric.
    pub fn workshop_id(&self) -> Option<u64> {
        self.router.param("id").and_then(|id| id.parse().ok())
    }
}

pub struct WorkshopsRemote {
    services: Services,
}

impl WorkshopsRemote {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

impl RemoteApp for WorkshopsRemote {
    fn name(&self) -> &str {
        WORKSHOPS
    }

    fn mount(&self, target: &Container, options: MountOptions) -> Result<MountHandle> {
        let app = target.app()?;
        let router = options.create_router("/workshops", routes());
        let forward = options.connect(&router);
        let (theme, theme_subscription) = follow_theme(&self.services.theme, &app);

        let env = WorkshopsEnv {
            router: router.clone(),
            services: self.services.clone(),
            theme,
        };
        let handle = MountHandle::for_view(target, WORKSHOPS, WorkshopsView::new(env))?
            .hold(forward)
            .hold(theme_subscription)
            .with_parent_navigate(move |next| router.sync(next));
        Ok(handle)
    }
}

/// Dispatches to the page for the router's current route.
pub struct WorkshopsView {
    env: WorkshopsEnv,
    list: WorkshopsListPage,
    details: WorkshopDetailsPage,
    add_session: AddSessionPage,
    /// Route and location the active page was entered with.
    active: Option<(Option<WorkshopRoute>, Location)>,
}

impl WorkshopsView {
    pub fn new(env: WorkshopsEnv) -> Self {
        Self {
            list: WorkshopsListPage::new(env.clone()),
            details: WorkshopDetailsPage::new(env.clone()),
            add_session: AddSessionPage::new(env.clone()),
            env,
            active: None,
        }
    }

    /// Run exit/enter hooks if the router moved since the last call.
    fn sync_page(&mut self, cx: &Context<Self>) {
        let location = self.env.router.location();
        if self.active.as_ref().is_some_and(|(_, seen)| *seen == location) {
            return;
        }
        let route = self.env.router.current().map(|m| m.route);
        if let Some((Some(previous), _)) = self.active.take() {
            match previous {
                WorkshopRoute::List => self.list.on_exit(&mut cx.cast()),
                WorkshopRoute::Details => self.details.on_exit(&mut cx.cast()),
                WorkshopRoute::AddSession => self.add_session.on_exit(&mut cx.cast()),
            }
        }
        tracing::debug!(location = %location, ?route, "workshops page entered");
        match route {
            Some(WorkshopRoute::List) => self.list.on_enter(&mut cx.cast()),
            Some(WorkshopRoute::Details) => self.details.on_enter(&mut cx.cast()),
            Some(WorkshopRoute::AddSession) => self.add_session.on_enter(&mut cx.cast()),
            None => {}
        }
        self.active = Some((route, location));
    }

    fn current_route(&self) -> Option<WorkshopRoute> {
        self.active.as_ref().and_then(|(route, _)| *route)
    }
}

impl Component for WorkshopsView {
    fn on_init(&mut self, cx: &mut Context<Self>) {
        self.sync_page(cx);
    }

    fn on_shutdown(&mut self, cx: &mut Context<Self>) {
        match self.current_route() {
            Some(WorkshopRoute::List) => self.list.on_exit(&mut cx.cast()),
            Some(WorkshopRoute::Details) => self.details.on_exit(&mut cx.cast()),
            Some(WorkshopRoute::AddSession) => self.add_session.on_exit(&mut cx.cast()),
            None => {}
        }
        self.active = None;
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        self.sync_page(cx);
        let theme = self.env.theme.snapshot();
        frame.render_widget(Paragraph::new("").style(theme.style()), cx.area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(cx.area);

        let back = if self.env.router.can_go_back() { "Esc back" } else { "" };
        let header = Line::from(vec![
            Span::styled(" Workshops ", Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD)),
            Span::raw(self.env.router.location().href()),
            Span::styled(format!("  {back}"), Style::default().add_modifier(Modifier::DIM)),
        ]);
        frame.render_widget(Paragraph::new(header).style(theme.style()), chunks[0]);

        let mut page_cx = cx.with_area(chunks[1]);
        match self.current_route() {
            Some(WorkshopRoute::List) => self.list.render(frame, &mut page_cx.cast()),
            Some(WorkshopRoute::Details) => self.details.render(frame, &mut page_cx.cast()),
            Some(WorkshopRoute::AddSession) => self.add_session.render(frame, &mut page_cx.cast()),
            None => {
                let not_found = Paragraph::new(vec![
                    Line::styled("Page not found", Style::default().add_modifier(Modifier::BOLD)),
                    Line::from(format!("Nothing lives at {}", self.env.router.location().pathname)),
                ])
                .style(theme.style());
                frame.render_widget(not_found, page_cx.area);
            }
        }
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        self.sync_page(cx);
        if let Event::Key(key) = &event {
            if key.code == KeyCode::Esc && self.current_route() != Some(WorkshopRoute::AddSession) {
                self.env.router.go_back();
                self.sync_page(cx);
                return None;
            }
        }

        let action = match self.current_route() {
            Some(WorkshopRoute::List) => self.list.handle_event(event, &mut cx.cast()),
            Some(WorkshopRoute::Details) => self.details.handle_event(event, &mut cx.cast()),
            Some(WorkshopRoute::AddSession) => self.add_session.handle_event(event, &mut cx.cast()),
            None => None,
        };
        self.sync_page(cx);
        action
    }
}
