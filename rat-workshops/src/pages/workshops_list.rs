use crate::api::WorkshopsQuery;
use crate::model::Workshop;
use crate::remotes::workshops::{WorkshopsEnv, details_location};
use crate::widgets::{ErrorAlert, FormattedDate, LoadingSpinner, Pagination};
use crossterm::event::KeyCode;
use std::borrow::Cow;
use rat_federation::{Action, Component, Context, Entity, Event, EventContext, Location};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
};

#[derive(Clone, Default)]
pub struct ListPageState {
    pub loading: bool,
    pub workshops: Vec<Workshop>,
    pub error: Option<String>,
    /// Bumped per fetch; older responses are dropped.
    pub request: u64,
}

/// `/workshops?_page=N&category=...`
pub struct WorkshopsListPage {
    env: WorkshopsEnv,
    state: Entity<ListPageState>,
    page: u32,
    category: Option<String>,
    selected: usize,
}

impl WorkshopsListPage {
    pub fn new(env: WorkshopsEnv) -> Self {
        Self {
            env,
            state: Entity::new(ListPageState::default()),
            page: 1,
            category: None,
            selected: 0,
        }
    }

    fn page_location(&self, page: u32) -> Location {
        let mut search = format!("?_page={page}");
        if let Some(category) = &self.category {
            search.push_str(&format!("&category={}", urlencoding::encode(category)));
        }
        Location::new("/workshops", search)
    }

    fn pagination(&self, state: &ListPageState) -> Pagination {
        Pagination::new(self.page, self.env.theme.snapshot())
            .disable_next(state.loading || state.error.is_some() || state.workshops.is_empty())
    }

    fn fetch(&mut self, cx: &Context<Self>) {
        let query = WorkshopsQuery {
            page: Some(self.page),
            category: self.category.clone(),
        };
        let request = self
            .state
            .update(|s| {
                s.request += 1;
                s.loading = true;
                s.error = None;
                s.request
            })
            .unwrap_or_default();

        let client = self.env.services.client.clone();
        let state = self.state.downgrade();
        cx.app.spawn(move |app| async move {
            let result = client.get_workshops(&query).await;
            let applied = state.update(|s| {
                if s.request != request {
                    return false;
                }
                s.loading = false;
                match result {
                    Ok(workshops) => s.workshops = workshops,
                    Err(err) => s.error = Some(err.to_string()),
                }
                true
            });
            match applied {
                Some(Ok(true)) => app.refresh(),
                _ => tracing::debug!(page = query.page, "stale workshops response discarded"),
            }
        });
    }
}

impl Component for WorkshopsListPage {
    fn on_enter(&mut self, cx: &mut Context<Self>) {
        let location = self.env.router.location();
        self.page = location
            .query("_page")
            .and_then(|p| p.parse().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        self.category = location
            .query("category")
            .filter(|c| !c.is_empty())
            .map(Cow::into_owned);
        self.selected = 0;
        self.fetch(cx);
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let theme = self.env.theme.snapshot();
        let state = self.state.snapshot();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0), Constraint::Length(1)])
            .split(cx.area);

        let mut title = vec![Span::styled(
            "List of workshops",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(category) = &self.category {
            title.push(Span::raw(format!("  ({category})")));
        }
        frame.render_widget(Paragraph::new(Line::from(title)).style(theme.style()), chunks[0]);

        if state.loading {
            frame.render_widget(LoadingSpinner, chunks[1]);
        } else if let Some(error) = &state.error {
            frame.render_widget(ErrorAlert::new(error), chunks[1]);
        } else {
            let items: Vec<ListItem> = state
                .workshops
                .iter()
                .map(|w| {
                    ListItem::new(vec![
                        Line::styled(w.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                        Line::from(format!("  {}", w.location)),
                        Line::from(format!(
                            "  {} - {}",
                            FormattedDate(&w.start_date),
                            FormattedDate(&w.end_date)
                        )),
                    ])
                })
                .collect();
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(theme.accent()))
                        .title_bottom(" ↑↓ select | Enter know more "),
                )
                .style(theme.style())
                .highlight_style(Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD))
                .highlight_symbol("▶ ");
            let selected = (!state.workshops.is_empty()).then(|| self.selected.min(state.workshops.len() - 1));
            let mut list_state = ListState::default().with_selected(selected);
            frame.render_stateful_widget(list, chunks[1], &mut list_state);
        }

        frame.render_widget(self.pagination(&state), chunks[2]);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        let state = self.state.snapshot();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < state.workshops.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(workshop) = state.workshops.get(self.selected) {
                    self.env.router.navigate(details_location(workshop.id));
                }
            }
            KeyCode::Char('n') if self.pagination(&state).next_enabled() => {
                self.env.router.navigate(self.page_location(self.page + 1));
            }
            KeyCode::Char('p') if self.pagination(&state).previous_enabled() => {
                self.env.router.navigate(self.page_location(self.page - 1));
            }
            _ => {}
        }
        None
    }
}
