use crate::api::ApiError;
use crate::model::{Favorite, Session, VoteType, Workshop};
use crate::remotes::workshops::WorkshopsEnv;
use crate::widgets::{ErrorAlert, FormattedDate, LoadingSpinner, VotingWidget};
use crossterm::event::KeyCode;
use rat_federation::{Action, Component, Context, Entity, Event, EventContext, Location};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use regex::Regex;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Workshop descriptions arrive as HTML; the terminal gets the text only.
pub fn strip_html(html: &str) -> String {
    let text = HTML_TAG.replace_all(html, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Default)]
pub struct DetailsState {
    pub loading: bool,
    pub workshop: Option<Workshop>,
    pub error: Option<String>,
    pub sessions_loading: bool,
    pub sessions: Vec<Session>,
    pub sessions_error: Option<String>,
    /// Outcome of the last vote, shown until the next one.
    pub notice: Option<Notice>,
    pub request: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// `/workshops/:id`: the workshop, its sessions, and voting.
pub struct WorkshopDetailsPage {
    env: WorkshopsEnv,
    state: Entity<DetailsState>,
    id: Option<u64>,
    selected: usize,
}

impl WorkshopDetailsPage {
    pub fn new(env: WorkshopsEnv) -> Self {
        Self {
            env,
            state: Entity::new(DetailsState::default()),
            id: None,
            selected: 0,
        }
    }

    fn fetch(&mut self, cx: &Context<Self>, id: u64) {
        let request = self
            .state
            .update(|s| {
                let request = s.request + 1;
                *s = DetailsState {
                    loading: true,
                    sessions_loading: true,
                    request,
                    ..DetailsState::default()
                };
                request
            })
            .unwrap_or_default();

        {
            let client = self.env.services.client.clone();
            let state = self.state.downgrade();
            cx.app.spawn(move |app| async move {
                let result = client.get_workshop_by_id(id).await;
                let applied = state.update(|s| {
                    if s.request != request {
                        return false;
                    }
                    s.loading = false;
                    match result {
                        Ok(workshop) => s.workshop = Some(workshop),
                        Err(err) => s.error = Some(err.to_string()),
                    }
                    true
                });
                if let Some(Ok(true)) = applied {
                    app.refresh();
                }
            });
        }

        let client = self.env.services.client.clone();
        let state = self.state.downgrade();
        cx.app.spawn(move |app| async move {
            let result = client.get_sessions_for_workshop(id).await;
            let applied = state.update(|s| {
                if s.request != request {
                    return false;
                }
                s.sessions_loading = false;
                match result {
                    Ok(sessions) => s.sessions = sessions,
                    Err(err) => s.sessions_error = Some(err.to_string()),
                }
                true
            });
            if let Some(Ok(true)) = applied {
                app.refresh();
            }
        });
    }

    fn vote(&self, cx: &Context<Self>, vote: VoteType) {
        let Some((session_id, request)) = self
            .state
            .read(|s| s.sessions.get(self.selected).map(|session| (session.id, s.request)))
            .ok()
            .flatten()
        else {
            return;
        };

        let client = self.env.services.client.clone();
        let state = self.state.downgrade();
        cx.app.spawn(move |app| async move {
            let result = client.vote_for_session(session_id, vote).await;
            if let Some(Ok(true)) = state.update(|s| apply_vote(s, request, result)) {
                app.refresh();
            }
        });
    }

    fn toggle_favorite(&self) {
        let Some(workshop) = self.state.read(|s| s.workshop.clone()).ok().flatten() else {
            return;
        };
        let favorite = Favorite::from(&workshop);
        let toggled = self.env.services.favorites.update(|favorites| {
            match favorites.iter().position(|f| f.id == favorite.id) {
                Some(index) => {
                    favorites.remove(index);
                }
                None => favorites.push(favorite),
            }
        });
        if let Err(err) = toggled {
            tracing::warn!(%err, workshop = workshop.id, "failed to toggle favorite");
        }
    }

    fn is_favorite(&self) -> bool {
        let Some(id) = self.id else {
            return false;
        };
        self.env
            .services
            .favorites
            .read(|favorites| favorites.iter().any(|f| f.id == id))
            .unwrap_or(false)
    }

    fn render_workshop(&self, frame: &mut ratatui::Frame, area: ratatui::layout::Rect, workshop: &Workshop) {
        let theme = self.env.theme.snapshot();
        let mode = |enabled: bool, label: &'static str| {
            let (mark, color) = if enabled { ("✔", Color::Green) } else { ("✘", Color::Red) };
            vec![Span::styled(format!("{mark} "), Style::default().fg(color)), Span::raw(label)]
        };
        let mut modes = mode(workshop.modes.in_person, "In person");
        modes.push(Span::raw("    "));
        modes.extend(mode(workshop.modes.online, "Online"));

        let star = if self.is_favorite() { "★" } else { "☆" };
        let lines = vec![
            Line::from(vec![
                Span::styled(
                    workshop.name.clone(),
                    Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" {star}")),
            ]),
            Line::from(workshop.time.clone()),
            Line::from(format!(
                "{} - {}",
                FormattedDate(&workshop.start_date),
                FormattedDate(&workshop.end_date)
            )),
            Line::from(workshop.location.to_string()),
            Line::from(modes),
            Line::from(""),
            Line::from(strip_html(&workshop.description)),
        ];
        frame.render_widget(
            Paragraph::new(lines).style(theme.style()).wrap(Wrap { trim: true }),
            area,
        );
    }
}

/// Applies a vote reply unless the page has moved on since it was sent.
fn apply_vote(state: &mut DetailsState, request: u64, result: Result<Session, ApiError>) -> bool {
    if state.request != request {
        return false;
    }
    match result {
        Ok(updated) => {
            state.notice = Some(Notice::Info(format!(
                "Your vote for session {} has been captured",
                updated.name
            )));
            if let Some(session) = state.sessions.iter_mut().find(|session| session.id == updated.id) {
                *session = updated;
            }
        }
        Err(err) => state.notice = Some(Notice::Error(err.to_string())),
    }
    true
}

impl Component for WorkshopDetailsPage {
    fn on_enter(&mut self, cx: &mut Context<Self>) {
        let id = self.env.workshop_id();
        if id != self.id {
            self.selected = 0;
        }
        self.id = id;
        match id {
            Some(id) => self.fetch(cx, id),
            None => {
                let reset = self.state.set(DetailsState {
                    error: Some("Invalid workshop id".to_string()),
                    ..DetailsState::default()
                });
                if let Err(err) = reset {
                    tracing::warn!(%err, "failed to reset workshop details");
                }
            }
        }
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let theme = self.env.theme.snapshot();
        let state = self.state.snapshot();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(cx.area);

        if state.loading {
            frame.render_widget(LoadingSpinner, chunks[0]);
        } else if let Some(error) = &state.error {
            frame.render_widget(ErrorAlert::new(error), chunks[0]);
        } else if let Some(workshop) = &state.workshop {
            self.render_workshop(frame, chunks[0], workshop);
        }

        let notice = match &state.notice {
            Some(Notice::Info(message)) => Line::styled(message.clone(), Style::default().fg(Color::Green)),
            Some(Notice::Error(message)) => Line::styled(message.clone(), Style::default().fg(Color::Red)),
            None => Line::from(""),
        };
        frame.render_widget(Paragraph::new(notice).style(theme.style()), chunks[1]);

        let sessions_block = Block::default()
            .title(" List of Sessions ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.accent()));

        if state.sessions_loading {
            let inner = sessions_block.inner(chunks[2]);
            frame.render_widget(sessions_block, chunks[2]);
            frame.render_widget(LoadingSpinner, inner);
        } else if let Some(error) = &state.sessions_error {
            frame.render_widget(ErrorAlert::new(error), chunks[2]);
        } else {
            let items: Vec<ListItem> = state
                .sessions
                .iter()
                .enumerate()
                .map(|(index, session)| {
                    let mut title = VotingWidget::new(session.upvote_count)
                        .highlighted(index == self.selected)
                        .spans();
                    title.push(Span::styled(
                        format!("  {}", session.name),
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                    ListItem::new(vec![
                        Line::from(title),
                        Line::from(format!(
                            "         by {} | {} | Duration: {}",
                            session.speaker, session.level, session.duration
                        )),
                        Line::from(format!("         {}", session.summary)),
                    ])
                })
                .collect();
            let selected = (!state.sessions.is_empty()).then(|| self.selected.min(state.sessions.len() - 1));
            let list = List::new(items)
                .block(sessions_block)
                .style(theme.style())
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            let mut list_state = ListState::default().with_selected(selected);
            frame.render_stateful_widget(list, chunks[2], &mut list_state);
        }

        let footer = " ↑↓ select | + upvote | - downvote | a add a session | f favorite | Esc back ";
        frame.render_widget(
            Paragraph::new(footer).style(Style::default().add_modifier(Modifier::DIM)),
            chunks[3],
        );
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.state.read(|s| s.sessions.len()).unwrap_or(0);
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('u') => self.vote(cx, VoteType::Upvote),
            KeyCode::Char('-') | KeyCode::Char('d') => self.vote(cx, VoteType::Downvote),
            KeyCode::Char('f') => self.toggle_favorite(),
            KeyCode::Char('a') => {
                if let Some(id) = self.id {
                    self.env.router.navigate(Location::parse(&format!("/workshops/{id}/add")));
                }
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WorkshopsClient;
    use crate::remotes::Services;
    use crate::remotes::workshops::routes;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use rat_federation::{AppContext, RemoteRouter, ThemeChannel};
    use ratatui::layout::Rect;

    fn page_at(path: &str) -> (WorkshopDetailsPage, Context<WorkshopDetailsPage>) {
        let client = WorkshopsClient::builder().base_url("http://127.0.0.1:9").build().unwrap();
        let services = Services::new(client, ThemeChannel::default());
        let env = WorkshopsEnv {
            router: RemoteRouter::new(path, routes()),
            theme: Entity::new(services.theme.current()),
            services,
        };
        let (app, _rx) = AppContext::new();
        (WorkshopDetailsPage::new(env), Context::new(app, Rect::default()))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>AngularJS is a <b>framework</b>\n for apps</p>"),
            "AngularJS is a framework for apps"
        );
    }

    #[test]
    fn test_non_numeric_id_is_an_error() {
        let (mut page, mut cx) = page_at("/workshops/abc");
        page.on_enter(&mut cx);
        assert_eq!(page.state.snapshot().error.as_deref(), Some("Invalid workshop id"));
    }

    #[test]
    fn test_vote_reply_for_previous_workshop_is_dropped() {
        let session = Session {
            id: 7,
            name: "Ownership".into(),
            upvote_count: 1,
            ..Session::default()
        };
        let mut state = DetailsState {
            sessions: vec![session.clone()],
            request: 2,
            ..DetailsState::default()
        };

        let voted = Session {
            upvote_count: 2,
            ..session
        };
        assert!(!apply_vote(&mut state, 1, Ok(voted.clone())));
        assert!(state.notice.is_none());
        assert_eq!(state.sessions[0].upvote_count, 1);

        assert!(apply_vote(&mut state, 2, Ok(voted)));
        assert_eq!(
            state.notice,
            Some(Notice::Info("Your vote for session Ownership has been captured".into()))
        );
        assert_eq!(state.sessions[0].upvote_count, 2);
    }

    #[test]
    fn test_add_key_opens_form() {
        let (mut page, mut cx) = page_at("/workshops/4");
        page.on_enter(&mut cx);
        page.handle_event(key(KeyCode::Char('a')), &mut cx);
        assert_eq!(page.env.router.location().pathname, "/workshops/4/add");
    }

    #[test]
    fn test_favorite_toggle() {
        let (mut page, mut cx) = page_at("/workshops/4");
        page.on_enter(&mut cx);
        page.state
            .update(|s| {
                s.loading = false;
                s.workshop = Some(Workshop {
                    id: 4,
                    name: "Rust Basics".into(),
                    ..Workshop::default()
                });
            })
            .unwrap();

        page.handle_event(key(KeyCode::Char('f')), &mut cx);
        assert!(page.is_favorite());
        assert_eq!(page.env.services.favorites.snapshot()[0].name, "Rust Basics");

        page.handle_event(key(KeyCode::Char('f')), &mut cx);
        assert!(!page.is_favorite());
    }

    #[tokio::test]
    async fn test_failed_vote_sets_error_notice() {
        let (mut page, mut cx) = page_at("/workshops/4");
        page.on_enter(&mut cx);
        page.state
            .update(|s| {
                s.sessions_loading = false;
                s.sessions = vec![Session {
                    id: 11,
                    name: "Closures".into(),
                    ..Session::default()
                }];
            })
            .unwrap();

        page.handle_event(key(KeyCode::Char('+')), &mut cx);
        for _ in 0..100 {
            if page.state.snapshot().notice.is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(matches!(page.state.snapshot().notice, Some(Notice::Error(_))));
    }
}
