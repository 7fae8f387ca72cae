use crate::pages::workshop_details::Notice;
use crate::remotes::workshops::{WorkshopsEnv, details_location};
use crate::validation::{Field, FieldErrors, Level, SessionForm};
use crossterm::event::{KeyCode, KeyModifiers};
use rat_federation::{Action, Component, Context, Entity, Event, EventContext};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use std::collections::BTreeSet;

#[derive(Clone, Default)]
pub struct SubmitState {
    pub submitting: bool,
    pub notice: Option<Notice>,
}

/// `/workshops/:id/add`
pub struct AddSessionPage {
    env: WorkshopsEnv,
    form: SessionForm,
    focus: usize,
    /// Fields whose errors are shown: edited ones, or all after a submit attempt.
    touched: BTreeSet<Field>,
    submit: Entity<SubmitState>,
}

impl AddSessionPage {
    pub fn new(env: WorkshopsEnv) -> Self {
        Self {
            env,
            form: SessionForm::default(),
            focus: 0,
            touched: BTreeSet::new(),
            submit: Entity::new(SubmitState::default()),
        }
    }

    fn focused(&self) -> Field {
        Field::ALL[self.focus]
    }

    fn visible_errors(&self) -> FieldErrors {
        let errors = self.form.validate();
        let mut visible = FieldErrors::default();
        for field in &self.touched {
            if let Some(err) = errors.get(*field) {
                visible.insert(*field, err.clone());
            }
        }
        visible
    }

    fn edit(&mut self, code: KeyCode) {
        let field = self.focused();
        match (field, code) {
            (Field::Level, KeyCode::Left) => {
                self.form.level = Some(self.form.level.map_or(Level::Advanced, |l| l.previous()));
            }
            (Field::Level, KeyCode::Right | KeyCode::Char(' ')) => {
                self.form.level = Some(self.form.level.map_or(Level::Basic, |l| l.next()));
            }
            (_, KeyCode::Char(c)) => {
                if let Some(text) = self.form.text_mut(field) {
                    text.push(c);
                }
            }
            (_, KeyCode::Backspace) => {
                if let Some(text) = self.form.text_mut(field) {
                    text.pop();
                }
            }
            _ => return,
        }
        self.touched.insert(field);
        // The level rule depends on the duration.
        if field == Field::Duration && self.form.level.is_some() {
            self.touched.insert(Field::Level);
        }
    }

    fn set_notice(&self, notice: Option<Notice>) {
        if let Err(err) = self.submit.update(|s| s.notice = notice) {
            tracing::warn!(%err, "failed to update add-session notice");
        }
    }

    fn submit(&mut self, cx: &Context<Self>) {
        if self.submit.read(|s| s.submitting).unwrap_or(false) {
            return;
        }
        self.touched.extend(Field::ALL);
        let Some(workshop_id) = self.env.workshop_id() else {
            self.set_notice(Some(Notice::Error("Invalid workshop id".into())));
            return;
        };
        let session = match self.form.to_new_session(workshop_id) {
            Ok(session) => session,
            Err(errors) => {
                tracing::debug!(errors = errors.len(), "add-session form rejected");
                return;
            }
        };

        if let Err(err) = self.submit.update(|s| {
            s.submitting = true;
            s.notice = None;
        }) {
            tracing::warn!(%err, "failed to mark session as submitting");
        }
        let client = self.env.services.client.clone();
        let router = self.env.router.clone();
        let state = self.submit.downgrade();
        cx.app.spawn(move |app| async move {
            let result = client.post_session(&session).await;
            let Some(Ok(posted)) = state.update(|s| {
                s.submitting = false;
                match &result {
                    Ok(_) => s.notice = Some(Notice::Info("New session was added".into())),
                    Err(err) => s.notice = Some(Notice::Error(err.to_string())),
                }
                result.is_ok()
            }) else {
                return;
            };
            if posted {
                tracing::info!(workshop_id, "session added");
                router.navigate(details_location(workshop_id));
            }
            app.refresh();
        });
    }

    fn render_field(&self, field: Field, errors: &FieldErrors) -> Vec<Line<'static>> {
        let theme = self.env.theme.snapshot();
        let focused = field == self.focused();
        let label_style = if focused {
            Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let value = self.form.value(field);
        let shown = if value.is_empty() {
            Span::styled(field.placeholder(), Style::default().add_modifier(Modifier::DIM))
        } else {
            Span::raw(value)
        };
        let mut value_line = vec![Span::raw(if focused { "▶ " } else { "  " }), shown];
        if focused && field != Field::Level {
            value_line.push(Span::styled("█", Style::default().fg(theme.accent())));
        }
        if field == Field::Level {
            value_line.push(Span::styled("  (←/→ to choose)", Style::default().add_modifier(Modifier::DIM)));
        }

        let mut lines = vec![Line::styled(field.label(), label_style), Line::from(value_line)];
        if let Some(err) = errors.get(field) {
            lines.push(Line::styled(format!("  {err}"), Style::default().fg(Color::Red)));
        }
        lines
    }
}

impl Component for AddSessionPage {
    fn on_enter(&mut self, _cx: &mut Context<Self>) {
        self.form = SessionForm::default();
        self.focus = 0;
        self.touched.clear();
        self.set_notice(None);
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let theme = self.env.theme.snapshot();
        let submit = self.submit.snapshot();
        let errors = self.visible_errors();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
            .split(cx.area);

        let lines: Vec<Line> = Field::ALL
            .into_iter()
            .flat_map(|field| self.render_field(field, &errors))
            .collect();
        let form = Paragraph::new(lines)
            .style(theme.style())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(" Add a Session ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(theme.accent())),
            );
        frame.render_widget(form, chunks[0]);

        let status = match (&submit.notice, submit.submitting) {
            (_, true) => Line::styled("Adding session...", Style::default().add_modifier(Modifier::DIM)),
            (Some(Notice::Info(message)), _) => Line::styled(message.clone(), Style::default().fg(Color::Green)),
            (Some(Notice::Error(message)), _) => Line::styled(message.clone(), Style::default().fg(Color::Red)),
            (None, _) => Line::from(""),
        };
        frame.render_widget(Paragraph::new(status).style(theme.style()), chunks[1]);

        let footer = " Tab/↑↓ next field | Enter add a session | Esc list of sessions ";
        frame.render_widget(
            Paragraph::new(footer).style(Style::default().add_modifier(Modifier::DIM)),
            chunks[2],
        );
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        let key = match event {
            Event::Key(key) => key,
            Event::Paste(text) => {
                if let Some(value) = self.form.text_mut(self.focused()) {
                    value.push_str(&text);
                    self.touched.insert(self.focused());
                }
                return None;
            }
            _ => return None,
        };
        let fields = Field::ALL.len();
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % fields,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + fields - 1) % fields,
            KeyCode::Enter => self.submit(cx),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.submit(cx),
            KeyCode::Esc => {
                if let Some(id) = self.env.workshop_id() {
                    self.env.router.navigate(details_location(id));
                }
            }
            code => self.edit(code),
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
    use crate::validation::ValidationError;
    use crossterm::event::KeyEvent;
    use rat_federation::{AppContext, RemoteRouter, ThemeChannel};
    use ratatui::layout::Rect;

    fn page() -> (AddSessionPage, Context<AddSessionPage>) {
        let client = WorkshopsClient::builder().base_url("http://127.0.0.1:9").build().unwrap();
        let services = Services::new(client, ThemeChannel::default());
        let env = WorkshopsEnv {
            router: RemoteRouter::new("/workshops/6/add", routes()),
            theme: Entity::new(services.theme.current()),
            services,
        };
        let (app, _rx) = AppContext::new();
        let mut cx = Context::new(app, Rect::default());
        let mut page = AddSessionPage::new(env);
        page.on_enter(&mut cx);
        (page, cx)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(page: &mut AddSessionPage, cx: &mut Context<AddSessionPage>, text: &str) {
        for c in text.chars() {
            page.handle_event(key(KeyCode::Char(c)), cx);
        }
    }

    #[test]
    fn test_errors_only_for_touched_fields() {
        let (mut page, mut cx) = page();
        assert!(page.visible_errors().is_empty());

        type_text(&mut page, &mut cx, "x1");
        let errors = page.visible_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors.get(Field::SequenceId), Some(ValidationError::Pattern { .. })));
    }

    #[test]
    fn test_invalid_submit_marks_every_field() {
        let (mut page, mut cx) = page();
        page.handle_event(key(KeyCode::Enter), &mut cx);
        assert_eq!(page.visible_errors().len(), Field::ALL.len());
        assert!(!page.submit.snapshot().submitting);
        assert_eq!(page.env.router.location().pathname, "/workshops/6/add");
    }

    #[test]
    fn test_level_is_chosen_with_arrows() {
        let (mut page, mut cx) = page();
        for _ in 0..4 {
            page.handle_event(key(KeyCode::Tab), &mut cx);
        }
        assert_eq!(page.focused(), Field::Level);
        page.handle_event(key(KeyCode::Right), &mut cx);
        assert_eq!(page.form.level, Some(Level::Basic));
        page.handle_event(key(KeyCode::Left), &mut cx);
        assert_eq!(page.form.level, Some(Level::Advanced));
        // Typing is ignored on the selection field.
        page.handle_event(key(KeyCode::Char('z')), &mut cx);
        assert_eq!(page.form.value(Field::Level), "Advanced");
    }

    #[test]
    fn test_poisoned_submit_state_keeps_form_usable() {
        let (mut page, mut cx) = page();
        let submit = page.submit.clone();
        let panicked = std::thread::spawn(move || {
            let _ = submit.update(|_| -> () { panic!("writer died") });
        })
        .join();
        assert!(panicked.is_err());
        assert!(page.submit.read(|s| s.submitting).is_err());

        page.on_enter(&mut cx);
        page.handle_event(key(KeyCode::Enter), &mut cx);
        assert_eq!(page.visible_errors().len(), Field::ALL.len());
        page.handle_event(key(KeyCode::Esc), &mut cx);
        assert_eq!(page.env.router.location().pathname, "/workshops/6");
    }

    #[test]
    fn test_esc_returns_to_sessions() {
        let (mut page, mut cx) = page();
        page.handle_event(key(KeyCode::Esc), &mut cx);
        assert_eq!(page.env.router.location().pathname, "/workshops/6");
    }

    #[tokio::test]
    async fn test_failed_post_stays_on_form() {
        let (mut page, mut cx) = page();
        page.form = SessionForm {
            sequence_id: "1".into(),
            name: "Intro".into(),
            speaker: "Jane Doe".into(),
            duration: "1".into(),
            level: Some(Level::Basic),
            summary: "An introduction to the whole topic".into(),
        };
        page.handle_event(key(KeyCode::Enter), &mut cx);
        assert!(page.submit.snapshot().submitting);

        for _ in 0..100 {
            if !page.submit.snapshot().submitting {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(matches!(page.submit.snapshot().notice, Some(Notice::Error(_))));
        assert_eq!(page.env.router.location().pathname, "/workshops/6/add");
    }
}
