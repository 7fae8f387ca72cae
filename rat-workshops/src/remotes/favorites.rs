use super::{FAVORITES, follow_theme};
use crate::model::Favorite;
use crossterm::event::KeyCode;
use rat_federation::{
    Action, Component, Container, Context, Entity, Event, EventContext, Location, MountHandle, MountOptions,
    RemoteApp, Result, Theme, ThemeChannel,
};
use ratatui::{
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
};

/// In-memory list of starred workshops.
pub struct FavoritesRemote {
    theme: ThemeChannel,
    favorites: Entity<Vec<Favorite>>,
}

impl FavoritesRemote {
    pub fn new(theme: ThemeChannel, favorites: Entity<Vec<Favorite>>) -> Self {
        Self { theme, favorites }
    }
}

impl RemoteApp for FavoritesRemote {
    fn name(&self) -> &str {
        FAVORITES
    }

    fn mount(&self, target: &Container, _options: MountOptions) -> Result<MountHandle> {
        let app = target.app()?;
        let (theme, theme_subscription) = follow_theme(&self.theme, &app);
        let view = FavoritesView {
            theme,
            favorites: self.favorites.clone(),
            selected: 0,
        };
        Ok(MountHandle::for_view(target, FAVORITES, view)?.hold(theme_subscription))
    }
}

pub struct FavoritesView {
    theme: Entity<Theme>,
    favorites: Entity<Vec<Favorite>>,
    selected: usize,
}

impl FavoritesView {
    fn len(&self) -> usize {
        self.favorites.read(Vec::len).unwrap_or(0)
    }
}

impl Component for FavoritesView {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let theme = self.theme.snapshot();
        let favorites = self.favorites.snapshot();
        let block = Block::default()
            .title(" Favorites ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .style(theme.style())
            .border_style(Style::default().fg(theme.accent()));

        if favorites.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from("No favorite workshops yet."),
                Line::from(""),
                Line::from("Press 'f' on a workshop's details page to add it here."),
            ])
            .block(block);
            frame.render_widget(empty, cx.area);
            return;
        }

        let items: Vec<ListItem> = favorites
            .iter()
            .map(|f| ListItem::new(format!("★ {}", f.name)))
            .collect();
        let list = List::new(items)
            .block(block.title_bottom(" Enter open | x remove "))
            .highlight_style(Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(Some(self.selected.min(favorites.len() - 1)));
        frame.render_stateful_widget(list, cx.area, &mut state);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        let len = self.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < len {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('x') | KeyCode::Delete if len > 0 => {
                let index = self.selected.min(len - 1);
                if let Err(err) = self.favorites.update(|f| {
                    f.remove(index);
                }) {
                    tracing::warn!(%err, "failed to remove favorite");
                }
                self.selected = self.selected.min(len.saturating_sub(2));
                None
            }
            // Cross-remote link: the host decides which remote shows it.
            KeyCode::Enter => {
                let id = self
                    .favorites
                    .read(|f| f.get(self.selected).map(|fav| fav.id))
                    .ok()
                    .flatten()?;
                Some(Action::Navigate(Location::parse(&format!("/workshops/{id}"))))
            }
            _ => None,
        }
    }
}
