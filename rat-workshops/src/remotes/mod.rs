//! The remote applications this binary ships, and the registry that loads them.

pub mod favorites;
pub mod home;
pub mod workshops;

pub use favorites::FavoritesRemote;
pub use home::HomeRemote;
pub use workshops::WorkshopsRemote;

use crate::api::WorkshopsClient;
use crate::model::Favorite;
use rat_federation::{AppContext, Entity, RemoteApp, RemoteRegistry, Subscription, Theme, ThemeChannel};
use std::sync::Arc;

pub const HOME: &str = "home";
pub const WORKSHOPS: &str = "workshops";
pub const FAVORITES: &str = "favorites";

/// Everything the remotes share with each other and the host.
#[derive(Clone)]
pub struct Services {
    pub client: Arc<WorkshopsClient>,
    pub theme: ThemeChannel,
    pub favorites: Entity<Vec<Favorite>>,
}

impl Services {
    pub fn new(client: WorkshopsClient, theme: ThemeChannel) -> Self {
        Self {
            client: Arc::new(client),
            theme,
            favorites: Entity::new(Vec::new()),
        }
    }
}

/// A registry with home, workshops and favorites.
pub fn registry(services: &Services) -> RemoteRegistry {
    let mut registry = RemoteRegistry::new();
    {
        let theme = services.theme.clone();
        registry.register(HOME, move || Ok(Arc::new(HomeRemote::new(theme.clone())) as Arc<dyn RemoteApp>));
    }
    {
        let services = services.clone();
        registry.register(WORKSHOPS, move || {
            Ok(Arc::new(WorkshopsRemote::new(services.clone())) as Arc<dyn RemoteApp>)
        });
    }
    {
        let theme = services.theme.clone();
        let favorites = services.favorites.clone();
        registry.register(FAVORITES, move || {
            Ok(Arc::new(FavoritesRemote::new(theme.clone(), favorites.clone())) as Arc<dyn RemoteApp>)
        });
    }
    registry
}

/// Mirror `channel` into an entity the view reads while rendering.
///
/// The subscription must be held for as long as the view is mounted.
pub(crate) fn follow_theme(channel: &ThemeChannel, app: &AppContext) -> (Entity<Theme>, Subscription) {
    let theme = Entity::new(channel.current());
    let subscription = {
        let weak = theme.downgrade();
        let app = app.clone();
        channel.subscribe(move |next| {
            if weak.update(|t| *t = next).is_some() {
                app.refresh();
            }
        })
    };
    (theme, subscription)
}
