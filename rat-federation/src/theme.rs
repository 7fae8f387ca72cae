//! Theme values and the broadcast channel that shares them between mounted apps.
//!
//! A `ThemeChannel` is an ordinary value: create one in the host and hand a clone
//! to every remote that should follow it. Nothing is persisted; a fresh channel
//! always starts from its initial value.

use crate::error::{Error, UnknownThemeSnafu};
use crate::subscription::{Listeners, Subscription};
use ratatui::style::{Color, Style};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The complementary theme.
    pub fn contrast(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn background(&self) -> Color {
        match self {
            Theme::Light => Color::White,
            Theme::Dark => Color::Black,
        }
    }

    pub fn foreground(&self) -> Color {
        self.contrast().background()
    }

    pub fn accent(&self) -> Color {
        match self {
            Theme::Light => Color::Blue,
            Theme::Dark => Color::Cyan,
        }
    }

    /// Base style: this theme's background with the contrasting foreground.
    pub fn style(&self) -> Style {
        Style::default().bg(self.background()).fg(self.foreground())
    }
}

/// Map a theme to its complement.
pub fn get_contrast(theme: Theme) -> Theme {
    theme.contrast()
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => UnknownThemeSnafu { value: other }.fail(),
        }
    }
}

/// Publish/subscribe channel for the shared theme. Clones share subscribers.
#[derive(Clone)]
pub struct ThemeChannel {
    tx: watch::Sender<Theme>,
    listeners: Listeners<Theme>,
}

impl ThemeChannel {
    pub fn new(initial: Theme) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            listeners: Listeners::new(),
        }
    }

    /// The last published value.
    pub fn current(&self) -> Theme {
        *self.tx.borrow()
    }

    /// Deliver `value` to every subscriber, synchronously and in subscription order.
    pub fn publish(&self, value: Theme) {
        let previous = self.tx.send_replace(value);
        let delivered = self.listeners.emit(&value);
        tracing::debug!(%previous, %value, delivered, "theme published");
    }

    /// Publish the contrast of the current value and return it.
    pub fn toggle(&self) -> Theme {
        let next = self.current().contrast();
        self.publish(next);
        next
    }

    /// Called once per publish until the subscription is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Theme) + Send + Sync + 'static,
    {
        self.listeners.subscribe(move |theme| callback(*theme))
    }

    /// Async view of the channel for tasks that prefer to await changes.
    pub fn watch(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for ThemeChannel {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_contrast_is_involution() {
        assert_eq!(get_contrast(Theme::Light), Theme::Dark);
        assert_eq!(get_contrast(Theme::Dark), Theme::Light);
        for theme in [Theme::Light, Theme::Dark] {
            assert_eq!(get_contrast(get_contrast(theme)), theme);
        }
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" Light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!(matches!("blue".parse::<Theme>(), Err(Error::UnknownTheme { .. })));
    }

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let channel = ThemeChannel::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let _a = {
            let seen = Arc::clone(&seen);
            channel.subscribe(move |t| seen.lock().unwrap().push(("a", t)))
        };
        let _b = {
            let seen = Arc::clone(&seen);
            channel.subscribe(move |t| seen.lock().unwrap().push(("b", t)))
        };

        channel.publish(Theme::Dark);

        assert_eq!(*seen.lock().unwrap(), vec![("a", Theme::Dark), ("b", Theme::Dark)]);
        assert_eq!(channel.current(), Theme::Dark);
    }

    #[test]
    fn test_republishing_same_value_notifies_again() {
        let channel = ThemeChannel::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let seen = Arc::clone(&seen);
            channel.subscribe(move |t| seen.lock().unwrap().push(t))
        };

        channel.publish(Theme::Dark);
        channel.publish(Theme::Dark);

        assert_eq!(*seen.lock().unwrap(), vec![Theme::Dark, Theme::Dark]);
        assert_eq!(channel.current(), Theme::Dark);
    }

    #[test]
    fn test_clones_share_state_and_unsubscribe() {
        let channel = ThemeChannel::default();
        let other = channel.clone();
        let sub = other.subscribe(|_| {});
        assert_eq!(channel.subscriber_count(), 1);

        assert_eq!(channel.toggle(), Theme::Dark);
        assert_eq!(other.current(), Theme::Dark);

        drop(sub);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_watch_sees_latest_value() {
        let channel = ThemeChannel::new(Theme::Light);
        let mut rx = channel.watch();
        channel.publish(Theme::Dark);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Theme::Dark);
    }
}
