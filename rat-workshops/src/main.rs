//! Workshops terminal app: a host shell composing independently mounted remotes.

mod api;
mod app;
mod config;
mod logging;
mod model;
mod pages;
mod remotes;
mod validation;
mod widgets;

use crate::api::WorkshopsClient;
use crate::app::{Shell, StandaloneShell};
use crate::config::Config;
use crate::remotes::Services;
use clap::Parser;
use rat_federation::{Application, BrowserHistory, Location, Theme, ThemeChannel};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "rat-workshops", version, about = "Browse technical workshops and their sessions")]
struct Cli {
    /// Config file (TOML). Defaults to ./rat-workshops.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the backend base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Run a single remote (home, workshops, favorites) without the host shell.
    #[arg(long, value_name = "REMOTE")]
    standalone: Option<String>,

    /// Location to start at.
    #[arg(long)]
    path: Option<String>,

    /// Initial theme: light or dark.
    #[arg(long)]
    theme: Option<Theme>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(path) = cli.path {
        config.shell.initial_path = path;
    }
    if let Some(theme) = cli.theme {
        config.shell.theme = theme;
    }

    let _log_guard = logging::init(&config.logging)?;
    tracing::info!(
        base_url = %config.backend.base_url,
        initial_path = %config.shell.initial_path,
        standalone = ?cli.standalone,
        "starting rat-workshops"
    );

    let client = WorkshopsClient::from_config(&config.backend)?;
    let services = Services::new(client, ThemeChannel::new(config.shell.theme));
    let registry = remotes::registry(&services);
    let initial = Location::parse(&config.shell.initial_path);

    let result = match cli.standalone {
        Some(id) => {
            let remote = registry.load(&id)?;
            // The host's "/" means nothing to the workshops router.
            let initial = if id == remotes::WORKSHOPS && initial.pathname == "/" {
                Location::parse("/workshops")
            } else {
                initial
            };
            Application::new().run(move |cx| {
                cx.set_root(StandaloneShell::new(remote, initial))?;
                Ok(())
            })
        }
        None => {
            let history = BrowserHistory::new(initial);
            let registry = Arc::new(registry);
            Application::new().run(move |cx| {
                cx.set_root(Shell::new(history, registry, services.theme.clone()))?;
                Ok(())
            })
        }
    };

    if let Err(err) = &result {
        tracing::error!(error = %err, "application exited with an error");
    }
    tracing::info!("shutdown");
    result
}
