//! High‑level Application abstraction inspired by GPUI.

use crate::component::traits::{Action, AnyComponent, Component, Event};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc;

type SharedRoot = Arc<Mutex<Option<Arc<Mutex<dyn AnyComponent>>>>>;

/// Application context providing access to global services.
#[derive(Clone)]
pub struct AppContext {
    /// The root component to render, if set by the user.
    root: SharedRoot,
    /// Internal: Channel to trigger a re-render.
    re_render_tx: mpsc::UnboundedSender<()>,
}

impl AppContext {
    /// Create a context and the receiving end of its re-render channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (re_render_tx, re_render_rx) = mpsc::unbounded_channel();
        let cx = Self {
            root: Arc::new(Mutex::new(None)),
            re_render_tx,
        };
        (cx, re_render_rx)
    }

    /// Run a task on the current tokio runtime. Without a runtime the task is
    /// dropped and a warning is logged.
    pub fn spawn<F, Fut>(&self, f: F)
    where
        F: FnOnce(AppContext) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let cx = self.clone();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    f(cx).await;
                });
            }
            Err(err) => tracing::warn!(%err, "no tokio runtime; task dropped"),
        }
    }

    /// Set the root component of the application.
    pub fn set_root<C: Component>(&self, root: C) -> crate::Result<()> {
        let root: Arc<Mutex<dyn AnyComponent>> = Arc::new(Mutex::new(root));
        let mut guard = self.root.lock().map_err(|_| crate::Error::LockPoisoned)?;
        *guard = Some(root);
        self.refresh();
        Ok(())
    }

    /// Trigger a re-render.
    pub fn refresh(&self) {
        let _ = self.re_render_tx.send(());
    }
}

/// A specialized context passed to component methods.
pub struct Context<V: ?Sized> {
    pub app: AppContext,
    pub area: Rect,
    _view: PhantomData<fn(&V)>,
}

impl<V: ?Sized> Context<V> {
    pub fn new(app: AppContext, area: Rect) -> Self {
        Self {
            app,
            area,
            _view: PhantomData,
        }
    }

    /// Access the underlying AppContext.
    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Cast this context to another view type.
    pub fn cast<U: ?Sized>(&self) -> Context<U> {
        Context::new(self.app.clone(), self.area)
    }

    /// Same view type, narrower area.
    pub fn with_area(&self, area: Rect) -> Context<V> {
        Context::new(self.app.clone(), area)
    }

    /// Explicitly trigger a re-render.
    pub fn notify(&self) {
        self.app.refresh();
    }
}

/// EventContext for event handling, currently identical to Context but renamed for clarity.
pub type EventContext<V> = Context<V>;

/// Main application handle.
#[derive(Default)]
pub struct Application;

impl Application {
    /// Create a new application instance.
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given closure that receives a context.
    pub fn run<F>(self, setup: F) -> anyhow::Result<()>
    where
        F: FnOnce(&AppContext) -> anyhow::Result<()>,
    {
        let rt = Runtime::new().map_err(|e| anyhow::anyhow!("Failed to start tokio: {}", e))?;

        let (app_context, re_render_rx) = AppContext::new();

        let guard = rt.enter();
        setup(&app_context)?;
        drop(guard);

        let actual_root = {
            let guard = app_context
                .root
                .lock()
                .map_err(|_| anyhow::anyhow!("Root mutex poisoned"))?;
            guard
                .clone()
                .unwrap_or_else(|| Arc::new(Mutex::new(EmptyView)) as Arc<Mutex<dyn AnyComponent>>)
        };

        rt.block_on(async move { self.run_loop(app_context, actual_root, re_render_rx).await })
    }

    async fn run_loop(
        &self,
        app: AppContext,
        root: Arc<Mutex<dyn AnyComponent>>,
        re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, event::EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Root mounts before the first frame.
        {
            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);
            let mut guard = root
                .lock()
                .map_err(|_| anyhow::anyhow!("Root mutex poisoned during on_init"))?;
            let mut cx = Context::<dyn AnyComponent>::new(app.clone(), area);
            guard.on_init_any(&mut cx);
        }

        let result = self.run_app_loop(app, &mut terminal, root, re_render_rx).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            event::DisableFocusChange
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_app_loop(
        &self,
        app: AppContext,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        root: Arc<Mutex<dyn AnyComponent>>,
        mut re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> anyhow::Result<()> {
        // Initial render
        app.refresh();

        loop {
            tokio::select! {
                Some(()) = re_render_rx.recv() => {
                    // Coalesce queued refreshes into one frame.
                    while re_render_rx.try_recv().is_ok() {}

                    let mut guard = root
                        .lock()
                        .map_err(|_| anyhow::anyhow!("Root mutex poisoned during render"))?;
                    terminal.draw(|frame| {
                        let area = frame.area();
                        let mut cx = Context::<dyn AnyComponent>::new(app.clone(), area);
                        guard.render_any(frame, &mut cx);
                    })?;
                }
                event_ready = async { event::poll(Duration::from_millis(100)) } => {
                    if let Ok(true) = event_ready {
                        let crossterm_event = event::read()?;
                        let internal_event = match crossterm_event {
                            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            CrosstermEvent::FocusGained => Some(Event::FocusGained),
                            CrosstermEvent::FocusLost => Some(Event::FocusLost),
                            CrosstermEvent::Paste(s) => Some(Event::Paste(s)),
                            _ => None,
                        };

                        if let Some(event) = internal_event {
                            let size = terminal.size()?;
                            let area = Rect::new(0, 0, size.width, size.height);
                            let mut cx = EventContext::<dyn AnyComponent>::new(app.clone(), area);

                            let mut guard = root
                                .lock()
                                .map_err(|_| anyhow::anyhow!("Root mutex poisoned during event"))?;
                            let action = guard.handle_event_any(event, &mut cx);
                            app.refresh(); // Trigger refresh after any event handling

                            if let Some(Action::Quit) = action {
                                // Shell unmounts its remote here.
                                guard.on_shutdown_any(&mut cx);
                                tracing::info!("application quit requested");
                                return Ok(());
                            }
                        }
                    }
                }
            }
        }
    }
}

struct EmptyView;

impl Component for EmptyView {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let paragraph = ratatui::widgets::Paragraph::new("No shell set")
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(paragraph, cx.area);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        match event {
            Event::Key(_) => Some(Action::Quit),
            _ => None,
        }
    }
}
