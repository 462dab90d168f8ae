mod config;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use podscope_api::{ClusterPodSource, HttpPodSource, SharedPodSource};
use podscope_tui::{
    Action, AppState, Event, EventHandler, Focus, HelpOverlay, KeyBindings, KeyContext,
    PodListScreen, Row, Tui, install_panic_hook,
};
use podscope_view::{ContainerKey, FetchEvent, PodListView, render};

use crate::config::{ConfigLayer, Settings, SourceKind};

/// Podscope - browse pods, their containers and container logs
#[derive(Parser, Debug)]
#[command(name = "podscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: $CONFIG_DIR/podscope/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where to read pods and logs from
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Base URL of the pod service
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Additional CA bundle (PEM) for the pod service
    #[arg(long, value_name = "PATH")]
    tls_ca: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Namespace to list pods from (cluster source)
    #[arg(long)]
    namespace: Option<String>,

    /// Kubeconfig context (cluster source)
    #[arg(long)]
    context: Option<String>,

    /// Only fetch the last N lines of each log (cluster source)
    #[arg(long, value_name = "N")]
    tail_lines: Option<i64>,

    /// Refresh the pod list every N seconds
    #[arg(long, value_name = "SECS")]
    refresh_interval: Option<u64>,

    /// Fetch once, print the pod list as text and exit
    #[arg(long)]
    print: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            source: self.source,
            endpoint: self.endpoint.clone(),
            tls_ca: self.tls_ca.clone(),
            insecure: self.insecure.then_some(true),
            timeout_secs: self.timeout,
            namespace: self.namespace.clone(),
            context: self.context.clone(),
            tail_lines: self.tail_lines,
            refresh_interval_secs: self.refresh_interval,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_deref())?;

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

async fn run_app(args: Args) -> Result<()> {
    let layer = config::load(args.config.as_deref())?.merge(args.overrides());
    let settings = Settings::from(layer);

    let source = build_source(&settings).await?;
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchEvent>();
    let mut view = PodListView::new(source, fetch_tx);

    if args.print {
        view.mount();
        view.settle(&mut fetch_rx).await;
        print!("{}", render(view.model()).to_text());
        return Ok(());
    }

    run_tui(view, fetch_rx, &settings).await
}

async fn build_source(settings: &Settings) -> Result<SharedPodSource> {
    let source: SharedPodSource = match settings.source {
        SourceKind::Api => Arc::new(HttpPodSource::new(&settings.http)?),
        SourceKind::Cluster => Arc::new(ClusterPodSource::connect(settings.cluster.clone()).await?),
    };
    Ok(source)
}

async fn run_tui(
    mut view: PodListView,
    mut fetch_rx: mpsc::UnboundedReceiver<FetchEvent>,
    settings: &Settings,
) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut state = AppState::new(view.describe_source());

    install_panic_hook();
    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(settings.refresh_interval);
    let keybindings = KeyBindings::new();

    view.mount();
    state.on_refresh();

    loop {
        if state.render_dirty {
            draw(&mut tui, &mut state, &view)?;
            state.render_dirty = false;
        }

        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let context = match state.ui_state.focus {
                            Focus::PodList => KeyContext::PodList,
                            Focus::LogPanel => KeyContext::LogPanel,
                        };
                        if let Some(action) = keybindings.get_action(context, &key) {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Refresh => {
                        let _ = action_tx.send(Action::Refresh);
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    Event::Error(e) => {
                        warn!(error = %e, "terminal event error");
                    }
                }
            }

            // Handle fetch completions
            Some(fetch) = fetch_rx.recv() => {
                if view.handle(fetch) {
                    state.clamp_selection(view.model());
                    state.render_dirty = true;
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                handle_action(&mut state, &mut view, action);
            }
        }

        if state.should_quit {
            break;
        }
    }

    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn handle_action(state: &mut AppState, view: &mut PodListView, action: Action) {
    state.render_dirty = true;

    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::GoBack => {
            if state.ui_state.help_visible {
                state.ui_state.help_visible = false;
            } else if state.go_back() {
                view.model_mut().close_log_panel();
            } else {
                state.should_quit = true;
            }
        }
        Action::ListUp => {
            state.list_up(view.model());
        }
        Action::ListDown => {
            state.list_down(view.model());
        }
        Action::ListSelect => {
            if let Some(key) = state.toggle_selected(view.model()) {
                open_log(state, view, &key);
            }
        }
        Action::Expand => {
            if let Some(key) = state.expand_selected(view.model()) {
                open_log(state, view, &key);
            }
        }
        Action::Collapse => {
            state.collapse_selected(view.model());
        }
        Action::ExpandAll => {
            state.expand_all(view.model());
        }
        Action::CollapseAll => {
            state.collapse_all();
        }
        Action::Refresh => {
            view.refresh();
            state.on_refresh();
        }
        Action::ReloadLog => {
            let key = match state.ui_state.focus {
                Focus::LogPanel => view.model().log_panel().cloned(),
                Focus::PodList => match state.selected_row(view.model()) {
                    Some(Row::Container { key, .. }) => Some(key),
                    _ => None,
                },
            };
            if let Some(key) = key {
                view.reload_log(&key);
            }
        }

        // Log panel
        Action::ScrollUp(n) => {
            state.scroll_up(n);
        }
        Action::ScrollDown(n) => {
            state.scroll_down(n);
        }
        Action::PageUp => {
            state.page_up();
        }
        Action::PageDown => {
            state.page_down();
        }
        Action::ScrollToTop => {
            state.scroll_to_top();
        }
        Action::ScrollToBottom => {
            state.scroll_to_bottom();
        }

        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::Render => {}
    }
}

fn open_log(state: &mut AppState, view: &mut PodListView, key: &ContainerKey) {
    if view.model_mut().open_log_panel(key) {
        state.show_log();
    }
}

fn draw(tui: &mut Tui, state: &mut AppState, view: &PodListView) -> Result<()> {
    tui.terminal().draw(|frame| {
        PodListScreen::render(frame, state, view.model());

        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    })?;

    Ok(())
}
