use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, Context};
use tracing::{debug, info, warn};

use crate::backend::{BackendClient, GraphStats, RawGraph, spawn_push_worker};
use crate::config::Config;
use crate::engine::{
    ChannelSignal, ConstellationEngine, ProgressKind, ReconnectPolicy, UpdateAction,
};

mod graph;
mod render_utils;
mod ui;

use graph::EguiCanvas;

/// How often the UI wakes up to drain worker channels while nothing moves.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct ConstellationApp {
    client: BackendClient,
    config: Config,
    collection_id: Option<String>,
    state: AppState,
    reload_rx: Option<Receiver<Result<LoadedGraph, String>>>,
    command_rx: Option<Receiver<Result<Command, String>>>,
    /// Runs once the command in flight reports back.
    queued_command: Option<Command>,
    push_rx: Receiver<ChannelSignal>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// Everything one pull from the backend returns.
struct LoadedGraph {
    collection_id: Option<String>,
    raw: RawGraph,
    stats: GraphStats,
    source_count: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Build,
    Cluster,
    ResetGraph,
}

impl Command {
    fn label(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Cluster => "clustering",
            Self::ResetGraph => "reset",
        }
    }
}

/// What the panels ask the app to do after a frame.
#[derive(Clone, Debug, PartialEq)]
enum UiRequest {
    Reload,
    OpenCollection(Option<String>),
    Run(Command),
}

struct ViewModel {
    engine: ConstellationEngine,
    canvas: EguiCanvas,
    stats: GraphStats,
    source_count: Option<usize>,
    collection_input: String,
    search: String,
    last_error: Option<String>,
    last_time: Option<f64>,
    pressing: bool,
}

impl ConstellationApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        client: BackendClient,
        config: Config,
        collection_id: Option<String>,
    ) -> Self {
        let push_rx = spawn_push_worker(
            client.push_url(),
            ReconnectPolicy::from_config(&config.updates),
        );
        let state = Self::start_load(client.clone(), collection_id.clone());
        Self {
            client,
            config,
            collection_id,
            state,
            reload_rx: None,
            command_rx: None,
            queued_command: None,
            push_rx,
        }
    }

    fn spawn_load(
        client: BackendClient,
        collection_id: Option<String>,
    ) -> Receiver<Result<LoadedGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph(&client, collection_id).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(client: BackendClient, collection_id: Option<String>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(client, collection_id),
        }
    }

    fn spawn_command(&mut self, command: Command) {
        if self.command_rx.is_some() {
            match self.queued_command {
                Some(queued) => debug!(
                    command = command.label(),
                    queued = queued.label(),
                    "command queue full, dropping"
                ),
                None => {
                    debug!(command = command.label(), "queued behind command in flight");
                    self.queued_command = Some(command);
                }
            }
            return;
        }
        let collection_id = self.collection_id.clone();
        if command != Command::Cluster && collection_id.is_none() {
            warn!(command = command.label(), "command needs an active collection");
            return;
        }

        let client = self.client.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let collection = collection_id.as_deref().unwrap_or_default();
            let result = match command {
                Command::Build => client.build_graph(collection),
                Command::Cluster => client.cluster_graph(),
                Command::ResetGraph => client.reset_graph(collection),
            };
            let _ = tx.send(result.map(|()| command).map_err(|error| format!("{error:#}")));
        });

        if let AppState::Ready(model) = &mut self.state {
            match command {
                Command::Build => model.engine.begin_build(),
                Command::Cluster => model.engine.begin_clustering(),
                Command::ResetGraph => {}
            }
        }
        info!(command = command.label(), "command sent");
        self.command_rx = Some(rx);
    }

    fn request_reload(&mut self) {
        if self.reload_rx.is_none() {
            self.reload_rx = Some(Self::spawn_load(
                self.client.clone(),
                self.collection_id.clone(),
            ));
        }
    }

    fn handle_request(&mut self, request: UiRequest) {
        match request {
            UiRequest::Reload => self.request_reload(),
            UiRequest::OpenCollection(collection_id) => {
                info!(collection = ?collection_id, "switching collection");
                self.collection_id = collection_id.clone();
                self.queued_command = None;
                if let AppState::Ready(model) = &mut self.state {
                    model.engine.set_active_collection(collection_id);
                }
                // A load for the previous collection would land on the wrong one.
                self.reload_rx = None;
                self.request_reload();
            }
            UiRequest::Run(command) => self.spawn_command(command),
        }
    }

    fn drain_push(&mut self) {
        let AppState::Ready(model) = &mut self.state else {
            return;
        };
        while let Ok(signal) = self.push_rx.try_recv() {
            model.engine.handle_signal(signal);
        }
    }

    fn drain_command(&mut self) {
        let Some(rx) = self.command_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(Command::ResetGraph)) => self.request_reload(),
            Ok(Ok(command)) => debug!(command = command.label(), "command accepted"),
            Ok(Err(error)) => {
                warn!(%error, "command failed");
                if let AppState::Ready(model) = &mut self.state {
                    model.last_error = Some(error);
                }
            }
            Err(TryRecvError::Empty) => {
                self.command_rx = Some(rx);
                return;
            }
            Err(TryRecvError::Disconnected) => warn!("command worker disconnected"),
        }
        if let Some(next) = self.queued_command.take() {
            self.spawn_command(next);
        }
    }

    fn apply_actions(&mut self) {
        let AppState::Ready(model) = &mut self.state else {
            return;
        };
        let mut reload = false;
        for action in model.engine.drain_actions() {
            match action {
                UpdateAction::Refresh {
                    collection_id,
                    reason,
                } => {
                    if refresh_applies(self.collection_id.as_deref(), collection_id.as_deref()) {
                        debug!(collection = ?collection_id, ?reason, "refresh requested");
                        reload = true;
                    } else {
                        debug!(
                            collection = ?collection_id,
                            active = ?self.collection_id,
                            ?reason,
                            "ignoring refresh for another collection"
                        );
                    }
                }
                UpdateAction::Finished { kind } => {
                    info!(?kind, "backend run finished");
                    if kind == ProgressKind::Build {
                        model.last_error = None;
                    }
                }
                UpdateAction::Progress { .. } | UpdateAction::ProcessingChanged { .. } => {}
            }
        }
        if reload {
            self.request_reload();
        }
    }

    /// Feeds a finished load into the live engine, keeping update state across refreshes.
    fn absorb(&mut self, loaded: LoadedGraph) -> Option<Command> {
        if let AppState::Ready(model) = &mut self.state {
            return model.absorb(loaded);
        }
        let mut model = ViewModel::new(&self.config, self.collection_id.clone());
        let auto = model.absorb(loaded);
        self.state = AppState::Ready(Box::new(model));
        auto
    }
}

/// Whether a refresh for `requested` changes what is on screen for `active`.
/// `None` on either side means every collection.
fn refresh_applies(active: Option<&str>, requested: Option<&str>) -> bool {
    match (active, requested) {
        (Some(active), Some(requested)) => active == requested,
        _ => true,
    }
}

fn load_graph(client: &BackendClient, collection_id: Option<String>) -> anyhow::Result<LoadedGraph> {
    let raw = client.fetch_graph(collection_id.as_deref())?;
    let stats = client
        .fetch_stats(collection_id.as_deref())
        .unwrap_or_else(|error| {
            warn!("graph stats unavailable: {error:#}");
            GraphStats::default()
        });
    let source_count = match collection_id.as_deref() {
        Some(id) => client
            .source_count(id)
            .inspect_err(|error| warn!("source listing unavailable: {error:#}"))
            .ok(),
        None => None,
    };

    Ok(LoadedGraph {
        collection_id,
        raw,
        stats,
        source_count,
    })
}

impl eframe::App for ConstellationApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut requests = Vec::new();

        match &mut self.state {
            AppState::Loading { rx } => match rx.try_recv() {
                Ok(Ok(loaded)) => {
                    let mut model = ViewModel::new(&self.config, self.collection_id.clone());
                    if let Some(command) = model.absorb(loaded) {
                        requests.push(UiRequest::Run(command));
                    }
                    transition = Some(AppState::Ready(Box::new(model)));
                }
                Ok(Err(error)) => transition = Some(AppState::Error(error)),
                Err(TryRecvError::Empty) => {
                    egui::CentralPanel::default().show(ctx, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(120.0);
                            ui.heading("Loading knowledge constellation...");
                            ui.add_space(8.0);
                            ui.spinner();
                        });
                    });
                    ctx.request_repaint_after(IDLE_POLL);
                }
                Err(TryRecvError::Disconnected) => {
                    transition = Some(AppState::Error(
                        "Background load worker disconnected".to_owned(),
                    ));
                }
            },
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the constellation");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(
                            self.client.clone(),
                            self.collection_id.clone(),
                        ));
                    }
                });
            }
            AppState::Ready(model) => {
                let is_reloading = self.reload_rx.is_some();
                let command_busy = self.command_rx.is_some();
                model.show(ctx, &mut requests, is_reloading, command_busy);
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }

        for request in requests {
            self.handle_request(request);
        }

        self.drain_push();
        self.drain_command();
        self.apply_actions();

        if let Some(rx) = self.reload_rx.take() {
            match rx.try_recv() {
                Ok(Ok(loaded)) => {
                    if loaded.collection_id == self.collection_id {
                        if let Some(command) = self.absorb(loaded) {
                            self.spawn_command(command);
                        }
                    } else {
                        debug!("dropping load for a collection that is no longer active");
                    }
                }
                Ok(Err(error)) => {
                    warn!(%error, "graph refresh failed");
                    if let AppState::Ready(model) = &mut self.state {
                        model.last_error = Some(error);
                    }
                }
                Err(TryRecvError::Empty) => self.reload_rx = Some(rx),
                Err(TryRecvError::Disconnected) => warn!("background load worker disconnected"),
            }
        }

        ctx.request_repaint_after(IDLE_POLL);
    }
}
