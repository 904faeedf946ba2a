use eframe::egui::{self, Align, Color32, Context, Layout, ProgressBar, Ui};
use tracing::info;

use crate::config::Config;
use crate::engine::{ConnectionState, ConstellationEngine, ProgressTracker};
use crate::util::format_percent;

use super::super::graph::EguiCanvas;
use super::super::{Command, LoadedGraph, UiRequest, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(config: &Config, collection_id: Option<String>) -> Self {
        let mut engine = ConstellationEngine::new(config);
        engine.set_active_collection(collection_id.clone());

        Self {
            engine,
            canvas: EguiCanvas::new(config.picking.clone()),
            stats: Default::default(),
            source_count: None,
            collection_input: collection_id.unwrap_or_default(),
            search: String::new(),
            last_error: None,
            last_time: None,
            pressing: false,
        }
    }

    /// Ingests a fresh pull. Returns a build to start when the collection qualifies for
    /// an automatic first build.
    pub(in crate::app) fn absorb(&mut self, loaded: LoadedGraph) -> Option<Command> {
        self.stats = loaded.stats;
        self.source_count = loaded.source_count;
        self.last_error = None;
        self.pressing = false;
        self.engine.ingest(loaded.raw);

        let source_count = self.source_count?;
        if self.engine.should_auto_build(source_count) {
            info!(source_count, "empty graph with sources, starting automatic build");
            return Some(Command::Build);
        }
        None
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        requests: &mut Vec<UiRequest>,
        is_reloading: bool,
        command_busy: bool,
    ) {
        self.step(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("constellation");
                    ui.separator();
                    ui.label(format!(
                        "collection: {}",
                        self.engine.active_collection().unwrap_or("all")
                    ));
                    ui.label(format!("concepts: {}", self.stats.concepts));
                    ui.label(format!("links: {}", self.stats.links));
                    ui.label(format!("clusters: {}", self.stats.clusters));
                    if is_reloading {
                        ui.spinner();
                    }
                    self.draw_progress(ui);

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        self.draw_connection(ui);
                        let processing = self.engine.updates().processing().len();
                        if processing > 0 {
                            ui.label(format!("processing {processing} source(s)"));
                            ui.spinner();
                        }
                        if let Some(error) = &self.last_error {
                            ui.colored_label(Color32::from_rgb(239, 68, 68), error.as_str())
                                .on_hover_text(error.as_str());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui, requests, command_busy));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    /// Advances the engine by the real time since the previous frame and schedules the
    /// next repaint.
    fn step(&mut self, ctx: &Context) {
        let minimized = ctx.input(|input| input.viewport().minimized.unwrap_or(false));
        if minimized == self.engine.is_visible() {
            self.engine.set_visible(!minimized, &mut self.canvas);
        }

        let now = ctx.input(|input| input.time);
        let dt = self.last_time.map_or(0.0, |last| (now - last).max(0.0) as f32);
        self.last_time = Some(now);

        if self.engine.tick(dt) {
            ctx.request_repaint();
        }
    }

    fn draw_progress(&self, ui: &mut Ui) {
        let updates = self.engine.updates();
        let runs: [(&str, &ProgressTracker); 3] = [
            ("build", updates.build()),
            ("clustering", updates.clustering()),
            ("enhancing", updates.enhancement()),
        ];

        for (name, tracker) in runs {
            if !tracker.is_active() {
                continue;
            }
            let text = match tracker.status() {
                Some(status) => format!("{name}: {status}"),
                None => format!("{name} {}", format_percent(tracker.percent())),
            };
            ui.add(
                ProgressBar::new(tracker.percent() / 100.0)
                    .desired_width(160.0)
                    .text(text),
            );
        }
    }

    fn draw_connection(&self, ui: &mut Ui) {
        let state = self.engine.updates().connection();
        let color = match state {
            ConnectionState::Open => Color32::from_rgb(74, 222, 128),
            ConnectionState::Connecting | ConnectionState::Retrying { .. } => {
                Color32::from_rgb(250, 204, 21)
            }
            ConnectionState::Offline => Color32::from_rgb(148, 163, 184),
        };
        let text = match state {
            ConnectionState::Retrying { attempt } => format!("{} ({attempt})", state.label()),
            _ => state.label().to_owned(),
        };
        ui.colored_label(color, text);
    }
}
