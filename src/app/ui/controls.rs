use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::{debug, info};

use crate::engine::{FocusPhase, GraphSnapshot};
use crate::util::truncate_label;

use super::super::{Command, UiRequest, ViewModel};

const SEARCH_RESULT_ROWS: usize = 12;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Node indices whose label fuzzily matches `query`, best score first.
fn search_concepts(snapshot: &GraphSnapshot, query: &str, limit: usize) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = snapshot
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            fuzzy_match_score(&matcher, &node.label, query).map(|score| (index, score))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(limit);
    scored.into_iter().map(|(index, _)| index).collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(
        &mut self,
        ui: &mut Ui,
        requests: &mut Vec<UiRequest>,
        command_busy: bool,
    ) {
        ui.heading("Constellation");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Collection")
            .on_hover_text("Leave empty to show every collection.");
        ui.horizontal(|ui| {
            let response = ui.text_edit_singleline(&mut self.collection_input);
            let submitted =
                response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
            if ui.button("Open").clicked() || submitted {
                let collection = self.collection_input.trim();
                let collection = (!collection.is_empty()).then(|| collection.to_owned());
                if collection.as_deref() != self.engine.active_collection() {
                    requests.push(UiRequest::OpenCollection(collection));
                }
            }
        });

        let has_collection = self.engine.active_collection().is_some();
        let updates = self.engine.updates();
        let build_running = updates.build().is_active();
        let clustering_running = updates.clustering().is_active();

        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            if ui.button("Refresh").clicked() {
                requests.push(UiRequest::Reload);
            }
            let build = ui
                .add_enabled(
                    has_collection && !build_running && !command_busy,
                    egui::Button::new("Build graph"),
                )
                .on_hover_text("Extract concepts from the collection's sources.");
            if build.clicked() {
                requests.push(UiRequest::Run(Command::Build));
            }
            let cluster = ui.add_enabled(
                !clustering_running && !command_busy,
                egui::Button::new("Cluster"),
            );
            if cluster.clicked() {
                requests.push(UiRequest::Run(Command::Cluster));
            }
            let reset = ui
                .add_enabled(has_collection && !command_busy, egui::Button::new("Reset graph"))
                .on_hover_text("Delete every concept of this collection on the backend.");
            if reset.clicked() {
                requests.push(UiRequest::Run(Command::ResetGraph));
            }
        });

        if let Some(count) = self.source_count {
            ui.small(format!("{count} source(s) in collection"));
        }

        ui.separator();
        ui.label(RichText::new("Navigation").strong());
        ui.horizontal(|ui| {
            let focused = matches!(self.engine.phase(), FocusPhase::Focused(_));
            if ui.add_enabled(focused, egui::Button::new("Back")).clicked()
                && let Err(error) = self.engine.back()
            {
                debug!(%error, "back navigation failed");
            }
            if ui.button("Full view").clicked() {
                self.engine.reset_to_full_view();
            }
        });

        let history = self.engine.history().recent().map(str::to_owned).collect::<Vec<_>>();
        if !history.is_empty() {
            ui.small("Recently focused");
            for id in history {
                let label = self
                    .engine
                    .snapshot()
                    .node(&id)
                    .map(|node| truncate_label(&node.label, 36))
                    .unwrap_or_else(|| id.clone());
                if ui.small_button(label).clicked() {
                    self.focus_from_panel(&id);
                }
            }
        }

        ui.separator();
        ui.label("Search concepts")
            .on_hover_text("Fuzzy match on concept labels. Click a result to focus it.");
        ui.text_edit_singleline(&mut self.search);

        let results = search_concepts(self.engine.snapshot(), &self.search, SEARCH_RESULT_ROWS);
        if !self.search.trim().is_empty() && results.is_empty() {
            ui.small("No matching concepts.");
        }
        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results")
            .show(ui, |ui| {
                for index in results {
                    let node = &self.engine.snapshot().nodes[index];
                    let focused = self.engine.focused_node().is_some_and(|f| f.id == node.id);
                    let text = format!(
                        "{}  ({})",
                        truncate_label(&node.label, 36),
                        node.connection_count
                    );
                    if ui.selectable_label(focused, text).clicked() {
                        picked = Some(node.id.clone());
                    }
                }
            });
        if let Some(id) = picked {
            self.focus_from_panel(&id);
        }
    }

    pub(in crate::app) fn focus_from_panel(&mut self, id: &str) {
        match self.engine.focus(id) {
            Ok(()) => info!(id, "focused from panel"),
            Err(error) => debug!(%error, "panel focus failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::{RawGraph, RawNode};
    use crate::config::Config;
    use crate::engine::ConstellationEngine;

    fn engine(labels: &[&str]) -> ConstellationEngine {
        let mut engine = ConstellationEngine::with_seed(&Config::default(), 5);
        engine.ingest(RawGraph {
            nodes: labels
                .iter()
                .map(|label| RawNode {
                    id: label.to_ascii_lowercase(),
                    label: (*label).to_owned(),
                    kind: "concept".to_owned(),
                    color: None,
                    size: 1.0,
                    metadata: Default::default(),
                })
                .collect(),
            edges: vec![],
            clusters: vec![],
        });
        engine
    }

    #[test]
    fn search_ranks_fuzzy_matches() {
        let engine = engine(&["Borrow Checker", "Lifetimes", "Borrowing"]);
        let results = search_concepts(engine.snapshot(), "borrow", 10);
        assert_eq!(results.len(), 2);
        assert!(!results.contains(&1));
    }

    #[test]
    fn blank_query_and_limit() {
        let engine = engine(&["alpha", "alphabet", "alpine"]);
        assert!(search_concepts(engine.snapshot(), "   ", 10).is_empty());
        assert_eq!(search_concepts(engine.snapshot(), "al", 2).len(), 2);
    }
}
