use eframe::egui::{self, RichText, Ui};
use serde_json::Value;

use crate::util::truncate_label;

use super::super::ViewModel;

fn metadata_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "-".to_owned(),
        other => other.to_string(),
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Concept Details");
        ui.add_space(6.0);

        let Some(node) = self.engine.focused_node() else {
            ui.label("Click a concept in the constellation or pick one from search.");
            return;
        };

        let snapshot = self.engine.snapshot().clone();
        let node = node.clone();

        ui.label(RichText::new(&node.label).strong().size(16.0));
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Type: {}", node.kind));
        ui.label(format!("Tier: {}", node.tier.label()));
        ui.label(format!("Connections: {}", node.connection_count));
        if let Some(cluster) = node.cluster_id.as_deref().and_then(|id| snapshot.cluster(id)) {
            ui.label(format!(
                "Cluster: {} (coherence {:.2})",
                cluster.name, cluster.coherence_score
            ));
        }

        if !node.metadata.is_empty() {
            ui.separator();
            ui.label(RichText::new("Metadata").strong());
            egui::Grid::new("concept_metadata")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for (key, value) in &node.metadata {
                        ui.label(key.as_str());
                        ui.label(truncate_label(&metadata_text(value), 80));
                        ui.end_row();
                    }
                });
        }

        ui.separator();
        ui.label(RichText::new("Connected concepts").strong());
        let connected = self.engine.connected().to_vec();
        if connected.is_empty() {
            ui.label("This concept has no links yet.");
            return;
        }

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("connected_concepts")
            .show(ui, |ui| {
                for index in connected {
                    let Some(neighbor) = snapshot.nodes.get(index) else {
                        continue;
                    };
                    ui.horizontal(|ui| {
                        if ui.link(truncate_label(&neighbor.label, 40)).clicked() {
                            picked = Some(neighbor.id.clone());
                        }
                        ui.small(format!("{}", neighbor.connection_count));
                    });
                }
            });

        if let Some(id) = picked {
            self.focus_from_panel(&id);
        }
    }
}
