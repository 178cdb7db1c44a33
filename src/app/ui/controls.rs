use corr_graph::SimulationConfig;
use eframe::egui::{self, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph");
        let symbols = self
            .dataset
            .symbols()
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if !symbols.is_empty() {
            let current = self
                .symbol
                .clone()
                .unwrap_or_else(|| symbols[0].clone());
            let mut chosen = None;
            egui::ComboBox::from_label("Symbol")
                .selected_text(current.as_str())
                .show_ui(ui, |ui| {
                    for symbol in &symbols {
                        if ui.selectable_label(*symbol == current, symbol.as_str()).clicked() {
                            chosen = Some(symbol.clone());
                        }
                    }
                });
            if let Some(symbol) = chosen {
                self.select_symbol(symbol);
            }
        }

        ui.horizontal(|ui| {
            ui.label("Search");
            ui.text_edit_singleline(&mut self.search);
        });
        ui.label(format!(
            "{} nodes / {} links",
            self.simulation.nodes().len(),
            self.simulation.links().len()
        ));

        ui.separator();
        ui.heading("Simulation");
        ui.checkbox(&mut self.live_physics, "Live physics");
        ui.horizontal(|ui| {
            if ui.button("Re-run layout").clicked() {
                self.rebuild_simulation();
            }
            if ui.button("Reheat").clicked() {
                self.simulation.set_alpha(1.0);
                ui.ctx().request_repaint();
            }
            if ui.button("Step").clicked() {
                self.tick = self.simulation.step();
            }
        });
        ui.label(self.simulation_status_text());

        ui.separator();
        ui.heading("Forces");
        let config = &mut self.config;
        ui.add(egui::Slider::new(&mut config.link_distance, 5.0..=300.0).text("link distance"));
        ui.add(egui::Slider::new(&mut config.charge, -1000.0..=0.0).text("charge"));
        ui.add(
            egui::Slider::new(&mut config.centering_strength, 0.0..=1.0).text("centering"),
        );
        ui.add(
            egui::Slider::new(&mut config.velocity_damping, 0.05..=0.95).text("velocity damping"),
        );
        ui.add(egui::Slider::new(&mut config.theta, 0.0..=1.5).text("Barnes-Hut theta"))
            .on_hover_text("0 sums every pair exactly");
        if ui.button("Reset forces").clicked() {
            *config = SimulationConfig {
                seed: config.seed,
                ..SimulationConfig::default()
            };
        }
        self.apply_config();

        ui.separator();
        ui.heading("View");
        ui.add(egui::Slider::new(&mut self.node_radius, 2.0..=20.0).text("node radius"));
        ui.add(egui::Slider::new(&mut self.zoom, 0.1..=8.0).text("zoom"));
        ui.checkbox(&mut self.show_labels, "Labels");
        ui.checkbox(&mut self.show_quadtree_overlay, "Quadtree overlay");
        ui.checkbox(&mut self.show_fps_bar, "FPS");
        if ui.button("Reset view").clicked() {
            self.pan = egui::Vec2::ZERO;
            self.zoom = 1.0;
        }
    }
}
