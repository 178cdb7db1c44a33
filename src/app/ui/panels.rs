use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        input: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("corr-graph");
                    ui.separator();
                    ui.label(format!("dataset: {}", input.display()));
                    if let Some(symbol) = &self.symbol {
                        ui.label(format!("symbol: {symbol}"));
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.sync_canvas_size(ui.available_size());
                self.draw_graph(ui);
            });
    }

    /// Keeps the centering target in the middle of the visible canvas.
    fn sync_canvas_size(&mut self, size: egui::Vec2) {
        let size = (f64::from(size.x), f64::from(size.y));
        if size.0 < 1.0 || size.1 < 1.0 || size == self.canvas_size {
            return;
        }

        self.canvas_size = size;
        if self.simulation.resize(size.0, size.1).is_ok() {
            self.tick = self.simulation.snapshot();
        }
    }

    fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection");
        let Some(selected) = self.selected.clone() else {
            ui.label("Click or drag a node to inspect it.");
            return;
        };
        let Some(node) = self.simulation.node(&selected) else {
            self.selected = None;
            return;
        };

        ui.label(format!("id: {}", node.id()));
        ui.label(format!("group: {}", node.group));
        ui.label(format!(
            "position: ({:.1}, {:.1})",
            node.position.x, node.position.y
        ));
        ui.label(format!(
            "velocity: ({:.2}, {:.2})",
            node.velocity.x, node.velocity.y
        ));
        let pinned = node.anchor.is_pinned();
        ui.label(if pinned { "pinned" } else { "free" });

        let dragging_this = self.drag.dragged() == Some(selected.as_str());
        if pinned && !dragging_this && ui.button("Release").clicked() {
            self.simulation.release(&selected);
        }

        ui.separator();
        ui.label("Links");
        let mut neighbours = self
            .simulation
            .links()
            .iter()
            .filter_map(|link| {
                if link.source == selected {
                    Some((link.target.clone(), link.value))
                } else if link.target == selected {
                    Some((link.source.clone(), link.value))
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();
        neighbours.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut clicked = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (id, value) in &neighbours {
                if ui.link(format!("{id}  ({value:.3})")).clicked() {
                    clicked = Some(id.clone());
                }
            }
        });
        if clicked.is_some() {
            self.selected = clicked;
        }
    }
}
