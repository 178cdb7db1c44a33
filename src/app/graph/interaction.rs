use corr_graph::Point;
use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn canvas_center(&self) -> Point {
        Point::new(self.canvas_size.0 * 0.5, self.canvas_size.1 * 0.5)
    }

    pub(in crate::app) fn screen_node_radius(&self) -> f32 {
        (self.node_radius * self.zoom.powf(0.40)).clamp(2.5, 40.0)
    }

    fn pointer_to_world(&self, rect: Rect, pointer: Pos2) -> Point {
        screen_to_world(rect, self.pan, self.zoom, self.canvas_center(), pointer)
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let anchor = pointer - rect.center();
        let world_before = (anchor - self.pan) / self.zoom;

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 8.0);
        self.pan = anchor - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Id of the node under `pointer`, if any.
    pub(in crate::app) fn node_under(&self, rect: Rect, pointer: Pos2) -> Option<String> {
        let world = self.pointer_to_world(rect, pointer);
        let radius = f64::from((self.screen_node_radius() + 2.0) / self.zoom);
        self.simulation
            .node_at(world, radius)
            .map(|node| node.id().to_owned())
    }

    /// Feeds primary-button drags on the canvas into the drag controller.
    pub(in crate::app) fn handle_node_drag(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            let press = ui.input(|input| input.pointer.press_origin());
            if let Some(id) = press.and_then(|pointer| self.node_under(rect, pointer))
                && self.drag.pointer_down(&mut self.simulation, &id)
            {
                self.selected = Some(id);
            }
        }

        if !self.drag.is_dragging() {
            return;
        }

        if response.dragged_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let world = self.pointer_to_world(rect, pointer);
            self.drag.pointer_move(&mut self.simulation, world);
        }

        let primary_down = ui.input(|input| input.pointer.primary_down());
        if response.drag_stopped() || !primary_down {
            self.drag.pointer_up(&mut self.simulation);
        }
    }
}
