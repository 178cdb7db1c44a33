use std::collections::HashSet;
use std::sync::Arc;

use corr_graph::Point;
use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, group_color, link_width,
    world_to_screen,
};
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<String>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.graph_revision
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .simulation
            .nodes()
            .iter()
            .filter(|node| fuzzy_match_score(&matcher, node.id(), search_query).is_some())
            .map(|node| node.id().to_owned())
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        if let Some(error) = &self.build_error {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                error,
                FontId::proportional(15.0),
                Color32::from_rgb(240, 120, 110),
            );
            return;
        }

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.handle_node_drag(ui, rect, &response);

        if self.live_physics || self.drag.is_dragging() {
            self.tick = self.simulation.step();
        }
        if !self.simulation.is_settled() || self.drag.is_dragging() {
            ui.ctx().request_repaint();
        }

        let search_matches = self.cached_search_matches();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        let canvas_center = self.canvas_center();
        let to_screen =
            |world: Point| world_to_screen(rect, self.pan, self.zoom, canvas_center, world);

        if self.show_quadtree_overlay {
            for cell in self.simulation.quadtree_cells() {
                let half = Point::new(cell.half_extent, cell.half_extent);
                let min = to_screen(cell.center - half);
                let max = to_screen(cell.center + half);
                let alpha = if cell.is_leaf { 110 } else { 55 };
                let line_width = (1.4_f32 - (cell.depth as f32 * 0.09)).clamp(0.45, 1.4);
                painter.rect_stroke(
                    egui::Rect::from_min_max(min, max),
                    0.0,
                    Stroke::new(line_width, Color32::from_rgba_unmultiplied(106, 198, 255, alpha)),
                    egui::StrokeKind::Middle,
                );
            }
        }

        let hovered = response
            .hover_pos()
            .and_then(|pointer| self.node_under(rect, pointer));
        if hovered.is_some() || self.drag.is_dragging() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.drag.is_dragging() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::Grab
                };
            });
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            self.selected = hovered.clone();
        }

        let focus = self.selected.as_deref().or(hovered.as_deref());
        for link in self.simulation.links() {
            let (Some(source), Some(target)) = (
                self.tick.position(&link.source),
                self.tick.position(&link.target),
            ) else {
                continue;
            };

            let touches_focus =
                focus.is_some_and(|id| id == link.source.as_str() || id == link.target.as_str());
            let color = if touches_focus {
                Color32::from_rgba_unmultiplied(241, 146, 94, 220)
            } else if focus.is_some() || search_active {
                Color32::from_rgba_unmultiplied(80, 90, 104, 120)
            } else {
                Color32::from_rgba_unmultiplied(153, 153, 153, 150)
            };

            painter.line_segment(
                [to_screen(source), to_screen(target)],
                Stroke::new(link_width(link.value, self.zoom), color),
            );
        }

        let radius = self.screen_node_radius();
        let dragged = self.drag.dragged();
        for node in self.simulation.nodes() {
            let Some(world) = self.tick.position(node.id()) else {
                continue;
            };
            let position = to_screen(world);
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let id = node.id();
            let is_selected = self.selected.as_deref() == Some(id);
            let is_hovered = hovered.as_deref() == Some(id);
            let is_search_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(id));

            let base_color = group_color(node.group);
            let color = if is_selected || dragged == Some(id) {
                blend_color(base_color, Color32::from_rgb(245, 206, 93), 0.65)
            } else if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.35)
            } else if is_search_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.55)
            } else if search_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            let stroke_width = if node.anchor.is_pinned() { 2.2 } else { 1.5 };
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(stroke_width, Color32::from_rgba_unmultiplied(255, 255, 255, 200)),
            );

            let draw_label = is_selected
                || is_hovered
                || is_search_match
                || (self.show_labels && self.zoom > 0.6);
            if draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    id,
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(id) = hovered.as_deref()
            && let Some(node) = self.simulation.node(id)
        {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{id}  |  group {}  |  ({:.1}, {:.1})",
                    node.group, node.position.x, node.position.y
                ),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
