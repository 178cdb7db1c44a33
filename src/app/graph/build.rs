use std::collections::VecDeque;

use corr_graph::dataset::Dataset;
use corr_graph::{DragController, Simulation, SimulationConfig};
use eframe::egui::Vec2;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(
        dataset: Dataset,
        symbol: Option<String>,
        config: SimulationConfig,
        canvas_size: (f64, f64),
    ) -> Self {
        let mut model = Self {
            dataset,
            symbol,
            simulation: Simulation::new(config),
            drag: DragController::default(),
            config,
            canvas_size,
            tick: Default::default(),
            build_error: None,
            graph_revision: 0,
            selected: None,
            search: String::new(),
            search_match_cache: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            node_radius: 6.0,
            show_labels: true,
            show_quadtree_overlay: false,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        };
        model.rebuild_simulation();
        model
    }

    /// Discards the running simulation and starts a new one for the current symbol.
    pub(in crate::app) fn rebuild_simulation(&mut self) {
        self.graph_revision += 1;
        self.search_match_cache = None;

        let graph = match self.dataset.graph(self.symbol.as_deref()) {
            Ok(graph) => graph,
            Err(error) => {
                tracing::warn!(%error, "no graph to lay out");
                self.simulation.clear();
                self.tick = self.simulation.snapshot();
                self.build_error = Some(format!("{error:#}"));
                return;
            }
        };

        let (width, height) = self.canvas_size;
        match self.simulation.initialize(
            graph.nodes.iter().cloned(),
            graph.links.iter().cloned(),
            width,
            height,
        ) {
            Ok(()) => {
                tracing::info!(
                    symbol = self.symbol.as_deref().unwrap_or("-"),
                    nodes = graph.nodes.len(),
                    links = graph.links.len(),
                    "layout started"
                );
                self.build_error = None;
            }
            Err(error) => self.build_error = Some(error.to_string()),
        }

        if self
            .selected
            .as_deref()
            .is_some_and(|id| !self.simulation.contains(id))
        {
            self.selected = None;
        }
        self.tick = self.simulation.snapshot();
    }

    /// Keeps the view of a model whose dataset was just reloaded. Any drag on
    /// the old simulation ends; the new one starts with nothing held.
    pub(in crate::app) fn take_over_from(&mut self, previous: &mut ViewModel) {
        previous.drag.cancel(&mut previous.simulation);
        self.pan = previous.pan;
        self.zoom = previous.zoom;
    }

    pub(in crate::app) fn select_symbol(&mut self, symbol: String) {
        if self.symbol.as_deref() == Some(symbol.as_str()) {
            return;
        }
        self.symbol = Some(symbol);
        self.rebuild_simulation();
    }

    /// Pushes slider edits into the running simulation and nudges it awake.
    pub(in crate::app) fn apply_config(&mut self) {
        if *self.simulation.config() == self.config {
            return;
        }
        if let Err(error) = self.simulation.set_config(self.config) {
            tracing::warn!(%error, "force settings refused");
            self.config = *self.simulation.config();
            return;
        }
        if self.simulation.alpha() < 0.3 {
            self.simulation.set_alpha(0.3);
        }
    }
}
