use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use corr_graph::dataset::{Dataset, load_dataset};
use corr_graph::{DragController, Simulation, SimulationConfig, Tick};
use eframe::egui::{self, Context, Vec2};

mod graph;
mod render_utils;
mod ui;

/// Startup options handed over from the command line.
#[derive(Clone, Debug)]
pub struct ViewerSettings {
    pub input: PathBuf,
    pub symbol: Option<String>,
    pub config: SimulationConfig,
    pub width: f64,
    pub height: f64,
}

pub struct CorrGraphApp {
    settings: ViewerSettings,
    state: AppState,
    reload_rx: Option<Receiver<Result<Dataset, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    dataset: Dataset,
    symbol: Option<String>,
    simulation: Simulation,
    drag: DragController,
    config: SimulationConfig,
    canvas_size: (f64, f64),
    tick: Tick,
    build_error: Option<String>,
    graph_revision: u64,
    selected: Option<String>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    node_radius: f32,
    show_labels: bool,
    show_quadtree_overlay: bool,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<String>>,
}

impl CorrGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: ViewerSettings) -> Self {
        let state = Self::start_load(settings.input.clone());
        Self {
            settings,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(input: PathBuf) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&input).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(input: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(input),
        }
    }

    fn ready(settings: &ViewerSettings, dataset: Dataset, previous: Option<&ViewModel>) -> AppState {
        let symbol = previous
            .and_then(|model| model.symbol.clone())
            .or_else(|| settings.symbol.clone());
        let config = previous.map_or(settings.config, |model| model.config);
        let canvas_size =
            previous.map_or((settings.width, settings.height), |model| model.canvas_size);
        AppState::Ready(Box::new(ViewModel::new(dataset, symbol, config, canvas_size)))
    }
}

impl eframe::App for CorrGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(dataset) => Self::ready(&self.settings, dataset, None),
                        Err(error) => {
                            tracing::error!(%error, "dataset load failed");
                            AppState::Error(error)
                        }
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading correlation graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load correlation graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.settings.input.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.settings.input, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.settings.input.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(dataset)) => {
                            let mut next = Self::ready(&self.settings, dataset, Some(&**model));
                            if let AppState::Ready(next_model) = &mut next {
                                next_model.take_over_from(model);
                            }
                            transition = Some(next);
                        }
                        Ok(Err(error)) => {
                            tracing::error!(%error, "dataset reload failed");
                            transition = Some(AppState::Error(error));
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
