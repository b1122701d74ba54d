use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context as _;
use collab_graph::insights::{Insight, evaluate_team};
use collab_graph::interaction::{DragCapture, InteractionState};
use collab_graph::layout::{Camera, LayoutCache, OrbitLayout};
use collab_graph::metrics::TeamSnapshot;
use collab_graph::{EngineConfig, WorkItem, load_items};
use eframe::egui::{self, Context};
use tracing::{info, warn};

mod graph;
mod render_utils;
mod ui;

/// Where the viewer reads its work items from; re-read on reload.
#[derive(Clone, Debug)]
pub struct DataSource {
    pub items: PathBuf,
    pub previous: Option<PathBuf>,
}

pub struct DashboardApp {
    source: DataSource,
    config: EngineConfig,
    preselect: Option<String>,
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

struct Dataset {
    items: Vec<WorkItem>,
    previous: Option<Vec<WorkItem>>,
    team: TeamSnapshot,
    team_insights: Vec<Insight>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewMode {
    Sphere,
    Orbit,
}

struct ViewModel {
    dataset: Dataset,
    config: EngineConfig,
    view_mode: ViewMode,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    interaction: InteractionState,
    camera: Camera,
    layout_cache: LayoutCache,
    sphere_zoom: f32,
    sphere_drag: DragCapture,
    orbit: Option<OrbitLayout>,
    orbit_drag: DragCapture,
    member_panel_cache: Option<MemberPanelCache>,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

struct MemberPanelCache {
    member: usize,
    insights: Vec<Insight>,
}

impl Dataset {
    fn load(source: &DataSource) -> anyhow::Result<Self> {
        let items = load_items(&source.items)
            .with_context(|| format!("failed to load {}", source.items.display()))?;
        let previous = match &source.previous {
            Some(path) => Some(
                load_items(path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
            ),
            None => None,
        };

        let team = TeamSnapshot::compute(&items);
        let team_insights = evaluate_team(&team);
        info!(
            members = team.graph.node_count(),
            edges = team.graph.edge_count(),
            "dataset ready"
        );
        Ok(Self {
            items,
            previous,
            team,
            team_insights,
        })
    }
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: DataSource,
        config: EngineConfig,
        preselect: Option<String>,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            config,
            preselect,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: DataSource) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = Dataset::load(&source).map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                warn!(%error, "dataset load failed");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: DataSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready(&mut self, dataset: Dataset) -> AppState {
        let mut model = ViewModel::new(dataset, self.config);
        if let Some(member) = self.preselect.take() {
            model.select_member(&member);
        }
        AppState::Ready(Box::new(model))
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut loaded = None;
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    loaded = Some(result);
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading work items...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load work items");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            self.preselect = model.selected_name();
                            loaded = Some(result);
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

        if let Some(result) = loaded {
            transition = Some(match result {
                Ok(dataset) => self.ready(dataset),
                Err(error) => AppState::Error(error),
            });
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
