use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2};

use crate::schema::{DiagramDocument, SchemaGraph, TableId, load_document};

mod camera;
mod canvas;
mod highlight;
mod render_utils;
mod ui;

use self::camera::Camera;
use self::canvas::{EdgeMenu, PointerMode};

pub struct EditorApp {
    state: AppState,
    load_rx: Option<LoadReceiver>,
}

type LoadReceiver = Receiver<Result<DiagramDocument, String>>;

enum AppState {
    Loading { path: String, rx: LoadReceiver },
    Ready(Box<ViewModel>),
    Error { path: String, message: String },
}

struct ViewModel {
    graph: SchemaGraph,
    camera: Camera,
    mode: PointerMode,
    selected_table: Option<TableId>,
    highlighted_color: Option<String>,
    edge_menu: Option<EdgeMenu>,
    preview_world: Option<Pos2>,
    search: String,
    io_path: String,
    status: Option<StatusLine>,
    spawned_tables: usize,
}

struct StatusLine {
    message: String,
    is_error: bool,
}

impl ViewModel {
    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(StatusLine {
            message: message.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(StatusLine {
            message: message.into(),
            is_error: true,
        });
    }

    /// Whole-graph replacement from import or an external generator. Any
    /// in-progress gesture now refers to ids that may no longer resolve; the
    /// pointer handlers fall back to Idle when they notice.
    fn apply_document(&mut self, document: DiagramDocument) {
        let tables = document.tables.len();
        let relationships = document.relationships.len();
        document.apply_to(&mut self.graph);
        self.selected_table = None;
        self.edge_menu = None;
        self.highlighted_color = None;
        self.set_status(format!(
            "Loaded {tables} tables and {relationships} relationships"
        ));
    }
}

impl EditorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, file: Option<PathBuf>) -> Self {
        let state = match file {
            Some(path) => Self::start_load(path.display().to_string()),
            None => AppState::Ready(Box::new(ViewModel::new(SchemaGraph::new(), String::new()))),
        };
        Self {
            state,
            load_rx: None,
        }
    }

    fn spawn_load(path: String) -> LoadReceiver {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result =
                load_document(path.as_ref()).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(path.clone()),
            path,
        }
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { path, rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(document) => {
                            let mut model = ViewModel::new(SchemaGraph::new(), path.clone());
                            model.apply_document(document);
                            AppState::Ready(Box::new(model))
                        }
                        Err(message) => AppState::Error {
                            path: path.clone(),
                            message,
                        },
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading diagram...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error { path, message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load diagram");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Retry").clicked() {
                            transition = Some(Self::start_load(path.clone()));
                        }
                        if ui.button("Start empty").clicked() {
                            transition = Some(AppState::Ready(Box::new(ViewModel::new(
                                SchemaGraph::new(),
                                path.clone(),
                            ))));
                        }
                    });
                });
            }
            AppState::Ready(model) => {
                let mut load_request = None;
                let is_loading = self.load_rx.is_some();
                model.show(ctx, is_loading, &mut load_request);

                if let Some(path) = load_request
                    && self.load_rx.is_none()
                {
                    model.io_path = path.clone();
                    self.load_rx = Some(Self::spawn_load(path));
                }

                if let Some(rx) = self.load_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(document)) => model.apply_document(document),
                        Ok(Err(message)) => model.set_error(message),
                        Err(TryRecvError::Empty) => {
                            self.load_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.set_error("Background load worker disconnected");
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.load_rx = None;
            self.state = next_state;
        }
    }
}
