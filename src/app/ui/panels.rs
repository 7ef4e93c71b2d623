use eframe::egui::{self, Align, Context, Layout, pos2};

use crate::schema::SchemaGraph;

use super::super::camera::Camera;
use super::super::canvas::PointerMode;
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(graph: SchemaGraph, io_path: String) -> Self {
        Self {
            graph,
            camera: Camera::default(),
            mode: PointerMode::Idle,
            selected_table: None,
            highlighted_color: None,
            edge_menu: None,
            preview_world: None,
            search: String::new(),
            io_path,
            status: None,
            spawned_tables: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        is_loading: bool,
        load_request: &mut Option<String>,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("erdraft");
                    ui.separator();
                    ui.label(format!("tables: {}", self.graph.tables.len()));
                    ui.label(format!(
                        "relationships: {}",
                        self.graph.relationships.len()
                    ));
                    if ui.button("Add table").clicked() {
                        self.spawn_table();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("zoom: {:.0}%", self.camera.zoom * 100.0));
                        if let Some(color) = self.highlighted_color.clone() {
                            if ui.button("Clear highlight").clicked() {
                                self.highlighted_color = None;
                            }
                            ui.label(format!("flow: {color}"));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui, is_loading, load_request));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading diagram...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_canvas(ui);
            }
        });
    }

    /// New tables land on a staggered diagonal near the top-left of the
    /// current view, so consecutive additions do not stack exactly.
    pub(in crate::app) fn spawn_table(&mut self) {
        let step = (self.spawned_tables % 8) as f32 * 28.0;
        let world = self
            .camera
            .screen_to_world(pos2(140.0 + step, 110.0 + step));
        let name = format!("Table{}", self.spawned_tables + 1);
        let id = self.graph.add_table(name, world.x, world.y);
        self.spawned_tables += 1;
        self.selected_table = Some(id);
    }
}
