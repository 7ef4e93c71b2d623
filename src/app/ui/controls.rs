use std::path::{Path, PathBuf};

use eframe::egui::{Color32, Ui};

use crate::schema::{save_ddl, save_document};

use super::super::ViewModel;

fn ddl_path(io_path: &str) -> PathBuf {
    Path::new(io_path).with_extension("sql")
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(
        &mut self,
        ui: &mut Ui,
        is_loading: bool,
        load_request: &mut Option<String>,
    ) {
        ui.heading("Diagram");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search tables")
            .on_hover_text("Fuzzy-highlight matching tables without changing the diagram.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();

        ui.label("Tables");
        let mut clicked_table = None;
        for table in &self.graph.tables {
            let selected = self.selected_table == Some(table.id);
            let label = if table.fields.is_empty() {
                table.name.clone()
            } else {
                format!("{} ({})", table.name, table.fields.len())
            };
            if ui.selectable_label(selected, label).clicked() {
                clicked_table = Some(table.id);
            }
        }
        if let Some(id) = clicked_table {
            self.selected_table = Some(id);
        }
        if ui.button("Add table").clicked() {
            self.spawn_table();
        }

        ui.separator();

        ui.label("Diagram file");
        ui.text_edit_singleline(&mut self.io_path)
            .on_hover_text("Path for import and export (JSON; DDL export swaps in .sql).");

        ui.horizontal(|ui| {
            let import =
                ui.add_enabled(!is_loading, eframe::egui::Button::new("Import"));
            if import.clicked() {
                if self.io_path.trim().is_empty() {
                    self.set_error("Set a diagram file path first");
                } else {
                    *load_request = Some(self.io_path.trim().to_owned());
                }
            }

            if ui.button("Export JSON").clicked() {
                let path = self.io_path.trim().to_owned();
                if path.is_empty() {
                    self.set_error("Set a diagram file path first");
                } else {
                    match save_document(Path::new(&path), &self.graph) {
                        Ok(()) => self.set_status(format!("Saved {path}")),
                        Err(error) => self.set_error(format!("{error:#}")),
                    }
                }
            }

            if ui.button("Export SQL").clicked() {
                let path = self.io_path.trim().to_owned();
                if path.is_empty() {
                    self.set_error("Set a diagram file path first");
                } else {
                    let path = ddl_path(&path);
                    match save_ddl(&path, &self.graph) {
                        Ok(()) => self.set_status(format!("Saved {}", path.display())),
                        Err(error) => self.set_error(format!("{error:#}")),
                    }
                }
            }
        });

        if is_loading {
            ui.spinner();
        }

        if let Some(status) = &self.status {
            ui.add_space(6.0);
            let color = if status.is_error {
                Color32::from_rgb(235, 120, 110)
            } else {
                Color32::from_gray(190)
            };
            ui.colored_label(color, &status.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_path_swaps_the_extension() {
        assert_eq!(ddl_path("diagram.json"), PathBuf::from("diagram.sql"));
        assert_eq!(ddl_path("diagram"), PathBuf::from("diagram.sql"));
    }
}
