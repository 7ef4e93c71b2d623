use eframe::egui::{self, DragValue, Ui};

use crate::layout::DEFAULT_TABLE_WIDTH;
use crate::schema::{FieldId, FieldType};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Table");
        ui.separator();

        let Some(selected) = self.selected_table else {
            ui.label("Select a table to edit its fields.");
            return;
        };
        let Some(field_ids) = self
            .graph
            .table(selected)
            .map(|table| table.fields.iter().map(|field| field.id).collect::<Vec<_>>())
        else {
            self.selected_table = None;
            ui.label("Select a table to edit its fields.");
            return;
        };

        if let Some(table) = self.graph.table_mut(selected) {
            ui.label("Name");
            ui.text_edit_singleline(&mut table.name);

            ui.label("Description");
            ui.text_edit_multiline(&mut table.description);

            ui.horizontal(|ui| {
                let mut explicit = table.width.is_some();
                if ui.checkbox(&mut explicit, "Explicit width").changed() {
                    table.width = explicit.then_some(DEFAULT_TABLE_WIDTH);
                }
                if let Some(width) = table.width.as_mut() {
                    ui.add(DragValue::new(width).range(120.0..=520.0).speed(2.0));
                }
            });

            let mut has_image = table.image.is_some();
            if ui.checkbox(&mut has_image, "Image attachment").changed() {
                table.image = has_image.then(|| "image".to_owned());
            }
            if let Some(image) = table.image.as_mut() {
                ui.text_edit_singleline(image);
            }
        }

        ui.separator();
        ui.label("Fields");

        let mut removed_field: Option<FieldId> = None;
        for id in field_ids {
            self.graph.update_field(selected, id, |field| {
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut field.name);
                    egui::ComboBox::from_id_salt(("field_type", id))
                        .selected_text(field.field_type.sql_name())
                        .show_ui(ui, |ui| {
                            for field_type in FieldType::ALL {
                                ui.selectable_value(
                                    &mut field.field_type,
                                    field_type,
                                    field_type.sql_name(),
                                );
                            }
                        });
                    if ui.small_button("x").clicked() {
                        removed_field = Some(id);
                    }
                });
                ui.horizontal(|ui| {
                    ui.checkbox(&mut field.primary_key, "PK");
                    ui.checkbox(&mut field.foreign_key, "FK");
                    ui.checkbox(&mut field.nullable, "nullable");
                });
                ui.text_edit_singleline(&mut field.description)
                    .on_hover_text("Field description");
                ui.add_space(4.0);
            });
        }

        if let Some(field) = removed_field {
            // Routed through the graph so the relationship cascade applies.
            self.graph.remove_field(selected, field);
        }

        if ui.button("Add field").clicked() {
            let count = self
                .graph
                .table(selected)
                .map_or(0, |table| table.fields.len());
            self.graph
                .add_field(selected, format!("field{}", count + 1), FieldType::Varchar);
        }

        ui.separator();
        if ui.button("Delete table").clicked() {
            self.graph.remove_table(selected);
            self.selected_table = None;
        }
    }
}
