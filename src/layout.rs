use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::schema::Table;
use crate::util::wrapped_line_count;

pub const DEFAULT_TABLE_WIDTH: f32 = 220.0;
pub const HEADER_HEIGHT: f32 = 32.0;
pub const ROW_HEIGHT: f32 = 24.0;
pub const FIELDS_PADDING: f32 = 6.0;
pub const BOTTOM_PADDING: f32 = 8.0;
pub const DESCRIPTION_CHARS_PER_LINE: usize = 30;
pub const DESCRIPTION_LINE_HEIGHT: f32 = 15.0;
pub const DESCRIPTION_PADDING: f32 = 8.0;
pub const IMAGE_BLOCK_HEIGHT: f32 = 72.0;

pub fn table_width(table: &Table) -> f32 {
    table.width.unwrap_or(DEFAULT_TABLE_WIDTH)
}

pub fn description_block_height(table: &Table) -> f32 {
    let lines = wrapped_line_count(&table.description, DESCRIPTION_CHARS_PER_LINE);
    if lines == 0 {
        0.0
    } else {
        lines as f32 * DESCRIPTION_LINE_HEIGHT + DESCRIPTION_PADDING
    }
}

pub fn image_block_height(table: &Table) -> f32 {
    if table.image.is_some() {
        IMAGE_BLOCK_HEIGHT
    } else {
        0.0
    }
}

/// Vertical offset from the table's top edge to the first field row.
pub fn fields_top(table: &Table) -> f32 {
    HEADER_HEIGHT + description_block_height(table) + image_block_height(table) + FIELDS_PADDING
}

pub fn table_size(table: &Table) -> Vec2 {
    vec2(
        table_width(table),
        fields_top(table) + table.fields.len() as f32 * ROW_HEIGHT + BOTTOM_PADDING,
    )
}

pub fn table_rect(table: &Table) -> Rect {
    Rect::from_min_size(pos2(table.x, table.y), table_size(table))
}

pub fn field_row_rect(table: &Table, field_index: usize) -> Rect {
    let top = table.y + fields_top(table) + field_index as f32 * ROW_HEIGHT;
    Rect::from_min_size(pos2(table.x, top), vec2(table_width(table), ROW_HEIGHT))
}

/// World-space y of a field's connection anchor, centered in its row.
pub fn field_anchor_y(table: &Table, field_index: usize) -> f32 {
    table.y + fields_top(table) + field_index as f32 * ROW_HEIGHT + ROW_HEIGHT / 2.0
}
