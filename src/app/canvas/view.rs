use std::collections::HashSet;

use eframe::egui::{
    self, Align2, Color32, CursorIcon, FontId, Pos2, Rect, Sense, Shape, Stroke, StrokeKind, Ui,
    pos2, vec2,
};
use eframe::egui::epaint::CubicBezierShape;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::layout;
use crate::routing::{self, EdgePath, EdgeRoute};
use crate::schema::{Cardinality, Endpoint, Table, TableId};
use crate::util::wrapped_lines;

use super::super::ViewModel;
use super::super::highlight::{HighlightState, build_highlight_state, relationship_matches};
use super::super::render_utils::{
    blend_color, color_from_hex, dim_color, draw_background, with_alpha,
};
use super::interaction::CanvasHit;

const HANDLE_RADIUS: f32 = 4.0;
const HANDLE_HIT_RADIUS: f32 = 7.0;
const EDGE_HIT_DISTANCE: f32 = 6.0;
const EDGE_SAMPLES: usize = 24;
const ARROW_LENGTH: f32 = 10.0;

const BODY_FILL: Color32 = Color32::from_rgb(32, 36, 44);
const HEADER_FILL: Color32 = Color32::from_rgb(45, 51, 62);
const BORDER_COLOR: Color32 = Color32::from_rgb(70, 78, 92);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const HANDLE_COLOR: Color32 = Color32::from_rgb(130, 150, 175);
const TEXT_COLOR: Color32 = Color32::from_gray(230);
const MUTED_TEXT_COLOR: Color32 = Color32::from_gray(160);
const DEFAULT_EDGE_COLOR: Color32 = Color32::from_rgb(140, 150, 165);

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, &self.camera);

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let pointer = ui
                    .input(|input| input.pointer.hover_pos())
                    .unwrap_or_else(|| rect.center());
                self.camera
                    .zoom_by_scroll(scroll, (pointer - rect.min).to_pos2());
            }
        }

        let routes = routing::route_all(&self.graph);
        let local_pointer = ui
            .input(|input| input.pointer.hover_pos())
            .map(|pointer| (pointer - rect.min).to_pos2());
        let hit = local_pointer
            .filter(|_| response.hovered())
            .map(|pointer| self.hit_test(pointer, &routes))
            .unwrap_or(CanvasHit::Empty);

        let primary_pressed = ui.input(|input| input.pointer.primary_pressed());
        let primary_released = ui.input(|input| input.pointer.primary_released());
        let pointer_delta = ui.input(|input| input.pointer.delta());

        if response.hovered()
            && primary_pressed
            && let Some(pointer) = local_pointer
        {
            self.pointer_pressed(hit, pointer);
        }

        if let Some(pointer) = local_pointer {
            self.pointer_moved(pointer, pointer_delta);
        } else {
            // Pointer left the canvas: pan and drag gestures end here.
            self.pointer_released();
        }

        if primary_released {
            self.pointer_released();
        }

        if response.secondary_clicked()
            && let Some(pointer) = local_pointer
        {
            match hit {
                CanvasHit::Edge(relationship) => self.open_edge_menu(relationship, pointer),
                CanvasHit::Handle(end) => self.open_handle_menu(end, pointer),
                _ => self.edge_menu = None,
            }
        }

        match hit {
            CanvasHit::Handle(_) => {
                ui.output_mut(|output| output.cursor_icon = CursorIcon::PointingHand);
            }
            _ => {
                if matches!(self.mode, super::PointerMode::PanningCanvas { .. }) {
                    ui.output_mut(|output| output.cursor_icon = CursorIcon::Grabbing);
                }
            }
        }

        let highlight = self
            .highlighted_color
            .as_deref()
            .map(|color| build_highlight_state(&self.graph, color));
        let search_matches = self.search_matches();

        self.draw_edges(&painter, rect, &routes, highlight.as_ref());
        self.draw_connection_preview(&painter, rect);
        self.draw_tables(&painter, rect, hit, highlight.as_ref(), search_matches.as_ref());
        self.draw_edge_menu(ui, rect);

        if self.mode != super::PointerMode::Idle {
            ui.ctx().request_repaint();
        }
    }

    fn to_screen(&self, rect: Rect, world: Pos2) -> Pos2 {
        rect.min + self.camera.world_to_screen(world).to_vec2()
    }

    fn search_matches(&self) -> Option<HashSet<TableId>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        Some(
            self.graph
                .tables
                .iter()
                .filter(|table| fuzzy_match_score(&matcher, &table.name, query).is_some())
                .map(|table| table.id)
                .collect(),
        )
    }

    fn handle_positions(table: &Table) -> Vec<(Endpoint, Pos2)> {
        let width = layout::table_width(table);
        let mut handles = Vec::with_capacity(table.fields.len() * 2 + 2);

        let header_y = table.y + layout::HEADER_HEIGHT / 2.0;
        handles.push((Endpoint::table(table.id), pos2(table.x, header_y)));
        handles.push((Endpoint::table(table.id), pos2(table.x + width, header_y)));

        for (index, field) in table.fields.iter().enumerate() {
            let y = layout::field_anchor_y(table, index);
            let end = Endpoint::field(table.id, field.id);
            handles.push((end, pos2(table.x, y)));
            handles.push((end, pos2(table.x + width, y)));
        }

        handles
    }

    /// Hit priority: handles, then table bodies (topmost first), then edges.
    fn hit_test(&self, pointer: Pos2, routes: &[EdgeRoute]) -> CanvasHit {
        let hit_radius = HANDLE_HIT_RADIUS * self.camera.zoom.max(1.0);

        for table in self.graph.tables.iter().rev() {
            for (end, world) in Self::handle_positions(table) {
                let screen = self.camera.world_to_screen(world);
                if screen.distance(pointer) <= hit_radius {
                    return CanvasHit::Handle(end);
                }
            }
        }

        for table in self.graph.tables.iter().rev() {
            let world_rect = layout::table_rect(table);
            let screen_rect = Rect::from_min_max(
                self.camera.world_to_screen(world_rect.min),
                self.camera.world_to_screen(world_rect.max),
            );
            if screen_rect.contains(pointer) {
                return CanvasHit::Table(table.id);
            }
        }

        let mut best: Option<(f32, CanvasHit)> = None;
        for route in routes {
            let distance = self.path_min_distance(&route.path, pointer);
            if distance <= EDGE_HIT_DISTANCE
                && best.is_none_or(|(best_distance, _)| distance < best_distance)
            {
                best = Some((distance, CanvasHit::Edge(route.relationship)));
            }
        }
        if let Some((_, hit)) = best {
            return hit;
        }

        CanvasHit::Empty
    }

    fn path_min_distance(&self, path: &EdgePath, pointer: Pos2) -> f32 {
        let mut best = f32::MAX;
        for step in 0..=EDGE_SAMPLES {
            let t = step as f32 / EDGE_SAMPLES as f32;
            let screen = self.camera.world_to_screen(path.point_at(t));
            best = best.min(screen.distance(pointer));
        }
        best
    }

    fn draw_edges(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        routes: &[EdgeRoute],
        highlight: Option<&HighlightState>,
    ) {
        let zoom_sqrt = self.camera.zoom.sqrt();
        let font = FontId::proportional((11.0 * zoom_sqrt).clamp(9.0, 16.0));

        for route in routes {
            let Some(rel) = self.graph.relationship(route.relationship) else {
                continue;
            };

            let base_color = rel
                .color
                .as_deref()
                .and_then(color_from_hex)
                .unwrap_or(DEFAULT_EDGE_COLOR);
            let faded = highlight.is_some()
                && !self
                    .highlighted_color
                    .as_deref()
                    .is_some_and(|color| relationship_matches(rel, color));
            let color = if faded {
                with_alpha(base_color, 46)
            } else {
                base_color
            };
            let stroke = Stroke::new((2.0 * zoom_sqrt).clamp(1.0, 3.6), color);

            match route.path {
                EdgePath::Line { from, to } => {
                    painter.line_segment(
                        [self.to_screen(rect, from), self.to_screen(rect, to)],
                        stroke,
                    );
                }
                EdgePath::Curve {
                    from,
                    control1,
                    control2,
                    to,
                } => {
                    painter.add(CubicBezierShape::from_points_stroke(
                        [
                            self.to_screen(rect, from),
                            self.to_screen(rect, control1),
                            self.to_screen(rect, control2),
                            self.to_screen(rect, to),
                        ],
                        false,
                        Color32::TRANSPARENT,
                        stroke,
                    ));
                }
            }

            let (_, to) = route.path.endpoints();
            draw_arrow(
                painter,
                self.to_screen(rect, to),
                route.arrow_direction,
                color,
                self.camera.zoom,
            );

            if !faded {
                let mid = self.to_screen(rect, route.path.point_at(0.5));
                let text = if rel.label.is_empty() {
                    rel.cardinality.label().to_owned()
                } else {
                    format!("{} {}", rel.cardinality.label(), rel.label)
                };
                painter.text(
                    mid + vec2(0.0, -6.0),
                    Align2::CENTER_BOTTOM,
                    text,
                    font.clone(),
                    MUTED_TEXT_COLOR,
                );
            }
        }
    }

    fn draw_connection_preview(&self, painter: &egui::Painter, rect: Rect) {
        let super::PointerMode::AwaitingTarget { source } = self.mode else {
            return;
        };
        let Some(target_world) = self.preview_world else {
            return;
        };
        let Some(anchor) = routing::preview_anchor(&self.graph, source, target_world) else {
            return;
        };

        let stroke = Stroke::new(1.5, with_alpha(SELECTED_COLOR, 200));
        painter.extend(Shape::dashed_line(
            &[
                self.to_screen(rect, anchor),
                self.to_screen(rect, target_world),
            ],
            stroke,
            8.0,
            5.0,
        ));
    }

    fn draw_tables(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        hit: CanvasHit,
        highlight: Option<&HighlightState>,
        search_matches: Option<&HashSet<TableId>>,
    ) {
        let zoom = self.camera.zoom;
        let name_font = FontId::proportional((14.0 * zoom).clamp(9.0, 28.0));
        let row_font = FontId::proportional((12.0 * zoom).clamp(8.0, 24.0));
        let small_font = FontId::proportional((10.5 * zoom).clamp(7.0, 21.0));

        for table in &self.graph.tables {
            let world_rect = layout::table_rect(table);
            let screen_rect = Rect::from_min_max(
                self.to_screen(rect, world_rect.min),
                self.to_screen(rect, world_rect.max),
            );
            if !screen_rect.intersects(rect) {
                continue;
            }

            let search_miss = search_matches.is_some_and(|matches| !matches.contains(&table.id));
            let dimmed = search_miss
                || highlight.is_some_and(|state| state.table_dimmed(table.id));
            let shade = |color: Color32| if dimmed { dim_color(color, 0.45) } else { color };

            let is_selected = self.selected_table == Some(table.id);
            painter.rect_filled(screen_rect, 4.0, shade(BODY_FILL));

            let header_rect = Rect::from_min_size(
                screen_rect.min,
                vec2(screen_rect.width(), layout::HEADER_HEIGHT * zoom),
            );
            painter.rect_filled(header_rect, 4.0, shade(HEADER_FILL));
            painter.text(
                header_rect.left_center() + vec2(8.0 * zoom, 0.0),
                Align2::LEFT_CENTER,
                &table.name,
                name_font.clone(),
                shade(TEXT_COLOR),
            );

            let border = if is_selected {
                Stroke::new(2.0, SELECTED_COLOR)
            } else {
                Stroke::new(1.0, shade(BORDER_COLOR))
            };
            painter.rect_stroke(screen_rect, 4.0, border, StrokeKind::Outside);

            let mut block_top = world_rect.top() + layout::HEADER_HEIGHT;

            if !table.description.is_empty() {
                let lines = wrapped_lines(&table.description, layout::DESCRIPTION_CHARS_PER_LINE);
                for (index, line) in lines.iter().enumerate() {
                    let world_y = block_top
                        + layout::DESCRIPTION_PADDING / 2.0
                        + index as f32 * layout::DESCRIPTION_LINE_HEIGHT;
                    painter.text(
                        self.to_screen(rect, pos2(table.x + 8.0, world_y)),
                        Align2::LEFT_TOP,
                        line,
                        small_font.clone(),
                        shade(MUTED_TEXT_COLOR),
                    );
                }
                block_top += layout::description_block_height(table);
            }

            if let Some(image) = &table.image {
                let image_rect = Rect::from_min_max(
                    self.to_screen(rect, pos2(table.x + 6.0, block_top + 4.0)),
                    self.to_screen(
                        rect,
                        pos2(
                            table.x + layout::table_width(table) - 6.0,
                            block_top + layout::IMAGE_BLOCK_HEIGHT - 4.0,
                        ),
                    ),
                );
                painter.rect_filled(image_rect, 2.0, shade(Color32::from_rgb(26, 29, 35)));
                painter.text(
                    image_rect.center(),
                    Align2::CENTER_CENTER,
                    image,
                    small_font.clone(),
                    shade(MUTED_TEXT_COLOR),
                );
            }

            for (index, field) in table.fields.iter().enumerate() {
                if index % 2 == 1 {
                    let row = layout::field_row_rect(table, index);
                    let row_rect = Rect::from_min_max(
                        self.to_screen(rect, row.min),
                        self.to_screen(rect, row.max),
                    );
                    painter.rect_filled(
                        row_rect,
                        0.0,
                        Color32::from_rgba_unmultiplied(255, 255, 255, 5),
                    );
                }

                let anchor_y = layout::field_anchor_y(table, index);
                let name_color = if field.primary_key {
                    shade(SELECTED_COLOR)
                } else {
                    shade(TEXT_COLOR)
                };
                painter.text(
                    self.to_screen(rect, pos2(table.x + 10.0, anchor_y)),
                    Align2::LEFT_CENTER,
                    &field.name,
                    row_font.clone(),
                    name_color,
                );

                let mut annotation = field.field_type.sql_name().to_owned();
                if field.primary_key {
                    annotation.push_str(" PK");
                }
                if field.foreign_key {
                    annotation.push_str(" FK");
                }
                if !field.nullable {
                    annotation.push('!');
                }
                painter.text(
                    self.to_screen(
                        rect,
                        pos2(table.x + layout::table_width(table) - 10.0, anchor_y),
                    ),
                    Align2::RIGHT_CENTER,
                    annotation,
                    small_font.clone(),
                    shade(MUTED_TEXT_COLOR),
                );
            }

            for (end, world) in Self::handle_positions(table) {
                let position = self.to_screen(rect, world);
                let pending_source = matches!(
                    self.mode,
                    super::PointerMode::AwaitingTarget { source } if source == end
                );
                let hovered = hit == CanvasHit::Handle(end);
                let color = if pending_source {
                    SELECTED_COLOR
                } else if hovered {
                    blend_color(HANDLE_COLOR, SELECTED_COLOR, 0.6)
                } else {
                    shade(HANDLE_COLOR)
                };
                let radius = (HANDLE_RADIUS * zoom).clamp(3.0, 9.0);
                painter.circle_filled(position, radius, color);
                painter.circle_stroke(
                    position,
                    radius,
                    Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
                );
            }
        }
    }

    fn draw_edge_menu(&mut self, ui: &Ui, rect: Rect) {
        let Some(menu) = self.edge_menu.clone() else {
            return;
        };
        let Some(rel) = self.graph.relationship(menu.relationship).cloned() else {
            self.edge_menu = None;
            return;
        };

        let mut close = false;
        egui::Area::new(egui::Id::new("edge_menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(rect.min + menu.position.to_vec2())
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(230.0);
                    ui.label("Relationship");

                    ui.horizontal(|ui| {
                        for cardinality in Cardinality::ALL {
                            let active = rel.cardinality == cardinality;
                            if ui.selectable_label(active, cardinality.label()).clicked() {
                                if let Some(rel) = self.graph.relationship_mut(menu.relationship) {
                                    rel.cardinality = cardinality;
                                }
                            }
                        }
                    });

                    if let Some(rel) = self.graph.relationship_mut(menu.relationship) {
                        ui.text_edit_singleline(&mut rel.label);
                    }

                    ui.horizontal_wrapped(|ui| {
                        for hex in routing::PALETTE {
                            let Some(color) = color_from_hex(hex) else {
                                continue;
                            };
                            let current = rel.color.as_deref() == Some(hex);
                            let mut button = egui::Button::new("  ").fill(color);
                            if current {
                                button = button.stroke(Stroke::new(2.0, TEXT_COLOR));
                            }
                            if ui.add(button).clicked()
                                && let Some(rel) = self.graph.relationship_mut(menu.relationship)
                            {
                                rel.color = Some(hex.to_owned());
                            }
                        }
                    });

                    ui.separator();
                    if ui.button("Highlight flow").clicked() {
                        self.highlighted_color = rel.color.clone();
                        close = true;
                    }
                    if ui.button("Delete relationship").clicked() {
                        self.graph.remove_relationship(menu.relationship);
                        close = true;
                    }
                });
            });

        if close {
            self.edge_menu = None;
        }
    }
}

fn draw_arrow(
    painter: &egui::Painter,
    tip: Pos2,
    direction: eframe::egui::Vec2,
    color: Color32,
    zoom: f32,
) {
    let length = (ARROW_LENGTH * zoom).clamp(6.0, 18.0);
    let perpendicular = vec2(-direction.y, direction.x);
    let base = tip - direction * length;
    painter.add(Shape::convex_polygon(
        vec![
            tip,
            base + perpendicular * (length * 0.4),
            base - perpendicular * (length * 0.4),
        ],
        color,
        Stroke::NONE,
    ));
}
