use eframe::egui::{Pos2, Vec2};

use crate::routing;
use crate::schema::{Endpoint, RelationshipId};

use super::super::ViewModel;

/// The one active pointer gesture. Exactly one variant holds at a time;
/// starting a new gesture replaces the current one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum PointerMode {
    Idle,
    PanningCanvas { grab: Vec2 },
    DraggingTable { table: crate::schema::TableId },
    AwaitingTarget { source: Endpoint },
}

/// What sits under the pointer, in priority order: connection handles win
/// over table bodies, table bodies win over edges and empty canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum CanvasHit {
    Empty,
    Table(crate::schema::TableId),
    Handle(Endpoint),
    Edge(RelationshipId),
}

#[derive(Clone, Debug)]
pub(in crate::app) struct EdgeMenu {
    pub(in crate::app) relationship: RelationshipId,
    pub(in crate::app) position: Pos2,
}

impl ViewModel {
    pub(in crate::app) fn pointer_pressed(&mut self, hit: CanvasHit, pointer: Pos2) {
        self.edge_menu = None;

        match hit {
            CanvasHit::Handle(end) => self.handle_clicked(end),
            CanvasHit::Table(table) => {
                self.selected_table = Some(table);
                self.mode = PointerMode::DraggingTable { table };
            }
            CanvasHit::Edge(_) => {}
            CanvasHit::Empty => {
                self.selected_table = None;
                self.preview_world = None;
                self.mode = PointerMode::PanningCanvas {
                    grab: self.camera.pan_grab(pointer),
                };
            }
        }
    }

    /// Handle clicks toggle the pending connection source, or complete a
    /// connection when one is already pending.
    pub(in crate::app) fn handle_clicked(&mut self, end: Endpoint) {
        match self.mode {
            PointerMode::AwaitingTarget { source } if source == end => {
                self.mode = PointerMode::Idle;
                self.preview_world = None;
            }
            PointerMode::AwaitingTarget { source } => {
                let color = routing::inherit_color(&self.graph, source, end);
                self.graph.connect(source, end, Some(color));
                self.mode = PointerMode::Idle;
                self.preview_world = None;
            }
            _ => {
                self.mode = PointerMode::AwaitingTarget { source: end };
            }
        }
    }

    pub(in crate::app) fn pointer_moved(&mut self, pointer: Pos2, delta: Vec2) {
        match self.mode {
            PointerMode::Idle => {}
            PointerMode::PanningCanvas { grab } => self.camera.pan_to(pointer, grab),
            PointerMode::DraggingTable { table } => {
                if self.graph.table(table).is_none() {
                    // The table vanished mid-gesture (external replace).
                    self.mode = PointerMode::Idle;
                    return;
                }
                let world_delta = self.camera.screen_delta_to_world(delta);
                self.graph.update_table(table, |table| {
                    table.x += world_delta.x;
                    table.y += world_delta.y;
                });
            }
            PointerMode::AwaitingTarget { source } => {
                if !self.graph.endpoint_resolves(source) {
                    self.mode = PointerMode::Idle;
                    self.preview_world = None;
                    return;
                }
                self.preview_world = Some(self.camera.screen_to_world(pointer));
            }
        }
    }

    /// Pointer-up and pointer-leave end pan and drag gestures. A pending
    /// connection survives both; it is click-driven.
    pub(in crate::app) fn pointer_released(&mut self) {
        match self.mode {
            PointerMode::PanningCanvas { .. } | PointerMode::DraggingTable { .. } => {
                self.mode = PointerMode::Idle;
            }
            PointerMode::Idle | PointerMode::AwaitingTarget { .. } => {}
        }
    }

    pub(in crate::app) fn open_edge_menu(&mut self, relationship: RelationshipId, position: Pos2) {
        if self.graph.relationship(relationship).is_some() {
            self.edge_menu = Some(EdgeMenu {
                relationship,
                position,
            });
        }
    }

    /// Right-click on a connected handle opens the menu for the first
    /// relationship touching that endpoint.
    pub(in crate::app) fn open_handle_menu(&mut self, end: Endpoint, position: Pos2) {
        let touching = self
            .graph
            .relationships
            .iter()
            .find(|rel| rel.touches_endpoint(end))
            .map(|rel| rel.id);
        if let Some(relationship) = touching {
            self.open_edge_menu(relationship, position);
        }
    }
}
