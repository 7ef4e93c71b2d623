use eframe::egui::{Pos2, Vec2, pos2, vec2};

use crate::geometry;
use crate::layout;
use crate::schema::{Endpoint, Relationship, RelationshipId, SchemaGraph, Table, TableId};
use crate::util::stable_index;

pub const PALETTE: [&str; 8] = [
    "#e06c75", "#e5a254", "#e8c964", "#79b56f", "#56b6c2", "#5c9ce6", "#9a7de0", "#d46ac2",
];

const CONTROL_OFFSET: f32 = 56.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgePath {
    Line {
        from: Pos2,
        to: Pos2,
    },
    Curve {
        from: Pos2,
        control1: Pos2,
        control2: Pos2,
        to: Pos2,
    },
}

impl EdgePath {
    pub fn endpoints(&self) -> (Pos2, Pos2) {
        match *self {
            Self::Line { from, to } | Self::Curve { from, to, .. } => (from, to),
        }
    }

    pub fn point_at(&self, t: f32) -> Pos2 {
        match *self {
            Self::Line { from, to } => from + (to - from) * t,
            Self::Curve {
                from,
                control1,
                control2,
                to,
            } => {
                let u = 1.0 - t;
                let a = u * u * u;
                let b = 3.0 * u * u * t;
                let c = 3.0 * u * t * t;
                let d = t * t * t;
                pos2(
                    a * from.x + b * control1.x + c * control2.x + d * to.x,
                    a * from.y + b * control1.y + c * control2.y + d * to.y,
                )
            }
        }
    }
}

/// A renderable route for one relationship, in world coordinates.
#[derive(Clone, Debug)]
pub struct EdgeRoute {
    pub relationship: RelationshipId,
    pub path: EdgePath,
    /// Unit vector pointing into the target anchor.
    pub arrow_direction: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn outward(self) -> Vec2 {
        match self {
            Self::Left => vec2(-1.0, 0.0),
            Self::Right => vec2(1.0, 0.0),
        }
    }

    fn edge_x(self, table: &Table) -> f32 {
        match self {
            Self::Left => table.x,
            Self::Right => table.x + layout::table_width(table),
        }
    }
}

/// Exit edges for the two endpoints of a curve: each side faces the other
/// table's center. Ties resolve to source-right / target-left.
pub fn facing_sides(source: &Table, target: &Table) -> (Side, Side) {
    let source_center = layout::table_rect(source).center();
    let target_center = layout::table_rect(target).center();
    if target_center.x >= source_center.x {
        (Side::Right, Side::Left)
    } else {
        (Side::Left, Side::Right)
    }
}

fn endpoint_anchor(graph: &SchemaGraph, table: &Table, end: Endpoint, side: Side) -> Option<Pos2> {
    match end.field {
        Some(field) => {
            let index = graph.field_index(end.table, field)?;
            Some(pos2(side.edge_x(table), layout::field_anchor_y(table, index)))
        }
        // A whole-table end of a curve attaches at the facing edge's middle.
        None => Some(pos2(side.edge_x(table), layout::table_rect(table).center().y)),
    }
}

fn unit_or(direction: Vec2, fallback: Vec2) -> Vec2 {
    let length = direction.length();
    if length <= f32::EPSILON {
        fallback
    } else {
        direction / length
    }
}

/// Computes the visual path for one relationship, or `None` when either
/// endpoint no longer resolves (dangling references are not renderable).
pub fn route_relationship(graph: &SchemaGraph, rel: &Relationship) -> Option<EdgeRoute> {
    let source_table = graph.table(rel.source.table)?;
    let target_table = graph.table(rel.target.table)?;

    if rel.source.field.is_none() && rel.target.field.is_none() {
        let source_size = layout::table_size(source_table);
        let target_size = layout::table_size(target_table);
        let source_center =
            geometry::center(source_table.x, source_table.y, source_size.x, source_size.y);
        let target_center =
            geometry::center(target_table.x, target_table.y, target_size.x, target_size.y);
        let from = geometry::intersection(source_center, source_size, target_center);
        let to = geometry::intersection(target_center, target_size, source_center);
        return Some(EdgeRoute {
            relationship: rel.id,
            path: EdgePath::Line { from, to },
            arrow_direction: unit_or(to - from, vec2(1.0, 0.0)),
        });
    }

    let (source_side, target_side) = facing_sides(source_table, target_table);
    let from = endpoint_anchor(graph, source_table, rel.source, source_side)?;
    let to = endpoint_anchor(graph, target_table, rel.target, target_side)?;
    let control1 = from + source_side.outward() * CONTROL_OFFSET;
    let control2 = to + target_side.outward() * CONTROL_OFFSET;

    Some(EdgeRoute {
        relationship: rel.id,
        path: EdgePath::Curve {
            from,
            control1,
            control2,
            to,
        },
        arrow_direction: unit_or(to - control2, vec2(1.0, 0.0)),
    })
}

/// Anchor for the preview line of an in-progress connection: the endpoint's
/// anchor on whichever edge faces the pointer.
pub fn preview_anchor(graph: &SchemaGraph, end: Endpoint, toward: Pos2) -> Option<Pos2> {
    let table = graph.table(end.table)?;
    let side = if toward.x >= layout::table_rect(table).center().x {
        Side::Right
    } else {
        Side::Left
    };
    endpoint_anchor(graph, table, end, side)
}

pub fn route_all(graph: &SchemaGraph) -> Vec<EdgeRoute> {
    graph
        .relationships
        .iter()
        .filter_map(|rel| route_relationship(graph, rel))
        .collect()
}

fn color_of_touching_endpoint(graph: &SchemaGraph, end: Endpoint) -> Option<String> {
    graph.relationships.iter().find_map(|rel| {
        if rel.touches_endpoint(end) {
            rel.color.clone()
        } else {
            None
        }
    })
}

fn color_of_touching_table(graph: &SchemaGraph, table: TableId) -> Option<String> {
    graph.relationships.iter().find_map(|rel| {
        if rel.touches_table(table) {
            rel.color.clone()
        } else {
            None
        }
    })
}

/// Color for a relationship about to be created. Priority: a relationship
/// already touching the source field, then the target field, then the source
/// table, then the target table; otherwise a stable palette pick keyed on
/// the endpoint pair.
pub fn inherit_color(graph: &SchemaGraph, source: Endpoint, target: Endpoint) -> String {
    if source.field.is_some()
        && let Some(color) = color_of_touching_endpoint(graph, source)
    {
        return color;
    }
    if target.field.is_some()
        && let Some(color) = color_of_touching_endpoint(graph, target)
    {
        return color;
    }
    if let Some(color) = color_of_touching_table(graph, source.table) {
        return color;
    }
    if let Some(color) = color_of_touching_table(graph, target.table) {
        return color;
    }

    PALETTE[stable_index(&(source, target), PALETTE.len())].to_owned()
}

#[cfg(test)]
mod tests {
    use crate::schema::{FieldId, FieldType, TableId};

    use super::*;

    fn two_tables(target_x: f32) -> (SchemaGraph, TableId, FieldId, TableId, FieldId) {
        let mut graph = SchemaGraph::new();
        let left = graph.add_table("Users", 0.0, 0.0);
        let left_field = graph.add_field(left, "id", FieldType::Uuid).unwrap();
        let right = graph.add_table("Posts", target_x, 40.0);
        let right_field = graph.add_field(right, "user_id", FieldType::Uuid).unwrap();
        (graph, left, left_field, right, right_field)
    }

    #[test]
    fn field_route_exits_the_facing_edges() {
        let (mut graph, users, users_id, posts, posts_user_id) = two_tables(500.0);
        graph
            .connect(
                Endpoint::field(users, users_id),
                Endpoint::field(posts, posts_user_id),
                None,
            )
            .unwrap();

        let routes = route_all(&graph);
        assert_eq!(routes.len(), 1);
        let EdgePath::Curve { from, to, .. } = routes[0].path else {
            panic!("expected a curve for a field-level relationship");
        };

        let users_table = graph.table(users).unwrap();
        let posts_table = graph.table(posts).unwrap();
        assert_eq!(from.x, users_table.x + layout::table_width(users_table));
        assert_eq!(to.x, posts_table.x);
        assert_eq!(from.y, layout::field_anchor_y(users_table, 0));
        assert_eq!(to.y, layout::field_anchor_y(posts_table, 0));
    }

    #[test]
    fn sides_swap_when_target_is_left_of_source() {
        let (mut graph, users, users_id, posts, posts_user_id) = two_tables(-500.0);
        graph
            .connect(
                Endpoint::field(users, users_id),
                Endpoint::field(posts, posts_user_id),
                None,
            )
            .unwrap();

        let routes = route_all(&graph);
        let EdgePath::Curve { from, to, .. } = routes[0].path else {
            panic!("expected a curve");
        };
        let users_table = graph.table(users).unwrap();
        let posts_table = graph.table(posts).unwrap();
        assert_eq!(from.x, users_table.x);
        assert_eq!(to.x, posts_table.x + layout::table_width(posts_table));
    }

    #[test]
    fn table_route_is_a_boundary_to_boundary_line() {
        let (mut graph, users, _, posts, _) = two_tables(500.0);
        graph
            .connect(Endpoint::table(users), Endpoint::table(posts), None)
            .unwrap();

        let routes = route_all(&graph);
        let EdgePath::Line { from, to } = routes[0].path else {
            panic!("expected a line for a table-level relationship");
        };
        let users_rect = layout::table_rect(graph.table(users).unwrap());
        let posts_rect = layout::table_rect(graph.table(posts).unwrap());
        assert!(!users_rect.shrink(0.1).contains(from));
        assert!(!posts_rect.shrink(0.1).contains(to));
        assert!(routes[0].arrow_direction.x > 0.0);
    }

    #[test]
    fn dangling_relationship_is_not_routed() {
        let (mut graph, users, users_id, posts, posts_user_id) = two_tables(500.0);
        graph
            .connect(
                Endpoint::field(users, users_id),
                Endpoint::field(posts, posts_user_id),
                None,
            )
            .unwrap();

        // Bypass the cascade to simulate a reference that no longer resolves.
        graph.update_table(users, |table| table.fields.clear());
        assert_eq!(graph.relationships.len(), 1);
        assert!(route_all(&graph).is_empty());
    }

    #[test]
    fn curve_point_at_hits_both_endpoints() {
        let path = EdgePath::Curve {
            from: pos2(0.0, 0.0),
            control1: pos2(50.0, 0.0),
            control2: pos2(50.0, 100.0),
            to: pos2(100.0, 100.0),
        };
        assert_eq!(path.point_at(0.0), pos2(0.0, 0.0));
        assert_eq!(path.point_at(1.0), pos2(100.0, 100.0));
    }

    #[test]
    fn color_inherits_from_source_field_first() {
        let (mut graph, users, users_id, posts, posts_user_id) = two_tables(500.0);
        let tags = graph.add_table("Tags", 0.0, 600.0);
        let tags_id = graph.add_field(tags, "id", FieldType::Int).unwrap();
        graph
            .connect(
                Endpoint::field(users, users_id),
                Endpoint::field(tags, tags_id),
                Some("#e06c75".to_owned()),
            )
            .unwrap();

        let color = inherit_color(
            &graph,
            Endpoint::field(users, users_id),
            Endpoint::field(posts, posts_user_id),
        );
        assert_eq!(color, "#e06c75");
    }

    #[test]
    fn color_falls_back_to_table_touch() {
        let (mut graph, users, users_id, posts, posts_user_id) = two_tables(500.0);
        let tags = graph.add_table("Tags", 0.0, 600.0);
        graph
            .connect(
                Endpoint::table(users),
                Endpoint::table(tags),
                Some("#79b56f".to_owned()),
            )
            .unwrap();

        // The new connection's fields are untouched, but its source table is.
        let color = inherit_color(
            &graph,
            Endpoint::field(users, users_id),
            Endpoint::field(posts, posts_user_id),
        );
        assert_eq!(color, "#79b56f");
    }

    #[test]
    fn unconnected_tables_get_a_palette_color() {
        let (graph, users, users_id, posts, posts_user_id) = two_tables(500.0);
        let color = inherit_color(
            &graph,
            Endpoint::field(users, users_id),
            Endpoint::field(posts, posts_user_id),
        );
        assert!(PALETTE.contains(&color.as_str()));

        let again = inherit_color(
            &graph,
            Endpoint::field(users, users_id),
            Endpoint::field(posts, posts_user_id),
        );
        assert_eq!(color, again);
    }
}
