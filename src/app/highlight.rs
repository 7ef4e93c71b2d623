use std::collections::HashSet;

use crate::schema::{Relationship, SchemaGraph, TableId};

/// Display-only focus filter: with an active highlight color, relationships
/// of other colors render faded and tables with no matching relationship
/// render dimmed. The graph itself is never mutated.
pub(super) struct HighlightState {
    dimmed_tables: HashSet<TableId>,
}

impl HighlightState {
    pub(super) fn table_dimmed(&self, table: TableId) -> bool {
        self.dimmed_tables.contains(&table)
    }
}

pub(super) fn relationship_matches(rel: &Relationship, color: &str) -> bool {
    rel.color.as_deref() == Some(color)
}

pub(super) fn build_highlight_state(graph: &SchemaGraph, color: &str) -> HighlightState {
    let mut lit = HashSet::new();
    for rel in &graph.relationships {
        if relationship_matches(rel, color) {
            lit.insert(rel.source.table);
            lit.insert(rel.target.table);
        }
    }

    let dimmed_tables = graph
        .tables
        .iter()
        .map(|table| table.id)
        .filter(|id| !lit.contains(id))
        .collect();

    HighlightState { dimmed_tables }
}
