use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ddl::generate_ddl;
use super::graph::{Relationship, SchemaGraph, Table};

/// The on-disk / wire shape of a diagram. The same document feeds the file
/// import path and whole-graph replacement from external generators.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
}

impl DiagramDocument {
    pub fn from_graph(graph: &SchemaGraph) -> Self {
        Self {
            tables: graph.tables.clone(),
            relationships: graph.relationships.clone(),
        }
    }

    pub fn apply_to(self, graph: &mut SchemaGraph) {
        graph.replace(self.tables, self.relationships);
    }
}

pub fn parse_document(raw: &str) -> Result<DiagramDocument> {
    let parsed: Value = serde_json::from_str(raw).context("diagram is not valid JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("diagram document must be a JSON object"))?;

    for key in ["tables", "relationships"] {
        if !object.get(key).is_some_and(Value::is_array) {
            return Err(anyhow!("diagram document is missing a \"{key}\" array"));
        }
    }

    DiagramDocument::deserialize(&parsed).context("diagram document has malformed entries")
}

pub fn document_to_json(document: &DiagramDocument) -> Result<String> {
    serde_json::to_string_pretty(document).context("failed to serialize diagram document")
}

pub fn load_document(path: &Path) -> Result<DiagramDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&raw)
}

pub fn save_document(path: &Path, graph: &SchemaGraph) -> Result<()> {
    let json = document_to_json(&DiagramDocument::from_graph(graph))?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub fn save_ddl(path: &Path, graph: &SchemaGraph) -> Result<()> {
    fs::write(path, generate_ddl(graph))
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::super::graph::{Endpoint, FieldType};
    use super::*;

    fn sample_graph() -> SchemaGraph {
        let mut graph = SchemaGraph::new();
        let users = graph.add_table("Users", 12.0, 34.0);
        let users_id = graph.add_field(users, "id", FieldType::Uuid).unwrap();
        graph.update_field(users, users_id, |field| field.primary_key = true);
        graph.update_table(users, |table| {
            table.description = "People with accounts".to_owned();
            table.width = Some(260.0);
        });
        let posts = graph.add_table("Posts", 420.0, 60.0);
        let posts_user_id = graph.add_field(posts, "user_id", FieldType::Uuid).unwrap();
        graph.connect(
            Endpoint::field(users, users_id),
            Endpoint::field(posts, posts_user_id),
            Some("#5c9ce6".to_owned()),
        );
        graph
    }

    #[test]
    fn serialize_then_replace_round_trips() {
        let graph = sample_graph();
        let json = document_to_json(&DiagramDocument::from_graph(&graph)).unwrap();
        let document = parse_document(&json).unwrap();

        let mut restored = SchemaGraph::new();
        document.apply_to(&mut restored);

        assert_eq!(restored.tables, graph.tables);
        assert_eq!(restored.relationships, graph.relationships);
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(parse_document("not json at all").is_err());
        assert!(parse_document("[1, 2, 3]").is_err());
        assert!(parse_document("{\"tables\": []}").is_err());
        assert!(parse_document("{\"tables\": {}, \"relationships\": []}").is_err());
    }

    #[test]
    fn rejected_document_leaves_graph_untouched() {
        let mut graph = sample_graph();
        let tables_before = graph.tables.clone();

        if let Ok(document) = parse_document("{\"relationships\": []}") {
            document.apply_to(&mut graph);
        }

        assert_eq!(graph.tables, tables_before);
    }

    #[test]
    fn minimal_empty_document_is_accepted() {
        let document = parse_document("{\"tables\": [], \"relationships\": []}").unwrap();
        assert!(document.tables.is_empty());
        assert!(document.relationships.is_empty());
    }
}
