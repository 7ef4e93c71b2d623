use super::graph::SchemaGraph;

/// Derived SQL-like DDL for the current graph: one CREATE TABLE per table in
/// order, fields in order, a PRIMARY KEY clause when any field is marked, and
/// one FOREIGN KEY clause per relationship whose target table is this table
/// and whose source and target fields both resolve. The target side holds
/// the foreign key and references the source side.
pub fn generate_ddl(graph: &SchemaGraph) -> String {
    let mut statements = Vec::with_capacity(graph.tables.len());

    for table in &graph.tables {
        let mut lines = Vec::with_capacity(table.fields.len() + 2);

        for field in &table.fields {
            let mut line = format!("  \"{}\" {}", field.name, field.field_type.sql_name());
            if field.primary_key || !field.nullable {
                line.push_str(" NOT NULL");
            }
            lines.push(line);
        }

        let primary = table
            .fields
            .iter()
            .filter(|field| field.primary_key)
            .map(|field| format!("\"{}\"", field.name))
            .collect::<Vec<_>>();
        if !primary.is_empty() {
            lines.push(format!("  PRIMARY KEY ({})", primary.join(", ")));
        }

        for rel in &graph.relationships {
            if rel.target.table != table.id {
                continue;
            }
            let Some(local_field) = rel
                .target
                .field
                .and_then(|field| graph.field(rel.target.table, field))
            else {
                continue;
            };
            let Some(referenced_table) = graph.table(rel.source.table) else {
                continue;
            };
            let Some(referenced_field) = rel
                .source
                .field
                .and_then(|field| graph.field(rel.source.table, field))
            else {
                continue;
            };

            lines.push(format!(
                "  FOREIGN KEY (\"{}\") REFERENCES \"{}\" (\"{}\")",
                local_field.name, referenced_table.name, referenced_field.name
            ));
        }

        statements.push(format!(
            "CREATE TABLE \"{}\" (\n{}\n);",
            table.name,
            lines.join(",\n")
        ));
    }

    let mut out = statements.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
