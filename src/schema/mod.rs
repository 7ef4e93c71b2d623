mod ddl;
mod graph;
mod io;

pub use ddl::generate_ddl;
pub use graph::{
    Cardinality, Endpoint, FieldId, FieldType, Relationship, RelationshipId, SchemaGraph, Table,
    TableId,
};
pub use io::{DiagramDocument, load_document, save_ddl, save_document};
