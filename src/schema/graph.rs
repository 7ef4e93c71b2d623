use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Uuid,
    Int,
    Varchar,
    Text,
    Boolean,
    Date,
    Timestamp,
    Decimal,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::Uuid,
        FieldType::Int,
        FieldType::Varchar,
        FieldType::Text,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Timestamp,
        FieldType::Decimal,
    ];

    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Uuid => "UUID",
            Self::Int => "INT",
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::Decimal => "DECIMAL",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:N")]
    OneToMany,
    #[serde(rename = "N:M")]
    ManyToMany,
}

impl Cardinality {
    pub const ALL: [Cardinality; 3] = [
        Cardinality::OneToOne,
        Cardinality::OneToMany,
        Cardinality::ManyToMany,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::OneToOne => "1:1",
            Self::OneToMany => "1:N",
            Self::ManyToMany => "N:M",
        }
    }
}

fn default_nullable() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub foreign_key: bool,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub width: Option<f32>,
}

/// One side of a relationship: a table, optionally narrowed to a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub table: TableId,
    #[serde(default)]
    pub field: Option<FieldId>,
}

impl Endpoint {
    pub fn table(table: TableId) -> Self {
        Self { table, field: None }
    }

    pub fn field(table: TableId, field: FieldId) -> Self {
        Self {
            table,
            field: Some(field),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub source: Endpoint,
    pub target: Endpoint,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Relationship {
    pub fn touches_endpoint(&self, end: Endpoint) -> bool {
        self.source == end || self.target == end
    }

    pub fn touches_table(&self, table: TableId) -> bool {
        self.source.table == table || self.target.table == table
    }
}

#[derive(Clone, Debug, Default)]
pub struct SchemaGraph {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    next_id: u64,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|table| table.id == id)
    }

    pub fn table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.iter_mut().find(|table| table.id == id)
    }

    pub fn field(&self, table: TableId, field: FieldId) -> Option<&Field> {
        self.table(table)?.fields.iter().find(|f| f.id == field)
    }

    pub fn field_index(&self, table: TableId, field: FieldId) -> Option<usize> {
        self.table(table)?.fields.iter().position(|f| f.id == field)
    }

    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.id == id)
    }

    pub fn relationship_mut(&mut self, id: RelationshipId) -> Option<&mut Relationship> {
        self.relationships.iter_mut().find(|rel| rel.id == id)
    }

    pub fn endpoint_resolves(&self, end: Endpoint) -> bool {
        match end.field {
            Some(field) => self.field(end.table, field).is_some(),
            None => self.table(end.table).is_some(),
        }
    }

    pub fn add_table(&mut self, name: impl Into<String>, x: f32, y: f32) -> TableId {
        let id = TableId(self.allocate_id());
        self.tables.push(Table {
            id,
            name: name.into(),
            description: String::new(),
            x,
            y,
            fields: Vec::new(),
            image: None,
            width: None,
        });
        id
    }

    pub fn update_table(&mut self, id: TableId, apply: impl FnOnce(&mut Table)) {
        if let Some(table) = self.table_mut(id) {
            apply(table);
        }
    }

    /// Removes the table and, atomically, every relationship that references
    /// it as source or target.
    pub fn remove_table(&mut self, id: TableId) {
        self.tables.retain(|table| table.id != id);
        self.relationships.retain(|rel| !rel.touches_table(id));
    }

    pub fn add_field(
        &mut self,
        table: TableId,
        name: impl Into<String>,
        field_type: FieldType,
    ) -> Option<FieldId> {
        let id = FieldId(self.allocate_id());
        let field = Field {
            id,
            name: name.into(),
            field_type,
            primary_key: false,
            foreign_key: false,
            nullable: true,
            description: String::new(),
        };
        let table = self.table_mut(table)?;
        table.fields.push(field);
        Some(id)
    }

    pub fn update_field(
        &mut self,
        table: TableId,
        field: FieldId,
        apply: impl FnOnce(&mut Field),
    ) {
        if let Some(table) = self.table_mut(table)
            && let Some(field) = table.fields.iter_mut().find(|f| f.id == field)
        {
            apply(field);
        }
    }

    /// Removes the field and every relationship that references it at either
    /// end. Whole-table relationships on the same table are left alone.
    pub fn remove_field(&mut self, table: TableId, field: FieldId) {
        let Some(owner) = self.table_mut(table) else {
            return;
        };
        owner.fields.retain(|f| f.id != field);

        self.relationships.retain(|rel| {
            let source_hit = rel.source.table == table && rel.source.field == Some(field);
            let target_hit = rel.target.table == table && rel.target.field == Some(field);
            !source_hit && !target_hit
        });
    }

    /// Creates a relationship between two endpoints. Self-connections and
    /// exact or mirrored duplicates are silent no-ops, as are endpoints that
    /// do not resolve.
    pub fn connect(
        &mut self,
        source: Endpoint,
        target: Endpoint,
        color: Option<String>,
    ) -> Option<RelationshipId> {
        if source == target {
            return None;
        }
        if !self.endpoint_resolves(source) || !self.endpoint_resolves(target) {
            return None;
        }
        let duplicate = self.relationships.iter().any(|rel| {
            (rel.source == source && rel.target == target)
                || (rel.source == target && rel.target == source)
        });
        if duplicate {
            return None;
        }

        let id = RelationshipId(self.allocate_id());
        self.relationships.push(Relationship {
            id,
            source,
            target,
            cardinality: Cardinality::OneToMany,
            label: String::new(),
            color,
        });
        Some(id)
    }

    pub fn remove_relationship(&mut self, id: RelationshipId) {
        self.relationships.retain(|rel| rel.id != id);
    }

    /// Replaces the whole graph atomically and re-seeds the id counter past
    /// every id in the incoming collections.
    pub fn replace(&mut self, tables: Vec<Table>, relationships: Vec<Relationship>) {
        let mut max_id = 0u64;
        for table in &tables {
            max_id = max_id.max(table.id.0);
            for field in &table.fields {
                max_id = max_id.max(field.id.0);
            }
        }
        for rel in &relationships {
            max_id = max_id.max(rel.id.0);
        }

        self.tables = tables;
        self.relationships = relationships;
        self.next_id = max_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_and_posts() -> (SchemaGraph, TableId, FieldId, TableId, FieldId) {
        let mut graph = SchemaGraph::new();
        let users = graph.add_table("Users", 0.0, 0.0);
        let users_id = graph.add_field(users, "id", FieldType::Uuid).unwrap();
        graph.update_field(users, users_id, |field| field.primary_key = true);
        let posts = graph.add_table("Posts", 400.0, 0.0);
        let posts_user_id = graph.add_field(posts, "user_id", FieldType::Uuid).unwrap();
        (graph, users, users_id, posts, posts_user_id)
    }

    #[test]
    fn connect_creates_exactly_one_relationship() {
        let (mut graph, users, users_id, posts, posts_user_id) = users_and_posts();
        let created = graph.connect(
            Endpoint::field(users, users_id),
            Endpoint::field(posts, posts_user_id),
            None,
        );
        assert!(created.is_some());
        assert_eq!(graph.relationships.len(), 1);
    }

    #[test]
    fn duplicate_and_mirrored_connects_are_no_ops() {
        let (mut graph, users, users_id, posts, posts_user_id) = users_and_posts();
        let source = Endpoint::field(users, users_id);
        let target = Endpoint::field(posts, posts_user_id);

        assert!(graph.connect(source, target, None).is_some());
        assert!(graph.connect(source, target, None).is_none());
        assert!(graph.connect(target, source, None).is_none());
        assert_eq!(graph.relationships.len(), 1);
    }

    #[test]
    fn self_connection_is_a_no_op() {
        let (mut graph, users, users_id, _, _) = users_and_posts();
        let end = Endpoint::field(users, users_id);
        assert!(graph.connect(end, end, None).is_none());
        assert!(graph.relationships.is_empty());
    }

    #[test]
    fn unresolved_endpoint_is_a_no_op() {
        let (mut graph, users, users_id, _, _) = users_and_posts();
        let ghost = Endpoint::field(TableId(999), FieldId(998));
        assert!(graph
            .connect(Endpoint::field(users, users_id), ghost, None)
            .is_none());
        assert!(graph.relationships.is_empty());
    }

    #[test]
    fn field_level_and_table_level_links_are_distinct() {
        let (mut graph, users, users_id, posts, posts_user_id) = users_and_posts();
        assert!(graph
            .connect(
                Endpoint::field(users, users_id),
                Endpoint::field(posts, posts_user_id),
                None,
            )
            .is_some());
        assert!(graph
            .connect(Endpoint::table(users), Endpoint::table(posts), None)
            .is_some());
        assert_eq!(graph.relationships.len(), 2);
    }

    #[test]
    fn removing_table_cascades_to_its_relationships_only() {
        let (mut graph, users, users_id, posts, posts_user_id) = users_and_posts();
        let other = graph.add_table("Tags", 0.0, 400.0);
        let other_id = graph.add_field(other, "id", FieldType::Int).unwrap();

        graph.connect(
            Endpoint::field(users, users_id),
            Endpoint::field(posts, posts_user_id),
            None,
        );
        let unrelated = graph
            .connect(
                Endpoint::field(posts, posts_user_id),
                Endpoint::field(other, other_id),
                None,
            )
            .unwrap();

        graph.remove_table(users);

        assert!(graph.table(users).is_none());
        assert_eq!(graph.relationships.len(), 1);
        assert_eq!(graph.relationships[0].id, unrelated);
    }

    #[test]
    fn removing_field_cascades_only_to_field_level_relationships() {
        let (mut graph, users, users_id, posts, posts_user_id) = users_and_posts();
        graph.connect(
            Endpoint::field(users, users_id),
            Endpoint::field(posts, posts_user_id),
            None,
        );
        let table_level = graph
            .connect(Endpoint::table(users), Endpoint::table(posts), None)
            .unwrap();

        graph.remove_field(users, users_id);

        assert_eq!(graph.relationships.len(), 1);
        assert_eq!(graph.relationships[0].id, table_level);
        assert!(graph.field(users, users_id).is_none());
    }

    #[test]
    fn replace_reseeds_id_counter_past_incoming_ids() {
        let (mut graph, _, _, _, _) = users_and_posts();
        let tables = graph.tables.clone();
        let relationships = graph.relationships.clone();

        let mut fresh = SchemaGraph::new();
        fresh.replace(tables, relationships);
        let new_table = fresh.add_table("New", 0.0, 0.0);

        let collision = fresh
            .tables
            .iter()
            .filter(|table| table.id == new_table)
            .count();
        assert_eq!(collision, 1);
        assert!(new_table.0 > 4);
    }
}
