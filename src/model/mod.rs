use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::filter::ObjectFilter;

/// Schema objects without an explicit schema land here.
pub const DEFAULT_SCHEMA: &str = "public";

/// Hierarchical name of a schema object.
///
/// `parts` are local to the model and start with the schema. `external_parts`
/// precede them when the object lives outside the model (e.g. the database in
/// `otherdb.public.t`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ObjectName {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_parts: Vec<String>,
    pub parts: Vec<String>,
}

impl ObjectName {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ObjectName {
            external_parts: Vec::new(),
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_external_parts<I, S>(mut self, external_parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external_parts = external_parts.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_external_parts(&self) -> bool {
        !self.external_parts.is_empty()
    }

    /// The schema, by convention the first local part.
    pub fn schema(&self) -> Option<&str> {
        self.parts.first().map(String::as_str)
    }

    pub fn all_parts(&self) -> impl Iterator<Item = &str> {
        self.external_parts
            .iter()
            .chain(self.parts.iter())
            .map(String::as_str)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self
            .all_parts()
            .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
            .collect();
        write!(f, "{}", quoted.join("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    Schema,
    Table,
    View,
    Index,
    Constraint,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Schema,
        ObjectKind::Table,
        ObjectKind::View,
        ObjectKind::Index,
        ObjectKind::Constraint,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Schema => "schema",
            ObjectKind::Table => "table",
            ObjectKind::View => "view",
            ObjectKind::Index => "index",
            ObjectKind::Constraint => "constraint",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "schemas" => Ok(ObjectKind::Schema),
            "tables" => Ok(ObjectKind::Table),
            "views" => Ok(ObjectKind::View),
            "indexes" => Ok(ObjectKind::Index),
            "constraints" => Ok(ObjectKind::Constraint),
            _ => Err(format!(
                "Invalid object kind '{}'. Valid kinds: schemas, tables, views, indexes, constraints",
                s
            )),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Schema => "schemas",
            ObjectKind::Table => "tables",
            ObjectKind::View => "views",
            ObjectKind::Index => "indexes",
            ObjectKind::Constraint => "constraints",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectScope {
    /// Declared by the scripts the model was built from.
    Local,
    /// Referenced by a local object but defined elsewhere.
    External,
}

/// Which scopes [`Model::objects`] enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeFilter {
    #[default]
    LocalOnly,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaObject {
    pub kind: ObjectKind,
    pub name: Option<ObjectName>,
    pub scope: ObjectScope,
    /// Standalone DDL. `None` for objects embedded in a parent and for external references.
    pub definition: Option<String>,
}

impl SchemaObject {
    pub fn local(kind: ObjectKind, name: Option<ObjectName>, definition: Option<String>) -> Self {
        SchemaObject {
            kind,
            name,
            scope: ObjectScope::Local,
            definition,
        }
    }

    pub fn external(kind: ObjectKind, name: ObjectName) -> Self {
        SchemaObject {
            kind,
            name: Some(name),
            scope: ObjectScope::External,
            definition: None,
        }
    }
}

/// In-memory object model. Objects keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    objects: Vec<SchemaObject>,
}

impl Model {
    pub fn new() -> Self {
        Model {
            objects: Vec::new(),
        }
    }

    pub fn from_objects(objects: impl IntoIterator<Item = SchemaObject>) -> Self {
        let mut model = Model::new();
        for object in objects {
            model.add_object(object);
        }
        model
    }

    /// Adds an object. External references already present by name are skipped.
    pub fn add_object(&mut self, object: SchemaObject) {
        if object.scope == ObjectScope::External && self.contains_external(&object) {
            return;
        }
        self.objects.push(object);
    }

    fn contains_external(&self, object: &SchemaObject) -> bool {
        self.objects.iter().any(|existing| {
            existing.scope == ObjectScope::External
                && existing.kind == object.kind
                && existing.name == object.name
        })
    }

    /// Enumerates objects of the given kinds in the given scope. An empty
    /// `kinds` slice selects every kind.
    pub fn objects<'a>(
        &'a self,
        scope: ScopeFilter,
        kinds: &'a [ObjectKind],
    ) -> impl Iterator<Item = &'a SchemaObject> + 'a {
        self.objects.iter().filter(move |object| {
            let scope_matches = match scope {
                ScopeFilter::LocalOnly => object.scope == ObjectScope::Local,
                ScopeFilter::All => true,
            };
            scope_matches && (kinds.is_empty() || kinds.contains(&object.kind))
        })
    }

    pub fn all_objects(&self) -> &[SchemaObject] {
        &self.objects
    }

    /// Returns a new model holding only the objects `filter` keeps.
    pub fn filtered<F>(&self, filter: &F) -> Model
    where
        F: ObjectFilter<SchemaObject> + ?Sized,
    {
        Model {
            objects: filter.filter(self.objects.iter()).cloned().collect(),
        }
    }

    pub fn schemas(&self) -> HashSet<&str> {
        self.objects
            .iter()
            .filter_map(|object| object.name.as_ref().and_then(ObjectName::schema))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

pub fn qualified_name(schema: &str, name: &str) -> ObjectName {
    ObjectName::new([schema, name])
}
