use crate::model::{ObjectName, DEFAULT_SCHEMA};
use crate::util::{Result, SchemaError};
use sqlparser::ast;

fn idents(name: &ast::ObjectName) -> Vec<String> {
    name.0.iter().map(|ident| ident.value.clone()).collect()
}

/// Splits a `[schema.]name` into its schema and object name.
pub(crate) fn local_name(name: &ast::ObjectName) -> Result<(String, String)> {
    match idents(name).as_slice() {
        [schema, object] => Ok((schema.clone(), object.clone())),
        [object] => Ok((DEFAULT_SCHEMA.to_string(), object.clone())),
        _ => Err(SchemaError::ParseError(format!(
            "Expected [schema.]name, found {name}"
        ))),
    }
}

/// Resolves a relation referenced from a query. A leading database part
/// becomes an external part.
pub(crate) fn relation_name(name: &ast::ObjectName) -> Result<ObjectName> {
    match idents(name).as_slice() {
        [object] => Ok(ObjectName::new([DEFAULT_SCHEMA, object.as_str()])),
        [schema, object] => Ok(ObjectName::new([schema, object])),
        [database, schema, object] => {
            Ok(ObjectName::new([schema, object]).with_external_parts([database]))
        }
        _ => Err(SchemaError::ParseError(format!(
            "Relation name has too many parts: {name}"
        ))),
    }
}

pub(crate) fn schema_name(name: &ast::SchemaName) -> Result<String> {
    let object_name = match name {
        ast::SchemaName::Simple(name) => name,
        ast::SchemaName::NamedAuthorization(name, _) => name,
        ast::SchemaName::UnnamedAuthorization(role) => return Ok(role.value.clone()),
    };
    match idents(object_name).as_slice() {
        [schema] => Ok(schema.clone()),
        _ => Err(SchemaError::ParseError(format!(
            "Schema name must have a single part, found {object_name}"
        ))),
    }
}

/// Last identifier of a possibly qualified name.
pub(crate) fn base_name(name: &ast::ObjectName) -> Result<String> {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .ok_or_else(|| SchemaError::ParseError("Empty object name".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::Ident;

    fn object_name(parts: &[&str]) -> ast::ObjectName {
        ast::ObjectName(parts.iter().map(|p| Ident::new(*p)).collect())
    }

    #[test]
    fn unqualified_names_use_default_schema() {
        let (schema, name) = local_name(&object_name(&["users"])).unwrap();
        assert_eq!(schema, "public");
        assert_eq!(name, "users");
    }

    #[test]
    fn local_name_rejects_database_qualification() {
        assert!(local_name(&object_name(&["db", "auth", "users"])).is_err());
    }

    #[test]
    fn three_part_relations_are_external() {
        let name = relation_name(&object_name(&["otherdb", "sales", "orders"])).unwrap();
        assert_eq!(name.external_parts, vec!["otherdb"]);
        assert_eq!(name.parts, vec!["sales", "orders"]);
    }

    #[test]
    fn four_part_relations_are_rejected() {
        assert!(relation_name(&object_name(&["srv", "db", "s", "t"])).is_err());
    }

    #[test]
    fn quoted_identifiers_keep_their_case() {
        let name = ast::ObjectName(vec![Ident::with_quote('"', "Dev"), Ident::new("t")]);
        let (schema, _) = local_name(&name).unwrap();
        assert_eq!(schema, "Dev");
    }
}
