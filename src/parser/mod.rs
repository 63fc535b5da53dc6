mod names;

use crate::model::{qualified_name, Model, ObjectKind, ObjectName, SchemaObject};
use crate::util::{Result, SchemaError};
use names::{base_name, local_name, relation_name, schema_name};
use sqlparser::ast::{visit_relations, Query, Statement, TableConstraint};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use std::fs;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::debug;

/// Parses `script` and merges its objects into `model`.
///
/// The model is only touched once the whole script has parsed, so a failing
/// script leaves it as it was.
pub fn add_objects_from_script(model: &mut Model, script: &str) -> Result<()> {
    for object in parse_script(script)? {
        model.add_object(object);
    }
    Ok(())
}

pub fn parse_script_file(path: impl AsRef<Path>) -> Result<Vec<SchemaObject>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
    parse_script(&content)
}

pub fn parse_script(script: &str) -> Result<Vec<SchemaObject>> {
    let dialect = PostgreSqlDialect {};
    let statements = Parser::parse_sql(&dialect, script)
        .map_err(|e| SchemaError::ParseError(format!("SQL parse error: {e}")))?;

    let mut objects = Vec::new();
    for statement in statements {
        parse_statement(statement, &mut objects)?;
    }

    for object in &objects {
        debug!(kind = object.kind.label(), name = ?object.name, "parsed object");
    }
    Ok(objects)
}

fn parse_statement(statement: Statement, objects: &mut Vec<SchemaObject>) -> Result<()> {
    let definition = statement.to_string();

    match statement {
        Statement::CreateSchema { schema_name: name, .. } => {
            let schema = schema_name(&name)?;
            objects.push(SchemaObject::local(
                ObjectKind::Schema,
                Some(ObjectName::new([schema])),
                Some(definition),
            ));
        }
        Statement::CreateTable(ct) => {
            let (table_schema, table_name) = local_name(&ct.name)?;
            objects.push(SchemaObject::local(
                ObjectKind::Table,
                Some(qualified_name(&table_schema, &table_name)),
                Some(definition),
            ));
            for constraint in &ct.constraints {
                if let Some(name) = constraint_name(constraint) {
                    objects.push(SchemaObject::local(
                        ObjectKind::Constraint,
                        name.map(|n| qualified_name(&table_schema, &n)),
                        None,
                    ));
                }
            }
        }
        Statement::CreateView { name, query, .. } => {
            let (view_schema, view_name) = local_name(&name)?;
            objects.push(SchemaObject::local(
                ObjectKind::View,
                Some(qualified_name(&view_schema, &view_name)),
                Some(definition),
            ));
            objects.extend(external_references(&query)?);
        }
        Statement::CreateIndex(ci) => {
            let index_name = ci
                .name
                .as_ref()
                .map(base_name)
                .transpose()?
                .ok_or_else(|| SchemaError::ParseError("Index must have name".into()))?;
            let (table_schema, table_name) = local_name(&ci.table_name)?;
            objects.push(SchemaObject::local(
                ObjectKind::Index,
                Some(ObjectName::new([table_schema, table_name, index_name])),
                Some(definition),
            ));
        }
        _ => {
            let summary: String = definition.chars().take(60).collect();
            return Err(SchemaError::Unsupported(summary));
        }
    }

    Ok(())
}

/// `Some(None)` for an unnamed table constraint, `None` for entries that are
/// not constraints of their own.
fn constraint_name(constraint: &TableConstraint) -> Option<Option<String>> {
    match constraint {
        TableConstraint::Unique { name, .. }
        | TableConstraint::PrimaryKey { name, .. }
        | TableConstraint::ForeignKey { name, .. }
        | TableConstraint::Check { name, .. } => {
            Some(name.as_ref().map(|ident| ident.value.clone()))
        }
        _ => None,
    }
}

fn external_references(query: &Query) -> Result<Vec<SchemaObject>> {
    let mut references = Vec::new();
    let flow = visit_relations(query, |relation| match relation_name(relation) {
        Ok(name) => {
            if name.has_external_parts() {
                references.push(SchemaObject::external(ObjectKind::Table, name));
            }
            ControlFlow::Continue(())
        }
        Err(e) => ControlFlow::Break(e),
    });

    match flow {
        ControlFlow::Break(e) => Err(e),
        ControlFlow::Continue(()) => Ok(references),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectScope, ScopeFilter};

    fn names(objects: &[SchemaObject]) -> Vec<String> {
        objects
            .iter()
            .map(|o| {
                o.name
                    .as_ref()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "<unnamed>".to_string())
            })
            .collect()
    }

    #[test]
    fn unqualified_table_lands_in_public() {
        let objects = parse_script("CREATE TABLE t1 (c1 VARCHAR(30) NOT NULL);").unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].kind, ObjectKind::Table);
        assert_eq!(names(&objects), vec![r#""public"."t1""#]);
        assert!(objects[0]
            .definition
            .as_deref()
            .unwrap()
            .starts_with("CREATE TABLE"));
    }

    #[test]
    fn schema_and_qualified_objects() {
        let objects = parse_script(
            r#"
            CREATE SCHEMA dev;
            CREATE TABLE dev.t2 (c2 INT NOT NULL);
            CREATE VIEW dev.v1 AS SELECT c2 FROM dev.t2;
            CREATE INDEX ix_t2_c2 ON dev.t2 (c2);
            "#,
        )
        .unwrap();

        assert_eq!(
            names(&objects),
            vec![
                r#""dev""#,
                r#""dev"."t2""#,
                r#""dev"."v1""#,
                r#""dev"."t2"."ix_t2_c2""#,
            ]
        );
        assert_eq!(
            objects.iter().map(|o| o.kind).collect::<Vec<_>>(),
            vec![
                ObjectKind::Schema,
                ObjectKind::Table,
                ObjectKind::View,
                ObjectKind::Index
            ]
        );
    }

    #[test]
    fn table_constraints_become_objects() {
        let objects = parse_script(
            r#"
            CREATE TABLE test.t3 (
                c3 INT NOT NULL,
                CONSTRAINT pk_t3 PRIMARY KEY (c3),
                CHECK (c3 > 0)
            );
            "#,
        )
        .unwrap();

        assert_eq!(objects.len(), 3);
        assert_eq!(objects[1].kind, ObjectKind::Constraint);
        assert_eq!(names(&objects)[1], r#""test"."pk_t3""#);
        assert_eq!(objects[2].kind, ObjectKind::Constraint);
        assert!(objects[2].name.is_none());
        assert!(objects[1].definition.is_none());
    }

    #[test]
    fn view_collects_external_references() {
        let mut model = Model::new();
        add_objects_from_script(
            &mut model,
            r#"
            CREATE VIEW report AS
                SELECT o.id FROM warehouse.sales.orders o
                JOIN warehouse.sales.orders p ON p.id = o.id
                JOIN public.local_table l ON l.id = o.id;
            "#,
        )
        .unwrap();

        assert_eq!(model.objects(ScopeFilter::LocalOnly, &[]).count(), 1);
        let external: Vec<_> = model
            .objects(ScopeFilter::All, &[])
            .filter(|o| o.scope == ObjectScope::External)
            .collect();
        assert_eq!(external.len(), 1);
        let name = external[0].name.as_ref().unwrap();
        assert_eq!(name.external_parts, vec!["warehouse"]);
        assert_eq!(name.parts, vec!["sales", "orders"]);
    }

    #[test]
    fn index_requires_name() {
        let result = parse_script("CREATE INDEX ON t1 (c1);");
        assert!(matches!(result, Err(SchemaError::ParseError(_))));
    }

    #[test]
    fn malformed_script_leaves_model_untouched() {
        let mut model = Model::new();
        add_objects_from_script(&mut model, "CREATE TABLE a (id INT);").unwrap();

        let result = add_objects_from_script(&mut model, "CREATE TABLE b (id INT); CREATE TABLE (");
        assert!(matches!(result, Err(SchemaError::ParseError(_))));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn unsupported_statement_is_rejected() {
        let result = parse_script("INSERT INTO t1 VALUES (1);");
        assert!(matches!(result, Err(SchemaError::Unsupported(_))));
    }

    #[test]
    fn schema_authorization_names_schema_after_role() {
        let objects = parse_script("CREATE SCHEMA AUTHORIZATION alice;").unwrap();
        assert_eq!(names(&objects), vec![r#""alice""#]);
    }

    #[test]
    fn empty_script_parses_to_nothing() {
        assert!(parse_script("").unwrap().is_empty());
    }

    #[test]
    fn script_file_missing_is_io_error() {
        let result = parse_script_file("/nonexistent/schema.sql");
        assert!(matches!(result, Err(SchemaError::Io { .. })));
    }
}
