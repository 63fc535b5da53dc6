use crate::model::{qualified_name, Model, ObjectKind, ObjectName, SchemaObject, DEFAULT_SCHEMA};
use crate::package::{build_package, Package, PackageMetadata};
use crate::pg::connection::PgConnection;
use crate::util::{Result, SchemaError};
use sqlx::Row;
use std::path::Path;
use tracing::info;

struct ColumnRow {
    name: String,
    data_type: String,
    not_null: bool,
    default: Option<String>,
}

struct ConstraintRow {
    name: String,
    definition: String,
}

/// Reverse-engineers the user schemas of a database into a package file.
pub async fn extract(
    output_path: impl AsRef<Path>,
    connection: &PgConnection,
    app_name: &str,
    version: &str,
) -> Result<Package> {
    let model = extract_model(connection).await?;
    build_package(
        output_path,
        &model,
        PackageMetadata::new(app_name, version),
    )
}

pub async fn extract_model(connection: &PgConnection) -> Result<Model> {
    let mut model = Model::new();

    for schema in introspect_schemas(connection).await? {
        model.add_object(SchemaObject::local(
            ObjectKind::Schema,
            Some(ObjectName::new([schema.as_str()])),
            Some(format!("CREATE SCHEMA {}", quote_ident(&schema))),
        ));
    }

    for (table_schema, table_name) in introspect_tables(connection).await? {
        let columns = introspect_columns(connection, &table_schema, &table_name).await?;
        let constraints = introspect_constraints(connection, &table_schema, &table_name).await?;

        model.add_object(SchemaObject::local(
            ObjectKind::Table,
            Some(qualified_name(&table_schema, &table_name)),
            Some(create_table_sql(&table_schema, &table_name, &columns, &constraints)),
        ));
        for constraint in constraints {
            model.add_object(SchemaObject::local(
                ObjectKind::Constraint,
                Some(qualified_name(&table_schema, &constraint.name)),
                None,
            ));
        }
    }

    for object in introspect_views(connection).await? {
        model.add_object(object);
    }
    for object in introspect_indexes(connection).await? {
        model.add_object(object);
    }

    info!(objects = model.len(), "extracted model");
    Ok(model)
}

async fn introspect_schemas(connection: &PgConnection) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        SELECT nspname::text AS name
        FROM pg_namespace
        WHERE nspname NOT LIKE 'pg\_%'
          AND nspname <> 'information_schema'
          AND nspname <> $1
        ORDER BY nspname
        "#,
    )
    .bind(DEFAULT_SCHEMA)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch schemas: {e}")))?;

    Ok(rows.iter().map(|row| row.get("name")).collect())
}

async fn introspect_tables(connection: &PgConnection) -> Result<Vec<(String, String)>> {
    let rows = sqlx::query(
        r#"
        SELECT n.nspname::text AS table_schema, c.relname::text AS table_name
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE c.relkind IN ('r', 'p')
          AND n.nspname NOT LIKE 'pg\_%'
          AND n.nspname <> 'information_schema'
        ORDER BY n.nspname, c.relname
        "#,
    )
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch tables: {e}")))?;

    Ok(rows
        .iter()
        .map(|row| (row.get("table_schema"), row.get("table_name")))
        .collect())
}

async fn introspect_columns(
    connection: &PgConnection,
    table_schema: &str,
    table_name: &str,
) -> Result<Vec<ColumnRow>> {
    let rows = sqlx::query(
        r#"
        SELECT a.attname::text AS name,
               format_type(a.atttypid, a.atttypmod) AS data_type,
               a.attnotnull AS not_null,
               pg_get_expr(d.adbin, d.adrelid) AS default_expr
        FROM pg_attribute a
        JOIN pg_class c ON c.oid = a.attrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
        WHERE n.nspname = $1 AND c.relname = $2
          AND a.attnum > 0 AND NOT a.attisdropped
        ORDER BY a.attnum
        "#,
    )
    .bind(table_schema)
    .bind(table_name)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch columns: {e}")))?;

    Ok(rows
        .iter()
        .map(|row| ColumnRow {
            name: row.get("name"),
            data_type: row.get("data_type"),
            not_null: row.get("not_null"),
            default: row.get("default_expr"),
        })
        .collect())
}

async fn introspect_constraints(
    connection: &PgConnection,
    table_schema: &str,
    table_name: &str,
) -> Result<Vec<ConstraintRow>> {
    let rows = sqlx::query(
        r#"
        SELECT con.conname::text AS name, pg_get_constraintdef(con.oid) AS definition
        FROM pg_constraint con
        JOIN pg_class c ON c.oid = con.conrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname = $1 AND c.relname = $2
          AND con.contype IN ('p', 'u', 'f', 'c')
        ORDER BY con.conname
        "#,
    )
    .bind(table_schema)
    .bind(table_name)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch constraints: {e}")))?;

    Ok(rows
        .iter()
        .map(|row| ConstraintRow {
            name: row.get("name"),
            definition: row.get("definition"),
        })
        .collect())
}

async fn introspect_views(connection: &PgConnection) -> Result<Vec<SchemaObject>> {
    let rows = sqlx::query(
        r#"
        SELECT schemaname::text AS view_schema, viewname::text AS view_name, definition
        FROM pg_views
        WHERE schemaname NOT LIKE 'pg\_%'
          AND schemaname <> 'information_schema'
        ORDER BY schemaname, viewname
        "#,
    )
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch views: {e}")))?;

    let mut views = Vec::new();
    for row in rows {
        let schema: String = row.get("view_schema");
        let name: String = row.get("view_name");
        let query: String = row.get("definition");
        let name = qualified_name(&schema, &name);
        let definition = format!("CREATE VIEW {name} AS {}", trim_statement(&query));
        views.push(SchemaObject::local(
            ObjectKind::View,
            Some(name),
            Some(definition),
        ));
    }

    Ok(views)
}

async fn introspect_indexes(connection: &PgConnection) -> Result<Vec<SchemaObject>> {
    let rows = sqlx::query(
        r#"
        SELECT n.nspname::text AS table_schema,
               t.relname::text AS table_name,
               i.relname::text AS index_name,
               pg_get_indexdef(i.oid) AS definition
        FROM pg_index x
        JOIN pg_class i ON i.oid = x.indexrelid
        JOIN pg_class t ON t.oid = x.indrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        WHERE n.nspname NOT LIKE 'pg\_%'
          AND n.nspname <> 'information_schema'
          AND NOT EXISTS (
              SELECT 1 FROM pg_constraint con
              WHERE con.conindid = x.indexrelid
                AND con.conrelid = x.indrelid
                AND con.contype IN ('p', 'u', 'x')
          )
        ORDER BY n.nspname, t.relname, i.relname
        "#,
    )
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch indexes: {e}")))?;

    Ok(rows
        .iter()
        .map(|row| {
            let schema: String = row.get("table_schema");
            let table: String = row.get("table_name");
            let index: String = row.get("index_name");
            SchemaObject::local(
                ObjectKind::Index,
                Some(ObjectName::new([schema, table, index])),
                Some(row.get("definition")),
            )
        })
        .collect())
}

fn create_table_sql(
    schema: &str,
    name: &str,
    columns: &[ColumnRow],
    constraints: &[ConstraintRow],
) -> String {
    let mut elements: Vec<String> = columns
        .iter()
        .map(|column| {
            let mut element = format!("{} {}", quote_ident(&column.name), column.data_type);
            if let Some(default) = &column.default {
                element.push_str(&format!(" DEFAULT {default}"));
            }
            if column.not_null {
                element.push_str(" NOT NULL");
            }
            element
        })
        .collect();

    elements.extend(constraints.iter().map(|constraint| {
        format!(
            "CONSTRAINT {} {}",
            quote_ident(&constraint.name),
            constraint.definition
        )
    }));

    format!(
        "CREATE TABLE {} ({})",
        qualified_name(schema, name),
        elements.join(", ")
    )
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn trim_statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}
