use crate::model::{Model, ObjectKind, ScopeFilter};

/// Kinds in the order their statements must run.
const DEPLOY_ORDER: [ObjectKind; 4] = [
    ObjectKind::Schema,
    ObjectKind::Table,
    ObjectKind::View,
    ObjectKind::Index,
];

/// Generate the DDL statements that recreate a model's local objects.
/// Objects without a standalone definition are skipped.
pub fn generate_deploy_script(model: &Model) -> Vec<String> {
    DEPLOY_ORDER
        .iter()
        .flat_map(|kind| model.objects(ScopeFilter::LocalOnly, std::slice::from_ref(kind)))
        .filter_map(|object| object.definition.clone())
        .collect()
}

/// Render the deploy script as a single SQL text with an optional header.
pub fn generate_dump(model: &Model, header: Option<&str>) -> String {
    let statements = generate_deploy_script(model);

    if statements.is_empty() {
        return header.map(|h| format!("{h}\n")).unwrap_or_default();
    }

    let body = statements
        .iter()
        .map(|s| format!("{s};"))
        .collect::<Vec<_>>()
        .join("\n\n")
        + "\n";

    match header {
        Some(h) => format!("{h}\n\n{body}"),
        None => body,
    }
}
