use crate::deploy_script::generate_deploy_script;
use crate::package::Package;
use crate::pg::connection::PgConnection;
use crate::util::{Result, SchemaError};
use sqlx::Executor;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub package: String,
    pub fingerprint: String,
    pub statements_executed: usize,
}

/// Applies a package's objects to the database in a single transaction.
///
/// Any failing statement aborts the whole deployment.
pub async fn deploy(package: &Package, connection: &PgConnection) -> Result<DeployReport> {
    let statements = generate_deploy_script(&package.model());

    let report = DeployReport {
        package: package.metadata.name.clone(),
        fingerprint: package.fingerprint.clone(),
        statements_executed: statements.len(),
    };

    if statements.is_empty() {
        info!(package = %report.package, "nothing to deploy");
        return Ok(report);
    }

    let mut transaction = connection
        .pool()
        .begin()
        .await
        .map_err(|e| SchemaError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

    for (index, statement) in statements.iter().enumerate() {
        debug!(index, sql = %statement, "executing");
        (&mut *transaction)
            .execute(statement.as_str())
            .await
            .map_err(|e| SchemaError::DeployError {
                index,
                sql: statement.clone(),
                message: e.to_string(),
            })?;
    }

    transaction
        .commit()
        .await
        .map_err(|e| SchemaError::DatabaseError(format!("Failed to commit transaction: {e}")))?;

    info!(
        package = %report.package,
        statements = report.statements_executed,
        "deployed package"
    );
    Ok(report)
}
