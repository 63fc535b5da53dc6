//! Convenient re-exports for common schemapack usage.

pub use crate::filter::{FilterPolicy, NamedObject, ObjectFilter, SchemaFilter};
pub use crate::model::{Model, ObjectKind, ObjectName, ObjectScope, SchemaObject, ScopeFilter};
pub use crate::package::{
    build_package, load_package, load_package_as_model, Package, PackageMetadata,
};
pub use crate::parser::{add_objects_from_script, parse_script};
pub use crate::pg::{deploy, extract, DeployReport, PgConnection};
pub use crate::util::SchemaError;
