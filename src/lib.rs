//! schemapack - build, filter and ship PostgreSQL schema models.
//!
//! A model is assembled from SQL DDL script fragments, filtered by schema,
//! persisted as a package file, deployed to a database and extracted back.
//!
//! # Quick Start
//!
//! ```no_run
//! use schemapack::prelude::*;
//!
//! let mut model = Model::new();
//! add_objects_from_script(&mut model, "CREATE SCHEMA dev; CREATE TABLE dev.t (id INT);").unwrap();
//! add_objects_from_script(&mut model, "CREATE TABLE t1 (c1 TEXT);").unwrap();
//!
//! let filter = SchemaFilter::new(["dev"]);
//! let filtered = model.filtered(&filter);
//! build_package("filtered.json", &filtered, PackageMetadata::new("app", "1.0")).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`model`] - Named schema objects and the in-memory model
//! - [`filter`] - Schema-membership object filter
//! - [`parser`] - Script fragments to model objects
//! - [`package`] - Package files
//! - [`pg`] - Deployment and extraction against PostgreSQL

pub mod deploy_script;
pub mod display;
pub mod filter;
pub mod model;
pub mod package;
pub mod parser;
pub mod pg;
pub mod prelude;
pub mod sample;
pub mod util;
