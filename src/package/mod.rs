//! Persisted packages: a model plus metadata, stored as versioned JSON.

use crate::model::{Model, SchemaObject};
use crate::util::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::info;

/// Bumped whenever the on-disk layout changes incompatibly.
pub const PACKAGE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PackageMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Package {
    pub format_version: u32,
    pub metadata: PackageMetadata,
    pub fingerprint: String,
    pub objects: Vec<SchemaObject>,
}

impl Package {
    pub fn from_model(model: &Model, metadata: PackageMetadata) -> Self {
        let objects = model.all_objects().to_vec();
        Package {
            format_version: PACKAGE_FORMAT_VERSION,
            metadata,
            fingerprint: fingerprint(&objects),
            objects,
        }
    }

    pub fn model(&self) -> Model {
        Model::from_objects(self.objects.iter().cloned())
    }

    pub fn into_model(self) -> Model {
        Model::from_objects(self.objects)
    }
}

/// SHA-256 of the serialized object list, hex encoded.
pub fn fingerprint(objects: &[SchemaObject]) -> String {
    let json = serde_json::to_string(objects).expect("objects must serialize");
    let hash = Sha256::digest(json.as_bytes());
    hex::encode(hash)
}

pub fn build_package(
    path: impl AsRef<Path>,
    model: &Model,
    metadata: PackageMetadata,
) -> Result<Package> {
    let path = path.as_ref();
    let package = Package::from_model(model, metadata);
    let json = serde_json::to_string_pretty(&package).map_err(|e| SchemaError::CorruptPackage {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    fs::write(path, json).map_err(|e| SchemaError::io(path, e))?;

    info!(
        path = %path.display(),
        objects = package.objects.len(),
        fingerprint = %package.fingerprint,
        "wrote package"
    );
    Ok(package)
}

pub fn load_package(path: impl AsRef<Path>) -> Result<Package> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;

    let raw: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| corrupt(path, e.to_string()))?;
    let found = raw
        .get("format_version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| corrupt(path, "missing format_version".to_string()))?;
    if found != u64::from(PACKAGE_FORMAT_VERSION) {
        return Err(SchemaError::IncompatiblePackage {
            path: path.display().to_string(),
            found: u32::try_from(found).unwrap_or(u32::MAX),
            expected: PACKAGE_FORMAT_VERSION,
        });
    }

    let package: Package =
        serde_json::from_value(raw).map_err(|e| corrupt(path, e.to_string()))?;
    let actual = fingerprint(&package.objects);
    if actual != package.fingerprint {
        return Err(corrupt(
            path,
            format!(
                "fingerprint mismatch: recorded {}, computed {actual}",
                package.fingerprint
            ),
        ));
    }

    info!(
        path = %path.display(),
        name = %package.metadata.name,
        objects = package.objects.len(),
        "loaded package"
    );
    Ok(package)
}

pub fn load_package_as_model(path: impl AsRef<Path>) -> Result<Model> {
    load_package(path).map(Package::into_model)
}

fn corrupt(path: &Path, message: String) -> SchemaError {
    SchemaError::CorruptPackage {
        path: path.display().to_string(),
        message,
    }
}
