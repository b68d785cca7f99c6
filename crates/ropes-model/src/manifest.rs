//! TOML manifest declaring a registry's data objects.
//!
//! ```toml
//! [[data_object]]
//! name = "outlet"
//! endpoint = "json/combined.js"
//! response_node = "Outlet"
//! fields = [
//!     { client_key = "name", api_key = "Name", default = "" },
//!     { client_key = "circulation", api_key = "Circulation", default = 0 },
//! ]
//! ```
//!
//! Declaration order is kept. Every field is validated when the registry is
//! built, so a bad path fails at startup instead of warning on every fetch.

use std::path::Path;

use ropes_runtime::FieldCell;
use serde::{Deserialize, Serialize};

use crate::data_object::{DataObject, DataObjectOptions};
use crate::error::{ModelError, Result};
use crate::registry::Registry;
use crate::schema::FieldSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataObjectDecl {
    pub name: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub response_node: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl DataObjectDecl {
    fn options(&self) -> DataObjectOptions {
        DataObjectOptions {
            endpoint_url: self.endpoint.clone(),
            response_node: self.response_node.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "data_object")]
    pub data_objects: Vec<DataObjectDecl>,
}

impl Manifest {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::from_toml_str(&source)?;
        tracing::info!(
            path = %path.display(),
            data_objects = manifest.data_objects.len() as u64,
            "manifest.load"
        );
        Ok(manifest)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DataObjectDecl> {
        self.data_objects.iter().find(|decl| decl.name == name)
    }

    /// Build a registry holding one data object per declaration.
    pub fn to_registry<C: FieldCell>(&self) -> Result<Registry<C>> {
        let mut registry = Registry::new();
        for decl in &self.data_objects {
            let object =
                DataObject::try_new(&decl.name, decl.fields.iter().cloned(), decl.options())?;
            registry.insert(&decl.name, object)?;
        }
        Ok(registry)
    }
}
