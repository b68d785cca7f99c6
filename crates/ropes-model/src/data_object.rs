//! Data objects: reactive fields populated from an API payload.
//!
//! # Lifecycle
//!
//! A data object is constructed once, usually through a [`Registry`], and
//! every declared field immediately holds its default. Consumers bind to the
//! fields right away; nothing is fetched at construction.
//!
//! Fields are written only by [`DataObject::extract`]. Consumers read them
//! and derive from them but never write.
//!
//! # Extraction policy
//!
//! - When a response node is configured, extraction first descends into
//!   `payload[response_node]`, stepping the same way a path segment does. If
//!   the node is absent, one warning is logged and the payload is skipped; no
//!   field changes.
//! - Each field's API key is walked segment by segment. A missing segment at
//!   any depth logs one warning naming the client key, the API key, and the
//!   failing segment, leaves that field untouched, and moves on to the next
//!   field.
//! - When several specs share a client key, only the first one is extracted.
//! - A resolved value is written once, so derived values and bound views see
//!   a single change per field. Writing an equal value notifies nobody, which
//!   makes extraction idempotent.
//!
//! [`Registry`]: crate::Registry

use std::fmt;

use ahash::AHashMap;
use ropes_runtime::{FieldCell, Observable};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::schema::{FieldMiss, FieldSpec, resolve_path, step};

/// Where a data object's payload comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataObjectOptions {
    /// Endpoint fetched by the loader. Objects without one are never loaded.
    pub endpoint_url: Option<String>,
    /// Key to descend into before extracting, for combined payloads.
    pub response_node: Option<String>,
}

impl DataObjectOptions {
    #[must_use]
    pub fn endpoint(url: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(url.into()),
            response_node: None,
        }
    }

    #[must_use]
    pub fn response_node(mut self, node: impl Into<String>) -> Self {
        self.response_node = Some(node.into());
        self
    }
}

/// Outcome of one [`DataObject::extract`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Fields whose value changed.
    pub written: usize,
    /// Fields that resolved to their current value.
    pub unchanged: usize,
    /// Fields whose path was missing from the payload.
    pub misses: Vec<FieldMiss>,
    /// Set when the response node was absent and nothing was extracted.
    pub missing_node: Option<String>,
}

impl ExtractReport {
    /// Whether every field resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.misses.is_empty() && self.missing_node.is_none()
    }
}

/// A named bundle of reactive fields with declarative extraction rules.
pub struct DataObject<C: FieldCell = Observable<Value>> {
    name: Option<String>,
    specs: Vec<FieldSpec>,
    fields: Vec<(String, C)>,
    /// Spec that feeds each field, parallel to `fields`.
    sources: Vec<usize>,
    index: AHashMap<String, usize>,
    options: DataObjectOptions,
}

impl<C: FieldCell> fmt::Debug for DataObject<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataObject")
            .field("name", &self.label())
            .field("fields", &self.index.len())
            .field("endpoint_url", &self.options.endpoint_url)
            .field("response_node", &self.options.response_node)
            .finish()
    }
}

impl<C: FieldCell> DataObject<C> {
    /// Create one cell per spec, each holding the spec's default.
    ///
    /// If two specs share a client key they share a cell. The first spec
    /// supplies its default and its path; later ones are ignored.
    #[must_use]
    pub fn new(specs: impl IntoIterator<Item = FieldSpec>, options: DataObjectOptions) -> Self {
        let specs: Vec<FieldSpec> = specs.into_iter().collect();
        let mut fields = Vec::with_capacity(specs.len());
        let mut sources = Vec::with_capacity(specs.len());
        let mut index = AHashMap::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            if index.contains_key(&spec.client_key) {
                tracing::warn!(
                    client_key = %spec.client_key,
                    api_key = %spec.api_key,
                    "duplicate client key ignored, the first spec wins"
                );
                continue;
            }
            index.insert(spec.client_key.clone(), fields.len());
            fields.push((spec.client_key.clone(), C::create(spec.default.clone())));
            sources.push(position);
        }
        Self {
            name: None,
            specs,
            fields,
            sources,
            index,
            options,
        }
    }

    /// Like [`new`](Self::new), but rejects invalid API keys and duplicate
    /// client keys.
    pub fn try_new(
        name: &str,
        specs: impl IntoIterator<Item = FieldSpec>,
        options: DataObjectOptions,
    ) -> Result<Self> {
        let specs: Vec<FieldSpec> = specs.into_iter().collect();
        {
            let mut seen = ahash::AHashSet::with_capacity(specs.len());
            for spec in &specs {
                spec.validate()?;
                if !seen.insert(spec.client_key.as_str()) {
                    return Err(ModelError::DuplicateField {
                        object: name.to_string(),
                        client_key: spec.client_key.clone(),
                    });
                }
            }
        }
        let mut object = Self::new(specs, options);
        object.name = Some(name.to_string());
        Ok(object)
    }

    /// Attach a name used in diagnostics.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    #[must_use]
    pub fn endpoint_url(&self) -> Option<&str> {
        self.options.endpoint_url.as_deref()
    }

    #[must_use]
    pub fn response_node(&self) -> Option<&str> {
        self.options.response_node.as_deref()
    }

    #[must_use]
    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Client keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// Number of distinct fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The reactive cell behind `client_key`.
    #[must_use]
    pub fn field(&self, client_key: &str) -> Option<&C> {
        self.index.get(client_key).map(|&i| &self.fields[i].1)
    }

    /// The cell behind `client_key`, or [`ModelError::UnknownField`].
    pub fn require(&self, client_key: &str) -> Result<C> {
        self.field(client_key)
            .cloned()
            .ok_or_else(|| ModelError::UnknownField {
                object: self.label().to_string(),
                client_key: client_key.to_string(),
            })
    }

    /// Current value of `client_key`.
    #[must_use]
    pub fn get(&self, client_key: &str) -> Option<Value> {
        self.field(client_key).map(FieldCell::read)
    }

    /// All current values keyed by client key.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(key, cell)| (key.clone(), cell.read()))
            .collect()
    }

    /// Map `payload` into the fields. See the module docs for the policy.
    pub fn extract(&self, payload: &Value) -> ExtractReport {
        let mut report = ExtractReport::default();

        let scope = match self.options.response_node.as_deref() {
            Some(node) => match step(payload, node) {
                Some(inner) => inner,
                None => {
                    tracing::warn!(
                        data_object = self.label(),
                        response_node = node,
                        "response node not found in the API payload"
                    );
                    report.missing_node = Some(node.to_string());
                    return report;
                }
            },
            None => payload,
        };

        for ((_, cell), &source) in self.fields.iter().zip(&self.sources) {
            let spec = &self.specs[source];
            match resolve_path(scope, &spec.api_key) {
                Ok(value) => {
                    if cell.write(value.clone()) {
                        report.written += 1;
                    } else {
                        report.unchanged += 1;
                    }
                }
                Err((depth, segment)) => {
                    tracing::warn!(
                        data_object = self.label(),
                        client_key = %spec.client_key,
                        api_key = %spec.api_key,
                        depth = depth as u64,
                        segment = %segment,
                        "'{}' -> '{}' not found in the API",
                        spec.client_key,
                        spec.api_key
                    );
                    report.misses.push(FieldMiss {
                        client_key: spec.client_key.clone(),
                        api_key: spec.api_key.clone(),
                        depth,
                        segment,
                    });
                }
            }
        }

        tracing::debug!(
            data_object = self.label(),
            written = report.written as u64,
            unchanged = report.unchanged as u64,
            misses = report.misses.len() as u64,
            "model.extract"
        );
        report
    }
}
