//! Datasets and dataset schemas
//!
//! Property fields can link to dataset fields; ref-typed dataset fields in
//! turn point to other datasets, forming the graph walked by [`graph`].

pub mod graph;

pub use graph::{load_dataset_graph, GraphIterator, GraphStep};

use serde_json::{json, Map, Value as Json};
use std::collections::{HashMap, HashSet};

use crate::error::{PluginError, Result};
use crate::id::{DatasetFieldId, DatasetId, DatasetSchemaId};
use crate::schema::JSON_SCHEMA_DRAFT;
use crate::value::{Optional, Type, Value};

/// Datasets keyed by id
pub type DatasetMap = HashMap<DatasetId, Dataset>;

/// Index a batch of datasets by id
pub fn dataset_map(datasets: impl IntoIterator<Item = Dataset>) -> DatasetMap {
    datasets.into_iter().map(|d| (d.id().clone(), d)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSchemaField {
    pub id: DatasetFieldId,
    pub name: String,
    pub value_type: Type,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSchema {
    id: DatasetSchemaId,
    name: String,
    source: Option<String>,
    fields: Vec<DatasetSchemaField>,
    representative_field: Option<DatasetFieldId>,
}

impl DatasetSchema {
    pub fn new(
        id: DatasetSchemaId,
        name: impl Into<String>,
        fields: Vec<DatasetSchemaField>,
        representative_field: Option<DatasetFieldId>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for f in &fields {
            if !seen.insert(&f.id) {
                return Err(PluginError::InvalidSchema(format!(
                    "dataset schema '{id}': duplicated field '{}'",
                    f.id
                )));
            }
        }
        if let Some(rf) = &representative_field {
            if !seen.contains(rf) {
                return Err(PluginError::InvalidSchema(format!(
                    "dataset schema '{id}': representative field '{rf}' does not exist"
                )));
            }
        }
        Ok(Self {
            id,
            name: name.into(),
            source: None,
            fields,
            representative_field,
        })
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn id(&self) -> &DatasetSchemaId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn fields(&self) -> &[DatasetSchemaField] {
        &self.fields
    }

    pub fn field(&self, id: &DatasetFieldId) -> Option<&DatasetSchemaField> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn representative_field(&self) -> Option<&DatasetSchemaField> {
        self.representative_field.as_ref().and_then(|id| self.field(id))
    }

    /// Draft-07 JSON-Schema of one dataset record, keyed by field name
    pub fn json_schema(&self) -> Json {
        let mut properties = Map::new();
        properties.insert("".to_string(), json!({ "type": "string", "title": "ID" }));
        for f in &self.fields {
            let key = if f.name.is_empty() {
                f.id.to_string()
            } else {
                f.name.clone()
            };
            let mut fragment = f.value_type.json_schema(None).unwrap_or_else(|| json!({}));
            fragment["title"] = json!(key);
            properties.insert(key, fragment);
        }
        json!({
            "$schema": JSON_SCHEMA_DRAFT,
            "$id": self.id.to_string(),
            "title": self.name,
            "type": "object",
            "properties": properties,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetField {
    pub field: DatasetFieldId,
    pub value: Optional,
    pub source: Option<String>,
}

impl DatasetField {
    pub fn new(field: DatasetFieldId, value: Optional) -> Self {
        Self {
            field,
            value,
            source: None,
        }
    }

    pub fn value_type(&self) -> &Type {
        self.value.value_type()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.value()
    }
}

/// One record of a dataset schema
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id: DatasetId,
    schema: DatasetSchemaId,
    source: Option<String>,
    fields: Vec<DatasetField>,
}

impl Dataset {
    pub fn new(id: DatasetId, schema: DatasetSchemaId, fields: Vec<DatasetField>) -> Result<Self> {
        let mut seen = HashSet::new();
        for f in &fields {
            if !seen.insert(&f.field) {
                return Err(PluginError::InvalidValue(format!(
                    "dataset '{id}': duplicated field '{}'",
                    f.field
                )));
            }
        }
        Ok(Self {
            id,
            schema,
            source: None,
            fields,
        })
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn id(&self) -> &DatasetId {
        &self.id
    }

    pub fn schema(&self) -> &DatasetSchemaId {
        &self.schema
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn fields(&self) -> &[DatasetField] {
        &self.fields
    }

    pub fn field(&self, id: &DatasetFieldId) -> Option<&DatasetField> {
        self.fields.iter().find(|f| &f.field == id)
    }

    /// Datasets referenced by ref-typed fields, in field order
    pub fn references(&self) -> Vec<DatasetId> {
        self.fields
            .iter()
            .filter_map(|f| f.value().and_then(Value::as_ref_id))
            .map(DatasetId::from)
            .collect()
    }

    /// The representative field's value rendered as text
    pub fn name(&self, schema: &DatasetSchema) -> Option<String> {
        let rf = schema.representative_field()?;
        self.field(&rf.id)?.value().map(|v| v.to_string())
    }

    /// Record projection keyed by schema field names, falling back to
    /// field ids; the `""` key holds the dataset id
    pub fn interface(&self, schema: &DatasetSchema) -> Json {
        let mut m = Map::new();
        for f in &self.fields {
            let key = match schema.field(&f.field) {
                Some(sf) if !sf.name.is_empty() => sf.name.clone(),
                _ => f.field.to_string(),
            };
            m.insert(key, f.value().and_then(Value::interface).unwrap_or(Json::Null));
        }
        m.insert("".to_string(), json!(self.id.to_string()));
        Json::Object(m)
    }

    /// Record projection keyed by field ids
    pub fn interface_with_field_ids(&self) -> Json {
        let mut m = Map::new();
        for f in &self.fields {
            m.insert(
                f.field.to_string(),
                f.value().and_then(Value::interface).unwrap_or(Json::Null),
            );
        }
        m.insert("".to_string(), json!(self.id.to_string()));
        Json::Object(m)
    }
}
