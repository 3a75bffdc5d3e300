//! Property fields and their dataset links

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::dataset::DatasetMap;
use crate::error::PluginError;
use crate::id::{DatasetFieldId, DatasetId, DatasetSchemaId, FieldId};
use crate::value::{Codecs, Optional, Type, Value};

/// One hop of a dataset link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Set when the link is bound to a concrete dataset record
    pub dataset: Option<DatasetId>,
    pub schema: DatasetSchemaId,
    pub field: DatasetFieldId,
}

impl Link {
    pub fn new(dataset: Option<DatasetId>, schema: DatasetSchemaId, field: DatasetFieldId) -> Self {
        Self {
            dataset,
            schema,
            field,
        }
    }
}

/// A chain of links; the last hop holds the linked value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Link>", into = "Vec<Link>")]
pub struct Links(Vec<Link>);

impl TryFrom<Vec<Link>> for Links {
    type Error = PluginError;

    fn try_from(links: Vec<Link>) -> Result<Self, Self::Error> {
        Links::new(links).ok_or_else(|| PluginError::InvalidValue("empty link chain".to_string()))
    }
}

impl From<Links> for Vec<Link> {
    fn from(links: Links) -> Self {
        links.0
    }
}

impl Links {
    /// Returns `None` for an empty chain
    pub fn new(links: Vec<Link>) -> Option<Self> {
        if links.is_empty() {
            None
        } else {
            Some(Self(links))
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.0
    }

    pub fn last(&self) -> Option<&Link> {
        self.0.last()
    }

    pub fn datasets(&self) -> impl Iterator<Item = &DatasetId> {
        self.0.iter().filter_map(|l| l.dataset.as_ref())
    }

    /// Value at the end of the chain, when the dataset is loaded
    pub fn value<'a>(&self, datasets: &'a DatasetMap) -> Option<&'a Value> {
        let last = self.last()?;
        let dataset = datasets.get(last.dataset.as_ref()?)?;
        dataset.field(&last.field)?.value()
    }

    /// Whether the linked dataset field can feed a field of type `t`.
    /// Links to datasets that are not loaded cannot be checked and pass.
    pub fn is_compatible(&self, t: &Type, datasets: &DatasetMap) -> bool {
        let Some(last) = self.last() else {
            return false;
        };
        let Some(dataset) = last.dataset.as_ref().and_then(|id| datasets.get(id)) else {
            return true;
        };
        match dataset.field(&last.field) {
            Some(f) => f.value_type() == t,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyField {
    field: FieldId,
    value: Optional,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    links: Option<Links>,
}

impl PropertyField {
    pub fn new(field: FieldId, value: Optional) -> Self {
        Self {
            field,
            value,
            links: None,
        }
    }

    pub fn with_links(mut self, links: Option<Links>) -> Self {
        self.links = links;
        self
    }

    pub fn field(&self) -> &FieldId {
        &self.field
    }

    pub fn value_type(&self) -> &Type {
        self.value.value_type()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.value()
    }

    pub fn optional(&self) -> &Optional {
        &self.value
    }

    pub fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    pub fn is_linked(&self) -> bool {
        self.links.is_some()
    }

    /// Neither a value nor a link
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.links.is_none()
    }

    /// Values of another type are ignored
    pub fn set_value(&mut self, v: Option<Value>) {
        self.value.set_value(v);
    }

    pub fn link(&mut self, links: Links) {
        self.links = Some(links);
    }

    pub fn unlink(&mut self) {
        self.links = None;
    }

    /// The linked value when the chain resolves, else the field's own value
    pub fn actual_value<'a>(&'a self, datasets: &'a DatasetMap) -> Option<&'a Value> {
        self.links
            .as_ref()
            .and_then(|l| l.value(datasets))
            .or_else(|| self.value())
    }

    /// Retype the field; links are dropped since they were typed for the old
    /// type. Returns whether anything changed.
    pub fn cast(&mut self, t: &Type, custom: Option<&Arc<Codecs>>) -> bool {
        if self.value_type() == t {
            return false;
        }
        self.value = self.value.cast(t, custom);
        self.links = None;
        true
    }
}
