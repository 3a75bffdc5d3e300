//! Property schemas
//!
//! A [`Schema`] declares the configurable properties of a plugin or one of
//! its extensions: an ordered list of [`SchemaGroup`]s, each an ordered set of
//! typed [`SchemaField`]s. Field ids are unique across the whole schema so a
//! field keeps its identity when it moves between groups.
//!
//! All builders validate once, in `build()`.

pub mod diff;
pub mod field;
pub mod group;

pub use diff::{SchemaDiff, SchemaDiffList, SchemaDiffMoved, SchemaDiffTypeChanged};
pub use field::{Choice, Condition, FieldUi, SchemaField, SchemaFieldBuilder};
pub use group::{SchemaGroup, SchemaGroupBuilder};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as Json};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::error::{PluginError, Result};
use crate::id::{FieldId, SchemaGroupId, SchemaId};
use crate::value::Type;

/// JSON-Schema dialect emitted by this crate
pub const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// Addresses one field of a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaFieldPointer {
    pub group: SchemaGroupId,
    pub field: FieldId,
}

impl SchemaFieldPointer {
    pub fn new(group: SchemaGroupId, field: FieldId) -> Self {
        Self { group, field }
    }
}

impl fmt::Display for SchemaFieldPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.field)
    }
}

/// A group together with one of its fields
#[derive(Debug, Clone, Copy)]
pub struct GroupAndField<'a> {
    pub group: &'a SchemaGroup,
    pub field: &'a SchemaField,
}

impl GroupAndField<'_> {
    pub fn pointer(&self) -> SchemaFieldPointer {
        SchemaFieldPointer::new(self.group.id().clone(), self.field.id().clone())
    }
}

/// Ordered groups of a schema, addressable by group id and by field id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaGroupList {
    groups: Vec<SchemaGroup>,
    index: HashMap<SchemaGroupId, usize>,
    fields: HashMap<FieldId, usize>,
}

impl SchemaGroupList {
    /// Groups with a repeated id are dropped (first wins); an empty list and
    /// a field id that appears in two groups are errors.
    pub fn new(groups: Vec<SchemaGroup>) -> Result<Self> {
        if groups.is_empty() {
            return Err(PluginError::InvalidSchema("schema has no groups".to_string()));
        }
        let mut list = SchemaGroupList::default();
        for g in groups {
            if list.index.contains_key(g.id()) {
                warn!(group = %g.id(), "dropping duplicated schema group");
                continue;
            }
            let gi = list.groups.len();
            for f in g.fields() {
                if let Some(&other) = list.fields.get(f.id()) {
                    return Err(PluginError::InvalidSchema(format!(
                        "field '{}' is declared in both '{}' and '{}'",
                        f.id(),
                        list.groups[other].id(),
                        g.id()
                    )));
                }
                list.fields.insert(f.id().clone(), gi);
            }
            list.index.insert(g.id().clone(), gi);
            list.groups.push(g);
        }
        Ok(list)
    }

    pub fn groups(&self) -> &[SchemaGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, id: &SchemaGroupId) -> Option<&SchemaGroup> {
        self.index.get(id).map(|&i| &self.groups[i])
    }

    /// The group that declares a field
    pub fn group_by_field(&self, id: &FieldId) -> Option<&SchemaGroup> {
        self.fields.get(id).map(|&i| &self.groups[i])
    }

    pub fn field(&self, id: &FieldId) -> Option<&SchemaField> {
        self.group_by_field(id).and_then(|g| g.field(id))
    }

    pub fn group_and_field(&self, id: &FieldId) -> Option<GroupAndField<'_>> {
        let group = self.group_by_field(id)?;
        let field = group.field(id)?;
        Some(GroupAndField { group, field })
    }

    pub fn field_by_pointer(&self, ptr: &SchemaFieldPointer) -> Option<&SchemaField> {
        self.group(&ptr.group).and_then(|g| g.field(&ptr.field))
    }

    /// Every field with its group, in declaration order
    pub fn group_and_fields(&self) -> impl Iterator<Item = GroupAndField<'_>> {
        self.groups
            .iter()
            .flat_map(|group| group.fields().iter().map(move |field| GroupAndField { group, field }))
    }
}

/// Fields an external lat/lng or url value may bind to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkableFields {
    pub latlng: Option<SchemaFieldPointer>,
    pub url: Option<SchemaFieldPointer>,
}

impl LinkableFields {
    pub fn is_empty(&self) -> bool {
        self.latlng.is_none() && self.url.is_none()
    }

    /// Each pointer must reach an existing field of the matching type
    pub fn validate(&self, groups: &SchemaGroupList) -> Result<()> {
        let checks = [(&self.latlng, Type::LATLNG), (&self.url, Type::URL)];
        for (ptr, t) in checks {
            let Some(ptr) = ptr else { continue };
            match groups.field_by_pointer(ptr) {
                Some(f) if f.value_type() == &t => {}
                Some(f) => {
                    return Err(PluginError::InvalidSchema(format!(
                        "linkable field '{ptr}' has type '{}', expected '{t}'",
                        f.value_type()
                    )))
                }
                None => {
                    return Err(PluginError::InvalidSchema(format!(
                        "linkable field '{ptr}' does not exist"
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Full property schema of a plugin or plugin extension
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    id: SchemaId,
    groups: SchemaGroupList,
    linkable: LinkableFields,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// A schema without groups, for extensions that declare none
    pub fn empty(id: SchemaId) -> Self {
        Self {
            id,
            groups: SchemaGroupList::default(),
            linkable: LinkableFields::default(),
        }
    }

    pub fn id(&self) -> &SchemaId {
        &self.id
    }

    pub fn groups(&self) -> &SchemaGroupList {
        &self.groups
    }

    pub fn linkable(&self) -> &LinkableFields {
        &self.linkable
    }

    /// Draft-07 JSON-Schema of a property record of this schema
    pub fn json_schema(&self) -> Json {
        let mut properties = Map::new();
        properties.insert("".to_string(), json!({ "type": "string", "title": "ID" }));
        for g in self.groups.groups() {
            properties.insert(g.display_name().to_string(), g.json_schema());
        }
        json!({
            "$schema": JSON_SCHEMA_DRAFT,
            "$id": self.id.to_string(),
            "title": self.id.to_string(),
            "type": "object",
            "properties": properties,
        })
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    id: Option<SchemaId>,
    groups: Vec<SchemaGroup>,
    linkable: LinkableFields,
}

impl SchemaBuilder {
    pub fn id(mut self, id: SchemaId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn groups(mut self, groups: Vec<SchemaGroup>) -> Self {
        self.groups = groups;
        self
    }

    pub fn linkable(mut self, linkable: LinkableFields) -> Self {
        self.linkable = linkable;
        self
    }

    pub fn build(self) -> Result<Schema> {
        let id = self
            .id
            .ok_or_else(|| PluginError::InvalidId("schema id is missing".to_string()))?;
        let groups = SchemaGroupList::new(self.groups)?;
        self.linkable.validate(&groups)?;
        Ok(Schema {
            id,
            groups,
            linkable: self.linkable,
        })
    }
}
