//! Property data
//!
//! A [`Property`] is the live data a [`Schema`] describes. Items mirror the
//! schema's groups: a plain group holds one set of fields, a list group holds
//! any number of them.

pub mod field;

pub use field::{Link, Links, PropertyField};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::dataset::DatasetMap;
use crate::error::{PluginError, Result};
use crate::id::{DatasetId, FieldId, ItemId, PropertyId, SceneId, SchemaGroupId, SchemaId};
use crate::schema::{Schema, SchemaFieldPointer};
use crate::value::{Codecs, Type};

/// One set of fields bound to a schema group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyGroup {
    id: ItemId,
    schema_group: SchemaGroupId,
    #[serde(default)]
    fields: Vec<PropertyField>,
}

impl PropertyGroup {
    pub fn new(id: ItemId, schema_group: SchemaGroupId, fields: Vec<PropertyField>) -> Self {
        Self {
            id,
            schema_group,
            fields,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn schema_group(&self) -> &SchemaGroupId {
        &self.schema_group
    }

    pub fn fields(&self) -> &[PropertyField] {
        &self.fields
    }

    pub fn field(&self, id: &FieldId) -> Option<&PropertyField> {
        self.fields.iter().find(|f| f.field() == id)
    }

    pub fn field_mut(&mut self, id: &FieldId) -> Option<&mut PropertyField> {
        self.fields.iter_mut().find(|f| f.field() == id)
    }

    /// Add a field, replacing any field with the same id
    pub fn add_field(&mut self, field: PropertyField) {
        match self.fields.iter_mut().find(|f| f.field() == field.field()) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn remove_field(&mut self, id: &FieldId) -> Option<PropertyField> {
        let i = self.fields.iter().position(|f| f.field() == id)?;
        Some(self.fields.remove(i))
    }
}

/// Ordered groups bound to a list schema group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyGroupList {
    id: ItemId,
    schema_group: SchemaGroupId,
    #[serde(default)]
    groups: Vec<PropertyGroup>,
}

impl PropertyGroupList {
    pub fn new(id: ItemId, schema_group: SchemaGroupId, groups: Vec<PropertyGroup>) -> Self {
        Self {
            id,
            schema_group,
            groups,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn schema_group(&self) -> &SchemaGroupId {
        &self.schema_group
    }

    pub fn groups(&self) -> &[PropertyGroup] {
        &self.groups
    }

    pub fn group(&self, id: &ItemId) -> Option<&PropertyGroup> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn add_group(&mut self, group: PropertyGroup) {
        self.groups.push(group);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyItem {
    Group(PropertyGroup),
    GroupList(PropertyGroupList),
}

impl PropertyItem {
    pub fn id(&self) -> &ItemId {
        match self {
            PropertyItem::Group(g) => g.id(),
            PropertyItem::GroupList(l) => l.id(),
        }
    }

    pub fn schema_group(&self) -> &SchemaGroupId {
        match self {
            PropertyItem::Group(g) => g.schema_group(),
            PropertyItem::GroupList(l) => l.schema_group(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, PropertyItem::GroupList(_))
    }

    /// Every group of the item: itself, or each group of the list
    fn groups(&self) -> Vec<&PropertyGroup> {
        match self {
            PropertyItem::Group(g) => vec![g],
            PropertyItem::GroupList(l) => l.groups.iter().collect(),
        }
    }

    fn groups_mut(&mut self) -> Vec<&mut PropertyGroup> {
        match self {
            PropertyItem::Group(g) => vec![g],
            PropertyItem::GroupList(l) => l.groups.iter_mut().collect(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            PropertyItem::Group(g) => g.fields.is_empty(),
            PropertyItem::GroupList(l) => l.groups.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PropertyRecord", into = "PropertyRecord")]
pub struct Property {
    id: PropertyId,
    scene: SceneId,
    schema: SchemaId,
    items: Vec<PropertyItem>,
}

/// Persisted form, checked through [`Property::new`] when loaded
#[derive(Serialize, Deserialize)]
struct PropertyRecord {
    id: PropertyId,
    scene: SceneId,
    schema: SchemaId,
    #[serde(default)]
    items: Vec<PropertyItem>,
}

impl TryFrom<PropertyRecord> for Property {
    type Error = PluginError;

    fn try_from(r: PropertyRecord) -> Result<Self> {
        Property::new(r.id, r.scene, r.schema, r.items)
    }
}

impl From<Property> for PropertyRecord {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            scene: p.scene,
            schema: p.schema,
            items: p.items,
        }
    }
}

impl Property {
    /// Fails when two items share an id
    pub fn new(
        id: PropertyId,
        scene: SceneId,
        schema: SchemaId,
        items: Vec<PropertyItem>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(PluginError::InvalidValue(format!(
                    "property '{id}': duplicated item '{}'",
                    item.id()
                )));
            }
        }
        Ok(Self {
            id,
            scene,
            schema,
            items,
        })
    }

    /// An empty property for `schema`: one empty item per schema group
    pub fn from_schema(id: PropertyId, scene: SceneId, schema: &Schema) -> Self {
        let items = schema
            .groups()
            .groups()
            .iter()
            .map(|g| {
                if g.is_list() {
                    PropertyItem::GroupList(PropertyGroupList::new(
                        ItemId::new(),
                        g.id().clone(),
                        vec![],
                    ))
                } else {
                    PropertyItem::Group(PropertyGroup::new(ItemId::new(), g.id().clone(), vec![]))
                }
            })
            .collect();
        Self {
            id,
            scene,
            schema: schema.id().clone(),
            items,
        }
    }

    pub fn id(&self) -> &PropertyId {
        &self.id
    }

    pub fn scene(&self) -> &SceneId {
        &self.scene
    }

    pub fn schema(&self) -> &SchemaId {
        &self.schema
    }

    pub fn set_schema(&mut self, schema: SchemaId) {
        self.schema = schema;
    }

    pub fn items(&self) -> &[PropertyItem] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&PropertyItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn item_by_schema_group(&self, group: &SchemaGroupId) -> Option<&PropertyItem> {
        self.items.iter().find(|i| i.schema_group() == group)
    }

    pub fn add_item(&mut self, item: PropertyItem) -> Result<()> {
        if self.item(item.id()).is_some() {
            return Err(PluginError::InvalidValue(format!(
                "property '{}': duplicated item '{}'",
                self.id,
                item.id()
            )));
        }
        self.items.push(item);
        Ok(())
    }

    /// Every field instance, list items included
    pub fn fields(&self) -> impl Iterator<Item = &PropertyField> {
        self.items
            .iter()
            .flat_map(|i| i.groups())
            .flat_map(|g| g.fields.iter())
    }

    /// The field in the plain group addressed by `ptr`
    pub fn field_by_pointer(&self, ptr: &SchemaFieldPointer) -> Option<&PropertyField> {
        match self.item_by_schema_group(&ptr.group)? {
            PropertyItem::Group(g) => g.field(&ptr.field),
            PropertyItem::GroupList(_) => None,
        }
    }

    /// Dataset ids referenced by any link, deduplicated in order
    pub fn datasets(&self) -> Vec<DatasetId> {
        let mut seen = HashSet::new();
        self.fields()
            .filter_map(PropertyField::links)
            .flat_map(|l| l.datasets())
            .filter(|d| seen.insert(*d))
            .cloned()
            .collect()
    }

    /// Remove every instance of the fields; returns whether any was removed
    pub fn remove_fields(&mut self, ids: &[FieldId]) -> bool {
        let mut removed = false;
        for item in &mut self.items {
            for g in item.groups_mut() {
                let before = g.fields.len();
                g.fields.retain(|f| !ids.contains(f.field()));
                removed |= g.fields.len() != before;
            }
        }
        removed
    }

    /// Move a field out of plain groups into the plain group bound to `to`,
    /// creating that group when missing. Returns whether the field moved.
    pub fn move_field(&mut self, id: &FieldId, to: &SchemaGroupId) -> bool {
        let mut taken = None;
        for item in &mut self.items {
            if let PropertyItem::Group(g) = item {
                if g.schema_group() == to {
                    continue;
                }
                if let Some(f) = g.remove_field(id) {
                    taken.get_or_insert(f);
                }
            }
        }
        let Some(field) = taken else {
            return false;
        };
        self.group_for_mut(to).add_field(field);
        true
    }

    /// Cast every instance of a field; returns whether any changed
    pub fn cast_field(&mut self, id: &FieldId, t: &Type, custom: Option<&Arc<Codecs>>) -> bool {
        let mut changed = false;
        for item in &mut self.items {
            for g in item.groups_mut() {
                if let Some(f) = g.field_mut(id) {
                    changed |= f.cast(t, custom);
                }
            }
        }
        changed
    }

    /// Re-tag the property with `schema` and make its data conform: items
    /// of vanished groups and fields the schema no longer declares are
    /// dropped, fields that changed group are relocated, retyped fields are
    /// cast, links whose dataset field no longer fits are removed, and
    /// empty fields and items are pruned.
    pub fn migrate_schema(&mut self, schema: &Schema, datasets: &DatasetMap) {
        self.schema = schema.id().clone();
        let groups = schema.groups();

        self.items.retain(|item| {
            let keep = groups
                .group(item.schema_group())
                .is_some_and(|g| g.is_list() == item.is_list());
            if !keep {
                debug!(item = %item.id(), group = %item.schema_group(), "dropping property item");
            }
            keep
        });

        let mut relocated = Vec::new();
        for item in &mut self.items {
            let list = item.is_list();
            let item_group = item.schema_group().clone();
            for g in item.groups_mut() {
                let mut kept = Vec::with_capacity(g.fields.len());
                for mut f in g.fields.drain(..) {
                    let Some(gf) = groups.group_and_field(f.field()) else {
                        continue;
                    };
                    let declared = gf.field.value_type();
                    f.cast(declared, None);
                    if f.links().is_some_and(|l| !l.is_compatible(declared, datasets)) {
                        warn!(field = %f.field(), "unlinking field from incompatible dataset field");
                        f.unlink();
                    }
                    if gf.group.id() == &item_group {
                        kept.push(f);
                    } else if !list && !gf.group.is_list() {
                        relocated.push((gf.group.id().clone(), f));
                    }
                }
                g.fields = kept;
            }
        }
        for (group, field) in relocated {
            self.group_for_mut(&group).add_field(field);
        }

        self.prune();
    }

    /// Drop empty fields and empty items
    pub fn prune(&mut self) {
        for item in &mut self.items {
            for g in item.groups_mut() {
                g.fields.retain(|f| !f.is_empty());
            }
        }
        self.items.retain(|i| !i.is_empty());
    }

    /// Check the data against `schema`: every item is bound to a group of the
    /// matching kind and every field is declared there with the same type
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        if &self.schema != schema.id() {
            return Err(PluginError::InvalidSchema(format!(
                "property '{}' uses schema '{}', not '{}'",
                self.id,
                self.schema,
                schema.id()
            )));
        }
        for item in &self.items {
            let group = schema
                .groups()
                .group(item.schema_group())
                .filter(|g| g.is_list() == item.is_list())
                .ok_or_else(|| {
                    PluginError::InvalidSchema(format!(
                        "item '{}': schema group '{}' does not match",
                        item.id(),
                        item.schema_group()
                    ))
                })?;
            for f in item.groups().into_iter().flat_map(|g| g.fields.iter()) {
                match group.field(f.field()) {
                    Some(sf) if sf.value_type() == f.value_type() => {}
                    _ => {
                        return Err(PluginError::InvalidValue(format!(
                            "item '{}': field '{}' does not match the schema",
                            item.id(),
                            f.field()
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    fn group_for_mut(&mut self, group: &SchemaGroupId) -> &mut PropertyGroup {
        let pos = self
            .items
            .iter()
            .position(|i| matches!(i, PropertyItem::Group(g) if g.schema_group() == group));
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.items.push(PropertyItem::Group(PropertyGroup::new(
                    ItemId::new(),
                    group.clone(),
                    vec![],
                )));
                self.items.len() - 1
            }
        };
        match &mut self.items[pos] {
            PropertyItem::Group(g) => g,
            PropertyItem::GroupList(_) => unreachable!("position matched a plain group"),
        }
    }
}
