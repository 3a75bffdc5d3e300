//! Field-level structural diff between two versions of a schema
//!
//! Fields are correlated by id, never by position. A field that keeps its id
//! but changes group is reported as moved rather than removed and added.

use serde::Serialize;
use tracing::debug;

use super::{Schema, SchemaFieldPointer};
use crate::id::{FieldId, SchemaId};
use crate::property::Property;
use crate::value::Type;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDiffMoved {
    pub from: SchemaFieldPointer,
    pub to: SchemaFieldPointer,
    /// The target group is a list group
    pub to_list: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDiffTypeChanged {
    pub pointer: SchemaFieldPointer,
    pub new_type: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    pub from: SchemaId,
    pub to: SchemaId,
    pub added: Vec<SchemaFieldPointer>,
    pub removed: Vec<SchemaFieldPointer>,
    pub moved: Vec<SchemaDiffMoved>,
    pub type_changed: Vec<SchemaDiffTypeChanged>,
}

impl SchemaDiff {
    pub fn from_schemas(old: &Schema, new: &Schema) -> Self {
        let mut diff = SchemaDiff {
            from: old.id().clone(),
            to: new.id().clone(),
            added: Vec::new(),
            removed: Vec::new(),
            moved: Vec::new(),
            type_changed: Vec::new(),
        };

        for gf in old.groups().group_and_fields() {
            let Some(ngf) = new.groups().group_and_field(gf.field.id()) else {
                diff.removed.push(gf.pointer());
                continue;
            };
            if ngf.group.id() != gf.group.id() {
                diff.moved.push(SchemaDiffMoved {
                    from: gf.pointer(),
                    to: ngf.pointer(),
                    to_list: ngf.group.is_list(),
                });
            }
            if ngf.field.value_type() != gf.field.value_type() {
                diff.type_changed.push(SchemaDiffTypeChanged {
                    pointer: ngf.pointer(),
                    new_type: ngf.field.value_type().clone(),
                });
            }
        }

        for ngf in new.groups().group_and_fields() {
            if old.groups().field(ngf.field.id()).is_none() {
                diff.added.push(ngf.pointer());
            }
        }

        debug!(
            from = %diff.from,
            to = %diff.to,
            added = diff.added.len(),
            removed = diff.removed.len(),
            moved = diff.moved.len(),
            type_changed = diff.type_changed.len(),
            "computed schema diff"
        );
        diff
    }

    /// No field was added, removed, moved or retyped. A changed schema id
    /// alone does not count; see [`SchemaDiff::is_id_changed`].
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.type_changed.is_empty()
    }

    pub fn is_id_changed(&self) -> bool {
        self.from != self.to
    }

    /// Apply the diff to a property of the old schema: re-tag it, drop
    /// removed fields, move fields between plain groups and cast retyped
    /// fields. Moves into list groups are left alone. Returns whether the
    /// property changed.
    pub fn migrate(&self, property: &mut Property) -> bool {
        let mut changed = false;
        if self.is_id_changed() {
            property.set_schema(self.to.clone());
            changed = true;
        }

        let removed: Vec<FieldId> = self.removed.iter().map(|p| p.field.clone()).collect();
        changed |= property.remove_fields(&removed);

        for m in self.moved.iter().filter(|m| !m.to_list) {
            changed |= property.move_field(&m.from.field, &m.to.group);
        }

        for tc in &self.type_changed {
            changed |= property.cast_field(&tc.pointer.field, &tc.new_type, None);
        }
        changed
    }
}

/// Diffs of several schemas
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SchemaDiffList(Vec<SchemaDiff>);

impl SchemaDiffList {
    pub fn new(diffs: Vec<SchemaDiff>) -> Self {
        Self(diffs)
    }

    pub fn diffs(&self) -> &[SchemaDiff] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The diff that starts at schema `from`
    pub fn find_by_from(&self, from: &SchemaId) -> Option<&SchemaDiff> {
        self.0.iter().find(|d| &d.from == from)
    }

    /// Migrate a property with the diff starting at its schema
    pub fn migrate(&self, property: &mut Property) -> bool {
        match self.find_by_from(property.schema()) {
            Some(d) => d.migrate(property),
            None => false,
        }
    }
}

impl IntoIterator for SchemaDiffList {
    type Item = SchemaDiff;
    type IntoIter = std::vec::IntoIter<SchemaDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
