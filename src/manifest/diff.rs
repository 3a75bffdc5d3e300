//! Plugin-level diff between two converted manifests
//!
//! Layers [`SchemaDiff`] over the plugin's own schema and over every
//! extension, matching extensions by id. Neither manifest is modified.

use serde::Serialize;
use tracing::debug;

use super::Manifest;
use crate::id::{ExtensionId, PluginId, SchemaId};
use crate::plugin::ExtensionType;
use crate::schema::{Schema, SchemaDiff, SchemaDiffList};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffExtensionDeleted {
    pub extension: ExtensionId,
    /// Schema whose properties must be purged
    pub property_schema: SchemaId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffExtensionUpdated {
    pub extension: ExtensionId,
    pub old_type: ExtensionType,
    pub new_type: ExtensionType,
    pub property_schema_diff: SchemaDiff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diff {
    pub from: PluginId,
    pub to: PluginId,
    /// Diff of the plugin's own schema when both versions have one
    pub property_schema_diff: Option<SchemaDiff>,
    /// The old plugin's own schema, when the new version dropped it
    pub deleted_property_schema: Option<SchemaId>,
    pub deleted_extensions: Vec<DiffExtensionDeleted>,
    pub updated_extensions: Vec<DiffExtensionUpdated>,
}

fn schema_diff(old: Option<&Schema>, new: Option<&Schema>, from: &SchemaId, to: &SchemaId) -> SchemaDiff {
    match (old, new) {
        (Some(old), Some(new)) => SchemaDiff::from_schemas(old, new),
        _ => SchemaDiff {
            from: from.clone(),
            to: to.clone(),
            added: Vec::new(),
            removed: Vec::new(),
            moved: Vec::new(),
            type_changed: Vec::new(),
        },
    }
}

impl Diff {
    pub fn from_manifests(old: &Manifest, new: &Manifest) -> Self {
        let mut diff = Diff {
            from: old.plugin.id().clone(),
            to: new.plugin.id().clone(),
            property_schema_diff: None,
            deleted_property_schema: None,
            deleted_extensions: Vec::new(),
            updated_extensions: Vec::new(),
        };

        match (old.plugin.schema(), new.plugin.schema()) {
            (Some(old_id), None) => diff.deleted_property_schema = Some(old_id.clone()),
            (Some(old_id), Some(new_id)) => {
                diff.property_schema_diff = Some(schema_diff(
                    old.property_schema(old_id),
                    new.property_schema(new_id),
                    old_id,
                    new_id,
                ));
            }
            _ => {}
        }

        for e in old.plugin.extensions() {
            let Some(ne) = new.plugin.extension(e.id()) else {
                diff.deleted_extensions.push(DiffExtensionDeleted {
                    extension: e.id().clone(),
                    property_schema: e.schema().clone(),
                });
                continue;
            };
            let updated = DiffExtensionUpdated {
                extension: e.id().clone(),
                old_type: e.extension_type(),
                new_type: ne.extension_type(),
                property_schema_diff: schema_diff(
                    old.property_schema(e.schema()),
                    new.property_schema(ne.schema()),
                    e.schema(),
                    ne.schema(),
                ),
            };
            if updated.old_type != updated.new_type || !updated.property_schema_diff.is_empty() {
                diff.updated_extensions.push(updated);
            }
        }

        debug!(
            from = %diff.from,
            to = %diff.to,
            deleted_extensions = diff.deleted_extensions.len(),
            updated_extensions = diff.updated_extensions.len(),
            schema_deleted = diff.property_schema_deleted(),
            "computed manifest diff"
        );
        diff
    }

    pub fn property_schema_deleted(&self) -> bool {
        self.deleted_property_schema.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.deleted_extensions.is_empty()
            && self.updated_extensions.is_empty()
            && self.property_schema_diff.as_ref().map_or(true, SchemaDiff::is_empty)
            && !self.property_schema_deleted()
    }

    /// Schema ids whose properties must be deleted, without duplicates
    pub fn deleted_property_schemas(&self) -> Vec<SchemaId> {
        let mut ids: Vec<SchemaId> = self.deleted_property_schema.iter().cloned().collect();
        for e in &self.deleted_extensions {
            if !ids.contains(&e.property_schema) {
                ids.push(e.property_schema.clone());
            }
        }
        ids
    }

    /// Schema diffs that require touching properties: field changes or a
    /// changed schema id
    pub fn property_schema_diffs(&self) -> SchemaDiffList {
        let needs_migration = |d: &&SchemaDiff| !d.is_empty() || d.is_id_changed();
        let own = self
            .property_schema_diff
            .as_ref()
            .filter(|_| !self.property_schema_deleted())
            .filter(needs_migration);
        let extensions = self
            .updated_extensions
            .iter()
            .map(|e| &e.property_schema_diff)
            .filter(needs_migration);
        SchemaDiffList::new(own.into_iter().chain(extensions).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{convert, ConvertOptions, ManifestDocument};
    use serde_json::json;

    fn manifest(v: serde_json::Value) -> Manifest {
        let doc: ManifestDocument = serde_json::from_value(v).unwrap();
        convert(&doc, None, &ConvertOptions::default()).unwrap()
    }

    fn group(fields: serde_json::Value) -> serde_json::Value {
        json!({ "groups": [{ "id": "default", "fields": fields }] })
    }

    #[test]
    fn test_identical_manifests() {
        let v = json!({
            "id": "p", "version": "1.0.0", "name": "P",
            "schema": group(json!([{ "id": "a", "type": "number" }])),
            "extensions": [{ "id": "a", "name": "A", "type": "block" }]
        });
        let d = Diff::from_manifests(&manifest(v.clone()), &manifest(v));
        assert!(d.is_empty());
        assert!(d.deleted_property_schemas().is_empty());
        assert!(d.property_schema_diffs().is_empty());
    }

    #[test]
    fn test_schema_and_extension_changes() {
        let old = manifest(json!({
            "id": "p", "version": "1.0.0", "name": "P",
            "schema": group(json!([{ "id": "x", "type": "string" }])),
            "extensions": [
                { "id": "a", "name": "A", "type": "block" },
                { "id": "b", "name": "B", "type": "block" },
                { "id": "c", "name": "C", "type": "block" }
            ]
        }));
        let new = manifest(json!({
            "id": "p", "version": "1.1.0", "name": "P",
            "extensions": [
                { "id": "a", "name": "A", "type": "widget" },
                { "id": "c", "name": "C", "type": "block" }
            ]
        }));
        let d = Diff::from_manifests(&old, &new);

        assert!(d.property_schema_deleted());
        assert_eq!(d.deleted_extensions.len(), 1);
        assert_eq!(d.deleted_extensions[0].extension.as_str(), "b");
        assert_eq!(d.updated_extensions.len(), 1);
        assert_eq!(d.updated_extensions[0].extension.as_str(), "a");
        assert_eq!(d.updated_extensions[0].new_type, ExtensionType::Widget);
        assert!(!d.is_empty());

        let deleted: Vec<String> = d.deleted_property_schemas().iter().map(|s| s.to_string()).collect();
        assert_eq!(deleted, vec!["p@1.0.0/@", "p@1.0.0/b"]);

        // "a" changed type only: its schema id moved with the version
        let diffs = d.property_schema_diffs();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs.diffs()[0].from.to_string(), "p@1.0.0/a");
        assert!(diffs.diffs()[0].is_id_changed());
    }

    #[test]
    fn test_field_changes_are_reported() {
        let old = manifest(json!({
            "id": "p", "version": "1.0.0", "name": "P",
            "extensions": [{ "id": "a", "name": "A", "type": "block",
                "schema": group(json!([{ "id": "n", "type": "number" }])) }]
        }));
        let new = manifest(json!({
            "id": "p", "version": "1.0.1", "name": "P",
            "extensions": [{ "id": "a", "name": "A", "type": "block",
                "schema": group(json!([{ "id": "n", "type": "string" }])) }]
        }));
        let d = Diff::from_manifests(&old, &new);
        assert_eq!(d.updated_extensions.len(), 1);
        let sd = &d.updated_extensions[0].property_schema_diff;
        assert_eq!(sd.type_changed.len(), 1);
        assert_eq!(sd.type_changed[0].new_type, crate::value::Type::STRING);
    }
}
