//! Plugin upgrades on live scene data
//!
//! [`PluginMigrator::migrate_plugins`] moves a scene from one version of a
//! plugin to another: the installed plugin record, widgets, layers, infobox
//! fields and every property bound to the plugin's schemas. Persistence is
//! left to the caller, who saves the returned layers and properties and
//! deletes what was removed.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::dataset::dataset_map;
use crate::error::{PluginError, Result};
use crate::id::{LayerId, PluginId, PropertyId, SchemaId};
use crate::layer::Layer;
use crate::loader::{DatasetLoader, LayerLoader, PluginLoader, PropertyLoader, SchemaLoader};
use crate::plugin::Plugin;
use crate::property::Property;
use crate::scene::Scene;
use crate::schema::Schema;

/// Changes the caller has to persist
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigratePluginsResult {
    /// Layers that were re-tagged or lost infobox fields
    pub layers: Vec<Layer>,
    /// Properties migrated to the new schemas
    pub properties: Vec<Property>,
    /// Layers bound to extensions the new plugin no longer has
    pub removed_layers: Vec<LayerId>,
    /// Properties whose owner was removed
    pub removed_properties: Vec<PropertyId>,
}

/// Batch loaders the migrator reads through
pub struct PluginMigrator<'a> {
    pub plugins: &'a dyn PluginLoader,
    pub schemas: &'a dyn SchemaLoader,
    pub layers: &'a dyn LayerLoader,
    pub properties: &'a dyn PropertyLoader,
    pub datasets: &'a dyn DatasetLoader,
}

/// Ids queued in insertion order, without duplicates
struct Queue<T> {
    seen: HashSet<T>,
    items: Vec<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }
}

impl<T: Clone + Eq + std::hash::Hash> Queue<T> {
    fn push(&mut self, item: T) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }
}

impl PluginMigrator<'_> {
    /// Upgrade `scene` from plugin `old` to `new`.
    ///
    /// Fails with [`PluginError::InvalidPlugins`] unless both ids name the
    /// same plugin at different versions and `new` is not installed yet, and
    /// with [`PluginError::PluginNotInstalled`] when the scene lacks `old`.
    /// Loader errors are returned as they are. The scene is only modified
    /// when the whole migration succeeds.
    pub fn migrate_plugins(
        &self,
        scene: &mut Scene,
        old: &PluginId,
        new: &PluginId,
    ) -> Result<MigratePluginsResult> {
        if old == new || !old.name_equal(new) {
            return Err(PluginError::InvalidPlugins);
        }
        if !scene.has_plugin(old) {
            return Err(PluginError::PluginNotInstalled);
        }
        if scene.has_plugin(new) {
            return Err(PluginError::InvalidPlugins);
        }

        let plugins = self.plugins.load_plugins(&[old.clone(), new.clone()])?;
        let find = |id: &PluginId| plugins.iter().find(|p| p.id() == id);
        let (Some(old_plugin), Some(new_plugin)) = (find(old), find(new)) else {
            return Err(PluginError::InvalidPlugins);
        };

        let mut schema_ids = Queue::default();
        for id in new_plugin
            .property_schemas()
            .into_iter()
            .chain(old_plugin.property_schemas())
        {
            schema_ids.push(id);
        }
        let schemas = self.schemas.load_schemas(&schema_ids.items)?;
        let schema_map = schema_map(old_plugin, new_plugin, &schemas);

        let mut working = scene.clone();
        let mut queued = Queue::default();
        let mut result = MigratePluginsResult::default();

        if let Some(property) = working.plugin(old).and_then(|p| p.property()) {
            queued.push(property.clone());
        }
        if !working.upgrade_plugin(old, new) {
            return Err(PluginError::InvalidPlugins);
        }

        working.upgrade_widgets(old, new);
        let widgets: Vec<_> = working
            .widgets()
            .iter()
            .filter(|w| w.plugin() == new)
            .map(|w| (w.id().clone(), w.extension().clone(), w.property().clone()))
            .collect();
        for (id, extension, property) in widgets {
            if new_plugin.extension(&extension).is_none() {
                debug!(widget = %id, %extension, "removing widget of vanished extension");
                working.remove_widget(&id);
                result.removed_properties.push(property);
            } else {
                queued.push(property);
            }
        }

        for mut layer in self.layers.load_layers(working.id())? {
            let mut modified = false;

            if layer.plugin() == Some(old) {
                let vanished = layer
                    .extension()
                    .map_or(true, |e| new_plugin.extension(e).is_none());
                if vanished {
                    debug!(layer = %layer.id(), "removing layer of vanished extension");
                    result.removed_properties.extend(layer.properties());
                    result.removed_layers.push(layer.id().clone());
                    continue;
                }
                layer.set_plugin(Some(new.clone()));
                if let Some(p) = layer.property() {
                    queued.push(p.clone());
                }
                modified = true;
            }

            if let Some(infobox) = layer.infobox_mut() {
                let fields: Vec<_> = infobox
                    .fields_by_plugin(old)
                    .map(|f| (f.id().clone(), f.extension().clone(), f.property().clone()))
                    .collect();
                for (id, extension, property) in fields {
                    if new_plugin.extension(&extension).is_none() {
                        infobox.remove_field(&id);
                        result.removed_properties.push(property);
                    } else if let Some(f) = infobox.field_mut(&id) {
                        f.set_plugin(new.clone());
                        queued.push(property);
                    }
                    modified = true;
                }
            }

            if modified {
                result.layers.push(layer);
            }
        }

        let mut properties = self.properties.load_properties(&queued.items)?;

        let mut dataset_ids = Queue::default();
        for id in properties.iter().flat_map(Property::datasets) {
            dataset_ids.push(id);
        }
        let datasets = if dataset_ids.items.is_empty() {
            Default::default()
        } else {
            dataset_map(self.datasets.load_datasets(&dataset_ids.items)?)
        };

        for p in &mut properties {
            if let Some(schema) = schema_map.get(p.schema()) {
                p.migrate_schema(schema, &datasets);
            }
        }
        result.properties = properties;

        *scene = working;
        info!(
            scene = %scene.id(),
            from = %old,
            to = %new,
            layers = result.layers.len(),
            properties = result.properties.len(),
            removed_layers = result.removed_layers.len(),
            removed_properties = result.removed_properties.len(),
            "migrated plugin"
        );
        Ok(result)
    }
}

/// Old schema id -> new schema, for the plugin's own schema and every
/// extension present in both versions
fn schema_map<'s>(
    old: &Plugin,
    new: &Plugin,
    schemas: &'s [Schema],
) -> HashMap<SchemaId, &'s Schema> {
    let find = |id: &SchemaId| schemas.iter().find(|s| s.id() == id);
    let mut pairs: Vec<(&SchemaId, &SchemaId)> = Vec::new();
    if let (Some(o), Some(n)) = (old.schema(), new.schema()) {
        pairs.push((o, n));
    }
    for e in old.extensions() {
        if let Some(ne) = new.extension(e.id()) {
            pairs.push((e.schema(), ne.schema()));
        }
    }
    pairs
        .into_iter()
        .filter_map(|(o, n)| find(n).map(|s| (o.clone(), s)))
        .collect()
}
