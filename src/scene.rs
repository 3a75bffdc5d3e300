//! Scenes: installed plugins and widgets

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PluginError, Result};
use crate::id::{ExtensionId, PluginId, PropertyId, SceneId, WidgetId};

/// A plugin installed in a scene, with the property of the plugin's own schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePlugin {
    plugin: PluginId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property: Option<PropertyId>,
}

impl ScenePlugin {
    pub fn new(plugin: PluginId, property: Option<PropertyId>) -> Self {
        Self { plugin, property }
    }

    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    pub fn property(&self) -> Option<&PropertyId> {
        self.property.as_ref()
    }
}

/// A widget extension placed in a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneWidget {
    id: WidgetId,
    plugin: PluginId,
    extension: ExtensionId,
    property: PropertyId,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    #[serde(default)]
    extended: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl SceneWidget {
    pub fn new(id: WidgetId, plugin: PluginId, extension: ExtensionId, property: PropertyId) -> Self {
        Self {
            id,
            plugin,
            extension,
            property,
            enabled: true,
            extended: false,
        }
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    pub fn extension(&self) -> &ExtensionId {
        &self.extension
    }

    pub fn property(&self) -> &PropertyId {
        &self.property
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn extended(&self) -> bool {
        self.extended
    }

    pub fn set_extended(&mut self, extended: bool) {
        self.extended = extended;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SceneRecord", into = "SceneRecord")]
pub struct Scene {
    id: SceneId,
    property: PropertyId,
    plugins: Vec<ScenePlugin>,
    widgets: Vec<SceneWidget>,
}

/// Persisted form; plugins and widgets are re-added one by one when loaded
#[derive(Serialize, Deserialize)]
struct SceneRecord {
    id: SceneId,
    property: PropertyId,
    #[serde(default)]
    plugins: Vec<ScenePlugin>,
    #[serde(default)]
    widgets: Vec<SceneWidget>,
}

impl TryFrom<SceneRecord> for Scene {
    type Error = PluginError;

    fn try_from(r: SceneRecord) -> Result<Self> {
        let mut scene = Scene::new(r.id, r.property);
        for p in r.plugins {
            scene.install_plugin(p.plugin, p.property)?;
        }
        for w in r.widgets {
            scene.add_widget(w)?;
        }
        Ok(scene)
    }
}

impl From<Scene> for SceneRecord {
    fn from(s: Scene) -> Self {
        Self {
            id: s.id,
            property: s.property,
            plugins: s.plugins,
            widgets: s.widgets,
        }
    }
}

impl Scene {
    pub fn new(id: SceneId, property: PropertyId) -> Self {
        Self {
            id,
            property,
            plugins: Vec::new(),
            widgets: Vec::new(),
        }
    }

    pub fn id(&self) -> &SceneId {
        &self.id
    }

    /// The scene's own property
    pub fn property(&self) -> &PropertyId {
        &self.property
    }

    pub fn plugins(&self) -> &[ScenePlugin] {
        &self.plugins
    }

    pub fn plugin(&self, id: &PluginId) -> Option<&ScenePlugin> {
        self.plugins.iter().find(|p| &p.plugin == id)
    }

    pub fn has_plugin(&self, id: &PluginId) -> bool {
        self.plugin(id).is_some()
    }

    pub fn install_plugin(&mut self, plugin: PluginId, property: Option<PropertyId>) -> Result<()> {
        if self.has_plugin(&plugin) {
            return Err(PluginError::InvalidValue(format!(
                "plugin '{plugin}' is already installed in scene '{}'",
                self.id
            )));
        }
        self.plugins.push(ScenePlugin::new(plugin, property));
        Ok(())
    }

    pub fn uninstall_plugin(&mut self, id: &PluginId) -> Option<ScenePlugin> {
        let i = self.plugins.iter().position(|p| &p.plugin == id)?;
        Some(self.plugins.remove(i))
    }

    /// Swap an installed plugin id in place, keeping its property. Returns
    /// false when `from` is not installed or `to` already is.
    pub fn upgrade_plugin(&mut self, from: &PluginId, to: &PluginId) -> bool {
        if self.has_plugin(to) {
            return false;
        }
        match self.plugins.iter_mut().find(|p| &p.plugin == from) {
            Some(p) => {
                p.plugin = to.clone();
                debug!(scene = %self.id, %from, %to, "upgraded scene plugin");
                true
            }
            None => false,
        }
    }

    pub fn widgets(&self) -> &[SceneWidget] {
        &self.widgets
    }

    pub fn widget(&self, id: &WidgetId) -> Option<&SceneWidget> {
        self.widgets.iter().find(|w| &w.id == id)
    }

    pub fn add_widget(&mut self, widget: SceneWidget) -> Result<()> {
        if self.widget(widget.id()).is_some() {
            return Err(PluginError::InvalidValue(format!(
                "widget '{}' already exists in scene '{}'",
                widget.id(),
                self.id
            )));
        }
        self.widgets.push(widget);
        Ok(())
    }

    pub fn remove_widget(&mut self, id: &WidgetId) -> Option<SceneWidget> {
        let i = self.widgets.iter().position(|w| &w.id == id)?;
        Some(self.widgets.remove(i))
    }

    /// Re-tag every widget of plugin `from` with `to`
    pub fn upgrade_widgets(&mut self, from: &PluginId, to: &PluginId) {
        for w in self.widgets.iter_mut().filter(|w| &w.plugin == from) {
            w.plugin = to.clone();
        }
    }

    /// Every property the scene refers to
    pub fn properties(&self) -> Vec<PropertyId> {
        std::iter::once(self.property.clone())
            .chain(self.plugins.iter().filter_map(|p| p.property.clone()))
            .chain(self.widgets.iter().map(|w| w.property.clone()))
            .collect()
    }
}
