//! Layers and their infoboxes

use crate::error::{PluginError, Result};
use crate::id::{ExtensionId, InfoboxFieldId, LayerId, PluginId, PropertyId, SceneId};

/// One block of an infobox, rendered by a plugin extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoboxField {
    id: InfoboxFieldId,
    plugin: PluginId,
    extension: ExtensionId,
    property: PropertyId,
}

impl InfoboxField {
    pub fn new(
        id: InfoboxFieldId,
        plugin: PluginId,
        extension: ExtensionId,
        property: PropertyId,
    ) -> Self {
        Self {
            id,
            plugin,
            extension,
            property,
        }
    }

    pub fn id(&self) -> &InfoboxFieldId {
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

    pub fn set_plugin(&mut self, plugin: PluginId) {
        self.plugin = plugin;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Infobox {
    property: PropertyId,
    fields: Vec<InfoboxField>,
}

impl Infobox {
    pub fn new(property: PropertyId, fields: Vec<InfoboxField>) -> Result<Self> {
        for (i, f) in fields.iter().enumerate() {
            if fields[..i].iter().any(|g| g.id == f.id) {
                return Err(PluginError::InvalidValue(format!(
                    "infobox: duplicated field '{}'",
                    f.id
                )));
            }
        }
        Ok(Self { property, fields })
    }

    pub fn property(&self) -> &PropertyId {
        &self.property
    }

    pub fn fields(&self) -> &[InfoboxField] {
        &self.fields
    }

    pub fn field(&self, id: &InfoboxFieldId) -> Option<&InfoboxField> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn field_mut(&mut self, id: &InfoboxFieldId) -> Option<&mut InfoboxField> {
        self.fields.iter_mut().find(|f| &f.id == id)
    }

    pub fn fields_by_plugin<'a>(
        &'a self,
        plugin: &'a PluginId,
    ) -> impl Iterator<Item = &'a InfoboxField> + 'a {
        self.fields.iter().filter(move |f| &f.plugin == plugin)
    }

    pub fn remove_field(&mut self, id: &InfoboxFieldId) -> Option<InfoboxField> {
        let i = self.fields.iter().position(|f| &f.id == id)?;
        Some(self.fields.remove(i))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    id: LayerId,
    scene: SceneId,
    name: String,
    plugin: Option<PluginId>,
    extension: Option<ExtensionId>,
    property: Option<PropertyId>,
    infobox: Option<Infobox>,
}

impl Layer {
    pub fn new(id: LayerId, scene: SceneId, name: impl Into<String>) -> Self {
        Self {
            id,
            scene,
            name: name.into(),
            plugin: None,
            extension: None,
            property: None,
            infobox: None,
        }
    }

    /// Bind the layer to a plugin extension
    pub fn with_extension(mut self, plugin: PluginId, extension: ExtensionId) -> Self {
        self.plugin = Some(plugin);
        self.extension = Some(extension);
        self
    }

    pub fn with_property(mut self, property: PropertyId) -> Self {
        self.property = Some(property);
        self
    }

    pub fn with_infobox(mut self, infobox: Infobox) -> Self {
        self.infobox = Some(infobox);
        self
    }

    pub fn id(&self) -> &LayerId {
        &self.id
    }

    pub fn scene(&self) -> &SceneId {
        &self.scene
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin(&self) -> Option<&PluginId> {
        self.plugin.as_ref()
    }

    pub fn extension(&self) -> Option<&ExtensionId> {
        self.extension.as_ref()
    }

    pub fn property(&self) -> Option<&PropertyId> {
        self.property.as_ref()
    }

    pub fn infobox(&self) -> Option<&Infobox> {
        self.infobox.as_ref()
    }

    pub fn infobox_mut(&mut self) -> Option<&mut Infobox> {
        self.infobox.as_mut()
    }

    pub fn set_plugin(&mut self, plugin: Option<PluginId>) {
        self.plugin = plugin;
    }

    /// The layer's property and its infobox's properties
    pub fn properties(&self) -> Vec<PropertyId> {
        let mut ids: Vec<PropertyId> = self.property.iter().cloned().collect();
        if let Some(infobox) = &self.infobox {
            ids.push(infobox.property.clone());
            ids.extend(infobox.fields.iter().map(|f| f.property.clone()));
        }
        ids
    }
}
