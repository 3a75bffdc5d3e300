//! Plugin extensions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PluginError, Result};
use crate::i18n::LocalizedString;
use crate::id::{ExtensionId, SchemaId};

/// What an extension provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtensionType {
    Primitive,
    Widget,
    Block,
    Visualizer,
    Infobox,
    InfoboxBlock,
    Cluster,
    Story,
    StoryPage,
    StoryBlock,
}

impl ExtensionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionType::Primitive => "primitive",
            ExtensionType::Widget => "widget",
            ExtensionType::Block => "block",
            ExtensionType::Visualizer => "visualizer",
            ExtensionType::Infobox => "infobox",
            ExtensionType::InfoboxBlock => "infoboxBlock",
            ExtensionType::Cluster => "cluster",
            ExtensionType::Story => "story",
            ExtensionType::StoryPage => "storyPage",
            ExtensionType::StoryBlock => "storyBlock",
        }
    }

    /// Only system plugins may declare these
    pub fn is_system_only(&self) -> bool {
        matches!(self, ExtensionType::Visualizer | ExtensionType::Infobox)
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionType {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        let t = match s {
            "primitive" => ExtensionType::Primitive,
            "widget" => ExtensionType::Widget,
            "block" => ExtensionType::Block,
            "visualizer" => ExtensionType::Visualizer,
            "infobox" => ExtensionType::Infobox,
            "infoboxBlock" => ExtensionType::InfoboxBlock,
            "cluster" => ExtensionType::Cluster,
            "story" => ExtensionType::Story,
            "storyPage" => ExtensionType::StoryPage,
            "storyBlock" => ExtensionType::StoryBlock,
            other => {
                return Err(PluginError::InvalidExtension(format!(
                    "invalid extension type: {other}"
                )))
            }
        };
        Ok(t)
    }
}

/// Rendering engine an extension is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visualizer {
    #[serde(rename = "cesium")]
    Cesium,
    #[serde(rename = "cesium-beta")]
    CesiumBeta,
}

impl Visualizer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visualizer::Cesium => "cesium",
            Visualizer::CesiumBeta => "cesium-beta",
        }
    }
}

impl FromStr for Visualizer {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cesium" => Ok(Visualizer::Cesium),
            "cesium-beta" => Ok(Visualizer::CesiumBeta),
            other => Err(PluginError::InvalidExtension(format!(
                "invalid visualizer: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetZone {
    Inner,
    Outer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSection {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetArea {
    Top,
    Middle,
    Bottom,
}

/// Where a widget is placed when first added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetLocation {
    pub zone: WidgetZone,
    pub section: WidgetSection,
    pub area: WidgetArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WidgetExtendable {
    #[serde(default)]
    pub vertically: bool,
    #[serde(default)]
    pub horizontally: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetLayout {
    #[serde(default)]
    pub extendable: WidgetExtendable,
    #[serde(default)]
    pub extended: bool,
    #[serde(default)]
    pub floating: bool,
    pub default_location: Option<WidgetLocation>,
}

/// One capability a plugin exposes
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    id: ExtensionId,
    extension_type: ExtensionType,
    name: LocalizedString,
    description: LocalizedString,
    icon: Option<String>,
    schema: SchemaId,
    visualizer: Option<Visualizer>,
    single_only: bool,
    widget_layout: Option<WidgetLayout>,
}

impl Extension {
    pub fn builder() -> ExtensionBuilder {
        ExtensionBuilder::default()
    }

    pub fn id(&self) -> &ExtensionId {
        &self.id
    }

    pub fn extension_type(&self) -> ExtensionType {
        self.extension_type
    }

    pub fn name(&self) -> &LocalizedString {
        &self.name
    }

    pub fn description(&self) -> &LocalizedString {
        &self.description
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Id of the extension's property schema
    pub fn schema(&self) -> &SchemaId {
        &self.schema
    }

    pub fn visualizer(&self) -> Option<Visualizer> {
        self.visualizer
    }

    /// At most one instance per scene
    pub fn single_only(&self) -> bool {
        self.single_only
    }

    pub fn widget_layout(&self) -> Option<&WidgetLayout> {
        self.widget_layout.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct ExtensionBuilder {
    id: Option<ExtensionId>,
    extension_type: Option<ExtensionType>,
    name: LocalizedString,
    description: LocalizedString,
    icon: Option<String>,
    schema: Option<SchemaId>,
    visualizer: Option<Visualizer>,
    single_only: bool,
    widget_layout: Option<WidgetLayout>,
    system: bool,
}

impl ExtensionBuilder {
    pub fn id(mut self, id: ExtensionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn extension_type(mut self, t: ExtensionType) -> Self {
        self.extension_type = Some(t);
        self
    }

    pub fn name(mut self, name: LocalizedString) -> Self {
        self.name = name;
        self
    }

    pub fn description(mut self, description: LocalizedString) -> Self {
        self.description = description;
        self
    }

    pub fn icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    pub fn schema(mut self, schema: SchemaId) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn visualizer(mut self, visualizer: Option<Visualizer>) -> Self {
        self.visualizer = visualizer;
        self
    }

    pub fn single_only(mut self, single_only: bool) -> Self {
        self.single_only = single_only;
        self
    }

    pub fn widget_layout(mut self, layout: Option<WidgetLayout>) -> Self {
        self.widget_layout = layout;
        self
    }

    /// Allow system-only extension types
    pub fn system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }

    pub fn build(self) -> Result<Extension> {
        let id = self
            .id
            .ok_or_else(|| PluginError::InvalidId("extension id is missing".to_string()))?;
        let extension_type = self
            .extension_type
            .ok_or_else(|| PluginError::InvalidExtension("extension type is missing".to_string()))?;
        if extension_type.is_system_only() && !self.system {
            return Err(PluginError::InvalidExtension(format!(
                "{extension_type} extensions are reserved for system plugins"
            )));
        }
        if extension_type == ExtensionType::Visualizer && self.visualizer.is_none() {
            return Err(PluginError::InvalidExtension("visualizer missing".to_string()));
        }
        let schema = self
            .schema
            .ok_or_else(|| PluginError::InvalidId(format!("extension '{id}': schema id is missing")))?;

        Ok(Extension {
            id,
            extension_type,
            name: self.name,
            description: self.description,
            icon: self.icon,
            schema,
            visualizer: self.visualizer,
            single_only: self.single_only,
            widget_layout: self.widget_layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(t: ExtensionType) -> ExtensionBuilder {
        Extension::builder()
            .id(ExtensionId::new("cesium").unwrap())
            .extension_type(t)
            .schema(SchemaId::parse("reearth/cesium").unwrap())
    }

    #[test]
    fn test_visualizer_requires_binding() {
        let err = builder(ExtensionType::Visualizer).system(true).build().unwrap_err();
        assert_eq!(err.to_string(), "visualizer missing");

        let ext = builder(ExtensionType::Visualizer)
            .system(true)
            .visualizer(Some(Visualizer::Cesium))
            .build()
            .unwrap();
        assert_eq!(ext.visualizer(), Some(Visualizer::Cesium));
    }

    #[test]
    fn test_system_only_types() {
        assert!(builder(ExtensionType::Infobox).build().is_err());
        assert!(builder(ExtensionType::Infobox).system(true).build().is_ok());
        assert!(builder(ExtensionType::Widget).build().is_ok());
    }

    #[test]
    fn test_extension_type_vocabulary() {
        for s in [
            "primitive",
            "widget",
            "block",
            "visualizer",
            "infobox",
            "infoboxBlock",
            "cluster",
            "story",
            "storyPage",
            "storyBlock",
        ] {
            assert_eq!(s.parse::<ExtensionType>().unwrap().as_str(), s);
        }
        assert!("gadget".parse::<ExtensionType>().is_err());
    }

    #[test]
    fn test_widget_layout_deserializes() {
        let layout: WidgetLayout = serde_json::from_value(serde_json::json!({
            "extendable": { "vertically": true },
            "floating": true,
            "defaultLocation": { "zone": "inner", "section": "left", "area": "top" }
        }))
        .unwrap();
        assert!(layout.extendable.vertically);
        assert!(!layout.extendable.horizontally);
        assert_eq!(layout.default_location.unwrap().zone, WidgetZone::Inner);
    }
}
