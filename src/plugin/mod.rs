//! Plugins: versioned bundles of extensions

pub mod extension;

pub use extension::{
    Extension, ExtensionBuilder, ExtensionType, Visualizer, WidgetArea, WidgetExtendable,
    WidgetLayout, WidgetLocation, WidgetSection, WidgetZone,
};

use tracing::warn;

use crate::error::{PluginError, Result};
use crate::i18n::LocalizedString;
use crate::id::{ExtensionId, PluginId, SchemaId};

#[derive(Debug, Clone, PartialEq)]
pub struct Plugin {
    id: PluginId,
    name: LocalizedString,
    author: Option<String>,
    description: LocalizedString,
    repository: Option<String>,
    extensions: Vec<Extension>,
    schema: Option<SchemaId>,
}

impl Plugin {
    pub fn builder() -> PluginBuilder {
        PluginBuilder::default()
    }

    pub fn id(&self) -> &PluginId {
        &self.id
    }

    pub fn name(&self) -> &LocalizedString {
        &self.name
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn description(&self) -> &LocalizedString {
        &self.description
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Extensions in declaration order
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn extension(&self, id: &ExtensionId) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.id() == id)
    }

    /// The plugin's own property schema
    pub fn schema(&self) -> Option<&SchemaId> {
        self.schema.as_ref()
    }

    /// Every schema id the plugin refers to, its own first
    pub fn property_schemas(&self) -> Vec<SchemaId> {
        self.schema
            .iter()
            .chain(self.extensions.iter().map(Extension::schema))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct PluginBuilder {
    id: Option<PluginId>,
    name: LocalizedString,
    author: Option<String>,
    description: LocalizedString,
    repository: Option<String>,
    extensions: Vec<Extension>,
    schema: Option<SchemaId>,
}

impl PluginBuilder {
    pub fn id(mut self, id: PluginId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: LocalizedString) -> Self {
        self.name = name;
        self
    }

    pub fn author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn description(mut self, description: LocalizedString) -> Self {
        self.description = description;
        self
    }

    pub fn repository(mut self, repository: Option<String>) -> Self {
        self.repository = repository;
        self
    }

    pub fn extensions(mut self, extensions: Vec<Extension>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn schema(mut self, schema: Option<SchemaId>) -> Self {
        self.schema = schema;
        self
    }

    pub fn build(self) -> Result<Plugin> {
        let id = self
            .id
            .ok_or_else(|| PluginError::InvalidId("plugin id is missing".to_string()))?;

        let mut extensions: Vec<Extension> = Vec::with_capacity(self.extensions.len());
        for e in self.extensions {
            if extensions.iter().any(|x| x.id() == e.id()) {
                warn!(plugin = %id, extension = %e.id(), "dropping duplicated extension");
                continue;
            }
            extensions.push(e);
        }

        Ok(Plugin {
            id,
            name: self.name,
            author: self.author,
            description: self.description,
            repository: self.repository,
            extensions,
            schema: self.schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(id: &str, t: ExtensionType) -> Extension {
        Extension::builder()
            .id(ExtensionId::new(id).unwrap())
            .extension_type(t)
            .schema(SchemaId::parse(&format!("p@1.0.0/{id}")).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_extensions_dedup_first_wins() {
        let p = Plugin::builder()
            .id(PluginId::parse("p@1.0.0").unwrap())
            .extensions(vec![
                ext("a", ExtensionType::Widget),
                ext("b", ExtensionType::Block),
                ext("a", ExtensionType::Block),
            ])
            .build()
            .unwrap();
        assert_eq!(p.extensions().len(), 2);
        let a = p.extension(&ExtensionId::new("a").unwrap()).unwrap();
        assert_eq!(a.extension_type(), ExtensionType::Widget);
    }

    #[test]
    fn test_property_schemas() {
        let id = PluginId::parse("p@1.0.0").unwrap();
        let p = Plugin::builder()
            .id(id.clone())
            .schema(Some(id.schema_id()))
            .extensions(vec![ext("a", ExtensionType::Widget)])
            .build()
            .unwrap();
        let ids: Vec<String> = p.property_schemas().iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, vec!["p@1.0.0/@", "p@1.0.0/a"]);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        assert!(matches!(
            Plugin::builder().build().unwrap_err(),
            PluginError::InvalidId(_)
        ));
    }
}
