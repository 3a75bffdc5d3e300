//! Manifest document -> domain objects
//!
//! Conversion is all-or-nothing: the first failing field, group or extension
//! aborts it with an error labeled by its path, e.g.
//! `ext (cesium): visualizer missing`.

use semver::Version;
use tracing::debug;

use super::document::{
    ConditionDocument, ExtensionDocument, FieldDocument, GroupDocument, LinkableDocument,
    ManifestDocument, PointerDocument, SchemaDocument,
};
use super::translation::{
    Locales, TranslatedExtension, TranslatedField, TranslatedGroup, TranslatedRoot,
    TranslatedSchema,
};
use super::Manifest;
use crate::config::PluginConfig;
use crate::error::{PluginError, Result};
use crate::i18n::{LocalizedString, DEFAULT_LOCALE};
use crate::id::{
    ExtensionId, FieldId, PluginId, SceneId, SchemaGroupId, SchemaId, OFFICIAL_PLUGIN_NAME,
    PLUGIN_SCHEMA_SLOT,
};
use crate::plugin::{Extension, ExtensionType, Plugin, Visualizer};
use crate::schema::{
    Choice, Condition, FieldUi, LinkableFields, Schema, SchemaField, SchemaFieldPointer,
    SchemaGroup,
};
use crate::value::{Payload, Type};

/// Knobs for [`convert`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Locale of the manifest's literal strings
    pub default_locale: String,
    /// Manifest id that resolves to the official plugin id
    pub official_plugin_name: String,
    /// Allow system-only extension types
    pub system: bool,
    /// Scope the plugin to a scene
    pub scene: Option<SceneId>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            official_plugin_name: OFFICIAL_PLUGIN_NAME.to_string(),
            system: false,
            scene: None,
        }
    }
}

impl From<&PluginConfig> for ConvertOptions {
    fn from(config: &PluginConfig) -> Self {
        Self {
            default_locale: config.manifest.default_locale.clone(),
            official_plugin_name: config.manifest.official_plugin_name.clone(),
            system: config.manifest.system,
            scene: None,
        }
    }
}

/// Convert a parsed manifest, laying `translated` over its literal strings
pub fn convert(
    doc: &ManifestDocument,
    translated: Option<&TranslatedRoot>,
    opts: &ConvertOptions,
) -> Result<Manifest> {
    let cx = Converter { opts };
    let pid = cx.plugin_id(doc)?;

    let schema = doc
        .schema
        .as_ref()
        .map(|s| {
            let id = SchemaId::new(pid.clone(), PLUGIN_SCHEMA_SLOT)?;
            cx.schema(id, s, translated.map(|t| &t.schema))
                .map_err(|e| e.at("schema"))
        })
        .transpose()?;

    let mut extensions = Vec::with_capacity(doc.extensions.len());
    let mut extension_schemas = Vec::with_capacity(doc.extensions.len());
    for e in &doc.extensions {
        let tr = translated.and_then(|t| t.extension(&e.id));
        let (ext, ext_schema) = cx
            .extension(&pid, e, tr)
            .map_err(|err| err.at(format!("ext ({})", e.id)))?;
        extensions.push(ext);
        extension_schemas.push(ext_schema);
    }

    let plugin = Plugin::builder()
        .id(pid.clone())
        .name(cx.localized(Some(doc.name.as_str()), translated.map(|t| &t.name)))
        .author(doc.author.clone())
        .description(cx.localized(doc.description.as_deref(), translated.map(|t| &t.description)))
        .repository(doc.repository.clone())
        .extensions(extensions)
        .schema(schema.as_ref().map(|s| s.id().clone()))
        .build()?;

    debug!(
        plugin = %pid,
        extensions = plugin.extensions().len(),
        has_schema = schema.is_some(),
        "converted manifest"
    );

    Ok(Manifest {
        plugin,
        schema,
        extension_schemas,
    })
}

struct Converter<'a> {
    opts: &'a ConvertOptions,
}

impl Converter<'_> {
    fn plugin_id(&self, doc: &ManifestDocument) -> Result<PluginId> {
        if doc.id == self.opts.official_plugin_name {
            if !self.opts.system {
                return Err(PluginError::InvalidId(format!(
                    "plugin id '{}' is reserved for system manifests",
                    doc.id
                )));
            }
            return Ok(PluginId::official());
        }
        let version = doc
            .version
            .as_deref()
            .ok_or_else(|| PluginError::InvalidId(format!("plugin '{}' has no version", doc.id)))?;
        let version = Version::parse(version)
            .map_err(|e| PluginError::InvalidId(format!("plugin '{}': {e}", doc.id)))?;
        PluginId::new(doc.id.as_str(), version, self.opts.scene.clone())
    }

    fn localized(&self, literal: Option<&str>, overlay: Option<&Locales>) -> LocalizedString {
        LocalizedString::merged(
            literal,
            &self.opts.default_locale,
            overlay.into_iter().flat_map(|l| l.clone()),
        )
    }

    fn extension(
        &self,
        pid: &PluginId,
        doc: &ExtensionDocument,
        tr: Option<&TranslatedExtension>,
    ) -> Result<(Extension, Schema)> {
        let id = ExtensionId::new(doc.id.as_str())?;
        let extension_type: ExtensionType = doc.extension_type.parse()?;
        let visualizer = doc
            .visualizer
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(str::parse::<Visualizer>)
            .transpose()?;

        let schema_id = SchemaId::new(pid.clone(), id.as_str())?;
        let empty = SchemaDocument::default();
        let schema = self
            .schema(
                schema_id.clone(),
                doc.schema.as_ref().unwrap_or(&empty),
                tr.map(|t| &t.property_schema),
            )
            .map_err(|e| e.at("schema"))?;

        let ext = Extension::builder()
            .id(id)
            .extension_type(extension_type)
            .name(self.localized(Some(doc.name.as_str()), tr.map(|t| &t.name)))
            .description(self.localized(doc.description.as_deref(), tr.map(|t| &t.description)))
            .icon(doc.icon.clone())
            .schema(schema_id)
            .visualizer(visualizer)
            .single_only(doc.single_only)
            .widget_layout(doc.widget_layout)
            .system(self.opts.system)
            .build()?;
        Ok((ext, schema))
    }

    fn schema(
        &self,
        id: SchemaId,
        doc: &SchemaDocument,
        tr: Option<&TranslatedSchema>,
    ) -> Result<Schema> {
        if doc.groups.is_empty() && doc.linkable.is_none() {
            return Ok(Schema::empty(id));
        }
        let groups = doc
            .groups
            .iter()
            .map(|g| {
                self.group(g, tr.and_then(|t| t.get(&g.id)))
                    .map_err(|e| e.at(format!("group ({})", g.id)))
            })
            .collect::<Result<Vec<_>>>()?;
        let linkable = doc
            .linkable
            .as_ref()
            .map(linkable)
            .transpose()?
            .unwrap_or_default();
        Schema::builder().id(id).groups(groups).linkable(linkable).build()
    }

    fn group(&self, doc: &GroupDocument, tr: Option<&TranslatedGroup>) -> Result<SchemaGroup> {
        let fields = doc
            .fields
            .iter()
            .map(|f| {
                self.field(f, tr.and_then(|t| t.fields.get(&f.id)))
                    .map_err(|e| e.at(format!("field ({})", f.id)))
            })
            .collect::<Result<Vec<_>>>()?;
        let representative_field = doc
            .representative_field
            .as_deref()
            .map(FieldId::new)
            .transpose()?;

        SchemaGroup::builder()
            .id(SchemaGroupId::new(doc.id.as_str())?)
            .list(doc.list)
            .fields(fields)
            .title(self.localized(doc.title.as_deref(), tr.map(|t| &t.title)))
            .collection(self.localized(doc.collection.as_deref(), tr.map(|t| &t.collection)))
            .representative_field(representative_field)
            .available_if(doc.available_if.as_ref().map(condition).transpose()?)
            .build()
    }

    fn field(&self, doc: &FieldDocument, tr: Option<&TranslatedField>) -> Result<SchemaField> {
        let t = Type::new(doc.value_type.as_str());
        let default_value = match &doc.default_value {
            None | Some(serde_json::Value::Null) => None,
            Some(v) => Some(t.value_from(&Payload::from(v.clone()), None).ok_or_else(|| {
                PluginError::InvalidValue(format!("default value {v} is not a valid '{t}'"))
            })?),
        };
        let choices = doc
            .choices
            .iter()
            .map(|c| Choice {
                key: c.key.clone(),
                title: self.localized(
                    c.label.as_deref(),
                    tr.and_then(|t| t.choices.get(&c.key)),
                ),
                icon: c.icon.clone(),
            })
            .collect();
        let ui = doc.ui.as_deref().map(str::parse::<FieldUi>).transpose()?;

        SchemaField::builder()
            .id(FieldId::new(doc.id.as_str())?)
            .value_type(t)
            .title(self.localized(doc.title.as_deref(), tr.map(|t| &t.title)))
            .description(self.localized(doc.description.as_deref(), tr.map(|t| &t.description)))
            .prefix(self.localized(doc.prefix.as_deref(), tr.map(|t| &t.prefix)))
            .suffix(self.localized(doc.suffix.as_deref(), tr.map(|t| &t.suffix)))
            .default_value(default_value)
            .ui(ui)
            .min(doc.min)
            .max(doc.max)
            .choices(choices)
            .available_if(doc.available_if.as_ref().map(condition).transpose()?)
            .build()
    }
}

fn condition(doc: &ConditionDocument) -> Result<Condition> {
    let t = Type::new(doc.value_type.as_str());
    let value = t
        .value_from(&Payload::from(doc.value.clone()), None)
        .ok_or_else(|| {
            PluginError::InvalidValue(format!("condition value {} is not a valid '{t}'", doc.value))
        })?;
    Ok(Condition {
        field: FieldId::new(doc.field.as_str())?,
        value,
    })
}

fn linkable(doc: &LinkableDocument) -> Result<LinkableFields> {
    Ok(LinkableFields {
        latlng: doc.latlng.as_ref().map(pointer).transpose()?,
        url: doc.url.as_ref().map(pointer).transpose()?,
    })
}

fn pointer(doc: &PointerDocument) -> Result<SchemaFieldPointer> {
    Ok(SchemaFieldPointer::new(
        SchemaGroupId::new(doc.schema_group_id.as_str())?,
        FieldId::new(doc.field_id.as_str())?,
    ))
}
