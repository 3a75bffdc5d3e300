//! Serde model of the manifest and translation documents
//!
//! These mirror the documents as authors write them (camelCase keys). Any
//! serde format can feed them; semantics live in [`super::convert`].

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

use crate::plugin::WidgetLayout;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    pub id: String,
    /// Absent only for the official plugin
    pub version: Option<String>,
    pub name: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub repository: Option<String>,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub extensions: Vec<ExtensionDocument>,
    pub schema: Option<SchemaDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub extension_type: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub visualizer: Option<String>,
    pub schema: Option<SchemaDocument>,
    pub widget_layout: Option<WidgetLayout>,
    #[serde(default)]
    pub single_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    #[serde(default)]
    pub groups: Vec<GroupDocument>,
    pub linkable: Option<LinkableDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkableDocument {
    pub latlng: Option<PointerDocument>,
    pub url: Option<PointerDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerDocument {
    pub schema_group_id: String,
    pub field_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDocument {
    pub id: String,
    pub title: Option<String>,
    pub collection: Option<String>,
    #[serde(default)]
    pub list: bool,
    pub representative_field: Option<String>,
    pub available_if: Option<ConditionDocument>,
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub default_value: Option<Json>,
    pub ui: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default)]
    pub choices: Vec<ChoiceDocument>,
    pub available_if: Option<ConditionDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDocument {
    pub key: String,
    pub label: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDocument {
    pub field: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: Json,
}

/// Translation of one manifest into a single locale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationDocument {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub extensions: BTreeMap<String, TranslationExtension>,
    pub schema: Option<TranslationSchema>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationExtension {
    pub name: Option<String>,
    pub description: Option<String>,
    pub property_schema: Option<TranslationSchema>,
}

/// Group translations keyed by group id
pub type TranslationSchema = BTreeMap<String, TranslationGroup>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationGroup {
    pub title: Option<String>,
    pub description: Option<String>,
    pub collection: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, TranslationField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationField {
    pub title: Option<String>,
    pub description: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    /// Choice labels keyed by choice key
    #[serde(default)]
    pub choices: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_manifest_document() {
        let doc: ManifestDocument = serde_json::from_value(json!({
            "id": "marker",
            "version": "1.0.0",
            "name": "Marker",
            "extensions": [{
                "id": "pin",
                "name": "Pin",
                "type": "primitive",
                "schema": {
                    "groups": [{
                        "id": "default",
                        "fields": [{ "id": "location", "type": "latlng", "defaultValue": { "lat": 1, "lng": 2 } }]
                    }]
                }
            }]
        }))
        .unwrap();
        assert_eq!(doc.extensions[0].extension_type, "primitive");
        let field = &doc.extensions[0].schema.as_ref().unwrap().groups[0].fields[0];
        assert_eq!(field.value_type, "latlng");
        assert!(field.default_value.is_some());
        assert!(!doc.system);
    }

    #[test]
    fn test_parse_translation_document() {
        let doc: TranslationDocument = serde_json::from_value(json!({
            "name": "マーカー",
            "extensions": {
                "pin": { "name": "ピン", "propertySchema": { "default": { "title": "基本" } } }
            }
        }))
        .unwrap();
        let ext = &doc.extensions["pin"];
        assert_eq!(ext.name.as_deref(), Some("ピン"));
        assert_eq!(ext.property_schema.as_ref().unwrap()["default"].title.as_deref(), Some("基本"));
    }
}
