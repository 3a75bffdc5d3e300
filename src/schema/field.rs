//! Schema fields

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::str::FromStr;

use crate::error::{PluginError, Result};
use crate::i18n::LocalizedString;
use crate::id::FieldId;
use crate::value::{Optional, Payload, Type, Value};

/// Editor hint for how a field is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUi {
    Layer,
    Multiline,
    Selection,
    Color,
    Range,
    Slider,
    Image,
    Video,
    File,
    Camera,
    Datetime,
    Padding,
    Margin,
}

impl FieldUi {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldUi::Layer => "layer",
            FieldUi::Multiline => "multiline",
            FieldUi::Selection => "selection",
            FieldUi::Color => "color",
            FieldUi::Range => "range",
            FieldUi::Slider => "slider",
            FieldUi::Image => "image",
            FieldUi::Video => "video",
            FieldUi::File => "file",
            FieldUi::Camera => "camera",
            FieldUi::Datetime => "datetime",
            FieldUi::Padding => "padding",
            FieldUi::Margin => "margin",
        }
    }
}

impl FromStr for FieldUi {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        let ui = match s {
            "layer" => FieldUi::Layer,
            "multiline" => FieldUi::Multiline,
            "selection" => FieldUi::Selection,
            "color" => FieldUi::Color,
            "range" => FieldUi::Range,
            "slider" => FieldUi::Slider,
            "image" => FieldUi::Image,
            "video" => FieldUi::Video,
            "file" => FieldUi::File,
            "camera" => FieldUi::Camera,
            "datetime" => FieldUi::Datetime,
            "padding" => FieldUi::Padding,
            "margin" => FieldUi::Margin,
            other => return Err(PluginError::InvalidValue(format!("unknown ui '{other}'"))),
        };
        Ok(ui)
    }
}

/// One selectable option of a string field
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub key: String,
    pub title: LocalizedString,
    pub icon: Option<String>,
}

/// Shows a field or group only while another field holds a given value
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: FieldId,
    pub value: Value,
}

/// One configurable property slot
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    id: FieldId,
    t: Type,
    title: LocalizedString,
    description: LocalizedString,
    prefix: LocalizedString,
    suffix: LocalizedString,
    default_value: Option<Value>,
    ui: Option<FieldUi>,
    min: Option<f64>,
    max: Option<f64>,
    choices: Vec<Choice>,
    available_if: Option<Condition>,
}

impl SchemaField {
    pub fn builder() -> SchemaFieldBuilder {
        SchemaFieldBuilder::default()
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn value_type(&self) -> &Type {
        &self.t
    }

    pub fn title(&self) -> &LocalizedString {
        &self.title
    }

    pub fn description(&self) -> &LocalizedString {
        &self.description
    }

    pub fn prefix(&self) -> &LocalizedString {
        &self.prefix
    }

    pub fn suffix(&self) -> &LocalizedString {
        &self.suffix
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn ui(&self) -> Option<FieldUi> {
        self.ui
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn choice(&self, key: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.key == key)
    }

    pub fn available_if(&self) -> Option<&Condition> {
        self.available_if.as_ref()
    }

    /// Display name: default-locale title, else the id
    pub fn display_name(&self) -> &str {
        self.title.string().unwrap_or(self.id.as_str())
    }

    /// Whether `v` may be stored in this field
    pub fn validate(&self, v: &Optional) -> bool {
        if v.value_type() != &self.t {
            return false;
        }
        match v.value().map(Value::payload) {
            Some(Payload::Number(n)) => {
                self.min.map_or(true, |min| *n >= min) && self.max.map_or(true, |max| *n <= max)
            }
            Some(Payload::String(s)) if !self.choices.is_empty() => self.choice(s).is_some(),
            _ => true,
        }
    }

    /// JSON-Schema fragment: the type's codec fragment plus field metadata
    pub fn json_schema(&self) -> Json {
        let mut schema = self.t.json_schema(None).unwrap_or_else(|| json!({}));
        if let Json::Object(obj) = &mut schema {
            obj.insert("title".to_string(), json!(self.display_name()));
            if let Some(d) = self.description.string() {
                obj.insert("description".to_string(), json!(d));
            }
            if let Some(v) = self.default_value.as_ref().and_then(Value::interface) {
                obj.insert("default".to_string(), v);
            }
            if let Some(min) = self.min {
                obj.insert("minimum".to_string(), json!(min));
            }
            if let Some(max) = self.max {
                obj.insert("maximum".to_string(), json!(max));
            }
            if !self.choices.is_empty() {
                let keys: Vec<&str> = self.choices.iter().map(|c| c.key.as_str()).collect();
                obj.insert("enum".to_string(), json!(keys));
            }
        }
        schema
    }
}

/// Accumulates a [`SchemaField`]; validation happens in [`build`](Self::build)
#[derive(Debug, Default)]
pub struct SchemaFieldBuilder {
    id: Option<FieldId>,
    t: Option<Type>,
    title: LocalizedString,
    description: LocalizedString,
    prefix: LocalizedString,
    suffix: LocalizedString,
    default_value: Option<Value>,
    ui: Option<FieldUi>,
    min: Option<f64>,
    max: Option<f64>,
    choices: Vec<Choice>,
    available_if: Option<Condition>,
}

impl SchemaFieldBuilder {
    pub fn id(mut self, id: FieldId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn value_type(mut self, t: Type) -> Self {
        self.t = Some(t);
        self
    }

    pub fn title(mut self, title: LocalizedString) -> Self {
        self.title = title;
        self
    }

    pub fn description(mut self, description: LocalizedString) -> Self {
        self.description = description;
        self
    }

    pub fn prefix(mut self, prefix: LocalizedString) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn suffix(mut self, suffix: LocalizedString) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn default_value(mut self, v: Option<Value>) -> Self {
        self.default_value = v;
        self
    }

    pub fn ui(mut self, ui: Option<FieldUi>) -> Self {
        self.ui = ui;
        self
    }

    pub fn min(mut self, min: Option<f64>) -> Self {
        self.min = min;
        self
    }

    pub fn max(mut self, max: Option<f64>) -> Self {
        self.max = max;
        self
    }

    pub fn choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn available_if(mut self, cond: Option<Condition>) -> Self {
        self.available_if = cond;
        self
    }

    pub fn build(self) -> Result<SchemaField> {
        let id = self
            .id
            .ok_or_else(|| PluginError::InvalidId("schema field id is missing".to_string()))?;
        let t = self
            .t
            .ok_or_else(|| PluginError::InvalidValue("value type is missing".to_string()))?;
        if !t.is_default() {
            return Err(PluginError::InvalidValue(format!("invalid value type '{t}'")));
        }
        if let Some(v) = &self.default_value {
            if v.value_type() != &t || !v.validate() {
                return Err(PluginError::InvalidValue(format!(
                    "default value of type '{}' does not fit '{t}'",
                    v.value_type()
                )));
            }
        }
        if self.min.is_some() || self.max.is_some() {
            if t != Type::NUMBER {
                return Err(PluginError::InvalidValue(format!(
                    "min/max are only allowed on number fields, not '{t}'"
                )));
            }
            if let (Some(min), Some(max)) = (self.min, self.max) {
                if min > max {
                    return Err(PluginError::InvalidValue(format!(
                        "min {min} is greater than max {max}"
                    )));
                }
            }
        }
        if !self.choices.is_empty() && t != Type::STRING {
            return Err(PluginError::InvalidValue(format!(
                "choices are only allowed on string fields, not '{t}'"
            )));
        }

        Ok(SchemaField {
            id,
            t,
            title: self.title,
            description: self.description,
            prefix: self.prefix,
            suffix: self.suffix,
            default_value: self.default_value,
            ui: self.ui,
            min: self.min,
            max: self.max,
            choices: self.choices,
            available_if: self.available_if,
        })
    }
}
