//! Identifiers for plugins, schemas and the entities that reference them
//!
//! Plugin ids have the form `name@version` or, for plugins installed into a
//! single scene, `name@version@scene`. The official plugin is addressed by
//! its bare reserved name. Schema ids append a local slot name:
//! `name@version/slot`, where the slot `@` is the plugin's own schema.

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{PluginError, Result};

/// Reserved name of the built-in plugin
pub const OFFICIAL_PLUGIN_NAME: &str = "reearth";

/// Slot name of a plugin's own property schema
pub const PLUGIN_SCHEMA_SLOT: &str = "@";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static pattern is valid"))
}

fn validate_name(kind: &str, s: &str) -> Result<()> {
    if name_pattern().is_match(s) {
        Ok(())
    } else {
        Err(PluginError::InvalidId(format!("{kind} '{s}'")))
    }
}

macro_rules! name_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a name
            pub fn new(s: impl Into<String>) -> Result<Self> {
                let s = s.into();
                validate_name($kind, &s)?;
                Ok(Self(s))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = PluginError;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = PluginError;

            fn try_from(s: String) -> Result<Self> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

name_id!(
    /// Id of an extension, unique within its plugin
    ExtensionId,
    "extension id"
);
name_id!(
    /// Id of a schema field; unique within a schema
    FieldId,
    "field id"
);
name_id!(
    /// Id of a schema group; unique within a schema
    SchemaGroupId,
    "schema group id"
);

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh, time-ordered id
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

entity_id!(SceneId);
entity_id!(PropertyId);
entity_id!(
    /// Id of a property item (a group or a group list inside a property)
    ItemId
);
entity_id!(LayerId);
entity_id!(WidgetId);
entity_id!(InfoboxFieldId);
entity_id!(DatasetId);
entity_id!(DatasetSchemaId);
entity_id!(DatasetFieldId);

/// Plugin id: a name, a semantic version and an optional owning scene
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginId {
    name: String,
    version: Version,
    scene: Option<SceneId>,
}

impl PluginId {
    pub fn new(name: impl Into<String>, version: Version, scene: Option<SceneId>) -> Result<Self> {
        let name = name.into();
        validate_name("plugin name", &name)?;
        Ok(Self {
            name,
            version,
            scene,
        })
    }

    /// The id of the built-in plugin
    pub fn official() -> Self {
        Self {
            name: OFFICIAL_PLUGIN_NAME.to_string(),
            version: Version::new(1, 0, 0),
            scene: None,
        }
    }

    /// Parse `name@version[@scene]` or the bare official name
    pub fn parse(s: &str) -> Result<Self> {
        if s == OFFICIAL_PLUGIN_NAME {
            return Ok(Self::official());
        }
        let parts: Vec<&str> = s.split('@').collect();
        let (name, version, scene) = match parts.as_slice() {
            [name, version] => (*name, *version, None),
            [name, version, scene] if !scene.is_empty() => {
                (*name, *version, Some(SceneId::from(*scene)))
            }
            _ => return Err(PluginError::InvalidId(format!("plugin id '{s}'"))),
        };
        let version = Version::parse(version)
            .map_err(|e| PluginError::InvalidId(format!("plugin id '{s}': {e}")))?;
        Self::new(name, version, scene)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn scene(&self) -> Option<&SceneId> {
        self.scene.as_ref()
    }

    pub fn is_official(&self) -> bool {
        *self == Self::official()
    }

    /// Whether both ids name the same plugin, ignoring the version
    pub fn name_equal(&self, other: &PluginId) -> bool {
        self.name == other.name && self.scene == other.scene
    }

    /// Id of this plugin's own property schema
    pub fn schema_id(&self) -> SchemaId {
        SchemaId {
            plugin: self.clone(),
            slot: PLUGIN_SCHEMA_SLOT.to_string(),
        }
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_official() {
            return f.write_str(OFFICIAL_PLUGIN_NAME);
        }
        write!(f, "{}@{}", self.name, self.version)?;
        if let Some(scene) = &self.scene {
            write!(f, "@{scene}")?;
        }
        Ok(())
    }
}

impl FromStr for PluginId {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PluginId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PluginId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Property schema id: the owning plugin plus a local slot name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaId {
    plugin: PluginId,
    slot: String,
}

impl SchemaId {
    pub fn new(plugin: PluginId, slot: impl Into<String>) -> Result<Self> {
        let slot = slot.into();
        if slot != PLUGIN_SCHEMA_SLOT {
            validate_name("schema slot", &slot)?;
        }
        Ok(Self { plugin, slot })
    }

    /// Parse `<plugin id>/<slot>`
    pub fn parse(s: &str) -> Result<Self> {
        let (plugin, slot) = s
            .rsplit_once('/')
            .ok_or_else(|| PluginError::InvalidId(format!("schema id '{s}'")))?;
        Self::new(PluginId::parse(plugin)?, slot)
    }

    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// The same slot under another plugin id
    pub fn with_plugin(&self, plugin: PluginId) -> Self {
        Self {
            plugin,
            slot: self.slot.clone(),
        }
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.plugin, self.slot)
    }
}

impl FromStr for SchemaId {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for SchemaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_id_parsing() {
        let id = PluginId::parse("hello@1.2.3").unwrap();
        assert_eq!(id.name(), "hello");
        assert_eq!(id.version(), &Version::new(1, 2, 3));
        assert_eq!(id.to_string(), "hello@1.2.3");

        let scoped = PluginId::parse("hello@1.2.3@scene01").unwrap();
        assert_eq!(scoped.scene(), Some(&SceneId::from("scene01")));
        assert_eq!(scoped.to_string(), "hello@1.2.3@scene01");
    }

    #[test]
    fn test_official_plugin_id() {
        let id = PluginId::parse(OFFICIAL_PLUGIN_NAME).unwrap();
        assert!(id.is_official());
        assert_eq!(id, PluginId::official());
        assert_eq!(id.to_string(), "reearth");
    }

    #[test]
    fn test_invalid_plugin_ids() {
        assert!(PluginId::parse("").is_err());
        assert!(PluginId::parse("hello").is_err());
        assert!(PluginId::parse("hello@x.y").is_err());
        assert!(PluginId::parse("he llo@1.0.0").is_err());
        assert!(PluginId::parse("a@1.0.0@").is_err());
    }

    #[test]
    fn test_name_equal_ignores_version() {
        let a = PluginId::parse("p@1.0.0").unwrap();
        let b = PluginId::parse("p@1.1.0").unwrap();
        let c = PluginId::parse("q@1.0.0").unwrap();
        assert!(a.name_equal(&b));
        assert!(!a.name_equal(&c));
    }

    #[test]
    fn test_schema_id_roundtrip() {
        let id = SchemaId::parse("p@1.0.0/marker").unwrap();
        assert_eq!(id.slot(), "marker");
        assert_eq!(id.plugin().name(), "p");
        assert_eq!(id.to_string(), "p@1.0.0/marker");

        let own = PluginId::parse("p@1.0.0").unwrap().schema_id();
        assert_eq!(own.to_string(), "p@1.0.0/@");
        assert_eq!(SchemaId::parse("p@1.0.0/@").unwrap(), own);
    }

    #[test]
    fn test_name_ids_reject_invalid() {
        assert!(FieldId::new("location").is_ok());
        assert!(FieldId::new("").is_err());
        assert!(ExtensionId::new("a/b").is_err());
        let parsed: SchemaGroupId = serde_json::from_str("\"default\"").unwrap();
        assert_eq!(parsed.as_str(), "default");
        assert!(serde_json::from_str::<SchemaGroupId>("\"bad id\"").is_err());
    }
}
