//! Plugin Schemas
//!
//! Typed property values, plugin property schemas and the machinery that
//! keeps scene data in step when a plugin is upgraded.
//!
//! ## Features
//!
//! - **Open Type Registry**: every value type is backed by a [`value::Codec`];
//!   callers may thread their own codecs through values
//! - **Safe Casting**: values convert between types or yield nothing, never panic
//! - **Validating Builders**: schemas, groups, fields, extensions and plugins
//!   check their invariants once, at `build()`
//! - **Manifest Conversion**: plugin manifests plus translations become
//!   domain objects, failing with path-labeled errors
//! - **Schema Diffing**: field-level diffs correlated by id, and plugin-wide
//!   diffs over every extension
//! - **Migration**: scene plugins, widgets, layers, infoboxes and properties
//!   move to a new plugin version in one pass
//!
//! ## Architecture
//!
//! ```text
//! value ─▶ schema ─▶ plugin ─▶ manifest (convert, diff)
//!            │                      │
//!            ▼                      ▼
//!         property ◀──────────── migrate ◀── loader
//!            │                      │
//!            ▼                      ▼
//!         dataset (graph)     scene, layer
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod i18n;
pub mod id;
pub mod layer;
pub mod loader;
pub mod manifest;
pub mod migrate;
pub mod plugin;
pub mod property;
pub mod scene;
pub mod schema;
pub mod value;

pub use config::PluginConfig;
pub use dataset::{Dataset, DatasetSchema, GraphIterator, GraphStep};
pub use error::{PluginError, Result};
pub use i18n::LocalizedString;
pub use id::{PluginId, SchemaId};
pub use manifest::{ConvertOptions, Diff, Manifest, ManifestDocument};
pub use migrate::{MigratePluginsResult, PluginMigrator};
pub use plugin::{Extension, ExtensionType, Plugin};
pub use property::Property;
pub use scene::Scene;
pub use schema::{Schema, SchemaDiff};
pub use value::{Optional, Type, Value};
