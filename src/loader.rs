//! Injected batch loaders
//!
//! Persistence is the caller's business; the core only sees these traits.
//! Each is implemented for plain closures so tests and callers can pass
//! `|ids| ...` directly.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::id::{DatasetId, PluginId, PropertyId, SceneId, SchemaId};
use crate::layer::Layer;
use crate::plugin::Plugin;
use crate::property::Property;
use crate::schema::Schema;

macro_rules! batch_loader {
    ($(#[$meta:meta])* $trait:ident, $method:ident, $id:ty, $out:ty) => {
        $(#[$meta])*
        pub trait $trait {
            fn $method(&self, ids: &[$id]) -> Result<Vec<$out>>;
        }

        impl<F> $trait for F
        where
            F: Fn(&[$id]) -> Result<Vec<$out>>,
        {
            fn $method(&self, ids: &[$id]) -> Result<Vec<$out>> {
                self(ids)
            }
        }
    };
}

batch_loader!(
    /// Loads plugins; results follow the order of `ids`, missing ones are skipped
    PluginLoader,
    load_plugins,
    PluginId,
    Plugin
);
batch_loader!(SchemaLoader, load_schemas, SchemaId, Schema);
batch_loader!(PropertyLoader, load_properties, PropertyId, Property);
batch_loader!(DatasetLoader, load_datasets, DatasetId, Dataset);

/// Loads every layer of a scene
pub trait LayerLoader {
    fn load_layers(&self, scene: &SceneId) -> Result<Vec<Layer>>;
}

impl<F> LayerLoader for F
where
    F: Fn(&SceneId) -> Result<Vec<Layer>>,
{
    fn load_layers(&self, scene: &SceneId) -> Result<Vec<Layer>> {
        self(scene)
    }
}
