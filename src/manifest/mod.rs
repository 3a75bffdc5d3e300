//! Plugin manifests
//!
//! A manifest document (plus optional translations) converts into a
//! [`Manifest`]: the [`Plugin`] with its own schema and one schema per
//! extension. Two manifests compare into a [`Diff`].

pub mod convert;
pub mod diff;
pub mod document;
pub mod translation;

pub use convert::{convert, ConvertOptions};
pub use diff::{Diff, DiffExtensionDeleted, DiffExtensionUpdated};
pub use document::{ManifestDocument, TranslationDocument};
pub use translation::TranslatedRoot;

use crate::error::Result;
use crate::id::SchemaId;
use crate::plugin::Plugin;
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub plugin: Plugin,
    /// The plugin's own schema
    pub schema: Option<Schema>,
    pub extension_schemas: Vec<Schema>,
}

impl Manifest {
    /// Parse and convert a JSON manifest with per-locale JSON translations
    pub fn from_json(
        manifest: &str,
        translations: &[(&str, &str)],
        opts: &ConvertOptions,
    ) -> Result<Self> {
        let doc: ManifestDocument = serde_json::from_str(manifest)?;
        let mut docs = Vec::with_capacity(translations.len());
        for (locale, s) in translations {
            docs.push((*locale, serde_json::from_str::<TranslationDocument>(s)?));
        }
        let translated = (!docs.is_empty())
            .then(|| TranslatedRoot::new(docs.iter().map(|(locale, doc)| (*locale, doc))));
        convert(&doc, translated.as_ref(), opts)
    }

    /// Every schema: the plugin's own first, then the extensions'
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schema.iter().chain(self.extension_schemas.iter())
    }

    pub fn property_schema(&self, id: &SchemaId) -> Option<&Schema> {
        self.schemas().find(|s| s.id() == id)
    }

    pub fn diff(&self, newer: &Manifest) -> Diff {
        Diff::from_manifests(self, newer)
    }
}
